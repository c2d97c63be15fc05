use {
    crate::{document::Document, index::field_infos::FieldInfos, search::DocId},
    bitvec::vec::BitVec,
    std::{collections::BTreeMap, sync::Arc},
};

/// One entry of a posting list: the document, how often the term occurs in it, and the
/// ordered term positions (empty when the field does not store positions).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    pub doc: DocId,
    pub freq: u32,
    pub positions: Vec<i32>,
}

/// The postings of one term, ordered by strictly increasing document id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

/// The inverted image of one field: an ordered term dictionary and the per-document norm
/// bytes.
#[derive(Clone, Debug, Default)]
pub struct FieldData {
    pub postings: BTreeMap<String, Arc<PostingList>>,
    pub norms: Arc<Vec<u8>>,
}

/// The committed, in-memory image of an index: the inverted fields, the stored documents,
/// field metadata and the deletion bitmap. A store publishes immutable snapshots of this
/// structure under a generation number.
#[derive(Clone, Debug, Default)]
pub struct SegmentData {
    pub fields: BTreeMap<String, FieldData>,
    pub fis: FieldInfos,
    pub docs: Vec<Document>,
    pub deleted: BitVec,
}

impl SegmentData {
    pub fn max_doc(&self) -> u32 {
        self.docs.len() as u32
    }

    pub fn num_docs(&self) -> u32 {
        self.max_doc() - self.deleted.count_ones() as u32
    }
}
