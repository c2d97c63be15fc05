use {
    crate::{
        document::Document,
        index::{
            field_infos::FieldInfos,
            postings::SegmentPostings,
            segment::SegmentData,
        },
        search::DocId,
        store::Store,
        LodestoneError, Result,
    },
    bitvec::vec::BitVec,
    parking_lot::RwLock,
    std::{ops::Bound, sync::Arc},
};

struct ReaderState {
    deleted: BitVec,
    dirty: bool,
    generation: u64,
}

/// A read-only view of one committed index image, plus a private deletion bitmap.
///
/// Deletions made through a reader are visible to postings cursors created afterwards and
/// become durable when [IndexReader::commit] publishes them back to the store. A reader is
/// stale once the store generation has advanced past the one it was opened at.
pub struct IndexReader {
    store: Store,
    data: Arc<SegmentData>,
    state: RwLock<ReaderState>,
}

impl IndexReader {
    /// Opens a reader over the store's current committed image.
    pub fn open(store: &Store) -> Result<Self> {
        let (data, generation) = store.snapshot();
        let deleted = data.deleted.clone();
        Ok(IndexReader {
            store: store.clone(),
            data,
            state: RwLock::new(ReaderState {
                deleted,
                dirty: false,
                generation,
            }),
        })
    }

    pub fn max_doc(&self) -> u32 {
        self.data.max_doc()
    }

    pub fn num_docs(&self) -> u32 {
        let state = self.state.read();
        self.data.max_doc() - state.deleted.count_ones() as u32
    }

    pub fn has_deletions(&self) -> bool {
        self.state.read().deleted.any()
    }

    pub fn is_deleted(&self, doc: DocId) -> bool {
        if doc < 0 {
            return false;
        }
        let state = self.state.read();
        let doc = doc as usize;
        doc < state.deleted.len() && state.deleted[doc]
    }

    /// Marks a document deleted. Deleting an already-deleted document is a no-op; a document
    /// id outside the index range is a state error.
    pub fn delete_doc(&self, doc: DocId) -> Result<()> {
        if doc < 0 || doc as u32 >= self.max_doc() {
            return Err(LodestoneError::State(format!(
                "doc {doc} is out of range (max_doc = {})",
                self.max_doc()
            )));
        }
        let mut state = self.state.write();
        let doc = doc as usize;
        if !state.deleted[doc] {
            state.deleted.set(doc, true);
            state.dirty = true;
        }
        Ok(())
    }

    /// Returns a postings cursor for `(field, term)`, or `None` when the field or term is
    /// unknown. The cursor observes the deletions as of its creation.
    pub fn term_docs_for(&self, field: &str, term: &str) -> Option<SegmentPostings> {
        let list = self.data.fields.get(field)?.postings.get(term)?.clone();
        let deleted = self.state.read().deleted.clone();
        Some(SegmentPostings::new(list, deleted))
    }

    /// The number of documents containing `term` in `field`, deletions not subtracted.
    pub fn doc_freq(&self, field: &str, term: &str) -> usize {
        self.data
            .fields
            .get(field)
            .and_then(|f| f.postings.get(term))
            .map_or(0, |list| list.postings.len())
    }

    /// Iterates the field's term dictionary in byte order.
    pub fn terms_for(&self, field: &str) -> Box<dyn Iterator<Item = &str> + '_> {
        match self.data.fields.get(field) {
            Some(f) => Box::new(f.postings.keys().map(String::as_str)),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Iterates the field's term dictionary in byte order, starting at the first term that
    /// is not below `start`.
    pub fn terms_from<'a>(
        &'a self,
        field: &str,
        start: &str,
    ) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self.data.fields.get(field) {
            Some(f) => Box::new(
                f.postings
                    .range::<str, _>((Bound::Included(start), Bound::Unbounded))
                    .map(|(term, _)| term.as_str()),
            ),
            None => Box::new(std::iter::empty()),
        }
    }

    /// A snapshot of the deletion bitmap as of this call.
    pub fn deleted_docs(&self) -> BitVec {
        self.state.read().deleted.clone()
    }

    /// The norm bytes of a field, one byte per document.
    pub fn norms(&self, field: &str) -> Option<Arc<Vec<u8>>> {
        self.data.fields.get(field).map(|f| f.norms.clone())
    }

    pub fn fis(&self) -> &FieldInfos {
        &self.data.fis
    }

    pub fn get_doc(&self, doc: DocId) -> Result<Document> {
        if doc < 0 || doc as usize >= self.data.docs.len() {
            return Err(LodestoneError::State(format!(
                "doc {doc} is out of range (max_doc = {})",
                self.max_doc()
            )));
        }
        Ok(self.data.docs[doc as usize].clone())
    }

    /// Publishes pending deletions back to the store and advances to the new generation.
    pub fn commit(&self) -> Result<()> {
        let mut state = self.state.write();
        if !state.dirty {
            return Ok(());
        }
        let mut data = (*self.data).clone();
        data.deleted = state.deleted.clone();
        state.generation = self.store.publish(data);
        state.dirty = false;
        Ok(())
    }

    /// Whether the store still sits at the generation this reader was opened at.
    pub fn is_latest(&self) -> bool {
        self.state.read().generation == self.store.generation()
    }

    /// Commits pending deletions, if any. Further use of the reader is permitted but reads
    /// a stale image once the store advances.
    pub fn close(&self) -> Result<()> {
        self.commit()
    }
}
