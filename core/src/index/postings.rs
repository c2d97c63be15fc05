use {
    crate::{
        index::segment::PostingList,
        search::{DocId, NO_MORE_DOCS},
        Result,
    },
    bitvec::vec::BitVec,
    std::sync::Arc,
};

/// A cursor over the postings of a single term in one segment.
///
/// Document ids are visited in strictly increasing order. [PostingsIterator::doc] returns
/// `-1` before the first call to [PostingsIterator::next] and [NO_MORE_DOCS] once the
/// cursor is exhausted. Cleanup happens on drop.
pub trait PostingsIterator {
    /// Advances to the next document. Returns `false` when the cursor is exhausted.
    fn next(&mut self) -> Result<bool>;

    /// Advances until `doc() >= target` or the cursor is exhausted. A cursor already at or
    /// past `target` stays where it is.
    fn skip_to(&mut self, target: DocId) -> Result<bool>;

    /// The current document id.
    fn doc(&self) -> DocId;

    /// The term frequency within the current document.
    fn freq(&self) -> u32;

    /// The ordered term positions within the current document. Empty when the field does
    /// not store positions.
    fn positions(&self) -> &[i32];
}

/// Postings cursor over one term's [PostingList], honoring the deletion bitmap that was
/// current when the cursor was created.
pub struct SegmentPostings {
    list: Arc<PostingList>,
    deleted: BitVec,
    cursor: usize,
    current: Option<usize>,
    exhausted: bool,
}

impl SegmentPostings {
    pub(crate) fn new(list: Arc<PostingList>, deleted: BitVec) -> Self {
        SegmentPostings {
            list,
            deleted,
            cursor: 0,
            current: None,
            exhausted: false,
        }
    }

    fn advance_from(&mut self, mut index: usize) -> bool {
        let postings = &self.list.postings;
        while index < postings.len() {
            let doc = postings[index].doc as usize;
            if doc < self.deleted.len() && self.deleted[doc] {
                index += 1;
                continue;
            }
            self.current = Some(index);
            self.cursor = index + 1;
            return true;
        }
        self.current = None;
        self.cursor = postings.len();
        self.exhausted = true;
        false
    }
}

impl PostingsIterator for SegmentPostings {
    fn next(&mut self) -> Result<bool> {
        let start = self.cursor;
        Ok(self.advance_from(start))
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if let Some(current) = self.current {
            if self.list.postings[current].doc >= target {
                return Ok(true);
            }
        }
        let from = self.list.postings.partition_point(|p| p.doc < target);
        let start = from.max(self.cursor);
        Ok(self.advance_from(start))
    }

    fn doc(&self) -> DocId {
        match self.current {
            Some(index) => self.list.postings[index].doc,
            None if self.exhausted => NO_MORE_DOCS,
            None => -1,
        }
    }

    fn freq(&self) -> u32 {
        self.current.map_or(0, |index| self.list.postings[index].freq)
    }

    fn positions(&self) -> &[i32] {
        match self.current {
            Some(index) => &self.list.postings[index].positions,
            None => &[],
        }
    }
}

/// The union of several term cursors, presented as a single cursor.
///
/// Used by phrase positions that carry alternatives: the union visits every document any
/// alternative occurs in, with the alternatives' positions merged in order. Frequencies are
/// summed.
pub struct UnionPostings {
    subs: Vec<SegmentPostings>,
    doc: DocId,
    freq: u32,
    positions: Vec<i32>,
    started: bool,
}

impl UnionPostings {
    pub(crate) fn new(subs: Vec<SegmentPostings>) -> Self {
        UnionPostings {
            subs,
            doc: -1,
            freq: 0,
            positions: Vec::new(),
            started: false,
        }
    }

    fn gather(&mut self) -> bool {
        let min = self
            .subs
            .iter()
            .map(|s| s.doc())
            .min()
            .unwrap_or(NO_MORE_DOCS);
        if min == NO_MORE_DOCS {
            self.doc = NO_MORE_DOCS;
            self.freq = 0;
            self.positions.clear();
            return false;
        }
        self.doc = min;
        self.freq = 0;
        self.positions.clear();
        for sub in &self.subs {
            if sub.doc() == min {
                self.freq += sub.freq();
                self.positions.extend_from_slice(sub.positions());
            }
        }
        self.positions.sort_unstable();
        true
    }
}

impl PostingsIterator for UnionPostings {
    fn next(&mut self) -> Result<bool> {
        if !self.started {
            self.started = true;
            for sub in &mut self.subs {
                sub.next()?;
            }
        } else {
            let doc = self.doc;
            if doc == NO_MORE_DOCS {
                return Ok(false);
            }
            for sub in &mut self.subs {
                if sub.doc() == doc {
                    sub.next()?;
                }
            }
        }
        Ok(self.gather())
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.started && self.doc >= target {
            return Ok(self.doc != NO_MORE_DOCS);
        }
        self.started = true;
        for sub in &mut self.subs {
            if sub.doc() < target {
                sub.skip_to(target)?;
            }
        }
        Ok(self.gather())
    }

    fn doc(&self) -> DocId {
        self.doc
    }

    fn freq(&self) -> u32 {
        self.freq
    }

    fn positions(&self) -> &[i32] {
        &self.positions
    }
}
