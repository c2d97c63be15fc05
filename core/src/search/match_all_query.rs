use {
    crate::{
        index::IndexReader,
        search::{
            explanation::Explanation, searcher::Searchable, DocId, Scorer, Weight, NO_MORE_DOCS,
        },
        util::fmt_float,
        Result,
    },
    bitvec::vec::BitVec,
    std::hash::{Hash, Hasher},
};

/// Matches every live document with a constant score.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchAllQuery {
    pub boost: f32,
}

impl MatchAllQuery {
    pub fn new() -> Self {
        MatchAllQuery { boost: 1.0 }
    }

    pub(crate) fn to_query_string(&self, _default_field: &str) -> String {
        if self.boost != 1.0 {
            format!("*^{}", fmt_float(self.boost))
        } else {
            "*".to_string()
        }
    }
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Hash for MatchAllQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.boost.to_bits().hash(state);
    }
}

pub(crate) struct MatchAllWeight {
    boost: f32,
    value: f32,
}

impl MatchAllWeight {
    pub(crate) fn new(query: &MatchAllQuery, _searcher: &dyn Searchable) -> Self {
        MatchAllWeight {
            boost: query.boost,
            value: 0.0,
        }
    }
}

impl Weight for MatchAllWeight {
    fn value(&self) -> f32 {
        self.value
    }

    fn sum_of_squared_weights(&mut self) -> f32 {
        self.boost * self.boost
    }

    fn normalize(&mut self, norm: f32) {
        self.value = self.boost * norm;
    }

    fn scorer(&self, reader: &IndexReader) -> Result<Option<Box<dyn Scorer>>> {
        if reader.max_doc() == 0 {
            return Ok(None);
        }
        Ok(Some(Box::new(MatchAllScorer {
            max_doc: reader.max_doc() as DocId,
            deleted: reader.deleted_docs(),
            value: self.value,
            doc: -1,
        })))
    }

    fn explain(&self, reader: &IndexReader, doc: DocId) -> Result<Explanation> {
        if doc < 0 || doc >= reader.max_doc() as DocId || reader.is_deleted(doc) {
            return Ok(Explanation::new(0.0, format!("doc {doc} does not match")));
        }
        Ok(Explanation::new(self.value, "match_all"))
    }
}

struct MatchAllScorer {
    max_doc: DocId,
    deleted: BitVec,
    value: f32,
    doc: DocId,
}

impl Scorer for MatchAllScorer {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<DocId> {
        if self.doc == NO_MORE_DOCS {
            return Ok(NO_MORE_DOCS);
        }
        self.skip_to(self.doc + 1)
    }

    fn skip_to(&mut self, target: DocId) -> Result<DocId> {
        if self.doc != -1 && self.doc >= target {
            return Ok(self.doc);
        }
        let mut doc = target.max(0);
        while doc < self.max_doc {
            let index = doc as usize;
            if index >= self.deleted.len() || !self.deleted[index] {
                self.doc = doc;
                return Ok(doc);
            }
            doc += 1;
        }
        self.doc = NO_MORE_DOCS;
        Ok(NO_MORE_DOCS)
    }

    fn score(&mut self) -> Result<f32> {
        Ok(self.value)
    }
}
