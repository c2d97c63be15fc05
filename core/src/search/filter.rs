use {
    crate::{
        index::IndexReader,
        search::{query::Query, searcher::IndexSearcher, searcher::Searchable},
        Result,
    },
    bitvec::vec::BitVec,
    std::sync::Arc,
};

/// Culls search candidates through a per-reader bitset: only documents whose bit is set
/// survive.
pub trait Filter {
    /// One bit per document of `reader`; set bits pass the filter.
    fn bits(&self, reader: &Arc<IndexReader>) -> Result<BitVec>;
}

/// Filters by the documents matching another query.
pub struct QueryFilter {
    query: Query,
}

impl QueryFilter {
    pub fn new(query: Query) -> Self {
        QueryFilter { query }
    }
}

impl Filter for QueryFilter {
    fn bits(&self, reader: &Arc<IndexReader>) -> Result<BitVec> {
        let searcher = IndexSearcher::new(reader.clone());
        let mut bits = BitVec::repeat(false, reader.max_doc() as usize);
        searcher.search_each(&self.query, None, None, &mut |doc, _score| {
            bits.set(doc as usize, true);
            true
        })?;
        Ok(bits)
    }
}
