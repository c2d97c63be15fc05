use crate::{index::IndexReader, Result};

mod boolean_query;
mod conjunction;
mod disjunction;
mod explanation;
mod filter;
mod match_all_query;
mod multi_searcher;
mod multi_term_query;
mod phrase_query;
mod prefix_query;
mod query;
mod range_query;
mod searcher;
mod similarity;
mod sort;
mod term_query;
mod top_docs;
mod wildcard_query;

pub use {
    boolean_query::*, conjunction::*, disjunction::*, explanation::*, filter::*,
    match_all_query::*, multi_searcher::*, multi_term_query::*, phrase_query::*,
    prefix_query::*, query::*, range_query::*, searcher::*, similarity::*, sort::*,
    term_query::*, top_docs::*, wildcard_query::*,
};

/// A document id local to one reader. Ids are dense, start at zero and are remapped by
/// offset when readers are stacked under a multi-searcher.
pub type DocId = i32;

/// Returned by [Scorer::next], [Scorer::skip_to] and [Scorer::doc] when a scorer has
/// exhausted its documents. Scorers treat `i32::MAX` as an invalid document id so that it
/// can serve as the sentinel.
pub const NO_MORE_DOCS: DocId = i32::MAX;

/// A scorer walks the documents matching one query against one reader, in strictly
/// increasing document id order, and scores the document it is positioned on.
///
/// Scorers are created per (query, reader) pair and live for the duration of one search.
pub trait Scorer {
    /// The current document id: `-1` before the first call to [Scorer::next], the sentinel
    /// [NO_MORE_DOCS] after exhaustion.
    fn doc(&self) -> DocId;

    /// Advances to the next matching document and returns it, or [NO_MORE_DOCS].
    fn next(&mut self) -> Result<DocId>;

    /// Advances to the first matching document at or past `target` and returns it, or
    /// [NO_MORE_DOCS]. Works on a freshly created scorer.
    fn skip_to(&mut self, target: DocId) -> Result<DocId>;

    /// The score of the current document. Only valid while positioned on a match; always a
    /// finite positive number.
    fn score(&mut self) -> Result<f32>;
}

/// The per-search state of a query: term statistics are gathered when the weight is
/// created, the query normalization factor is folded in, and scorers are spun off per
/// reader.
///
/// The lifecycle is fixed: `sum_of_squared_weights` once, `normalize` once with the
/// combined query norm, then any number of `scorer`/`explain` calls.
pub trait Weight {
    /// The normalized query-side weight value.
    fn value(&self) -> f32;

    /// The sum of squared raw weights of all scoring clauses, used to derive the query
    /// norm.
    fn sum_of_squared_weights(&mut self) -> f32;

    /// Folds the query normalization factor into this weight (and its children).
    fn normalize(&mut self, norm: f32);

    /// Creates a scorer over `reader`, or `None` when nothing can match (unknown field,
    /// missing term, empty clause list).
    fn scorer(&self, reader: &IndexReader) -> Result<Option<Box<dyn Scorer>>>;

    /// Explains the score of `doc` as a tree whose root value equals the score the scorer
    /// produces for that document.
    fn explain(&self, reader: &IndexReader, doc: DocId) -> Result<Explanation>;
}
