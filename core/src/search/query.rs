use {
    crate::{
        index::IndexReader,
        search::{
            boolean_query::{BooleanQuery, BooleanWeight, Occur},
            match_all_query::{MatchAllQuery, MatchAllWeight},
            multi_term_query::{MultiTermQuery, MultiTermWeight},
            phrase_query::{PhraseQuery, PhraseWeight},
            prefix_query::PrefixQuery,
            range_query::{RangeQuery, TypedRangeQuery},
            searcher::Searchable,
            term_query::{TermQuery, TermWeight},
            wildcard_query::WildcardQuery,
            Weight,
        },
        Result,
    },
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        hash::{Hash, Hasher},
    },
};

/// An immutable query value. Queries compare structurally; hashing agrees with equality.
/// The only post-construction mutations are the boost and, for phrases, the slop.
///
/// Prefix, wildcard and range queries rewrite to concrete multi-term queries against a
/// reader's term dictionary at search time; scoring always happens on rewritten queries.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    Term(TermQuery),
    Boolean(BooleanQuery),
    Phrase(PhraseQuery),
    MultiTerm(MultiTermQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Range(RangeQuery),
    TypedRange(TypedRangeQuery),
    MatchAll(MatchAllQuery),
}

impl Query {
    pub fn boost(&self) -> f32 {
        match self {
            Query::Term(q) => q.boost,
            Query::Boolean(q) => q.boost,
            Query::Phrase(q) => q.boost,
            Query::MultiTerm(q) => q.boost,
            Query::Prefix(q) => q.boost,
            Query::Wildcard(q) => q.boost,
            Query::Range(q) => q.boost,
            Query::TypedRange(q) => q.boost,
            Query::MatchAll(q) => q.boost,
        }
    }

    pub fn set_boost(&mut self, boost: f32) {
        match self {
            Query::Term(q) => q.boost = boost,
            Query::Boolean(q) => q.boost = boost,
            Query::Phrase(q) => q.boost = boost,
            Query::MultiTerm(q) => q.boost = boost,
            Query::Prefix(q) => q.boost = boost,
            Query::Wildcard(q) => q.boost = boost,
            Query::Range(q) => q.boost = boost,
            Query::TypedRange(q) => q.boost = boost,
            Query::MatchAll(q) => q.boost = boost,
        }
    }

    /// Renders the query in its stable string form. Terms in `default_field` omit the
    /// field prefix.
    pub fn to_query_string(&self, default_field: &str) -> String {
        match self {
            Query::Term(q) => q.to_query_string(default_field),
            Query::Boolean(q) => q.to_query_string(default_field),
            Query::Phrase(q) => q.to_query_string(default_field),
            Query::MultiTerm(q) => q.to_query_string(default_field),
            Query::Prefix(q) => q.to_query_string(default_field),
            Query::Wildcard(q) => q.to_query_string(default_field),
            Query::Range(q) => q.to_query_string(default_field),
            Query::TypedRange(q) => q.to_query_string(default_field),
            Query::MatchAll(q) => q.to_query_string(default_field),
        }
    }

    /// Transforms the query into the equivalent form that is scored: term-dictionary
    /// expansions become multi-term queries, single-position phrases collapse, and
    /// single-MUST booleans unwrap. Rewriting a rewritten query is the identity.
    pub fn rewrite(&self, reader: &IndexReader) -> Result<Query> {
        match self {
            Query::Term(_) | Query::MultiTerm(_) | Query::MatchAll(_) => Ok(self.clone()),
            Query::Boolean(q) => q.rewrite(reader),
            Query::Phrase(q) => q.rewrite(reader),
            Query::Prefix(q) => q.rewrite(reader),
            Query::Wildcard(q) => q.rewrite(reader),
            Query::Range(q) => q.rewrite(reader),
            Query::TypedRange(q) => q.rewrite(reader),
        }
    }

    /// Builds the per-search weight. Callers normalize through
    /// [crate::search::prepare_weight], which rewrites first; the term-expansion kinds
    /// route through the searcher's rewrite when asked directly.
    pub(crate) fn create_weight(&self, searcher: &dyn Searchable) -> Result<Box<dyn Weight>> {
        match self {
            Query::Term(q) => Ok(Box::new(TermWeight::new(q, searcher)?)),
            Query::Boolean(q) => Ok(Box::new(BooleanWeight::new(q, searcher)?)),
            Query::Phrase(q) => Ok(Box::new(PhraseWeight::new(q, searcher)?)),
            Query::MultiTerm(q) => Ok(Box::new(MultiTermWeight::new(q, searcher)?)),
            Query::MatchAll(q) => Ok(Box::new(MatchAllWeight::new(q, searcher))),
            Query::Prefix(_) | Query::Wildcard(_) | Query::Range(_) | Query::TypedRange(_) => {
                searcher.rewrite(self)?.create_weight(searcher)
            }
        }
    }

    /// Combines per-reader rewrites of one query into a single equivalent query, the way
    /// the multi-searcher merges sub-rewrites: duplicates collapse, coord-disabled
    /// SHOULD-only booleans are flattened, and anything left becomes a coord-disabled
    /// SHOULD boolean.
    pub fn combine(queries: &[Query]) -> Query {
        let mut uniques: Vec<Query> = Vec::new();
        let mut push_unique = |uniques: &mut Vec<Query>, query: &Query| {
            if !uniques.contains(query) {
                uniques.push(query.clone());
            }
        };
        for query in queries {
            match query {
                Query::Boolean(bq)
                    if bq.coord_disabled()
                        && bq.clauses().iter().all(|c| c.occur == Occur::Should) =>
                {
                    for clause in bq.clauses() {
                        push_unique(&mut uniques, &clause.query);
                    }
                }
                _ => push_unique(&mut uniques, query),
            }
        }
        if uniques.len() == 1 {
            return uniques.pop().unwrap();
        }
        let mut combined = BooleanQuery::new(true);
        for query in uniques {
            combined.add(query, Occur::Should);
        }
        Query::Boolean(combined)
    }
}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Query::Term(q) => {
                state.write_u8(0);
                q.hash(state);
            }
            Query::Boolean(q) => {
                state.write_u8(1);
                q.hash(state);
            }
            Query::Phrase(q) => {
                state.write_u8(2);
                q.hash(state);
            }
            Query::MultiTerm(q) => {
                state.write_u8(3);
                q.hash(state);
            }
            Query::Prefix(q) => {
                state.write_u8(4);
                q.hash(state);
            }
            Query::Wildcard(q) => {
                state.write_u8(5);
                q.hash(state);
            }
            Query::Range(q) => {
                state.write_u8(6);
                q.hash(state);
            }
            Query::TypedRange(q) => {
                state.write_u8(7);
                q.hash(state);
            }
            Query::MatchAll(q) => {
                state.write_u8(8);
                q.hash(state);
            }
        }
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.to_query_string(""))
    }
}

impl From<TermQuery> for Query {
    fn from(q: TermQuery) -> Self {
        Query::Term(q)
    }
}

impl From<BooleanQuery> for Query {
    fn from(q: BooleanQuery) -> Self {
        Query::Boolean(q)
    }
}

impl From<PhraseQuery> for Query {
    fn from(q: PhraseQuery) -> Self {
        Query::Phrase(q)
    }
}

impl From<MultiTermQuery> for Query {
    fn from(q: MultiTermQuery) -> Self {
        Query::MultiTerm(q)
    }
}

impl From<PrefixQuery> for Query {
    fn from(q: PrefixQuery) -> Self {
        Query::Prefix(q)
    }
}

impl From<WildcardQuery> for Query {
    fn from(q: WildcardQuery) -> Self {
        Query::Wildcard(q)
    }
}

impl From<RangeQuery> for Query {
    fn from(q: RangeQuery) -> Self {
        Query::Range(q)
    }
}

impl From<TypedRangeQuery> for Query {
    fn from(q: TypedRangeQuery) -> Self {
        Query::TypedRange(q)
    }
}

impl From<MatchAllQuery> for Query {
    fn from(q: MatchAllQuery) -> Self {
        Query::MatchAll(q)
    }
}
