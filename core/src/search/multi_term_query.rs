use {
    crate::{
        index::{IndexReader, PostingsIterator},
        search::{
            disjunction::DisjunctionSumScorer,
            explanation::Explanation,
            query::Query,
            searcher::Searchable,
            similarity::{decode_norm, Similarity},
            term_query::TermScorer,
            DocId, Scorer, Weight,
        },
        util::fmt_float,
        Result,
    },
    std::hash::{Hash, Hasher},
};

/// The default cap on the number of terms a term-expanding query (prefix, wildcard, range)
/// may rewrite into.
pub const MULTI_TERM_QUERY_MAX_TERMS: usize = 512;

/// One entry of a [MultiTermQuery].
#[derive(Clone, Debug, PartialEq)]
pub struct BoostedTerm {
    pub term: String,
    pub boost: f32,
}

/// A bounded priority set of boosted terms in one field, scored as the disjunction of the
/// kept terms.
///
/// The set holds at most `max_terms` entries: a new entry must strictly beat the current
/// minimum boost to displace it. Entries whose boost falls below `min_boost` are kept in
/// the set but excluded from scoring and rendering. The capacity and floor are
/// construction parameters and do not take part in equality.
#[derive(Clone, Debug)]
pub struct MultiTermQuery {
    pub(crate) field: String,
    pub(crate) terms: Vec<BoostedTerm>,
    pub(crate) max_terms: usize,
    pub(crate) min_boost: f32,
    pub boost: f32,
}

impl MultiTermQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self::with_limits(field, MULTI_TERM_QUERY_MAX_TERMS, 0.0)
    }

    pub fn with_limits(field: impl Into<String>, max_terms: usize, min_boost: f32) -> Self {
        MultiTermQuery {
            field: field.into(),
            terms: Vec::new(),
            max_terms: max_terms.max(1),
            min_boost,
            boost: 1.0,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn terms(&self) -> &[BoostedTerm] {
        &self.terms
    }

    pub fn add_term(&mut self, term: impl Into<String>) {
        self.add_term_boost(term, 1.0);
    }

    /// Adds a term with its own boost. When the set is full, the entry only enters by
    /// strictly beating the lowest-boosted entry, which it evicts.
    pub fn add_term_boost(&mut self, term: impl Into<String>, boost: f32) {
        if self.terms.len() >= self.max_terms {
            let min_index = self
                .terms
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.boost.partial_cmp(&b.1.boost).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(i, _)| i)
                .unwrap();
            if boost <= self.terms[min_index].boost {
                return;
            }
            self.terms.remove(min_index);
        }
        self.terms.push(BoostedTerm {
            term: term.into(),
            boost,
        });
    }

    /// The entries that take part in scoring and rendering, deduplicated by term (highest
    /// boost wins) and filtered by the boost floor.
    pub(crate) fn kept_terms(&self) -> Vec<BoostedTerm> {
        let mut kept: Vec<BoostedTerm> = Vec::new();
        for entry in &self.terms {
            if entry.boost < self.min_boost {
                continue;
            }
            match kept.iter().position(|k| k.term == entry.term) {
                Some(index) => {
                    if entry.boost > kept[index].boost {
                        kept[index].boost = entry.boost;
                    }
                }
                None => kept.push(entry.clone()),
            }
        }
        kept
    }

    fn canonical_entries(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self
            .terms
            .iter()
            .map(|e| (e.term.as_str(), e.boost.to_bits()))
            .collect();
        entries.sort_unstable();
        entries
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        let mut kept = self.kept_terms();
        kept.sort_by(|a, b| {
            b.boost
                .partial_cmp(&a.boost)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        let inner = kept
            .iter()
            .map(|entry| {
                if entry.boost != 1.0 {
                    format!("{}^{}", entry.term, fmt_float(entry.boost))
                } else {
                    entry.term.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        let mut s = if self.field == default_field {
            format!("\"{inner}\"")
        } else {
            format!("{}:\"{inner}\"", self.field)
        };
        if self.boost != 1.0 {
            s.push('^');
            s.push_str(&fmt_float(self.boost));
        }
        s
    }

    pub(crate) fn rewrite(&self, _reader: &IndexReader) -> Result<Query> {
        Ok(Query::MultiTerm(self.clone()))
    }
}

/// Entry order is insertion order and does not affect equality: entries are canonicalized
/// by term bytes before comparison, and the capacity/floor configuration is transient.
impl PartialEq for MultiTermQuery {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.boost == other.boost
            && self.canonical_entries() == other.canonical_entries()
    }
}

impl Hash for MultiTermQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
        self.boost.to_bits().hash(state);
        for (term, boost_bits) in self.canonical_entries() {
            term.hash(state);
            boost_bits.hash(state);
        }
    }
}

struct MultiTermWeightEntry {
    term: String,
    idf: f32,
    query_weight: f32,
    value: f32,
}

pub(crate) struct MultiTermWeight {
    field: String,
    entries: Vec<MultiTermWeightEntry>,
    boost: f32,
    similarity: Similarity,
}

impl MultiTermWeight {
    pub(crate) fn new(query: &MultiTermQuery, searcher: &dyn Searchable) -> Result<Self> {
        let similarity = *searcher.similarity();
        let mut entries = Vec::new();
        for entry in query.kept_terms() {
            let idf = similarity.idf_term(&query.field, &entry.term, searcher)?;
            entries.push(MultiTermWeightEntry {
                term: entry.term,
                idf,
                query_weight: idf * entry.boost * query.boost,
                value: 0.0,
            });
        }
        Ok(MultiTermWeight {
            field: query.field.clone(),
            entries,
            boost: query.boost,
            similarity,
        })
    }
}

impl Weight for MultiTermWeight {
    fn value(&self) -> f32 {
        self.boost
    }

    fn sum_of_squared_weights(&mut self) -> f32 {
        self.entries
            .iter()
            .map(|e| e.query_weight * e.query_weight)
            .sum()
    }

    fn normalize(&mut self, norm: f32) {
        for entry in &mut self.entries {
            entry.query_weight *= norm;
            entry.value = entry.query_weight * entry.idf;
        }
    }

    fn scorer(&self, reader: &IndexReader) -> Result<Option<Box<dyn Scorer>>> {
        let norms = reader.norms(&self.field);
        let scorers: Vec<Box<dyn Scorer>> = self
            .entries
            .iter()
            .filter_map(|entry| {
                reader.term_docs_for(&self.field, &entry.term).map(|postings| {
                    Box::new(TermScorer::new(
                        postings,
                        norms.clone(),
                        entry.value,
                        self.similarity,
                    )) as Box<dyn Scorer>
                })
            })
            .collect();
        if scorers.is_empty() {
            return Ok(None);
        }
        Ok(Some(Box::new(DisjunctionSumScorer::new(scorers, 1))))
    }

    fn explain(&self, reader: &IndexReader, doc: DocId) -> Result<Explanation> {
        let norm = reader.norms(&self.field).map_or(1.0, |norms| {
            decode_norm(norms.get(doc as usize).copied().unwrap_or(0))
        });
        let mut sum = 0.0;
        let mut details = Vec::new();
        for entry in &self.entries {
            let mut postings = match reader.term_docs_for(&self.field, &entry.term) {
                Some(postings) => postings,
                None => continue,
            };
            if !postings.skip_to(doc)? || postings.doc() != doc {
                continue;
            }
            let tf = self.similarity.tf(postings.freq() as f32);
            let value = tf * entry.value * norm;
            sum += value;
            details.push(Explanation::new(
                value,
                format!("weight({}:{} in {doc})", self.field, entry.term),
            ));
        }
        if details.is_empty() {
            return Ok(Explanation::new(
                0.0,
                format!("no matching term in doc {doc}"),
            ));
        }
        let mut result = Explanation::new(sum, "sum of:");
        for detail in details {
            result.add_detail(detail);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_capacity_eviction() {
        let mut query = MultiTermQuery::with_limits("field", 2, 0.0);
        query.add_term("one");
        query.add_term_boost("two", 2.0);
        // equal boost does not displace the minimum
        query.add_term("three");
        assert_eq!(query.terms().len(), 2);
        assert!(query.terms().iter().all(|t| t.term != "three"));
        // a strictly higher boost evicts the minimum
        query.add_term_boost("four", 3.0);
        let mut terms: Vec<&str> = query.terms().iter().map(|t| t.term.as_str()).collect();
        terms.sort_unstable();
        assert_eq!(terms, vec!["four", "two"]);
    }

    #[test]
    fn test_rendering_sorts_by_descending_boost() {
        let mut query = MultiTermQuery::with_limits("field", 4, 0.5);
        assert_eq!(query.to_query_string("field"), "\"\"");
        query.add_term("brown");
        query.add_term_boost("fox", 0.1);
        // below the floor: hidden
        assert_eq!(query.to_query_string("field"), "\"brown\"");
        query.add_term_boost("fox", 0.6);
        assert_eq!(query.to_query_string("field"), "\"brown|fox^0.6\"");
        query.add_term_boost("fast", 50.0);
        assert_eq!(query.to_query_string("field"), "\"fast^50.0|brown|fox^0.6\"");
        assert_eq!(query.to_query_string(""), "field:\"fast^50.0|brown|fox^0.6\"");
        query.boost = 80.1;
        assert_eq!(
            query.to_query_string(""),
            "field:\"fast^50.0|brown|fox^0.6\"^80.1"
        );
    }

    #[test]
    fn test_equality_ignores_configuration_and_order() {
        let mut q1 = MultiTermQuery::with_limits("field", 100, 0.4);
        let mut q2 = MultiTermQuery::new("field");
        assert_eq!(q1, q2);

        q1.add_term("word1");
        assert_ne!(q1, q2);
        q2.add_term("word1");
        assert_eq!(q1, q2);

        q1.add_term("word2");
        q1.add_term("word3");
        q2.add_term("word3");
        q2.add_term("word2");
        assert_eq!(q1, q2);

        q2.add_term_boost("word4", 1.5);
        assert_ne!(q1, q2);
    }
}
