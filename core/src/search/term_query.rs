use {
    crate::{
        index::{IndexReader, PostingsIterator, SegmentPostings},
        search::{
            explanation::Explanation,
            searcher::Searchable,
            similarity::{decode_norm, Similarity},
            DocId, Scorer, Weight,
        },
        util::fmt_float,
        Result,
    },
    std::{
        hash::{Hash, Hasher},
        sync::Arc,
    },
};

/// Matches documents containing one term in one field.
#[derive(Clone, Debug, PartialEq)]
pub struct TermQuery {
    pub(crate) field: String,
    pub(crate) term: String,
    pub boost: f32,
}

impl TermQuery {
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        TermQuery {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        let mut s = if self.field == default_field {
            self.term.clone()
        } else {
            format!("{}:{}", self.field, self.term)
        };
        if self.boost != 1.0 {
            s.push('^');
            s.push_str(&fmt_float(self.boost));
        }
        s
    }
}

impl Hash for TermQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
        self.term.hash(state);
        self.boost.to_bits().hash(state);
    }
}

/// Per-search state of a [TermQuery]: idf from the searcher's statistics, the query-side
/// weight, and the normalized scorer value (`idf² × boost × query_norm`).
pub(crate) struct TermWeight {
    field: String,
    term: String,
    boost: f32,
    similarity: Similarity,
    idf: f32,
    query_weight: f32,
    query_norm: f32,
    value: f32,
}

impl TermWeight {
    pub(crate) fn new(query: &TermQuery, searcher: &dyn Searchable) -> Result<Self> {
        let similarity = *searcher.similarity();
        let idf = similarity.idf_term(&query.field, &query.term, searcher)?;
        Ok(TermWeight {
            field: query.field.clone(),
            term: query.term.clone(),
            boost: query.boost,
            similarity,
            idf,
            query_weight: 0.0,
            query_norm: 1.0,
            value: 0.0,
        })
    }

    fn make_scorer(&self, reader: &IndexReader) -> Option<TermScorer> {
        let postings = reader.term_docs_for(&self.field, &self.term)?;
        Some(TermScorer::new(
            postings,
            reader.norms(&self.field),
            self.value,
            self.similarity,
        ))
    }
}

impl Weight for TermWeight {
    fn value(&self) -> f32 {
        self.value
    }

    fn sum_of_squared_weights(&mut self) -> f32 {
        self.query_weight = self.idf * self.boost;
        self.query_weight * self.query_weight
    }

    fn normalize(&mut self, norm: f32) {
        self.query_norm = norm;
        self.query_weight *= norm;
        self.value = self.query_weight * self.idf;
    }

    fn scorer(&self, reader: &IndexReader) -> Result<Option<Box<dyn Scorer>>> {
        Ok(self
            .make_scorer(reader)
            .map(|s| Box::new(s) as Box<dyn Scorer>))
    }

    fn explain(&self, reader: &IndexReader, doc: DocId) -> Result<Explanation> {
        let freq = match self.make_scorer(reader) {
            Some(mut scorer) => {
                if scorer.skip_to(doc)? == doc {
                    scorer.freq() as f32
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        if freq == 0.0 {
            return Ok(Explanation::new(
                0.0,
                format!("no match for {}:{} in doc {doc}", self.field, self.term),
            ));
        }

        let mut query_expl = Explanation::new(
            self.query_weight,
            format!("query_weight({}:{}), product of:", self.field, self.term),
        );
        if self.boost != 1.0 {
            query_expl.add_detail(Explanation::new(self.boost, "boost"));
        }
        query_expl.add_detail(Explanation::new(
            self.idf,
            format!("idf({}:{})", self.field, self.term),
        ));
        query_expl.add_detail(Explanation::new(self.query_norm, "query_norm"));

        let tf = self.similarity.tf(freq);
        let norm = reader
            .norms(&self.field)
            .map_or(1.0, |norms| decode_norm(norms.get(doc as usize).copied().unwrap_or(0)));
        let mut field_expl = Explanation::new(
            tf * self.idf * norm,
            format!("field_weight({}:{} in {doc}), product of:", self.field, self.term),
        );
        field_expl.add_detail(Explanation::new(tf, format!("tf(freq={})", fmt_float(freq))));
        field_expl.add_detail(Explanation::new(
            self.idf,
            format!("idf({}:{})", self.field, self.term),
        ));
        field_expl.add_detail(Explanation::new(norm, format!("field_norm(doc={doc})")));

        let mut result = Explanation::new(
            query_expl.value() * field_expl.value(),
            format!("weight({}:{} in {doc}), product of:", self.field, self.term),
        );
        result.add_detail(query_expl);
        result.add_detail(field_expl);
        Ok(result)
    }
}

/// Scores one posting list: `tf(freq) × weight × norm(doc)`.
pub struct TermScorer {
    postings: SegmentPostings,
    norms: Option<Arc<Vec<u8>>>,
    value: f32,
    similarity: Similarity,
}

impl TermScorer {
    pub(crate) fn new(
        postings: SegmentPostings,
        norms: Option<Arc<Vec<u8>>>,
        value: f32,
        similarity: Similarity,
    ) -> Self {
        TermScorer {
            postings,
            norms,
            value,
            similarity,
        }
    }

    pub(crate) fn freq(&self) -> u32 {
        self.postings.freq()
    }

    fn norm(&self, doc: DocId) -> f32 {
        match &self.norms {
            Some(norms) => decode_norm(norms.get(doc as usize).copied().unwrap_or(0)),
            None => 1.0,
        }
    }
}

impl Scorer for TermScorer {
    fn doc(&self) -> DocId {
        self.postings.doc()
    }

    fn next(&mut self) -> Result<DocId> {
        self.postings.next()?;
        Ok(self.postings.doc())
    }

    fn skip_to(&mut self, target: DocId) -> Result<DocId> {
        self.postings.skip_to(target)?;
        Ok(self.postings.doc())
    }

    fn score(&mut self) -> Result<f32> {
        let freq = self.postings.freq() as f32;
        Ok(self.similarity.tf(freq) * self.value * self.norm(self.postings.doc()))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_to_query_string() {
        let mut query = TermQuery::new("field", "word2");
        assert_eq!(query.to_query_string("field"), "word2");
        assert_eq!(query.to_query_string(""), "field:word2");
        query.boost = 100.0;
        assert_eq!(query.to_query_string("field"), "word2^100.0");
        assert_eq!(query.to_query_string(""), "field:word2^100.0");
    }
}
