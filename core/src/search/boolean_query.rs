use {
    crate::{
        index::IndexReader,
        search::{
            conjunction::ConjunctionScorer,
            disjunction::DisjunctionSumScorer,
            explanation::Explanation,
            query::Query,
            searcher::Searchable,
            similarity::Similarity,
            DocId, Scorer, Weight, NO_MORE_DOCS,
        },
        util::fmt_float,
        Result,
    },
    std::hash::{Hash, Hasher},
};

/// How a clause participates in its boolean query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occur {
    /// The clause must match; it contributes to the score.
    Must,
    /// The clause may match; matches add to the score.
    Should,
    /// Documents matching the clause are excluded.
    MustNot,
}

/// One clause of a [BooleanQuery].
#[derive(Clone, Debug, PartialEq)]
pub struct BooleanClause {
    pub query: Query,
    pub occur: Occur,
}

/// Composes sub-queries with MUST / SHOULD / MUST_NOT semantics.
///
/// MUST clauses intersect, SHOULD clauses union into the score, MUST_NOT clauses filter. A
/// boolean with no MUST and no SHOULD clauses matches nothing, even when MUST_NOT clauses
/// are present. Unless coordination is disabled, scores are multiplied by
/// `coord(matching clauses / coordinated clauses)`.
#[derive(Clone, Debug, PartialEq)]
pub struct BooleanQuery {
    pub(crate) clauses: Vec<BooleanClause>,
    pub(crate) coord_disabled: bool,
    pub(crate) min_should_match: u32,
    pub boost: f32,
}

impl BooleanQuery {
    pub fn new(coord_disabled: bool) -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            coord_disabled,
            min_should_match: 1,
            boost: 1.0,
        }
    }

    pub fn add(&mut self, query: impl Into<Query>, occur: Occur) {
        self.clauses.push(BooleanClause {
            query: query.into(),
            occur,
        });
    }

    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    pub fn coord_disabled(&self) -> bool {
        self.coord_disabled
    }

    /// How many SHOULD clauses must match when the query has no MUST clauses. Defaults
    /// to 1; with MUST clauses present, SHOULD clauses are purely additive.
    pub fn set_min_should_match(&mut self, min: u32) {
        self.min_should_match = min;
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        let mut inner = String::new();
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                inner.push(' ');
            }
            match clause.occur {
                Occur::Must => inner.push('+'),
                Occur::MustNot => inner.push('-'),
                Occur::Should => {}
            }
            let sub = clause.query.to_query_string(default_field);
            if matches!(clause.query, Query::Boolean(_)) {
                inner.push('(');
                inner.push_str(&sub);
                inner.push(')');
            } else {
                inner.push_str(&sub);
            }
        }
        if self.boost != 1.0 {
            format!("({inner})^{}", fmt_float(self.boost))
        } else {
            inner
        }
    }

    pub(crate) fn rewrite(&self, reader: &IndexReader) -> Result<Query> {
        if self.clauses.len() == 1 && self.clauses[0].occur == Occur::Must {
            let mut sub = self.clauses[0].query.rewrite(reader)?;
            if self.boost != 1.0 {
                let boost = sub.boost() * self.boost;
                sub.set_boost(boost);
            }
            return Ok(sub);
        }
        let mut rewritten = self.clone();
        for clause in &mut rewritten.clauses {
            clause.query = clause.query.rewrite(reader)?;
        }
        Ok(Query::Boolean(rewritten))
    }
}

impl Hash for BooleanQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coord_disabled.hash(state);
        self.min_should_match.hash(state);
        self.boost.to_bits().hash(state);
        state.write_usize(self.clauses.len());
        for clause in &self.clauses {
            clause.occur.hash(state);
            clause.query.hash(state);
        }
    }
}

pub(crate) struct BooleanWeight {
    weights: Vec<(Occur, Box<dyn Weight>)>,
    similarity: Similarity,
    coord_disabled: bool,
    min_should_match: usize,
    max_coord: usize,
    boost: f32,
}

impl BooleanWeight {
    pub(crate) fn new(query: &BooleanQuery, searcher: &dyn Searchable) -> Result<Self> {
        let mut weights = Vec::with_capacity(query.clauses.len());
        let mut max_coord = 0;
        for clause in &query.clauses {
            if clause.occur != Occur::MustNot {
                max_coord += 1;
            }
            weights.push((clause.occur, clause.query.create_weight(searcher)?));
        }
        Ok(BooleanWeight {
            weights,
            similarity: *searcher.similarity(),
            coord_disabled: query.coord_disabled,
            min_should_match: query.min_should_match as usize,
            max_coord,
            boost: query.boost,
        })
    }

    fn coord_factor(&self, overlap: usize) -> f32 {
        if self.coord_disabled {
            1.0
        } else {
            self.similarity.coord(overlap, self.max_coord)
        }
    }
}

impl Weight for BooleanWeight {
    fn value(&self) -> f32 {
        self.boost
    }

    fn sum_of_squared_weights(&mut self) -> f32 {
        let mut sum = 0.0;
        for (occur, weight) in &mut self.weights {
            if *occur != Occur::MustNot {
                sum += weight.sum_of_squared_weights();
            }
        }
        sum * self.boost * self.boost
    }

    fn normalize(&mut self, norm: f32) {
        let norm = norm * self.boost;
        for (_, weight) in &mut self.weights {
            weight.normalize(norm);
        }
    }

    fn scorer(&self, reader: &IndexReader) -> Result<Option<Box<dyn Scorer>>> {
        let mut required = Vec::new();
        let mut optional = Vec::new();
        let mut prohibited = Vec::new();
        for (occur, weight) in &self.weights {
            match (occur, weight.scorer(reader)?) {
                (Occur::Must, Some(scorer)) => required.push(scorer),
                (Occur::Must, None) => return Ok(None),
                (Occur::Should, Some(scorer)) => optional.push(scorer),
                (Occur::MustNot, Some(scorer)) => prohibited.push(scorer),
                (_, None) => {}
            }
        }
        if required.is_empty() && optional.is_empty() {
            return Ok(None);
        }

        let coord: Vec<f32> = (0..=self.max_coord).map(|i| self.coord_factor(i)).collect();
        let required_count = required.len();
        let required = if required.is_empty() {
            None
        } else {
            Some(ConjunctionScorer::new(required))
        };
        let optional = if optional.is_empty() {
            None
        } else {
            let min_match = if required.is_some() {
                1
            } else {
                self.min_should_match.max(1)
            };
            Some(DisjunctionSumScorer::new(optional, min_match))
        };
        Ok(Some(Box::new(BooleanScorer {
            required,
            required_count,
            optional,
            prohibited,
            coord,
            doc: -1,
            current_score: 0.0,
        })))
    }

    fn explain(&self, reader: &IndexReader, doc: DocId) -> Result<Explanation> {
        let mut sum = 0.0;
        let mut overlap = 0;
        let mut should_matches = 0;
        let mut has_must = false;
        let mut details = Vec::new();
        for (occur, weight) in &self.weights {
            let sub = weight.explain(reader, doc)?;
            match occur {
                Occur::Must => {
                    has_must = true;
                    if sub.value() <= 0.0 {
                        return Ok(Explanation::new(
                            0.0,
                            format!("no match on required clause in doc {doc}"),
                        ));
                    }
                    sum += sub.value();
                    overlap += 1;
                    details.push(sub);
                }
                Occur::Should => {
                    if sub.value() > 0.0 {
                        sum += sub.value();
                        overlap += 1;
                        should_matches += 1;
                        details.push(sub);
                    }
                }
                Occur::MustNot => {
                    if sub.value() > 0.0 {
                        return Ok(Explanation::new(
                            0.0,
                            format!("match on prohibited clause in doc {doc}"),
                        ));
                    }
                }
            }
        }
        if overlap == 0 || (!has_must && should_matches < self.min_should_match.max(1)) {
            return Ok(Explanation::new(0.0, format!("no match in doc {doc}")));
        }

        let mut sum_expl = Explanation::new(sum, "sum of:");
        for detail in details {
            sum_expl.add_detail(detail);
        }
        let coord_factor = self.coord_factor(overlap);
        if coord_factor == 1.0 {
            return Ok(sum_expl);
        }
        let mut result = Explanation::new(sum * coord_factor, "product of:");
        result.add_detail(sum_expl);
        result.add_detail(Explanation::new(
            coord_factor,
            format!("coord({overlap}/{})", self.max_coord),
        ));
        Ok(result)
    }
}

/// Drives the clause scorers: the MUST conjunction (when present) leads, SHOULD matches are
/// folded in per candidate, MUST_NOT scorers veto, and the coord factor scales the summed
/// score.
struct BooleanScorer {
    required: Option<ConjunctionScorer>,
    required_count: usize,
    optional: Option<DisjunctionSumScorer>,
    prohibited: Vec<Box<dyn Scorer>>,
    coord: Vec<f32>,
    doc: DocId,
    current_score: f32,
}

impl BooleanScorer {
    fn lead_next(&mut self) -> Result<DocId> {
        match (&mut self.required, &mut self.optional) {
            (Some(required), _) => required.next(),
            (None, Some(optional)) => optional.next(),
            (None, None) => Ok(NO_MORE_DOCS),
        }
    }

    fn lead_skip(&mut self, target: DocId) -> Result<DocId> {
        match (&mut self.required, &mut self.optional) {
            (Some(required), _) => required.skip_to(target),
            (None, Some(optional)) => optional.skip_to(target),
            (None, None) => Ok(NO_MORE_DOCS),
        }
    }

    fn excluded(&mut self, doc: DocId) -> Result<bool> {
        for scorer in &mut self.prohibited {
            if scorer.doc() < doc {
                scorer.skip_to(doc)?;
            }
            if scorer.doc() == doc {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Scores `candidate` if it survives the prohibited clauses. Returns `false` to move
    /// on to the next candidate.
    fn accept(&mut self, candidate: DocId) -> Result<bool> {
        if self.excluded(candidate)? {
            return Ok(false);
        }
        let required_count = self.required_count;
        let (score, overlap) = match (&mut self.required, &mut self.optional) {
            (Some(required), optional) => {
                let mut score = required.score()?;
                let mut overlap = required_count;
                if let Some(optional) = optional {
                    if optional.doc() < candidate {
                        optional.skip_to(candidate)?;
                    }
                    if optional.doc() == candidate {
                        score += optional.score()?;
                        overlap += optional.match_count();
                    }
                }
                (score, overlap)
            }
            (None, Some(optional)) => (optional.score()?, optional.match_count()),
            (None, None) => return Ok(false),
        };
        let coord = self.coord[overlap.min(self.coord.len() - 1)];
        self.current_score = score * coord;
        self.doc = candidate;
        Ok(true)
    }

    fn search_from(&mut self, mut candidate: DocId) -> Result<DocId> {
        loop {
            if candidate == NO_MORE_DOCS {
                self.doc = NO_MORE_DOCS;
                return Ok(NO_MORE_DOCS);
            }
            if self.accept(candidate)? {
                return Ok(candidate);
            }
            candidate = self.lead_next()?;
        }
    }
}

impl Scorer for BooleanScorer {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<DocId> {
        let candidate = self.lead_next()?;
        self.search_from(candidate)
    }

    fn skip_to(&mut self, target: DocId) -> Result<DocId> {
        if self.doc >= target {
            return Ok(self.doc);
        }
        let candidate = self.lead_skip(target)?;
        self.search_from(candidate)
    }

    fn score(&mut self) -> Result<f32> {
        Ok(self.current_score)
    }
}
