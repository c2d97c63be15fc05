use {
    crate::{
        index::{IndexReader, PostingsIterator, SegmentPostings, UnionPostings},
        search::{
            explanation::Explanation,
            multi_term_query::MultiTermQuery,
            query::Query,
            searcher::Searchable,
            similarity::{decode_norm, Similarity},
            term_query::TermQuery,
            DocId, Scorer, Weight, NO_MORE_DOCS,
        },
        util::fmt_float,
        LodestoneError, Result,
    },
    std::{
        hash::{Hash, Hasher},
        sync::Arc,
    },
};

/// One slot of a phrase: the alternatives accepted at this position (one term for a plain
/// phrase, several for a multi-phrase) and the position itself. Relative positions may be
/// negative and several slots may share a position; both must align for the phrase to
/// match.
#[derive(Clone, Debug, PartialEq)]
pub struct PhrasePosition {
    pub terms: Vec<String>,
    pub pos: i32,
}

/// Matches documents where the slot terms occur at their relative positions, exactly for
/// `slop == 0` or within `slop` total moves otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct PhraseQuery {
    pub(crate) field: String,
    pub(crate) positions: Vec<PhrasePosition>,
    pub(crate) slop: u32,
    pub boost: f32,
}

impl PhraseQuery {
    pub fn new(field: impl Into<String>) -> Self {
        PhraseQuery {
            field: field.into(),
            positions: Vec::new(),
            slop: 0,
            boost: 1.0,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn slop(&self) -> u32 {
        self.slop
    }

    pub fn set_slop(&mut self, slop: u32) {
        self.slop = slop;
    }

    pub fn positions(&self) -> &[PhrasePosition] {
        &self.positions
    }

    /// Adds a term at `pos_inc` positions after the most recently added slot. The first
    /// slot lands at position 0. A `pos_inc` of 0 stacks a slot onto the previous
    /// position; negative increments step backwards.
    pub fn add_term(&mut self, term: impl Into<String>, pos_inc: i32) {
        let pos = self
            .positions
            .last()
            .map_or(0, |last| last.pos + pos_inc);
        self.add_term_at(term, pos);
    }

    /// Adds a term at an absolute position.
    pub fn add_term_at(&mut self, term: impl Into<String>, position: i32) {
        self.positions.push(PhrasePosition {
            terms: vec![term.into()],
            pos: position,
        });
    }

    /// Adds an alternative to the most recently added slot.
    pub fn append_multi_term(&mut self, term: impl Into<String>) -> Result<()> {
        match self.positions.last_mut() {
            Some(position) => {
                position.terms.push(term.into());
                Ok(())
            }
            None => Err(LodestoneError::Argument(
                "cannot append an alternative to an empty phrase".to_string(),
            )),
        }
    }

    fn sorted_positions(&self) -> Vec<PhrasePosition> {
        let mut sorted = self.positions.clone();
        sorted.sort_by(|a, b| a.pos.cmp(&b.pos).then_with(|| a.terms[0].cmp(&b.terms[0])));
        sorted
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        let mut inner = String::new();
        let sorted = self.sorted_positions();
        let mut last_pos = sorted.first().map_or(0, |p| p.pos);
        for (i, position) in sorted.iter().enumerate() {
            if i > 0 {
                if position.pos == last_pos {
                    inner.push('&');
                } else {
                    inner.push(' ');
                    for _ in (last_pos + 1)..position.pos {
                        inner.push_str("<> ");
                    }
                }
            }
            inner.push_str(&position.terms.join("|"));
            last_pos = position.pos;
        }
        let mut s = if self.field == default_field {
            format!("\"{inner}\"")
        } else {
            format!("{}:\"{inner}\"", self.field)
        };
        if self.slop > 0 {
            s.push('~');
            s.push_str(&self.slop.to_string());
        }
        if self.boost != 1.0 {
            s.push('^');
            s.push_str(&fmt_float(self.boost));
        }
        s
    }

    /// A phrase with a single slot collapses to a term query (one alternative) or a
    /// multi-term query (several alternatives).
    pub(crate) fn rewrite(&self, _reader: &IndexReader) -> Result<Query> {
        if self.positions.len() == 1 {
            let position = &self.positions[0];
            if position.terms.len() == 1 {
                let mut term = TermQuery::new(&self.field, &position.terms[0]);
                term.boost = self.boost;
                return Ok(Query::Term(term));
            }
            let mut multi = MultiTermQuery::new(&self.field);
            for term in &position.terms {
                multi.add_term(term);
            }
            multi.boost = self.boost;
            return Ok(Query::MultiTerm(multi));
        }
        Ok(Query::Phrase(self.clone()))
    }
}

impl Hash for PhraseQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
        self.slop.hash(state);
        self.boost.to_bits().hash(state);
        state.write_usize(self.positions.len());
        for position in &self.positions {
            position.pos.hash(state);
            position.terms.hash(state);
        }
    }
}

pub(crate) struct PhraseWeight {
    field: String,
    positions: Vec<PhrasePosition>,
    slop: u32,
    boost: f32,
    similarity: Similarity,
    idf: f32,
    query_weight: f32,
    query_norm: f32,
    value: f32,
}

impl PhraseWeight {
    pub(crate) fn new(query: &PhraseQuery, searcher: &dyn Searchable) -> Result<Self> {
        let similarity = *searcher.similarity();
        let idf = similarity.idf_phrase(&query.field, &query.positions, searcher)?;
        Ok(PhraseWeight {
            field: query.field.clone(),
            positions: query.sorted_positions(),
            slop: query.slop,
            boost: query.boost,
            similarity,
            idf,
            query_weight: 0.0,
            query_norm: 1.0,
            value: 0.0,
        })
    }

    fn make_scorer(&self, reader: &IndexReader) -> Result<Option<PhraseScorer>> {
        if self.positions.is_empty() {
            return Ok(None);
        }
        let mut positions = Vec::with_capacity(self.positions.len());
        for slot in &self.positions {
            let postings: Box<dyn PostingsIterator> = if slot.terms.len() == 1 {
                match reader.term_docs_for(&self.field, &slot.terms[0]) {
                    Some(postings) => Box::new(postings),
                    None => return Ok(None),
                }
            } else {
                let subs: Vec<SegmentPostings> = slot
                    .terms
                    .iter()
                    .filter_map(|term| reader.term_docs_for(&self.field, term))
                    .collect();
                if subs.is_empty() {
                    return Ok(None);
                }
                Box::new(UnionPostings::new(subs))
            };
            positions.push(PhrasePos {
                postings,
                offset: slot.pos,
                index: 0,
                position: 0,
            });
        }
        Ok(Some(PhraseScorer {
            positions,
            slop: self.slop,
            value: self.value,
            norms: reader.norms(&self.field),
            similarity: self.similarity,
            doc: -1,
            freq: 0.0,
        }))
    }

    fn phrase_text(&self) -> String {
        self.positions
            .iter()
            .map(|p| p.terms.join("|"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Weight for PhraseWeight {
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
            .make_scorer(reader)?
            .map(|s| Box::new(s) as Box<dyn Scorer>))
    }

    fn explain(&self, reader: &IndexReader, doc: DocId) -> Result<Explanation> {
        let freq = match self.make_scorer(reader)? {
            Some(mut scorer) => {
                if scorer.skip_to(doc)? == doc {
                    scorer.freq
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        let text = self.phrase_text();
        if freq == 0.0 {
            return Ok(Explanation::new(
                0.0,
                format!("no match for {}:\"{text}\" in doc {doc}", self.field),
            ));
        }

        let mut query_expl = Explanation::new(
            self.query_weight,
            format!("query_weight({}:\"{text}\"), product of:", self.field),
        );
        if self.boost != 1.0 {
            query_expl.add_detail(Explanation::new(self.boost, "boost"));
        }
        query_expl.add_detail(Explanation::new(self.idf, format!("idf({})", self.field)));
        query_expl.add_detail(Explanation::new(self.query_norm, "query_norm"));

        let tf = self.similarity.tf(freq);
        let norm = reader.norms(&self.field).map_or(1.0, |norms| {
            decode_norm(norms.get(doc as usize).copied().unwrap_or(0))
        });
        let mut field_expl = Explanation::new(
            tf * self.idf * norm,
            format!("field_weight({}:\"{text}\" in {doc}), product of:", self.field),
        );
        field_expl.add_detail(Explanation::new(tf, format!("tf(phrase_freq={})", fmt_float(freq))));
        field_expl.add_detail(Explanation::new(self.idf, format!("idf({})", self.field)));
        field_expl.add_detail(Explanation::new(norm, format!("field_norm(doc={doc})")));

        let mut result = Explanation::new(
            query_expl.value() * field_expl.value(),
            format!("weight({}:\"{text}\" in {doc}), product of:", self.field),
        );
        result.add_detail(query_expl);
        result.add_detail(field_expl);
        Ok(result)
    }
}

/// One slot's postings cursor plus the in-document position iterator. Positions are
/// adjusted by the slot offset so that a phrase match shows as equal adjusted positions
/// across all slots.
struct PhrasePos {
    postings: Box<dyn PostingsIterator>,
    offset: i32,
    index: usize,
    position: i32,
}

impl PhrasePos {
    fn first_position(&mut self) -> bool {
        self.index = 0;
        self.next_position()
    }

    fn next_position(&mut self) -> bool {
        let positions = self.postings.positions();
        if self.index < positions.len() {
            self.position = positions[self.index] - self.offset;
            self.index += 1;
            true
        } else {
            false
        }
    }
}

/// Intersects the slot postings on documents, then checks positional alignment. Exact
/// phrases count occurrences where every slot agrees; sloppy phrases use the
/// minimum-window walk, adding `sloppy_freq(distance)` per window within the slop.
struct PhraseScorer {
    positions: Vec<PhrasePos>,
    slop: u32,
    value: f32,
    norms: Option<Arc<Vec<u8>>>,
    similarity: Similarity,
    doc: DocId,
    freq: f32,
}

impl PhraseScorer {
    fn align_and_match(&mut self) -> Result<DocId> {
        loop {
            // leapfrog the slot cursors onto one document
            let target = loop {
                let target = self
                    .positions
                    .iter()
                    .map(|p| p.postings.doc())
                    .max()
                    .unwrap_or(NO_MORE_DOCS);
                if target == NO_MORE_DOCS {
                    self.doc = NO_MORE_DOCS;
                    return Ok(NO_MORE_DOCS);
                }
                let mut overshot = false;
                for slot in &mut self.positions {
                    if slot.postings.doc() < target {
                        if !slot.postings.skip_to(target)? {
                            self.doc = NO_MORE_DOCS;
                            return Ok(NO_MORE_DOCS);
                        }
                        if slot.postings.doc() > target {
                            overshot = true;
                        }
                    }
                }
                if !overshot {
                    break target;
                }
            };

            let freq = if self.slop == 0 {
                self.exact_freq()
            } else {
                self.sloppy_freq()
            };
            if freq > 0.0 {
                self.doc = target;
                self.freq = freq;
                return Ok(target);
            }
            if !self.positions[0].postings.next()? {
                self.doc = NO_MORE_DOCS;
                return Ok(NO_MORE_DOCS);
            }
        }
    }

    fn exact_freq(&mut self) -> f32 {
        for slot in &mut self.positions {
            if !slot.first_position() {
                return 0.0;
            }
        }
        let mut freq = 0.0;
        'outer: loop {
            loop {
                let target = self
                    .positions
                    .iter()
                    .map(|p| p.position)
                    .max()
                    .unwrap_or(i32::MIN);
                let mut moved = false;
                for slot in &mut self.positions {
                    while slot.position < target {
                        if !slot.next_position() {
                            break 'outer;
                        }
                    }
                    if slot.position > target {
                        moved = true;
                    }
                }
                if !moved {
                    break;
                }
            }
            freq += 1.0;
            if !self.positions[0].next_position() {
                break;
            }
        }
        freq
    }

    fn sloppy_freq(&mut self) -> f32 {
        let slop = self.slop as i32;
        let mut end = i32::MIN;
        for slot in &mut self.positions {
            if !slot.first_position() {
                return 0.0;
            }
            if slot.position > end {
                end = slot.position;
            }
        }
        if self.positions.len() == 1 {
            // a single slot always aligns; every occurrence is an exact window
            let count = 1 + self.positions[0].postings.positions().len() - self.positions[0].index;
            return count as f32;
        }

        let mut freq = 0.0;
        let mut done = false;
        while !done {
            let min_index = self
                .positions
                .iter()
                .enumerate()
                .min_by_key(|(_, p)| p.position)
                .map(|(i, _)| i)
                .unwrap();
            let next = self
                .positions
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != min_index)
                .map(|(_, p)| p.position)
                .min()
                .unwrap();
            let mut start = self.positions[min_index].position;
            let mut pos = start;
            loop {
                start = pos;
                if !self.positions[min_index].next_position() {
                    done = true;
                    break;
                }
                pos = self.positions[min_index].position;
                if pos > next {
                    break;
                }
            }
            let match_length = end - start;
            if match_length <= slop {
                freq += self.similarity.sloppy_freq(match_length);
            }
            if self.positions[min_index].position > end {
                end = self.positions[min_index].position;
            }
        }
        freq
    }

    fn norm(&self, doc: DocId) -> f32 {
        match &self.norms {
            Some(norms) => decode_norm(norms.get(doc as usize).copied().unwrap_or(0)),
            None => 1.0,
        }
    }
}

impl Scorer for PhraseScorer {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<DocId> {
        if self.doc == NO_MORE_DOCS {
            return Ok(NO_MORE_DOCS);
        }
        if self.doc == -1 {
            for slot in &mut self.positions {
                if !slot.postings.next()? {
                    self.doc = NO_MORE_DOCS;
                    return Ok(NO_MORE_DOCS);
                }
            }
        } else if !self.positions[0].postings.next()? {
            self.doc = NO_MORE_DOCS;
            return Ok(NO_MORE_DOCS);
        }
        self.align_and_match()
    }

    fn skip_to(&mut self, target: DocId) -> Result<DocId> {
        if self.doc >= target {
            return Ok(self.doc);
        }
        for slot in &mut self.positions {
            if slot.postings.doc() < target && !slot.postings.skip_to(target)? {
                self.doc = NO_MORE_DOCS;
                return Ok(NO_MORE_DOCS);
            }
        }
        self.align_and_match()
    }

    fn score(&mut self) -> Result<f32> {
        Ok(self.similarity.tf(self.freq) * self.value * self.norm(self.doc))
    }
}
