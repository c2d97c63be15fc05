use crate::{
    search::{DocId, Scorer, NO_MORE_DOCS},
    Result,
};

/// Union of several scorers: visits every document matched by at least `min_match`
/// sub-scorers, in increasing order, scoring it with the sum of the matching sub-scores.
pub struct DisjunctionSumScorer {
    scorers: Vec<Box<dyn Scorer>>,
    min_match: usize,
    doc: DocId,
    score: f32,
    matchers: usize,
}

impl DisjunctionSumScorer {
    /// `scorers` must be non-empty; `min_match` is at least 1.
    pub fn new(scorers: Vec<Box<dyn Scorer>>, min_match: usize) -> Self {
        debug_assert!(!scorers.is_empty());
        DisjunctionSumScorer {
            scorers,
            min_match: min_match.max(1),
            doc: -1,
            score: 0.0,
            matchers: 0,
        }
    }

    /// How many sub-scorers match the current document.
    pub fn match_count(&self) -> usize {
        self.matchers
    }

    /// Positions on the smallest current document and caches its summed score and match
    /// count. Returns `false` when every sub-scorer is exhausted.
    fn evaluate(&mut self) -> Result<bool> {
        let min = self
            .scorers
            .iter()
            .map(|s| s.doc())
            .filter(|d| *d != NO_MORE_DOCS)
            .min();
        let min = match min {
            Some(doc) => doc,
            None => {
                self.doc = NO_MORE_DOCS;
                self.score = 0.0;
                self.matchers = 0;
                return Ok(false);
            }
        };
        self.doc = min;
        self.score = 0.0;
        self.matchers = 0;
        for scorer in &mut self.scorers {
            if scorer.doc() == min {
                self.score += scorer.score()?;
                self.matchers += 1;
            }
        }
        Ok(true)
    }

    fn advance_matchers(&mut self) -> Result<()> {
        if self.doc == -1 {
            for scorer in &mut self.scorers {
                scorer.next()?;
            }
        } else {
            let doc = self.doc;
            for scorer in &mut self.scorers {
                if scorer.doc() == doc {
                    scorer.next()?;
                }
            }
        }
        Ok(())
    }
}

impl Scorer for DisjunctionSumScorer {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<DocId> {
        if self.doc == NO_MORE_DOCS {
            return Ok(NO_MORE_DOCS);
        }
        loop {
            self.advance_matchers()?;
            if !self.evaluate()? {
                return Ok(NO_MORE_DOCS);
            }
            if self.matchers >= self.min_match {
                return Ok(self.doc);
            }
        }
    }

    fn skip_to(&mut self, target: DocId) -> Result<DocId> {
        if self.doc >= target {
            return Ok(self.doc);
        }
        for scorer in &mut self.scorers {
            if scorer.doc() < target {
                scorer.skip_to(target)?;
            }
        }
        loop {
            if !self.evaluate()? {
                return Ok(NO_MORE_DOCS);
            }
            if self.matchers >= self.min_match {
                return Ok(self.doc);
            }
            self.advance_matchers()?;
        }
    }

    fn score(&mut self) -> Result<f32> {
        Ok(self.score)
    }
}
