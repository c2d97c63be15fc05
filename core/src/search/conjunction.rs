use {
    crate::{
        search::{DocId, Scorer, NO_MORE_DOCS},
        Result,
    },
};

/// Leapfrog intersection of several scorers: repeatedly advance everyone to the largest
/// current document until all sub-scorers agree. The score of an aligned document is the
/// sum of the sub-scores.
pub struct ConjunctionScorer {
    scorers: Vec<Box<dyn Scorer>>,
    doc: DocId,
}

impl ConjunctionScorer {
    /// `scorers` must be non-empty.
    pub fn new(scorers: Vec<Box<dyn Scorer>>) -> Self {
        debug_assert!(!scorers.is_empty());
        ConjunctionScorer { scorers, doc: -1 }
    }

    pub fn count(&self) -> usize {
        self.scorers.len()
    }

    fn align(&mut self) -> Result<DocId> {
        loop {
            let target = self
                .scorers
                .iter()
                .map(|s| s.doc())
                .max()
                .unwrap_or(NO_MORE_DOCS);
            if target == NO_MORE_DOCS {
                self.doc = NO_MORE_DOCS;
                return Ok(self.doc);
            }
            let mut overshot = false;
            for scorer in &mut self.scorers {
                if scorer.doc() < target {
                    let doc = scorer.skip_to(target)?;
                    if doc > target {
                        overshot = true;
                    }
                }
            }
            if !overshot {
                self.doc = target;
                return Ok(target);
            }
        }
    }
}

impl Scorer for ConjunctionScorer {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<DocId> {
        if self.doc == NO_MORE_DOCS {
            return Ok(NO_MORE_DOCS);
        }
        if self.doc == -1 {
            for scorer in &mut self.scorers {
                scorer.next()?;
            }
        } else {
            self.scorers[0].next()?;
        }
        self.align()
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
        self.align()
    }

    fn score(&mut self) -> Result<f32> {
        let mut sum = 0.0;
        for scorer in &mut self.scorers {
            sum += scorer.score()?;
        }
        Ok(sum)
    }
}
