use {
    crate::search::DocId,
    std::{cmp::Ordering, collections::BinaryHeap},
};

/// One scored search hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub doc: DocId,
    pub score: f32,
}

/// The ranked result window of one search: the total number of matches, the highest score
/// over all matches, and the hits inside the requested window, by descending score with
/// ascending document id breaking ties.
#[derive(Clone, Debug, PartialEq)]
pub struct TopDocs {
    pub total_hits: usize,
    pub max_score: f32,
    pub hits: Vec<Hit>,
}

impl TopDocs {
    pub fn empty() -> Self {
        TopDocs {
            total_hits: 0,
            max_score: 0.0,
            hits: Vec::new(),
        }
    }
}

/// Orders hits so that "greater" means "ranks earlier": higher score first, smaller
/// document id on ties. Scores are finite by the scorer contract.
#[derive(Clone, Copy, Debug)]
struct RankedHit(Hit);

impl PartialEq for RankedHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedHit {}

impl PartialOrd for RankedHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedHit {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.score.partial_cmp(&other.0.score) {
            Some(Ordering::Equal) | None => other.0.doc.cmp(&self.0.doc),
            Some(ordering) => ordering,
        }
    }
}

/// A bounded collector keeping the `capacity` best hits seen so far.
pub(crate) struct HitQueue {
    heap: BinaryHeap<std::cmp::Reverse<RankedHit>>,
    capacity: usize,
}

impl HitQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        HitQueue {
            heap: BinaryHeap::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub(crate) fn insert(&mut self, hit: Hit) {
        if self.capacity == 0 {
            return;
        }
        self.heap.push(std::cmp::Reverse(RankedHit(hit)));
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    /// Drains into rank order (best first).
    pub(crate) fn into_ranked(self) -> Vec<Hit> {
        let mut hits: Vec<RankedHit> = self.heap.into_iter().map(|r| r.0).collect();
        hits.sort_by(|a, b| b.cmp(a));
        hits.into_iter().map(|r| r.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_keeps_best_with_stable_ties() {
        let mut queue = HitQueue::new(3);
        for hit in [
            Hit { doc: 5, score: 1.0 },
            Hit { doc: 2, score: 3.0 },
            Hit { doc: 9, score: 2.0 },
            Hit { doc: 1, score: 2.0 },
            Hit { doc: 0, score: 0.5 },
        ] {
            queue.insert(hit);
        }
        let ranked = queue.into_ranked();
        assert_eq!(
            ranked,
            vec![
                Hit { doc: 2, score: 3.0 },
                Hit { doc: 1, score: 2.0 },
                Hit { doc: 9, score: 2.0 },
            ]
        );
    }
}
