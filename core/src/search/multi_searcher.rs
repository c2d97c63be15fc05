use {
    crate::{
        document::Document,
        search::{
            explanation::Explanation,
            filter::Filter,
            query::Query,
            searcher::{
                prepare_weight, IndexSearcher, PostFilter, PostFilterDecision, SearchOptions,
                Searchable,
            },
            similarity::Similarity,
            top_docs::{Hit, HitQueue, TopDocs},
            DocId, Scorer, Weight, NO_MORE_DOCS,
        },
        LodestoneError, Result,
    },
};

/// Presents an ordered set of sub-searchers as one searcher.
///
/// Global document ids are the sub-searcher's local ids offset by the sum of the earlier
/// readers' `max_doc`. Document frequencies are summed over all subs before weighting, so
/// idf is consistent with searching one merged index; rewriting combines the per-sub
/// rewrites into one equivalent query.
pub struct MultiSearcher {
    searchers: Vec<IndexSearcher>,
    starts: Vec<DocId>,
    max_doc: u32,
    similarity: Similarity,
}

impl MultiSearcher {
    pub fn new(searchers: Vec<IndexSearcher>) -> Self {
        let mut starts = Vec::with_capacity(searchers.len());
        let mut max_doc = 0;
        for searcher in &searchers {
            starts.push(max_doc as DocId);
            max_doc += searcher.max_doc();
        }
        MultiSearcher {
            searchers,
            starts,
            max_doc,
            similarity: Similarity::default(),
        }
    }

    pub fn searchers(&self) -> &[IndexSearcher] {
        &self.searchers
    }

    /// The sub-searcher holding the global `doc`.
    fn subsearcher(&self, doc: DocId) -> Result<usize> {
        if doc < 0 || doc as u32 >= self.max_doc {
            return Err(LodestoneError::State(format!(
                "doc {doc} is out of range (max_doc = {})",
                self.max_doc
            )));
        }
        Ok(self.starts.partition_point(|start| *start <= doc) - 1)
    }

    /// Streams hits of every sub in order, with global document ids.
    fn collect_hits(
        &self,
        query: &Query,
        filter: Option<&dyn Filter>,
        post_filter: Option<&dyn PostFilter>,
        collect: &mut dyn FnMut(usize, Hit) -> bool,
    ) -> Result<()> {
        let weight = prepare_weight(self, query)?;
        for (index, searcher) in self.searchers.iter().enumerate() {
            let start = self.starts[index];
            let mut scorer = match weight.scorer(searcher.reader())? {
                Some(scorer) => scorer,
                None => continue,
            };
            let bits = match filter {
                Some(filter) => Some(filter.bits(searcher.reader())?),
                None => None,
            };
            let mut doc = scorer.next()?;
            while doc != NO_MORE_DOCS {
                if let Some(bits) = &bits {
                    let local = doc as usize;
                    if local >= bits.len() || !bits[local] {
                        doc = scorer.next()?;
                        continue;
                    }
                }
                let global = doc + start;
                let mut score = scorer.score()?;
                if let Some(post_filter) = post_filter {
                    match post_filter.filter(global, score) {
                        PostFilterDecision::Keep(factor) => score *= factor,
                        PostFilterDecision::Skip => {
                            doc = scorer.next()?;
                            continue;
                        }
                        PostFilterDecision::Stop => return Ok(()),
                    }
                }
                if !collect(index, Hit { doc: global, score }) {
                    return Ok(());
                }
                doc = scorer.next()?;
            }
        }
        Ok(())
    }
}

impl Searchable for MultiSearcher {
    fn max_doc(&self) -> u32 {
        self.max_doc
    }

    fn doc_freq(&self, field: &str, term: &str) -> Result<usize> {
        let mut sum = 0;
        for searcher in &self.searchers {
            sum += searcher.doc_freq(field, term)?;
        }
        Ok(sum)
    }

    fn similarity(&self) -> &Similarity {
        &self.similarity
    }

    fn get_doc(&self, doc: DocId) -> Result<Document> {
        let index = self.subsearcher(doc)?;
        self.searchers[index].get_doc(doc - self.starts[index])
    }

    fn rewrite(&self, query: &Query) -> Result<Query> {
        let mut rewritten = Vec::with_capacity(self.searchers.len());
        for searcher in &self.searchers {
            rewritten.push(searcher.rewrite(query)?);
        }
        Ok(Query::combine(&rewritten))
    }

    fn search(
        &self,
        query: &Query,
        first: usize,
        num: usize,
        options: SearchOptions<'_>,
    ) -> Result<TopDocs> {
        if num == 0 {
            return Err(LodestoneError::Argument(
                "search window must hold at least one hit".to_string(),
            ));
        }
        let mut total_hits = 0;
        let mut max_score = 0.0f32;

        match options.sort {
            None => {
                let mut queue = HitQueue::new(first + num);
                self.collect_hits(query, options.filter, options.post_filter, &mut |_, hit| {
                    total_hits += 1;
                    max_score = max_score.max(hit.score);
                    queue.insert(hit);
                    true
                })?;
                Ok(TopDocs {
                    total_hits,
                    max_score,
                    hits: queue.into_ranked().into_iter().skip(first).take(num).collect(),
                })
            }
            Some(sort) => {
                let mut keyed = Vec::new();
                let mut failure = None;
                self.collect_hits(query, options.filter, options.post_filter, &mut |index, hit| {
                    total_hits += 1;
                    max_score = max_score.max(hit.score);
                    let local = Hit {
                        doc: hit.doc - self.starts[index],
                        score: hit.score,
                    };
                    match sort.keys(self.searchers[index].reader(), &local) {
                        Ok(keys) => {
                            keyed.push((keys, hit));
                            true
                        }
                        Err(e) => {
                            failure = Some(e);
                            false
                        }
                    }
                })?;
                if let Some(e) = failure {
                    return Err(e);
                }
                keyed.sort_by(|a, b| sort.compare(&a.0, &b.0).then_with(|| a.1.doc.cmp(&b.1.doc)));
                Ok(TopDocs {
                    total_hits,
                    max_score,
                    hits: keyed
                        .into_iter()
                        .map(|(_, hit)| hit)
                        .skip(first)
                        .take(num)
                        .collect(),
                })
            }
        }
    }

    fn search_each(
        &self,
        query: &Query,
        filter: Option<&dyn Filter>,
        post_filter: Option<&dyn PostFilter>,
        callback: &mut dyn FnMut(DocId, f32) -> bool,
    ) -> Result<()> {
        self.collect_hits(query, filter, post_filter, &mut |_, hit| {
            callback(hit.doc, hit.score)
        })
    }

    fn search_unscored(&self, query: &Query, buf: &mut [DocId], offset: DocId) -> Result<usize> {
        let weight = prepare_weight(self, query)?;
        let mut count = 0;
        for (index, searcher) in self.searchers.iter().enumerate() {
            if count >= buf.len() {
                break;
            }
            let start = self.starts[index];
            let mut scorer = match weight.scorer(searcher.reader())? {
                Some(scorer) => scorer,
                None => continue,
            };
            let local_offset = (offset - start).max(0);
            let mut doc = scorer.skip_to(local_offset)?;
            while doc != NO_MORE_DOCS && count < buf.len() {
                buf[count] = doc + start;
                count += 1;
                doc = scorer.next()?;
            }
        }
        Ok(count)
    }

    fn explain(&self, query: &Query, doc: DocId) -> Result<Explanation> {
        let weight = prepare_weight(self, query)?;
        let index = self.subsearcher(doc)?;
        weight.explain(self.searchers[index].reader(), doc - self.starts[index])
    }
}
