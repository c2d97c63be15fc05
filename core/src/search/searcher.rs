use {
    crate::{
        document::Document,
        index::IndexReader,
        search::{
            explanation::Explanation,
            filter::Filter,
            query::Query,
            similarity::Similarity,
            sort::Sort,
            top_docs::{Hit, HitQueue, TopDocs},
            DocId, Scorer, Weight, NO_MORE_DOCS,
        },
        store::Store,
        LodestoneError, Result,
    },
    std::sync::Arc,
};

/// The verdict of a [PostFilter] on one candidate hit.
pub enum PostFilterDecision {
    /// Keep the hit, scaling its score by the factor.
    Keep(f32),
    /// Drop the hit.
    Skip,
    /// Drop the hit and halt enumeration.
    Stop,
}

/// A per-hit predicate applied after scoring; it may rescore, reject, or stop the search.
pub trait PostFilter {
    fn filter(&self, doc: DocId, score: f32) -> PostFilterDecision;
}

impl<F> PostFilter for F
where
    F: Fn(DocId, f32) -> PostFilterDecision,
{
    fn filter(&self, doc: DocId, score: f32) -> PostFilterDecision {
        self(doc, score)
    }
}

/// Optional search parameters.
#[derive(Default)]
pub struct SearchOptions<'a> {
    pub filter: Option<&'a dyn Filter>,
    pub sort: Option<&'a Sort>,
    pub post_filter: Option<&'a dyn PostFilter>,
}

/// The search surface shared by [IndexSearcher] and
/// [crate::search::multi_searcher::MultiSearcher]. Weights draw their corpus statistics
/// (`doc_freq`, `max_doc`) from here, which is what keeps idf consistent when several
/// readers are searched as one.
pub trait Searchable {
    fn max_doc(&self) -> u32;

    fn doc_freq(&self, field: &str, term: &str) -> Result<usize>;

    fn similarity(&self) -> &Similarity;

    fn get_doc(&self, doc: DocId) -> Result<Document>;

    /// Rewrites a query against this searcher's readers until it is in scoring form.
    fn rewrite(&self, query: &Query) -> Result<Query>;

    /// Returns the top `num` hits after skipping `first`, ranked by descending score with
    /// ascending document id on ties, or by `options.sort` when given.
    fn search(
        &self,
        query: &Query,
        first: usize,
        num: usize,
        options: SearchOptions<'_>,
    ) -> Result<TopDocs>;

    /// Streams every matching document to `callback` in increasing document id order,
    /// without a ranking buffer. The callback returns `false` to stop.
    fn search_each(
        &self,
        query: &Query,
        filter: Option<&dyn Filter>,
        post_filter: Option<&dyn PostFilter>,
        callback: &mut dyn FnMut(DocId, f32) -> bool,
    ) -> Result<()>;

    /// Fills `buf` with up to `buf.len()` matching document ids at or past `offset`, in
    /// increasing order, and returns how many were written.
    fn search_unscored(&self, query: &Query, buf: &mut [DocId], offset: DocId) -> Result<usize>;

    /// Explains the score `query` produces for `doc`.
    fn explain(&self, query: &Query, doc: DocId) -> Result<Explanation>;
}

/// Rewrites, weighs and normalizes a query for one search.
pub(crate) fn prepare_weight(
    searcher: &dyn Searchable,
    query: &Query,
) -> Result<Box<dyn Weight>> {
    let rewritten = searcher.rewrite(query)?;
    let mut weight = rewritten.create_weight(searcher)?;
    let sum = weight.sum_of_squared_weights();
    let norm = searcher.similarity().query_norm(sum);
    weight.normalize(norm);
    Ok(weight)
}

/// Binds one reader to a similarity and runs queries against it.
pub struct IndexSearcher {
    reader: Arc<IndexReader>,
    similarity: Similarity,
}

impl IndexSearcher {
    pub fn new(reader: Arc<IndexReader>) -> Self {
        IndexSearcher {
            reader,
            similarity: Similarity::default(),
        }
    }

    /// Opens a reader over the store's current image and wraps it.
    pub fn open(store: &Store) -> Result<Self> {
        Ok(Self::new(Arc::new(IndexReader::open(store)?)))
    }

    pub fn reader(&self) -> &Arc<IndexReader> {
        &self.reader
    }

    /// Walks the query's scorer over this searcher's reader, applying filter and post
    /// filter, handing every surviving hit to `collect`. Returns early when either the
    /// post filter or the collector stops the run.
    fn collect_hits(
        &self,
        query: &Query,
        filter: Option<&dyn Filter>,
        post_filter: Option<&dyn PostFilter>,
        collect: &mut dyn FnMut(Hit) -> bool,
    ) -> Result<()> {
        let weight = prepare_weight(self, query)?;
        let mut scorer = match weight.scorer(&self.reader)? {
            Some(scorer) => scorer,
            None => return Ok(()),
        };
        let bits = match filter {
            Some(filter) => Some(filter.bits(&self.reader)?),
            None => None,
        };
        let mut doc = scorer.next()?;
        while doc != NO_MORE_DOCS {
            if let Some(bits) = &bits {
                let index = doc as usize;
                if index >= bits.len() || !bits[index] {
                    doc = scorer.next()?;
                    continue;
                }
            }
            let mut score = scorer.score()?;
            if let Some(post_filter) = post_filter {
                match post_filter.filter(doc, score) {
                    PostFilterDecision::Keep(factor) => score *= factor,
                    PostFilterDecision::Skip => {
                        doc = scorer.next()?;
                        continue;
                    }
                    PostFilterDecision::Stop => return Ok(()),
                }
            }
            if !collect(Hit { doc, score }) {
                return Ok(());
            }
            doc = scorer.next()?;
        }
        Ok(())
    }
}

impl Searchable for IndexSearcher {
    fn max_doc(&self) -> u32 {
        self.reader.max_doc()
    }

    fn doc_freq(&self, field: &str, term: &str) -> Result<usize> {
        Ok(self.reader.doc_freq(field, term))
    }

    fn similarity(&self) -> &Similarity {
        &self.similarity
    }

    fn get_doc(&self, doc: DocId) -> Result<Document> {
        self.reader.get_doc(doc)
    }

    fn rewrite(&self, query: &Query) -> Result<Query> {
        query.rewrite(&self.reader)
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
                self.collect_hits(query, options.filter, options.post_filter, &mut |hit| {
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
                let mut collected = Vec::new();
                self.collect_hits(query, options.filter, options.post_filter, &mut |hit| {
                    total_hits += 1;
                    max_score = max_score.max(hit.score);
                    collected.push(hit);
                    true
                })?;
                let mut keyed = Vec::with_capacity(collected.len());
                for hit in collected {
                    keyed.push((sort.keys(&self.reader, &hit)?, hit));
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
        self.collect_hits(query, filter, post_filter, &mut |hit| {
            callback(hit.doc, hit.score)
        })
    }

    fn search_unscored(&self, query: &Query, buf: &mut [DocId], offset: DocId) -> Result<usize> {
        let weight = prepare_weight(self, query)?;
        let mut scorer = match weight.scorer(&self.reader)? {
            Some(scorer) => scorer,
            None => return Ok(0),
        };
        let mut count = 0;
        let mut doc = scorer.skip_to(offset)?;
        while doc != NO_MORE_DOCS && count < buf.len() {
            buf[count] = doc;
            count += 1;
            doc = scorer.next()?;
        }
        Ok(count)
    }

    fn explain(&self, query: &Query, doc: DocId) -> Result<Explanation> {
        let weight = prepare_weight(self, query)?;
        weight.explain(&self.reader, doc)
    }
}
