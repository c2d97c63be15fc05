use {
    crate::{
        analysis::{Analyzer, WhitespaceAnalyzer},
        document::{DocField, Document},
        search::{
            BooleanQuery, Explanation, Filter, IndexSearcher, Occur, PostFilter, Query,
            SearchOptions, Searchable, TermQuery, TopDocs,
        },
        store::Store,
        LodestoneError, Result,
    },
    log::debug,
    parking_lot::Mutex,
    std::sync::Arc,
};

mod field_infos;
mod postings;
mod reader;
mod segment;
mod writer;

pub use {field_infos::*, postings::*, reader::*, segment::*, writer::*};

use crate::search::DocId;

/// Configuration of an [Index] façade.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Commit after every mutating operation instead of deferring to [Index::flush].
    pub auto_flush: bool,
    /// Validate reader freshness against the store generation on every read.
    pub check_latest: bool,
    /// Fields forming the document key for upserts. A single key field uses a writer-side
    /// delete-by-term; several key fields run a conjunction query and require at most one
    /// hit.
    pub key_fields: Option<Vec<String>>,
    /// The field used by [Index::get_doc_by_id] and [Index::delete_id].
    pub id_field: String,
    /// The field [Index::add_string] indexes bare strings under.
    pub default_field: String,
    pub use_compound_file: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            auto_flush: false,
            check_latest: true,
            key_fields: None,
            id_field: "id".to_string(),
            default_field: "id".to_string(),
            use_compound_file: true,
        }
    }
}

struct IndexInner {
    store: Store,
    analyzer: Arc<dyn Analyzer>,
    config: IndexConfig,
    reader: Option<Arc<IndexReader>>,
    writer: Option<IndexWriter>,
    searcher: Option<IndexSearcher>,
    has_writes: bool,
    closed: bool,
}

/// The convenience façade over a store: a mutex-guarded state machine that switches
/// between the reader, writer and searcher roles as operations demand, applying keyed
/// upserts, deletions and the auto-flush policy.
///
/// At most one role is open at a time (the searcher shares the reader). Opening the writer
/// closes reader and searcher; opening the reader commits and closes the writer; when
/// `check_latest` is set a stale reader is reopened before use.
pub struct Index {
    inner: Mutex<IndexInner>,
}

impl Index {
    /// Creates a façade over `store`, or over a fresh RAM store when none is given.
    /// `create` resets an existing store to empty.
    pub fn new(
        store: Option<Store>,
        analyzer: Option<Arc<dyn Analyzer>>,
        config: IndexConfig,
        create: bool,
    ) -> Self {
        let store = match store {
            Some(store) => {
                if create {
                    store.reset();
                }
                store
            }
            None => Store::open_ram(),
        };
        Index {
            inner: Mutex::new(IndexInner {
                store,
                analyzer: analyzer.unwrap_or_else(|| Arc::new(WhitespaceAnalyzer)),
                config,
                reader: None,
                writer: None,
                searcher: None,
                has_writes: false,
                closed: false,
            }),
        }
    }

    /// The number of live documents.
    pub fn size(&self) -> Result<u32> {
        let mut inner = self.lock()?;
        inner.ensure_reader()?;
        Ok(inner.reader.as_ref().unwrap().num_docs())
    }

    pub fn has_deletions(&self) -> Result<bool> {
        let mut inner = self.lock()?;
        inner.ensure_reader()?;
        Ok(inner.reader.as_ref().unwrap().has_deletions())
    }

    pub fn is_deleted(&self, doc: DocId) -> Result<bool> {
        let mut inner = self.lock()?;
        inner.ensure_reader()?;
        Ok(inner.reader.as_ref().unwrap().is_deleted(doc))
    }

    /// Adds a document, honoring the configured key fields: an existing document with the
    /// same key is replaced, and an ambiguous key (several existing matches) is an
    /// argument error.
    pub fn add_doc(&self, doc: &Document) -> Result<()> {
        let mut inner = self.lock()?;
        inner.add_doc(doc)
    }

    /// Adds a bare string as a document with one value in the default field.
    pub fn add_string(&self, value: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let mut doc = Document::new();
        doc.add_field(DocField::new(inner.config.default_field.clone()).add_data(value));
        inner.add_doc(&doc)
    }

    /// Adds a document analyzed with `analyzer` instead of the index's own.
    pub fn add_doc_with_analyzer(&self, doc: &Document, analyzer: Arc<dyn Analyzer>) -> Result<()> {
        let mut inner = self.lock()?;
        let previous = inner.analyzer.clone();
        inner.analyzer = analyzer;
        let result = inner.add_doc(doc);
        inner.analyzer = previous;
        result
    }

    /// Swaps the analyzer; an open writer is rebound immediately.
    pub fn set_analyzer(&self, analyzer: Arc<dyn Analyzer>) -> Result<()> {
        let mut inner = self.lock()?;
        inner.analyzer = analyzer.clone();
        if let Some(writer) = inner.writer.as_mut() {
            writer.set_analyzer(analyzer);
        }
        Ok(())
    }

    pub fn search(
        &self,
        query: &Query,
        first: usize,
        num: usize,
        options: SearchOptions<'_>,
    ) -> Result<TopDocs> {
        let mut inner = self.lock()?;
        inner.ensure_searcher()?;
        inner.searcher.as_ref().unwrap().search(query, first, num, options)
    }

    pub fn search_each(
        &self,
        query: &Query,
        filter: Option<&dyn Filter>,
        post_filter: Option<&dyn PostFilter>,
        callback: &mut dyn FnMut(DocId, f32) -> bool,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        inner.ensure_searcher()?;
        inner
            .searcher
            .as_ref()
            .unwrap()
            .search_each(query, filter, post_filter, callback)
    }

    pub fn explain(&self, query: &Query, doc: DocId) -> Result<Explanation> {
        let mut inner = self.lock()?;
        inner.ensure_searcher()?;
        inner.searcher.as_ref().unwrap().explain(query, doc)
    }

    pub fn get_doc(&self, doc: DocId) -> Result<Document> {
        let mut inner = self.lock()?;
        inner.ensure_reader()?;
        inner.reader.as_ref().unwrap().get_doc(doc)
    }

    /// The first document containing `(field, term)`, if any.
    pub fn get_doc_by_term(&self, field: &str, term: &str) -> Result<Option<Document>> {
        let mut inner = self.lock()?;
        inner.ensure_reader()?;
        let reader = inner.reader.as_ref().unwrap();
        let doc = match reader.term_docs_for(field, term) {
            Some(mut postings) => {
                if postings.next()? {
                    Some(reader.get_doc(postings.doc())?)
                } else {
                    None
                }
            }
            None => None,
        };
        Ok(doc)
    }

    pub fn get_doc_by_id(&self, id: &str) -> Result<Option<Document>> {
        let id_field = self.lock()?.config.id_field.clone();
        self.get_doc_by_term(&id_field, id)
    }

    /// Deletes one document by id.
    pub fn delete(&self, doc: DocId) -> Result<()> {
        let mut inner = self.lock()?;
        inner.ensure_reader()?;
        inner.reader.as_ref().unwrap().delete_doc(doc)?;
        inner.auto_flush_reader()
    }

    /// Deletes every document containing `(field, term)`.
    pub fn delete_term(&self, field: &str, term: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.reader.is_some() {
            let reader = inner.reader.as_ref().unwrap().clone();
            let docs = collect_term_docs(&reader, field, term)?;
            for doc in docs {
                reader.delete_doc(doc)?;
            }
            inner.auto_flush_reader()
        } else {
            inner.ensure_writer()?;
            inner.writer.as_mut().unwrap().delete_term(field, term)?;
            inner.auto_flush_writer()
        }
    }

    pub fn delete_id(&self, id: &str) -> Result<()> {
        let id_field = self.lock()?.config.id_field.clone();
        self.delete_term(&id_field, id)
    }

    /// Deletes every document matching `query`. Matching document ids are buffered before
    /// the first deletion so enumeration never observes its own effects.
    pub fn delete_query(
        &self,
        query: &Query,
        filter: Option<&dyn Filter>,
        post_filter: Option<&dyn PostFilter>,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        inner.ensure_searcher()?;
        let mut docs = Vec::new();
        inner
            .searcher
            .as_ref()
            .unwrap()
            .search_each(query, filter, post_filter, &mut |doc, _score| {
                docs.push(doc);
                true
            })?;
        let reader = inner.reader.as_ref().unwrap().clone();
        for doc in docs {
            reader.delete_doc(doc)?;
        }
        inner.auto_flush_reader()
    }

    /// Merges away deleted documents and compacts document ids.
    pub fn optimize(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.ensure_writer()?;
        inner.writer.as_mut().unwrap().optimize()?;
        inner.auto_flush_writer()
    }

    /// Commits whichever role holds pending changes.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.flush()
    }

    /// Whether the open reader (if any) still matches the store generation.
    pub fn is_latest(&self) -> Result<bool> {
        let mut inner = self.lock()?;
        inner.ensure_reader()?;
        Ok(inner.reader.as_ref().unwrap().is_latest())
    }

    /// Flushes and closes the façade; every operation afterwards is a state error.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.flush()?;
        inner.close_reader()?;
        if let Some(mut writer) = inner.writer.take() {
            writer.close()?;
        }
        inner.closed = true;
        Ok(())
    }

    fn lock(&self) -> Result<parking_lot::MutexGuard<'_, IndexInner>> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(LodestoneError::State("index is closed".to_string()));
        }
        Ok(inner)
    }
}

fn collect_term_docs(reader: &IndexReader, field: &str, term: &str) -> Result<Vec<DocId>> {
    let mut docs = Vec::new();
    if let Some(mut postings) = reader.term_docs_for(field, term) {
        while postings.next()? {
            docs.push(postings.doc());
        }
    }
    Ok(docs)
}

impl IndexInner {
    fn close_reader(&mut self) -> Result<()> {
        self.searcher = None;
        if let Some(reader) = self.reader.take() {
            reader.close()?;
        }
        Ok(())
    }

    fn ensure_reader(&mut self) -> Result<()> {
        if let Some(reader) = &self.reader {
            if self.config.check_latest && !reader.is_latest() {
                debug!("reader is stale, reopening");
                self.close_reader()?;
                self.reader = Some(Arc::new(IndexReader::open(&self.store)?));
            }
            return Ok(());
        }
        if let Some(mut writer) = self.writer.take() {
            writer.close()?;
        }
        debug!("opening reader");
        self.reader = Some(Arc::new(IndexReader::open(&self.store)?));
        Ok(())
    }

    fn ensure_writer(&mut self) -> Result<()> {
        if self.writer.is_none() {
            self.close_reader()?;
            debug!("opening writer");
            let mut writer = IndexWriter::open(&self.store, self.analyzer.clone())?;
            writer.config.use_compound_file = self.config.use_compound_file;
            self.writer = Some(writer);
        } else {
            // rebind the analyzer in case it was swapped since the writer opened
            let analyzer = self.analyzer.clone();
            let writer = self.writer.as_mut().unwrap();
            if !Arc::ptr_eq(&writer.analyzer(), &analyzer) {
                writer.set_analyzer(analyzer);
            }
        }
        Ok(())
    }

    fn ensure_searcher(&mut self) -> Result<()> {
        self.ensure_reader()?;
        if self.searcher.is_none() {
            self.searcher = Some(IndexSearcher::new(self.reader.as_ref().unwrap().clone()));
        }
        Ok(())
    }

    fn auto_flush_reader(&mut self) -> Result<()> {
        if self.config.auto_flush {
            self.reader.as_ref().unwrap().commit()
        } else {
            self.has_writes = true;
            Ok(())
        }
    }

    fn auto_flush_writer(&mut self) -> Result<()> {
        if self.config.auto_flush {
            if let Some(mut writer) = self.writer.take() {
                writer.close()?;
            }
            Ok(())
        } else {
            self.has_writes = true;
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<()> {
        if !self.has_writes {
            return Ok(());
        }
        if let Some(reader) = &self.reader {
            reader.commit()?;
        } else if let Some(mut writer) = self.writer.take() {
            writer.close()?;
        }
        self.has_writes = false;
        Ok(())
    }

    fn add_doc(&mut self, doc: &Document) -> Result<()> {
        if let Some(key_fields) = self.config.key_fields.clone() {
            if key_fields.len() == 1 {
                self.ensure_writer()?;
                if let Some(value) = doc.get(&key_fields[0]) {
                    let value = value.to_string();
                    self.writer
                        .as_mut()
                        .unwrap()
                        .delete_term(&key_fields[0], &value)?;
                }
            } else {
                let mut key_query = BooleanQuery::new(false);
                let mut have_key = false;
                for field in &key_fields {
                    if let Some(value) = doc.get(field) {
                        key_query.add(TermQuery::new(field.clone(), value), Occur::Must);
                        have_key = true;
                    }
                }
                if have_key {
                    self.ensure_searcher()?;
                    let top_docs = self.searcher.as_ref().unwrap().search(
                        &Query::Boolean(key_query),
                        0,
                        1,
                        SearchOptions::default(),
                    )?;
                    if top_docs.total_hits > 1 {
                        return Err(LodestoneError::Argument(
                            "tried to use a key that was not unique".to_string(),
                        ));
                    }
                    if top_docs.total_hits == 1 {
                        self.reader
                            .as_ref()
                            .unwrap()
                            .delete_doc(top_docs.hits[0].doc)?;
                    }
                }
            }
        }
        self.ensure_writer()?;
        self.writer.as_mut().unwrap().add_doc(doc)?;
        self.auto_flush_writer()
    }
}
