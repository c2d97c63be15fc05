use {
    crate::{
        analysis::Analyzer,
        document::Document,
        index::segment::{Posting, PostingList, SegmentData},
        search::{encode_norm, DocId, Similarity},
        store::Store,
        LodestoneError, Result,
    },
    log::debug,
    std::{collections::HashMap, sync::Arc},
};

/// Writer configuration. `use_compound_file` is forwarded to the segment codec when one is
/// attached; the RAM driver ignores it.
#[derive(Clone, Copy, Debug)]
pub struct WriterConfig {
    pub use_compound_file: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            use_compound_file: true,
        }
    }
}

struct FieldInvertState {
    pos: i32,
    length: u32,
    boost: f32,
    store_positions: bool,
    terms: HashMap<String, Vec<i32>>,
}

/// Analyzes documents into the inverted image and publishes the result on commit.
///
/// The writer works on a private copy of the committed image; nothing it does is visible to
/// readers until [IndexWriter::commit] (or [IndexWriter::close]) publishes a new store
/// generation.
pub struct IndexWriter {
    store: Store,
    analyzer: Arc<dyn Analyzer>,
    pub config: WriterConfig,
    similarity: Similarity,
    data: SegmentData,
    dirty: bool,
    closed: bool,
}

impl IndexWriter {
    pub fn open(store: &Store, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        let (data, _) = store.snapshot();
        Ok(IndexWriter {
            store: store.clone(),
            analyzer,
            config: WriterConfig::default(),
            similarity: Similarity::default(),
            data: (*data).clone(),
            dirty: false,
            closed: false,
        })
    }

    pub fn analyzer(&self) -> Arc<dyn Analyzer> {
        self.analyzer.clone()
    }

    /// Rebinds the analyzer used for subsequent documents.
    pub fn set_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzer = analyzer;
    }

    pub fn doc_count(&self) -> u32 {
        self.data.num_docs()
    }

    /// Analyzes and buffers one document. Term positions accumulate across the values of a
    /// field through the tokens' position increments, starting below zero so that a leading
    /// zero-increment token lands at position -1, the way stacked leading tokens do.
    pub fn add_doc(&mut self, doc: &Document) -> Result<()> {
        self.check_open()?;
        let doc_id = self.data.docs.len() as DocId;
        let mut states: Vec<(String, FieldInvertState)> = Vec::new();

        for field in doc.fields() {
            let info = self.data.fis.get_or_add(&field.name);
            let (indexed, store_positions, info_boost) =
                (info.indexed, info.store_positions, info.boost);

            let state_index = match states.iter().position(|(name, _)| *name == field.name) {
                Some(index) => index,
                None => {
                    states.push((
                        field.name.clone(),
                        FieldInvertState {
                            pos: -1,
                            length: 0,
                            boost: info_boost,
                            store_positions,
                            terms: HashMap::new(),
                        },
                    ));
                    states.len() - 1
                }
            };
            let state = &mut states[state_index].1;
            state.boost *= field.boost;
            if !indexed {
                continue;
            }

            for value in &field.values {
                let mut stream = self.analyzer.token_stream(&field.name, value);
                while let Some(token) = stream.next() {
                    state.pos += token.pos_inc as i32;
                    state.length += 1;
                    let positions = state.terms.entry(token.text).or_default();
                    if positions.last() != Some(&state.pos) {
                        positions.push(state.pos);
                    }
                }
            }
        }

        for (name, state) in states {
            let field_data = self.data.fields.entry(name.clone()).or_default();
            for (term, positions) in state.terms {
                let freq = positions.len() as u32;
                let list = field_data
                    .postings
                    .entry(term)
                    .or_insert_with(|| Arc::new(PostingList::default()));
                Arc::make_mut(list).postings.push(Posting {
                    doc: doc_id,
                    freq,
                    positions: if state.store_positions {
                        positions
                    } else {
                        Vec::new()
                    },
                });
            }
            let norm = if state.length == 0 {
                0
            } else {
                encode_norm(
                    doc.boost
                        * state.boost
                        * self.similarity.length_norm(&name, state.length),
                )
            };
            let norms = Arc::make_mut(&mut field_data.norms);
            if norms.len() < doc_id as usize {
                norms.resize(doc_id as usize, 0);
            }
            norms.push(norm);
        }

        self.data.docs.push(doc.clone());
        self.data.deleted.push(false);
        self.dirty = true;
        Ok(())
    }

    /// Marks every document containing `(field, term)` deleted. Takes effect on commit.
    pub fn delete_term(&mut self, field: &str, term: &str) -> Result<()> {
        self.check_open()?;
        let list = match self
            .data
            .fields
            .get(field)
            .and_then(|f| f.postings.get(term))
        {
            Some(list) => list.clone(),
            None => return Ok(()),
        };
        for posting in &list.postings {
            let doc = posting.doc as usize;
            if doc < self.data.deleted.len() && !self.data.deleted[doc] {
                self.data.deleted.set(doc, true);
                self.dirty = true;
            }
        }
        Ok(())
    }

    /// Drops deleted documents and compacts the remaining document ids.
    pub fn optimize(&mut self) -> Result<()> {
        self.check_open()?;
        if !self.data.deleted.any() {
            return Ok(());
        }
        let max_doc = self.data.max_doc() as usize;
        let mut remap: Vec<DocId> = vec![-1; max_doc];
        let mut next: DocId = 0;
        for doc in 0..max_doc {
            if !self.data.deleted[doc] {
                remap[doc] = next;
                next += 1;
            }
        }

        let mut compacted = SegmentData {
            fis: self.data.fis.clone(),
            ..SegmentData::default()
        };
        for (doc, document) in self.data.docs.iter().enumerate() {
            if remap[doc] >= 0 {
                compacted.docs.push(document.clone());
            }
        }
        for (name, field_data) in &self.data.fields {
            let compacted_field = compacted.fields.entry(name.clone()).or_default();
            for (term, list) in &field_data.postings {
                let postings: Vec<Posting> = list
                    .postings
                    .iter()
                    .filter(|p| remap[p.doc as usize] >= 0)
                    .map(|p| Posting {
                        doc: remap[p.doc as usize],
                        freq: p.freq,
                        positions: p.positions.clone(),
                    })
                    .collect();
                if !postings.is_empty() {
                    compacted_field
                        .postings
                        .insert(term.clone(), Arc::new(PostingList { postings }));
                }
            }
            let norms: Vec<u8> = (0..max_doc)
                .filter(|doc| remap[*doc] >= 0)
                .map(|doc| field_data.norms.get(doc).copied().unwrap_or(0))
                .collect();
            compacted_field.norms = Arc::new(norms);
        }
        compacted.deleted = bitvec::vec::BitVec::repeat(false, next as usize);

        debug!(
            "optimized index: {} docs compacted to {}",
            max_doc, next
        );
        self.data = compacted;
        self.dirty = true;
        Ok(())
    }

    /// Publishes the working image as a new store generation.
    pub fn commit(&mut self) -> Result<()> {
        self.check_open()?;
        if self.dirty {
            debug!(
                "committing {} docs ({} fields) to the store",
                self.data.max_doc(),
                self.data.fis.len()
            );
            self.store.publish(self.data.clone());
            self.dirty = false;
        }
        Ok(())
    }

    /// Commits and closes. Closing an already-closed writer is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.commit()?;
        self.closed = true;
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(LodestoneError::State("writer is closed".to_string()))
        } else {
            Ok(())
        }
    }
}
