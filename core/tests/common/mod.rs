// each integration test binary compiles its own copy of this module and uses a subset
#![allow(dead_code)]

use {
    lodestone_core::{
        analysis::{Analyzer, Token, TokenStream, WhitespaceTokenizer},
        document::{DocField, Document},
        index::IndexWriter,
        search::{DocId, Query, SearchOptions, Searchable},
        store::Store,
    },
    std::{ops::Range, sync::Arc},
};

/// The 18-document corpus: (date, field, cat, number).
pub const TEST_DATA: [(&str, &str, &str, &str); 18] = [
    ("20050930", "word1", "cat1/", ".123"),
    ("20051001", "word1 word2 the quick brown fox", "cat1/sub1", "0.954"),
    ("20051002", "word1 word3", "cat1/sub1/subsub1", "908.123434"),
    ("20051003", "word1 word3", "cat1/sub2", "3999"),
    ("20051004", "word1 word2", "cat1/sub2/subsub2", "+.3413"),
    ("20051005", "word1", "cat2/sub1", "-1.1298"),
    ("20051006", "word1 word3", "cat2/sub1", "2"),
    ("20051007", "word1", "cat2/sub1", "+8.894"),
    ("20051008", "word1 word2 word3 the fast brown fox", "cat2/sub1", "+84783.13747"),
    ("20051009", "word1", "cat3/sub1", "10.0"),
    ("20051010", "word1", "cat3/sub1", "1"),
    ("20051011", "word1 word3 the quick red fox", "cat3/sub1", "-12518419"),
    ("20051012", "word1", "cat3/sub1", "10"),
    ("20051013", "word1", "cat1/sub2", "15682954"),
    ("20051014", "word1 word3 the quick hairy fox", "cat1/sub1", "98132"),
    ("20051015", "word1", "cat1/sub2/subsub1", "-.89321"),
    (
        "20051016",
        "word1 the quick fox is brown and hairy and a little red",
        "cat1/sub1/subsub2",
        "-89",
    ),
    (
        "20051017",
        "word1 the brown fox is quick and red",
        "cat1/",
        "-1.0",
    ),
];

/// Emits every token starting with a lowercase letter twice: the original form stacked at
/// the previous position (increment 0), then the uppercased form one position on. Tokens
/// starting with anything else pass through untouched.
struct CaseDoublingFilter {
    input: Box<dyn TokenStream>,
    pending: Option<Token>,
}

impl TokenStream for CaseDoublingFilter {
    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        let token = self.input.next()?;
        if token.text.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            self.pending = Some(Token::new(token.text.to_ascii_uppercase(), 1));
            Some(Token::new(token.text, 0))
        } else {
            Some(token)
        }
    }
}

/// The corpus analyzer: whitespace tokens, lowercase tokens case-doubled.
pub struct CaseDoublingAnalyzer;

impl Analyzer for CaseDoublingAnalyzer {
    fn token_stream(&self, _field: &str, text: &str) -> Box<dyn TokenStream> {
        Box::new(CaseDoublingFilter {
            input: Box::new(WhitespaceTokenizer::new(text)),
            pending: None,
        })
    }
}

/// Indexes a slice of the corpus into `store`; document boosts are `corpus index + 1`.
pub fn index_docs(store: &Store, range: Range<usize>) {
    let mut writer = IndexWriter::open(store, Arc::new(CaseDoublingAnalyzer)).unwrap();
    for i in range {
        let (date, field, cat, number) = TEST_DATA[i];
        let mut doc = Document::new();
        doc.boost = (i + 1) as f32;
        doc.add_field(DocField::new("date").add_data(date));
        doc.add_field(DocField::new("field").add_data(field));
        doc.add_field(DocField::new("cat").add_data(cat));
        doc.add_field(DocField::new("number").add_data(number));
        writer.add_doc(&doc).unwrap();
    }
    writer.close().unwrap();
}

pub fn corpus_store() -> Store {
    let store = Store::open_ram();
    index_docs(&store, 0..TEST_DATA.len());
    store
}

/// Checks membership, ranking invariants, explanations and unscored enumeration of a query
/// against the expected document set. `top` additionally pins the best hit.
pub fn check_hits(
    searcher: &dyn Searchable,
    query: &Query,
    expected: &[DocId],
    top: Option<DocId>,
) {
    let top_docs = searcher
        .search(query, 0, expected.len() + 1, SearchOptions::default())
        .unwrap();
    assert_eq!(
        top_docs.total_hits,
        expected.len(),
        "total hits for {query}: saw {:?}",
        top_docs.hits
    );
    assert_eq!(top_docs.hits.len(), expected.len());
    if let (Some(top), Some(first)) = (top, top_docs.hits.first()) {
        assert_eq!(first.doc, top, "top hit for {query}");
    }
    for hit in &top_docs.hits {
        let normalized = hit.score / top_docs.max_score;
        assert!(
            normalized > 0.0 && normalized <= 1.0,
            "hit score {normalized} for doc {} of {query} is out of range (0.0..1.0]",
            hit.doc
        );
        assert!(
            expected.contains(&hit.doc),
            "doc {} found unexpectedly for {query}",
            hit.doc
        );
        let explanation = searcher.explain(query, hit.doc).unwrap();
        assert!(
            (explanation.value() - hit.score).abs() < 1e-4 * hit.score.max(1.0),
            "explanation for doc {} of {query} was {} but the hit scored {}:\n{explanation}",
            hit.doc,
            explanation.value(),
            hit.score
        );
    }

    let mut sorted = expected.to_vec();
    sorted.sort_unstable();
    let mut buf = [0 as DocId; 40];
    let count = searcher.search_unscored(query, &mut buf, 0).unwrap();
    assert_eq!(&buf[..count], &sorted[..], "unscored docs for {query}");
    if count > 3 {
        let count = searcher.search_unscored(query, &mut buf, sorted[3]).unwrap();
        assert_eq!(&buf[..count], &sorted[3..], "unscored offset docs for {query}");
    }
}

/// Asserts the stable string form against both the field-elided and the qualified
/// rendering.
pub fn check_to_s(query: &Query, default_field: &str, expected: &str) {
    assert_eq!(query.to_query_string(default_field), expected);
}
