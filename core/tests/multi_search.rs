mod common;

use {
    common::{check_hits, corpus_store, index_docs, TEST_DATA},
    lodestone_core::{
        search::{
            BooleanQuery, IndexSearcher, MultiSearcher, Occur, PhraseQuery, PrefixQuery, Query,
            RangeQuery, SearchOptions, Searchable, TermQuery, TypedRangeQuery, WildcardQuery,
            DocId,
        },
        store::Store,
    },
    pretty_assertions::assert_eq,
    test_log::test,
};

/// The corpus split over two stores, stacked under a multi-searcher. Document boosts use
/// the corpus index, so the stacked searcher must be indistinguishable from a single
/// merged index.
fn multi_searcher() -> MultiSearcher {
    let store0 = Store::open_ram();
    let store1 = Store::open_ram();
    index_docs(&store0, 0..9);
    index_docs(&store1, 9..TEST_DATA.len());
    MultiSearcher::new(vec![
        IndexSearcher::open(&store0).unwrap(),
        IndexSearcher::open(&store1).unwrap(),
    ])
}

#[test]
fn test_get_doc_routes_to_subsearcher() {
    let searcher = multi_searcher();
    assert_eq!(searcher.max_doc(), 18);
    assert_eq!(searcher.get_doc(0).unwrap().get("date"), Some("20050930"));
    assert_eq!(
        searcher.get_doc(4).unwrap().get("cat"),
        Some("cat1/sub2/subsub2")
    );
    assert_eq!(searcher.get_doc(12).unwrap().get("date"), Some("20051012"));
}

#[test]
fn test_term_query() {
    let searcher = multi_searcher();
    check_hits(
        &searcher,
        &Query::Term(TermQuery::new("field", "word2")),
        &[1, 4, 8],
        None,
    );
}

#[test]
fn test_boolean_query() {
    let searcher = multi_searcher();
    let mut bq = BooleanQuery::new(false);
    bq.add(TermQuery::new("field", "word1"), Occur::Must);
    bq.add(TermQuery::new("field", "word3"), Occur::Must);
    check_hits(&searcher, &Query::Boolean(bq.clone()), &[2, 3, 6, 8, 11, 14], Some(14));

    bq.add(TermQuery::new("field", "word2"), Occur::Should);
    check_hits(&searcher, &Query::Boolean(bq), &[2, 3, 6, 8, 11, 14], Some(8));
}

#[test]
fn test_phrase_query() {
    let searcher = multi_searcher();
    let mut phq = PhraseQuery::new("field");
    phq.add_term("quick", 1);
    phq.add_term("brown", 1);
    phq.add_term("fox", 1);
    check_hits(&searcher, &Query::Phrase(phq.clone()), &[1], Some(1));

    phq.set_slop(4);
    check_hits(&searcher, &Query::Phrase(phq), &[1, 16, 17], Some(17));

    let mut phq = PhraseQuery::new("field");
    phq.add_term("quick", 0);
    phq.append_multi_term("fast").unwrap();
    phq.add_term("brown", 1);
    phq.append_multi_term("red").unwrap();
    phq.append_multi_term("hairy").unwrap();
    phq.add_term("fox", 1);
    check_hits(&searcher, &Query::Phrase(phq), &[1, 8, 11, 14], None);
}

#[test]
fn test_term_expanding_queries() {
    let searcher = multi_searcher();
    check_hits(
        &searcher,
        &Query::Prefix(PrefixQuery::new("cat", "cat1/sub")),
        &[1, 2, 3, 4, 13, 14, 15, 16],
        None,
    );
    check_hits(
        &searcher,
        &Query::Wildcard(WildcardQuery::new("cat", "cat1*/s*sub2")),
        &[4, 16],
        None,
    );
    check_hits(
        &searcher,
        &Query::Range(
            RangeQuery::new("date", Some("20051006"), Some("20051010"), true, true).unwrap(),
        ),
        &[6, 7, 8, 9, 10],
        None,
    );
    check_hits(
        &searcher,
        &Query::TypedRange(
            TypedRangeQuery::new("number", Some("-1.0"), Some("1.0"), true, true).unwrap(),
        ),
        &[0, 1, 4, 10, 15, 17],
        None,
    );
}

#[test]
fn test_search_unscored() {
    let searcher = multi_searcher();
    let tq = Query::Term(TermQuery::new("field", "word1"));
    let mut buf = [0 as DocId; 5];
    let count = searcher.search_unscored(&tq, &mut buf, 12).unwrap();
    assert_eq!(&buf[..count], &[12, 13, 14, 15, 16]);
    let count = searcher.search_unscored(&tq, &mut buf, 17).unwrap();
    assert_eq!(&buf[..count], &[17]);
    let count = searcher.search_unscored(&tq, &mut buf, 18).unwrap();
    assert_eq!(&buf[..count], &[] as &[DocId]);
}

#[test]
fn test_matches_single_merged_index() {
    let multi = multi_searcher();
    let single = IndexSearcher::open(&corpus_store()).unwrap();

    let mut bq = BooleanQuery::new(false);
    bq.add(TermQuery::new("field", "word1"), Occur::Must);
    bq.add(TermQuery::new("field", "word2"), Occur::Should);
    let mut phq = PhraseQuery::new("field");
    phq.add_term("quick", 1);
    phq.add_term("brown", 1);
    phq.add_term("fox", 1);
    phq.set_slop(4);
    let queries = [
        Query::Term(TermQuery::new("field", "word3")),
        Query::Boolean(bq),
        Query::Phrase(phq),
        // the per-reader date dictionaries are disjoint, so the combined rewrite scores
        // exactly like the merged index
        Query::Range(
            RangeQuery::new("date", Some("20051003"), Some("20051012"), true, false).unwrap(),
        ),
    ];
    for query in &queries {
        let from_multi = multi.search(query, 0, 20, SearchOptions::default()).unwrap();
        let from_single = single.search(query, 0, 20, SearchOptions::default()).unwrap();
        assert_eq!(from_multi.total_hits, from_single.total_hits, "{query}");
        let multi_docs: Vec<DocId> = from_multi.hits.iter().map(|h| h.doc).collect();
        let single_docs: Vec<DocId> = from_single.hits.iter().map(|h| h.doc).collect();
        assert_eq!(multi_docs, single_docs, "{query}");
        for (a, b) in from_multi.hits.iter().zip(from_single.hits.iter()) {
            assert!(
                (a.score - b.score).abs() < 1e-4 * b.score.max(1.0),
                "scores diverge for {query}: {} vs {}",
                a.score,
                b.score
            );
        }
    }
}

#[test]
fn test_query_combine() {
    let a = Query::Term(TermQuery::new("A", "a"));

    // duplicates collapse to the one unique query
    let combined = Query::combine(&[a.clone(), a.clone(), a.clone()]);
    assert_eq!(combined, a);

    // a coordinating SHOULD-only boolean stays a clause of its own
    let mut coordinating = BooleanQuery::new(false);
    coordinating.add(TermQuery::new("A", "a"), Occur::Should);
    coordinating.add(TermQuery::new("A", "a"), Occur::Should);
    coordinating.add(TermQuery::new("A", "a"), Occur::Should);
    let coordinating = Query::Boolean(coordinating);
    let combined = Query::combine(&[a.clone(), coordinating.clone(), a.clone()]);
    match &combined {
        Query::Boolean(bq) => {
            assert_eq!(bq.clauses().len(), 2);
            assert_eq!(bq.clauses()[0].query, a);
            assert_eq!(bq.clauses()[1].query, coordinating);
        }
        other => panic!("expected a boolean, got {other}"),
    }

    // a coord-disabled SHOULD-only boolean is flattened and deduplicated
    let mut flat = BooleanQuery::new(true);
    flat.add(TermQuery::new("A", "a"), Occur::Should);
    flat.add(TermQuery::new("A", "a"), Occur::Should);
    flat.add(TermQuery::new("A", "a"), Occur::Should);
    let combined = Query::combine(&[a.clone(), Query::Boolean(flat.clone()), a.clone()]);
    assert_eq!(combined, a);

    flat.add(TermQuery::new("B", "b"), Occur::Should);
    flat.add(TermQuery::new("C", "c"), Occur::Should);
    let combined = Query::combine(&[a.clone(), Query::Boolean(flat), a.clone()]);
    match &combined {
        Query::Boolean(bq) => {
            assert_eq!(bq.clauses().len(), 3);
            assert_eq!(bq.clauses()[0].query, a);
            assert_eq!(bq.clauses()[1].query, Query::Term(TermQuery::new("B", "b")));
            assert_eq!(bq.clauses()[2].query, Query::Term(TermQuery::new("C", "c")));
        }
        other => panic!("expected a boolean, got {other}"),
    }

    // a MUST clause keeps its boolean from being flattened
    let mut guarded = BooleanQuery::new(true);
    guarded.add(TermQuery::new("A", "a"), Occur::Should);
    guarded.add(TermQuery::new("B", "b"), Occur::Should);
    guarded.add(TermQuery::new("C", "c"), Occur::Must);
    let guarded = Query::Boolean(guarded);
    let combined = Query::combine(&[a.clone(), guarded.clone()]);
    match &combined {
        Query::Boolean(bq) => {
            assert_eq!(bq.clauses().len(), 2);
            assert_eq!(bq.clauses()[1].query, guarded);
        }
        other => panic!("expected a boolean, got {other}"),
    }
}

#[test]
fn test_rewrite_combines_across_readers() {
    let searcher = multi_searcher();
    // a single-slot phrase rewrites to the same term query against both readers,
    // so the combined rewrite is that term query
    let mut phq = PhraseQuery::new("field");
    phq.add_term("word2", 1);
    let rewritten = searcher.rewrite(&Query::Phrase(phq)).unwrap();
    assert!(matches!(rewritten, Query::Term(_)));
}
