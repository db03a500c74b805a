//! Filter language behaviour against realistic records.

use litsift::error::QueryErrorKind;
use litsift::filter::{Query, matches};
use litsift::models::Record;

fn paper(title: &str, authors: &[&str], year: i32, venue: &str) -> Record {
    Record {
        paper_id: format!("id-{year}"),
        title: title.to_string(),
        authors: authors.iter().map(ToString::to_string).collect(),
        year: Some(year),
        venue: venue.to_string(),
        citation_count: 10,
        ..Record::default()
    }
}

fn corpus() -> Vec<Record> {
    vec![
        paper("Deep Learning for Graph Networks", &["Ada Lovelace"], 2019, "NeurIPS"),
        paper("Networking Protocols at Scale", &["Alan Turing"], 2015, "SIGCOMM"),
        paper("Socket Programming Explained", &["Grace Hopper"], 2001, "USENIX"),
        paper("Learning Deep Representations", &["Ada Lovelace", "Alan Turing"], 2021, "ICML"),
    ]
}

fn titles(query: &str) -> Vec<String> {
    let query = Query::parse(query).unwrap();
    corpus().into_iter().filter(|r| query.matches(r)).map(|r| r.title).collect()
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_not_is_complement() {
    for query in ["deep", "title:socket", "netw*", "year:2019 OR venue:icml"] {
        let negated = format!("NOT ({query})");
        for record in corpus() {
            assert_eq!(
                matches(&negated, &record).unwrap(),
                !matches(query, &record).unwrap(),
                "{negated} on {}",
                record.title
            );
        }
    }
}

#[test]
fn test_and_or_agree_with_parts() {
    for record in corpus() {
        let a = matches("learning", &record).unwrap();
        let b = matches("author:turing", &record).unwrap();
        assert_eq!(matches("learning AND author:turing", &record).unwrap(), a && b);
        assert_eq!(matches("learning author:turing", &record).unwrap(), a && b);
        assert_eq!(matches("learning OR author:turing", &record).unwrap(), a || b);
    }
}

#[test]
fn test_grouping_changes_meaning() {
    assert_eq!(titles("socket OR deep AND graph"), vec![
        "Deep Learning for Graph Networks".to_string(),
        "Socket Programming Explained".to_string(),
    ]);
    assert_eq!(titles("(socket OR deep) AND graph"), vec!["Deep Learning for Graph Networks".to_string()]);
}

#[test]
fn test_lowercase_operators_are_terms() {
    // "and" is an ordinary word here, so nothing contains all three.
    assert!(titles("deep and graph").is_empty());
}

// =============================================================================
// Wildcards and phrases
// =============================================================================

#[test]
fn test_prefix_wildcard() {
    let record = |title: &str| Record { title: title.into(), ..Record::default() };
    assert!(matches("netw*", &record("A network model")).unwrap());
    assert!(matches("netw*", &record("Networking at scale")).unwrap());
    assert!(!matches("netw*", &record("A socket model")).unwrap());
}

#[test]
fn test_phrase_is_exact() {
    let hit = Record { title: "Advances in Deep Learning".into(), ..Record::default() };
    let split = Record { title: "Deep Representation Learning".into(), ..Record::default() };
    let elsewhere = Record {
        title: "Representations".into(),
        r#abstract: Some("deep learning everywhere".into()),
        ..Record::default()
    };

    assert!(matches(r#"title:"deep learning""#, &hit).unwrap());
    assert!(!matches(r#"title:"deep learning""#, &split).unwrap());
    assert!(!matches(r#"title:"deep learning""#, &elsewhere).unwrap());
    assert!(matches(r#""deep learning""#, &elsewhere).unwrap());
}

#[test]
fn test_single_char_wildcard() {
    assert_eq!(titles("title:s?cket"), vec!["Socket Programming Explained".to_string()]);
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn test_year_and_venue_fields() {
    assert_eq!(titles("year:2015"), vec!["Networking Protocols at Scale".to_string()]);
    assert_eq!(titles("venue:usenix"), vec!["Socket Programming Explained".to_string()]);
}

#[test]
fn test_unknown_field_matches_nothing() {
    let query = Query::parse("publisher:acm OR deep").unwrap();
    assert_eq!(query.unknown_fields(), ["publisher".to_string()]);
    let hits: Vec<_> = corpus().into_iter().filter(|r| query.matches(r)).collect();
    assert_eq!(hits.len(), 2);
    assert!(titles("publisher:acm").is_empty());
}

#[test]
fn test_blank_query_matches_everything() {
    assert_eq!(titles("  ").len(), corpus().len());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_malformed_queries_report_kind_and_offset() {
    let cases = [
        ("(deep OR graph", QueryErrorKind::UnclosedParen, 0),
        ("deep)", QueryErrorKind::UnexpectedCloseParen, 4),
        ("\"deep learning", QueryErrorKind::UnterminatedQuote, 0),
        ("deep AND", QueryErrorKind::MissingOperand, 8),
        ("()", QueryErrorKind::EmptyGroup, 0),
        ("title: deep", QueryErrorKind::EmptyFieldValue, 0),
    ];
    for (input, kind, position) in cases {
        let err = Query::parse(input).unwrap_err();
        assert_eq!(err.kind, kind, "{input}");
        assert_eq!(err.position, position, "{input}");
    }
}

#[test]
fn test_error_render_points_at_offset() {
    let input = "deep AND (graph";
    let err = Query::parse(input).unwrap_err();
    let rendered = err.render(input);
    let caret_line = rendered.lines().nth(1).unwrap();
    assert_eq!(caret_line.find('^'), Some(9));
}

#[test]
fn test_normalized_display_reparses_to_same_tree() {
    for input in ["a b OR c", "NOT a (b OR c*)", r#"title:"deep learning" OR year:2019"#] {
        let query = Query::parse(input).unwrap();
        let again = Query::parse(&query.to_string()).unwrap();
        assert_eq!(query.expr(), again.expr(), "{input}");
    }
}
