//! Filter parsing and evaluation over a realistic result set.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use litsift::filter::Query;
use litsift::models::Record;
use litsift::results::ResultSet;

const TOPICS: &[&str] = &["graph", "neural", "network", "socket", "protocol", "learning", "deep", "vision"];

fn corpus(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record {
            paper_id: format!("{i:040x}"),
            title: format!(
                "{} {} for {} systems",
                TOPICS[i % TOPICS.len()],
                TOPICS[(i / 3) % TOPICS.len()],
                TOPICS[(i / 7) % TOPICS.len()]
            ),
            authors: vec![format!("Author {}", i % 97), format!("Coauthor {}", i % 13)],
            year: Some(1990 + (i % 35) as i32),
            venue: ["NeurIPS", "ICML", "SIGCOMM", "CVPR"][i % 4].to_string(),
            citation_count: (i * 37 % 5000) as u32,
            r#abstract: Some(format!("We study {} at scale. ", TOPICS[i % TOPICS.len()]).repeat(8)),
            ..Record::default()
        })
        .collect()
}

const QUERIES: &[(&str, &str)] = &[
    ("term", "graph"),
    ("wildcard", "netw*"),
    ("phrase", r#""neural network""#),
    ("fields", "venue:neurips year:2019"),
    ("nested", r#"(graph OR title:"deep learning") AND NOT (socket OR prot*) author:"author 4""#),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, text) in QUERIES {
        group.bench_function(*name, |b| b.iter(|| Query::parse(black_box(text))));
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let records = corpus(1000);
    let mut group = c.benchmark_group("evaluate_1000");
    for (name, text) in QUERIES {
        let Ok(query) = Query::parse(text) else {
            continue;
        };
        group.bench_function(*name, |b| {
            b.iter(|| records.iter().filter(|r| query.matches(black_box(r))).count());
        });
    }
    group.finish();
}

fn bench_view(c: &mut Criterion) {
    let records = corpus(1000);
    c.bench_function("filter_and_sort_view_1000", |b| {
        b.iter_batched(
            || {
                let mut set = ResultSet::new();
                set.replace(records.clone());
                set
            },
            |mut set| {
                let _ = set.apply_filter("NOT socket AND year:20*");
                set.set_sort(litsift::results::SortKey::Citations, litsift::results::SortOrder::Descending);
                set.view().len()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_view);
criterion_main!(benches);
