//! Tests against the real Semantic Scholar API.
//!
//! Run with: `cargo test --features integration -- --nocapture`

#![cfg(feature = "integration")]

use litsift::client::{FetchPlan, RecordSource, SemanticScholarClient, fetch_all};
use litsift::config::Config;
use litsift::filter::Query;

fn live_client() -> (SemanticScholarClient, Config) {
    let config = Config::from_env().unwrap();
    let client = SemanticScholarClient::new(&config).unwrap();
    (client, config)
}

#[tokio::test]
async fn test_live_search_page() {
    let (client, _) = live_client();
    let page = client.search_page("attention is all you need", 0, 5).await.unwrap();

    assert!(!page.data.is_empty());
    assert!(page.total > 0);
    println!("First hit: {:?}", page.data[0].title);
}

#[tokio::test]
async fn test_live_fetch_and_filter() {
    let (client, config) = live_client();
    let records = fetch_all(&client, "graph neural networks", FetchPlan::new(&config, 150), |p| {
        println!("[{:>3}%] {}", p.percent, p.message);
    })
    .await
    .unwrap();

    assert!(records.len() > 100, "expected a second page, got {}", records.len());

    let query = Query::parse("title:graph*").unwrap();
    let kept = records.iter().filter(|r| query.matches(r)).count();
    assert!(kept > 0);
    assert!(kept <= records.len());
}
