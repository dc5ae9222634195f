//! End-to-end pipeline tests
//!
//! These tests mock the MediaWiki API with wiremock and drive the full
//! crawl: category discovery, classification, collection/hub expansion,
//! extraction and persistence.

use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use versecrawl::config::{CrawlConfig, Heuristics};
use versecrawl::crawler::Coordinator;
use versecrawl::sink::PoemIndex;
use versecrawl::ExtractedPoem;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(output_dir: &Path) -> CrawlConfig {
    let mut heuristics = Heuristics::default();
    // Keep transient-failure handling snappy in tests
    heuristics.retry_base_delay_ms = 10;
    heuristics.sink_retry_delay_ms = 5;

    CrawlConfig {
        lang: "en".to_string(),
        category: "Poetry".to_string(),
        workers: 3,
        limit: None,
        resume: false,
        tree_log: true,
        output_dir: output_dir.to_path_buf(),
        heuristics,
    }
}

fn api_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Mounts the discovery mocks: root category -> "Category:Author X" -> one
/// member page with the given id/title
async fn mount_discovery(server: &MockServer, member_id: i64, member_title: &str) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", "Category:Poetry"))
        .respond_with(api_json(json!({
            "query": {"pages": [
                {"pageid": 500, "ns": 14, "title": "Category:Poetry"}
            ]}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "categorymembers"))
        .and(query_param("cmtitle", "Category:Poetry"))
        .and(query_param("cmtype", "subcat"))
        .respond_with(api_json(json!({
            "query": {"categorymembers": [
                {"pageid": 501, "ns": 14, "title": "Category:Author X"}
            ]}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "categoryinfo"))
        .and(query_param("titles", "Category:Author X"))
        .respond_with(api_json(json!({
            "query": {"pages": [
                {"pageid": 501, "ns": 14, "title": "Category:Author X",
                 "categoryinfo": {"pages": 1, "subcats": 0, "files": 0}}
            ]}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "categorymembers"))
        .and(query_param("cmtitle", "Category:Author X"))
        .and(query_param("cmtype", "page"))
        .respond_with(api_json(json!({
            "query": {"categorymembers": [
                {"pageid": member_id, "ns": 0, "title": member_title}
            ]}
        })))
        .mount(server)
        .await;
}

/// Mounts page-data and rendered-markup mocks for one page
async fn mount_page(server: &MockServer, page_id: i64, title: &str, wikitext: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("pageids", page_id.to_string()))
        .respond_with(api_json(json!({
            "query": {"pages": [{
                "pageid": page_id,
                "ns": 0,
                "title": title,
                "fullurl": format!("https://en.wikisource.org/wiki/{}", title.replace(' ', "_")),
                "revisions": [{"revid": page_id * 10, "slots": {"main": {"content": wikitext}}}],
                "categories": [],
                "templates": []
            }]}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "parse"))
        .and(query_param("pageid", page_id.to_string()))
        .respond_with(api_json(json!({
            "parse": {"pageid": page_id, "text": html}
        })))
        .mount(server)
        .await;
}

fn poem_html(verses: &str) -> String {
    format!(
        "<div id=\"mw-content-text\"><div class=\"poem\">{}</div></div>",
        verses
    )
}

fn read_records(output_dir: &Path) -> Vec<ExtractedPoem> {
    let content = std::fs::read_to_string(output_dir.join("poems.jsonl")).unwrap();
    content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_collection_expansion_end_to_end() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_discovery(&server, 600, "Collected Verses").await;

    // The collection page: a summary block with one section heading before
    // two poem links
    mount_page(
        &server,
        600,
        "Collected Verses",
        "* [[Poem A]]\n* [[Poem B]]",
        r#"<div id="mw-content-text"><div class="ws-summary">
            <h3><span class="mw-headline">Book I</span></h3>
            <ul>
                <li><a href="/wiki/Poem_A">Poem A</a></li>
                <li><a href="/wiki/Poem_B">Poem B</a></li>
            </ul>
        </div></div>"#,
    )
    .await;

    // Batch resolution of the two child titles
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", "Poem A|Poem B"))
        .respond_with(api_json(json!({
            "query": {"pages": [
                {"pageid": 601, "ns": 0, "title": "Poem A"},
                {"pageid": 602, "ns": 0, "title": "Poem B"}
            ]}
        })))
        .mount(&server)
        .await;

    mount_page(
        &server,
        601,
        "Poem A",
        "<poem>First verse\nSecond verse</poem>",
        &poem_html("First verse\nSecond verse"),
    )
    .await;
    mount_page(
        &server,
        602,
        "Poem B",
        "<poem>Another verse</poem>",
        &poem_html("Another verse"),
    )
    .await;

    let config = test_config(output.path());
    let endpoint = format!("{}/w/api.php", server.uri());
    let coordinator = Coordinator::with_endpoint(config, &endpoint).unwrap();
    coordinator.run().await.unwrap();

    let mut records = read_records(output.path());
    assert_eq!(records.len(), 2, "exactly the two poems are emitted");
    records.sort_by_key(|p| p.poem_order);

    let first = &records[0];
    assert_eq!(first.title, "Poem A");
    assert_eq!(first.poem_order, Some(0));
    assert_eq!(first.collection_title.as_deref(), Some("Collected Verses"));
    assert_eq!(first.collection_page_id, Some(600));
    assert_eq!(first.section_title.as_deref(), Some("Book I"));
    assert_eq!(first.hub_page_id, first.page_id, "standalone group key is self");
    assert!(first.collection_structure.is_some());

    let structure = first.collection_structure.as_ref().unwrap();
    assert_eq!(structure.page_id, 600);
    assert_eq!(structure.poem_count(), 2);

    let second = &records[1];
    assert_eq!(second.title, "Poem B");
    assert_eq!(second.poem_order, Some(1));
    assert_eq!(second.section_title.as_deref(), Some("Book I"));
    assert!(
        second.collection_structure.is_none(),
        "only the first poem carries the structure"
    );

    // The index matches the record store
    let index = PoemIndex::open(&output.path().join("poems_index.sqlite")).unwrap();
    let ids = index.processed_ids().unwrap();
    assert!(ids.contains(&601) && ids.contains(&602));

    // Audit and tree surfaces exist
    let collections_csv =
        std::fs::read_to_string(output.path().join("logs/collections.csv")).unwrap();
    assert!(collections_csv.contains("Collected Verses"));
    assert!(output
        .path()
        .join("logs/tree-logs/author_x.txt")
        .exists());
}

#[tokio::test]
async fn test_resume_skips_indexed_identities() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_discovery(&server, 601, "Poem A").await;

    // Pre-index Poem A as if a previous run extracted it
    {
        let index = PoemIndex::open(&output.path().join("poems_index.sqlite")).unwrap();
        let poem: ExtractedPoem = serde_json::from_value(json!({
            "page_id": 601,
            "revision_id": 6010,
            "title": "Poem A",
            "language": "en",
            "wikisource_url": "https://en.wikisource.org/wiki/Poem_A",
            "hub_page_id": 601,
            "metadata": {},
            "structure": {"stanzas": [["v"]], "raw_markers": []},
            "normalized_text": "v",
            "checksum_sha256": "00",
            "extraction_timestamp": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        index.upsert(&poem).unwrap();
    }

    // Any fetch of the pre-seeded identity is a dedup failure
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("pageids", "601"))
        .respond_with(api_json(json!({"query": {"pages": []}})))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(output.path());
    config.resume = true;
    let endpoint = format!("{}/w/api.php", server.uri());
    let coordinator = Coordinator::with_endpoint(config, &endpoint).unwrap();
    coordinator.run().await.unwrap();

    assert!(
        !output.path().join("poems.jsonl").exists()
            || std::fs::read_to_string(output.path().join("poems.jsonl"))
                .unwrap()
                .lines()
                .count()
                == 0
    );
}

#[tokio::test]
async fn test_hub_expansion_shares_group_key() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_discovery(&server, 700, "The Raven").await;

    // The hub page: multi-version category tag plus two version links
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("pageids", "700"))
        .respond_with(api_json(json!({
            "query": {"pages": [{
                "pageid": 700,
                "ns": 0,
                "title": "The Raven",
                "fullurl": "https://en.wikisource.org/wiki/The_Raven",
                "revisions": [{"revid": 7000, "slots": {"main": {"content": "versions list"}}}],
                "categories": [{"ns": 14, "title": "Category:Multiple versions"}],
                "templates": []
            }]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "parse"))
        .and(query_param("pageid", "700"))
        .respond_with(api_json(json!({
            "parse": {"pageid": 700, "text": r#"<div id="mw-content-text"><ul>
                <li><a href="/wiki/The_Raven_(1845)">The Raven (1845)</a></li>
                <li><a href="/wiki/The_Raven_(1850)">The Raven (1850)</a></li>
                <li><a href="/wiki/Unrelated_Poem">Unrelated Poem</a></li>
            </ul></div>"#}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", "The Raven (1845)|The Raven (1850)"))
        .respond_with(api_json(json!({
            "query": {"pages": [
                {"pageid": 701, "ns": 0, "title": "The Raven (1845)"},
                {"pageid": 702, "ns": 0, "title": "The Raven (1850)"}
            ]}
        })))
        .mount(&server)
        .await;

    mount_page(
        &server,
        701,
        "The Raven (1845)",
        "<poem>Once upon a midnight dreary</poem>",
        &poem_html("Once upon a midnight dreary"),
    )
    .await;
    mount_page(
        &server,
        702,
        "The Raven (1850)",
        "<poem>Once upon a midnight dreary, revised</poem>",
        &poem_html("Once upon a midnight dreary, revised"),
    )
    .await;

    let config = test_config(output.path());
    let endpoint = format!("{}/w/api.php", server.uri());
    let coordinator = Coordinator::with_endpoint(config, &endpoint).unwrap();
    coordinator.run().await.unwrap();

    let records = read_records(output.path());
    assert_eq!(records.len(), 2, "only version links are followed");

    for record in &records {
        assert_eq!(record.hub_page_id, 700, "all versions share the hub group key");
        assert_eq!(record.hub_title.as_deref(), Some("The Raven"));
        assert!(record.collection_page_id.is_none());
    }

    let hubs_csv = std::fs::read_to_string(output.path().join("logs/hubs.csv")).unwrap();
    assert!(hubs_csv.contains("The Raven"));
    assert!(hubs_csv.contains("category tag 'multi-version'"));
}
