//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitecrawl::config::Config;
use sitecrawl::crawler::crawl;
use sitecrawl::output::{write_csv_report, LinkGraph};
use sitecrawl::{normalize_url, CrawlError};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with fast retries
fn create_test_config(max_pages: usize) -> Config {
    let mut config = Config::default();
    config.crawler.max_concurrency = 4;
    config.crawler.max_pages = max_pages;
    config.fetch.timeout_secs = 2;
    config.fetch.backoff_base_ms = 10;
    config.fetch.user_agent = "TestBot/1.0".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        &format!(
            r#"<html><head><title>Home</title></head><body>
            <h1>Welcome</h1>
            <main><p>Start here.</p></main>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <img src="/logo.png">
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &server,
        "/page1",
        r#"<html><body><h1>Page One</h1><p>First.</p><a href="/">Home</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/page2",
        r#"<html><body><h1>Page Two</h1><a href="page1">Sibling</a></body></html>"#,
    )
    .await;

    let visited = crawl(&base_url, &create_test_config(50))
        .await
        .expect("Crawl failed");

    assert_eq!(visited.len(), 3);
    assert_eq!(visited.record_count(), 3);

    let home = visited
        .get(&normalize_url(&base_url).unwrap())
        .expect("Home page should be recorded");
    assert_eq!(home.title, "Welcome");
    assert_eq!(home.excerpt, "Start here.");
    assert_eq!(home.internal_links.len(), 2);
    assert!(home.external_links.is_empty());
    assert_eq!(home.image_urls, vec![format!("{}/logo.png", base_url)]);

    let page1 = visited
        .get(&normalize_url(&format!("{}/page1", base_url)).unwrap())
        .expect("Page 1 should be recorded");
    assert_eq!(page1.title, "Page One");
    assert_eq!(page1.excerpt, "First.");
}

#[tokio::test]
async fn test_trailing_slash_variants_fetched_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/a/">A again</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex("^/a/?$"))
        .respond_with(html("<html><body><h1>A</h1></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let visited = crawl(&base_url, &create_test_config(50)).await.unwrap();

    assert_eq!(visited.len(), 2);
    assert_eq!(visited.record_count(), 2);
}

#[tokio::test]
async fn test_budget_of_one_records_only_seed() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex("^/(a|b)$"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let visited = crawl(&base_url, &create_test_config(1)).await.unwrap();

    assert_eq!(visited.len(), 1);
    assert_eq!(visited.record_count(), 1);
    assert!(visited.contains(&normalize_url(&base_url).unwrap()));
}

#[tokio::test]
async fn test_budget_caps_claimed_pages() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", links)).await;
    Mock::given(method("GET"))
        .and(path_regex("^/p[0-9]+$"))
        .respond_with(html("<html><body>leaf</body></html>"))
        .mount(&server)
        .await;

    let visited = crawl(&base_url, &create_test_config(5)).await.unwrap();

    // The seed and four children fill the budget; the next new link trips it
    assert_eq!(visited.len(), 5);
    assert!(visited.record_count() >= 1);
}

#[tokio::test]
async fn test_parallel_fetches_bounded_by_concurrency() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/slow{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", links)).await;
    Mock::given(method("GET"))
        .and(path_regex("^/slow[0-9]+$"))
        .respond_with(
            html("<html><body>slow</body></html>").set_delay(Duration::from_millis(300)),
        )
        .expect(10)
        .mount(&server)
        .await;

    let mut config = create_test_config(50);
    config.crawler.max_concurrency = 2;

    let started = Instant::now();
    let visited = crawl(&base_url, &config).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(visited.record_count(), 11);
    // Ten 300ms fetches two at a time take at least five rounds
    assert!(
        elapsed >= Duration::from_millis(1450),
        "finished too fast for two parallel fetches: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/flaky">Flaky</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("<html><body><h1>Eventually</h1></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let visited = crawl(&base_url, &create_test_config(50)).await.unwrap();

    let flaky = visited
        .get(&normalize_url(&format!("{}/flaky", base_url)).unwrap())
        .expect("Flaky page should be recorded after retries");
    assert_eq!(flaky.title, "Eventually");

    let flaky_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/flaky")
        .count();
    assert_eq!(flaky_requests, 3);
}

#[tokio::test]
async fn test_failed_page_does_not_fail_crawl() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/broken">Broken</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let visited = crawl(&base_url, &create_test_config(50)).await.unwrap();

    let broken = normalize_url(&format!("{}/broken", base_url)).unwrap();
    assert!(visited.contains(&broken));
    assert!(visited.get(&broken).is_none());
    assert_eq!(visited.record_count(), 1);
}

#[tokio::test]
async fn test_external_links_recorded_not_followed() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body>
        <a href="https://external.invalid/x">Elsewhere</a>
        <a href="mailto:someone@example.com">Mail</a>
        </body></html>"#,
    )
    .await;

    let visited = crawl(&base_url, &create_test_config(50)).await.unwrap();

    assert_eq!(visited.len(), 1);
    assert!(!visited.contains(&normalize_url("https://external.invalid/x").unwrap()));

    let home = visited.get(&normalize_url(&base_url).unwrap()).unwrap();
    assert_eq!(home.external_links, vec!["https://external.invalid/x"]);
    assert!(home.internal_links.is_empty());
}

#[tokio::test]
async fn test_non_html_page_skipped() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/data.json">Data</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let visited = crawl(&base_url, &create_test_config(50)).await.unwrap();

    let data = normalize_url(&format!("{}/data.json", base_url)).unwrap();
    assert!(visited.contains(&data));
    assert!(visited.get(&data).is_none());
}

#[tokio::test]
async fn test_unreachable_seed_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = crawl(&server.uri(), &create_test_config(50)).await;
    assert!(matches!(result, Err(CrawlError::SeedUnreachable { .. })));
}

#[tokio::test]
async fn test_report_and_graph_written() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Rust Home</title></head><body>
        <p>All about crates.</p><a href="/about">About</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><body><h1>About</h1><a href="/">Home</a></body></html>"#,
    )
    .await;

    let visited = crawl(&base_url, &create_test_config(50)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.csv");
    let words = vec!["rust".to_string(), "crates".to_string(), "python".to_string()];
    let rows = write_csv_report(&visited, &words, &report_path).unwrap();
    assert_eq!(rows, 2);

    let mut reader = csv::Reader::from_path(&report_path).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let home = records
        .iter()
        .find(|r| &r[1] == "Rust Home")
        .expect("Home row should be present");
    assert_eq!(&home[2], "All about crates.");
    assert_eq!(&home[9], "rust;crates");

    let graph = LinkGraph::from_visited(&visited);
    let home_key = normalize_url(&base_url).unwrap().to_string();
    let about_key = normalize_url(&format!("{}/about", base_url))
        .unwrap()
        .to_string();
    assert!(graph.contains_edge(&home_key, &about_key));
    assert!(graph.contains_edge(&about_key, &home_key));
}
