//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full mirror cycle end-to-end against a scratch directory.

use site_mirror::config::UserAgentConfig;
use site_mirror::crawler::{mirror_site, CrawlOptions, Crawler, FetchError, HttpFetcher};
use site_mirror::manifest::{RunStatus, SqliteManifest};
use site_mirror::output::{load_statistics, CrawlCompletion};
use site_mirror::store::{LocalStore, OverwritePolicy, Store};
use site_mirror::MirrorError;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> HttpFetcher {
    let config = UserAgentConfig {
        crawler_name: "TestMirror".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: None,
    };
    HttpFetcher::new(&config, Duration::from_secs(5)).expect("Failed to build HTTP client")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, at: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Directory the store uses for the mock server's host
fn host_dir(store: &LocalStore) -> PathBuf {
    store.root().join("127.0.0.1")
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_mirror_homepage_and_same_host_links() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(
            r#"<html><body>
            <a href="/about.html">About</a>
            <img src="http://elsewhere.invalid/logo.png">
            </body></html>"#,
        ),
    )
    .await;
    mount_page(&server, "/about.html", html("<html><body>About us</body></html>")).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();

    let report = mirror_site(
        &format!("{}/", server.uri()),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &CrawlOptions::default(),
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(report.stored, 2);
    assert_eq!(report.completion, CrawlCompletion::Finished);
    assert_eq!(report.links_discarded, 1);

    let site = host_dir(&store);
    assert!(fs::read_to_string(site.join("index.html"))
        .unwrap()
        .contains("about.html"));
    assert_eq!(
        fs::read_to_string(site.join("about.html")).unwrap(),
        "<html><body>About us</body></html>"
    );

    let mut paths = requested_paths(&server).await;
    paths.sort();
    assert_eq!(paths, vec!["/", "/about.html"]);
}

#[tokio::test]
async fn test_assets_are_mirrored_and_each_fetched_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(
            r#"<html><head>
            <link rel="stylesheet" href="/css/site.css">
            <script src="/js/app.js"></script>
            </head><body>
            <a href="/docs/">Docs</a>
            <a href="/docs/#install">Install</a>
            <img src="/img/logo.png?v=3">
            </body></html>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/docs/",
        html(r#"<a href="/">Home</a><a href="../img/logo.png">Logo</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/css/site.css",
        ResponseTemplate::new(200)
            .set_body_string("body { color: black; }")
            .insert_header("content-type", "text/css"),
    )
    .await;
    mount_page(
        &server,
        "/js/app.js",
        ResponseTemplate::new(200)
            .set_body_string("console.log('hi');")
            .insert_header("content-type", "application/javascript"),
    )
    .await;
    mount_page(
        &server,
        "/img/logo.png",
        ResponseTemplate::new(200)
            .set_body_bytes(vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3])
            .insert_header("content-type", "image/png"),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();

    let report = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Fail,
        &CrawlOptions::default(),
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(report.stored, 5);
    assert_eq!(report.skipped, 0);

    let site = host_dir(&store);
    assert!(site.join("index.html").is_file());
    assert!(site.join("docs/index.html").is_file());
    assert!(site.join("css/site.css").is_file());
    assert!(site.join("js/app.js").is_file());
    assert_eq!(
        fs::read(site.join("img/logo.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3]
    );

    let paths = requested_paths(&server).await;
    assert_eq!(paths.len(), 5, "every resource is fetched once: {:?}", paths);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestMirror/1.0"))
        .respond_with(html("<p>hello</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();

    let report = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &CrawlOptions::default(),
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(report.stored, 1);
}

#[tokio::test]
async fn test_missing_page_aborts_mirror() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html(r#"<a href="/gone.html">Gone</a>"#)).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();

    let result = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &CrawlOptions::default(),
    )
    .await;

    match result {
        Err(MirrorError::Fetch(FetchError::Status { url, status })) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/gone.html"), "unexpected url {}", url);
        }
        other => panic!("expected a 404 fetch error, got {:?}", other),
    }

    // The homepage was stored before the failure
    assert!(host_dir(&store).join("index.html").is_file());
}

#[tokio::test]
async fn test_keep_going_skips_missing_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(r#"<a href="/gone.html">Gone</a><a href="/here.html">Here</a>"#),
    )
    .await;
    mount_page(&server, "/here.html", html("here")).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();
    let options = CrawlOptions {
        keep_going: true,
        ..Default::default()
    };

    let report = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &options,
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(report.stored, 2);
    assert_eq!(report.fetch_failures, 1);
    assert!(!host_dir(&store).join("gone.html").exists());
}

#[tokio::test]
async fn test_existing_file_strict_and_permissive() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html(r#"<a href="/next.html">Next</a>"#)).await;
    mount_page(&server, "/next.html", html("next")).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();
    let site = host_dir(&store);
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("index.html"), "previous mirror").unwrap();

    let strict = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Fail,
        &CrawlOptions::default(),
    )
    .await;

    match strict {
        Err(MirrorError::StorageConflict { uri, path }) => {
            assert_eq!(uri, format!("{}/", server.uri()));
            assert_eq!(path, site.join("index.html"));
        }
        other => panic!("expected a storage conflict, got {:?}", other),
    }

    let permissive = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &CrawlOptions::default(),
    )
    .await
    .expect("Permissive mirror should succeed");

    assert_eq!(permissive.stored, 0);
    assert_eq!(permissive.skipped, 1);
    assert_eq!(
        fs::read_to_string(site.join("index.html")).unwrap(),
        "previous mirror"
    );
    assert!(!site.join("next.html").exists());
}

#[tokio::test]
async fn test_redirect_stored_under_requested_path() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html(r#"<a href="/old.html">Old</a>"#)).await;
    mount_page(
        &server,
        "/old.html",
        ResponseTemplate::new(301).insert_header("location", "/new.html"),
    )
    .await;
    mount_page(&server, "/new.html", html("moved here")).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();

    let report = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &CrawlOptions::default(),
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(report.stored, 2);
    let site = host_dir(&store);
    assert_eq!(
        fs::read_to_string(site.join("old.html")).unwrap(),
        "moved here"
    );
    assert!(!site.join("new.html").exists());
}

#[tokio::test]
async fn test_latin1_page_links_followed() {
    let server = MockServer::start().await;

    // "café" in ISO-8859-1 followed by a link
    let mut body = b"<p>caf\xe9</p>".to_vec();
    body.extend_from_slice(br#"<a href="/menu.html">Menu</a>"#);

    mount_page(
        &server,
        "/",
        ResponseTemplate::new(200)
            .set_body_bytes(body.clone())
            .insert_header("content-type", "text/html; charset=ISO-8859-1"),
    )
    .await;
    mount_page(&server, "/menu.html", html("menu")).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();

    let report = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &CrawlOptions::default(),
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(report.stored, 2);
    let site = host_dir(&store);
    assert_eq!(fs::read(site.join("index.html")).unwrap(), body);
    assert!(site.join("menu.html").is_file());
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html(r#"<a href="/one.html">1</a>"#)).await;
    mount_page(&server, "/one.html", html(r#"<a href="/two.html">2</a>"#)).await;
    mount_page(&server, "/two.html", html("two")).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();
    let options = CrawlOptions {
        max_depth: Some(1),
        ..Default::default()
    };

    let report = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &options,
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(report.stored, 2);
    assert!(!host_dir(&store).join("two.html").exists());
}

#[tokio::test]
async fn test_deadline_stops_slow_site() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html("slow").set_delay(Duration::from_secs(3)),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();
    let options = CrawlOptions {
        deadline: Some(Duration::from_millis(200)),
        ..Default::default()
    };

    let report = mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &options,
    )
    .await
    .expect("A deadline is not an error");

    assert_eq!(report.completion, CrawlCompletion::DeadlineReached);
    assert_eq!(report.stored, 0);
}

#[tokio::test]
async fn test_manifest_records_run() {
    let home_body = r#"<a href="/about.html">About</a>"#;
    let about_body = "about";

    let server = MockServer::start().await;
    mount_page(&server, "/", html(home_body)).await;
    mount_page(&server, "/about.html", html(about_body)).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(&dir.path().join("mirror")).unwrap();
    let mut manifest = SqliteManifest::open(&dir.path().join("mirror.db")).unwrap();

    let mut crawler = Crawler::new(&server.uri()).unwrap();
    let run_id = manifest
        .begin_run(crawler.homepage().as_str(), "test-hash")
        .unwrap();

    let report = crawler
        .crawl(
            &test_fetcher(),
            &mut store,
            OverwritePolicy::Skip,
            &CrawlOptions::default(),
        )
        .await
        .expect("Mirror should succeed");

    manifest
        .record_resources(run_id, crawler.stored_resources())
        .unwrap();
    manifest
        .finish_run(run_id, RunStatus::from(report.completion))
        .unwrap();

    let run = manifest.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(manifest.count_resources(run_id).unwrap(), 2);
    assert_eq!(
        manifest.total_bytes(run_id).unwrap(),
        (home_body.len() + about_body.len()) as u64
    );

    let about = format!("{}/about.html", server.uri());
    let recorded = manifest.latest_path_for(&about).unwrap().unwrap();
    assert_eq!(
        PathBuf::from(recorded),
        host_dir(&store).join("about.html")
    );

    let stats = load_statistics(&manifest).unwrap();
    assert_eq!(stats.runs.len(), 1);
    assert_eq!(stats.total_resources, 2);
}

#[tokio::test]
async fn test_store_home_follows_homepage_host() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html("home")).await;

    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::new(dir.path()).unwrap();

    mirror_site(
        &server.uri(),
        &test_fetcher(),
        &mut store,
        OverwritePolicy::Skip,
        &CrawlOptions::default(),
    )
    .await
    .expect("Mirror should succeed");

    assert_eq!(store.home(), Some("127.0.0.1"));
}
