//! Integration tests for the scan loop
//!
//! These tests use wiremock to stand in for crt.sh and run full scan cycles
//! against an on-disk database.

use async_trait::async_trait;
use std::path::Path;
use subwatch::config::parse_config;
use subwatch::output::{acknowledge_new, generate_markdown_summary, generate_summary};
use subwatch::scanner::{
    sync_declared_domains, CrtSh, DnsCheck, HttpCheck, HttpProbe, ScanLoop, SourceError,
    SourceRegistry,
};
use subwatch::storage::{SqliteStorage, Storage};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Resolves every host except those starting with `dead.`
struct FakeDns;

#[async_trait]
impl DnsCheck for FakeDns {
    async fn resolves(&self, hostname: &str) -> Result<bool, SourceError> {
        Ok(!hostname.starts_with("dead."))
    }
}

/// Answers 200 with a body the length of the hostname
struct FakeHttp;

#[async_trait]
impl HttpCheck for FakeHttp {
    async fn probe(&self, hostname: &str) -> Result<Option<HttpProbe>, SourceError> {
        Ok(Some(HttpProbe {
            status_code: 200,
            page_size: hostname.len() as u64,
        }))
    }
}

fn config_toml(db_path: &Path, crtsh_url: &str) -> String {
    format!(
        r#"
        [storage]
        database-path = "{}"

        [scheduler]
        poll-interval = 1

        [sources]
        crtsh-url = "{}"

        [[domain]]
        name = "broken.test"
        scanners = ["crtsh"]

        [[domain]]
        name = "example.test"
        scanners = ["crtsh"]

        [[domain]]
        name = "quiet.test"
        scanners = ["crtsh"]
        http-check = false
        "#,
        db_path.display(),
        crtsh_url
    )
}

async fn mount_crtsh(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "%.example.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name_value": "www.example.test\n*.example.test" },
            { "name_value": "API.example.test\ndead.example.test" },
            { "name_value": "example.test" },
            { "name_value": "www.example.test" }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "%.broken.test"))
        .respond_with(ResponseTemplate::new(502))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "%.quiet.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name_value": "mail.quiet.test" }
        ])))
        .mount(server)
        .await;
}

fn build_loop(storage: SqliteStorage, crtsh_url: &str) -> ScanLoop<SqliteStorage> {
    let registry = SourceRegistry::new().register(CrtSh::new(reqwest::Client::new(), crtsh_url));
    ScanLoop::new(
        storage,
        Box::new(registry),
        Box::new(FakeDns),
        Box::new(FakeHttp),
    )
}

fn hosts(storage: &SqliteStorage, name: &str) -> Vec<String> {
    let domain = storage.find_domain_by_name(name).unwrap().unwrap();
    let mut hosts: Vec<_> = storage
        .list_subdomains(domain.id)
        .unwrap()
        .into_iter()
        .map(|s| s.subdomain)
        .collect();
    hosts.sort();
    hosts
}

#[tokio::test]
async fn test_full_cycle_against_mock_crtsh() {
    let mock_server = MockServer::start().await;
    mount_crtsh(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("subdomains.db");
    let config = parse_config(&config_toml(&db_path, &mock_server.uri())).unwrap();

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(sync_declared_domains(&mut storage, &config.domains).unwrap(), 3);

    let mut scan_loop = build_loop(storage, &mock_server.uri());
    let report = scan_loop.run_cycle().await.unwrap();

    assert_eq!(report.domains, 3);
    assert_eq!(report.scanned, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.new_subdomains, 4);

    let storage = scan_loop.into_storage();
    assert_eq!(
        hosts(&storage, "example.test"),
        vec!["api.example.test", "dead.example.test", "www.example.test"]
    );
    assert_eq!(hosts(&storage, "quiet.test"), vec!["mail.quiet.test"]);

    let broken = storage.find_domain_by_name("broken.test").unwrap().unwrap();
    assert!(broken.last_scan.is_none());

    let example = storage.find_domain_by_name("example.test").unwrap().unwrap();
    assert!(example.last_scan.is_some());
    for sub in storage.list_subdomains(example.id).unwrap() {
        assert!(sub.is_new);
        assert!(sub.dns_checked);
        if sub.subdomain == "dead.example.test" {
            assert!(sub.status_code.is_none());
        } else {
            assert_eq!(sub.status_code, Some(200));
            assert_eq!(sub.page_size, Some(sub.subdomain.len() as u64));
        }
    }

    let quiet = storage.find_domain_by_name("quiet.test").unwrap().unwrap();
    let mail = &storage.list_subdomains(quiet.id).unwrap()[0];
    assert!(mail.dns_checked);
    assert!(mail.status_code.is_none());
}

#[tokio::test]
async fn test_inventory_survives_reopen_and_report_acknowledges() {
    let mock_server = MockServer::start().await;
    mount_crtsh(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("subdomains.db");
    let config = parse_config(&config_toml(&db_path, &mock_server.uri())).unwrap();

    {
        let mut storage = SqliteStorage::new(&db_path).unwrap();
        sync_declared_domains(&mut storage, &config.domains).unwrap();
        let mut scan_loop = build_loop(storage, &mock_server.uri());
        scan_loop.run_cycle().await.unwrap();
    }

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_domains().unwrap(), 3);

    let summary = generate_summary(&storage).unwrap();
    assert_eq!(summary.total_new(), 4);

    let report_path = dir.path().join("inventory.md");
    generate_markdown_summary(&summary, &report_path).unwrap();
    let markdown = std::fs::read_to_string(&report_path).unwrap();
    assert!(markdown.contains("## example.test"));
    assert!(markdown.contains("www.example.test"));
    assert!(markdown.contains("- **Last Scan**: never"));

    assert_eq!(acknowledge_new(&mut storage, &summary).unwrap(), 4);
    let example = storage.find_domain_by_name("example.test").unwrap().unwrap();
    assert!(storage.list_new_subdomains(example.id).unwrap().is_empty());
    assert_eq!(storage.count_subdomains(example.id).unwrap(), 3);
}

#[tokio::test]
async fn test_second_cycle_waits_for_interval() {
    let mock_server = MockServer::start().await;
    mount_crtsh(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("subdomains.db");
    let config = parse_config(&config_toml(&db_path, &mock_server.uri())).unwrap();

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    sync_declared_domains(&mut storage, &config.domains).unwrap();
    let mut scan_loop = build_loop(storage, &mock_server.uri());

    scan_loop.run_cycle().await.unwrap();
    let report = scan_loop.run_cycle().await.unwrap();

    // Only the domain whose scan failed is still due
    assert_eq!(report.skipped, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.new_subdomains, 0);
}
