use super::PassiveSource;
use crate::scanner::collaborators::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Hostnames seen in Wayback Machine captures
pub struct WebArchive {
    client: Client,
    base_url: String,
}

impl WebArchive {
    pub const NAME: &'static str = "webarchive";

    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PassiveSource for WebArchive {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn enumerate(&self, domain: &str) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/cdx/search/cdx", self.base_url);
        tracing::debug!("Wayback CDX query for {}", domain);

        let res = self
            .client
            .get(url)
            .query(&[
                ("url", domain),
                ("matchType", "domain"),
                ("fl", "original"),
                ("output", "json"),
                ("collapse", "urlkey"),
            ])
            .send()
            .await
            .map_err(|error| SourceError::Http {
                source_name: Self::NAME.to_string(),
                error,
            })?;

        if !res.status().is_success() {
            return Err(SourceError::InvalidResponse(format!(
                "{} (HTTP {})",
                Self::NAME,
                res.status().as_u16()
            )));
        }

        // An empty result set comes back as an empty body rather than `[]`
        let body = res
            .text()
            .await
            .map_err(|_| SourceError::InvalidResponse(Self::NAME.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Vec<String>> = serde_json::from_str(&body)
            .map_err(|_| SourceError::InvalidResponse(Self::NAME.to_string()))?;

        // The first row is the field header ("original"), which is not a URL
        let hosts: HashSet<String> = rows
            .into_iter()
            .flatten()
            .filter_map(|original| Url::parse(&original).ok())
            .filter_map(|url| url.host_str().map(str::to_string))
            .collect();

        Ok(hosts.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_extracts_hosts_from_captures() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cdx/search/cdx"))
            .and(query_param("url", "example.com"))
            .and(query_param("matchType", "domain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                ["original"],
                ["http://blog.example.com/post/1"],
                ["https://blog.example.com/post/2"],
                ["https://shop.example.com:8443/cart"]
            ])))
            .mount(&mock_server)
            .await;

        let source = WebArchive::new(Client::new(), &mock_server.uri());
        let mut hosts = source.enumerate("example.com").await.unwrap();
        hosts.sort();

        assert_eq!(hosts, vec!["blog.example.com", "shop.example.com"]);
    }

    #[tokio::test]
    async fn test_empty_body_is_no_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cdx/search/cdx"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let source = WebArchive::new(Client::new(), &mock_server.uri());
        assert!(source.enumerate("example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let source = WebArchive::new(Client::new(), &mock_server.uri());
        let result = source.enumerate("example.com").await;
        assert!(matches!(result, Err(SourceError::InvalidResponse(_))));
    }
}
