use super::PassiveSource;
use crate::scanner::collaborators::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Certificate-transparency search through crt.sh
pub struct CrtSh {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    name_value: String,
}

impl CrtSh {
    pub const NAME: &'static str = "crtsh";

    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn http_error(&self, error: reqwest::Error) -> SourceError {
        SourceError::Http {
            source_name: Self::NAME.to_string(),
            error,
        }
    }
}

#[async_trait]
impl PassiveSource for CrtSh {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn enumerate(&self, domain: &str) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/", self.base_url);
        let pattern = format!("%.{}", domain);
        tracing::debug!("crt.sh query for {}", domain);

        let res = self
            .client
            .get(url)
            .query(&[("q", pattern.as_str()), ("output", "json")])
            .send()
            .await
            .map_err(|e| self.http_error(e))?;

        if !res.status().is_success() {
            return Err(SourceError::InvalidResponse(format!(
                "{} (HTTP {})",
                Self::NAME,
                res.status().as_u16()
            )));
        }

        let entries: Vec<CrtShEntry> = res
            .json()
            .await
            .map_err(|_| SourceError::InvalidResponse(Self::NAME.to_string()))?;

        // name_value packs every SAN of a certificate, one per line
        Ok(entries
            .into_iter()
            .flat_map(|entry| {
                entry
                    .name_value
                    .lines()
                    .map(|name| name.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|name| !name.is_empty())
            .collect())
    }
}
