//! Asset link checks
//!
//! Reads the external resource an asset points at. Never writes to it.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};

use crate::domain::{Asset, AssetSyncOutcome, DomainError, DomainResult};

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AssetProbe: Send + Sync {
    /// `Err` means the check itself could not run (e.g. offline), which is
    /// not a verdict on the asset
    async fn probe(&self, asset: &Asset) -> DomainResult<AssetSyncOutcome>;
}

/// Plain GET against the asset URL
pub struct HttpAssetProbe {
    client: Client,
}

impl Default for HttpAssetProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpAssetProbe {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AssetProbe for HttpAssetProbe {
    async fn probe(&self, asset: &Asset) -> DomainResult<AssetSyncOutcome> {
        let response = self
            .client
            .get(&asset.url)
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(outcome_for(status, content_type))
    }
}

/// Status codes that mean the link is dead or access was revoked
fn is_unreachable(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::GONE)
}

fn outcome_for(status: StatusCode, content_type: Option<String>) -> AssetSyncOutcome {
    if is_unreachable(status) {
        return AssetSyncOutcome::Unreachable { status: status.as_u16() };
    }

    let mut metadata = Map::new();
    metadata.insert("http_status".into(), Value::from(status.as_u16()));
    if let Some(content_type) = content_type {
        metadata.insert("content_type".into(), Value::String(content_type));
    }
    AssetSyncOutcome::Connected { metadata }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_for_status() {
        assert_eq!(
            outcome_for(StatusCode::NOT_FOUND, None),
            AssetSyncOutcome::Unreachable { status: 404 }
        );
        assert!(matches!(outcome_for(StatusCode::FORBIDDEN, None), AssetSyncOutcome::Unreachable { status: 403 }));

        match outcome_for(StatusCode::OK, Some("text/html".into())) {
            AssetSyncOutcome::Connected { metadata } => {
                assert_eq!(metadata["http_status"], Value::from(200));
                assert_eq!(metadata["content_type"], Value::from("text/html"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
