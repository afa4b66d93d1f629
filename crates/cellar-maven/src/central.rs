//! Maven Central "shadow" probe (§4.3 step 4).
//!
//! Republishing under a coordinate that already exists on Central is
//! rejected unless the coordinate is on an explicit allow-list. Client
//! construction and retry shape follow the same pattern as the download
//! client elsewhere in this workspace: a short-timeout `reqwest::Client`,
//! HEAD first with a GET fallback, transient errors retried a bounded
//! number of times.

use cellar_util::errors::CoreError;
use std::time::Duration;

const CENTRAL_BASE: &str = "https://repo.maven.apache.org/maven2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 2;

pub struct CentralProbe {
    client: reqwest::Client,
    base_url: String,
}

impl CentralProbe {
    pub fn new() -> Self {
        Self::with_base_url(CENTRAL_BASE.to_string())
    }

    /// Build a probe against a custom base URL, for testing against a local
    /// stand-in instead of the real Central index.
    pub fn with_base_url(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("cellar-deploy")
            .build()
            .expect("reqwest client config is static and valid");
        Self { client, base_url }
    }

    /// True iff `(group, artifact)` already has published metadata on Central.
    pub async fn exists(&self, group: &str, artifact: &str) -> Result<bool, CoreError> {
        let group_path = group.replace('.', "/");
        let url = format!("{}/{group_path}/{artifact}/maven-metadata.xml", self.base_url);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.head(&url).send().await {
                Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => return Ok(false),
                Ok(resp) if resp.status().is_success() => return Ok(true),
                Ok(resp) if resp.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED => {
                    return self.exists_via_get(&url).await;
                }
                Ok(resp) if resp.status().is_server_error() && attempt < MAX_RETRIES => continue,
                Ok(resp) => {
                    return Err(CoreError::CentralShadowCheckFailure {
                        message: format!("unexpected status {} from Central", resp.status()),
                    })
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < MAX_RETRIES => continue,
                Err(e) => {
                    return Err(CoreError::CentralShadowCheckFailure {
                        message: format!("Central probe failed: {e}"),
                    })
                }
            }
        }
    }

    async fn exists_via_get(&self, url: &str) -> Result<bool, CoreError> {
        match self.client.get(url).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => Ok(false),
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => Err(CoreError::CentralShadowCheckFailure {
                message: format!("unexpected status {} from Central", resp.status()),
            }),
            Err(e) => Err(CoreError::CentralShadowCheckFailure {
                message: format!("Central probe failed: {e}"),
            }),
        }
    }
}

impl Default for CentralProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn not_found_on_unreachable_host_is_check_failure() {
        // Port 0 never accepts connections; this exercises the retry and
        // error-mapping path without depending on network access.
        let probe = CentralProbe::with_base_url("http://127.0.0.1:0".to_string());
        let result = probe.exists("com.example", "lib").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().tag(),
            "central-shadow-check-failure"
        );
    }
}
