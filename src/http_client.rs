use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use thiserror::Error;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 20;
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/119 Safari/537.36";

static CLIENT: OnceCell<Client> = OnceCell::new();

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("invalid json from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn http_client() -> Result<&'static Client, FetchError> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .map_err(FetchError::Build)
    })
}

/// Read access to the remote tournament API.
pub trait TournamentApi: Send + Sync {
    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    language: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            language: language.into(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl TournamentApi for ApiClient {
    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        let client = http_client()?;
        let url = self.url_for(path);

        let mut query: Vec<(&str, &str)> = vec![("language", self.language.as_str())];
        for (key, value) in params {
            // Caller params win over the injected language, matching dict-update order.
            query.retain(|(k, _)| k != key);
            query.push((*key, value.as_str()));
        }

        tracing::debug!(%url, "GET");
        let resp = client
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .query(&query)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = resp.text().map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}
