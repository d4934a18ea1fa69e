//! Client configuration.
//!
//! Decides which data service the store talks to: the GraphQL data API when
//! an endpoint and API key are configured, otherwise a local JSON file.

use std::env;
use std::path::PathBuf;

use crate::sync::{GraphQlSyncAdapter, LocalFileAdapter, Model, RemoteSyncAdapter, SyncResponse};
use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const ENV_API_URL: &str = "VERNOTE_API_URL";
pub const ENV_API_KEY: &str = "VERNOTE_API_KEY";
pub const ENV_DATA_PATH: &str = "VERNOTE_DATA_PATH";

const DATA_FILE_NAME: &str = "notes.json";

/// Raw settings gathered from the environment and command-line overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub data_path: Option<PathBuf>,
}

/// Where notes live, resolved from a [`ClientConfig`]
#[derive(Clone, PartialEq, Eq)]
pub enum Backend {
    Remote { api_url: String, api_key: String },
    Local { data_path: PathBuf },
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { api_url, .. } => formatter
                .debug_struct("Remote")
                .field("api_url", api_url)
                .field("api_key", &"[REDACTED]")
                .finish(),
            Self::Local { data_path } => formatter
                .debug_struct("Local")
                .field("data_path", data_path)
                .finish(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `VERNOTE_*` environment variables.
    pub fn from_env() -> Self {
        parse_config(|key| env::var(key).ok())
    }

    /// Overlay explicit values (e.g. command-line flags) on top of this config.
    #[must_use]
    pub fn with_overrides(mut self, api_url: Option<String>, data_path: Option<PathBuf>) -> Self {
        if let Some(api_url) = normalize_text_option(api_url) {
            self.api_url = Some(api_url);
        }
        if let Some(data_path) = data_path {
            self.data_path = Some(data_path);
        }
        self
    }

    /// Resolve the backend.
    ///
    /// An API URL without a key (or the reverse) is an error rather than a
    /// silent fallback to local mode.
    pub fn backend(&self) -> Result<Backend> {
        match (&self.api_url, &self.api_key) {
            (None, None) => Ok(Backend::Local {
                data_path: self.data_path.clone().unwrap_or_else(default_data_path),
            }),
            (Some(api_url), Some(api_key)) => {
                if !is_http_url(api_url) {
                    return Err(Error::Config(format!(
                        "{ENV_API_URL} must include http:// or https://"
                    )));
                }
                Ok(Backend::Remote {
                    api_url: api_url.trim_end_matches('/').to_string(),
                    api_key: api_key.clone(),
                })
            }
            (Some(_), None) => Err(Error::Config(format!(
                "{ENV_API_KEY} is required when {ENV_API_URL} is set"
            ))),
            (None, Some(_)) => Err(Error::Config(format!(
                "{ENV_API_URL} is required when {ENV_API_KEY} is set"
            ))),
        }
    }

    /// Build the adapter for the resolved backend.
    pub fn build_adapter(&self) -> Result<ConfiguredAdapter> {
        match self.backend()? {
            Backend::Remote { api_url, api_key } => {
                tracing::info!("Using remote data API at {}", api_url);
                Ok(ConfiguredAdapter::Remote(GraphQlSyncAdapter::new(
                    api_url, api_key,
                )?))
            }
            Backend::Local { data_path } => {
                tracing::info!("Running in local-only mode ({})", data_path.display());
                Ok(ConfiguredAdapter::Local(LocalFileAdapter::new(data_path)))
            }
        }
    }
}

/// Adapter chosen at runtime from configuration
#[derive(Debug)]
pub enum ConfiguredAdapter {
    Remote(GraphQlSyncAdapter),
    Local(LocalFileAdapter),
}

impl RemoteSyncAdapter for ConfiguredAdapter {
    async fn list<M: Model>(&self) -> SyncResponse<Vec<M::Record>> {
        match self {
            Self::Remote(adapter) => adapter.list::<M>().await,
            Self::Local(adapter) => adapter.list::<M>().await,
        }
    }

    async fn create<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
        match self {
            Self::Remote(adapter) => adapter.create::<M>(record).await,
            Self::Local(adapter) => adapter.create::<M>(record).await,
        }
    }

    async fn update<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
        match self {
            Self::Remote(adapter) => adapter.update::<M>(record).await,
            Self::Local(adapter) => adapter.update::<M>(record).await,
        }
    }
}

/// Default location of the local-only data file.
pub fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vernote")
        .join(DATA_FILE_NAME)
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> ClientConfig {
    ClientConfig {
        api_url: normalize_text_option(lookup(ENV_API_URL)),
        api_key: normalize_text_option(lookup(ENV_API_KEY)),
        data_path: normalize_text_option(lookup(ENV_DATA_PATH)).map(PathBuf::from),
    }
}
