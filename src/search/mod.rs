//! Search over artefact registries.
//!
//! An [`ArtefactEndpoint`] names where artefacts live (a local SQLite
//! registry or the remote registry API). [`open_searcher`] binds an endpoint
//! to a [`Searcher`], which runs a [`SearchQuery`] and returns
//! [`ModelSearchResult`] records.

pub mod local;
pub mod remote;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::{Env, mask_api_key};

pub use local::LocalSearcher;
pub use remote::RemoteSearcher;

/// Environment variable overriding the local registry location.
pub const REGISTRY_PATH_ENV: &str = "CORVUS_REGISTRY_PATH";

/// Environment variable overriding the remote registry base URL.
pub const REMOTE_URL_ENV: &str = "CORVUS_REMOTE_URL";

/// Default base URL of the remote registry API.
pub const DEFAULT_REMOTE_URL: &str = "https://api.shareableai.com";

/// Wildcard repository name, matches any repository.
pub const ANY_REPOSITORY: &str = "%";

/// Identity and size of a stored model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelId {
    /// Model name
    pub name: String,
    /// Short identifier of the model schema
    pub short_schema_id: String,
    /// Serialized size in bytes
    pub model_size: u64,
}

/// Owner/name of the remote repository a model was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub owner: String,
    pub repository: String,
}

/// Version-control metadata attached to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsInfo {
    /// Branch the model was built on
    pub branch: String,
    /// Full commit hash
    pub sha: String,
    /// Remote repository, if the working copy had one configured
    pub remote_repository: Option<RemoteRepository>,
}

/// One model returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSearchResult {
    pub model_id: ModelId,
    /// Creation time in seconds since the Unix epoch
    pub creation_time: i64,
    pub vcs_info: VcsInfo,
}

/// Where artefacts are searched.
#[derive(Clone, PartialEq, Eq)]
pub enum ArtefactEndpoint {
    /// Local SQLite registry
    Local { registry_path: PathBuf },
    /// Remote registry API authenticated with an API key
    Remote { api_key: String, base_url: String },
}

impl ArtefactEndpoint {
    /// The local registry: `$CORVUS_REGISTRY_PATH` or `~/.artefact_registry.sqlite`.
    pub fn local(env: &impl Env) -> Result<Self> {
        let registry_path = match env.var(REGISTRY_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .ok_or(crate::Error::HomeDirUnavailable)?
                .join(".artefact_registry.sqlite"),
        };
        Ok(ArtefactEndpoint::Local { registry_path })
    }

    /// The remote registry, authenticated with `api_key`.
    pub fn remote(api_key: impl Into<String>, env: &impl Env) -> Self {
        ArtefactEndpoint::Remote {
            api_key: api_key.into(),
            base_url: env
                .var(REMOTE_URL_ENV)
                .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string()),
        }
    }
}

// Never print the full API key.
impl std::fmt::Debug for ArtefactEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtefactEndpoint::Local { registry_path } => f
                .debug_struct("Local")
                .field("registry_path", registry_path)
                .finish(),
            ArtefactEndpoint::Remote { api_key, base_url } => f
                .debug_struct("Remote")
                .field("api_key", &mask_api_key(api_key))
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Repository/branch restriction for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFilter {
    /// Repository name; [`ANY_REPOSITORY`] matches all
    pub repository: String,
    /// Branch name, if restricted
    pub branch: Option<String>,
}

/// Filters applied to a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Restrict to a repository and optionally a branch
    pub repository: Option<RepositoryFilter>,
    /// Also return child artefacts derived from other models
    pub include_children: bool,
}

impl SearchQuery {
    /// Create an unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict results to a repository and optional branch.
    pub fn with_repository(self, repository: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            repository: Some(RepositoryFilter {
                repository: repository.into(),
                branch,
            }),
            ..self
        }
    }

    /// Include child artefacts in the results.
    pub fn with_children(self) -> Self {
        Self {
            include_children: true,
            ..self
        }
    }
}

/// Executes queries against one endpoint.
pub trait Searcher {
    /// Run `query` and return the matching models.
    fn models(&self, query: &SearchQuery) -> Result<Vec<ModelSearchResult>>;
}

/// Bind an endpoint to a searcher.
pub fn open_searcher(endpoint: &ArtefactEndpoint) -> Result<Box<dyn Searcher>> {
    match endpoint {
        ArtefactEndpoint::Local { registry_path } => {
            Ok(Box::new(LocalSearcher::open(registry_path)?))
        }
        ArtefactEndpoint::Remote { api_key, base_url } => {
            Ok(Box::new(RemoteSearcher::new(base_url, api_key)))
        }
    }
}
