//! Searcher over the local SQLite artefact registry.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

use crate::search::{
    ANY_REPOSITORY, ModelId, ModelSearchResult, RemoteRepository, SearchQuery, Searcher, VcsInfo,
};
use crate::{Error, Result};

/// Layout of the `models` table in the local registry.
pub const MODELS_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS models (
    model_name TEXT NOT NULL,
    short_model_id TEXT NOT NULL,
    model_size INTEGER NOT NULL,
    creation_time INTEGER NOT NULL,
    branch TEXT NOT NULL,
    commit_sha TEXT NOT NULL,
    repository_owner TEXT,
    repository_name TEXT,
    parent_id TEXT
);
"#;

/// Read-only view of a local registry database.
pub struct LocalSearcher {
    conn: Connection,
}

impl LocalSearcher {
    /// Open the registry at `path`. The file must already exist.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::RegistryNotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(path = %path.display(), "opened local registry");
        Ok(Self { conn })
    }

    fn row_to_result(row: &Row<'_>) -> rusqlite::Result<ModelSearchResult> {
        let size: i64 = row.get("model_size")?;
        let model_size =
            u64::try_from(size).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(2, size))?;
        let owner: Option<String> = row.get("repository_owner")?;
        let repository: Option<String> = row.get("repository_name")?;

        Ok(ModelSearchResult {
            model_id: ModelId {
                name: row.get("model_name")?,
                short_schema_id: row.get("short_model_id")?,
                model_size,
            },
            creation_time: row.get("creation_time")?,
            vcs_info: VcsInfo {
                branch: row.get("branch")?,
                sha: row.get("commit_sha")?,
                remote_repository: owner
                    .zip(repository)
                    .map(|(owner, repository)| RemoteRepository { owner, repository }),
            },
        })
    }
}

impl Searcher for LocalSearcher {
    fn models(&self, query: &SearchQuery) -> Result<Vec<ModelSearchResult>> {
        let mut sql = String::from(
            "SELECT model_name, short_model_id, model_size, creation_time, branch, commit_sha, \
             repository_owner, repository_name FROM models WHERE 1=1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if !query.include_children {
            sql.push_str(" AND parent_id IS NULL");
        }

        if let Some(ref filter) = query.repository {
            // The wildcard matches every model, including those without a repository.
            if filter.repository != ANY_REPOSITORY {
                sql.push_str(" AND repository_name = ?");
                params_vec.push(Box::new(filter.repository.clone()));
            }
            if let Some(ref branch) = filter.branch {
                sql.push_str(" AND branch = ?");
                params_vec.push(Box::new(branch.clone()));
            }
        }

        sql.push_str(" ORDER BY creation_time DESC, model_name ASC");

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let models = stmt
            .query_map(params_refs.as_slice(), Self::row_to_result)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = models.len(), "local search complete");
        Ok(models)
    }
}
