//! Searcher over the remote artefact registry API.
//!
//! Issues `GET {base_url}/v1/models` authenticated with a bearer API key and
//! decodes a JSON array of [`ModelSearchResult`].

use std::time::Duration;

use tracing::debug;

use crate::search::{ModelSearchResult, SearchQuery, Searcher};
use crate::{Error, Result};

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("corvus/", env!("CARGO_PKG_VERSION"));

/// Overall request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for one remote registry.
pub struct RemoteSearcher {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl RemoteSearcher {
    /// Create a searcher for the registry at `base_url`.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }
}

impl Searcher for RemoteSearcher {
    fn models(&self, query: &SearchQuery) -> Result<Vec<ModelSearchResult>> {
        let url = self.models_url();
        let mut request = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Accept", "application/json")
            .set("User-Agent", USER_AGENT);

        if let Some(ref filter) = query.repository {
            request = request.query("repository", &filter.repository);
            if let Some(ref branch) = filter.branch {
                request = request.query("branch", branch);
            }
        }
        if query.include_children {
            request = request.query("include_children", "true");
        }

        debug!(%url, ?query, "querying remote registry");

        match request.call() {
            Ok(resp) => {
                let models: Vec<ModelSearchResult> = resp
                    .into_json()
                    .map_err(|e| Error::Http(format!("invalid response body: {}", e)))?;
                debug!(count = models.len(), "remote search complete");
                Ok(models)
            }
            Err(ureq::Error::Status(401, _)) => Err(Error::Http(
                "API key was rejected (401 Unauthorized); set a new one with `corvus set api_key`"
                    .to_string(),
            )),
            Err(ureq::Error::Status(403, _)) => Err(Error::Http(
                "API key lacks permission to list models (403 Forbidden)".to_string(),
            )),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(Error::Http(format!("HTTP {}: {}", code, body)))
            }
            Err(e) => Err(Error::Http(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one HTTP response and report the request head that was received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                head.push_str(&line);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(head);
        });

        (format!("http://{}", addr), rx)
    }

    const ONE_MODEL: &str = r#"[{
        "model_id": {"name": "resnet", "short_schema_id": "a1b2", "model_size": 1536},
        "creation_time": 1700000000,
        "vcs_info": {
            "branch": "main",
            "sha": "deadbeefcafe",
            "remote_repository": {"owner": "acme", "repository": "vision"}
        }
    }]"#;

    #[test]
    fn test_remote_search_decodes_models() {
        let (base_url, rx) = serve_once("200 OK", ONE_MODEL);
        let searcher = RemoteSearcher::new(&base_url, "sk-test");

        let models = searcher.models(&SearchQuery::new()).unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_id.name, "resnet");
        assert_eq!(models[0].model_id.model_size, 1536);
        assert_eq!(
            models[0].vcs_info.remote_repository.as_ref().unwrap().owner,
            "acme"
        );

        let head = rx.recv().unwrap();
        assert!(head.starts_with("GET /v1/models HTTP/1.1"));
        assert!(head.contains("Bearer sk-test"));
    }

    #[test]
    fn test_remote_search_sends_filters() {
        let (base_url, rx) = serve_once("200 OK", "[]");
        let searcher = RemoteSearcher::new(&format!("{}/", base_url), "sk-test");
        let query = SearchQuery::new()
            .with_repository("%", Some("main".to_string()))
            .with_children();

        let models = searcher.models(&query).unwrap();

        assert!(models.is_empty());
        let head = rx.recv().unwrap();
        let request_line = head.lines().next().unwrap();
        assert!(request_line.contains("repository=%25"));
        assert!(request_line.contains("branch=main"));
        assert!(request_line.contains("include_children=true"));
    }

    #[test]
    fn test_remote_unauthorized() {
        let (base_url, _rx) = serve_once("401 Unauthorized", "{}");
        let searcher = RemoteSearcher::new(&base_url, "bad");

        let err = searcher.models(&SearchQuery::new()).unwrap_err();

        assert!(matches!(err, Error::Http(ref msg) if msg.contains("401")));
    }

    #[test]
    fn test_remote_server_error_includes_body() {
        let (base_url, _rx) = serve_once("500 Internal Server Error", "boom");
        let searcher = RemoteSearcher::new(&base_url, "k");

        let err = searcher.models(&SearchQuery::new()).unwrap_err();

        assert!(matches!(err, Error::Http(ref msg) if msg.contains("500") && msg.contains("boom")));
    }
}
