//! In-memory CDN used by unit tests

use crate::cdn::http::{ConditionalHeaders, HttpClient, HttpResponse};
use crate::error::CdnResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

pub(crate) const BASE_URL: &str = "https://cdn.example/";

#[derive(Debug, Clone)]
enum Route {
    File { body: Vec<u8>, etag: Option<String> },
    Status(u16),
}

/// A request the client received
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub url: String,
    pub if_none_match: Option<String>,
}

/// Serves files keyed by relative path; unknown paths answer 404.
///
/// A request whose `If-None-Match` equals the file's ETag answers 304.
#[derive(Debug, Default)]
pub(crate) struct MockCdn {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockCdn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, relative: &str, body: &str, etag: Option<&str>) {
        self.routes.lock().unwrap().insert(
            format!("{}{}", BASE_URL, relative),
            Route::File {
                body: body.as_bytes().to_vec(),
                etag: etag.map(str::to_string),
            },
        );
    }

    pub fn respond_with(&self, relative: &str, status: u16) {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{}{}", BASE_URL, relative), Route::Status(status));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_for(&self, relative: &str) -> usize {
        let url = format!("{}{}", BASE_URL, relative);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }
}

#[async_trait]
impl HttpClient for MockCdn {
    async fn get(&self, url: &str, conditional: &ConditionalHeaders) -> CdnResult<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            if_none_match: conditional.if_none_match.clone(),
        });

        let route = self.routes.lock().unwrap().get(url).cloned();
        let response = match route {
            None => HttpResponse::status(404),
            Some(Route::Status(status)) => HttpResponse::status(status),
            Some(Route::File { body, etag }) => {
                if etag.is_some() && etag == conditional.if_none_match {
                    HttpResponse::not_modified()
                } else {
                    HttpResponse {
                        status: 200,
                        body,
                        etag,
                    }
                }
            }
        };
        Ok(response)
    }
}

/// Write a file under `root`, backdated so it counts as stale
pub(crate) fn seed_stale(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    backdate(&path);
}

/// Move a file's mtime an hour into the past
pub(crate) fn backdate(path: &Path) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(3600))
        .unwrap();
}
