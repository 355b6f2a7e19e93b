use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Appends one `METHOD PATH TIMESTAMP` line per request to a file.
#[derive(Clone)]
pub struct RequestLog {
    path: Arc<PathBuf>,
}

impl RequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

/// Failing to write the log never fails the request.
pub async fn log_request(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let line = format!(
        "{} {} {}\n",
        request.method(),
        request.uri().path(),
        Utc::now().to_rfc3339()
    );

    if let Err(e) = log.append(&line).await {
        tracing::warn!(path = %log.path().display(), error = %e, "Failed to write request log");
    }

    next.run(request).await
}
