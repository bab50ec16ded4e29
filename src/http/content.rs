//! Content endpoint: `GET {route_prefix}/{filename}`.
//!
//! Files are read as UTF-8 and returned as a JSON string.

use std::io::ErrorKind;
use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::response::GateError;
use crate::http::server::AppState;

#[derive(Debug, Clone)]
pub struct ContentDir {
    root: PathBuf,
}

impl ContentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read one file from the directory. Names that could leave the
    /// directory are reported as not found.
    pub async fn read(&self, filename: &str) -> Result<String, GateError> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\'])
        {
            return Err(GateError::NotFound);
        }

        match tokio::fs::read_to_string(self.root.join(filename)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(GateError::NotFound),
            Err(e) => Err(GateError::ContentUnreadable(e)),
        }
    }
}

pub async fn serve_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match state.content.read(&filename).await {
        Ok(content) => Json(content).into_response(),
        Err(e) => e.into_response_with(state.config.security.expose_error_details),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.svg"), "<svg/>").unwrap();

        let content = ContentDir::new(dir.path());
        assert_eq!(content.read("logo.svg").await.unwrap(), "<svg/>");
    }

    #[tokio::test]
    async fn test_missing_and_escaping_names_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let content = ContentDir::new(dir.path().join("inner"));
        std::fs::create_dir(dir.path().join("inner")).unwrap();
        std::fs::write(dir.path().join("secret.txt"), "nope").unwrap();

        assert!(matches!(content.read("absent.txt").await, Err(GateError::NotFound)));
        assert!(matches!(content.read("..").await, Err(GateError::NotFound)));
        assert!(matches!(content.read("../secret.txt").await, Err(GateError::NotFound)));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("binary.bin"), [0xff, 0xfe, 0x00]).unwrap();
        std::fs::create_dir(dir.path().join("folder")).unwrap();

        let content = ContentDir::new(dir.path());
        assert!(matches!(
            content.read("binary.bin").await,
            Err(GateError::ContentUnreadable(_))
        ));
        assert!(matches!(
            content.read("folder").await,
            Err(GateError::ContentUnreadable(_))
        ));
    }
}
