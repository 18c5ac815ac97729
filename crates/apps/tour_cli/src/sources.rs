use std::path::PathBuf;

use formats::ManifestError;
use reqwest::Client;
use serde_json::Value;
use tour::ManifestSource;

pub struct HttpManifestSource {
    client: Client,
    url: String,
}

impl HttpManifestSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl ManifestSource for HttpManifestSource {
    async fn fetch(&self) -> Result<Value, ManifestError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ManifestError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ManifestError::Unreachable(format!(
                "{} returned {}",
                self.url,
                resp.status()
            )));
        }
        let text = resp
            .text()
            .await
            .map_err(|e| ManifestError::Unreachable(e.to_string()))?;
        serde_json::from_str(&text).map_err(ManifestError::Parse)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileManifestSource {
    path: PathBuf,
}

impl FileManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ManifestSource for FileManifestSource {
    async fn fetch(&self) -> Result<Value, ManifestError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ManifestError::Unreachable(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&text).map_err(ManifestError::Parse)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A manifest location given on the command line: URL or local path.
pub enum AnySource {
    Http(HttpManifestSource),
    File(FileManifestSource),
}

impl AnySource {
    pub fn parse(location: &str, client: &Client) -> Self {
        if is_remote(location) {
            AnySource::Http(HttpManifestSource::new(client.clone(), location))
        } else {
            AnySource::File(FileManifestSource::new(location))
        }
    }
}

impl ManifestSource for AnySource {
    async fn fetch(&self) -> Result<Value, ManifestError> {
        match self {
            AnySource::Http(s) => s.fetch().await,
            AnySource::File(s) => s.fetch().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            AnySource::Http(s) => s.describe(),
            AnySource::File(s) => s.describe(),
        }
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
