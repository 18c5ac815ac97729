use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use foundation::handles::TextureHandle;
use reqwest::Client;
use streaming::{LoadFailure, LoadTicket, TextureCommand};
use tracing::debug;

use crate::sources::is_remote;

/// Stand-in for a GPU: a "texture" is a panorama file that exists.
///
/// Local references resolve under `root`; remote ones are probed over HTTP.
pub struct TextureHost {
    client: Client,
    root: PathBuf,
    next_handle: u64,
    live: BTreeSet<TextureHandle>,
    disposed: usize,
}

impl TextureHost {
    pub fn new(client: Client, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            root: root.into(),
            next_handle: 1,
            live: BTreeSet::new(),
            disposed: 0,
        }
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn disposed(&self) -> usize {
        self.disposed
    }

    /// Execute `commands`, returning the results of every load.
    pub async fn run(
        &mut self,
        commands: Vec<TextureCommand>,
    ) -> Vec<(LoadTicket, Result<TextureHandle, LoadFailure>)> {
        let mut results = Vec::new();
        for command in commands {
            match command {
                TextureCommand::Load { ticket, path } => {
                    let result = self.load(&path).await;
                    results.push((ticket, result));
                }
                TextureCommand::Dispose(handle) => {
                    if self.live.remove(&handle) {
                        self.disposed += 1;
                    } else {
                        debug!(handle = handle.raw(), "dispose of unknown texture");
                    }
                }
            }
        }
        results
    }

    async fn load(&mut self, path: &str) -> Result<TextureHandle, LoadFailure> {
        if is_remote(path) {
            let resp = self
                .client
                .head(path)
                .send()
                .await
                .map_err(|e| LoadFailure::new(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(LoadFailure::new(format!("{path}: {}", resp.status())));
            }
        } else {
            let file = local_path(&self.root, path);
            tokio::fs::metadata(&file)
                .await
                .map_err(|e| LoadFailure::new(format!("{}: {e}", file.display())))?;
        }

        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle);
        debug!(path, handle = handle.raw(), "texture loaded");
        Ok(handle)
    }
}

/// Map a site-absolute panorama path onto `root`, dropping any query or fragment.
fn local_path(root: &Path, reference: &str) -> PathBuf {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference)
        .trim_start_matches('/');
    root.join(path)
}

#[cfg(test)]
mod tests {
    use super::local_path;
    use std::path::{Path, PathBuf};

    #[test]
    fn site_paths_land_under_root() {
        assert_eq!(
            local_path(Path::new("public"), "/panos/a.jpg?v=2"),
            PathBuf::from("public/panos/a.jpg")
        );
        assert_eq!(
            local_path(Path::new("public"), "panos/b.png"),
            PathBuf::from("public/panos/b.png")
        );
    }
}
