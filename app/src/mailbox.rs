//! Message source over an exported mailbox directory.
//!
//! Layout: `<root>/<account>/<folder>/<subfolder>/*.json`, one message per
//! file with `subject`, `body` and an RFC 3339 `received_at`.

use anyhow::Context;
use async_trait::async_trait;
use covmail_core::{MessageSource, RawMessage};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct MailboxDir {
    root: PathBuf,
}

impl MailboxDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn folder(&self, account: &str, folder_path: &str) -> PathBuf {
        let mut path = self.root.join(account);
        for part in folder_path.split('/').filter(|part| !part.is_empty()) {
            path.push(part);
        }
        path
    }
}

/// Read one message file.
pub fn read_message(path: &Path) -> anyhow::Result<RawMessage> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read message {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Could not parse message {}", path.display()))
}

#[async_trait]
impl MessageSource for MailboxDir {
    async fn account_exists(&self, account: &str) -> anyhow::Result<bool> {
        Ok(tokio::fs::metadata(self.root.join(account))
            .await
            .is_ok_and(|meta| meta.is_dir()))
    }

    async fn fetch(&self, account: &str, folder_path: &str) -> anyhow::Result<Vec<RawMessage>> {
        let dir = self.folder(account, folder_path);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("Could not open folder {}", dir.display()))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut messages = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = tokio::fs::read(&path)
                .await
                .map_err(anyhow::Error::from)
                .and_then(|bytes| {
                    serde_json::from_slice::<RawMessage>(&bytes).map_err(anyhow::Error::from)
                });
            match parsed {
                Ok(message) => messages.push(message),
                Err(e) => warn!(
                    path = %path.display(),
                    "Could not read message file, skipping: {e}"
                ),
            }
        }

        debug!(folder = %dir.display(), count = messages.len(), "Read messages");
        Ok(messages)
    }
}
