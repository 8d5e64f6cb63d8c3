//! Boundaries to the collaborators that feed and consume the engine.

use async_trait::async_trait;

use crate::aggregate::ResultSet;
use crate::message::RawMessage;

/// Where raw messages come from.
///
/// Account lookup and folder traversal belong to the implementation.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn account_exists(&self, account: &str) -> anyhow::Result<bool>;

    /// Messages in `folder_path` (`/`-separated) of `account`.
    async fn fetch(&self, account: &str, folder_path: &str) -> anyhow::Result<Vec<RawMessage>>;
}

/// Where the final result set goes.
pub trait RecordSink {
    fn write(&mut self, results: &ResultSet) -> anyhow::Result<()>;
}
