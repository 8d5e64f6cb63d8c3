//! Runs one batch per configured site and aggregates the results.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::aggregate::{ResultAggregator, ResultSet};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::ports::MessageSource;

/// What to fetch for one batch and how to label its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSpec {
    pub context_label: String,
    pub account: String,
    pub folder_path: String,
}

pub struct BatchRunner<'r, S> {
    pipeline: Pipeline<'r>,
    source: S,
}

impl<'r, S: MessageSource> BatchRunner<'r, S> {
    #[must_use]
    pub const fn new(pipeline: Pipeline<'r>, source: S) -> Self {
        Self { pipeline, source }
    }

    /// Run every batch in order.
    ///
    /// A missing account, an empty folder or a failing source skips only
    /// that batch.
    ///
    /// # Errors
    /// Returns [`crate::Error::NothingProcessed`] if no batch emitted a record.
    pub async fn run(&self, batches: &[BatchSpec]) -> Result<ResultSet> {
        let run_id = Uuid::now_v7();
        info!(%run_id, batches = batches.len(), "Starting extraction run");

        let mut aggregator = ResultAggregator::new();

        for batch in batches {
            match self.source.account_exists(&batch.account).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        %run_id,
                        account = %batch.account,
                        "Could not find account, skipping account"
                    );
                    continue;
                }
                Err(e) => {
                    error!(%run_id, account = %batch.account, "Account lookup failed: {e:#}");
                    continue;
                }
            }

            info!(
                %run_id,
                account = %batch.account,
                folder = %batch.folder_path,
                site = %batch.context_label,
                "Fetching emails"
            );

            let messages = match self
                .source
                .fetch(&batch.account, &batch.folder_path)
                .await
            {
                Ok(messages) => messages,
                Err(e) => {
                    error!(
                        %run_id,
                        account = %batch.account,
                        folder = %batch.folder_path,
                        "Fetching emails failed: {e:#}"
                    );
                    continue;
                }
            };

            if messages.is_empty() {
                warn!(
                    %run_id,
                    account = %batch.account,
                    folder = %batch.folder_path,
                    "No emails exist in folder, skipping folder"
                );
                continue;
            }

            info!(%run_id, count = messages.len(), "Fetched emails");

            let report = self.pipeline.run_batch(&batch.context_label, &messages);
            aggregator.push_batch(report);
        }

        if aggregator.is_empty() {
            warn!(%run_id, "No emails could be processed");
        }

        let results = aggregator.finish()?;
        info!(%run_id, records = results.len(), "Execution has completed");
        Ok(results)
    }
}
