use covmail_config::{Environment, SiteList};
use covmail_core::{BatchRunner, report};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::mailbox::MailboxDir;
use crate::output::OutputFormat;

/// Input parameters for the Run command strategy.
#[derive(Debug, Clone)]
pub struct RunInput {
    pub env: Environment,
    /// Explicit site list, overrides `env`
    pub sites: Option<PathBuf>,
    pub mailbox: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Write records as extracted, without report post-processing
    pub raw: bool,
}

/// Strategy for a full extraction run.
///
/// Loads the site list, runs one batch per site against the mailbox
/// directory, then writes the aggregated result set.
#[derive(Debug, Clone, Copy)]
pub struct RunStrategy;

impl super::CommandStrategy for RunStrategy {
    type Input = RunInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let sites = match &input.sites {
            Some(path) => SiteList::load_from(path)?,
            None => SiteList::load(input.env)?,
        };
        if sites.is_empty() {
            warn!("Site list has no entries");
        }

        let pipeline = super::builtin_pipeline()?;
        let runner = BatchRunner::new(pipeline, MailboxDir::new(&input.mailbox));
        let results = runner.run(&sites.batches()).await?;

        let results = if input.raw {
            results
        } else {
            report::post_process(results)
        };

        let mut sink = input.format.sink(&input.output)?;
        results.write_to(sink.as_mut())?;

        info!(
            "Successfully extracted results from {} emails, results have been written to '{}'",
            results.len(),
            input.output.display()
        );
        Ok(())
    }
}
