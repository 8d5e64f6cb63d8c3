//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input type, so
//! dispatch in `main` is monomorphized.

use covmail_core::{Pipeline, TemplateRegistry};

mod classify;
mod init;
mod run;
mod templates;
mod version;

pub use classify::{ClassifyInput, ClassifyStrategy};
pub use init::InitStrategy;
pub use run::{RunInput, RunStrategy};
pub use templates::TemplatesStrategy;
pub use version::VersionStrategy;

/// Pipeline over the built-in templates.
///
/// Fails before any message is read if a template does not compile.
fn builtin_pipeline() -> anyhow::Result<Pipeline<'static>> {
    Ok(Pipeline::new(TemplateRegistry::builtin()?))
}

/// Contract shared by every command strategy.
///
/// # Example
/// ```rust
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
