//! Command dispatch: bridges CLI args -> provider calls -> output formatting.

pub mod config_cmd;
pub mod resource;

use tokio_util::sync::CancellationToken;

use lookr_core::{Provider, Transport};

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Dispatch a provider-bound command to its handler.
pub async fn dispatch<T: Transport>(
    cmd: Command,
    provider: &Provider<T>,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => resource::list(provider, args, format, cancel).await,
        Command::Read(args) => resource::read(provider, args, format, cancel).await,
        Command::Apply(args) => resource::apply(provider, args, format, cancel).await,
        Command::Delete(args) => resource::delete(provider, args, cancel).await,
        // Handled before a provider exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
