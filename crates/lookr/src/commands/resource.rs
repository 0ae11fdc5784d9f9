//! Resource subcommand handlers: list, read, apply, delete.

use std::io::Read;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lookr_core::{AttrMap, CoreError, Provider, Transport, attr_map_from_json};

use crate::cli::{ApplyArgs, ListArgs, OutputFormat, TargetArgs};
use crate::error::CliError;
use crate::output;

pub async fn list<T: Transport>(
    provider: &Provider<T>,
    args: ListArgs,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let inventory = provider.list(args.kind, cancel).await?;
    output::print_output(&output::render_list(format, args.kind, &inventory.items)?);

    if let Some(err) = inventory.interrupted {
        warn!(
            kind = %args.kind,
            fetched = inventory.items.len(),
            "listing interrupted, output is partial"
        );
        return Err(err.into());
    }
    Ok(())
}

pub async fn read<T: Transport>(
    provider: &Provider<T>,
    args: TargetArgs,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let observed = provider
        .read(args.kind, &args.id, cancel)
        .await?
        .ok_or_else(|| CliError::NotFound {
            kind: args.kind.to_string(),
            id: args.id.clone(),
        })?;
    output::print_output(&output::render_single(format, &observed)?);
    Ok(())
}

/// Create when no `--id` is given, update otherwise.
pub async fn apply<T: Transport>(
    provider: &Provider<T>,
    args: ApplyArgs,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let desired = read_attribute_file(&args.file)?;

    let observed = match args.id {
        Some(ref id) => provider
            .update(args.kind, id, &desired, cancel)
            .await
            .map_err(|e| not_found_as(e, args.kind.to_string(), id))?,
        None => provider.create(args.kind, &desired, cancel).await?,
    };

    info!(kind = %args.kind, id = %observed.id, "applied");
    if !observed.ignored.is_empty() {
        eprintln!("ignored attributes: {}", observed.ignored.join(", "));
    }
    output::print_output(&output::render_single(format, &observed)?);
    Ok(())
}

pub async fn delete<T: Transport>(
    provider: &Provider<T>,
    args: TargetArgs,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match provider.delete(args.kind, &args.id, cancel).await? {
        None => {
            output::print_output(&format!("deleted {} '{}'", args.kind, args.id));
            Ok(())
        }
        Some(survivor) => Err(CliError::DeleteUnconfirmed {
            kind: args.kind.to_string(),
            id: survivor.id,
        }),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn not_found_as(err: CoreError, kind: String, id: &str) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            kind,
            id: id.to_owned(),
        }
    } else {
        err.into()
    }
}

/// Load desired state from a JSON or YAML file ("-" reads stdin).
pub fn read_attribute_file(path: &Path) -> Result<AttrMap, CliError> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };

    // YAML is a superset of JSON, so one parser covers both.
    let value: serde_json::Value =
        serde_yaml::from_str(&contents).map_err(|source| CliError::AttributeFile {
            path: path.display().to_string(),
            source,
        })?;
    attr_map_from_json(value).map_err(|e| CliError::from(CoreError::Decode(e)))
}
