//! Output formatting: table, JSON, YAML.
//!
//! Structured formats serialize observed attribute maps as-is. Tables
//! flatten them: one row per entity for listings, one row per attribute for
//! a single entity.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use lookr_core::{AttrValue, Observed, ResourceKind};

use crate::cli::OutputFormat;
use crate::error::CliError;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "LABEL")]
    label: String,
}

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "ATTRIBUTE")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a collection of observed entities.
pub fn render_list(
    format: OutputFormat,
    kind: ResourceKind,
    items: &[Observed],
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<EntityRow> = items
                .iter()
                .map(|o| EntityRow {
                    id: o.id.clone(),
                    label: o
                        .state
                        .get(kind.label_key())
                        .map(cell)
                        .unwrap_or_default(),
                })
                .collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let states: Vec<_> = items.iter().map(|o| &o.state).collect();
            render_structured(format, &states)
        }
    }
}

/// Render a single observed entity.
pub fn render_single(format: OutputFormat, item: &Observed) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<AttributeRow> = item
                .state
                .iter()
                .map(|(key, value)| AttributeRow {
                    key: key.clone(),
                    value: cell(value),
                })
                .collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json | OutputFormat::Yaml => render_structured(format, &item.state),
    }
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = if format == OutputFormat::Yaml {
        serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))?
    } else {
        serde_json::to_string_pretty(data).map_err(|e| CliError::Render(e.to_string()))?
    };
    Ok(rendered.trim_end().to_owned())
}

/// Scalars print bare; lists and maps print as compact JSON.
fn cell(value: &AttrValue) -> String {
    match value {
        AttrValue::Null => String::new(),
        AttrValue::String(s) => s.clone(),
        AttrValue::Bool(b) => b.to_string(),
        AttrValue::Number(n) => n.to_string(),
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}
