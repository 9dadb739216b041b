use crate::domain::{DockerConfig, StackDeployFeedback};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable table
    #[default]
    #[value(name = "h")]
    Human,
    /// Raw JSON as returned by the server
    Json,
}

pub fn render_configs(configs: &[DockerConfig], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(configs),
        OutputFormat::Human if configs.is_empty() => Ok("no configs found".to_string()),
        OutputFormat::Human => {
            let rows = configs
                .iter()
                .map(|c| vec![c.id.clone(), c.spec.name.clone(), c.updated_at.clone()])
                .collect();
            Ok(table(&["ID", "NAME", "UPDATED AT"], rows))
        }
    }
}

pub fn render_stacks(stacks: &[StackDeployFeedback], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(stacks),
        OutputFormat::Human if stacks.is_empty() => Ok("no stacks found".to_string()),
        OutputFormat::Human => {
            let rows = stacks
                .iter()
                .map(|s| {
                    vec![
                        s.id.to_string(),
                        s.name.clone(),
                        s.endpoint_id.to_string(),
                        s.swarm_id.clone(),
                    ]
                })
                .collect();
            Ok(table(&["ID", "NAME", "ENDPOINT", "SWARM ID"], rows))
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("failed to serialize output")
}

/// Left-aligned columns separated by two spaces, header first.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    std::iter::once(&header)
        .chain(rows.iter())
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
