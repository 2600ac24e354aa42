// src/report.rs

use crate::config::OutputFormat;
use crate::metrics::Resolved;
use crate::os::winsize::Probe;

use anyhow::{Context, Result};
use serde::Serialize;

/// Which cell dimension plain output prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Height,
    Width,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub source: String,
    pub rows: u16,
    pub cols: u16,
    pub width_px: u16,
    pub height_px: u16,
    pub cell_width_px: u16,
    pub cell_height_px: u16,
    pub fallback: bool,
}

impl Report {
    pub fn new(probe: &Probe, resolved: &Resolved) -> Self {
        Report {
            source: probe.origin.to_string(),
            rows: probe.size.rows,
            cols: probe.size.cols,
            width_px: probe.size.width_px,
            height_px: probe.size.height_px,
            cell_width_px: resolved.metrics.width_px,
            cell_height_px: resolved.metrics.height_px,
            fallback: resolved.used_fallback(),
        }
    }

    pub fn render(&self, format: OutputFormat, field: Field) -> Result<String> {
        match format {
            OutputFormat::Plain => Ok(match field {
                Field::Height => self.cell_height_px.to_string(),
                Field::Width => self.cell_width_px.to_string(),
                Field::Both => format!("{}x{}", self.cell_width_px, self.cell_height_px),
            }),
            OutputFormat::Json => serde_json::to_string(self).context("serializing report"),
        }
    }
}
