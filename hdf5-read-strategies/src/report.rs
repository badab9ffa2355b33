use std::{path::Path, time::Duration};

use itertools::Itertools;
use serde_with::serde_as;

use crate::{config::BenchmarkConfig, strategies::Strategy, Result};

pub const CSV_HEADER: [&str; 5] = ["Method", "Time (s)", "Memory (MB)", "Data Shape", "File"];

/// One report row: a strategy run against one file.
#[serde_as]
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BenchmarkRecord {
    #[serde(rename = "Method")]
    pub method: Strategy,
    #[serde(rename = "Time (s)")]
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    pub elapsed: Duration,
    #[serde(rename = "Memory (MB)")]
    pub memory_delta_mb: f64,
    #[serde(rename = "Data Shape", serialize_with = "shape_serialize")]
    pub shape: (usize, usize),
    #[serde(rename = "File")]
    pub file: String,
}

fn shape_serialize<S>(shape: &(usize, usize), serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&format_shape(&[shape.0, shape.1]))
}

/// `(10000, 100)`
pub fn format_shape(dims: &[usize]) -> String {
    format!("({})", dims.iter().join(", "))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub records: Vec<BenchmarkRecord>,
}

impl Report {
    pub fn extend(&mut self, records: impl IntoIterator<Item = BenchmarkRecord>) {
        self.records.extend(records);
    }

    /// Write the report as CSV, replacing any previous file. The header is always written.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        create_parent_dir(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(CSV_HEADER)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the config that produced this report plus its records as JSON.
    pub fn write_json(&self, path: &Path, config: &BenchmarkConfig) -> Result<()> {
        #[derive(serde::Serialize)]
        struct BenchmarkOutput<'a> {
            config: &'a BenchmarkConfig,
            records: &'a [BenchmarkRecord],
        }
        create_parent_dir(path)?;
        let output = BenchmarkOutput {
            config,
            records: &self.records,
        };
        std::fs::write(path, serde_json::to_string_pretty(&output)?)?;
        Ok(())
    }
}

fn create_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}
