//! Output formatting for stations, readings and analysis results.
//!
//! Supports CSV (to any writer or to a file), pretty JSON and a short text
//! summary for assessments. Nothing here renders charts.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

use crate::analyzers::classify::ThresholdTable;
use crate::analyzers::types::{Assessment, WideRow};
use crate::model::{Component, Reading, Station};

/// Record type that can be written as a CSV table.
///
/// `COLUMNS` must list the serialized field names in order; it is the header
/// written when there are no rows to take it from.
pub trait CsvRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl CsvRow for Station {
    const COLUMNS: &'static [&'static str] =
        &["id", "code", "name", "city", "active_from", "active_to"];
}

impl CsvRow for Reading {
    const COLUMNS: &'static [&'static str] = &[
        "station_id",
        "timestamp",
        "component",
        "value",
        "index",
        "secondary_value",
    ];
}

impl CsvRow for WideRow {
    const COLUMNS: &'static [&'static str] = &["Date", "PM10", "O3", "NO2", "PM2.5"];
}

impl CsvRow for MonthlyRow {
    const COLUMNS: &'static [&'static str] = &["pollutant", "year", "month", "mean"];
}

/// Annual means of one pollutant, one entry per year of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualRow {
    pub pollutant: Component,
    pub acceptable_level: Option<f64>,
    pub means: Vec<Option<f64>>,
}

/// Pollutant × year table with the acceptable level in front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualTable {
    pub years: Vec<i32>,
    pub rows: Vec<AnnualRow>,
}

/// One monthly mean in long format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub pollutant: Component,
    pub year: i32,
    pub month: u32,
    pub mean: f64,
}

/// Pretty-prints `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Serializes `rows` as CSV with a header row, which is written even when
/// `rows` is empty.
pub fn write_csv<W: Write, T: CsvRow>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        writer.write_record(T::COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `rows` to a new CSV file at `path`, replacing any existing file.
pub fn export_csv<T: CsvRow>(path: &str, rows: &[T]) -> Result<()> {
    let file = File::create(path)?;
    write_csv(file, rows)?;
    info!(path, rows = rows.len(), "CSV exported");
    Ok(())
}

/// Lays annual means out as one row per pollutant in `pollutants` order and
/// one column per year present in `means`.
pub fn annual_table(
    means: &BTreeMap<(Component, i32), f64>,
    table: &ThresholdTable,
    pollutants: &[Component],
) -> AnnualTable {
    let mut years: Vec<i32> = means.keys().map(|(_, year)| *year).collect();
    years.sort_unstable();
    years.dedup();

    let rows = pollutants
        .iter()
        .map(|p| AnnualRow {
            pollutant: *p,
            acceptable_level: table.acceptable_level(*p),
            means: years.iter().map(|y| means.get(&(*p, *y)).copied()).collect(),
        })
        .collect();

    AnnualTable { years, rows }
}

pub fn monthly_rows(means: &BTreeMap<(Component, i32, u32), f64>) -> Vec<MonthlyRow> {
    means
        .iter()
        .map(|((pollutant, year, month), mean)| MonthlyRow {
            pollutant: *pollutant,
            year: *year,
            month: *month,
            mean: *mean,
        })
        .collect()
}

/// Writes an [`AnnualTable`] as CSV: `Pollutant,Acceptable Level,<year>...`.
pub fn write_annual_csv<W: Write>(writer: W, table: &AnnualTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Pollutant".to_string(), "Acceptable Level".to_string()];
    header.extend(table.years.iter().map(|y| y.to_string()));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![
            row.pollutant.label(),
            row.acceptable_level
                .map(|l| format!("{l:.0}"))
                .unwrap_or_default(),
        ];
        record.extend(
            row.means
                .iter()
                .map(|m| m.map(|v| format!("{v:.1}")).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!(years = table.years.len(), "Annual table written");
    Ok(())
}

/// Short human-readable summary of an [`Assessment`].
pub fn render_assessment(a: &Assessment) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Station {} on {}",
        a.station_id,
        a.date.format("%d-%m-%Y")
    );

    match a.measured_at {
        None => {
            let _ = writeln!(out, "No detail on the air status of this station is available");
        }
        Some(ts) => {
            let _ = writeln!(out, "Measured at {}", ts.format("%Y-%m-%d %H:%M"));
            for c in &a.components {
                let _ = writeln!(
                    out,
                    "  {:<6} {:>7.1}  {}",
                    c.component.label(),
                    c.value,
                    c.status
                );
            }
            for component in &a.excluded {
                let _ = writeln!(out, "  {:<6} (no thresholds)", component.label());
            }
        }
    }

    let _ = writeln!(out, "Overall: {} ({})", a.overall, a.overall.color());
    out
}
