//! CLI entry point for the clean_air tool.
//!
//! Provides subcommands for finding stations in a city, listing their raw
//! readings, rating a day's air quality, and rolling readings up into trend
//! and annual series.

mod infra;
mod services;

use crate::infra::uba::UbaClient;
use crate::services::air_data_api::{ReadingSource, StationDirectory};
use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use clean_air::analyzers::aggregate::{
    DEFAULT_TREND_MONTHS, annual_means, days_before, monthly_means, pivot_by_timestamp,
    trend_window, trend_window_start, years_before,
};
use clean_air::analyzers::assess::assess_day;
use clean_air::config::Settings;
use clean_air::locator::{StationSearch, search_stations, stations_in_city};
use clean_air::model::{AirDataError, Component, Reading, Station};
use clean_air::output::{
    annual_table, export_csv, monthly_rows, print_json, render_assessment, write_annual_csv,
    write_csv,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "clean_air")]
#[command(about = "Air quality of German monitoring stations (UBA air data API)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the monitoring stations of a city
    Stations {
        /// City name, matched case-insensitively
        city: String,

        /// Only show stations whose name contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Also list stations that stopped reporting
        #[arg(long, default_value_t = false)]
        include_inactive: bool,

        /// Write the station table to this CSV file
        #[arg(short, long)]
        export: Option<String>,

        /// Print JSON instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the raw readings of a station
    Readings {
        station_id: String,

        /// Number of days before the end date to fetch
        #[arg(short, long, default_value_t = 90)]
        days: i64,

        /// First day to fetch (overrides --days)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to fetch (defaults to today)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// One row per timestamp with a column per pollutant
        #[arg(short, long, default_value_t = false)]
        wide: bool,

        /// Print JSON instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rate the air quality of a station for one day
    Status {
        station_id: String,

        /// Day to rate (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Print JSON instead of a text summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Readings of the trailing months, for charting
    Trend {
        station_id: String,

        /// Window length in calendar months, including the current one
        #[arg(short, long, default_value_t = DEFAULT_TREND_MONTHS)]
        months: u32,

        /// Pollutants to include (repeatable; defaults to all)
        #[arg(short, long = "pollutant")]
        pollutants: Vec<Component>,

        /// Print monthly means instead of individual readings
        #[arg(long, default_value_t = false)]
        monthly: bool,

        /// Print JSON instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Annual mean per pollutant next to its acceptable level
    Annual {
        station_id: String,

        /// Number of years back from today to fetch
        #[arg(short, long, default_value_t = 4)]
        years: i64,

        /// Pollutants to include (repeatable; defaults to all)
        #[arg(short, long = "pollutant")]
        pollutants: Vec<Component>,

        /// Print JSON instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();
    let _file_guard = init_tracing(&settings.log_file_path)?;

    let cli = Cli::parse();

    let client = UbaClient::new(&settings.api_base_url)?;
    let table = settings.threshold_table()?;
    if let Some(path) = &settings.thresholds_path {
        info!(path = %path, "Using custom threshold table");
    }

    let today = Local::now().date_naive();

    match cli.command {
        Commands::Stations {
            city,
            search,
            include_inactive,
            export,
            json,
        } => {
            let directory = load_stations(&client).await;
            let in_city = stations_in_city(&directory, &city, include_inactive);
            info!(city = %city, count = in_city.len(), "Stations in city");

            let found = match search_stations(in_city, search.as_deref()) {
                StationSearch::NoMatch(all) => {
                    warn!(query = ?search, "No stations with this name, showing all");
                    all
                }
                other => {
                    info!(query = ?search, count = other.stations().len(), "Station search");
                    other.into_stations()
                }
            };

            if found.is_empty() {
                warn!(city = %city, "No stations found");
            }

            if let Some(path) = export {
                export_csv(&path, &found)?;
            }

            if json {
                print_json(&found)?;
            } else {
                write_csv(std::io::stdout().lock(), &found)?;
            }
        }
        Commands::Readings {
            station_id,
            days,
            from,
            to,
            wide,
            json,
        } => {
            let to = to.unwrap_or(today);
            let from = match from {
                Some(from) => from,
                None => days_before(to, days)
                    .ok_or_else(|| anyhow!("--days {days} is out of range"))?,
            };
            let readings = load_readings(&client, &station_id, from, to).await;

            if readings.is_empty() {
                warn!(station_id = %station_id, "No data available for this station");
            }

            match (wide, json) {
                (true, true) => print_json(&pivot_by_timestamp(&readings))?,
                (true, false) => write_csv(std::io::stdout().lock(), &pivot_by_timestamp(&readings))?,
                (false, true) => print_json(&readings)?,
                (false, false) => write_csv(std::io::stdout().lock(), &readings)?,
            }
        }
        Commands::Status {
            station_id,
            date,
            json,
        } => {
            let date = date.unwrap_or(today);
            let readings = load_readings(&client, &station_id, date, date).await;
            let assessment = assess_day(&station_id, &readings, date, &table);

            info!(
                station_id = %station_id,
                %date,
                overall = %assessment.overall,
                "Air quality assessed"
            );

            if json {
                print_json(&assessment)?;
            } else {
                print!("{}", render_assessment(&assessment));
            }
        }
        Commands::Trend {
            station_id,
            months,
            pollutants,
            monthly,
            json,
        } => {
            let now = Local::now().naive_local();
            let start = trend_window_start(now, months)
                .ok_or_else(|| anyhow!("trend window of {months} months is out of range"))?;
            let pollutants = or_all(pollutants);

            let readings = load_readings(&client, &station_id, start.date(), now.date()).await;
            let window: Vec<Reading> = trend_window(&readings, now, months)
                .into_iter()
                .filter(|r| pollutants.contains(&r.component))
                .collect();

            info!(station_id = %station_id, %start, count = window.len(), "Trend window");

            if monthly {
                let rows = monthly_rows(&monthly_means(&window, &pollutants));
                if json {
                    print_json(&rows)?;
                } else {
                    write_csv(std::io::stdout().lock(), &rows)?;
                }
            } else if json {
                print_json(&window)?;
            } else {
                write_csv(std::io::stdout().lock(), &window)?;
            }
        }
        Commands::Annual {
            station_id,
            years,
            pollutants,
            json,
        } => {
            let pollutants = or_all(pollutants);
            let from = years_before(today, years)
                .ok_or_else(|| anyhow!("--years {years} is out of range"))?;
            let readings = load_readings(&client, &station_id, from, today).await;

            let means = annual_means(&readings, &pollutants);
            let annual = annual_table(&means, &table, &pollutants);

            if json {
                print_json(&annual)?;
            } else {
                write_annual_csv(std::io::stdout().lock(), &annual)?;
            }
        }
    }

    Ok(())
}

/// Colored stderr logging plus a JSON rolling log file.
fn init_tracing(log_file_path: &str) -> Result<WorkerGuard> {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("clean_air.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

fn or_all(pollutants: Vec<Component>) -> Vec<Component> {
    if pollutants.is_empty() {
        Component::ALL.to_vec()
    } else {
        pollutants
    }
}

/// Logs and drops records that failed to parse.
fn keep_valid<T>(results: Vec<Result<T, AirDataError>>) -> Vec<T> {
    let mut skipped = 0usize;
    let valid: Vec<T> = results
        .into_iter()
        .filter_map(|r| match r {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "Skipping malformed record");
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, kept = valid.len(), "Some records were malformed");
    }
    valid
}

/// Station directory, or an empty list if the directory could not be fetched.
async fn load_stations(directory: &impl StationDirectory) -> Vec<Station> {
    match directory.list_stations().await {
        Ok(results) => keep_valid(results),
        Err(e) => {
            error!(error = %e, "Station directory fetch failed");
            Vec::new()
        }
    }
}

/// Readings for the range, or none if the fetch failed: a failed fetch is
/// treated exactly like a station without data.
async fn load_readings(
    source: &impl ReadingSource,
    station_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<Reading> {
    match source.readings(station_id, from, to).await {
        Ok(results) => keep_valid(results),
        Err(e) => {
            error!(error = %e, station_id, "Reading fetch failed, treating as no data");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clean_air::analyzers::classify::ThresholdTable;
    use clean_air::fetch::HttpClient;
    use clean_air::model::Overall;
    use reqwest::{Request, Response};

    struct CannedClient {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        async fn execute(&self, _req: Request) -> reqwest::Result<Response> {
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body)
                .unwrap();
            Ok(Response::from(resp))
        }
    }

    fn uba(status: u16, body: &'static str) -> UbaClient<CannedClient> {
        UbaClient::with_client("http://localhost/v3", CannedClient { status, body })
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
    }

    #[tokio::test]
    async fn test_failed_reading_fetch_rates_as_no_data() {
        let source = uba(500, "upstream unavailable");
        let readings = load_readings(&source, "282", day(), day()).await;
        assert!(readings.is_empty());

        let assessment = assess_day("282", &readings, day(), ThresholdTable::standard());
        assert_eq!(assessment.overall, Overall::NoData);
    }

    #[tokio::test]
    async fn test_load_readings_drops_malformed_records() {
        let source = uba(200, include_str!("../tests/fixtures/readings_282.json"));
        let readings = load_readings(&source, "282", day(), day()).await;
        assert_eq!(readings.len(), 13);

        let assessment = assess_day("282", &readings, day(), ThresholdTable::standard());
        assert_eq!(assessment.overall, Overall::Rated(clean_air::model::Status::Poor));
    }

    #[tokio::test]
    async fn test_failed_directory_fetch_is_empty() {
        let source = uba(502, "");
        assert!(load_stations(&source).await.is_empty());
    }

    #[test]
    fn test_or_all_defaults_to_every_pollutant() {
        assert_eq!(or_all(Vec::new()), Component::ALL.to_vec());
        assert_eq!(or_all(vec![Component::O3]), vec![Component::O3]);
    }
}
