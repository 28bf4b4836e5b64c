use crate::analyzers::aggregate::{latest_bucket_readings, latest_timestamp_readings};
use crate::analyzers::classify::{ThresholdTable, overall_status};
use crate::analyzers::types::{Assessment, ComponentStatus};
use crate::model::{AirDataError, Overall, Reading};
use chrono::NaiveDate;
use tracing::debug;

/// Rates the air quality of a station on `date`.
///
/// Two tiers of "no data" are kept apart:
/// - no readings at all on `date` gives [`Overall::NoData`];
/// - readings exist, but a pollutant is missing or has no thresholds: that
///   pollutant is left out of the worst-case reduction.
///
/// Only the readings at the latest timestamp of the day are classified, and
/// only the first value per component at that timestamp.
pub fn assess_day(
    station_id: &str,
    readings: &[Reading],
    date: NaiveDate,
    table: &ThresholdTable,
) -> Assessment {
    let bucket = latest_bucket_readings(readings, date);
    if bucket.is_empty() {
        debug!(station_id, %date, "No readings for day");
        return Assessment {
            station_id: station_id.to_string(),
            date,
            measured_at: None,
            components: Vec::new(),
            excluded: Vec::new(),
            overall: Overall::NoData,
        };
    }

    let latest = latest_timestamp_readings(&bucket);
    let measured_at = latest.first().map(|r| r.timestamp);

    let mut components: Vec<ComponentStatus> = Vec::new();
    let mut excluded = Vec::new();

    for r in &latest {
        if components.iter().any(|c| c.component == r.component)
            || excluded.contains(&r.component)
        {
            continue;
        }

        match table.classify(r.component, r.value) {
            Ok(status) => components.push(ComponentStatus {
                component: r.component,
                value: r.value,
                status,
            }),
            Err(AirDataError::NoThresholdConfigured(component)) => {
                debug!(%component, "Component has no thresholds, excluded");
                excluded.push(component);
            }
            Err(e) => debug!(error = %e, "Unexpected classification failure"),
        }
    }

    components.sort_by_key(|c| c.component);
    let overall = overall_status(components.iter().map(|c| c.status));

    Assessment {
        station_id: station_id.to_string(),
        date,
        measured_at,
        components,
        excluded,
        overall,
    }
}
