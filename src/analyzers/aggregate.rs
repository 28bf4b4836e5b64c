use crate::analyzers::types::WideRow;
use crate::analyzers::utility::{mean, round1};
use crate::model::{Component, Reading};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

/// Trailing window used for trend charts when none is given.
pub const DEFAULT_TREND_MONTHS: u32 = 3;

/// Readings whose calendar date is `date`, regardless of time of day.
pub fn latest_bucket_readings(readings: &[Reading], date: NaiveDate) -> Vec<Reading> {
    readings
        .iter()
        .filter(|r| r.timestamp.date() == date)
        .cloned()
        .collect()
}

/// Readings sharing the most recent timestamp in `readings`.
pub fn latest_timestamp_readings(readings: &[Reading]) -> Vec<Reading> {
    let Some(latest) = readings.iter().map(|r| r.timestamp).max() else {
        return Vec::new();
    };

    readings
        .iter()
        .filter(|r| r.timestamp == latest)
        .cloned()
        .collect()
}

/// Mean value per pollutant per calendar year, rounded to one decimal.
///
/// Pollutant/year pairs without readings are absent from the result.
pub fn annual_means(
    readings: &[Reading],
    pollutants: &[Component],
) -> BTreeMap<(Component, i32), f64> {
    let mut series: BTreeMap<(Component, i32), Vec<f64>> = BTreeMap::new();

    for r in readings {
        if !pollutants.contains(&r.component) {
            continue;
        }
        series
            .entry((r.component, r.timestamp.year()))
            .or_default()
            .push(r.value);
    }

    series
        .into_iter()
        .map(|(key, values)| (key, round1(mean(&values))))
        .collect()
}

/// Mean value per pollutant per (year, month), rounded to one decimal.
pub fn monthly_means(
    readings: &[Reading],
    pollutants: &[Component],
) -> BTreeMap<(Component, i32, u32), f64> {
    let mut series: BTreeMap<(Component, i32, u32), Vec<f64>> = BTreeMap::new();

    for r in readings {
        if !pollutants.contains(&r.component) {
            continue;
        }
        series
            .entry((r.component, r.timestamp.year(), r.timestamp.month()))
            .or_default()
            .push(r.value);
    }

    series
        .into_iter()
        .map(|(key, values)| (key, round1(mean(&values))))
        .collect()
}

/// First instant of the trend window ending at `now`.
///
/// With `months = 3` this is midnight on the first day of the month two
/// months before the current one.
pub fn trend_window_start(now: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)?
        .checked_sub_months(Months::new(months.saturating_sub(1)))
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// The day `days` days before `end`, or `None` when `days` is negative or
/// the result falls outside the calendar chrono can represent.
pub fn days_before(end: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days < 0 {
        return None;
    }
    end.checked_sub_signed(Duration::try_days(days)?)
}

/// Start of a span of `years` 365-day years ending on `end`.
pub fn years_before(end: NaiveDate, years: i64) -> Option<NaiveDate> {
    days_before(end, years.checked_mul(365)?)
}

/// Readings inside the inclusive window `[trend_window_start, now]`.
pub fn trend_window(readings: &[Reading], now: NaiveDateTime, months: u32) -> Vec<Reading> {
    let Some(start) = trend_window_start(now, months) else {
        return Vec::new();
    };

    readings
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= now)
        .cloned()
        .collect()
}

/// One row per timestamp, ascending, with a column per known pollutant.
///
/// Unknown components are dropped. If a pollutant appears twice at the same
/// timestamp the first value wins.
pub fn pivot_by_timestamp(readings: &[Reading]) -> Vec<WideRow> {
    let mut rows: BTreeMap<NaiveDateTime, WideRow> = BTreeMap::new();

    for r in readings {
        let row = rows
            .entry(r.timestamp)
            .or_insert_with(|| WideRow::empty(r.timestamp));
        if let Some(slot) = row.slot(r.component) {
            if slot.is_none() {
                *slot = Some(r.value);
            }
        }
    }

    rows.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn reading(ts: &str, component: Component, value: f64) -> Reading {
        Reading {
            station_id: "282".into(),
            timestamp: at(ts),
            component,
            value,
            index: None,
            secondary_value: None,
        }
    }

    #[test]
    fn test_latest_bucket_readings_matches_date_only() {
        let readings = vec![
            reading("2024-03-01 23:00:00", Component::Pm10, 10.0),
            reading("2024-03-02 00:00:00", Component::Pm10, 20.0),
            reading("2024-03-02 13:00:00", Component::O3, 30.0),
            reading("2024-03-03 01:00:00", Component::Pm10, 40.0),
        ];

        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let bucket = latest_bucket_readings(&readings, date);

        assert_eq!(bucket.len(), 2);
        assert!(bucket.iter().all(|r| r.timestamp.date() == date));
    }

    #[test]
    fn test_latest_bucket_readings_empty_day() {
        let readings = vec![reading("2024-03-01 10:00:00", Component::Pm10, 10.0)];
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert!(latest_bucket_readings(&readings, date).is_empty());
    }

    #[test]
    fn test_latest_timestamp_readings() {
        let readings = vec![
            reading("2024-03-02 10:00:00", Component::Pm10, 10.0),
            reading("2024-03-02 11:00:00", Component::Pm10, 12.0),
            reading("2024-03-02 11:00:00", Component::O3, 80.0),
        ];

        let latest = latest_timestamp_readings(&readings);
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|r| r.timestamp == at("2024-03-02 11:00:00")));
        assert!(latest_timestamp_readings(&[]).is_empty());
    }

    #[test]
    fn test_annual_means_two_years() {
        let readings = vec![
            reading("2022-01-10 12:00:00", Component::Pm10, 30.0),
            reading("2022-07-10 12:00:00", Component::Pm10, 40.0),
            reading("2023-02-10 12:00:00", Component::Pm10, 50.0),
            reading("2023-09-10 12:00:00", Component::Pm10, 60.0),
        ];

        let means = annual_means(&readings, &[Component::Pm10]);

        assert_eq!(means.len(), 2);
        assert_eq!(means[&(Component::Pm10, 2022)], 35.0);
        assert_eq!(means[&(Component::Pm10, 2023)], 55.0);
    }

    #[test]
    fn test_annual_means_skips_unrequested_and_missing() {
        let readings = vec![
            reading("2022-01-10 12:00:00", Component::Pm10, 30.0),
            reading("2022-01-10 12:00:00", Component::O3, 90.0),
        ];

        let means = annual_means(&readings, &[Component::O3, Component::No2]);

        assert_eq!(means.len(), 1);
        assert_eq!(means[&(Component::O3, 2022)], 90.0);
        assert!(!means.contains_key(&(Component::No2, 2022)));
    }

    #[test]
    fn test_annual_means_rounds_to_one_decimal() {
        let readings = vec![
            reading("2022-01-10 12:00:00", Component::No2, 10.0),
            reading("2022-01-11 12:00:00", Component::No2, 10.0),
            reading("2022-01-12 12:00:00", Component::No2, 10.5),
        ];

        let means = annual_means(&readings, &[Component::No2]);
        assert_eq!(means[&(Component::No2, 2022)], 10.2);
    }

    #[test]
    fn test_monthly_means() {
        let readings = vec![
            reading("2024-01-05 12:00:00", Component::Pm25, 10.0),
            reading("2024-01-25 12:00:00", Component::Pm25, 20.0),
            reading("2024-02-05 12:00:00", Component::Pm25, 8.0),
        ];

        let means = monthly_means(&readings, &Component::ALL);
        assert_eq!(means[&(Component::Pm25, 2024, 1)], 15.0);
        assert_eq!(means[&(Component::Pm25, 2024, 2)], 8.0);
        assert_eq!(means.len(), 2);
    }

    #[test]
    fn test_trend_window_start() {
        let now = at("2024-05-17 14:30:00");
        assert_eq!(
            trend_window_start(now, DEFAULT_TREND_MONTHS),
            Some(at("2024-03-01 00:00:00"))
        );
        assert_eq!(trend_window_start(now, 1), Some(at("2024-05-01 00:00:00")));
    }

    #[test]
    fn test_trend_window_crosses_year() {
        let now = at("2024-01-10 08:00:00");
        assert_eq!(
            trend_window_start(now, DEFAULT_TREND_MONTHS),
            Some(at("2023-11-01 00:00:00"))
        );
    }

    #[test]
    fn test_trend_window_is_inclusive() {
        let now = at("2024-05-17 14:30:00");
        let readings = vec![
            reading("2024-02-29 23:00:00", Component::Pm10, 1.0),
            reading("2024-03-01 00:00:00", Component::Pm10, 2.0),
            reading("2024-04-15 12:00:00", Component::Pm10, 3.0),
            reading("2024-05-17 14:30:00", Component::Pm10, 4.0),
            reading("2024-05-17 15:00:00", Component::Pm10, 5.0),
        ];

        let window = trend_window(&readings, now, DEFAULT_TREND_MONTHS);
        let values: Vec<f64> = window.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_days_before() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(days_before(end, 0), Some(end));
        assert_eq!(days_before(end, 90), NaiveDate::from_ymd_opt(2026, 7, 18));
        assert_eq!(years_before(end, 1), NaiveDate::from_ymd_opt(2025, 10, 16));
    }

    #[test]
    fn test_out_of_range_spans_are_none() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(days_before(end, 1_000_000_000), None);
        assert_eq!(days_before(end, i64::MAX), None);
        assert_eq!(days_before(end, -1), None);
        assert_eq!(years_before(end, i64::MAX / 2), None);
        assert_eq!(years_before(end, 10_000_000), None);
    }

    #[test]
    fn test_pivot_by_timestamp() {
        let readings = vec![
            reading("2024-03-02 11:00:00", Component::O3, 80.0),
            reading("2024-03-02 10:00:00", Component::Pm10, 10.0),
            reading("2024-03-02 11:00:00", Component::Pm10, 12.0),
            reading("2024-03-02 11:00:00", Component::Unknown(7), 1.0),
        ];

        let rows = pivot_by_timestamp(&readings);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, at("2024-03-02 10:00:00"));
        assert_eq!(rows[0].pm10, Some(10.0));
        assert_eq!(rows[0].o3, None);
        assert_eq!(rows[1].pm10, Some(12.0));
        assert_eq!(rows[1].o3, Some(80.0));
        assert_eq!(rows[1].no2, None);
    }
}
