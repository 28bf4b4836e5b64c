//! JSON parser for the Umweltbundesamt air-data API (v3).
//!
//! Both endpoints wrap their payload in a `data` object of positional arrays.
//! Individual records that cannot be interpreted are returned as
//! [`AirDataError::MalformedRecord`] next to the good ones, so one bad row
//! never discards the rest of the response.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{AirDataError, Component, Reading, Station};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

/// Decodes the station directory (`stations/json?index=code`).
///
/// Each entry is `[id, code, name, city, synonym, active_from, active_to, ...]`.
///
/// # Errors
///
/// Returns an error if the body is not JSON.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Result<Station, AirDataError>>> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    let Value::Object(entries) = envelope.data else {
        return Ok(Vec::new());
    };

    Ok(entries
        .iter()
        .map(|(key, row)| parse_station(key, row))
        .collect())
}

fn parse_station(key: &str, row: &Value) -> Result<Station, AirDataError> {
    let context = format!("station {key}");
    let fields = row
        .as_array()
        .ok_or_else(|| malformed(&context, "entry is not an array"))?;

    let text = |i: usize, name: &str| {
        fields
            .get(i)
            .and_then(as_text)
            .ok_or_else(|| malformed(&context, &format!("missing {name}")))
    };

    let active_from_raw = text(5, "active_from")?;
    let active_from = parse_date(&active_from_raw)
        .ok_or_else(|| malformed(&context, &format!("bad active_from '{active_from_raw}'")))?;

    let active_to = match fields.get(6).and_then(as_text) {
        Some(raw) if !raw.is_empty() => Some(
            parse_date(&raw)
                .ok_or_else(|| malformed(&context, &format!("bad active_to '{raw}'")))?,
        ),
        _ => None,
    };

    Ok(Station {
        id: text(0, "id")?,
        code: text(1, "code")?,
        name: text(2, "name")?,
        city: text(3, "city")?,
        active_from,
        active_to,
    })
}

/// Decodes air-quality readings (`airquality/json`) for `station_id`.
///
/// `data[station_id]` maps a timestamp to
/// `[date_end, index, incomplete, [code, value, index, y_value], ...]`.
/// A missing station or an empty `data` yields no readings.
///
/// # Errors
///
/// Returns an error if the body is not JSON.
pub fn parse_readings(
    bytes: &[u8],
    station_id: &str,
) -> Result<Vec<Result<Reading, AirDataError>>> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    let Some(Value::Object(rows)) = envelope.data.get(station_id) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for (raw_ts, row) in rows {
        let context = format!("station {station_id} at {raw_ts}");

        let Some(timestamp) = parse_timestamp(raw_ts) else {
            out.push(Err(malformed(&context, "unparseable timestamp")));
            continue;
        };
        let Some(fields) = row.as_array() else {
            out.push(Err(malformed(&context, "entry is not an array")));
            continue;
        };

        for component in fields.iter().skip(3) {
            out.push(parse_component(station_id, timestamp, component, &context));
        }
    }

    Ok(out)
}

fn parse_component(
    station_id: &str,
    timestamp: NaiveDateTime,
    component: &Value,
    context: &str,
) -> Result<Reading, AirDataError> {
    let parts = component
        .as_array()
        .ok_or_else(|| malformed(context, "component is not an array"))?;

    let code = parts
        .first()
        .and_then(as_integer)
        .ok_or_else(|| malformed(context, "missing component code"))?;
    let component = Component::from_code(code);

    let value = parts
        .get(1)
        .and_then(as_number)
        .ok_or_else(|| malformed(context, &format!("non-numeric value for {component}")))?;

    Ok(Reading {
        station_id: station_id.to_string(),
        timestamp,
        component,
        value,
        index: parts.get(2).and_then(as_integer),
        secondary_value: parts.get(3).and_then(as_number),
    })
}

/// Parses `YYYY-MM-DD HH:MM:SS` or a bare date.
///
/// The API reports the last hour of a day as `24:00:00`, which is read as
/// midnight of the following day.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(day) = raw.strip_suffix(" 24:00:00") {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
        return Some(date.succ_opt()?.and_time(NaiveTime::MIN));
    }

    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn malformed(context: &str, reason: &str) -> AirDataError {
    AirDataError::MalformedRecord {
        context: context.to_string(),
        reason: reason.to_string(),
    }
}
