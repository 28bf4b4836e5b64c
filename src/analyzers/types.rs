//! Data types produced by the analyzers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::{Component, Overall, Status};

/// All known pollutant values measured at one timestamp.
///
/// A column is `None` when the station did not report that pollutant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRow {
    #[serde(rename = "Date")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "PM10")]
    pub pm10: Option<f64>,
    #[serde(rename = "O3")]
    pub o3: Option<f64>,
    #[serde(rename = "NO2")]
    pub no2: Option<f64>,
    #[serde(rename = "PM2.5")]
    pub pm25: Option<f64>,
}

impl WideRow {
    pub(crate) fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            pm10: None,
            o3: None,
            no2: None,
            pm25: None,
        }
    }

    pub(crate) fn slot(&mut self, component: Component) -> Option<&mut Option<f64>> {
        match component {
            Component::Pm10 => Some(&mut self.pm10),
            Component::O3 => Some(&mut self.o3),
            Component::No2 => Some(&mut self.no2),
            Component::Pm25 => Some(&mut self.pm25),
            Component::Unknown(_) => None,
        }
    }
}

/// Classification of one component at the assessed timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    pub component: Component,
    pub value: f64,
    pub status: Status,
}

/// Air quality of a station for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub station_id: String,
    pub date: NaiveDate,
    /// Timestamp of the readings that were classified. `None` when the day
    /// had no readings at all.
    pub measured_at: Option<NaiveDateTime>,
    pub components: Vec<ComponentStatus>,
    /// Components present at `measured_at` that have no thresholds.
    pub excluded: Vec<Component>,
    pub overall: Overall,
}
