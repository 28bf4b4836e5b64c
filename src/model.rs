//! Core data types shared by the parser, the analyzers and the CLI.
//!
//! Nothing in here performs I/O.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A pollutant measured by UBA stations.
///
/// The API identifies components by numeric code:
/// - `1` → [`Component::Pm10`]
/// - `3` → [`Component::O3`]
/// - `5` → [`Component::No2`]
/// - `9` → [`Component::Pm25`]
///
/// Any other code is carried through as [`Component::Unknown`] rather than
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component {
    Pm10,
    O3,
    No2,
    Pm25,
    Unknown(i64),
}

impl Component {
    /// The four known pollutants, in display order.
    pub const ALL: [Component; 4] = [
        Component::Pm10,
        Component::O3,
        Component::No2,
        Component::Pm25,
    ];

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Component::Pm10,
            3 => Component::O3,
            5 => Component::No2,
            9 => Component::Pm25,
            other => Component::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Component::Pm10 => 1,
            Component::O3 => 3,
            Component::No2 => 5,
            Component::Pm25 => 9,
            Component::Unknown(code) => *code,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Component::Pm10 => "PM10".into(),
            Component::O3 => "O3".into(),
            Component::No2 => "NO2".into(),
            Component::Pm25 => "PM2.5".into(),
            Component::Unknown(code) => code.to_string(),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl FromStr for Component {
    type Err = AirDataError;

    /// Accepts labels (`pm10`, `O3`, `no2`, `PM2.5`, `pm25`, `pm2`) or a
    /// numeric API code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "PM10" => Ok(Component::Pm10),
            "O3" => Ok(Component::O3),
            "NO2" => Ok(Component::No2),
            "PM2.5" | "PM25" | "PM2" => Ok(Component::Pm25),
            other => other
                .parse::<i64>()
                .map(Component::from_code)
                .map_err(|_| AirDataError::MalformedRecord {
                    context: "component".into(),
                    reason: format!("unknown pollutant '{s}'"),
                }),
        }
    }
}

/// A monitoring station as listed by the station directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub code: String,
    pub name: String,
    pub city: String,
    pub active_from: NaiveDate,
    pub active_to: Option<NaiveDate>,
}

impl Station {
    /// A station without an end date is still reporting.
    pub fn is_active(&self) -> bool {
        self.active_to.is_none()
    }
}

/// One measured value for one component at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub component: Component,
    pub value: f64,
    /// API-supplied index for this component.
    pub index: Option<i64>,
    /// API-supplied secondary ("Y") value.
    pub secondary_value: Option<f64>,
}

/// Qualitative air quality for a single component, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Status {
    Good,
    Moderate,
    Poor,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Good => "Good",
            Status::Moderate => "Moderate",
            Status::Poor => "Poor",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Status::Good => "green",
            Status::Moderate => "orange",
            Status::Poor => "red",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = AirDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Status::Good),
            "moderate" => Ok(Status::Moderate),
            "poor" => Ok(Status::Poor),
            _ => Err(AirDataError::MalformedRecord {
                context: "status".into(),
                reason: format!("unknown status '{s}'"),
            }),
        }
    }
}

/// Worst-case status over a set of components.
///
/// `NoData` is distinct from `Rated(Status::Good)`: it means there was
/// nothing to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overall {
    NoData,
    Rated(Status),
}

impl Overall {
    pub fn label(&self) -> &'static str {
        match self {
            Overall::NoData => "No data",
            Overall::Rated(status) => status.label(),
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Overall::NoData => "gray",
            Overall::Rated(status) => status.color(),
        }
    }
}

impl Serialize for Overall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for Overall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Record-level failures the core distinguishes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AirDataError {
    /// The component has no entry in the threshold table. Callers exclude it
    /// from the worst-case reduction.
    #[error("no thresholds configured for component {0}")]
    NoThresholdConfigured(Component),

    /// A single record could not be interpreted.
    #[error("malformed record ({context}): {reason}")]
    MalformedRecord { context: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_codes_round_trip() {
        for component in Component::ALL {
            assert_eq!(Component::from_code(component.code()), component);
        }
    }

    #[test]
    fn test_unknown_code_passes_through() {
        let c = Component::from_code(7);
        assert_eq!(c, Component::Unknown(7));
        assert_eq!(c.label(), "7");
        assert_eq!(c.code(), 7);
    }

    #[test]
    fn test_component_labels() {
        assert_eq!(Component::Pm10.label(), "PM10");
        assert_eq!(Component::O3.label(), "O3");
        assert_eq!(Component::No2.label(), "NO2");
        assert_eq!(Component::Pm25.label(), "PM2.5");
    }

    #[test]
    fn test_component_from_str() {
        assert_eq!("pm10".parse::<Component>().unwrap(), Component::Pm10);
        assert_eq!("PM2.5".parse::<Component>().unwrap(), Component::Pm25);
        assert_eq!("pm25".parse::<Component>().unwrap(), Component::Pm25);
        assert_eq!(" no2 ".parse::<Component>().unwrap(), Component::No2);
        assert_eq!("3".parse::<Component>().unwrap(), Component::O3);
        assert_eq!("42".parse::<Component>().unwrap(), Component::Unknown(42));
        assert!("smog".parse::<Component>().is_err());
    }

    #[test]
    fn test_status_ordering() {
        assert!(Status::Good < Status::Moderate);
        assert!(Status::Moderate < Status::Poor);
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(Status::Good.color(), "green");
        assert_eq!(Status::Moderate.color(), "orange");
        assert_eq!(Status::Poor.color(), "red");
    }

    #[test]
    fn test_no_data_is_not_good() {
        assert_ne!(Overall::NoData, Overall::Rated(Status::Good));
        assert_eq!(Overall::NoData.label(), "No data");
    }

    #[test]
    fn test_station_is_active() {
        let mut station = Station {
            id: "282".into(),
            code: "DEBE010".into(),
            name: "Berlin Wedding".into(),
            city: "Berlin".into(),
            active_from: NaiveDate::from_ymd_opt(1986, 10, 1).unwrap(),
            active_to: None,
        };
        assert!(station.is_active());

        station.active_to = NaiveDate::from_ymd_opt(2010, 1, 1);
        assert!(!station.is_active());
    }
}
