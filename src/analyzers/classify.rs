//! Threshold classification of pollutant readings.

use anyhow::{Context, Result, bail};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use crate::model::{AirDataError, Component, Overall, Status};

/// Upper bounds per component, ascending. A value above every bound is Poor.
///
/// | Component | Good ≤ | Moderate ≤ |
/// |-----------|--------|------------|
/// | PM10      | 35     | 50         |
/// | O3        | 120    | 180        |
/// | NO2       | 40     | 100        |
/// | PM2.5     | 20     | 25         |
static STANDARD_LIMITS: &[(Component, &[(f64, Status)])] = &[
    (Component::Pm10, &[(35.0, Status::Good), (50.0, Status::Moderate)]),
    (Component::O3, &[(120.0, Status::Good), (180.0, Status::Moderate)]),
    (Component::No2, &[(40.0, Status::Good), (100.0, Status::Moderate)]),
    (Component::Pm25, &[(20.0, Status::Good), (25.0, Status::Moderate)]),
];

static STANDARD: LazyLock<ThresholdTable> = LazyLock::new(|| ThresholdTable {
    limits: STANDARD_LIMITS
        .iter()
        .map(|(component, bounds)| (*component, bounds.to_vec()))
        .collect(),
});

/// Immutable mapping from component to its ordered `(bound, status)` list.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    limits: BTreeMap<Component, Vec<(f64, Status)>>,
}

impl ThresholdTable {
    /// The Umweltbundesamt limits, built once per process.
    pub fn standard() -> &'static ThresholdTable {
        &STANDARD
    }

    /// Loads a replacement table from a JSON file shaped like
    /// `{"PM10": [[35, "Good"], [50, "Moderate"]], ...}`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read threshold file '{path}'"))?;
        Self::from_json(&content)
    }

    /// Parses a threshold table.
    ///
    /// Each component may appear once (names are case-insensitive), needs at
    /// least one bound, and its statuses must not get better as the bounds
    /// rise, starting at Good.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<(f64, String)>> = serde_json::from_str(content)?;

        let mut limits = BTreeMap::new();
        for (key, entries) in raw {
            let component: Component = key.parse()?;
            let mut bounds = Vec::with_capacity(entries.len());
            for (bound, label) in entries {
                if !bound.is_finite() {
                    bail!("threshold for {component} is not a finite number");
                }
                bounds.push((bound, label.parse::<Status>()?));
            }
            bounds.sort_by(|a, b| a.0.total_cmp(&b.0));

            match bounds.first() {
                None => bail!("no thresholds given for {component}"),
                Some((_, status)) if *status != Status::Good => {
                    bail!("thresholds for {component} must start with a Good band")
                }
                Some(_) => {}
            }
            if bounds.windows(2).any(|w| w[1].1 < w[0].1) {
                bail!("statuses for {component} must not improve as the bounds rise");
            }
            if limits.insert(component, bounds).is_some() {
                bail!("thresholds for {component} are given more than once");
            }
        }

        Ok(Self { limits })
    }

    /// Classifies `value` for `component`.
    ///
    /// Bounds are inclusive: the first bound `value` does not exceed wins.
    ///
    /// # Errors
    ///
    /// [`AirDataError::NoThresholdConfigured`] if the table has no entry for
    /// `component`; such components contribute nothing to [`overall_status`].
    pub fn classify(&self, component: Component, value: f64) -> Result<Status, AirDataError> {
        let bounds = self
            .limits
            .get(&component)
            .ok_or(AirDataError::NoThresholdConfigured(component))?;

        Ok(bounds
            .iter()
            .find(|(bound, _)| value <= *bound)
            .map(|(_, status)| *status)
            .unwrap_or(Status::Poor))
    }

    /// The highest bound that is not Poor, shown as the acceptable level.
    pub fn acceptable_level(&self, component: Component) -> Option<f64> {
        self.limits
            .get(&component)
            .and_then(|bounds| bounds.iter().rev().find(|(_, s)| *s != Status::Poor))
            .map(|(bound, _)| *bound)
    }
}

/// Reduces component statuses to the worst one.
///
/// An empty input yields [`Overall::NoData`], never Good.
pub fn overall_status<I>(statuses: I) -> Overall
where
    I: IntoIterator<Item = Status>,
{
    statuses
        .into_iter()
        .max()
        .map(Overall::Rated)
        .unwrap_or(Overall::NoData)
}
