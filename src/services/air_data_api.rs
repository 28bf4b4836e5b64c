//! Traits for the remote collaborators: the station directory and the
//! reading source.

use anyhow::Result;
use chrono::NaiveDate;

use clean_air::model::{AirDataError, Reading, Station};

/// Lists every monitoring station known to a provider.
#[async_trait::async_trait]
pub trait StationDirectory {
    /// Returns all stations; entries the provider sent but that could not be
    /// read come back as errors next to the good ones.
    async fn list_stations(&self) -> Result<Vec<Result<Station, AirDataError>>>;
}

/// Supplies raw readings for one station over an inclusive date range.
#[async_trait::async_trait]
pub trait ReadingSource {
    async fn readings(
        &self,
        station_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Result<Reading, AirDataError>>>;
}
