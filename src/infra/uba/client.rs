use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use clean_air::fetch::{BasicClient, HttpClient, fetch_bytes};
use clean_air::model::{AirDataError, Reading, Station};
use clean_air::parser::{parse_readings, parse_stations};

use crate::services::air_data_api::{ReadingSource, StationDirectory};

pub struct UbaClient<C = BasicClient> {
    base_url: String,
    http: C,
}

impl UbaClient<BasicClient> {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_client(base_url, BasicClient::new()?))
    }
}

impl<C: HttpClient> UbaClient<C> {
    pub fn with_client(base_url: &str, http: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn stations_url(&self) -> String {
        format!("{}/stations/json?lang=de&index=code", self.base_url)
    }

    fn readings_url(&self, station_id: &str, from: NaiveDate, to: NaiveDate) -> String {
        format!(
            "{}/airquality/json?date_from={}&date_to={}&station={}",
            self.base_url,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
            station_id
        )
    }
}

#[async_trait]
impl<C: HttpClient> StationDirectory for UbaClient<C> {
    #[tracing::instrument(skip(self))]
    async fn list_stations(&self) -> Result<Vec<Result<Station, AirDataError>>> {
        let url = self.stations_url();
        debug!(url = %url, "Fetching station directory");

        let bytes = fetch_bytes(&self.http, &url).await?;
        let stations = parse_stations(&bytes)?;

        info!(count = stations.len(), "Station directory fetched");
        Ok(stations)
    }
}

#[async_trait]
impl<C: HttpClient> ReadingSource for UbaClient<C> {
    #[tracing::instrument(skip(self, from, to), fields(%from, %to))]
    async fn readings(
        &self,
        station_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Result<Reading, AirDataError>>> {
        let url = self.readings_url(station_id, from, to);
        debug!(url = %url, "Fetching readings");

        let bytes = fetch_bytes(&self.http, &url).await?;
        let readings = parse_readings(&bytes, station_id)?;

        info!(count = readings.len(), "Readings fetched");
        Ok(readings)
    }
}
