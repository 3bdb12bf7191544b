use climate_core::WINDOW_DAYS;
use log::info;

use super::{ClimateData, DateWindow, Error};

/// Values derived from the dataset once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimateSnapshot {
    /// Trailing window ending at the most recent observation date
    pub window: DateWindow,
    pub most_active_station: String,
}

impl ClimateSnapshot {
    pub async fn load(climate_db: &dyn ClimateData) -> Result<Self, Error> {
        let latest_date = climate_db
            .latest_date()
            .await?
            .ok_or(Error::EmptyDataset)?;
        let window = DateWindow::trailing(latest_date, WINDOW_DAYS)?;
        let most_active_station = climate_db
            .most_active_station()
            .await?
            .ok_or(Error::EmptyDataset)?;

        info!(
            "dataset window: {} to {}, most active station: {}",
            window.start, window.end, most_active_station
        );

        Ok(Self {
            window,
            most_active_station,
        })
    }
}
