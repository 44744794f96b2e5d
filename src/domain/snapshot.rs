use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance (kW) when checking a supplied total against solar + wind
pub const TOTAL_POWER_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be finite and non-negative: {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("totalPower {total} does not match solarPower + windPower ({expected})")]
    TotalMismatch { total: f64, expected: f64 },
}

/// 16-point compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub cloud_cover: f64,
    pub uv_index: f64,
    pub wind_speed: f64,
    pub wind_direction: WindDirection,
}

/// Generated power in kW. The total is always solar + wind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPowerGeneration")]
pub struct PowerGeneration {
    solar_power: f64,
    wind_power: f64,
    total_power: f64,
}

impl PowerGeneration {
    pub fn new(solar_power: f64, wind_power: f64) -> Self {
        Self {
            solar_power,
            wind_power,
            total_power: solar_power + wind_power,
        }
    }

    pub fn solar_power(&self) -> f64 {
        self.solar_power
    }

    pub fn wind_power(&self) -> f64 {
        self.wind_power
    }

    pub fn total_power(&self) -> f64 {
        self.total_power
    }
}

// Wire form: totalPower may be omitted and is derived when it is
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPowerGeneration {
    solar_power: f64,
    wind_power: f64,
    #[serde(default)]
    total_power: Option<f64>,
}

impl TryFrom<RawPowerGeneration> for PowerGeneration {
    type Error = SnapshotError;

    fn try_from(raw: RawPowerGeneration) -> Result<Self, Self::Error> {
        let power = PowerGeneration::new(raw.solar_power, raw.wind_power);
        match raw.total_power {
            Some(total) if (total - power.total_power).abs() > TOTAL_POWER_TOLERANCE => {
                Err(SnapshotError::TotalMismatch {
                    total,
                    expected: power.total_power,
                })
            }
            _ => Ok(power),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMaintenance {
    pub version: String,
    pub last_update: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStatus {
    #[serde(rename = "SOC")]
    pub soc: f64,
    #[serde(rename = "SOH")]
    pub soh: f64,
    pub charging: bool,
    pub system_maintenance: SystemMaintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerConsumption {
    pub hourly_consumption: f64,
    pub daily_consumption: f64,
    pub peak_usage_hour: u8,
    pub min_usage_hour: u8,
    pub peak_load: f64,
}

/// One telemetry sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub weather: Weather,
    pub power_generation: PowerGeneration,
    pub battery_status: BatteryStatus,
    pub power_consumption: PowerConsumption,
}

impl Snapshot {
    /// Check value ranges that the type system does not express
    pub fn validate(&self) -> Result<(), SnapshotError> {
        percent("weather.humidity", self.weather.humidity)?;
        percent("weather.cloudCover", self.weather.cloud_cover)?;
        non_negative("weather.windSpeed", self.weather.wind_speed)?;
        non_negative("weather.uvIndex", self.weather.uv_index)?;

        non_negative("powerGeneration.solarPower", self.power_generation.solar_power)?;
        non_negative("powerGeneration.windPower", self.power_generation.wind_power)?;

        percent("batteryStatus.SOC", self.battery_status.soc)?;
        percent("batteryStatus.SOH", self.battery_status.soh)?;

        let consumption = &self.power_consumption;
        non_negative("powerConsumption.hourlyConsumption", consumption.hourly_consumption)?;
        non_negative("powerConsumption.dailyConsumption", consumption.daily_consumption)?;
        non_negative("powerConsumption.peakLoad", consumption.peak_load)?;
        hour("powerConsumption.peakUsageHour", consumption.peak_usage_hour)?;
        hour("powerConsumption.minUsageHour", consumption.min_usage_hour)?;

        Ok(())
    }
}

fn percent(field: &'static str, value: f64) -> Result<(), SnapshotError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(SnapshotError::OutOfRange { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), SnapshotError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SnapshotError::Negative { field, value });
    }
    Ok(())
}

fn hour(field: &'static str, value: u8) -> Result<(), SnapshotError> {
    if value > 23 {
        return Err(SnapshotError::OutOfRange {
            field,
            value: value as f64,
        });
    }
    Ok(())
}

/// Body of /api/live: the snapshot just served and the one served before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveReading {
    pub data: Snapshot,
    pub previous: Option<Snapshot>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a valid snapshot; `version` makes samples distinguishable
    pub fn sample(version: &str, solar: f64, wind: f64) -> Snapshot {
        Snapshot {
            weather: Weather {
                temperature: 21.5,
                humidity: 64.0,
                pressure: 1013.0,
                cloud_cover: 20.0,
                uv_index: 5.0,
                wind_speed: 7.2,
                wind_direction: WindDirection::NE,
            },
            power_generation: PowerGeneration::new(solar, wind),
            battery_status: BatteryStatus {
                soc: 85.0,
                soh: 92.0,
                charging: true,
                system_maintenance: SystemMaintenance {
                    version: version.to_string(),
                    last_update: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
                },
            },
            power_consumption: PowerConsumption {
                hourly_consumption: 3.5,
                daily_consumption: 25.0,
                peak_usage_hour: 18,
                min_usage_hour: 3,
                peak_load: 32.0,
            },
        }
    }
}
