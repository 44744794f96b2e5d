pub mod snapshot;
pub mod trend;

pub use snapshot::{
    BatteryStatus, LiveReading, PowerConsumption, PowerGeneration, Snapshot, SnapshotError,
    SystemMaintenance, Weather, WindDirection,
};
pub use trend::{percent_change, PowerTrends};
