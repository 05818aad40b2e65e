pub mod temperature_store;

pub use temperature_store::TemperatureStore;
