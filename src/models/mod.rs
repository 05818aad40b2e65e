pub mod reading;
pub mod station;

pub use reading::{parse_number, Observation, Reading};
pub use station::StationRecord;
