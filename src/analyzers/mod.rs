pub mod fluctuation;

pub use fluctuation::{calculate_fluctuation, StationSummary};
