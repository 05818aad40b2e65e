pub mod constants;
pub mod format;
pub mod progress;

pub use constants::*;
pub use format::format_decimal;
pub use progress::ProgressReporter;
