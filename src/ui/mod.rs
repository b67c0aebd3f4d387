pub mod output;
pub mod progress;
pub mod signals;

pub use output::{format_bytes, OutputFormatter, OutputMode};
pub use progress::{ProgressManager, SpinnerProbe};
pub use signals::GracefulShutdown;
