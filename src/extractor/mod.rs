pub mod executor;

pub use executor::{ExtractOutcome, Executor};
