pub mod advisory;
pub mod interpreter;
pub mod tier;

pub use advisory::Advisory;
pub use interpreter::{interpret, FieldStatus, Interpretation};
pub use tier::ConfidenceTier;
