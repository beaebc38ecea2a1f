pub mod commands;
pub mod controller;

pub use commands::{Command, Outcome};
pub use controller::{Phase, RegistrationController};
