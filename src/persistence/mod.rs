pub mod client;
pub mod validation;

pub use client::PersistenceClient;
pub use validation::prepare;
