pub mod csv_loader;
pub mod history;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Bar`).
pub use csv_loader::{load_history, read_history};
pub use history::{Bar, HistorySeries};
