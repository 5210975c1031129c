//! Simulation error types

use thiserror::Error;

/// Simulation result type alias
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors raised by the forward-bar simulation path.
///
/// An unclassifiable history is deliberately not represented here: the
/// classifier signals it with `None` and callers keep their previous
/// estimate on display.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SimulationError {
    #[error("invalid volatility parameter: {volatility}")]
    InvalidVolatility { volatility: f64 },

    #[error("degenerate reference close: {close}")]
    DegenerateReference { close: f64 },

    #[error("no history loaded; nothing to advance from")]
    NoHistory,
}
