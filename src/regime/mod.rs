// =============================================================================
// Regime Classification Module
// =============================================================================
//
// Trailing-window market regime classification from close-to-close returns:
// - volatility (population standard deviation of single-step returns)
// - change (total percentage move across the window)

pub mod classifier;

pub use classifier::{classify, RegimeEstimate, RegimeLabel, REGIME_WINDOW};
