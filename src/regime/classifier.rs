// =============================================================================
// Trailing-Window Regime Classifier
// =============================================================================
//
// Classifies the most recent market character from the trailing 20 bars of an
// OHLC series, using two statistics over close-to-close simple returns:
//
//   volatility : population standard deviation of the 19 single-step returns
//   change     : total percentage change across the window
//
// Label rules (evaluated top-to-bottom; first match wins; strict inequalities):
//
//   1. STRONG BULL   : change > +5%
//   2. STRONG BEAR   : change < -5%
//   3. VOLATILE CHOP : volatility > 2%
//   4. NEUTRAL       : otherwise
//
// Fewer than 20 bars, or a zero / non-finite close inside the window, yields
// `None`; callers keep whatever estimate they last displayed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::market_data::Bar;

// =============================================================================
// Constants
// =============================================================================

/// Number of trailing bars the classifier consumes.
pub const REGIME_WINDOW: usize = 20;

/// Total-change threshold (strict) for the STRONG BULL / STRONG BEAR labels.
pub const TREND_THRESHOLD: f64 = 0.05;

/// Volatility threshold (strict) for the VOLATILE CHOP label.
pub const CHOP_VOL_THRESHOLD: f64 = 0.02;

// =============================================================================
// Types
// =============================================================================

/// Qualitative label for the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeLabel {
    /// Total change above +5%: sustained upward move.
    StrongBull,
    /// Total change below -5%: sustained downward move.
    StrongBear,
    /// No strong trend, but return volatility above 2%.
    VolatileChop,
    /// Quiet, directionless window.
    Neutral,
}

impl std::fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBull => write!(f, "STRONG BULL"),
            Self::StrongBear => write!(f, "STRONG BEAR"),
            Self::VolatileChop => write!(f, "VOLATILE CHOP"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// One classification pass: the label plus the statistics that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeEstimate {
    /// The classified regime.
    pub label: RegimeLabel,

    /// Population standard deviation of single-step simple returns.
    pub volatility: f64,

    /// Total change across the window (0.05 = +5%).
    pub change: f64,
}

// =============================================================================
// Classification
// =============================================================================

/// Classify the trailing [`REGIME_WINDOW`] bars of `bars`.
///
/// # Returns
/// `None` when:
/// - there are fewer than `REGIME_WINDOW` bars, or
/// - any close inside the window is zero or non-finite (the returns would be
///   undefined).
///
/// On `None` the caller keeps showing its previous estimate.
pub fn classify(bars: &[Bar]) -> Option<RegimeEstimate> {
    if bars.len() < REGIME_WINDOW {
        return None;
    }

    let window = &bars[bars.len() - REGIME_WINDOW..];
    if window.iter().any(|b| b.close == 0.0 || !b.close.is_finite()) {
        return None;
    }

    // --- Step 1: single-step simple returns ----------------------------------
    let returns: Vec<f64> = window
        .windows(2)
        .map(|pair| (pair[1].close - pair[0].close) / pair[0].close)
        .collect();

    // --- Step 2: population standard deviation of the returns ----------------
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let volatility = variance.sqrt();

    // --- Step 3: total change across the window ------------------------------
    let first_close = window[0].close;
    let last_close = window[REGIME_WINDOW - 1].close;
    let change = (last_close - first_close) / first_close;

    let label = label_for(change, volatility);

    debug!(
        label = %label,
        volatility = format!("{:.6}", volatility),
        change = format!("{:+.4}", change),
        "regime classified"
    );

    Some(RegimeEstimate {
        label,
        volatility,
        change,
    })
}

/// Apply the label rules to the raw statistics.
///
/// Inequalities are strict: a change of exactly +/-5%, or a volatility of
/// exactly 2%, does not qualify.
pub fn label_for(change: f64, volatility: f64) -> RegimeLabel {
    if change > TREND_THRESHOLD {
        return RegimeLabel::StrongBull;
    }
    if change < -TREND_THRESHOLD {
        return RegimeLabel::StrongBear;
    }
    if volatility > CHOP_VOL_THRESHOLD {
        return RegimeLabel::VolatileChop;
    }
    RegimeLabel::Neutral
}
