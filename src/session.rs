// =============================================================================
// Simulation Session
// =============================================================================
//
// Owns the loaded history, the forward-simulation cursor, and the most recent
// regime estimate. All mutation flows through two entry points:
//
//   on_history_loaded(series)  : replace the history, reclassify, rebuild the
//                                cursor at the new final bar
//   on_advance_requested()     : generate one synthetic bar and move the
//                                cursor onto it
//
// Reloading always discards the previous cursor. When the new series is too
// short to classify, the previous regime estimate stays on display but the
// new cursor gets zero volatility, so advancing produces flat bars rather
// than bars shocked by a stale estimate from another dataset.
//
// Synthetic bars never re-enter the history; the cursor chains off its own
// output and the volatility stays frozen at its load-time value.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{info, warn};

use crate::error::{Result, SimulationError};
use crate::market_data::{Bar, HistorySeries};
use crate::regime::{classify, RegimeEstimate};
use crate::simulator::{ForwardSimulator, SimulationCursor};

pub struct SimulationSession<R: Rng = StdRng> {
    history: HistorySeries,
    cursor: Option<SimulationCursor>,
    regime: Option<RegimeEstimate>,
    simulator: ForwardSimulator<R>,
}

impl SimulationSession<StdRng> {
    /// Session with an OS-entropy RNG and no history.
    pub fn new() -> Self {
        Self::with_simulator(ForwardSimulator::from_entropy())
    }

    /// Session with a reproducible RNG.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_simulator(ForwardSimulator::from_seed(seed))
    }
}

impl<R: Rng> SimulationSession<R> {
    /// Wrap an already-built simulator (tests inject seeded RNGs here).
    pub fn with_simulator(simulator: ForwardSimulator<R>) -> Self {
        Self {
            history: HistorySeries::new(),
            cursor: None,
            regime: None,
            simulator,
        }
    }

    /// Replace the history with a freshly loaded series.
    ///
    /// The new series is classified and the cursor re-anchored at its final
    /// bar. A series too short to classify leaves the previously stored
    /// estimate on display; the cursor volatility still resets to zero.
    pub fn on_history_loaded(&mut self, series: HistorySeries) {
        let estimate = classify(series.bars());

        match estimate {
            Some(est) => {
                info!(
                    label = %est.label,
                    volatility = format!("{:.6}", est.volatility),
                    bars = series.len(),
                    "history loaded and classified"
                );
                self.regime = Some(est);
            }
            None => {
                warn!(
                    bars = series.len(),
                    "history too short to classify, keeping previous estimate"
                );
            }
        }

        let volatility = estimate.map_or(0.0, |e| e.volatility);
        self.cursor = SimulationCursor::from_series(series.bars(), volatility);
        self.history = series;
    }

    /// Generate one synthetic forward bar.
    ///
    /// # Errors
    /// [`SimulationError::NoHistory`] when nothing has been loaded yet;
    /// otherwise whatever [`ForwardSimulator::step`] raises.
    pub fn on_advance_requested(&mut self) -> Result<Bar> {
        let cursor = self.cursor.as_mut().ok_or(SimulationError::NoHistory)?;
        self.simulator.step(cursor)
    }

    /// The most recent regime estimate, if any load has classified.
    pub fn regime(&self) -> Option<RegimeEstimate> {
        self.regime
    }

    /// The currently loaded history. Ingested bars only; synthetic bars are
    /// never appended.
    pub fn history(&self) -> &HistorySeries {
        &self.history
    }

    /// The bar the next advance will chain from.
    pub fn last_bar(&self) -> Option<Bar> {
        self.cursor.map(|c| c.last_bar)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::RegimeLabel;

    /// Flat daily bars at the given close, starting at epoch 0.
    fn flat_series(count: usize, close: f64) -> HistorySeries {
        let bars = (0..count)
            .map(|i| Bar {
                time: i as i64 * 86_400,
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect();
        HistorySeries::from_bars(bars)
    }

    /// Daily bars climbing 0.4 per step from 100, starting at epoch 0.
    fn climbing_series(count: usize) -> HistorySeries {
        let bars = (0..count)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.4;
                Bar {
                    time: i as i64 * 86_400,
                    open: close,
                    high: close,
                    low: close,
                    close,
                }
            })
            .collect();
        HistorySeries::from_bars(bars)
    }

    #[test]
    fn advance_without_history_errors() {
        let mut session = SimulationSession::from_seed(1);
        let err = session.on_advance_requested().unwrap_err();
        assert!(matches!(err, SimulationError::NoHistory));
    }

    #[test]
    fn load_classifies_and_anchors_cursor() {
        let mut session = SimulationSession::from_seed(2);
        session.on_history_loaded(climbing_series(25));

        let est = session.regime().unwrap();
        assert_eq!(est.label, RegimeLabel::StrongBull);

        let last = session.last_bar().unwrap();
        assert_eq!(last.time, 24 * 86_400);
    }

    #[test]
    fn advance_chains_from_loaded_tail() {
        // Flat history classifies NEUTRAL with zero volatility, so the
        // generated bar is exactly flat and fully deterministic.
        let mut session = SimulationSession::from_seed(3);
        session.on_history_loaded(flat_series(25, 100.0));
        assert_eq!(session.regime().unwrap().label, RegimeLabel::Neutral);

        let bar = session.on_advance_requested().unwrap();
        assert_eq!(bar.time, 25 * 86_400);
        assert!((bar.open - 100.0).abs() < f64::EPSILON);
        assert!((bar.close - 100.0).abs() < f64::EPSILON);

        let next = session.on_advance_requested().unwrap();
        assert_eq!(next.time, 26 * 86_400);
    }

    #[test]
    fn short_series_keeps_estimate_but_resets_volatility() {
        let mut session = SimulationSession::from_seed(4);
        session.on_history_loaded(climbing_series(25));
        let first_estimate = session.regime().unwrap();

        // Ten bars cannot classify: the estimate stays, the cursor does not.
        session.on_history_loaded(flat_series(10, 50.0));
        assert_eq!(session.regime(), Some(first_estimate));

        let bar = session.on_advance_requested().unwrap();
        assert_eq!(bar.time, 10 * 86_400);
        assert!((bar.open - 50.0).abs() < f64::EPSILON);
        assert!((bar.close - 50.0).abs() < f64::EPSILON);
        assert!((bar.high - 50.0).abs() < f64::EPSILON);
        assert!((bar.low - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_initial_series_has_no_estimate_and_advances_flat() {
        let mut session = SimulationSession::from_seed(5);
        session.on_history_loaded(flat_series(5, 80.0));
        assert!(session.regime().is_none());

        let bar = session.on_advance_requested().unwrap();
        assert!((bar.close - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reload_discards_previous_cursor() {
        let mut session = SimulationSession::from_seed(6);
        session.on_history_loaded(flat_series(25, 100.0));
        session.on_advance_requested().unwrap();
        session.on_advance_requested().unwrap();

        session.on_history_loaded(flat_series(22, 200.0));
        let bar = session.on_advance_requested().unwrap();
        assert_eq!(bar.time, 22 * 86_400);
        assert!((bar.open - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn advances_never_grow_the_history() {
        let mut session = SimulationSession::from_seed(7);
        session.on_history_loaded(flat_series(25, 100.0));

        for _ in 0..5 {
            session.on_advance_requested().unwrap();
        }
        assert_eq!(session.history().len(), 25);
    }

    #[test]
    fn last_bar_tracks_generated_bars() {
        let mut session = SimulationSession::from_seed(8);
        session.on_history_loaded(flat_series(25, 100.0));

        let bar = session.on_advance_requested().unwrap();
        assert_eq!(session.last_bar(), Some(bar));
    }
}
