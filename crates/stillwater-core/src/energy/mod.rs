//! Energy state classification.
//!
//! Summarizes the recent mood rhythm as one of four qualitative states shown
//! on the home dashboard.

mod state;

pub use state::{EnergyClassifier, EnergyState};
