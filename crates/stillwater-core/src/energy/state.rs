//! Energy state types and classifier.

use serde::{Deserialize, Serialize};

/// Qualitative summary of recent mood.
///
/// Ordered from calmest to most activated, so `Calm < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyState {
    Calm,
    Balanced,
    Elevated,
    High,
}

impl EnergyState {
    pub const ALL: [EnergyState; 4] = [
        EnergyState::Calm,
        EnergyState::Balanced,
        EnergyState::Elevated,
        EnergyState::High,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            EnergyState::Calm => "Calm",
            EnergyState::Balanced => "Balanced",
            EnergyState::Elevated => "Elevated",
            EnergyState::High => "High",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EnergyState::Calm => "Your week has felt settled and steady.",
            EnergyState::Balanced => "Mostly even, with a few ripples.",
            EnergyState::Elevated => "Some tension is building. A slow breath could help.",
            EnergyState::High => "It's been a heavy stretch. Be gentle with yourself.",
        }
    }
}

impl std::fmt::Display for EnergyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Maps daily scores to an [`EnergyState`].
///
/// Bands over the mean of non-zero scores, each closed at its lower bound:
/// `[8, ..)` Calm, `[6, 8)` Balanced, `[4, 6)` Elevated, `(.., 4)` High.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyClassifier;

impl EnergyClassifier {
    /// State reported when no day carries a score.
    pub const UNKNOWN: EnergyState = EnergyState::Elevated;

    pub fn new() -> Self {
        Self
    }

    /// Mean of the non-zero, finite scores, if any.
    pub fn mean(scores: &[f64]) -> Option<f64> {
        let (sum, count) = scores
            .iter()
            .filter(|s| s.is_finite() && **s != 0.0)
            .fold((0.0, 0usize), |(sum, n), s| (sum + s, n + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    pub fn classify(&self, scores: &[f64]) -> EnergyState {
        match Self::mean(scores) {
            Some(mean) => Self::classify_mean(mean),
            None => Self::UNKNOWN,
        }
    }

    pub fn classify_mean(mean: f64) -> EnergyState {
        if mean >= 8.0 {
            EnergyState::Calm
        } else if mean >= 6.0 {
            EnergyState::Balanced
        } else if mean >= 4.0 {
            EnergyState::Elevated
        } else {
            EnergyState::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(EnergyClassifier::classify_mean(8.0), EnergyState::Calm);
        assert_eq!(EnergyClassifier::classify_mean(7.999), EnergyState::Balanced);
        assert_eq!(EnergyClassifier::classify_mean(6.0), EnergyState::Balanced);
        assert_eq!(EnergyClassifier::classify_mean(5.999), EnergyState::Elevated);
        assert_eq!(EnergyClassifier::classify_mean(4.0), EnergyState::Elevated);
        assert_eq!(EnergyClassifier::classify_mean(3.999), EnergyState::High);
        assert_eq!(EnergyClassifier::classify_mean(10.0), EnergyState::Calm);
    }

    #[test]
    fn empty_and_all_zero_default_to_elevated() {
        let classifier = EnergyClassifier::new();
        assert_eq!(classifier.classify(&[]), EnergyState::Elevated);
        assert_eq!(classifier.classify(&[0.0; 7]), EnergyState::Elevated);
    }

    #[test]
    fn zeros_do_not_drag_the_mean_down() {
        let classifier = EnergyClassifier::new();
        let scores = [0.0, 0.0, 9.0, 0.0, 8.0, 0.0, 0.0];
        assert_eq!(EnergyClassifier::mean(&scores), Some(8.5));
        assert_eq!(classifier.classify(&scores), EnergyState::Calm);
    }

    #[test]
    fn states_are_ordered_by_calmness() {
        assert!(EnergyState::Calm < EnergyState::Balanced);
        assert!(EnergyState::Balanced < EnergyState::Elevated);
        assert!(EnergyState::Elevated < EnergyState::High);
    }

    proptest! {
        #[test]
        fn lower_mean_is_never_calmer(a in 0.001f64..10.0, b in 0.001f64..10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                EnergyClassifier::classify_mean(lo) >= EnergyClassifier::classify_mean(hi)
            );
        }

        #[test]
        fn nonzero_series_always_classifies(scores in proptest::collection::vec(0.0f64..=10.0, 1..14)) {
            let state = EnergyClassifier::new().classify(&scores);
            prop_assert!(EnergyState::ALL.contains(&state));
        }
    }
}
