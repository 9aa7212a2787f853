//! Stress state classification
//!
//! A pure mapping from score components to a discrete state. Rules are kept
//! in an ordered table and evaluated top-down; the first match wins and the
//! final rule always matches.

use crate::types::{clamp_unit, Classification, StressScoreComponents, StressState};

/// Fixed confidence reported for vigilance
pub const VIGILANCE_CONFIDENCE: f64 = 0.7;

/// Values a rule is evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleInputs {
    pub posture: f64,
    pub movement: f64,
    /// Combined hand and leg fidgeting
    pub fidgeting: f64,
}

impl From<&StressScoreComponents> for RuleInputs {
    fn from(components: &StressScoreComponents) -> Self {
        Self {
            posture: components.posture,
            movement: components.movement,
            fidgeting: components.fidgeting(),
        }
    }
}

/// One entry of the classification table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub state: StressState,
    pub applies: fn(RuleInputs) -> bool,
    /// Raw confidence, clamped by [`classify`]
    pub confidence: fn(RuleInputs) -> f64,
}

/// Classification rules in evaluation order
pub static RULES: [Rule; 3] = [
    Rule {
        state: StressState::Calm,
        applies: calm_applies,
        confidence: calm_confidence,
    },
    Rule {
        state: StressState::Vigilance,
        applies: vigilance_applies,
        confidence: vigilance_confidence,
    },
    Rule {
        state: StressState::Tense,
        applies: always,
        confidence: tense_confidence,
    },
];

fn calm_applies(i: RuleInputs) -> bool {
    i.posture > 0.7 && i.movement < 0.3 && i.fidgeting < 0.2
}

fn calm_confidence(i: RuleInputs) -> f64 {
    (i.posture + (1.0 - i.movement) + (1.0 - i.fidgeting)) / 3.0
}

fn vigilance_applies(i: RuleInputs) -> bool {
    i.posture > 0.5 && i.movement < 0.6 && i.fidgeting < 0.5
}

fn vigilance_confidence(_: RuleInputs) -> f64 {
    VIGILANCE_CONFIDENCE
}

fn always(_: RuleInputs) -> bool {
    true
}

// Can exceed 1 before clamping
fn tense_confidence(i: RuleInputs) -> f64 {
    1.0 - i.posture + 0.5 * i.movement + 0.5 * i.fidgeting
}

/// First rule in [`RULES`] that applies to `components`
pub fn matching_rule(components: &StressScoreComponents) -> &'static Rule {
    let inputs = RuleInputs::from(components);
    let fallback = &RULES[RULES.len() - 1];
    RULES
        .iter()
        .find(|rule| (rule.applies)(inputs))
        .unwrap_or(fallback)
}

/// Classify score components into a state with confidence in [0, 1]
pub fn classify(components: &StressScoreComponents) -> Classification {
    let inputs = RuleInputs::from(components);
    let rule = matching_rule(components);
    Classification {
        state: rule.state,
        confidence: clamp_unit((rule.confidence)(inputs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(posture: f64, movement: f64, hand: f64, leg: f64) -> StressScoreComponents {
        StressScoreComponents {
            posture,
            movement,
            hand_fidgeting: hand,
            leg_bouncing: leg,
        }
    }

    #[test]
    fn test_rule_table_order() {
        let states: Vec<StressState> = RULES.iter().map(|r| r.state).collect();
        assert_eq!(states, StressState::ALL.to_vec());
    }

    #[test]
    fn test_calm() {
        let result = classify(&components(0.9, 0.1, 0.1, 0.1));
        assert_eq!(result.state, StressState::Calm);
        // mean(0.9, 0.9, 0.9)
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_vigilance() {
        let result = classify(&components(0.6, 0.4, 0.3, 0.3));
        assert_eq!(result.state, StressState::Vigilance);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_calm_boundary_falls_to_vigilance() {
        // posture must be strictly above 0.7 for calm
        let result = classify(&components(0.7, 0.1, 0.0, 0.0));
        assert_eq!(result.state, StressState::Vigilance);
    }

    #[test]
    fn test_fidgeting_combines_hands_and_legs() {
        // hands 0.3, legs 0.0 -> fidgeting 0.15, still calm
        assert_eq!(classify(&components(0.9, 0.1, 0.3, 0.0)).state, StressState::Calm);
        // hands 0.3, legs 0.2 -> fidgeting 0.25, vigilance
        assert_eq!(
            classify(&components(0.9, 0.1, 0.3, 0.2)).state,
            StressState::Vigilance
        );
    }

    #[test]
    fn test_tense_confidence_formula() {
        let result = classify(&components(0.4, 0.2, 0.2, 0.2));
        assert_eq!(result.state, StressState::Tense);
        // 1 - 0.4 + 0.1 + 0.1
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_tense_confidence_is_clamped() {
        // Raw formula gives 1 - 0 + 0.5 + 0.5 = 2
        let result = classify(&components(0.0, 1.0, 1.0, 1.0));
        assert_eq!(result.state, StressState::Tense);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_out_of_range_inputs_stay_bounded() {
        let result = classify(&components(5.0, -3.0, -1.0, -1.0));
        assert!((0.0..=1.0).contains(&result.confidence));

        let result = classify(&components(-2.0, 9.0, 9.0, 9.0));
        assert_eq!(result.state, StressState::Tense);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_nan_inputs_fall_through_to_tense() {
        let result = classify(&components(f64::NAN, 0.0, 0.0, 0.0));
        assert_eq!(result.state, StressState::Tense);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_matching_rule() {
        let rule = matching_rule(&components(0.9, 0.0, 0.0, 0.0));
        assert_eq!(rule.state, StressState::Calm);
    }
}
