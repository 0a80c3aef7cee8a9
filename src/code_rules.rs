//! Fatigue endurance of welded hollow-section joints.
//!
//! The engine asks a [`CodeRuleEvaluator`] how many stress cycles a joint
//! member survives. [`Eurocode3`] implements the lattice girder details of
//! EN 1993-1-9, Table 8.7.

use std::fmt;

use crate::errors::{DesignError, DesignResult};

/// Code name accepted by [`Eurocode3::for_code`].
pub const EUROCODE_3: &str = "Eurocode 3";

/// Cycles at which the detail category is defined.
const REFERENCE_CYCLES: f64 = 2.0e6;
/// Cycles beyond which the stress range is below the cut-off limit.
const CUT_OFF_CYCLES: f64 = 1.0e8;
/// Slope of the S-N curve for lattice girder joints.
const SN_SLOPE: f64 = 5.0;

/// Geometry family of a lattice girder joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JointClass {
    /// Two braces meeting the chord at an angle.
    K,
    /// One inclined and one perpendicular brace.
    N,
}

impl fmt::Display for JointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointClass::K => f.write_str("K"),
            JointClass::N => f.write_str("N"),
        }
    }
}

/// One evaluator call: a member of a joint under a constant-amplitude stress range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FatigueQuery {
    /// Stress range in megapascals.
    pub stress_range: f64,
    /// Wall thickness ratio `t0/ti` (chord over member).
    pub thickness_ratio: f64,
    /// Joint family.
    pub joint_class: JointClass,
    /// `true` for overlapping braces, `false` for a gap joint.
    pub overlap: bool,
}

/// Source of allowable fatigue lives.
pub trait CodeRuleEvaluator {
    /// Number of cycles the queried detail endures.
    ///
    /// May return `f64::INFINITY` when the stress range is below the cut-off.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the query is outside the rule's range.
    fn allowable_life(&self, query: &FatigueQuery) -> Result<f64, String>;
}

/// EN 1993-1-9 lattice girder details with a configurable partial factor `γ_Mf`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eurocode3 {
    /// Partial factor for fatigue strength.
    pub partial_factor: f64,
}

impl Default for Eurocode3 {
    fn default() -> Self {
        Self {
            partial_factor: 1.0,
        }
    }
}

impl Eurocode3 {
    /// Create an evaluator with the given partial factor.
    #[must_use]
    pub const fn new(partial_factor: f64) -> Self {
        Self { partial_factor }
    }

    /// Select the evaluator named by a `CODE` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::UnsupportedCode`] for any code other than Eurocode 3
    /// and [`DesignError::InvalidValue`] for a non-positive partial factor.
    pub fn for_code(code: &str, partial_factor: f64) -> DesignResult<Self> {
        if !code.trim().eq_ignore_ascii_case(EUROCODE_3) {
            return Err(DesignError::UnsupportedCode(code.to_owned()));
        }
        if !(partial_factor > 0.0 && partial_factor.is_finite()) {
            return Err(DesignError::InvalidValue {
                name: "partial_factor".to_owned(),
                reason: format!("must be positive, got {partial_factor}"),
            });
        }
        Ok(Self::new(partial_factor))
    }

    /// Detail category `Δσ_C` in megapascals.
    ///
    /// # Errors
    ///
    /// Returns a reason when `t0/ti < 1` or is not finite.
    pub fn detail_category(
        joint_class: JointClass,
        overlap: bool,
        thickness_ratio: f64,
    ) -> Result<f64, String> {
        if !(thickness_ratio >= 1.0 && thickness_ratio.is_finite()) {
            return Err(format!(
                "thickness ratio t0/ti = {thickness_ratio} is outside Table 8.7 (needs t0/ti >= 1)"
            ));
        }
        let (low, high, limit) = match (joint_class, overlap) {
            (JointClass::K, false) => (45.0, 90.0, 2.0),
            (JointClass::K, true) => (56.0, 71.0, 1.4),
            (JointClass::N, false) => (36.0, 71.0, 2.0),
            (JointClass::N, true) => (50.0, 71.0, 1.4),
        };
        let share = ((thickness_ratio - 1.0) / (limit - 1.0)).min(1.0);
        Ok(low + share * (high - low))
    }
}

impl CodeRuleEvaluator for Eurocode3 {
    fn allowable_life(&self, query: &FatigueQuery) -> Result<f64, String> {
        let category =
            Self::detail_category(query.joint_class, query.overlap, query.thickness_ratio)?;
        let range = query.stress_range.abs() * self.partial_factor;
        if !range.is_finite() {
            return Err(format!("stress range {} is not finite", query.stress_range));
        }
        let cycles = REFERENCE_CYCLES * (category / range).powf(SN_SLOPE);
        if cycles > CUT_OFF_CYCLES {
            return Ok(f64::INFINITY);
        }
        Ok(cycles)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn query(stress_range: f64, thickness_ratio: f64) -> FatigueQuery {
        FatigueQuery {
            stress_range,
            thickness_ratio,
            joint_class: JointClass::K,
            overlap: false,
        }
    }

    #[test]
    fn category_interpolates_between_table_points() {
        assert_relative_eq!(
            Eurocode3::detail_category(JointClass::K, false, 1.0).unwrap(),
            45.0
        );
        assert_relative_eq!(
            Eurocode3::detail_category(JointClass::K, false, 1.5).unwrap(),
            67.5
        );
        assert_relative_eq!(
            Eurocode3::detail_category(JointClass::K, false, 3.0).unwrap(),
            90.0
        );
        assert_relative_eq!(
            Eurocode3::detail_category(JointClass::K, true, 1.2).unwrap(),
            63.5,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            Eurocode3::detail_category(JointClass::N, true, 1.4).unwrap(),
            71.0
        );
    }

    #[test]
    fn thin_chords_are_outside_the_table() {
        assert!(Eurocode3::detail_category(JointClass::K, false, 0.9).is_err());
        assert!(Eurocode3::default().allowable_life(&query(50.0, f64::NAN)).is_err());
    }

    #[test]
    fn reference_stress_gives_two_million_cycles() {
        let life = Eurocode3::default().allowable_life(&query(45.0, 1.0)).unwrap();
        assert_relative_eq!(life, 2.0e6, max_relative = 1e-12);
    }

    #[test]
    fn partial_factor_shortens_life() {
        let plain = Eurocode3::default().allowable_life(&query(60.0, 1.5)).unwrap();
        let factored = Eurocode3::new(1.35).allowable_life(&query(60.0, 1.5)).unwrap();
        assert_relative_eq!(plain / factored, 1.35_f64.powi(5), max_relative = 1e-9);
    }

    #[test]
    fn small_ranges_never_fail() {
        let evaluator = Eurocode3::default();
        assert_eq!(evaluator.allowable_life(&query(1.0, 1.0)), Ok(f64::INFINITY));
        assert_eq!(evaluator.allowable_life(&query(0.0, 1.0)), Ok(f64::INFINITY));
    }

    #[test]
    fn only_eurocode_is_supported() {
        assert!(Eurocode3::for_code("Eurocode 3", 1.0).is_ok());
        assert!(Eurocode3::for_code(" eurocode 3 ", 1.0).is_ok());
        assert_eq!(
            Eurocode3::for_code("AISC 360", 1.0).unwrap_err(),
            DesignError::UnsupportedCode("AISC 360".to_owned())
        );
        assert!(matches!(
            Eurocode3::for_code(EUROCODE_3, 0.0),
            Err(DesignError::InvalidValue { .. })
        ));
    }
}
