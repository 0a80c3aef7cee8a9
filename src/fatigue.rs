//! Hot-spot stresses at the K-joint and the fatigue life they allow.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix4x3, Vector3, Vector4};
use tracing::{debug, warn};

use crate::code_rules::{CodeRuleEvaluator, FatigueQuery, JointClass};
use crate::dynamics::MemberForces;
use crate::errors::{DesignError, DesignResult};
use crate::geometry::MemberClass;
use crate::parameters::LoadCase;
use crate::topology::ModelMember;
use crate::units::pascals_to_megapascals;

/// Stress concentration factor of a chord at the joint.
pub const CHORD_SCF: f64 = 1.5;
/// Stress concentration factor of a brace at the joint.
pub const BRACE_SCF: f64 = 1.2;

/// Brace arrangement of the K-joint, read from `JOINTTYPE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JointLayout {
    /// Braces meet the chord apart from each other.
    Gap,
    /// One brace is welded onto the other.
    Overlap,
}

impl JointLayout {
    /// `true` for [`JointLayout::Overlap`].
    #[must_use]
    pub const fn is_overlap(self) -> bool {
        matches!(self, JointLayout::Overlap)
    }
}

impl FromStr for JointLayout {
    type Err = DesignError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gap" => Ok(JointLayout::Gap),
            "overlap" => Ok(JointLayout::Overlap),
            other => Err(DesignError::InvalidValue {
                name: "JOINTTYPE".to_owned(),
                reason: format!("expected 'gap' or 'overlap', got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for JointLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointLayout::Gap => f.write_str("gap"),
            JointLayout::Overlap => f.write_str("overlap"),
        }
    }
}

/// Service life of the joint.
#[derive(Clone, Debug, PartialEq)]
pub struct FatigueLife {
    /// Life of the weakest role, hours.
    pub hours: f64,
    /// Life of every role in role order, hours.
    pub role_hours: Vector4<f64>,
    /// Label of the member that limits the life.
    pub governing: String,
}

/// SCF per role: chords 1.5, braces 1.2.
#[must_use]
pub fn k_stress_magnification(roles: &[ModelMember; 4]) -> Vector4<f64> {
    Vector4::from_fn(|row, _| match roles[row].class {
        MemberClass::Chord => CHORD_SCF,
        MemberClass::Brace => BRACE_SCF,
    })
}

/// `|force / area|` for each role and load case, pascals.
///
/// # Errors
///
/// Returns [`DesignError::UnknownMember`] when a role has no force entry.
pub fn nominal_stress(
    roles: &[ModelMember; 4],
    forces: &MemberForces,
    chord_area: f64,
    brace_area: f64,
) -> DesignResult<Matrix4x3<f64>> {
    let mut stress = Matrix4x3::zeros();
    for (row, member) in roles.iter().enumerate() {
        let area = match member.class {
            MemberClass::Chord => chord_area,
            MemberClass::Brace => brace_area,
        };
        let force = forces
            .get(&member.label)
            .ok_or_else(|| DesignError::UnknownMember(member.label.clone()))?;
        stress.set_row(row, &(force / area).abs().transpose());
    }
    Ok(stress)
}

/// Nominal stress with each row scaled by its SCF.
#[must_use]
pub fn adjusted_stress(nominal: &Matrix4x3<f64>, scf: &Vector4<f64>) -> Matrix4x3<f64> {
    let mut adjusted = *nominal;
    for (mut row, factor) in adjusted.row_iter_mut().zip(scf.iter()) {
        row *= *factor;
    }
    adjusted
}

/// Integrate the cycle mix of every load case into a life in hours.
///
/// `adjusted` holds hot-spot stress ranges in pascals; the evaluator sees
/// megapascals. A role's life is `1 / Σ (n_case / N_case)`; the joint lives
/// as long as its weakest role.
///
/// # Errors
///
/// Returns [`DesignError::Evaluator`] when the evaluator rejects a query and
/// [`DesignError::NonPositiveLife`] when it returns zero, a negative number or NaN.
pub fn fatigue_life<E: CodeRuleEvaluator + ?Sized>(
    evaluator: &E,
    roles: &[ModelMember; 4],
    adjusted: &Matrix4x3<f64>,
    thickness_ratio: f64,
    layout: JointLayout,
    cycles_per_hour: &Vector3<f64>,
) -> DesignResult<FatigueLife> {
    let mut role_hours = Vector4::zeros();
    for (row, member) in roles.iter().enumerate() {
        let mut damage_rate = 0.0;
        for case in LoadCase::ALL {
            let query = FatigueQuery {
                stress_range: pascals_to_megapascals(adjusted[(row, case.index())]),
                thickness_ratio,
                joint_class: JointClass::K,
                overlap: layout.is_overlap(),
            };
            let allowable = evaluator
                .allowable_life(&query)
                .map_err(DesignError::Evaluator)?;
            if allowable.is_nan() || allowable <= 0.0 {
                return Err(DesignError::NonPositiveLife {
                    role: member.label.clone(),
                    case,
                    value: allowable,
                });
            }
            damage_rate += cycles_per_hour[case.index()] / allowable;
        }
        role_hours[row] = damage_rate.recip();
        debug!(member = %member.label, hours = role_hours[row], "role fatigue life");
    }

    let governing = role_hours.imin();
    let hours = role_hours[governing];
    if hours.is_infinite() {
        warn!("every stress range is below the cut-off limit; fatigue life is unbounded");
    }
    Ok(FatigueLife {
        hours,
        role_hours,
        governing: roles[governing].label.clone(),
    })
}
