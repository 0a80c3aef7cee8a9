//! Live-load forces calibrated from strain-gauge readings.
//!
//! The gauge sits on one brace. Its force per unit tip load (the influence
//! coefficient) comes from a method-of-joints solve, so the calibration follows
//! whichever member is gauged. For a diagonal the coefficient is `1/sin θ` with
//! `θ = atan(b/a)` measured from the horizontal.

use nalgebra::{DMatrix, Vector3};
use tracing::debug;

use crate::errors::{DesignError, DesignResult};
use crate::geometry::Force;
use crate::parameters::LoadCase;
use crate::statics::SupportReactions;
use crate::topology::{ModelMember, TrussModel};
use crate::truss::{JointLoads, Solution};

/// Influence coefficients below this magnitude mark a zero-force member.
const INFLUENCE_TOLERANCE: f64 = 1e-9;

/// Axial member forces for every load case.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberForces {
    /// Member labels in row order.
    labels: Vec<String>,
    /// Forces per member (rows) and load case (columns), tension positive.
    forces: DMatrix<f64>,
}

impl MemberForces {
    /// Member labels in row order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Forces of one member across the load cases.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<Vector3<f64>> {
        let row = self
            .labels
            .iter()
            .position(|name| name.eq_ignore_ascii_case(label))?;
        Some(Vector3::from_iterator(self.forces.row(row).iter().copied()))
    }

    /// Members × load cases matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.forces
    }
}

/// Support reactions and member forces under the live load.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicResponse {
    /// Reactions per load case.
    pub reactions: SupportReactions<Vector3<f64>>,
    /// Member forces per load case.
    pub member_forces: MemberForces,
}

/// Gauge force magnitude `|ε·E·A|` per load case.
#[must_use]
pub fn gauge_forces(strains: &Vector3<f64>, modulus: f64, area: f64) -> Vector3<f64> {
    strains.map(|strain| (strain * modulus * area).abs())
}

/// Force in `member` per unit downward load at the loaded joint.
///
/// # Errors
///
/// Returns [`DesignError::Analysis`] when the truss cannot be solved.
pub fn influence_coefficient(model: &TrussModel, member: &ModelMember) -> DesignResult<f64> {
    let unit = vec![(model.load_joint(), Force::new(0.0, -1.0))];
    let solution = model.truss().evaluate(&[unit])?;
    Ok(solution.member_force(member.index, 0).unwrap_or(0.0))
}

/// Peak live load over both half-trusses, per load case.
///
/// The live load acts downward, so every value is negative or zero.
///
/// # Errors
///
/// Returns [`DesignError::InsensitiveGauge`] when the gauged member carries no
/// force under the live load.
pub fn peak_forces(
    model: &TrussModel,
    gauge: &ModelMember,
    gauge_forces: &Vector3<f64>,
) -> DesignResult<Vector3<f64>> {
    let influence = influence_coefficient(model, gauge)?;
    if influence.abs() < INFLUENCE_TOLERANCE {
        return Err(DesignError::InsensitiveGauge(gauge.label.clone()));
    }
    debug!(gauge = %gauge.label, influence, "calibrated strain gauge");
    Ok(gauge_forces.map(|force| -2.0 * force.abs() / influence.abs()))
}

/// Joint loads for each case: half of the peak load at the loaded joint.
#[must_use]
pub fn live_loads(model: &TrussModel, peak_forces: &Vector3<f64>) -> Vec<JointLoads> {
    LoadCase::ALL
        .iter()
        .map(|case| {
            let half = 0.5 * peak_forces[case.index()];
            vec![(model.load_joint(), Force::new(0.0, half))]
        })
        .collect()
}

/// Solve the half-truss under the live load of every case.
///
/// # Errors
///
/// Returns [`DesignError::Analysis`] when the truss cannot be solved.
pub fn solve_live_load(
    model: &TrussModel,
    peak_forces: &Vector3<f64>,
) -> DesignResult<DynamicResponse> {
    let loads = live_loads(model, peak_forces);
    let solution = model.truss().evaluate(&loads)?;
    Ok(DynamicResponse {
        reactions: reactions(model, &solution),
        member_forces: member_forces(model, &solution),
    })
}

/// Collect per-case reactions at both supports.
fn reactions(model: &TrussModel, solution: &Solution) -> SupportReactions<Vector3<f64>> {
    let per_case = |joint, pick: fn(Force) -> f64| {
        Vector3::from_fn(|case, _| pick(solution.reaction(joint, case)))
    };
    SupportReactions {
        ax: per_case(model.pinned_support(), |force| force.x),
        ay: per_case(model.pinned_support(), |force| force.y),
        bx: per_case(model.roller_support(), |force| force.x),
        by: per_case(model.roller_support(), |force| force.y),
    }
}

/// Collect per-case member forces in table order.
fn member_forces(model: &TrussModel, solution: &Solution) -> MemberForces {
    let members = model.members();
    let forces = DMatrix::from_fn(members.len(), solution.case_count(), |row, case| {
        solution
            .member_force(members[row].index, case)
            .unwrap_or(0.0)
    });
    MemberForces {
        labels: members.iter().map(|member| member.label.clone()).collect(),
        forces,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::topology::K_TRUSS;

    const A: f64 = 1.2;
    const B: f64 = 2.0;

    fn model() -> TrussModel {
        K_TRUSS.build(A, B).unwrap()
    }

    #[test]
    fn diagonal_influence_is_cosecant_of_brace_angle() {
        let model = model();
        let theta = (B / A).atan();
        let de = model.member("DE").unwrap().clone();
        // A downward tip load puts DE in compression.
        assert_relative_eq!(
            influence_coefficient(&model, &de).unwrap(),
            -1.0 / theta.sin(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn peak_forces_are_negative_and_scale_with_gauge_force() {
        let model = model();
        let de = model.member("DE").unwrap().clone();
        let theta = (B / A).atan();
        let gauge = Vector3::new(100.0, 200.0, 400.0);
        let peaks = peak_forces(&model, &de, &gauge).unwrap();
        for case in 0..3 {
            assert!(peaks[case] < 0.0);
            assert_relative_eq!(peaks[case], -2.0 * gauge[case] * theta.sin(), max_relative = 1e-9);
        }
    }

    #[test]
    fn zero_force_gauge_is_rejected() {
        let model = model();
        let fh = model.member("FH").unwrap().clone();
        assert_eq!(
            peak_forces(&model, &fh, &Vector3::repeat(1.0)).unwrap_err(),
            DesignError::InsensitiveGauge("FH".to_owned())
        );
    }

    #[test]
    fn member_forces_match_joint_by_joint_hand_solution() {
        let model = model();
        let peaks = Vector3::new(-2000.0, -4000.0, -6000.0);
        let response = solve_live_load(&model, &peaks).unwrap();
        let theta = (B / A).atan();
        let cot = A / B;

        for case in 0..3 {
            let half = 0.5 * peaks[case];
            let force = |label: &str| response.member_forces.get(label).unwrap()[case];

            assert_relative_eq!(response.reactions.ax[case], 5.0 * cot * half, max_relative = 1e-9);
            assert_relative_eq!(response.reactions.ay[case], -half, max_relative = 1e-9);
            assert_relative_eq!(response.reactions.bx[case], -5.0 * cot * half, max_relative = 1e-9);
            assert_eq!(response.reactions.by[case], 0.0);

            assert_relative_eq!(force("AB"), -half, max_relative = 1e-9);
            assert_relative_eq!(force("BC"), half / theta.sin(), max_relative = 1e-9);
            assert_relative_eq!(force("CD"), -half / theta.sin(), max_relative = 1e-9);
            assert_relative_eq!(force("DE"), half / theta.sin(), max_relative = 1e-9);
            assert_relative_eq!(force("EF"), -half / theta.sin(), max_relative = 1e-9);
            assert_relative_eq!(force("FG"), half / theta.sin(), max_relative = 1e-9);
            assert_relative_eq!(force("GH"), -half, max_relative = 1e-9);
            assert_relative_eq!(force("AC"), -5.0 * cot * half, max_relative = 1e-9);
            assert_relative_eq!(force("CE"), -3.0 * cot * half, max_relative = 1e-9);
            assert_relative_eq!(force("EG"), -cot * half, max_relative = 1e-9);
            assert_relative_eq!(force("BD"), 4.0 * cot * half, max_relative = 1e-9);
            assert_relative_eq!(force("DF"), 2.0 * cot * half, max_relative = 1e-9);
            assert_relative_eq!(force("FH"), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn member_force_table_keeps_layout_order() {
        let model = model();
        let response = solve_live_load(&model, &Vector3::repeat(-1000.0)).unwrap();
        assert_eq!(response.member_forces.labels().len(), 13);
        assert_eq!(response.member_forces.labels()[0], "AC");
        assert_eq!(response.member_forces.matrix().shape(), (13, 3));
        assert!(response.member_forces.get("XY").is_none());
    }
}
