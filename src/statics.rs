//! Self-weight of the truss and the support reactions it produces.

use crate::errors::{AnalysisError, DesignResult};
use crate::geometry::{Force, Point};
use crate::topology::TrussModel;

/// Reactions at the pinned support `A` and the roller support `B`.
///
/// `T` is `f64` for a single load and a per-case vector for the live load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportReactions<T> {
    /// Horizontal reaction at `A`.
    pub ax: T,
    /// Vertical reaction at `A`.
    pub ay: T,
    /// Horizontal reaction at `B`.
    pub bx: T,
    /// Vertical reaction at `B`; zero because `B` is a roller.
    pub by: T,
}

impl<T: Copy> SupportReactions<T> {
    /// Components in `[A_x, A_y, B_x, B_y]` order.
    #[must_use]
    pub fn to_array(&self) -> [T; 4] {
        [self.ax, self.ay, self.bx, self.by]
    }
}

/// Self-weight summary of the truss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticLoad {
    /// Point where the half-truss weight acts, metres.
    pub centroid: Point,
    /// Mass of the whole truss, kilograms.
    pub mass: f64,
    /// Reactions holding one half-truss against its weight, newtons.
    pub reactions: SupportReactions<f64>,
}

impl StaticLoad {
    /// `[centroid_x, centroid_y, mass, A_x, A_y, B_x, B_y]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 7] {
        let [ax, ay, bx, by] = self.reactions.to_array();
        [
            self.centroid.x,
            self.centroid.y,
            self.mass,
            ax,
            ay,
            bx,
            by,
        ]
    }
}

/// Total chord length of the full truss for panel width `a`, metres.
#[must_use]
pub fn chord_length(a: f64) -> f64 {
    20.0 * a
}

/// Total brace length of the full truss for panel width `a` and height `b`, metres.
///
/// Twelve verticals and ten diagonals.
#[must_use]
pub fn brace_length(a: f64, b: f64) -> f64 {
    12.0 * b + 10.0 * a.hypot(b)
}

/// Mass of the full truss in kilograms.
#[must_use]
pub fn truss_mass(a: f64, b: f64, chord_area: f64, brace_area: f64, density: f64) -> f64 {
    density * (chord_length(a) * chord_area + brace_length(a, b) * brace_area)
}

/// Resolve the self-weight of one half-truss into support reactions.
///
/// Half of `mass` hangs on each half-truss, acting downward at the model centroid.
///
/// # Errors
///
/// Returns [`crate::DesignError::Analysis`] when the supports cannot hold the truss.
pub fn gravity_load(model: &TrussModel, mass: f64, gravity: f64) -> DesignResult<StaticLoad> {
    let centroid = model.centroid();
    let half_weight = 0.5 * mass * gravity;
    let reactions = model
        .truss()
        .rigid_body_reactions(centroid, Force::new(0.0, -half_weight))?;
    let at = |joint| {
        reactions
            .iter()
            .find(|(node, _)| *node == joint)
            .map(|(_, reaction)| *reaction)
            .ok_or(AnalysisError::UnknownJoint(joint))
    };
    let a = at(model.pinned_support())?;
    let b = at(model.roller_support())?;

    Ok(StaticLoad {
        centroid,
        mass,
        reactions: SupportReactions {
            ax: a.x,
            ay: a.y,
            bx: b.x,
            by: b.y,
        },
    })
}
