//! Clevis-pin sizing at the supports.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::geometry::Force;
use crate::statics::SupportReactions;

/// Pin diameters at both supports, metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinDiameters {
    /// Pin at the pinned support `A`.
    pub a: f64,
    /// Pin at the roller support `B`.
    pub b: f64,
}

/// Diameter of a pin carrying `load` newtons across one shear plane.
///
/// Solves `F / (πd²/4) = 0.5·yield / safety_factor`.
#[must_use]
pub fn pin_diameter(load: f64, safety_factor: f64, yield_stress: f64) -> f64 {
    (4.0 * load.abs() * safety_factor / (0.5 * PI * yield_stress)).sqrt()
}

/// Largest combined reaction of one support over the load cases.
fn governing_load(
    static_x: f64,
    static_y: f64,
    dynamic_x: &Vector3<f64>,
    dynamic_y: &Vector3<f64>,
) -> f64 {
    dynamic_x
        .iter()
        .zip(dynamic_y.iter())
        .map(|(x, y)| Force::new(static_x + x, static_y + y).norm())
        .fold(0.0, f64::max)
}

/// Size both support pins for the worst static plus dynamic reaction.
#[must_use]
pub fn pin_diameters(
    static_reactions: &SupportReactions<f64>,
    dynamic_reactions: &SupportReactions<Vector3<f64>>,
    safety_factor: f64,
    yield_stress: f64,
) -> PinDiameters {
    let load_a = governing_load(
        static_reactions.ax,
        static_reactions.ay,
        &dynamic_reactions.ax,
        &dynamic_reactions.ay,
    );
    let load_b = governing_load(
        static_reactions.bx,
        static_reactions.by,
        &dynamic_reactions.bx,
        &dynamic_reactions.by,
    );
    PinDiameters {
        a: pin_diameter(load_a, safety_factor, yield_stress),
        b: pin_diameter(load_b, safety_factor, yield_stress),
    }
}
