//! Planar geometric types and tube cross-sections.

use std::f64::consts::PI;
use std::fmt;

use nalgebra::Vector2;

use crate::errors::{DesignError, DesignResult};

/// Position in the plane of the truss measured in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Distance along the global X axis (rightward).
    pub x: f64,
    /// Distance along the global Y axis (upward).
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Planar force in newtons.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Force {
    /// Component along the global X axis.
    pub x: f64,
    /// Component along the global Y axis.
    pub y: f64,
}

impl Force {
    /// Create a [`Force`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the force into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Magnitude of the force.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl From<Vector2<f64>> for Force {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use kjoint::point;
///
/// let origin = point(0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Convenience helper for creating [`Force`] instances.
///
/// # Examples
/// ```
/// use kjoint::force;
///
/// let load = force(0.0, -5.0);
/// assert_eq!(load.y, -5.0);
/// ```
#[must_use]
pub const fn force(x: f64, y: f64) -> Force {
    Force::new(x, y)
}

/// Section family of a truss member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberClass {
    /// Top or bottom longitudinal member.
    Chord,
    /// Vertical or diagonal member between the chords.
    Brace,
}

impl MemberClass {
    /// Parse a member type name such as `"chord"` or `"BRACE"`.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidMemberType`] for anything else.
    pub fn parse(name: &str) -> DesignResult<Self> {
        match name.to_ascii_uppercase().as_str() {
            "CHORD" => Ok(MemberClass::Chord),
            "BRACE" => Ok(MemberClass::Brace),
            other => Err(DesignError::InvalidMemberType(other.to_owned())),
        }
    }

    /// Upper-case name used to build parameter names (`DCHORD`, `TBRACE`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MemberClass::Chord => "CHORD",
            MemberClass::Brace => "BRACE",
        }
    }
}

impl fmt::Display for MemberClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Circular hollow section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TubeSection {
    /// Outer diameter in metres.
    pub outer_diameter: f64,
    /// Wall thickness in metres.
    pub wall_thickness: f64,
}

impl TubeSection {
    /// Create a section, checking `0 < t < D/2`.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidSection`] when the wall is not positive or
    /// fills the tube.
    pub fn new(class: MemberClass, outer_diameter: f64, wall_thickness: f64) -> DesignResult<Self> {
        if !(wall_thickness > 0.0 && wall_thickness < outer_diameter / 2.0) {
            return Err(DesignError::InvalidSection {
                member: class.name().to_owned(),
                outer_diameter,
                wall_thickness,
            });
        }
        Ok(Self {
            outer_diameter,
            wall_thickness,
        })
    }

    /// Annulus area `π·(r² − (r − t)²)` in square metres.
    #[must_use]
    pub fn area(&self) -> f64 {
        let r = self.outer_diameter / 2.0;
        let inner = r - self.wall_thickness;
        PI * (r.powi(2) - inner.powi(2))
    }
}
