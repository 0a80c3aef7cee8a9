//! Unit tags carried by stored quantities and the narrow conversions the
//! designer relies on.
//!
//! Each conversion accepts exactly one source unit. A quantity tagged with
//! anything else is rejected instead of being passed through unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use uom::si::f64::{Length, Pressure, Ratio};
use uom::si::length::{meter, millimeter};
use uom::si::pressure::{megapascal, pascal};
use uom::si::ratio::{part_per_million, ratio};

use crate::errors::{DesignError, DesignResult};

/// Unit tag attached to every stored quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Millimetres.
    #[serde(rename = "mm")]
    Millimeter,
    /// Megapascals.
    #[serde(rename = "MPa")]
    Megapascal,
    /// Kilograms per cubic metre.
    #[serde(rename = "kg/m3")]
    KilogramPerCubicMeter,
    /// Metres per second squared.
    #[serde(rename = "m/s2")]
    MeterPerSecondSquared,
    /// Dimensionless.
    #[serde(rename = "ul")]
    Unitless,
    /// Dimensionless, scaled by 10⁻⁶ (micro-strain).
    #[serde(rename = "uul")]
    MicroUnitless,
    /// Text or identifier with no physical unit.
    #[serde(rename = "na")]
    NotApplicable,
}

impl Unit {
    /// Tag used in stored data.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Megapascal => "MPa",
            Unit::KilogramPerCubicMeter => "kg/m3",
            Unit::MeterPerSecondSquared => "m/s2",
            Unit::Unitless => "ul",
            Unit::MicroUnitless => "uul",
            Unit::NotApplicable => "na",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named scalar with its unit tag, as handed to a conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity<'a> {
    /// Name of the quantity in the parameter store.
    pub name: &'a str,
    /// Unit tag carried by the value.
    pub unit: Unit,
    /// Raw value in `unit`.
    pub value: f64,
}

impl<'a> Quantity<'a> {
    /// Create a [`Quantity`].
    #[must_use]
    pub const fn new(name: &'a str, unit: Unit, value: f64) -> Self {
        Self { name, unit, value }
    }

    fn require(self, unit: Unit) -> DesignResult<f64> {
        if self.unit == unit {
            Ok(self.value)
        } else {
            Err(DesignError::UnsupportedUnit {
                name: self.name.to_owned(),
                unit: self.unit,
            })
        }
    }
}

/// Convert a length tagged `mm` to metres.
///
/// # Errors
///
/// Returns [`DesignError::UnsupportedUnit`] for any other unit tag.
///
/// # Examples
/// ```
/// use kjoint::units::{to_meters, Quantity, Unit};
///
/// let span = to_meters(Quantity::new("A", Unit::Millimeter, 1200.0)).unwrap();
/// assert!((span - 1.2).abs() < 1e-12);
/// assert!(to_meters(Quantity::new("GRAV", Unit::MeterPerSecondSquared, 9.81)).is_err());
/// ```
pub fn to_meters(quantity: Quantity<'_>) -> DesignResult<f64> {
    let value = quantity.require(Unit::Millimeter)?;
    Ok(Length::new::<millimeter>(value).get::<meter>())
}

/// Convert a stress or modulus tagged `MPa` to pascals.
///
/// # Errors
///
/// Returns [`DesignError::UnsupportedUnit`] for any other unit tag.
pub fn to_pascals(quantity: Quantity<'_>) -> DesignResult<f64> {
    let value = quantity.require(Unit::Megapascal)?;
    Ok(Pressure::new::<megapascal>(value).get::<pascal>())
}

/// Convert a micro-strain reading tagged `uul` to a plain ratio.
///
/// # Errors
///
/// Returns [`DesignError::UnsupportedUnit`] for any other unit tag.
pub fn to_ratio(quantity: Quantity<'_>) -> DesignResult<f64> {
    let value = quantity.require(Unit::MicroUnitless)?;
    Ok(Ratio::new::<part_per_million>(value).get::<ratio>())
}

/// Express a stress in pascals as megapascals.
#[must_use]
pub fn pascals_to_megapascals(value: f64) -> f64 {
    Pressure::new::<pascal>(value).get::<megapascal>()
}

/// Express a length in metres as millimetres.
#[must_use]
pub fn meters_to_millimeters(value: f64) -> f64 {
    Length::new::<meter>(value).get::<millimeter>()
}
