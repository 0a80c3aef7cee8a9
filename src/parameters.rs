//! Named engineering quantities consumed by the designer and the stores that
//! supply them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};
use crate::units::{to_meters, to_pascals, to_ratio, Quantity, Unit};

/// Names every parameter set has to provide.
pub const REQUIRED_QUANTITIES: [&str; 19] = [
    "A",
    "B",
    "DCHORD",
    "TCHORD",
    "DBRACE",
    "TBRACE",
    "JOINT",
    "JOINTTYPE",
    "SG",
    "PEAKSTRAIN",
    "NPERHOUR",
    "GRAV",
    "MODULUS",
    "DENSITY",
    "POISSON",
    "CHSYIELD",
    "PINYIELD",
    "STATICFOS",
    "CODE",
];

/// One of the three independent live-load spectra.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadCase {
    /// First spectrum.
    P,
    /// Second spectrum.
    Q,
    /// Third spectrum.
    R,
}

impl LoadCase {
    /// All load cases in storage order.
    pub const ALL: [LoadCase; 3] = [LoadCase::P, LoadCase::Q, LoadCase::R];

    /// Position of the case in every per-case vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            LoadCase::P => 0,
            LoadCase::Q => 1,
            LoadCase::R => 2,
        }
    }
}

impl fmt::Display for LoadCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadCase::P => "P",
            LoadCase::Q => "Q",
            LoadCase::R => "R",
        };
        f.write_str(label)
    }
}

/// Values indexed by load case.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadCases {
    /// Value for case P.
    #[serde(rename = "P")]
    pub p: f64,
    /// Value for case Q.
    #[serde(rename = "Q")]
    pub q: f64,
    /// Value for case R.
    #[serde(rename = "R")]
    pub r: f64,
}

impl LoadCases {
    /// Create a [`LoadCases`] from the three case values.
    #[must_use]
    pub const fn new(p: f64, q: f64, r: f64) -> Self {
        Self { p, q, r }
    }

    /// Value for one case.
    #[must_use]
    pub const fn get(&self, case: LoadCase) -> f64 {
        match case {
            LoadCase::P => self.p,
            LoadCase::Q => self.q,
            LoadCase::R => self.r,
        }
    }

    /// Per-case vector in `P, Q, R` order.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.p, self.q, self.r)
    }
}

/// A stored quantity: a unit tag plus a scalar, per-case or text value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    /// Single number.
    Scalar {
        /// Unit tag.
        unit: Unit,
        /// Value in `unit`.
        value: f64,
    },
    /// One number per load case.
    LoadCases {
        /// Unit tag.
        unit: Unit,
        /// Values in `unit`.
        value: LoadCases,
    },
    /// Identifier or free text.
    Text {
        /// Unit tag, normally `na`.
        unit: Unit,
        /// Text value.
        value: String,
    },
}

impl Parameter {
    /// Shorthand for [`Parameter::Scalar`].
    #[must_use]
    pub const fn scalar(unit: Unit, value: f64) -> Self {
        Parameter::Scalar { unit, value }
    }

    /// Shorthand for [`Parameter::LoadCases`].
    #[must_use]
    pub const fn load_cases(unit: Unit, p: f64, q: f64, r: f64) -> Self {
        Parameter::LoadCases {
            unit,
            value: LoadCases::new(p, q, r),
        }
    }

    /// Shorthand for [`Parameter::Text`] with unit `na`.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Parameter::Text {
            unit: Unit::NotApplicable,
            value: value.into(),
        }
    }

    /// Unit tag of the parameter.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        match self {
            Parameter::Scalar { unit, .. }
            | Parameter::LoadCases { unit, .. }
            | Parameter::Text { unit, .. } => *unit,
        }
    }
}

/// A complete, validated set of design quantities.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    /// Quantities by name.
    values: BTreeMap<String, Parameter>,
}

impl ParameterSet {
    /// Validate that every required quantity is present.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::MissingQuantity`] naming the first absent quantity in
    /// [`REQUIRED_QUANTITIES`] order.
    pub fn new(values: BTreeMap<String, Parameter>) -> DesignResult<Self> {
        if let Some(missing) = REQUIRED_QUANTITIES
            .iter()
            .find(|name| !values.contains_key(**name))
        {
            return Err(DesignError::MissingQuantity((*missing).to_owned()));
        }
        Ok(Self { values })
    }

    /// Reference data set for a 1200 mm × 2000 mm panel K-truss.
    #[must_use]
    pub fn example() -> Self {
        let values = [
            ("A", Parameter::scalar(Unit::Millimeter, 1200.0)),
            ("B", Parameter::scalar(Unit::Millimeter, 2000.0)),
            ("DCHORD", Parameter::scalar(Unit::Millimeter, 139.7)),
            ("TCHORD", Parameter::scalar(Unit::Millimeter, 5.4)),
            ("DBRACE", Parameter::scalar(Unit::Millimeter, 60.3)),
            ("TBRACE", Parameter::scalar(Unit::Millimeter, 3.6)),
            ("JOINT", Parameter::text("D")),
            ("JOINTTYPE", Parameter::text("overlap")),
            ("SG", Parameter::text("DE")),
            (
                "PEAKSTRAIN",
                Parameter::load_cases(Unit::MicroUnitless, 145.0, 195.0, 590.0),
            ),
            (
                "NPERHOUR",
                Parameter::load_cases(Unit::Unitless, 200.0, 420.0, 120.0),
            ),
            ("GRAV", Parameter::scalar(Unit::MeterPerSecondSquared, 9.81)),
            ("MODULUS", Parameter::scalar(Unit::Megapascal, 207_000.0)),
            (
                "DENSITY",
                Parameter::scalar(Unit::KilogramPerCubicMeter, 7850.0),
            ),
            ("POISSON", Parameter::scalar(Unit::Unitless, 0.3)),
            ("CHSYIELD", Parameter::scalar(Unit::Megapascal, 350.0)),
            ("PINYIELD", Parameter::scalar(Unit::Megapascal, 350.0)),
            ("STATICFOS", Parameter::scalar(Unit::Unitless, 1.5)),
            ("CODE", Parameter::text("Eurocode 3")),
        ]
        .into_iter()
        .map(|(name, parameter)| (name.to_owned(), parameter))
        .collect();
        Self { values }
    }

    /// Return a copy with one quantity replaced or added.
    #[must_use]
    pub fn with(mut self, name: &str, parameter: Parameter) -> Self {
        self.values.insert(name.to_owned(), parameter);
        self
    }

    /// Look up a quantity by name.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::MissingQuantity`] when `name` is absent.
    pub fn get(&self, name: &str) -> DesignResult<&Parameter> {
        self.values
            .get(name)
            .ok_or_else(|| DesignError::MissingQuantity(name.to_owned()))
    }

    /// Borrow a scalar quantity for conversion.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::WrongKind`] when the quantity is not a scalar.
    pub fn quantity<'a>(&self, name: &'a str) -> DesignResult<Quantity<'a>> {
        match self.get(name)? {
            Parameter::Scalar { unit, value } => Ok(Quantity::new(name, *unit, *value)),
            _ => Err(DesignError::WrongKind {
                name: name.to_owned(),
                expected: "scalar",
            }),
        }
    }

    /// Read a scalar that must carry `unit`, without conversion.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::UnitMismatch`] when the stored unit differs.
    pub fn scalar(&self, name: &str, unit: Unit) -> DesignResult<f64> {
        let quantity = self.quantity(name)?;
        if quantity.unit != unit {
            return Err(DesignError::UnitMismatch {
                name: name.to_owned(),
                expected: unit,
                found: quantity.unit,
            });
        }
        Ok(quantity.value)
    }

    /// Read a length and convert it to metres.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::UnsupportedUnit`] when the length is not in millimetres.
    pub fn meters(&self, name: &str) -> DesignResult<f64> {
        to_meters(self.quantity(name)?)
    }

    /// Read a stress or modulus and convert it to pascals.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::UnsupportedUnit`] when the value is not in megapascals.
    pub fn pascals(&self, name: &str) -> DesignResult<f64> {
        to_pascals(self.quantity(name)?)
    }

    /// Read per-case values that must carry `unit`, without conversion.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::WrongKind`] for non per-case quantities and
    /// [`DesignError::UnitMismatch`] when the stored unit differs.
    pub fn load_cases(&self, name: &str, unit: Unit) -> DesignResult<LoadCases> {
        match self.get(name)? {
            Parameter::LoadCases { unit: found, value } if *found == unit => Ok(*value),
            Parameter::LoadCases { unit: found, .. } => Err(DesignError::UnitMismatch {
                name: name.to_owned(),
                expected: unit,
                found: *found,
            }),
            _ => Err(DesignError::WrongKind {
                name: name.to_owned(),
                expected: "per-load-case",
            }),
        }
    }

    /// Read per-case micro-strain values as plain ratios.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::WrongKind`] for non per-case quantities and
    /// [`DesignError::UnsupportedUnit`] when the values are not tagged `uul`.
    pub fn strains(&self, name: &str) -> DesignResult<Vector3<f64>> {
        let (unit, values) = match self.get(name)? {
            Parameter::LoadCases { unit, value } => (*unit, *value),
            _ => {
                return Err(DesignError::WrongKind {
                    name: name.to_owned(),
                    expected: "per-load-case",
                })
            }
        };
        let mut strains = Vector3::zeros();
        for case in LoadCase::ALL {
            strains[case.index()] = to_ratio(Quantity::new(name, unit, values.get(case)))?;
        }
        Ok(strains)
    }

    /// Read a text quantity.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::WrongKind`] when the quantity is not text.
    pub fn text(&self, name: &str) -> DesignResult<&str> {
        match self.get(name)? {
            Parameter::Text { value, .. } => Ok(value.as_str()),
            _ => Err(DesignError::WrongKind {
                name: name.to_owned(),
                expected: "text",
            }),
        }
    }
}

/// Source of design quantities.
pub trait ParameterStore {
    /// Read and validate the parameter set identified by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Source`] when the source cannot be read and
    /// [`DesignError::MissingQuantity`] when a required quantity is absent.
    fn read(&self, source: &str) -> DesignResult<ParameterSet>;
}

/// Store that reads a JSON object of named quantities from a file.
///
/// ```json
/// { "A": { "unit": "mm", "value": 1200 },
///   "PEAKSTRAIN": { "unit": "uul", "value": { "P": 145, "Q": 195, "R": 590 } },
///   "JOINT": { "unit": "na", "value": "D" } }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonParameterStore;

impl JsonParameterStore {
    /// Parse a parameter set from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Source`] for malformed JSON and
    /// [`DesignError::MissingQuantity`] when a required quantity is absent.
    pub fn parse(source_name: &str, text: &str) -> DesignResult<ParameterSet> {
        let values: BTreeMap<String, Parameter> =
            serde_json::from_str(text).map_err(|error| DesignError::Source {
                source_name: source_name.to_owned(),
                reason: error.to_string(),
            })?;
        ParameterSet::new(values)
    }
}

impl ParameterStore for JsonParameterStore {
    fn read(&self, source: &str) -> DesignResult<ParameterSet> {
        let text = std::fs::read_to_string(Path::new(source)).map_err(|error| {
            DesignError::Source {
                source_name: source.to_owned(),
                reason: error.to_string(),
            }
        })?;
        Self::parse(source, &text)
    }
}

/// Store holding parameter sets in memory under source names.
#[derive(Clone, Debug, Default)]
pub struct MemoryParameterStore {
    /// Parameter sets by source name.
    sets: BTreeMap<String, ParameterSet>,
}

impl MemoryParameterStore {
    /// Store containing the reference data set under the name `example`.
    #[must_use]
    pub fn with_example() -> Self {
        let mut store = Self::default();
        store.insert("example", ParameterSet::example());
        store
    }

    /// Register a parameter set under `source`.
    pub fn insert(&mut self, source: &str, parameters: ParameterSet) {
        self.sets.insert(source.to_owned(), parameters);
    }
}

impl ParameterStore for MemoryParameterStore {
    fn read(&self, source: &str) -> DesignResult<ParameterSet> {
        self.sets
            .get(source)
            .cloned()
            .ok_or_else(|| DesignError::Source {
                source_name: source.to_owned(),
                reason: "no such parameter set".to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn missing_quantity_is_reported_by_name() {
        let mut values = BTreeMap::new();
        values.insert("A".to_owned(), Parameter::scalar(Unit::Millimeter, 1200.0));
        let error = ParameterSet::new(values).expect_err("incomplete set rejected");
        assert_eq!(error, DesignError::MissingQuantity("B".to_owned()));
    }

    #[test]
    fn parses_every_parameter_kind_from_json() {
        let mut document = serde_json::Map::new();
        for name in REQUIRED_QUANTITIES {
            document.insert(
                name.to_owned(),
                serde_json::json!({ "unit": "ul", "value": 1.0 }),
            );
        }
        document.insert(
            "PEAKSTRAIN".to_owned(),
            serde_json::json!({ "unit": "uul", "value": { "P": 145, "Q": 195, "R": 590 } }),
        );
        document.insert(
            "JOINT".to_owned(),
            serde_json::json!({ "unit": "na", "value": "D" }),
        );
        let text = serde_json::Value::Object(document).to_string();

        let parameters = JsonParameterStore::parse("inline", &text).expect("valid document");
        assert_eq!(parameters.text("JOINT").unwrap(), "D");
        assert_eq!(
            parameters.load_cases("PEAKSTRAIN", Unit::MicroUnitless).unwrap(),
            LoadCases::new(145.0, 195.0, 590.0)
        );
        assert_relative_eq!(parameters.scalar("POISSON", Unit::Unitless).unwrap(), 1.0);
    }

    #[test]
    fn malformed_json_is_a_source_error() {
        let error = JsonParameterStore::parse("broken.json", "{ not json").unwrap_err();
        assert!(matches!(error, DesignError::Source { source_name, .. } if source_name == "broken.json"));
    }

    #[test]
    fn accessors_check_kind_and_unit() {
        let parameters = ParameterSet::example();
        assert_eq!(
            parameters.scalar("GRAV", Unit::Megapascal).unwrap_err(),
            DesignError::UnitMismatch {
                name: "GRAV".to_owned(),
                expected: Unit::Megapascal,
                found: Unit::MeterPerSecondSquared,
            }
        );
        assert_eq!(
            parameters.text("A").unwrap_err(),
            DesignError::WrongKind {
                name: "A".to_owned(),
                expected: "text",
            }
        );
        assert!(matches!(
            parameters.meters("JOINT"),
            Err(DesignError::WrongKind { .. })
        ));
        assert!(matches!(
            parameters.strains("NPERHOUR"),
            Err(DesignError::UnsupportedUnit { .. })
        ));
        assert_relative_eq!(parameters.meters("B").unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn memory_store_serves_the_example_set() {
        let store = MemoryParameterStore::with_example();
        let parameters = store.read("example").expect("example registered");
        assert_eq!(parameters.text("CODE").unwrap(), "Eurocode 3");
        assert!(matches!(
            store.read("missing"),
            Err(DesignError::Source { .. })
        ));
    }
}
