//! Error types produced while solving the truss or running the designer.

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::parameters::LoadCase;
use crate::units::Unit;

/// Result alias used throughout the designer engine.
pub type DesignResult<T> = Result<T, DesignError>;

/// Error returned when a truss equilibrium solve fails.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when a load references a joint that is not part of the truss.
    #[error("joint {0:?} does not exist in this truss")]
    UnknownJoint(NodeIndex),
    /// Returned when a member spans zero distance.
    #[error("member {0:?} has zero length")]
    ZeroLengthMember(EdgeIndex),
    /// Returned when there are more unknown forces than equilibrium equations.
    #[error("truss is statically indeterminate ({unknowns} unknowns, {equations} equations)")]
    StaticallyIndeterminate {
        /// Number of joint equilibrium equations.
        equations: usize,
        /// Number of member forces plus restrained support components.
        unknowns: usize,
    },
    /// Returned when there are fewer unknown forces than equilibrium equations.
    #[error("truss is a mechanism ({unknowns} unknowns, {equations} equations)")]
    Mechanism {
        /// Number of joint equilibrium equations.
        equations: usize,
        /// Number of member forces plus restrained support components.
        unknowns: usize,
    },
    /// Returned when the equilibrium matrix cannot be inverted.
    #[error("equilibrium matrix is singular; check supports and connectivity")]
    UnstableGeometry,
    /// Returned when rigid-body reactions are requested for a support set that does
    /// not restrain exactly three planar degrees of freedom.
    #[error("supports restrain {0} degrees of freedom; rigid-body reactions need exactly 3")]
    UnsupportedSupports(usize),
}

/// Error returned by the designer engine and its collaborators.
///
/// All variants are fatal: a failure means the input set or the sheet layout has
/// to be corrected, so nothing is retried and nothing is partially exported.
#[derive(Debug, Error, PartialEq)]
pub enum DesignError {
    /// A conversion was requested for a unit it does not handle.
    #[error("quantity '{name}' has unit '{unit}', which this conversion does not support")]
    UnsupportedUnit {
        /// Name of the offending quantity.
        name: String,
        /// Unit tag carried by the quantity.
        unit: Unit,
    },
    /// A formula received a quantity tagged with an unexpected unit.
    #[error("quantity '{name}' must be in '{expected}' (found '{found}')")]
    UnitMismatch {
        /// Name of the offending quantity.
        name: String,
        /// Unit the formula expects.
        expected: Unit,
        /// Unit carried by the quantity.
        found: Unit,
    },
    /// A quantity holds a different kind of value than the consumer expects.
    #[error("quantity '{name}' must be a {expected} value")]
    WrongKind {
        /// Name of the offending quantity.
        name: String,
        /// Kind of value the consumer expects.
        expected: &'static str,
    },
    /// A quantity holds a value outside its valid domain.
    #[error("quantity '{name}' is invalid: {reason}")]
    InvalidValue {
        /// Name of the offending quantity.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A geometry query named a member class other than chord or brace.
    #[error("invalid member type \"{0}\"")]
    InvalidMemberType(String),
    /// A tube section violates `0 < t < D/2`.
    #[error("{member} section is invalid: wall thickness {wall_thickness} m with outer diameter {outer_diameter} m")]
    InvalidSection {
        /// Member class of the section.
        member: String,
        /// Outer diameter in metres.
        outer_diameter: f64,
        /// Wall thickness in metres.
        wall_thickness: f64,
    },
    /// A required quantity is absent from the parameter store.
    #[error("required quantity '{0}' is missing")]
    MissingQuantity(String),
    /// A member label is not part of the truss topology.
    #[error("member '{0}' is not part of the truss")]
    UnknownMember(String),
    /// The named joint is not a K-joint of the truss.
    #[error("joint '{0}' is not a K-joint of the truss")]
    NotAKJoint(String),
    /// The strain-gauged member carries no force under the live load.
    #[error("gauged member '{0}' carries no force under the live load")]
    InsensitiveGauge(String),
    /// The design code named by the parameter set has no evaluator.
    #[error("design code '{0}' is not supported")]
    UnsupportedCode(String),
    /// The code-rule evaluator rejected a query.
    #[error("code-rule evaluator failed: {0}")]
    Evaluator(String),
    /// The code-rule evaluator returned a life that is zero, negative or NaN.
    #[error("allowable life for {role} in load case {case} is not positive ({value})")]
    NonPositiveLife {
        /// Member role of the offending cell.
        role: String,
        /// Load case of the offending cell.
        case: LoadCase,
        /// Returned life.
        value: f64,
    },
    /// An export label was not located within the search window.
    #[error("quantity \"{label}\" not found{}", .scope.map(|table| format!(" in table {table}")).unwrap_or_default())]
    QuantityNotFound {
        /// Label that was searched for.
        label: String,
        /// Table the search was restricted to.
        scope: Option<u32>,
    },
    /// An export block does not fit below its label.
    #[error("values for \"{label}\" need {rows} rows but the sheet ends first")]
    SheetOverflow {
        /// Label the block was written under.
        label: String,
        /// Number of rows in the block.
        rows: usize,
    },
    /// The parameter source or result file could not be read or written.
    #[error("cannot use '{source_name}': {reason}")]
    Source {
        /// Path or name of the source.
        source_name: String,
        /// Underlying failure.
        reason: String,
    },
    /// The truss solve failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
