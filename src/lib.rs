#![warn(clippy::all)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod code_rules;
pub mod designer;
pub mod dynamics;
pub mod errors;
pub mod export;
pub mod fatigue;
pub mod geometry;
pub mod parameters;
pub mod pins;
pub mod statics;
pub mod topology;
pub mod truss;
pub mod units;

pub use code_rules::{CodeRuleEvaluator, Eurocode3, FatigueQuery, JointClass};
pub use designer::{DesignResults, DesignSettings, Designer};
pub use errors::{AnalysisError, DesignError, DesignResult};
pub use export::{ReportSink, ResultSink, ResultValue, Sheet, SheetSettings, SheetSink};
pub use geometry::{force, point, Force, MemberClass, Point, TubeSection};
pub use parameters::{
    JsonParameterStore, LoadCase, MemoryParameterStore, Parameter, ParameterSet, ParameterStore,
};
pub use topology::{TrussModel, K_TRUSS};
pub use truss::{JointLoads, Solution, Truss};
pub use units::{Quantity, Unit};
