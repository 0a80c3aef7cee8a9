//! The design pipeline: parameters in, forces, stresses, life and pins out.

use nalgebra::{Matrix4x3, Vector3, Vector4};
use tracing::{debug, info};

use crate::code_rules::{CodeRuleEvaluator, Eurocode3};
use crate::dynamics::{self, DynamicResponse, MemberForces};
use crate::errors::{DesignError, DesignResult};
use crate::export::{self, ResultSink};
use crate::fatigue::{self, FatigueLife, JointLayout};
use crate::geometry::{MemberClass, TubeSection};
use crate::parameters::{LoadCase, ParameterSet};
use crate::pins::{self, PinDiameters};
use crate::statics::{self, StaticLoad, SupportReactions};
use crate::topology::{ModelMember, TrussModel, K_TRUSS};
use crate::units::Unit;

/// Tunable design settings that are not part of the parameter set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DesignSettings {
    /// Partial factor `γ_Mf` applied to fatigue stress ranges.
    pub partial_factor: f64,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            partial_factor: 1.0,
        }
    }
}

/// Every quantity the designer produces, computed in one pass.
#[derive(Clone, Debug, PartialEq)]
pub struct DesignResults {
    /// Peak live load per case, newtons (negative: downward).
    pub peak_forces: Vector3<f64>,
    /// Self-weight, centroid and static reactions.
    pub static_load: StaticLoad,
    /// Reactions and member forces under the live load.
    pub dynamic: DynamicResponse,
    /// Labels of the K-joint roles in row order.
    pub roles: [String; 4],
    /// Nominal stress per role and case, pascals.
    pub nominal_stress: Matrix4x3<f64>,
    /// Stress concentration factor per role.
    pub stress_magnification: Vector4<f64>,
    /// Hot-spot stress per role and case, pascals.
    pub adjusted_stress: Matrix4x3<f64>,
    /// Fatigue life of the joint.
    pub life: FatigueLife,
    /// Support pin diameters, metres.
    pub pins: PinDiameters,
}

/// Runs the design calculations for one parameter set.
#[derive(Debug)]
pub struct Designer<E = Eurocode3> {
    parameters: ParameterSet,
    model: TrussModel,
    evaluator: E,
}

impl Designer<Eurocode3> {
    /// Create a designer using the code named by `CODE` and default settings.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::UnsupportedCode`] for codes other than Eurocode 3 and
    /// [`DesignError::InvalidValue`] for non-positive dimensions or strengths.
    pub fn new(parameters: ParameterSet) -> DesignResult<Self> {
        Self::with_settings(parameters, DesignSettings::default())
    }

    /// Create a designer with explicit settings.
    ///
    /// # Errors
    ///
    /// See [`Designer::new`].
    pub fn with_settings(parameters: ParameterSet, settings: DesignSettings) -> DesignResult<Self> {
        let evaluator = Eurocode3::for_code(parameters.text("CODE")?, settings.partial_factor)?;
        Self::with_evaluator(parameters, evaluator)
    }
}

impl<E: CodeRuleEvaluator> Designer<E> {
    /// Create a designer that asks `evaluator` for allowable lives.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidValue`] for non-positive dimensions, strengths or
    /// material data, and for negative or non-finite cycle counts.
    pub fn with_evaluator(parameters: ParameterSet, evaluator: E) -> DesignResult<Self> {
        let a = positive("A", parameters.meters("A")?)?;
        let b = positive("B", parameters.meters("B")?)?;
        positive("STATICFOS", parameters.scalar("STATICFOS", Unit::Unitless)?)?;
        positive("PINYIELD", parameters.pascals("PINYIELD")?)?;
        positive("MODULUS", parameters.pascals("MODULUS")?)?;
        positive(
            "DENSITY",
            parameters.scalar("DENSITY", Unit::KilogramPerCubicMeter)?,
        )?;
        positive("GRAV", parameters.scalar("GRAV", Unit::MeterPerSecondSquared)?)?;
        let cycles = parameters.load_cases("NPERHOUR", Unit::Unitless)?;
        for case in LoadCase::ALL {
            let count = cycles.get(case);
            if !(count >= 0.0 && count.is_finite()) {
                return Err(DesignError::InvalidValue {
                    name: "NPERHOUR".to_owned(),
                    reason: format!("case {case} must be a non-negative count, got {count}"),
                });
            }
        }
        let model = K_TRUSS.build(a, b)?;
        debug!(a, b, "built truss model");
        Ok(Self {
            parameters,
            model,
            evaluator,
        })
    }

    /// Parameter set the designer reads from.
    #[must_use]
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Scaled truss model.
    #[must_use]
    pub fn model(&self) -> &TrussModel {
        &self.model
    }

    /// Cross-sectional area of `"CHORD"` or `"BRACE"` members, square metres.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidMemberType`] for other names and
    /// [`DesignError::InvalidSection`] when the wall does not fit the tube.
    pub fn member_area(&self, member_type: &str) -> DesignResult<f64> {
        self.section_area(MemberClass::parse(member_type)?)
    }

    fn section_area(&self, class: MemberClass) -> DesignResult<f64> {
        let diameter = self.parameters.meters(&format!("D{}", class.name()))?;
        let thickness = self.parameters.meters(&format!("T{}", class.name()))?;
        Ok(TubeSection::new(class, diameter, thickness)?.area())
    }

    /// Self-weight, its centroid and the static support reactions.
    ///
    /// # Errors
    ///
    /// Fails on invalid sections, unit mismatches or an unsolvable truss.
    pub fn gravity_load(&self) -> DesignResult<StaticLoad> {
        let a = self.parameters.meters("A")?;
        let b = self.parameters.meters("B")?;
        let density = self.parameters.scalar("DENSITY", Unit::KilogramPerCubicMeter)?;
        let gravity = self.parameters.scalar("GRAV", Unit::MeterPerSecondSquared)?;
        let mass = statics::truss_mass(
            a,
            b,
            self.section_area(MemberClass::Chord)?,
            self.section_area(MemberClass::Brace)?,
            density,
        );
        let load = statics::gravity_load(&self.model, mass, gravity)?;
        debug!(mass, ax = load.reactions.ax, ay = load.reactions.ay, "resolved self-weight");
        Ok(load)
    }

    /// Peak live load per case from the strain-gauge readings.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InsensitiveGauge`] when `SG` names a zero-force member
    /// and [`DesignError::UnknownMember`] when it names no member at all.
    pub fn peak_forces(&self) -> DesignResult<Vector3<f64>> {
        let gauge = self.model.member(self.parameters.text("SG")?)?;
        let strains = self.parameters.strains("PEAKSTRAIN")?;
        let modulus = self.parameters.pascals("MODULUS")?;
        let area = self.section_area(gauge.class)?;
        let forces = dynamics::gauge_forces(&strains, modulus, area);
        let peaks = dynamics::peak_forces(&self.model, gauge, &forces)?;
        debug!(gauge = %gauge.label, p = peaks.x, q = peaks.y, r = peaks.z, "peak forces");
        Ok(peaks)
    }

    /// Reactions and member forces under half the peak load at the tip.
    ///
    /// # Errors
    ///
    /// Fails when the peak forces cannot be derived or the truss cannot be solved.
    pub fn dynamic_response(&self) -> DesignResult<DynamicResponse> {
        dynamics::solve_live_load(&self.model, &self.peak_forces()?)
    }

    /// Live-load support reactions per case.
    ///
    /// # Errors
    ///
    /// See [`Designer::dynamic_response`].
    pub fn dynamic_reaction(&self) -> DesignResult<SupportReactions<Vector3<f64>>> {
        Ok(self.dynamic_response()?.reactions)
    }

    /// Live-load member forces per case in table order.
    ///
    /// # Errors
    ///
    /// See [`Designer::dynamic_response`].
    pub fn dynamic_load(&self) -> DesignResult<MemberForces> {
        Ok(self.dynamic_response()?.member_forces)
    }

    /// Members meeting at the joint named by `JOINT`.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::NotAKJoint`] when `JOINT` is not a K-joint.
    pub fn joint_roles(&self) -> DesignResult<[ModelMember; 4]> {
        self.model.k_joint_roles(self.parameters.text("JOINT")?)
    }

    /// Nominal stress per role and case, pascals.
    ///
    /// # Errors
    ///
    /// Fails when the live-load solve or the joint lookup fails.
    pub fn nominal_stress(&self) -> DesignResult<Matrix4x3<f64>> {
        let roles = self.joint_roles()?;
        self.nominal_stress_from(&roles, &self.dynamic_load()?)
    }

    fn nominal_stress_from(
        &self,
        roles: &[ModelMember; 4],
        forces: &MemberForces,
    ) -> DesignResult<Matrix4x3<f64>> {
        fatigue::nominal_stress(
            roles,
            forces,
            self.section_area(MemberClass::Chord)?,
            self.section_area(MemberClass::Brace)?,
        )
    }

    /// Stress concentration factor per role.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::NotAKJoint`] when `JOINT` is not a K-joint.
    pub fn k_stress_magnification(&self) -> DesignResult<Vector4<f64>> {
        Ok(fatigue::k_stress_magnification(&self.joint_roles()?))
    }

    /// Hot-spot stress per role and case, pascals.
    ///
    /// # Errors
    ///
    /// See [`Designer::nominal_stress`].
    pub fn adjusted_stress(&self) -> DesignResult<Matrix4x3<f64>> {
        Ok(fatigue::adjusted_stress(
            &self.nominal_stress()?,
            &self.k_stress_magnification()?,
        ))
    }

    /// Fatigue life of the joint in hours.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::NonPositiveLife`] or [`DesignError::Evaluator`] when
    /// the code rules cannot rate a stress range.
    pub fn fatigue_life(&self) -> DesignResult<FatigueLife> {
        self.fatigue_life_from(&self.joint_roles()?, &self.adjusted_stress()?)
    }

    fn fatigue_life_from(
        &self,
        roles: &[ModelMember; 4],
        adjusted: &Matrix4x3<f64>,
    ) -> DesignResult<FatigueLife> {
        let thickness_ratio = self.parameters.meters("TCHORD")? / self.parameters.meters("TBRACE")?;
        let layout: JointLayout = self.parameters.text("JOINTTYPE")?.parse()?;
        let cycles = self
            .parameters
            .load_cases("NPERHOUR", Unit::Unitless)?
            .to_vector();
        fatigue::fatigue_life(
            &self.evaluator,
            roles,
            adjusted,
            thickness_ratio,
            layout,
            &cycles,
        )
    }

    /// Clevis-pin diameters at both supports, metres.
    ///
    /// # Errors
    ///
    /// Fails when the static or live-load reactions cannot be computed.
    pub fn pin_diameters(&self) -> DesignResult<PinDiameters> {
        self.pin_diameters_from(&self.gravity_load()?, &self.dynamic_reaction()?)
    }

    fn pin_diameters_from(
        &self,
        static_load: &StaticLoad,
        dynamic: &SupportReactions<Vector3<f64>>,
    ) -> DesignResult<PinDiameters> {
        Ok(pins::pin_diameters(
            &static_load.reactions,
            dynamic,
            self.parameters.scalar("STATICFOS", Unit::Unitless)?,
            self.parameters.pascals("PINYIELD")?,
        ))
    }

    /// Run every calculation once.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage.
    pub fn results(&self) -> DesignResult<DesignResults> {
        let peak_forces = self.peak_forces()?;
        let static_load = self.gravity_load()?;
        let dynamic = dynamics::solve_live_load(&self.model, &peak_forces)?;
        let roles = self.joint_roles()?;
        let nominal_stress = self.nominal_stress_from(&roles, &dynamic.member_forces)?;
        let stress_magnification = fatigue::k_stress_magnification(&roles);
        let adjusted_stress = fatigue::adjusted_stress(&nominal_stress, &stress_magnification);
        let life = self.fatigue_life_from(&roles, &adjusted_stress)?;
        let pins = self.pin_diameters_from(&static_load, &dynamic.reactions)?;

        info!(
            hours = life.hours,
            governing = %life.governing,
            pin_a = pins.a,
            pin_b = pins.b,
            "design complete"
        );
        Ok(DesignResults {
            peak_forces,
            static_load,
            dynamic,
            roles: roles.map(|member| member.label),
            nominal_stress,
            stress_magnification,
            adjusted_stress,
            life,
            pins,
        })
    }

    /// Compute every result, then write them to `sink` and commit.
    ///
    /// # Errors
    ///
    /// Returns the first computation or sink error; nothing is committed then.
    pub fn export<S: ResultSink + ?Sized>(&self, sink: &mut S) -> DesignResult<()> {
        export::export_results(&self.results()?, sink)
    }
}

fn positive(name: &str, value: f64) -> DesignResult<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(DesignError::InvalidValue {
            name: name.to_owned(),
            reason: format!("must be positive, got {value}"),
        })
    }
}
