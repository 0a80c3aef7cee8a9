#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use kjoint::export::{export_results, ResultSink, ResultValue, SheetRow};
use kjoint::{
    force, DesignError, DesignResult, Designer, JsonParameterStore, MemoryParameterStore, Parameter,
    ParameterSet, ParameterStore, ReportSink, Sheet, SheetSettings, SheetSink, Unit, K_TRUSS,
};

#[derive(Debug, Clone, Copy)]
struct ReferenceDimensions {
    panel_width: f64,
    height: f64,
    brace_diameter: f64,
    brace_wall: f64,
}

impl Default for ReferenceDimensions {
    fn default() -> Self {
        Self {
            panel_width: 1.2,
            height: 2.0,
            brace_diameter: 0.0603,
            brace_wall: 0.0036,
        }
    }
}

fn reference_designer() -> Designer {
    let parameters = MemoryParameterStore::with_example()
        .read("example")
        .expect("reference set is registered");
    Designer::new(parameters).expect("reference set is valid")
}

#[test]
fn brace_area_matches_reference_section() {
    let dimensions = ReferenceDimensions::default();
    let area = reference_designer()
        .member_area("BRACE")
        .expect("brace area available");
    let r = dimensions.brace_diameter / 2.0;
    let expected = std::f64::consts::PI * (r.powi(2) - (r - dimensions.brace_wall).powi(2));

    assert_relative_eq!(area, expected, max_relative = 1e-12);
    assert!(area > 6.3e-4 && area < 6.5e-4);
}

#[test]
fn roller_carries_no_vertical_load() {
    let designer = reference_designer();
    let statics = designer.gravity_load().expect("static solve succeeds");
    let dynamics = designer.dynamic_reaction().expect("dynamic solve succeeds");

    assert_eq!(statics.reactions.by, 0.0);
    assert!(dynamics.by.iter().all(|value| *value == 0.0));
}

#[test]
fn peak_forces_grow_with_strain() {
    let peaks = reference_designer()
        .peak_forces()
        .expect("peak forces available");

    assert!(peaks.iter().all(|value| *value < 0.0));
    assert!(peaks[0].abs() < peaks[1].abs());
    assert!(peaks[1].abs() < peaks[2].abs());
}

#[test]
fn dynamic_reactions_follow_closed_form() {
    let dimensions = ReferenceDimensions::default();
    let designer = reference_designer();
    let peaks = designer.peak_forces().expect("peak forces available");
    let reactions = designer.dynamic_reaction().expect("dynamic solve succeeds");

    for case in 0..3 {
        let half = 0.5 * peaks[case];
        let ax = 5.0 * dimensions.panel_width / dimensions.height * half;
        assert_relative_eq!(reactions.ax[case], ax, max_relative = 1e-9);
        assert_relative_eq!(reactions.ay[case], -half, max_relative = 1e-9);
        assert_relative_eq!(reactions.bx[case], -ax, max_relative = 1e-9);
    }
}

#[test]
fn every_joint_is_in_equilibrium() {
    let designer = reference_designer();
    let peaks = designer.peak_forces().expect("peak forces available");
    let model = designer.model();
    let loads = kjoint::dynamics::live_loads(model, &peaks);
    let solution = model
        .truss()
        .evaluate(&loads)
        .expect("dynamic solve succeeds");

    for (case, case_loads) in loads.iter().enumerate() {
        for joint in 0..model.truss().joint_count() {
            let residual = model
                .truss()
                .joint_residual(
                    petgraph::graph::NodeIndex::new(joint),
                    &solution,
                    case_loads,
                    case,
                )
                .expect("joint exists");
            assert!(residual.norm() < 1e-6, "joint {joint} case {case}: {residual:?}");
        }
    }
}

#[test]
fn gravity_reactions_balance_the_half_weight() {
    let designer = reference_designer();
    let load = designer.gravity_load().expect("static solve succeeds");
    let half_weight = 0.5 * load.mass * 9.81;

    assert_relative_eq!(load.reactions.ay + load.reactions.by, half_weight, max_relative = 1e-12);
    assert_relative_eq!(load.reactions.ax + load.reactions.bx, 0.0, epsilon = 1e-6);
    assert!(load.mass > 0.0);
}

#[test]
fn reference_design_has_finite_life_and_positive_pins() {
    let results = reference_designer().results().expect("design succeeds");

    assert!(results.life.hours.is_finite() && results.life.hours > 0.0);
    assert_relative_eq!(results.life.hours, results.life.role_hours.min());
    assert!(results.pins.a > 0.0 && results.pins.b > 0.0);
    assert!(results.stress_magnification.iter().all(|scf| *scf == 1.5 || *scf == 1.2));
}

#[test]
fn doubling_strain_shortens_life() {
    let base = ParameterSet::example();
    let doubled = base
        .clone()
        .with("PEAKSTRAIN", Parameter::load_cases(Unit::MicroUnitless, 290.0, 390.0, 1180.0));

    let base_life = Designer::new(base).and_then(|d| d.fatigue_life());
    let doubled_life = Designer::new(doubled).and_then(|d| d.fatigue_life());

    assert!(doubled_life.expect("life available").hours < base_life.expect("life available").hours);
}

#[test]
fn missing_quantity_is_reported_before_computation() {
    let text = r#"{ "A": { "unit": "mm", "value": 1200 } }"#;
    assert_eq!(
        JsonParameterStore::parse("inline", text).unwrap_err(),
        DesignError::MissingQuantity("B".to_owned())
    );
}

#[test]
fn export_emits_eight_blocks_in_order() {
    let mut sink = ReportSink::new();
    reference_designer()
        .export(&mut sink)
        .expect("export succeeds");

    let written: Vec<_> = sink
        .records()
        .iter()
        .map(|record| (record.label.as_str(), record.scope, record.value.shape()))
        .collect();
    assert_eq!(
        written,
        [
            ("PEAKFORCE", None, (1, 3)),
            ("CENTX", None, (7, 1)),
            ("AC", None, (13, 3)),
            ("AFX", None, (4, 3)),
            ("BD", Some(7), (4, 3)),
            ("BD", Some(8), (4, 1)),
            ("BD", Some(9), (4, 3)),
            ("LIFE", None, (3, 1)),
        ]
    );
    assert!(sink.is_committed());

    // Centroid is reported in millimetres.
    let centx = &sink.records()[1].value;
    assert_relative_eq!(centx.rows()[0][0], 2.5 * 1200.0, max_relative = 1e-12);
}

#[test]
fn missing_label_aborts_without_committing() {
    let designer = reference_designer();
    let members: Vec<&str> = designer
        .model()
        .members()
        .iter()
        .map(|member| member.label.as_str())
        .collect();
    let mut layout = Sheet::template(&members, &["BD", "CD", "DF", "DE"]);
    layout.rows.retain(|row| row.label.as_deref() != Some("LIFE"));
    layout.rows.push(SheetRow::blank(Some(10)));

    let mut sink = SheetSink::new(layout.clone(), SheetSettings::default());
    assert_eq!(
        designer.export(&mut sink).unwrap_err(),
        DesignError::QuantityNotFound {
            label: "LIFE".to_owned(),
            scope: None
        }
    );
    assert_eq!(sink.sheet(), &layout);
}

/// Sheet sink that remembers which labels were attempted and whether it was
/// committed.
struct RecordingSink {
    inner: SheetSink,
    attempted: Vec<String>,
    committed: bool,
}

impl RecordingSink {
    fn new(layout: Sheet) -> Self {
        Self {
            inner: SheetSink::new(layout, SheetSettings::default()),
            attempted: Vec::new(),
            committed: false,
        }
    }
}

impl ResultSink for RecordingSink {
    fn write(&mut self, label: &str, value: &ResultValue, scope: Option<u32>) -> DesignResult<()> {
        self.attempted.push(label.to_owned());
        self.inner.write(label, value, scope)
    }

    fn commit(&mut self) -> DesignResult<()> {
        self.committed = true;
        self.inner.commit()
    }
}

fn template_without(designer: &Designer, label: &str, table: Option<u32>) -> Sheet {
    let members: Vec<&str> = designer
        .model()
        .members()
        .iter()
        .map(|member| member.label.as_str())
        .collect();
    let mut layout = Sheet::template(&members, &["BD", "CD", "DF", "DE"]);
    let before = layout.rows.len();
    layout
        .rows
        .retain(|row| !(row.label.as_deref() == Some(label) && row.table == table));
    assert_eq!(layout.rows.len(), before - 1, "template has one {label} row in {table:?}");
    layout
}

#[test]
fn early_missing_label_stops_later_writes() {
    let designer = reference_designer();
    let layout = template_without(&designer, "AC", Some(5));

    let mut sink = RecordingSink::new(layout.clone());
    assert_eq!(
        designer.export(&mut sink).unwrap_err(),
        DesignError::QuantityNotFound {
            label: "AC".to_owned(),
            scope: None
        }
    );
    assert_eq!(sink.attempted, ["PEAKFORCE", "CENTX", "AC"]);
    assert!(!sink.committed);
    assert_eq!(sink.inner.sheet(), &layout);
}

#[test]
fn missing_scoped_table_stops_later_writes() {
    let designer = reference_designer();
    let layout = template_without(&designer, "BD", Some(8));

    let mut sink = RecordingSink::new(layout.clone());
    assert_eq!(
        designer.export(&mut sink).unwrap_err(),
        DesignError::QuantityNotFound {
            label: "BD".to_owned(),
            scope: Some(8)
        }
    );
    assert_eq!(sink.attempted, ["PEAKFORCE", "CENTX", "AC", "AFX", "BD", "BD"]);
    assert!(!sink.committed);
    assert_eq!(sink.inner.sheet(), &layout);
}

#[test]
fn unlimited_life_is_saved_and_reloaded() {
    let parameters = ParameterSet::example()
        .with("PEAKSTRAIN", Parameter::load_cases(Unit::MicroUnitless, 0.1, 0.2, 0.3));
    let designer = Designer::new(parameters).expect("parameters are valid");
    let results = designer.results().expect("design succeeds");
    assert!(results.life.hours.is_infinite());

    let members: Vec<&str> = designer
        .model()
        .members()
        .iter()
        .map(|member| member.label.as_str())
        .collect();
    let roles: Vec<&str> = results.roles.iter().map(String::as_str).collect();
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("design.json");
    Sheet::template(&members, &roles)
        .save(&path)
        .expect("template saved");

    let mut sink = SheetSink::open(&path, SheetSettings::default()).expect("template loads");
    export_results(&results, &mut sink).expect("export succeeds");

    let reloaded = Sheet::load(&path).expect("saved worksheet loads again");
    let life_row = reloaded
        .rows
        .iter()
        .find(|row| row.label.as_deref() == Some("LIFE"))
        .expect("life row present");
    assert!(life_row.values[0].is_infinite() && life_row.values[0] > 0.0);
    assert_eq!(&reloaded, sink.sheet());
}

#[test]
fn template_sheet_receives_every_block() {
    let designer = reference_designer();
    let results = designer.results().expect("design succeeds");
    let members: Vec<&str> = designer
        .model()
        .members()
        .iter()
        .map(|member| member.label.as_str())
        .collect();
    let roles: Vec<&str> = results.roles.iter().map(String::as_str).collect();
    let mut sink = SheetSink::new(Sheet::template(&members, &roles), SheetSettings::default());

    export_results(&results, &mut sink).expect("export succeeds");

    let rows = &sink.sheet().rows;
    assert_eq!(rows[0].values.len(), 3);
    let life_row = rows
        .iter()
        .find(|row| row.label.as_deref() == Some("LIFE"))
        .expect("life row present");
    assert_relative_eq!(life_row.values[0], results.life.hours);
    assert!(rows.iter().all(|row| !row.values.is_empty()));
}

#[test]
fn layout_is_a_determinate_planar_truss() {
    let model = K_TRUSS
        .build(1.2, 2.0)
        .expect("layout builds");
    let truss = model.truss();

    assert_eq!(truss.joint_count(), 8);
    assert_eq!(truss.member_count(), 13);
    assert!(truss
        .rigid_body_reactions(kjoint::point(1.0, 1.0), force(0.0, -1.0))
        .is_ok());
}
