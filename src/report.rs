use kjoint::parameters::LoadCase;
use kjoint::DesignResults;
use std::fmt::Write;

/// Render a textual summary of a K-joint design.
///
/// Forces are in newtons, stresses in megapascals and pin diameters in
/// millimetres, matching the units of the exported worksheet.
#[must_use]
pub fn render_summary(results: &DesignResults) -> String {
    let mut output = String::new();

    writeln!(&mut output, "K-joint truss design").expect("writing to string cannot fail");

    // Live load first; everything downstream scales with it.
    for case in LoadCase::ALL {
        writeln!(
            &mut output,
            "Peak force {case}: {:+.1} N",
            results.peak_forces[case.index()]
        )
        .expect("writing to string cannot fail");
    }

    let statics = &results.static_load;
    writeln!(
        &mut output,
        "Self-weight: mass = {:.1} kg at ({:.3} m, {:.3} m); A = ({:+.1}, {:+.1}) N, B = ({:+.1}, {:+.1}) N",
        statics.mass,
        statics.centroid.x,
        statics.centroid.y,
        statics.reactions.ax,
        statics.reactions.ay,
        statics.reactions.bx,
        statics.reactions.by
    )
    .expect("writing to string cannot fail");

    // Hot-spot stresses per role, one column per load case.
    writeln!(&mut output, "Hot-spot stress (MPa):").expect("writing to string cannot fail");
    for (row, role) in results.roles.iter().enumerate() {
        writeln!(
            &mut output,
            "  {role:<3} SCF {:.1}: {:>8.2} {:>8.2} {:>8.2}",
            results.stress_magnification[row],
            results.adjusted_stress[(row, 0)] / 1e6,
            results.adjusted_stress[(row, 1)] / 1e6,
            results.adjusted_stress[(row, 2)] / 1e6
        )
        .expect("writing to string cannot fail");
    }

    if results.life.hours.is_finite() {
        writeln!(
            &mut output,
            "Fatigue life: {:.1} h (governed by {})",
            results.life.hours, results.life.governing
        )
        .expect("writing to string cannot fail");
    } else {
        output.push_str("Fatigue life: unlimited (all stress ranges below the cut-off)\n");
    }

    writeln!(
        &mut output,
        "Pin diameters: A = {:.2} mm, B = {:.2} mm",
        results.pins.a * 1e3,
        results.pins.b * 1e3
    )
    .expect("writing to string cannot fail");

    output
}
