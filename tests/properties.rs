#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use kjoint::fatigue::{fatigue_life, JointLayout};
use kjoint::units::to_meters;
use kjoint::{Eurocode3, MemberClass, Quantity, TubeSection, Unit, K_TRUSS};
use nalgebra::{Matrix4x3, Vector3};
use proptest::prelude::*;

proptest! {
    #[test]
    fn tube_area_is_positive_annulus(diameter in 0.01_f64..0.5, share in 0.01_f64..0.99) {
        let wall = share * diameter / 2.0;
        let section = TubeSection::new(MemberClass::Chord, diameter, wall).unwrap();
        let r = diameter / 2.0;
        let expected = std::f64::consts::PI * (r * r - (r - wall) * (r - wall));
        prop_assert!(section.area() > 0.0);
        assert_relative_eq!(section.area(), expected, max_relative = 1e-9);
    }

    #[test]
    fn millimetres_convert_linearly(a in -1e6_f64..1e6, b in -1e6_f64..1e6, k in -100.0_f64..100.0) {
        let convert = |value| to_meters(Quantity::new("L", Unit::Millimeter, value)).unwrap();
        assert_relative_eq!(convert(a + b), convert(a) + convert(b), epsilon = 1e-6);
        assert_relative_eq!(convert(k * a), k * convert(a), epsilon = 1e-6);
    }

    #[test]
    fn roller_never_reacts_vertically(
        a in 0.2_f64..5.0,
        b in 0.2_f64..5.0,
        p in -1e6_f64..0.0,
        mass in 1.0_f64..1e5,
    ) {
        let model = K_TRUSS.build(a, b).unwrap();
        let response = kjoint::dynamics::solve_live_load(&model, &Vector3::new(p, 2.0 * p, 3.0 * p)).unwrap();
        let statics = kjoint::statics::gravity_load(&model, mass, 9.81).unwrap();
        prop_assert!(response.reactions.by.iter().all(|value| *value == 0.0));
        prop_assert_eq!(statics.reactions.by, 0.0);
    }

    #[test]
    fn higher_stress_never_extends_life(
        base in 1e6_f64..300e6,
        extra in 0.0_f64..200e6,
        row in 0_usize..4,
        case in 0_usize..3,
    ) {
        let roles = K_TRUSS.build(1.2, 2.0).unwrap().k_joint_roles("D").unwrap();
        let cycles = Vector3::new(200.0, 420.0, 120.0);
        let evaluator = Eurocode3::default();
        let stress = Matrix4x3::from_element(base);
        let mut raised = stress;
        raised[(row, case)] += extra;

        let before = fatigue_life(&evaluator, &roles, &stress, 1.5, JointLayout::Gap, &cycles).unwrap();
        let after = fatigue_life(&evaluator, &roles, &raised, 1.5, JointLayout::Gap, &cycles).unwrap();
        prop_assert!(after.hours <= before.hours);
    }
}
