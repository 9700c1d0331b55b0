use proptest::prelude::*;
use stl_remesh::params::defaults::{self, ANGLE, FORCE_PARAMETRIZABLE, FUNNY_FIELD};
use stl_remesh::RemeshError;

proptest! {
    #[test]
    fn angles_on_the_grid_are_kept(angle in 20u32..=120) {
        let mut params = defaults::field_parameters().unwrap();
        params.set_number(ANGLE, angle as f64).unwrap();
        prop_assert_eq!(params.get_number(ANGLE).unwrap(), angle as f64);

        params.set_from_str(ANGLE, &angle.to_string()).unwrap();
        prop_assert_eq!(params.get_number(ANGLE).unwrap(), angle as f64);
    }

    #[test]
    fn out_of_range_angles_keep_the_previous_value(
        angle in prop_oneof![-1.0e6f64..19.999, 120.001f64..1.0e6]
    ) {
        let mut params = defaults::field_parameters().unwrap();
        params.set_number(ANGLE, 75.0).unwrap();

        let err = params.set_number(ANGLE, angle).unwrap_err();
        prop_assert!(matches!(err, RemeshError::Validation { .. }), "{:?}", err);
        prop_assert_eq!(params.get_number(ANGLE).unwrap(), 75.0);
    }

    #[test]
    fn off_grid_angles_are_rejected(whole in 20u32..120, frac in 0.01f64..0.99) {
        let mut params = defaults::sized_parameters().unwrap();
        let angle = whole as f64 + frac;
        prop_assert!(params.set_number(ANGLE, angle).is_err());
        prop_assert_eq!(params.get_number(ANGLE).unwrap(), 40.0);
    }

    #[test]
    fn flags_only_take_zero_or_one(value in any::<f64>()) {
        prop_assume!(!(value.abs() < 1e-6 || (value - 1.0).abs() < 1e-6));
        let mut params = defaults::field_parameters().unwrap();
        for name in [FORCE_PARAMETRIZABLE, FUNNY_FIELD] {
            prop_assert!(params.set_number(name, value).is_err());
            prop_assert!(!params.get_bool(name).unwrap());
        }
    }
}
