use std::io::Write;

use bmi_c_api::ForeignModel;
use bmi_rs::errors::BmiError;
use bmi_rs::types::{GridType, ValueRef, Values};
use bmi_rs::{Bmi, ModelHandle};
use dpend_rs::{register_bmi_dpend, Dpend};

use float_cmp::approx_eq;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

fn scalar(model: &dyn Bmi, name: &str) -> f64 {
    match model.get_value(name).unwrap() {
        Values::Double(v) => v[0],
        other => panic!("unexpected values {:?}", other),
    }
}

#[fixture]
fn dpend() -> ModelHandle {
    let mut cfg = NamedTempFile::new().expect("Could not create config file");
    writeln!(cfg, "theta1 = 90.0\ntheta2 = 0.0\ntime_step = 0.005\nend_time = 2.0").unwrap();

    let mut handle = ModelHandle::new(Box::new(Dpend::new()));
    handle.initialize(cfg.path().to_str().unwrap()).expect("Initialize failed");
    handle
}

#[rstest]
fn it_starts_from_configured_angles(dpend: ModelHandle) {
    assert!(approx_eq!(f64, scalar(&dpend, "theta1"), std::f64::consts::FRAC_PI_2, ulps = 2));
    assert_eq!(scalar(&dpend, "theta2"), 0.0);
    assert_eq!(scalar(&dpend, "joint1.velocity"), 0.0);
    assert!(approx_eq!(f64, dpend.get_end_time().unwrap(), 2.0, ulps = 2));
}

#[rstest]
fn it_lists_inputs_and_outputs(dpend: ModelHandle) {
    assert_eq!(dpend.get_input_var_names().unwrap(), vec!["joint1.acceleration", "joint2.acceleration"]);
    assert_eq!(dpend.get_output_item_count().unwrap(), 4);
    assert_eq!(dpend.get_var_units("joint2.velocity").unwrap(), "rad s-1");
    assert_eq!(dpend.get_grid_type(dpend.get_var_grid("theta1").unwrap()).unwrap(), GridType::Scalar);
    assert_eq!(dpend.get_var_nbytes("theta2").unwrap(), 8);
}

#[rstest]
fn it_swings_down_under_gravity(mut dpend: ModelHandle) {
    let th1 = scalar(&dpend, "theta1");
    dpend.update().unwrap();
    dpend.update().unwrap();

    assert!(approx_eq!(f64, dpend.get_current_time().unwrap(), 0.01, ulps = 4));
    assert!(scalar(&dpend, "theta1") < th1);
    assert!(scalar(&dpend, "joint1.velocity") < 0.0);
}

#[rstest]
fn it_runs_to_the_requested_time(mut dpend: ModelHandle) {
    dpend.update_until(0.0123).unwrap();
    assert!(approx_eq!(f64, dpend.get_current_time().unwrap(), 0.0123, epsilon = 1e-12));
}

#[rstest]
fn it_applies_joint_accelerations(mut dpend: ModelHandle) {
    let mut free = ModelHandle::new(Box::new(Dpend::new()));
    free.initialize("").unwrap();
    let mut pushed = ModelHandle::new(Box::new(Dpend::new()));
    pushed.initialize("").unwrap();
    pushed.set_value("joint2.acceleration", ValueRef::Double(&[5.0])).unwrap();

    free.update().unwrap();
    pushed.update().unwrap();
    assert!(scalar(&pushed, "joint2.velocity") > scalar(&free, "joint2.velocity"));

    assert!(matches!(dpend.set_value("theta1", ValueRef::Double(&[0.0])), Err(BmiError::NotSettable(_))));
    assert!(matches!(
        dpend.set_value("joint1.acceleration", ValueRef::Double(&[1.0, 2.0])),
        Err(BmiError::SizeMismatch(_, 1, 2))
    ));
    assert!(matches!(
        dpend.set_value_at_indices("joint1.acceleration", &[1], ValueRef::Double(&[1.0])),
        Err(BmiError::IndexOutOfBounds(_, 1, 1))
    ));
}

#[rstest]
fn it_exposes_state_through_value_ptr(mut dpend: ModelHandle) {
    dpend.update().unwrap();
    let expected = scalar(&dpend, "theta1");
    let view = dpend.get_value_ptr("theta1").unwrap();
    assert_eq!(view, ValueRef::Double(&[expected]));
}

#[test]
fn lifecycle_is_enforced() {
    let mut dpend = Dpend::new();
    assert!(matches!(dpend.update(), Err(BmiError::NotInitialized)));
    dpend.initialize("").unwrap();
    assert!(matches!(dpend.initialize(""), Err(BmiError::AlreadyInitialized)));
    dpend.finalize().unwrap();
    assert!(matches!(dpend.get_value("theta1"), Err(BmiError::Finalized)));
}

#[test]
fn negative_mass_is_a_config_error() {
    let mut cfg = NamedTempFile::new().unwrap();
    writeln!(cfg, "m2 = -1.0").unwrap();
    let mut dpend = Dpend::new();
    assert!(matches!(dpend.initialize(cfg.path().to_str().unwrap()), Err(BmiError::Config(_))));
}

#[test]
fn works_through_the_c_operation_table() {
    let mut model = unsafe { ForeignModel::new(register_bmi_dpend) }.unwrap();
    model.initialize("").unwrap();
    assert_eq!(model.get_input_item_count().unwrap(), 2);
    assert_eq!(model.get_output_var_names().unwrap().len(), 4);

    model.set_value("joint1.acceleration", ValueRef::Double(&[0.5])).unwrap();
    model.update_until(0.1).unwrap();
    assert!(approx_eq!(f64, model.get_current_time().unwrap(), 0.1, epsilon = 1e-12));
    assert_eq!(model.get_value("joint1.acceleration").unwrap(), Values::Double(vec![0.5]));
    model.finalize().unwrap();
}
