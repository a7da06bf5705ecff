use std::sync::{Arc, Mutex};

use bmi_rs::errors::BmiError;
use bmi_rs::types::{GridType, Location, ValueRef, ValueType, Values};
use bmi_rs::{Bmi, ModelHandle, Registry};

use float_cmp::approx_eq;
use rstest::{fixture, rstest};

type CallLog = Arc<Mutex<Vec<String>>>;

/// Model that records every call it receives together with its arguments.
struct Recorder {
    calls: CallLog,
    depth: Vec<f64>,
}

impl Recorder {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_name(&self, name: &str) -> Result<(), BmiError> {
        match name {
            "depth" | "rain" => Ok(()),
            _ => Err(BmiError::UnknownVariable(name.to_string())),
        }
    }
}

impl Bmi for Recorder {
    fn initialize(&mut self, config_file: &str) -> Result<(), BmiError> {
        self.record(format!("initialize({})", config_file));
        Ok(())
    }

    fn update(&mut self) -> Result<(), BmiError> {
        self.record("update".to_string());
        for d in self.depth.iter_mut() {
            *d += 1.0;
        }
        Ok(())
    }

    fn update_until(&mut self, then: f64) -> Result<(), BmiError> {
        self.record(format!("update_until({})", then));
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), BmiError> {
        self.record("finalize".to_string());
        Ok(())
    }

    fn get_component_name(&self) -> Result<String, BmiError> {
        Ok("recorder".to_string())
    }

    fn get_input_item_count(&self) -> Result<usize, BmiError> {
        Ok(1)
    }

    fn get_output_item_count(&self) -> Result<usize, BmiError> {
        Ok(1)
    }

    fn get_input_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(vec!["rain".to_string()])
    }

    fn get_output_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(vec!["depth".to_string()])
    }

    fn get_var_grid(&self, name: &str) -> Result<i32, BmiError> {
        self.check_name(name)?;
        Ok(0)
    }

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError> {
        self.check_name(name)?;
        Ok(ValueType::Double)
    }

    fn get_var_units(&self, name: &str) -> Result<String, BmiError> {
        self.check_name(name)?;
        Ok("m".to_string())
    }

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError> {
        self.check_name(name)?;
        Ok(8)
    }

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError> {
        self.check_name(name)?;
        Ok(8 * self.depth.len())
    }

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError> {
        self.check_name(name)?;
        Ok(Location::Face)
    }

    fn get_current_time(&self) -> Result<f64, BmiError> {
        Ok(1.5)
    }

    fn get_start_time(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_end_time(&self) -> Result<f64, BmiError> {
        Ok(10.0)
    }

    fn get_time_units(&self) -> Result<String, BmiError> {
        Ok("d".to_string())
    }

    fn get_time_step(&self) -> Result<f64, BmiError> {
        Ok(0.5)
    }

    fn get_value(&self, name: &str) -> Result<Values, BmiError> {
        self.check_name(name)?;
        Ok(Values::Double(self.depth.clone()))
    }

    fn get_value_ptr(&self, name: &str) -> Result<ValueRef<'_>, BmiError> {
        self.check_name(name)?;
        Ok(ValueRef::Double(&self.depth))
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        self.record(format!("get_value_at_indices({}, {:?})", name, inds));
        ValueRef::Double(&self.depth).gather(name, inds)
    }

    fn set_value(&mut self, name: &str, src: ValueRef<'_>) -> Result<(), BmiError> {
        self.record(format!("set_value({}, {:?})", name, src));
        self.depth.copy_from_slice(src.as_double(name)?);
        Ok(())
    }

    fn set_value_at_indices(&mut self, name: &str, inds: &[usize], src: ValueRef<'_>) -> Result<(), BmiError> {
        self.record(format!("set_value_at_indices({}, {:?}, {:?})", name, inds, src));
        Ok(())
    }

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError> {
        self.record(format!("get_grid_rank({})", grid));
        Ok(2)
    }

    fn get_grid_size(&self, _grid: i32) -> Result<usize, BmiError> {
        Ok(self.depth.len())
    }

    fn get_grid_type(&self, _grid: i32) -> Result<GridType, BmiError> {
        Ok(GridType::Unstructured)
    }

    fn get_grid_face_count(&self, _grid: i32) -> Result<usize, BmiError> {
        Ok(self.depth.len())
    }
}

struct RecorderFixture {
    handle: ModelHandle,
    calls: CallLog,
}

#[fixture]
fn fix() -> RecorderFixture {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder {
        calls: calls.clone(),
        depth: vec![0.25, 0.5, 0.75],
    };

    RecorderFixture {
        handle: ModelHandle::new(Box::new(recorder)),
        calls,
    }
}

fn last_call(fix: &RecorderFixture) -> String {
    fix.calls.lock().unwrap().last().cloned().unwrap_or_default()
}

#[rstest]
fn it_forwards_lifecycle_arguments_unmodified(mut fix: RecorderFixture) {
    fix.handle.initialize("config/with spaces.toml").unwrap();
    assert_eq!(last_call(&fix), "initialize(config/with spaces.toml)");

    fix.handle.update_until(12.25).unwrap();
    assert_eq!(last_call(&fix), "update_until(12.25)");

    fix.handle.finalize().unwrap();
    assert_eq!(
        *fix.calls.lock().unwrap(),
        vec!["initialize(config/with spaces.toml)", "update_until(12.25)", "finalize"]
    );
}

#[rstest]
fn it_allows_finalize_right_after_initialize(mut fix: RecorderFixture) {
    fix.handle.initialize("").unwrap();
    fix.handle.finalize().unwrap();
    assert_eq!(fix.calls.lock().unwrap().len(), 2);
}

#[rstest]
fn it_forwards_indices_and_buffers(mut fix: RecorderFixture) {
    let vals = fix.handle.get_value_at_indices("depth", &[2, 0]).unwrap();
    assert_eq!(vals, Values::Double(vec![0.75, 0.25]));
    assert_eq!(last_call(&fix), "get_value_at_indices(depth, [2, 0])");

    let src = [9.0, 8.0];
    fix.handle.set_value_at_indices("rain", &[1, 0], ValueRef::Double(&src)).unwrap();
    assert_eq!(last_call(&fix), "set_value_at_indices(rain, [1, 0], Double([9.0, 8.0]))");

    fix.handle.get_grid_rank(42).unwrap();
    assert_eq!(last_call(&fix), "get_grid_rank(42)");
}

#[rstest]
fn it_returns_model_results_unchanged(fix: RecorderFixture) {
    assert_eq!(fix.handle.get_component_name().unwrap(), "recorder");
    assert_eq!(fix.handle.get_var_location("depth").unwrap(), Location::Face);
    assert_eq!(fix.handle.get_var_units("rain").unwrap(), "m");
    assert_eq!(fix.handle.get_time_units().unwrap(), "d");
    assert!(approx_eq!(f64, fix.handle.get_current_time().unwrap(), 1.5, ulps = 2));
    assert!(approx_eq!(f64, fix.handle.get_time_step().unwrap(), 0.5, ulps = 2));
    assert_eq!(fix.handle.get_grid_type(0).unwrap(), GridType::Unstructured);
    assert_eq!(fix.handle.get_grid_face_count(0).unwrap(), 3);
}

#[rstest]
fn it_propagates_model_errors(fix: RecorderFixture) {
    match fix.handle.get_var_grid("velocity") {
        Err(BmiError::UnknownVariable(name)) => assert_eq!(name, "velocity"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[rstest]
fn it_reports_unimplemented_operations(mut fix: RecorderFixture) {
    assert!(matches!(fix.handle.update_frac(0.5), Err(BmiError::NotImplemented(_))));
    assert!(matches!(fix.handle.run_model(), Err(BmiError::NotImplemented(_))));
    assert!(matches!(fix.handle.get_grid_x(0), Err(BmiError::NotImplemented(_))));
    match fix.handle.get_grid_edge_nodes(0) {
        Err(BmiError::NotImplemented(op)) => assert_eq!(op, "get_grid_edge_nodes"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[rstest]
fn it_sees_state_of_last_update_through_value_ptr(mut fix: RecorderFixture) {
    {
        let view = fix.handle.get_value_ptr("depth").unwrap();
        assert_eq!(view, ValueRef::Double(&[0.25, 0.5, 0.75]));
    }

    fix.handle.update().unwrap();

    let view = fix.handle.get_value_ptr("depth").unwrap();
    assert_eq!(view, ValueRef::Double(&[1.25, 1.5, 1.75]));
}

#[rstest]
fn it_matches_counts_and_name_lists(fix: RecorderFixture) {
    let inputs = fix.handle.get_input_var_names().unwrap();
    let outputs = fix.handle.get_output_var_names().unwrap();
    assert_eq!(inputs.len(), fix.handle.get_input_item_count().unwrap());
    assert_eq!(outputs.len(), fix.handle.get_output_item_count().unwrap());
}

#[test]
fn empty_handle_fails_every_operation() {
    let mut handle = ModelHandle::default();
    assert!(!handle.is_attached());

    assert!(matches!(handle.initialize("cfg"), Err(BmiError::NoModel)));
    assert!(matches!(handle.update(), Err(BmiError::NoModel)));
    assert!(matches!(handle.get_component_name(), Err(BmiError::NoModel)));
    assert!(matches!(handle.get_value("depth"), Err(BmiError::NoModel)));
    assert!(matches!(handle.get_value_ptr("depth"), Err(BmiError::NoModel)));
    assert!(matches!(handle.get_grid_nodes_per_face(0), Err(BmiError::NoModel)));
    assert!(matches!(handle.finalize(), Err(BmiError::NoModel)));
}

#[test]
fn handle_can_be_attached_after_creation() {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut handle = ModelHandle::default();
    let previous = handle.attach(Box::new(Recorder { calls: calls.clone(), depth: vec![1.0] }));
    assert!(previous.is_none());

    handle.initialize("a.cfg").unwrap();
    assert_eq!(calls.lock().unwrap().as_slice(), ["initialize(a.cfg)"]);

    assert!(handle.detach().is_some());
    assert!(matches!(handle.update(), Err(BmiError::NoModel)));
}

#[test]
fn registry_dispatches_by_id() {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut reg = Registry::new();
    let empty = reg.insert(ModelHandle::default()).unwrap();
    let recorder = reg.insert(ModelHandle::new(Box::new(Recorder { calls: calls.clone(), depth: vec![] }))).unwrap();

    reg.get_mut(recorder).unwrap().update().unwrap();
    assert!(matches!(reg.get_mut(empty).unwrap().update(), Err(BmiError::NoModel)));
    assert_eq!(calls.lock().unwrap().as_slice(), ["update"]);
}
