#![allow(dead_code)]

use bmi_base::errors::BmiError;
use bmi_base::types::{GridType, Location, ValueRef, ValueType, Values};
use bmi_rs::Bmi;

/// Three-cell water tank: 2 inputs, 3 outputs, a 1x3 rectilinear grid and a
/// scalar grid.
pub struct Tank {
    pub name: String,
    pub depth: Vec<f64>,
    pub rain: f64,
    pub inflow: f64,
    pub time: f64,
    pub config: Option<String>,
    pub panic_on_update: bool,
    pub panic_on_drop: bool,
}

impl Tank {
    pub fn new() -> Tank {
        Tank {
            name: "tank".to_string(),
            depth: vec![1.0, 2.0, 3.0],
            rain: 0.0,
            inflow: 0.0,
            time: 0.0,
            config: None,
            panic_on_update: false,
            panic_on_drop: false,
        }
    }

    pub fn boxed() -> Box<dyn Bmi> {
        Box::new(Tank::new())
    }

    fn var(&self, name: &str) -> Result<(i32, ValueType, &'static str, usize), BmiError> {
        match name {
            "depth" => Ok((0, ValueType::Double, "m", self.depth.len())),
            "rain" => Ok((1, ValueType::Double, "mm d-1", 1)),
            "inflow" => Ok((1, ValueType::Double, "m3 s-1", 1)),
            "volume" => Ok((1, ValueType::Double, "m3", 1)),
            "cell_count" => Ok((1, ValueType::Int, "1", 1)),
            _ => Err(BmiError::UnknownVariable(name.to_string())),
        }
    }

    fn check_grid(&self, grid: i32) -> Result<(), BmiError> {
        match grid {
            0 | 1 => Ok(()),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }
}

impl Drop for Tank {
    fn drop(&mut self) {
        if self.panic_on_drop && !std::thread::panicking() {
            panic!("tank leaks");
        }
    }
}

impl Bmi for Tank {
    fn initialize(&mut self, config_file: &str) -> Result<(), BmiError> {
        self.config = Some(config_file.to_string());
        Ok(())
    }

    fn update(&mut self) -> Result<(), BmiError> {
        if self.panic_on_update {
            panic!("tank overflow");
        }
        for d in self.depth.iter_mut() {
            *d += self.rain;
        }
        self.time += 1.0;
        Ok(())
    }

    fn update_until(&mut self, then: f64) -> Result<(), BmiError> {
        while self.time < then {
            self.update()?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), BmiError> {
        Ok(())
    }

    fn get_component_name(&self) -> Result<String, BmiError> {
        Ok(self.name.clone())
    }

    fn get_input_item_count(&self) -> Result<usize, BmiError> {
        Ok(2)
    }

    fn get_output_item_count(&self) -> Result<usize, BmiError> {
        Ok(3)
    }

    fn get_input_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(vec!["rain".to_string(), "inflow".to_string()])
    }

    fn get_output_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(vec!["depth".to_string(), "volume".to_string(), "cell_count".to_string()])
    }

    fn get_var_grid(&self, name: &str) -> Result<i32, BmiError> {
        Ok(self.var(name)?.0)
    }

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError> {
        Ok(self.var(name)?.1)
    }

    fn get_var_units(&self, name: &str) -> Result<String, BmiError> {
        Ok(self.var(name)?.2.to_string())
    }

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError> {
        Ok(self.var(name)?.1.itemsize())
    }

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError> {
        let (_, value_type, _, len) = self.var(name)?;
        Ok(value_type.itemsize() * len)
    }

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError> {
        self.var(name)?;
        Ok(Location::Node)
    }

    fn get_current_time(&self) -> Result<f64, BmiError> {
        Ok(self.time)
    }

    fn get_start_time(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_end_time(&self) -> Result<f64, BmiError> {
        Ok(100.0)
    }

    fn get_time_units(&self) -> Result<String, BmiError> {
        Ok("d".to_string())
    }

    fn get_time_step(&self) -> Result<f64, BmiError> {
        Ok(1.0)
    }

    fn get_value(&self, name: &str) -> Result<Values, BmiError> {
        Ok(match name {
            "cell_count" => Values::Int(vec![self.depth.len() as i32]),
            "volume" => Values::Double(vec![self.depth.iter().sum()]),
            _ => self.get_value_ptr(name)?.to_values(),
        })
    }

    fn get_value_ptr(&self, name: &str) -> Result<ValueRef<'_>, BmiError> {
        match name {
            "depth" => Ok(ValueRef::Double(&self.depth)),
            "rain" => Ok(ValueRef::Double(std::slice::from_ref(&self.rain))),
            "inflow" => Ok(ValueRef::Double(std::slice::from_ref(&self.inflow))),
            _ => Err(BmiError::not_implemented("get_value_ptr")),
        }
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        self.get_value(name)?.as_ref().gather(name, inds)
    }

    fn set_value(&mut self, name: &str, src: ValueRef<'_>) -> Result<(), BmiError> {
        let src = src.as_double(name)?;
        match name {
            "depth" => self.depth.copy_from_slice(src),
            "rain" => self.rain = src[0],
            "inflow" => self.inflow = src[0],
            _ => return Err(BmiError::NotSettable(name.to_string())),
        }
        Ok(())
    }

    fn set_value_at_indices(&mut self, name: &str, inds: &[usize], src: ValueRef<'_>) -> Result<(), BmiError> {
        if name != "depth" {
            return Err(BmiError::NotSettable(name.to_string()));
        }
        let src = src.as_double(name)?;
        for (&i, &v) in inds.iter().zip(src) {
            let len = self.depth.len();
            *self
                .depth
                .get_mut(i)
                .ok_or_else(|| BmiError::IndexOutOfBounds(name.to_string(), i, len))? = v;
        }
        Ok(())
    }

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError> {
        self.check_grid(grid)?;
        Ok(if grid == 0 { 2 } else { 0 })
    }

    fn get_grid_size(&self, grid: i32) -> Result<usize, BmiError> {
        self.check_grid(grid)?;
        Ok(if grid == 0 { self.depth.len() } else { 1 })
    }

    fn get_grid_type(&self, grid: i32) -> Result<GridType, BmiError> {
        self.check_grid(grid)?;
        Ok(if grid == 0 { GridType::UniformRectilinear } else { GridType::Scalar })
    }

    fn get_grid_shape(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.check_grid(grid)?;
        Ok(if grid == 0 { vec![1, self.depth.len()] } else { vec![] })
    }

    fn get_grid_spacing(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.check_grid(grid)?;
        Ok(if grid == 0 { vec![2.0, 0.5] } else { vec![] })
    }

    fn get_grid_x(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        if grid != 0 {
            return Err(BmiError::not_implemented("get_grid_x"));
        }
        Ok((0..self.depth.len()).map(|i| 0.5 * i as f64).collect())
    }
}

/// Two triangles on the unit square (grid 0, unstructured) next to a 2x3
/// skewed quadrilateral grid (grid 1). No time stepping.
pub struct Mesh {
    pub elevation: Vec<f64>,
}

impl Mesh {
    pub fn new() -> Mesh {
        Mesh {
            elevation: vec![0.0, 0.1, 0.2, 0.3],
        }
    }

    pub fn boxed() -> Box<dyn Bmi> {
        Box::new(Mesh::new())
    }

    fn var(&self, name: &str) -> Result<(i32, usize), BmiError> {
        match name {
            "elevation" => Ok((0, 4)),
            "roughness" => Ok((1, 6)),
            _ => Err(BmiError::UnknownVariable(name.to_string())),
        }
    }

    fn triangles(&self, grid: i32) -> Result<(), BmiError> {
        match grid {
            0 => Ok(()),
            1 => Err(BmiError::not_implemented("connectivity")),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }
}

impl Bmi for Mesh {
    fn initialize(&mut self, _config_file: &str) -> Result<(), BmiError> {
        Ok(())
    }

    fn update(&mut self) -> Result<(), BmiError> {
        Ok(())
    }

    fn update_until(&mut self, _then: f64) -> Result<(), BmiError> {
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), BmiError> {
        Ok(())
    }

    fn get_component_name(&self) -> Result<String, BmiError> {
        Ok("mesh".to_string())
    }

    fn get_input_item_count(&self) -> Result<usize, BmiError> {
        Ok(0)
    }

    fn get_output_item_count(&self) -> Result<usize, BmiError> {
        Ok(2)
    }

    fn get_input_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(vec![])
    }

    fn get_output_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(vec!["elevation".to_string(), "roughness".to_string()])
    }

    fn get_var_grid(&self, name: &str) -> Result<i32, BmiError> {
        Ok(self.var(name)?.0)
    }

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError> {
        self.var(name)?;
        Ok(ValueType::Double)
    }

    fn get_var_units(&self, name: &str) -> Result<String, BmiError> {
        self.var(name)?;
        Ok("m".to_string())
    }

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError> {
        self.var(name)?;
        Ok(ValueType::Double.itemsize())
    }

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError> {
        Ok(self.var(name)?.1 * ValueType::Double.itemsize())
    }

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError> {
        self.var(name)?;
        Ok(Location::Node)
    }

    fn get_current_time(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_start_time(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_end_time(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_time_units(&self) -> Result<String, BmiError> {
        Ok("s".to_string())
    }

    fn get_time_step(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_value(&self, name: &str) -> Result<Values, BmiError> {
        match self.var(name)? {
            (0, _) => Ok(Values::Double(self.elevation.clone())),
            (_, len) => Ok(Values::Double(vec![0.03; len])),
        }
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        self.get_value(name)?.as_ref().gather(name, inds)
    }

    fn set_value(&mut self, name: &str, _src: ValueRef<'_>) -> Result<(), BmiError> {
        Err(BmiError::NotSettable(name.to_string()))
    }

    fn set_value_at_indices(&mut self, name: &str, _inds: &[usize], _src: ValueRef<'_>) -> Result<(), BmiError> {
        Err(BmiError::NotSettable(name.to_string()))
    }

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError> {
        match grid {
            0 | 1 => Ok(2),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }

    fn get_grid_size(&self, grid: i32) -> Result<usize, BmiError> {
        match grid {
            0 => Ok(4),
            1 => Ok(6),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }

    fn get_grid_type(&self, grid: i32) -> Result<GridType, BmiError> {
        match grid {
            0 => Ok(GridType::Unstructured),
            1 => Ok(GridType::StructuredQuadrilateral),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }

    fn get_grid_shape(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        match grid {
            1 => Ok(vec![2, 3]),
            _ => Err(BmiError::not_implemented("get_grid_shape")),
        }
    }

    fn get_grid_x(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        match grid {
            0 => Ok(vec![0.0, 1.0, 1.0, 0.0]),
            1 => Ok(vec![0.0, 1.0, 2.0, 0.5, 1.5, 2.5]),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }

    fn get_grid_y(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        match grid {
            0 => Ok(vec![0.0, 0.0, 1.0, 1.0]),
            1 => Ok(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }

    fn get_grid_z(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.triangles(grid)?;
        Ok(self.elevation.clone())
    }

    fn get_grid_node_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.triangles(grid)?;
        Ok(4)
    }

    fn get_grid_edge_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.triangles(grid)?;
        Ok(5)
    }

    fn get_grid_face_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.triangles(grid)?;
        Ok(2)
    }

    fn get_grid_edge_nodes(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.triangles(grid)?;
        Ok(vec![0, 1, 1, 2, 2, 3, 3, 0, 0, 2])
    }

    fn get_grid_face_edges(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.triangles(grid)?;
        Ok(vec![0, 1, 4, 4, 2, 3])
    }

    fn get_grid_face_nodes(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.triangles(grid)?;
        Ok(vec![0, 1, 2, 0, 2, 3])
    }

    fn get_grid_nodes_per_face(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.triangles(grid)?;
        Ok(vec![3, 3])
    }
}
