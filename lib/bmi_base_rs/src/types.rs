// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use crate::errors::BmiError;

use std::fmt;
use std::str::FromStr;

/// Upper bound (terminating NUL included) for every string returned over the
/// C interface.
pub const MAX_COMPONENT_NAME: usize = 2048;
pub const MAX_VAR_NAME: usize = 2048;
pub const MAX_TYPE_NAME: usize = 2048;
pub const MAX_UNITS_NAME: usize = 2048;

#[derive(Debug,Clone,Copy,Eq,PartialEq)]
pub enum ValueType {
    Int,
    Float,
    Double
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Double => "double"
        }
    }

    /// Size in bytes of a single item of this type.
    pub fn itemsize(&self) -> usize {
        match self {
            ValueType::Int => std::mem::size_of::<i32>(),
            ValueType::Float => std::mem::size_of::<f32>(),
            ValueType::Double => std::mem::size_of::<f64>()
        }
    }
}

impl FromStr for ValueType {
    type Err = BmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "double" => Ok(ValueType::Double),
            _ => Err(BmiError::InvalidTag(s.to_string()))
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where on a grid the values of a variable live.
#[derive(Debug,Clone,Copy,Eq,PartialEq)]
pub enum Location {
    Node,
    Edge,
    Face
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Node => "node",
            Location::Edge => "edge",
            Location::Face => "face"
        }
    }
}

impl FromStr for Location {
    type Err = BmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(Location::Node),
            "edge" => Ok(Location::Edge),
            "face" => Ok(Location::Face),
            _ => Err(BmiError::InvalidTag(s.to_string()))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug,Clone,Copy,Eq,PartialEq)]
pub enum GridType {
    Scalar,
    Points,
    Vector,
    UniformRectilinear,
    Rectilinear,
    StructuredQuadrilateral,
    Unstructured
}

impl GridType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridType::Scalar => "scalar",
            GridType::Points => "points",
            GridType::Vector => "vector",
            GridType::UniformRectilinear => "uniform_rectilinear",
            GridType::Rectilinear => "rectilinear",
            GridType::StructuredQuadrilateral => "structured_quadrilateral",
            GridType::Unstructured => "unstructured"
        }
    }

    /// Structured grids are described by a shape; x/y/z then hold one
    /// coordinate per node along each axis rather than one per node.
    pub fn is_rectilinear(&self) -> bool {
        matches!(self, GridType::UniformRectilinear | GridType::Rectilinear)
    }
}

impl FromStr for GridType {
    type Err = BmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(GridType::Scalar),
            "points" => Ok(GridType::Points),
            "vector" => Ok(GridType::Vector),
            "uniform_rectilinear" => Ok(GridType::UniformRectilinear),
            "rectilinear" => Ok(GridType::Rectilinear),
            "structured_quadrilateral" => Ok(GridType::StructuredQuadrilateral),
            "unstructured" => Ok(GridType::Unstructured),
            _ => Err(BmiError::InvalidTag(s.to_string()))
        }
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned copy of the values of a variable.
#[derive(Debug,Clone,PartialEq)]
pub enum Values {
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>)
}

impl Values {
    pub fn zeros(value_type: ValueType, len: usize) -> Values {
        match value_type {
            ValueType::Int => Values::Int(vec![0; len]),
            ValueType::Float => Values::Float(vec![0.0; len]),
            ValueType::Double => Values::Double(vec![0.0; len])
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.as_ref().value_type()
    }

    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ref(&self) -> ValueRef<'_> {
        match self {
            Values::Int(v) => ValueRef::Int(v),
            Values::Float(v) => ValueRef::Float(v),
            Values::Double(v) => ValueRef::Double(v)
        }
    }
}

/// Borrowed view of the values of a variable.
///
/// When handed out by `get_value_ptr` the view points into model-owned
/// memory and lives only as long as the shared borrow of the model.
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum ValueRef<'a> {
    Int(&'a [i32]),
    Float(&'a [f32]),
    Double(&'a [f64])
}

impl<'a> ValueRef<'a> {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueRef::Int(_) => ValueType::Int,
            ValueRef::Float(_) => ValueType::Float,
            ValueRef::Double(_) => ValueType::Double
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ValueRef::Int(v) => v.len(),
            ValueRef::Float(v) => v.len(),
            ValueRef::Double(v) => v.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nbytes(&self) -> usize {
        self.len() * self.value_type().itemsize()
    }

    pub fn to_values(&self) -> Values {
        match *self {
            ValueRef::Int(v) => Values::Int(v.to_vec()),
            ValueRef::Float(v) => Values::Float(v.to_vec()),
            ValueRef::Double(v) => Values::Double(v.to_vec())
        }
    }

    /// Copies the elements at `inds`, in the order given.
    pub fn gather(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        let len = self.len();
        if let Some(&bad) = inds.iter().find(|&&i| i >= len) {
            return Err(BmiError::IndexOutOfBounds(name.to_string(), bad, len));
        }

        Ok(match *self {
            ValueRef::Int(v) => Values::Int(inds.iter().map(|&i| v[i]).collect()),
            ValueRef::Float(v) => Values::Float(inds.iter().map(|&i| v[i]).collect()),
            ValueRef::Double(v) => Values::Double(inds.iter().map(|&i| v[i]).collect())
        })
    }

    pub fn as_int(&self, name: &str) -> Result<&'a [i32], BmiError> {
        match *self {
            ValueRef::Int(v) => Ok(v),
            other => Err(BmiError::TypeMismatch(name.to_string(), ValueType::Int, other.value_type()))
        }
    }

    pub fn as_float(&self, name: &str) -> Result<&'a [f32], BmiError> {
        match *self {
            ValueRef::Float(v) => Ok(v),
            other => Err(BmiError::TypeMismatch(name.to_string(), ValueType::Float, other.value_type()))
        }
    }

    pub fn as_double(&self, name: &str) -> Result<&'a [f64], BmiError> {
        match *self {
            ValueRef::Double(v) => Ok(v),
            other => Err(BmiError::TypeMismatch(name.to_string(), ValueType::Double, other.value_type()))
        }
    }
}

impl<'a> From<&'a [i32]> for ValueRef<'a> {
    fn from(v: &'a [i32]) -> Self {
        ValueRef::Int(v)
    }
}

impl<'a> From<&'a [f32]> for ValueRef<'a> {
    fn from(v: &'a [f32]) -> Self {
        ValueRef::Float(v)
    }
}

impl<'a> From<&'a [f64]> for ValueRef<'a> {
    fn from(v: &'a [f64]) -> Self {
        ValueRef::Double(v)
    }
}
