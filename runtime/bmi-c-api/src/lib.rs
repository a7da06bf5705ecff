// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! C ABI for BMI models.
//!
//! `dispatch` forwards `bmi_<op>` calls through a `BmiModel` operation table,
//! `export` fills such a table from a Rust model, `foreign` drives a table
//! from Rust, and `interop` offers integer handles with explicit string
//! lengths.

pub mod c_types;
pub mod dispatch;
pub mod export;
pub mod foreign;
pub mod interop;
mod marshal;

pub use c_types::{BmiModel, BMI_FAILURE, BMI_SUCCESS};
pub use export::register_model;
pub use foreign::{ForeignModel, RegisterFn};
