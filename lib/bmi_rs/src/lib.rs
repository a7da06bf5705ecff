// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

pub mod interface;
pub mod handle;
pub mod lifecycle;
pub mod registry;
pub use bmi_base::{types,errors};

pub use interface::Bmi;
pub use handle::ModelHandle;
pub use lifecycle::{Lifecycle,Phase};
pub use registry::Registry;
