// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Model descriptors: a TOML file naming the library that provides a BMI
//! model and the C entry point that fills its operation table.
//!
//! ```toml
//! [library.Heat]
//! language = "rust"
//! library = "heat_rs"
//! header = "bmi_c_api.h"
//! entry_point = "register_bmi_heat"
//!
//! [package]
//! name = "bmi_heat"
//! requirements = []
//!
//! [info]
//! summary = "Heat diffusion on a rectangular plate"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use libloading::Library;
use log::{debug, info};
use serde::Deserialize;

use bmi_c_api::{ForeignModel, RegisterFn};
use bmi_rs::{Bmi, ModelHandle};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    #[serde(rename = "c++")]
    Cxx,
    Fortran,
    Python,
    Rust,
}

impl Language {
    /// Whether libraries in this language export a `BmiModel` register function.
    fn has_c_table(self) -> bool {
        matches!(self, Language::C | Language::Cxx | Language::Rust)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryEntry {
    pub language: Language,
    pub library: String,
    #[serde(default)]
    pub header: Option<String>,
    pub entry_point: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageTable {
    pub name: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfoTable {
    pub summary: String,
    #[serde(default)]
    pub package_author: Option<String>,
    #[serde(default)]
    pub package_author_email: Option<String>,
    #[serde(default)]
    pub package_license: Option<String>,
    #[serde(default)]
    pub github_username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDescriptor {
    pub library: BTreeMap<String, LibraryEntry>,
    #[serde(default)]
    pub package: Option<PackageTable>,
    #[serde(default)]
    pub info: Option<InfoTable>,
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

impl ModelDescriptor {
    pub fn parse(text: &str) -> Result<ModelDescriptor> {
        let descriptor: ModelDescriptor = toml::from_str(text).context("Malformed model descriptor")?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn from_path(path: &Path) -> Result<ModelDescriptor> {
        let text = fs::read_to_string(path).with_context(|| format!("Could not read descriptor {:?}", path))?;
        ModelDescriptor::parse(&text).with_context(|| format!("Invalid descriptor {:?}", path))
    }

    pub fn validate(&self) -> Result<()> {
        if self.library.is_empty() {
            bail!("descriptor names no library");
        }
        for (class, lib) in &self.library {
            if !is_identifier(class) {
                bail!("poorly-formed model class `{}`", class);
            }
            if lib.library.trim().is_empty() {
                bail!("library of `{}` is empty", class);
            }
            if !is_identifier(&lib.entry_point) {
                bail!("poorly-formed entry point `{}` for `{}`", lib.entry_point, class);
            }
        }
        if let Some(package) = &self.package {
            if !is_identifier(&package.name) {
                bail!("poorly-formed package name `{}`", package.name);
            }
        }
        Ok(())
    }

    /// The library entry for `class`, or the only entry when `class` is `None`.
    pub fn select(&self, class: Option<&str>) -> Result<(&str, &LibraryEntry)> {
        let classes = || self.library.keys().cloned().collect::<Vec<_>>().join(", ");
        match class {
            Some(name) => match self.library.get_key_value(name) {
                Some((k, v)) => Ok((k.as_str(), v)),
                None => bail!("no model class `{}`, descriptor has {}", name, classes()),
            },
            None if self.library.len() == 1 => {
                let (k, v) = self.library.iter().next().context("descriptor names no library")?;
                Ok((k.as_str(), v))
            }
            None => bail!("descriptor has several model classes ({}), pick one", classes()),
        }
    }
}

/// A model library linked into this binary.
struct Linked {
    library: &'static str,
    entry_point: &'static str,
    register: RegisterFn,
    native: fn() -> Box<dyn Bmi>,
}

fn new_heat() -> Box<dyn Bmi> {
    Box::new(heat_rs::Heat::new())
}

fn new_dpend() -> Box<dyn Bmi> {
    Box::new(dpend_rs::Dpend::new())
}

fn linked() -> [Linked; 2] {
    [
        Linked {
            library: "heat_rs",
            entry_point: "register_bmi_heat",
            register: heat_rs::register_bmi_heat,
            native: new_heat,
        },
        Linked {
            library: "dpend_rs",
            entry_point: "register_bmi_dpend",
            register: dpend_rs::register_bmi_dpend,
            native: new_dpend,
        },
    ]
}

const HEAT_DESCRIPTOR: &str = include_str!("../../../module/heat_rs/babel.toml");
const DPEND_DESCRIPTOR: &str = include_str!("../../../module/dpend_rs/babel.toml");

/// Descriptor shipped with a bundled model, by short name.
pub fn bundled(name: &str) -> Result<ModelDescriptor> {
    match name {
        "heat" => ModelDescriptor::parse(HEAT_DESCRIPTOR),
        "dpend" => ModelDescriptor::parse(DPEND_DESCRIPTOR),
        _ => bail!("Unknown model `{}`, expected `heat` or `dpend`", name),
    }
}

/// A resolved model. The library, if one was loaded, outlives the handle.
pub struct LoadedModel {
    pub handle: ModelHandle,
    _library: Option<Library>,
}

fn library_path(library: &str) -> PathBuf {
    if library.contains(std::path::MAIN_SEPARATOR) || library.contains('.') {
        PathBuf::from(library)
    } else {
        PathBuf::from(libloading::library_filename(library))
    }
}

/// Instantiates the model `class` of `descriptor`. Linked-in libraries are
/// used directly, through their operation table if `via_c_abi` is set; any
/// other library is loaded from disk and driven through its table.
pub fn resolve(descriptor: &ModelDescriptor, class: Option<&str>, via_c_abi: bool) -> Result<LoadedModel> {
    let (class, entry) = descriptor.select(class)?;
    if !entry.language.has_c_table() {
        bail!("`{}` is written in {:?} and has no C operation table", class, entry.language);
    }

    let linked = linked();
    if let Some(l) = linked.iter().find(|l| l.library == entry.library && l.entry_point == entry.entry_point) {
        debug!("using linked-in {} for {}", l.entry_point, class);
        let model: Box<dyn Bmi> = if via_c_abi {
            Box::new(unsafe { ForeignModel::new(l.register) }?)
        } else {
            (l.native)()
        };
        return Ok(LoadedModel {
            handle: ModelHandle::new(model),
            _library: None,
        });
    }

    let path = library_path(&entry.library);
    let library = unsafe { Library::new(&path) }.with_context(|| format!("Could not load model library {:?}", path))?;
    let register: RegisterFn = unsafe {
        let symbol: libloading::Symbol<RegisterFn> = library
            .get(entry.entry_point.as_bytes())
            .with_context(|| format!("{:?} has no entry point `{}`", path, entry.entry_point))?;
        *symbol
    };
    let model = unsafe { ForeignModel::new(register) }
        .with_context(|| format!("`{}` could not fill the operation table", entry.entry_point))?;
    info!("loaded {} from {:?}", class, path);

    Ok(LoadedModel {
        handle: ModelHandle::new(Box::new(model)),
        _library: Some(library),
    })
}
