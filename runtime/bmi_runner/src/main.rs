// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

mod descriptor;

use bmi_rs::types::{ValueRef, ValueType, Values};
use bmi_rs::Bmi;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use structopt::StructOpt;

use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

use descriptor::ModelDescriptor;

#[derive(Debug, StructOpt)]
#[structopt(name = "bmi_runner", about = "Steps a BMI model and records its outputs")]
struct Opt {
    /// Bundled model to run
    #[structopt(long, possible_values = &["heat", "dpend"], required_unless = "descriptor", conflicts_with = "descriptor")]
    model: Option<String>,
    /// Model descriptor (TOML) naming the library and entry point to load
    #[structopt(long, parse(from_os_str))]
    descriptor: Option<PathBuf>,
    /// Model class within the descriptor, needed if it lists several
    #[structopt(long)]
    class: Option<String>,
    #[structopt(long, default_value = "")]
    config: String,
    /// Run until this time instead of the model's end time
    #[structopt(long)]
    until: Option<f64>,
    #[structopt(long, parse(from_os_str))]
    csv: Option<PathBuf>,
    /// Drive the model through its C operation table
    #[structopt(long)]
    via_c_abi: bool,
    /// Input values as `name=value`, set once after initialization
    parameters: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let descriptor = match (&opt.descriptor, &opt.model) {
        (Some(path), _) => ModelDescriptor::from_path(path)?,
        (None, Some(name)) => descriptor::bundled(name)?,
        (None, None) => bail!("Either --model or --descriptor is required"),
    };
    let mut loaded = descriptor::resolve(&descriptor, opt.class.as_deref(), opt.via_c_abi)?;
    let model = &mut loaded.handle;
    model
        .initialize(&opt.config)
        .with_context(|| format!("Could not initialize model with config `{}`", opt.config))?;
    info!("initialized {}", model.get_component_name()?);

    for (name, value) in parse_cmd_parameters(&opt.parameters)? {
        set_input(model, &name, value)?;
    }

    let end = match opt.until {
        Some(t) => t,
        None => model.get_end_time()?,
    };

    let outputs = model.get_output_var_names()?;
    let mut csv_wtr = match &opt.csv {
        Some(path) => Some(csv::Writer::from_path(path).with_context(|| format!("Could not create {:?}", path))?),
        None => None,
    };

    write_header(&mut csv_wtr, &outputs)?;
    write_record(&mut csv_wtr, model, &outputs)?;

    let mut steps = 0usize;
    while model.get_current_time()? < end {
        let t = model.get_current_time()?;
        if t + model.get_time_step()? > end {
            model.update_until(end)?;
        } else {
            model.update()?;
        }
        steps += 1;
        write_record(&mut csv_wtr, model, &outputs)?;
    }
    debug!("ran {} steps up to t = {}", steps, model.get_current_time()?);

    if let Some(wtr) = csv_wtr.as_mut() {
        wtr.flush()?;
    }
    model.finalize()?;

    Ok(())
}

fn parse_cmd_parameters(params: &[String]) -> Result<HashMap<String, f64>> {
    let mut kv_pairs: HashMap<String, f64> = HashMap::new();

    for kv_str in params {
        let kv_vec: Vec<&str> = kv_str.split('=').collect();
        if kv_vec.len() != 2 {
            bail!("Invalid parameter format: {}", kv_str);
        }

        let val: f64 = kv_vec[1]
            .parse()
            .with_context(|| format!("Could not parse value of parameter `{}`", kv_vec[0]))?;
        kv_pairs.insert(kv_vec[0].to_string(), val);
    }

    Ok(kv_pairs)
}

/// Sets every element of input `name` to `value`.
fn set_input(model: &mut dyn Bmi, name: &str, value: f64) -> Result<()> {
    if !model.get_input_var_names()?.iter().any(|n| n == name) {
        bail!("`{}` is not an input of {}", name, model.get_component_name()?);
    }

    let len = model.get_var_nbytes(name)? / model.get_var_itemsize(name)?;
    match model.get_var_type(name)? {
        ValueType::Double => model.set_value(name, ValueRef::Double(&vec![value; len]))?,
        ValueType::Float => model.set_value(name, ValueRef::Float(&vec![value as f32; len]))?,
        ValueType::Int => model.set_value(name, ValueRef::Int(&vec![value as i32; len]))?,
    }
    debug!("set input {} = {}", name, value);
    Ok(())
}

/// Single-element outputs are written as is, arrays as their mean.
fn summarize(values: &Values) -> String {
    fn mean(vals: impl ExactSizeIterator<Item = f64>) -> f64 {
        let n = vals.len();
        if n == 0 {
            return f64::NAN;
        }
        vals.sum::<f64>() / n as f64
    }

    match values {
        Values::Int(v) if v.len() == 1 => v[0].to_string(),
        Values::Int(v) => format!("{:.8}", mean(v.iter().map(|&x| x as f64))),
        Values::Float(v) => format!("{:.8}", mean(v.iter().map(|&x| x as f64))),
        Values::Double(v) => format!("{:.8}", mean(v.iter().copied())),
    }
}

fn write_header(csv_wtr: &mut Option<csv::Writer<File>>, outputs: &[String]) -> Result<()> {
    let mut header: Vec<String> = Vec::new();
    header.push("t".to_string());
    header.extend(outputs.iter().cloned());

    if let Some(ref mut wtr) = csv_wtr {
        wtr.write_record(header).context("Could not write to csv-file")
    } else {
        println!("{:?}", header);
        Ok(())
    }
}

fn write_record(csv_wtr: &mut Option<csv::Writer<File>>, model: &dyn Bmi, outputs: &[String]) -> Result<()> {
    let mut line: Vec<String> = Vec::new();
    line.push(format!("{:.8}", model.get_current_time()?));

    for name in outputs {
        line.push(summarize(&model.get_value(name)?));
    }

    if let Some(ref mut wtr) = csv_wtr {
        wtr.write_record(line).context("Could not write to csv-file")
    } else {
        println!("{:?}", line);
        Ok(())
    }
}
