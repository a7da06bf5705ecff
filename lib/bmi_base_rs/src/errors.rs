// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use crate::types::ValueType;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BmiError {
    #[error("No model attached to handle")]
    NoModel,
    #[error("Model has not been initialized")]
    NotInitialized,
    #[error("Model is already initialized")]
    AlreadyInitialized,
    #[error("Model has been finalized")]
    Finalized,
    #[error("Not implemented: `{0}`")]
    NotImplemented(String),
    #[error("Unknown variable requested: `{0}`")]
    UnknownVariable(String),
    #[error("Unknown grid id requested: `{0}`")]
    UnknownGrid(i32),
    #[error("Unknown model handle: `{0}`")]
    UnknownHandle(i32),
    #[error("No model handles left")]
    HandlesExhausted,
    #[error("Variable `{0}` cannot be set")]
    NotSettable(String),
    #[error("Unexpected value type `{2}` for variable `{0}`, expected `{1}`")]
    TypeMismatch(String, ValueType, ValueType),
    #[error("Index `{1}` out of bounds for variable `{0}` with `{2}` elements")]
    IndexOutOfBounds(String, usize, usize),
    #[error("Expected `{1}` values for variable `{0}`, received `{2}`")]
    SizeMismatch(String, usize, usize),
    #[error("Invalid tag `{0}`")]
    InvalidTag(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Model reported failure in `{0}`")]
    Failure(String),
    #[error("Model panicked in `{0}`")]
    Panic(String),
}

impl BmiError {
    pub fn not_implemented(op: &str) -> BmiError {
        BmiError::NotImplemented(op.to_string())
    }
}
