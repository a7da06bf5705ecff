// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use bmi_base::errors::BmiError;

use crate::handle::ModelHandle;

/// Table of model handles addressed by integer id, for callers that cannot
/// hold on to a pointer. Ids are handed out in increasing order and never
/// reused.
#[derive(Default)]
pub struct Registry {
    handles: BTreeMap<i32, ModelHandle>,
    next_id: i32,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn insert(&mut self, handle: ModelHandle) -> Result<i32, BmiError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(BmiError::HandlesExhausted)?;
        self.handles.insert(id, handle);
        Ok(id)
    }

    pub fn get(&self, id: i32) -> Result<&ModelHandle, BmiError> {
        self.handles.get(&id).ok_or(BmiError::UnknownHandle(id))
    }

    pub fn get_mut(&mut self, id: i32) -> Result<&mut ModelHandle, BmiError> {
        self.handles.get_mut(&id).ok_or(BmiError::UnknownHandle(id))
    }

    pub fn remove(&mut self, id: i32) -> Result<ModelHandle, BmiError> {
        self.handles.remove(&id).ok_or(BmiError::UnknownHandle(id))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
