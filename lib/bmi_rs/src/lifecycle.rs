// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use bmi_base::errors::BmiError;

#[derive(Debug,Clone,Copy,Eq,PartialEq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    Finalized
}

/// Lifecycle bookkeeping for model implementations.
///
/// Callers of a model never track its phase, so a model that wants
/// deterministic answers to out-of-order calls keeps one of these and checks
/// it at the top of each operation.
#[derive(Debug,Clone,Copy)]
pub struct Lifecycle {
    phase: Phase
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle { phase: Phase::Uninitialized }
    }
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Enter the initialized phase. Only allowed once per model.
    pub fn begin(&mut self) -> Result<(), BmiError> {
        match self.phase {
            Phase::Uninitialized => {
                self.phase = Phase::Initialized;
                Ok(())
            }
            Phase::Initialized => Err(BmiError::AlreadyInitialized),
            Phase::Finalized => Err(BmiError::Finalized)
        }
    }

    pub fn require_initialized(&self) -> Result<(), BmiError> {
        match self.phase {
            Phase::Initialized => Ok(()),
            Phase::Uninitialized => Err(BmiError::NotInitialized),
            Phase::Finalized => Err(BmiError::Finalized)
        }
    }

    pub fn end(&mut self) -> Result<(), BmiError> {
        self.require_initialized()?;
        self.phase = Phase::Finalized;
        Ok(())
    }
}
