//! Test doubles for deterministic gameplay tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use digbust_types::SubmissionRecord;

use crate::gate::{ScoreSink, SinkError};
use crate::rng::UnitRng;

/// Scripted draw source. Panics when the script runs dry, which turns an
/// unexpected extra draw into a loud test failure.
pub struct SequenceRng {
    draws: VecDeque<f64>,
}

impl SequenceRng {
    pub fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl UnitRng for SequenceRng {
    fn next_unit(&mut self) -> f64 {
        self.draws
            .pop_front()
            .expect("SequenceRng exhausted: engine drew more than the test scripted")
    }
}

/// Sink that records every forwarded submission, optionally failing each
/// write to exercise the non-fatal downstream-error path.
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Rc<RefCell<Vec<SubmissionRecord>>>,
    fail_writes: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            records: Rc::default(),
            fail_writes: true,
        }
    }

    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.records.borrow().clone()
    }
}

impl ScoreSink for RecordingSink {
    fn record(&mut self, record: &SubmissionRecord) -> Result<(), SinkError> {
        if self.fail_writes {
            return Err(SinkError::Unavailable("recording sink configured to fail"));
        }
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }
}
