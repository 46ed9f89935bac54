//! Test utilities and mock types for minicell development.
//!
//! Provides a mock species store implementing [`SpeciesReader`] and
//! [`SpeciesWriter`] that records every write, hooks that record or fail
//! on demand, and canned networks in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use minicell_cme::{CmeNetwork, CommunicationHook};
use minicell_core::{SimError, SpeciesReader, SpeciesWriter};

/// Mock species store.
///
/// Backed by a `Vec<(String, i64)>` in declaration order. Every mutable
/// access is logged so tests can assert which species the code under test
/// touched.
#[derive(Default)]
pub struct MockSpeciesStore {
    counts: Vec<(String, i64)>,
    touched: Vec<String>,
}

impl MockSpeciesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a species with an initial count.
    pub fn with(mut self, key: &str, count: i64) -> Self {
        self.insert(key, count);
        self
    }

    /// Declare or overwrite a species without logging a write.
    pub fn insert(&mut self, key: &str, count: i64) {
        match self.counts.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = count,
            None => self.counts.push((key.to_string(), count)),
        }
    }

    /// Keys handed out through [`SpeciesWriter::count_mut`], in order.
    pub fn touched(&self) -> &[String] {
        &self.touched
    }

    /// Whether `key` was handed out for writing.
    pub fn was_touched(&self, key: &str) -> bool {
        self.touched.iter().any(|k| k == key)
    }

    /// Forget the write log.
    pub fn clear_touched(&mut self) {
        self.touched.clear();
    }
}

impl SpeciesReader for MockSpeciesStore {
    fn count(&self, key: &str) -> Option<i64> {
        self.counts.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    fn species_len(&self) -> usize {
        self.counts.len()
    }

    fn for_each_species(&self, f: &mut dyn FnMut(&str, i64)) {
        for (k, v) in &self.counts {
            f(k, *v);
        }
    }
}

impl SpeciesWriter for MockSpeciesStore {
    fn count_mut(&mut self, key: &str) -> Option<&mut i64> {
        let slot = self.counts.iter_mut().find(|(k, _)| k == key)?;
        self.touched.push(key.to_string());
        Some(&mut slot.1)
    }
}

/// Hook that records the time and a species count at every boundary.
pub struct RecordingHook {
    pub species: String,
    pub calls: Vec<(f64, i64)>,
}

impl RecordingHook {
    pub fn new(species: &str) -> Self {
        Self {
            species: species.to_string(),
            calls: Vec::new(),
        }
    }

    pub fn times(&self) -> Vec<f64> {
        self.calls.iter().map(|&(t, _)| t).collect()
    }
}

impl CommunicationHook for RecordingHook {
    fn communicate(&mut self, time: f64, network: &mut CmeNetwork) -> Result<(), SimError> {
        let n = network.count(&self.species).unwrap_or(0);
        self.calls.push((time, n));
        Ok(())
    }
}

/// Hook that succeeds `succeed_count` times, then fails.
pub struct FailingHook {
    pub succeed_count: usize,
    pub calls: usize,
}

impl FailingHook {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            calls: 0,
        }
    }
}

impl CommunicationHook for FailingHook {
    fn communicate(&mut self, time: f64, _network: &mut CmeNetwork) -> Result<(), SimError> {
        self.calls += 1;
        if self.calls > self.succeed_count {
            Err(SimError::Hook {
                reason: format!("FailingHook: failing at call {} (t={time})", self.calls),
            })
        } else {
            Ok(())
        }
    }
}
