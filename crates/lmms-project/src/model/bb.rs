//! Beat+Bassline step sequencer tracks.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use super::instrument::AUDIOFILEPROCESSOR;
use super::note::DEFAULT_VELOCITY;
use super::validate;
use crate::error::ModelError;

pub const DEFAULT_STEPS: u32 = 16;
const MAX_STEPS: u32 = 192;

/// An active step. Absent steps are off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BbStep {
    pub enabled: bool,
    pub velocity: u8,
}

/// One instrument row of a Beat+Bassline track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BbRow {
    id: usize,
    pub name: String,
    pub plugin: String,
    pub sample_path: Option<String>,
    volume: f64,
    pan: f64,
    pub muted: bool,
    num_steps: u32,
    steps: BTreeMap<u32, BbStep>,
}

impl BbRow {
    /// A sample-player row.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            plugin: AUDIOFILEPROCESSOR.to_string(),
            sample_path: None,
            volume: 1.0,
            pan: 0.0,
            muted: false,
            num_steps: DEFAULT_STEPS,
            steps: BTreeMap::new(),
        }
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = plugin.into();
        self
    }

    pub fn with_sample(mut self, path: impl Into<String>) -> Self {
        self.sample_path = Some(path.into());
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<(), ModelError> {
        self.volume = validate::at_least("row volume", volume, 0.0, ">= 0")?;
        Ok(())
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: f64) -> Result<(), ModelError> {
        self.pan = validate::pan("row pan", pan)?;
        Ok(())
    }

    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    pub(crate) fn set_num_steps(&mut self, steps: u32) -> Result<(), ModelError> {
        self.num_steps = validate::within("steps", steps, 1..=MAX_STEPS, "1..=192")?;
        Ok(())
    }

    pub fn steps(&self) -> &BTreeMap<u32, BbStep> {
        &self.steps
    }

    /// Enable or disable `step`. Disabling removes it from the sparse set.
    pub fn set_step(&mut self, step: u32, enabled: bool, velocity: u8) -> Result<(), ModelError> {
        let velocity = validate::within("step velocity", velocity, 0..=127, "0..=127")?;
        if enabled {
            self.steps.insert(step, BbStep { enabled, velocity });
        } else {
            self.steps.remove(&step);
        }
        Ok(())
    }

    pub fn enable(&mut self, step: u32) {
        self.steps.insert(
            step,
            BbStep {
                enabled: true,
                velocity: DEFAULT_VELOCITY,
            },
        );
    }

    pub fn clear_steps(&mut self) {
        self.steps.clear();
    }

    pub fn active_steps(&self) -> impl Iterator<Item = (u32, &BbStep)> + '_ {
        self.steps
            .iter()
            .filter(|(_, s)| s.enabled)
            .map(|(i, s)| (*i, s))
    }

    /// Step grid like `x...x...x...x...`.
    pub fn step_string(&self) -> String {
        (0..self.num_steps)
            .map(|i| match self.steps.get(&i) {
                Some(step) if step.enabled => 'x',
                _ => '.',
            })
            .collect()
    }

    pub fn describe(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "instrument": self.plugin,
            "sample_path": self.sample_path,
            "volume": self.volume,
            "pan": self.pan,
            "muted": self.muted,
            "num_steps": self.num_steps,
            "active_steps": self.active_steps().count(),
            "pattern": self.step_string(),
        })
    }
}

/// Beat+Bassline track payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatBassline {
    rows: Vec<BbRow>,
    num_steps: u32,
    /// Placement on the song timeline, in bars.
    pub position: u32,
    length: u32,
}

impl Default for BeatBassline {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            num_steps: DEFAULT_STEPS,
            position: 0,
            length: 4,
        }
    }
}

impl BeatBassline {
    pub fn rows(&self) -> &[BbRow] {
        &self.rows
    }

    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    /// Step count for rows added from now on; existing rows keep theirs.
    pub fn set_num_steps(&mut self, steps: u32) -> Result<(), ModelError> {
        self.num_steps = validate::within("steps", steps, 1..=MAX_STEPS, "1..=192")?;
        Ok(())
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn set_length(&mut self, length: u32) -> Result<(), ModelError> {
        self.length = validate::within("bb length", length, 1..=u32::MAX, ">= 1")?;
        Ok(())
    }

    /// Add a row, giving it the track's step count. Returns the row id.
    pub fn add_row(&mut self, mut row: BbRow) -> usize {
        let id = self.rows.len();
        row.id = id;
        row.num_steps = self.num_steps;
        self.rows.push(row);
        id
    }

    /// Add a row keeping its own step count, as read from a file.
    pub(crate) fn push_decoded_row(&mut self, mut row: BbRow) {
        row.id = self.rows.len();
        self.rows.push(row);
    }

    pub fn row(&self, id: usize) -> Result<&BbRow, ModelError> {
        self.rows.get(id).ok_or(ModelError::RowNotFound(id))
    }

    pub fn row_mut(&mut self, id: usize) -> Result<&mut BbRow, ModelError> {
        self.rows.get_mut(id).ok_or(ModelError::RowNotFound(id))
    }

    /// Case-insensitive lookup by row name.
    pub fn row_by_name(&self, name: &str) -> Option<&BbRow> {
        self.rows.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn remove_row(&mut self, id: usize) -> Result<BbRow, ModelError> {
        if id >= self.rows.len() {
            return Err(ModelError::RowNotFound(id));
        }
        let row = self.rows.remove(id);
        for (i, r) in self.rows.iter_mut().enumerate() {
            r.id = i;
        }
        Ok(row)
    }
}
