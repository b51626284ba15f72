//! Melodic patterns (clips of notes on a track's timeline).

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use super::validate;
use super::Note;
use crate::error::ModelError;

/// A positioned clip of notes. Length is display metadata; notes may run past it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    id: usize,
    pub name: String,
    position: u32,
    length: u32,
    notes: Vec<Note>,
}

impl Pattern {
    /// Create an empty pattern at `position` bars spanning `length` bars.
    pub fn new(name: impl Into<String>, position: u32, length: u32) -> Result<Self, ModelError> {
        Ok(Self {
            id: 0,
            name: name.into(),
            position,
            length: validate::within("length", length, 1..=u32::MAX, ">= 1")?,
            notes: Vec::new(),
        })
    }

    /// Track-local id, reassigned when sibling patterns are added or removed.
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// Position in bars.
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Length in bars.
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    pub fn set_length(&mut self, length: u32) -> Result<(), ModelError> {
        self.length = validate::within("length", length, 1..=u32::MAX, ">= 1")?;
        Ok(())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    pub fn extend_notes(&mut self, notes: impl IntoIterator<Item = Note>) {
        self.notes.extend(notes);
    }

    /// Remove the note at `index`, if any.
    pub fn remove_note(&mut self, index: usize) -> Option<Note> {
        (index < self.notes.len()).then(|| self.notes.remove(index))
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Notes grouped by start beat, in time order.
    fn notes_by_start(&self) -> Vec<(f64, Vec<&Note>)> {
        let mut groups: BTreeMap<u64, (f64, Vec<&Note>)> = BTreeMap::new();
        for note in &self.notes {
            groups
                .entry(note.start().to_bits())
                .or_insert_with(|| (note.start(), Vec::new()))
                .1
                .push(note);
        }
        // Non-negative f64 bit patterns sort like the values they encode.
        groups.into_values().collect()
    }

    /// Summary suitable for tool responses.
    pub fn describe(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "position": self.position,
            "length": self.length,
            "note_count": self.notes.len(),
        })
    }

    /// Human-readable listing; simultaneous notes are shown as a chord.
    pub fn to_description(&self) -> String {
        if self.notes.is_empty() {
            return format!(
                "Pattern '{}' at bar {}: empty ({} bars)",
                self.name, self.position, self.length
            );
        }

        let mut lines = vec![format!(
            "Pattern '{}' at bar {} ({} bars, {} notes):",
            self.name,
            self.position,
            self.length,
            self.notes.len()
        )];
        for (start, notes) in self.notes_by_start() {
            let length = notes[0].length();
            if let [note] = notes.as_slice() {
                lines.push(format!("  Beat {start}: {} (len: {length})", note.name()));
            } else {
                let names: Vec<String> = notes.iter().map(|n| n.name()).collect();
                lines.push(format!(
                    "  Beat {start}: [{}] (len: {length})",
                    names.join(", ")
                ));
            }
        }
        lines.join("\n")
    }
}
