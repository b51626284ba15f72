//! Automation tracks, clips and points.

use serde::Serialize;
use serde_json::{json, Value};

use super::validate;
use crate::error::ModelError;

/// Interpolation between automation points (`prog` attribute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Progression {
    #[default]
    Discrete = 0,
    Linear = 1,
    Cubic = 2,
}

impl Progression {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Codes above 2 are treated as cubic.
    pub fn from_code(code: i64) -> Self {
        match code {
            i64::MIN..=0 => Progression::Discrete,
            1 => Progression::Linear,
            _ => Progression::Cubic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Progression::Discrete => "discrete",
            Progression::Linear => "linear",
            Progression::Cubic => "cubic",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ModelError> {
        match name.trim().to_lowercase().as_str() {
            "discrete" => Ok(Progression::Discrete),
            "linear" => Ok(Progression::Linear),
            "cubic" | "cubic_hermite" => Ok(Progression::Cubic),
            _ => Err(ModelError::UnknownName {
                table: "progression",
                name: name.to_string(),
            }),
        }
    }
}

/// One automation point; `time` is in beats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationPoint {
    pub time: f64,
    pub value: f64,
    /// Value after a discrete jump at this point.
    pub out_value: Option<f64>,
    pub in_tangent: f64,
    pub out_tangent: f64,
}

impl AutomationPoint {
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            out_value: None,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }
}

/// An automation clip (`automationpattern`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationClip {
    id: usize,
    pub name: String,
    pub position: u32,
    length: u32,
    pub progression: Progression,
    tension: f64,
    pub muted: bool,
    points: Vec<AutomationPoint>,
    /// Id of the automated object, in the legacy linkage format.
    pub object_id: Option<String>,
}

impl AutomationClip {
    pub fn new(name: impl Into<String>, position: u32, length: u32) -> Result<Self, ModelError> {
        Ok(Self {
            id: 0,
            name: name.into(),
            position,
            length: validate::within("clip length", length, 1..=u32::MAX, ">= 1")?,
            progression: Progression::default(),
            tension: 1.0,
            muted: false,
            points: Vec::new(),
            object_id: None,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn set_length(&mut self, length: u32) -> Result<(), ModelError> {
        self.length = validate::within("clip length", length, 1..=u32::MAX, ">= 1")?;
        Ok(())
    }

    pub fn tension(&self) -> f64 {
        self.tension
    }

    pub fn set_tension(&mut self, tension: f64) -> Result<(), ModelError> {
        self.tension = validate::within("tension", tension, 0.0..=1.0, "0.0..=1.0")?;
        Ok(())
    }

    pub fn points(&self) -> &[AutomationPoint] {
        &self.points
    }

    /// Insert a point, replacing any existing point at the same time.
    pub fn add_point(&mut self, point: AutomationPoint) {
        self.points.retain(|p| p.time != point.time);
        let index = self.points.partition_point(|p| p.time < point.time);
        self.points.insert(index, point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn describe(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "position": self.position,
            "length": self.length,
            "progression": self.progression.name(),
            "tension": self.tension,
            "muted": self.muted,
            "point_count": self.points.len(),
            "object_id": self.object_id,
        })
    }
}

/// Automation track payload: an ordered list of clips with dense ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutomationTrack {
    clips: Vec<AutomationClip>,
}

impl AutomationTrack {
    pub fn clips(&self) -> &[AutomationClip] {
        &self.clips
    }

    /// Append a clip and return its id.
    pub fn add_clip(&mut self, mut clip: AutomationClip) -> usize {
        let id = self.clips.len();
        clip.id = id;
        self.clips.push(clip);
        id
    }

    pub fn clip(&self, id: usize) -> Result<&AutomationClip, ModelError> {
        self.clips.get(id).ok_or(ModelError::ClipNotFound(id))
    }

    pub fn clip_mut(&mut self, id: usize) -> Result<&mut AutomationClip, ModelError> {
        self.clips.get_mut(id).ok_or(ModelError::ClipNotFound(id))
    }

    pub fn remove_clip(&mut self, id: usize) -> Result<AutomationClip, ModelError> {
        if id >= self.clips.len() {
            return Err(ModelError::ClipNotFound(id));
        }
        let clip = self.clips.remove(id);
        for (i, c) in self.clips.iter_mut().enumerate() {
            c.id = i;
        }
        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_point_replaces_same_time_and_sorts() {
        let mut clip = AutomationClip::new("Cutoff", 0, 4).unwrap();
        clip.add_point(AutomationPoint::new(4.0, 0.5));
        clip.add_point(AutomationPoint::new(0.0, 0.0));
        clip.add_point(AutomationPoint::new(2.0, 0.2));
        clip.add_point(AutomationPoint::new(4.0, 1.0));

        let times: Vec<f64> = clip.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 2.0, 4.0]);
        assert_eq!(clip.points()[2].value, 1.0);
    }

    #[test]
    fn clip_ids_are_dense() {
        let mut track = AutomationTrack::default();
        for name in ["a", "b", "c"] {
            track.add_clip(AutomationClip::new(name, 0, 1).unwrap());
        }
        track.remove_clip(0).unwrap();
        let ids: Vec<usize> = track.clips().iter().map(AutomationClip::id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(track.clip(1).unwrap().name, "c");
        assert!(matches!(track.remove_clip(5), Err(ModelError::ClipNotFound(5))));
    }

    #[test]
    fn progression_codes() {
        assert_eq!(Progression::from_code(1), Progression::Linear);
        assert_eq!(Progression::from_code(9), Progression::Cubic);
        assert_eq!(Progression::parse("cubic").unwrap().code(), 2);
    }

    #[test]
    fn tension_range() {
        let mut clip = AutomationClip::new("x", 0, 1).unwrap();
        assert!(clip.set_tension(1.5).is_err());
        assert!(AutomationClip::new("x", 0, 0).is_err());
    }
}
