use std::collections::BTreeMap;

use lmms_project::model::{builtin_effect_defaults, builtin_effect_description, builtin_effect_names};
use lmms_project::{ChannelSettings, Effect, ModelError, ParamValue, Project};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::success;
use crate::error::ToolError;

/// Wrapper effects that load an external plugin.
const PLUGIN_EFFECTS: [(&str, &str); 3] = [
    ("ladspaeffect", "LADSPA plugin host; pass plugin_file and plugin_name in params"),
    ("lv2effect", "LV2 plugin host"),
    ("vsteffect", "VST plugin host"),
];

#[derive(Deserialize, JsonSchema)]
pub struct AddEffectParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Effect plugin name, e.g. dualfilter, reverbsc, compressor, ladspaeffect
    pub effect_name: String,
    /// Wet/dry mix, 0.0-1.0 (default 1.0)
    pub wet: Option<f64>,
    /// Effect parameters; unset parameters keep the built-in defaults
    pub params: Option<BTreeMap<String, Value>>,
}

#[derive(Deserialize, JsonSchema)]
pub struct EffectParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Position of the effect in the track's chain
    pub effect_index: usize,
}

#[derive(Deserialize, JsonSchema)]
pub struct SetEffectParamsParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Position of the effect in the track's chain
    pub effect_index: usize,
    /// Parameters to merge into the effect's current ones
    pub params: Option<BTreeMap<String, Value>>,
    /// New wet/dry mix, 0.0-1.0
    pub wet: Option<f64>,
    /// Enable or bypass the effect
    pub enabled: Option<bool>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddWobbleChainParams {
    /// Path to the .mmp or .mmpz project file
    pub path: String,
    /// Instrument track id
    pub track_id: usize,
    /// Filter cutoff in Hz (default 100)
    pub cutoff: Option<f64>,
    /// Filter resonance (default 0.8)
    pub resonance: Option<f64>,
    /// Distortion amount, 0.0-1.0 (default 0.5)
    pub distortion: Option<f64>,
}

fn param_value(key: &str, value: Value) -> Result<ParamValue, ToolError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(ParamValue::Number)
            .ok_or_else(|| ToolError::invalid(format!("parameter {key} is not a finite number"))),
        Value::Bool(b) => Ok(ParamValue::Number(if b { 1.0 } else { 0.0 })),
        Value::String(s) => Ok(ParamValue::parse(&s)),
        other => Err(ToolError::invalid(format!(
            "parameter {key} must be a number or string, got {other}"
        ))),
    }
}

fn param_map(params: BTreeMap<String, Value>) -> Result<BTreeMap<String, ParamValue>, ToolError> {
    params
        .into_iter()
        .map(|(k, v)| param_value(&k, v).map(|v| (k, v)))
        .collect()
}

/// JSON view of an effect with its defaults filled in.
pub fn describe_effect(index: usize, effect: &Effect) -> Value {
    let params: Map<String, Value> = effect
        .effective_params()
        .into_iter()
        .map(|(k, v)| (k, json!(v)))
        .collect();
    json!({
        "index": index,
        "name": effect.name,
        "enabled": effect.enabled,
        "wet": effect.wet(),
        "params": params,
        "plugin_file": effect.plugin_file,
        "plugin_name": effect.plugin_name,
    })
}

fn channel(project: &Project, track_id: usize) -> Result<&ChannelSettings, ToolError> {
    let track = project.track(track_id)?;
    track.kind().channel().ok_or_else(|| {
        ModelError::WrongTrackKind {
            track: track_id,
            actual: track.kind().label(),
            expected: "instrument",
        }
        .into()
    })
}

pub fn list_available_effects() -> Result<Value, ToolError> {
    let builtin: Map<String, Value> = builtin_effect_names()
        .map(|name| {
            let defaults = builtin_effect_defaults(name).unwrap_or_default();
            (
                name.to_string(),
                json!({
                    "description": builtin_effect_description(name).unwrap_or_default(),
                    "default_params": defaults,
                }),
            )
        })
        .collect();
    let plugins: Map<String, Value> = PLUGIN_EFFECTS
        .iter()
        .map(|(name, desc)| (name.to_string(), json!(desc)))
        .collect();
    Ok(json!({
        "builtin_effects": builtin,
        "plugin_effects": plugins,
    }))
}

pub fn add_effect(project: &mut Project, params: AddEffectParams) -> Result<Value, ToolError> {
    let name = params.effect_name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ToolError::invalid("effect_name must not be empty"));
    }
    let mut effect = Effect::new(name).with_wet(params.wet.unwrap_or(1.0))?;
    effect.params = param_map(params.params.unwrap_or_default())?;
    if effect.name == "ladspaeffect" {
        effect.plugin_file = effect.params.remove("plugin_file").map(|v| v.to_string());
        effect.plugin_name = effect.params.remove("plugin_name").map(|v| v.to_string());
    }

    let chain = &mut project.track_mut(params.track_id)?.channel_mut()?.effects;
    chain.push(effect);
    let index = chain.len() - 1;
    Ok(success(json!({
        "track_id": params.track_id,
        "effect_index": index,
        "effect": describe_effect(index, &chain[index]),
        "total_effects": chain.len(),
    })))
}

pub fn remove_effect(project: &mut Project, track_id: usize, index: usize) -> Result<Value, ToolError> {
    let channel = project.track_mut(track_id)?.channel_mut()?;
    let removed = channel.remove_effect(index)?;
    Ok(success(json!({
        "removed": removed.name,
        "remaining_effects": channel.effects.len(),
    })))
}

pub fn set_effect_params(project: &mut Project, params: SetEffectParamsParams) -> Result<Value, ToolError> {
    let updates = param_map(params.params.unwrap_or_default())?;
    let effect = project
        .track_mut(params.track_id)?
        .channel_mut()?
        .effect_mut(params.effect_index)?;
    if let Some(wet) = params.wet {
        effect.set_wet(wet)?;
    }
    effect.params.extend(updates);
    if let Some(enabled) = params.enabled {
        effect.enabled = enabled;
    }
    Ok(success(json!({
        "track_id": params.track_id,
        "effect": describe_effect(params.effect_index, effect),
    })))
}

pub fn list_track_effects(project: &Project, track_id: usize) -> Result<Value, ToolError> {
    let effects: Vec<Value> = channel(project, track_id)?
        .effects
        .iter()
        .enumerate()
        .map(|(i, e)| describe_effect(i, e))
        .collect();
    Ok(json!({
        "track_id": track_id,
        "track_name": project.track(track_id)?.name,
        "effect_count": effects.len(),
        "effects": effects,
    }))
}

/// Append dualfilter, waveshaper and compressor tuned for a wobble bass.
pub fn add_wobble_chain(project: &mut Project, params: AddWobbleChainParams) -> Result<Value, ToolError> {
    let cutoff = params.cutoff.unwrap_or(100.0);
    let resonance = params.resonance.unwrap_or(0.8);
    let distortion = params.distortion.unwrap_or(0.5);

    let filter = Effect::new("dualfilter")
        .with_param("cut1", cutoff)
        .with_param("res1", resonance)
        .with_param("gain1", 1.5)
        .with_param("enabled1", 1.0)
        .with_param("cut2", 14000.0)
        .with_param("res2", 0.0)
        .with_param("enabled2", 0.0)
        .with_param("mix", 0.0);
    let shaper = Effect::new("waveshaper")
        .with_wet(distortion)?
        .with_param("input", 1.0 + distortion)
        .with_param("output", 1.0)
        .with_param("clip", 1.0);
    let compressor = Effect::new("compressor")
        .with_param("threshold", -15.0)
        .with_param("ratio", 4.0)
        .with_param("attack", 5.0)
        .with_param("release", 50.0)
        .with_param("knee", 3.0)
        .with_param("makeupgain", 3.0);

    let chain = &mut project.track_mut(params.track_id)?.channel_mut()?.effects;
    chain.extend([filter, shaper, compressor]);
    Ok(success(json!({
        "track_id": params.track_id,
        "chain": "dualfilter -> waveshaper -> compressor",
        "settings": {
            "cutoff": cutoff,
            "resonance": resonance,
            "distortion": distortion,
        },
        "total_effects": chain.len(),
        "tip": "Add movement with set_filter_lfo on the same track",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmms_project::Track;
    use pretty_assertions::assert_eq;

    fn synth() -> Project {
        let mut project = Project::new("Demo");
        project.add_track(Track::instrument("Bass", "tripleoscillator"));
        project.add_track(Track::automation("Auto"));
        project
    }

    fn chain(project: &Project) -> &[Effect] {
        &channel(project, 0).unwrap().effects
    }

    #[test]
    fn add_effect_overlays_defaults() {
        let mut project = synth();
        let params: AddEffectParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "effect_name": "ReverbSC", "wet": 0.4,
                "params": {"size": 0.9}}"#,
        )
        .unwrap();
        let out = add_effect(&mut project, params).unwrap();
        assert_eq!(out["effect"]["name"], "reverbsc");
        assert_eq!(out["effect"]["params"]["size"], 0.9);
        assert_eq!(chain(&project)[0].wet(), 0.4);
        assert_eq!(chain(&project)[0].params.len(), 1);
    }

    #[test]
    fn ladspa_plugin_fields_leave_params() {
        let mut project = synth();
        let params: AddEffectParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "effect_name": "ladspaeffect",
                "params": {"plugin_file": "caps", "plugin_name": "Plate", "port04": 0.5}}"#,
        )
        .unwrap();
        add_effect(&mut project, params).unwrap();
        let effect = &chain(&project)[0];
        assert_eq!(effect.plugin_file.as_deref(), Some("caps"));
        assert_eq!(effect.plugin_name.as_deref(), Some("Plate"));
        assert_eq!(effect.params.keys().collect::<Vec<_>>(), vec!["port04"]);
    }

    #[test]
    fn wobble_chain_and_edits() {
        let mut project = synth();
        let params: AddWobbleChainParams =
            serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "distortion": 0.3}"#).unwrap();
        add_wobble_chain(&mut project, params).unwrap();
        let names: Vec<&str> = chain(&project).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["dualfilter", "waveshaper", "compressor"]);
        assert_eq!(chain(&project)[1].wet(), 0.3);

        let edit: SetEffectParamsParams = serde_json::from_str(
            r#"{"path": "a.mmp", "track_id": 0, "effect_index": 2, "params": {"ratio": 8}, "enabled": false}"#,
        )
        .unwrap();
        set_effect_params(&mut project, edit).unwrap();
        assert_eq!(chain(&project)[2].params["ratio"], ParamValue::Number(8.0));
        assert!(!chain(&project)[2].enabled);

        remove_effect(&mut project, 0, 0).unwrap();
        assert_eq!(list_track_effects(&project, 0).unwrap()["effect_count"], 2);
        assert!(remove_effect(&mut project, 0, 5).is_err());
    }

    #[test]
    fn effects_need_an_instrument_track() {
        let project = synth();
        assert!(list_track_effects(&project, 1).is_err());
        let listing = list_available_effects().unwrap();
        assert!(listing["builtin_effects"]["dualfilter"]["default_params"].is_object());
        assert!(listing["plugin_effects"]["ladspaeffect"].is_string());
    }
}
