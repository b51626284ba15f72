pub mod automation;
pub mod bb;
pub mod effects;
pub mod filters;
pub mod patterns;
pub mod project;
pub mod render;
pub mod sf2;
pub mod synths;
pub mod theory;
pub mod tracks;
pub mod versioning;

use std::sync::Arc;

use lmms_project::Project;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, tool_router, ServerHandler};
use serde_json::{json, Value};

use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::store::ProjectStore;

use automation::{
    AddAutomationClipParams, AddAutomationPointParams, AddAutomationTrackParams, ClipParams,
    CreateAutomationLfoParams, CreateAutomationRampParams, LinkAutomationParams, SetAutomationPointsParams,
};
use bb::{AddBbInstrumentParams, AddBbTrackParams, BbRowParams, BbTrackParams, SetBbPatternParams, SetBbStepsParams};
use effects::{AddEffectParams, AddWobbleChainParams, EffectParams, SetEffectParamsParams};
use filters::{SetFilterEnvelopeParams, SetFilterLfoParams, SetTrackFilterParams, SetTrackPitchParams};
use patterns::{AddChordParams, AddNotesParams, AddScaleRunParams, CreatePatternParams, PatternParams};
use project::{CreateProjectParams, ProjectPathParams, SetProjectSettingsParams};
use render::RenderProjectParams;
use sf2::{AddSf2TrackParams, SetSf2EffectsParams, SetSf2PatchParams};
use synths::{
    AddKickerParams, AddMonstroParams, AddTripleOscillatorParams, SetKickerParams, SetModulationParams,
    SetOscillatorParams,
};
use theory::{BuildChordParams, BuildScaleParams, ChordProgressionParams};
use tracks::{
    AddInstrumentTrackParams, AddSampleTrackParams, SetTrackMuteParams, SetTrackPanParams, SetTrackSoloParams,
    SetTrackVolumeParams, TrackParams,
};
use versioning::{ListVersionsParams, RestoreVersionParams, SaveVersionParams};

type ToolResult = Result<CallToolResult, rmcp::ErrorData>;

/// Wrap mutation details in the `{"status": "success", ...}` envelope.
pub(crate) fn success(details: Value) -> Value {
    let mut out = json!({ "status": "success" });
    if let (Some(out), Value::Object(details)) = (out.as_object_mut(), details) {
        out.extend(details);
    }
    out
}

/// Turn a tool outcome into MCP content. Failures become error results whose
/// text starts with `Error:`.
fn respond(result: Result<Value, ToolError>) -> ToolResult {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string()),
        )])),
        Err(e) => {
            tracing::warn!(error = %e, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(format!("Error: {e}"))]))
        }
    }
}

#[derive(Clone)]
pub struct LmmsMcp {
    tool_router: ToolRouter<Self>,
    config: Arc<ServerConfig>,
    store: Arc<ProjectStore>,
}

impl LmmsMcp {
    /// Access the tool router for testing/introspection.
    #[allow(dead_code)]
    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Decode, edit and re-encode the project at `path` under its lock.
    async fn edit(
        &self,
        path: &str,
        f: impl FnOnce(&mut Project) -> Result<Value, ToolError>,
    ) -> ToolResult {
        respond(self.store.modify(&self.config.resolve(path), f).await)
    }

    async fn create(&self, params: CreateProjectParams) -> Result<Value, ToolError> {
        let path = self.config.resolve(&params.path);
        let project = project::new_project(&path, &params)?;
        self.store
            .create(&path, &project, params.overwrite.unwrap_or(false))
            .await?;
        Ok(success(json!({
            "path": path.display().to_string(),
            "project": project.describe(),
        })))
    }

    async fn view(&self, path: &str, f: impl FnOnce(&Project) -> Result<Value, ToolError>) -> ToolResult {
        respond(self.store.read(&self.config.resolve(path), f).await)
    }
}

#[tool_router]
impl LmmsMcp {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            store: Arc::new(ProjectStore::new()),
        }
    }

    // ── Project ────────────────────────────────────────────

    /// Create a new empty LMMS project. Use a .mmpz extension for a compressed file or .mmp for plain XML.
    #[rmcp::tool]
    async fn create_project(&self, Parameters(params): Parameters<CreateProjectParams>) -> ToolResult {
        respond(self.create(params).await)
    }

    /// Describe a project: tempo, time signature, master settings and a readable summary of every track.
    #[rmcp::tool]
    async fn describe_project(&self, Parameters(params): Parameters<ProjectPathParams>) -> ToolResult {
        self.view(&params.path, project::describe_project).await
    }

    /// Change project tempo, time signature, master volume or master pitch. Unset fields keep their value.
    #[rmcp::tool]
    async fn set_project_settings(&self, Parameters(params): Parameters<SetProjectSettingsParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| project::set_project_settings(p, params)).await
    }

    /// Return the raw XML of a project file, decompressing .mmpz first.
    #[rmcp::tool]
    async fn dump_project_xml(&self, Parameters(params): Parameters<ProjectPathParams>) -> ToolResult {
        match self.store.read_xml(&self.config.resolve(&params.path)).await {
            Ok(xml) => Ok(CallToolResult::success(vec![Content::text(xml)])),
            Err(e) => respond(Err(e)),
        }
    }

    // ── Tracks ─────────────────────────────────────────────

    /// List every track with its id, kind, name, volume, pan, mute and solo state.
    #[rmcp::tool]
    async fn list_tracks(&self, Parameters(params): Parameters<ProjectPathParams>) -> ToolResult {
        self.view(&params.path, tracks::list_tracks).await
    }

    /// Add an instrument track. The instrument defaults to tripleoscillator; kicker, monstro and sf2player get their default settings.
    #[rmcp::tool]
    async fn add_instrument_track(&self, Parameters(params): Parameters<AddInstrumentTrackParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| tracks::add_instrument_track(p, params)).await
    }

    /// Add a sample track that plays an audio file.
    #[rmcp::tool]
    async fn add_sample_track(&self, Parameters(params): Parameters<AddSampleTrackParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| tracks::add_sample_track(p, params)).await
    }

    /// Remove a track. Later tracks shift down by one id.
    #[rmcp::tool]
    async fn remove_track(&self, Parameters(params): Parameters<TrackParams>) -> ToolResult {
        self.edit(&params.path, |p| tracks::remove_track(p, params.track_id)).await
    }

    /// Set a track's volume, where 1.0 is unity.
    #[rmcp::tool]
    async fn set_track_volume(&self, Parameters(params): Parameters<SetTrackVolumeParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| tracks::set_track_volume(p, params)).await
    }

    /// Set a track's stereo pan from -1.0 (left) to 1.0 (right).
    #[rmcp::tool]
    async fn set_track_pan(&self, Parameters(params): Parameters<SetTrackPanParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| tracks::set_track_pan(p, params)).await
    }

    /// Mute or unmute a track.
    #[rmcp::tool]
    async fn set_track_mute(&self, Parameters(params): Parameters<SetTrackMuteParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| tracks::set_track_mute(p, params)).await
    }

    /// Solo or unsolo a track.
    #[rmcp::tool]
    async fn set_track_solo(&self, Parameters(params): Parameters<SetTrackSoloParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| tracks::set_track_solo(p, params)).await
    }

    // ── Patterns ───────────────────────────────────────────

    /// Create an empty note pattern on an instrument track at a bar position.
    #[rmcp::tool]
    async fn create_pattern(&self, Parameters(params): Parameters<CreatePatternParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| patterns::create_pattern(p, params)).await
    }

    /// Add notes to a pattern. Pitches are MIDI numbers or names like C4 or F#3; start and length are in beats. Either all notes are added or none.
    #[rmcp::tool]
    async fn add_notes(&self, Parameters(params): Parameters<AddNotesParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| patterns::add_notes(p, params)).await
    }

    /// Add a chord (maj, min, dom7, sus4, ...) built on a root pitch to a pattern.
    #[rmcp::tool]
    async fn add_chord(&self, Parameters(params): Parameters<AddChordParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| patterns::add_chord(p, params)).await
    }

    /// Add an ascending or descending scale run to a pattern, one note after another.
    #[rmcp::tool]
    async fn add_scale_run(&self, Parameters(params): Parameters<AddScaleRunParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| patterns::add_scale_run(p, params)).await
    }

    /// List the notes of a pattern with names, beat positions and velocities.
    #[rmcp::tool]
    async fn describe_pattern(&self, Parameters(params): Parameters<PatternParams>) -> ToolResult {
        self.view(&params.path, |p| patterns::describe_pattern(p, params.track_id, params.pattern_id))
            .await
    }

    /// Remove every note from a pattern but keep the pattern itself.
    #[rmcp::tool]
    async fn clear_pattern(&self, Parameters(params): Parameters<PatternParams>) -> ToolResult {
        self.edit(&params.path, |p| patterns::clear_pattern(p, params.track_id, params.pattern_id))
            .await
    }

    /// Delete a pattern from its track.
    #[rmcp::tool]
    async fn remove_pattern(&self, Parameters(params): Parameters<PatternParams>) -> ToolResult {
        self.edit(&params.path, |p| patterns::remove_pattern(p, params.track_id, params.pattern_id))
            .await
    }

    // ── Theory ─────────────────────────────────────────────

    /// Return the MIDI pitches and note names of a chord. Does not touch any project.
    #[rmcp::tool]
    async fn build_chord(&self, Parameters(params): Parameters<BuildChordParams>) -> ToolResult {
        respond(theory::build_chord(params))
    }

    /// Return the MIDI pitches and note names of a scale over one or more octaves.
    #[rmcp::tool]
    async fn build_scale(&self, Parameters(params): Parameters<BuildScaleParams>) -> ToolResult {
        respond(theory::build_scale(params))
    }

    /// Return the triads for scale degrees (1-based, e.g. [1, 5, 6, 4]) in a key.
    #[rmcp::tool]
    async fn chord_progression(&self, Parameters(params): Parameters<ChordProgressionParams>) -> ToolResult {
        respond(theory::chord_progression(params))
    }

    // ── Beat+Bassline ──────────────────────────────────────

    /// Add a Beat+Bassline track: a step sequencer whose rows each hold an instrument.
    #[rmcp::tool]
    async fn add_bb_track(&self, Parameters(params): Parameters<AddBbTrackParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| bb::add_bb_track(p, params)).await
    }

    /// Add an instrument row to a Beat+Bassline track. Use audiofileprocessor with sample_path for drum samples.
    #[rmcp::tool]
    async fn add_bb_instrument(&self, Parameters(params): Parameters<AddBbInstrumentParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| bb::add_bb_instrument(p, params)).await
    }

    /// Remove an instrument row from a Beat+Bassline track.
    #[rmcp::tool]
    async fn remove_bb_instrument(&self, Parameters(params): Parameters<BbRowParams>) -> ToolResult {
        self.edit(&params.path, |p| bb::remove_bb_instrument(p, params.track_id, params.instrument_id))
            .await
    }

    /// Replace a row's active steps with a list of step indices (0-based).
    #[rmcp::tool]
    async fn set_bb_steps(&self, Parameters(params): Parameters<SetBbStepsParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| bb::set_bb_steps(p, params)).await
    }

    /// Replace a row's steps from a pattern string where x or X is a hit and anything else a rest, e.g. "x...x...x...x...".
    #[rmcp::tool]
    async fn set_bb_pattern(&self, Parameters(params): Parameters<SetBbPatternParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| bb::set_bb_pattern(p, params)).await
    }

    /// Turn off every step in a Beat+Bassline row.
    #[rmcp::tool]
    async fn clear_bb_row(&self, Parameters(params): Parameters<BbRowParams>) -> ToolResult {
        self.edit(&params.path, |p| bb::clear_bb_row(p, params.track_id, params.instrument_id))
            .await
    }

    /// Show a Beat+Bassline track as a step grid, one line per instrument row.
    #[rmcp::tool]
    async fn describe_bb_track(&self, Parameters(params): Parameters<BbTrackParams>) -> ToolResult {
        self.view(&params.path, |p| bb::describe_bb_track(p, params.track_id)).await
    }

    // ── Automation ─────────────────────────────────────────

    /// Add an empty automation track.
    #[rmcp::tool]
    async fn add_automation_track(&self, Parameters(params): Parameters<AddAutomationTrackParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| automation::add_automation_track(p, params)).await
    }

    /// Add an automation clip to an automation track. Progression is discrete, linear or cubic (default linear).
    #[rmcp::tool]
    async fn add_automation_clip(&self, Parameters(params): Parameters<AddAutomationClipParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| automation::add_automation_clip(p, params)).await
    }

    /// Add or replace one automation point; time is in beats from the clip start.
    #[rmcp::tool]
    async fn add_automation_point(&self, Parameters(params): Parameters<AddAutomationPointParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| automation::add_automation_point(p, params)).await
    }

    /// Replace all points of an automation clip.
    #[rmcp::tool]
    async fn set_automation_points(&self, Parameters(params): Parameters<SetAutomationPointsParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| automation::set_automation_points(p, params)).await
    }

    /// Fill an automation clip with a straight ramp between two values, for risers and fades.
    #[rmcp::tool]
    async fn create_automation_ramp(&self, Parameters(params): Parameters<CreateAutomationRampParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| automation::create_automation_ramp(p, params)).await
    }

    /// Fill an automation clip with a sine LFO between two values, for wobbles and sweeps.
    #[rmcp::tool]
    async fn create_automation_lfo(&self, Parameters(params): Parameters<CreateAutomationLfoParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| automation::create_automation_lfo(p, params)).await
    }

    /// Remove every point from an automation clip.
    #[rmcp::tool]
    async fn clear_automation_clip(&self, Parameters(params): Parameters<ClipParams>) -> ToolResult {
        self.edit(&params.path, |p| automation::clear_automation_clip(p, params.track_id, params.clip_id))
            .await
    }

    /// Point an automation clip at a parameter of another track, e.g. vol, pan or a filter knob.
    #[rmcp::tool]
    async fn link_automation(&self, Parameters(params): Parameters<LinkAutomationParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| automation::link_automation(p, params)).await
    }

    /// List an automation track's clips with their points and targets.
    #[rmcp::tool]
    async fn describe_automation_track(&self, Parameters(params): Parameters<TrackParams>) -> ToolResult {
        self.view(&params.path, |p| automation::describe_automation_track(p, params.track_id))
            .await
    }

    // ── Effects ────────────────────────────────────────────

    /// List the built-in effects with their default parameters, plus the plugin host effects.
    #[rmcp::tool]
    async fn list_available_effects(&self) -> ToolResult {
        respond(effects::list_available_effects())
    }

    /// Append an effect to an instrument track's effect chain.
    #[rmcp::tool]
    async fn add_effect(&self, Parameters(params): Parameters<AddEffectParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| effects::add_effect(p, params)).await
    }

    /// Remove an effect from a track's chain by index.
    #[rmcp::tool]
    async fn remove_effect(&self, Parameters(params): Parameters<EffectParams>) -> ToolResult {
        self.edit(&params.path, |p| effects::remove_effect(p, params.track_id, params.effect_index))
            .await
    }

    /// Change an effect's parameters, wet mix or enabled state.
    #[rmcp::tool]
    async fn set_effect_params(&self, Parameters(params): Parameters<SetEffectParamsParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| effects::set_effect_params(p, params)).await
    }

    /// List the effect chain of an instrument track.
    #[rmcp::tool]
    async fn list_track_effects(&self, Parameters(params): Parameters<TrackParams>) -> ToolResult {
        self.view(&params.path, |p| effects::list_track_effects(p, params.track_id)).await
    }

    /// Append a dualfilter, waveshaper and compressor chain tuned for wobble bass.
    #[rmcp::tool]
    async fn add_wobble_chain(&self, Parameters(params): Parameters<AddWobbleChainParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| effects::add_wobble_chain(p, params)).await
    }

    // ── Filters ────────────────────────────────────────────

    /// List the instrument filter types with their codes.
    #[rmcp::tool]
    async fn list_filter_types(&self) -> ToolResult {
        respond(filters::list_filter_types())
    }

    /// Configure an instrument track's built-in filter: type, cutoff, resonance and envelope amount.
    #[rmcp::tool]
    async fn set_track_filter(&self, Parameters(params): Parameters<SetTrackFilterParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| filters::set_track_filter(p, params)).await
    }

    /// Set the ADSR envelope for volume, cutoff or resonance on an instrument track.
    #[rmcp::tool]
    async fn set_filter_envelope(&self, Parameters(params): Parameters<SetFilterEnvelopeParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| filters::set_filter_envelope(p, params)).await
    }

    /// Set the LFO for volume, cutoff or resonance on an instrument track.
    #[rmcp::tool]
    async fn set_filter_lfo(&self, Parameters(params): Parameters<SetFilterLfoParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| filters::set_filter_lfo(p, params)).await
    }

    /// Transpose an instrument track by up to 24 semitones either way.
    #[rmcp::tool]
    async fn set_track_pitch(&self, Parameters(params): Parameters<SetTrackPitchParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| filters::set_track_pitch(p, params)).await
    }

    // ── Synths ─────────────────────────────────────────────

    /// Add a TripleOscillator track with per-oscillator waveform, volume and coarse detune.
    #[rmcp::tool]
    async fn add_tripleoscillator_track(&self, Parameters(params): Parameters<AddTripleOscillatorParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| synths::add_tripleoscillator_track(p, params)).await
    }

    /// Change one oscillator (1-3) of a TripleOscillator track.
    #[rmcp::tool]
    async fn set_oscillator(&self, Parameters(params): Parameters<SetOscillatorParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| synths::set_oscillator(p, params)).await
    }

    /// Set how TripleOscillator combines oscillators 1+2 and 2+3: pm, am, mix, sync or fm.
    #[rmcp::tool]
    async fn set_modulation(&self, Parameters(params): Parameters<SetModulationParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| synths::set_modulation(p, params)).await
    }

    /// Add a Kicker drum synth track.
    #[rmcp::tool]
    async fn add_kicker_track(&self, Parameters(params): Parameters<AddKickerParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| synths::add_kicker_track(p, params)).await
    }

    /// Change the settings of a Kicker track.
    #[rmcp::tool]
    async fn set_kicker_params(&self, Parameters(params): Parameters<SetKickerParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| synths::set_kicker_params(p, params)).await
    }

    /// Add a Monstro synth track.
    #[rmcp::tool]
    async fn add_monstro_track(&self, Parameters(params): Parameters<AddMonstroParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| synths::add_monstro_track(p, params)).await
    }

    /// List the oscillator waveforms and modulation algorithms with their codes.
    #[rmcp::tool]
    async fn list_waveforms(&self) -> ToolResult {
        respond(synths::list_waveforms())
    }

    // ── SoundFont ──────────────────────────────────────────

    /// Add an sf2player track that plays a SoundFont bank and patch.
    #[rmcp::tool]
    async fn add_sf2_track(&self, Parameters(params): Parameters<AddSf2TrackParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| sf2::add_sf2_track(p, params)).await
    }

    /// Switch an sf2player track to another patch and optionally bank.
    #[rmcp::tool]
    async fn set_sf2_patch(&self, Parameters(params): Parameters<SetSf2PatchParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| sf2::set_sf2_patch(p, params)).await
    }

    /// Change an sf2player track's built-in reverb and chorus.
    #[rmcp::tool]
    async fn set_sf2_effects(&self, Parameters(params): Parameters<SetSf2EffectsParams>) -> ToolResult {
        let path = params.path.clone();
        self.edit(&path, |p| sf2::set_sf2_effects(p, params)).await
    }

    /// Show an sf2player track's SoundFont, bank, patch, gain, reverb and chorus.
    #[rmcp::tool]
    async fn describe_sf2_track(&self, Parameters(params): Parameters<TrackParams>) -> ToolResult {
        self.view(&params.path, |p| sf2::describe_sf2_track(p, params.track_id)).await
    }

    /// List the 128 General MIDI programs grouped by family.
    #[rmcp::tool]
    async fn list_gm_patches(&self) -> ToolResult {
        respond(sf2::list_gm_patches())
    }

    // ── Render ─────────────────────────────────────────────

    /// Report the version of the LMMS binary the server would render with.
    #[rmcp::tool]
    async fn lmms_version(&self) -> ToolResult {
        respond(render::lmms_version(&self.config).await)
    }

    /// Render a project to wav, ogg, mp3 or flac with LMMS in headless mode.
    #[rmcp::tool]
    async fn render_project(&self, Parameters(params): Parameters<RenderProjectParams>) -> ToolResult {
        respond(render::render_project(&self.config, &self.store, params).await)
    }

    // ── Versioning ─────────────────────────────────────────

    /// Commit the project file to git in its directory, optionally tagging the commit.
    #[rmcp::tool]
    async fn save_version(&self, Parameters(params): Parameters<SaveVersionParams>) -> ToolResult {
        respond(versioning::save_version(&self.config, &self.store, params).await)
    }

    /// List recent git commits of the project file.
    #[rmcp::tool]
    async fn list_versions(&self, Parameters(params): Parameters<ListVersionsParams>) -> ToolResult {
        respond(versioning::list_versions(&self.config, params).await)
    }

    /// Restore the project file from a commit hash or tag. The current state is committed first.
    #[rmcp::tool]
    async fn restore_version(&self, Parameters(params): Parameters<RestoreVersionParams>) -> ToolResult {
        respond(versioning::restore_version(&self.config, &self.store, params).await)
    }
}

#[tool_handler]
impl ServerHandler for LmmsMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "LMMS project tools. Create and edit .mmp/.mmpz projects directly: \
                 add tracks and patterns, program Beat+Bassline steps, automate \
                 parameters, shape synths and effects, then render with LMMS and \
                 keep versions in git. Start with describe_project or create_project. \
                 Note pitches accept MIDI numbers or names like C4; times are in beats."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rmcp::model::RawContent;

    fn text(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            RawContent::Text(t) => t.text.as_str(),
            other => panic!("expected text content, got: {other:?}"),
        }
    }

    #[test]
    fn success_merges_details() {
        let out = success(json!({ "track_id": 3 }));
        assert_eq!(out, json!({ "status": "success", "track_id": 3 }));
    }

    #[test]
    fn errors_carry_prefix() {
        let result = respond(Err(ToolError::invalid("bad pitch"))).unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text(&result), "Error: bad pitch");
    }

    #[tokio::test]
    async fn edit_then_view_through_the_server() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = LmmsMcp::new(ServerConfig::new(dir.path()));

        let created = mcp
            .create_project(Parameters(serde_json::from_str(r#"{"path": "song.mmpz", "bpm": 128}"#).unwrap()))
            .await
            .unwrap();
        assert_eq!(created.is_error, Some(false));

        let again = mcp
            .create_project(Parameters(serde_json::from_str(r#"{"path": "song.mmpz"}"#).unwrap()))
            .await
            .unwrap();
        assert_eq!(again.is_error, Some(true));
        assert!(text(&again).contains("already exists"));

        mcp.add_instrument_track(Parameters(
            serde_json::from_str(r#"{"path": "song.mmpz", "name": "Lead"}"#).unwrap(),
        ))
        .await
        .unwrap();

        let listing = mcp
            .list_tracks(Parameters(serde_json::from_str(r#"{"path": "song.mmpz"}"#).unwrap()))
            .await
            .unwrap();
        let listing: Value = serde_json::from_str(text(&listing)).unwrap();
        assert_eq!(listing["count"], 1);

        let xml = mcp
            .dump_project_xml(Parameters(serde_json::from_str(r#"{"path": "song.mmpz"}"#).unwrap()))
            .await
            .unwrap();
        assert!(text(&xml).contains("bpm"));
        assert!(text(&xml).contains("Lead"));
    }
}
