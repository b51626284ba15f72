use lmms_mcp::config::ServerConfig;
use lmms_mcp::store::ProjectStore;
use lmms_mcp::tools::{automation, bb, patterns, project, tracks, LmmsMcp};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::path::Path;

const EXPECTED: [&str; 66] = [
    // Project
    "create_project",
    "describe_project",
    "set_project_settings",
    "dump_project_xml",
    // Tracks
    "list_tracks",
    "add_instrument_track",
    "add_sample_track",
    "remove_track",
    "set_track_volume",
    "set_track_pan",
    "set_track_mute",
    "set_track_solo",
    // Patterns
    "create_pattern",
    "add_notes",
    "add_chord",
    "add_scale_run",
    "describe_pattern",
    "clear_pattern",
    "remove_pattern",
    // Theory
    "build_chord",
    "build_scale",
    "chord_progression",
    // Beat+Bassline
    "add_bb_track",
    "add_bb_instrument",
    "remove_bb_instrument",
    "set_bb_steps",
    "set_bb_pattern",
    "clear_bb_row",
    "describe_bb_track",
    // Automation
    "add_automation_track",
    "add_automation_clip",
    "add_automation_point",
    "set_automation_points",
    "create_automation_ramp",
    "create_automation_lfo",
    "clear_automation_clip",
    "link_automation",
    "describe_automation_track",
    // Effects
    "list_available_effects",
    "add_effect",
    "remove_effect",
    "set_effect_params",
    "list_track_effects",
    "add_wobble_chain",
    // Filters
    "list_filter_types",
    "set_track_filter",
    "set_filter_envelope",
    "set_filter_lfo",
    "set_track_pitch",
    // Synths
    "add_tripleoscillator_track",
    "set_oscillator",
    "set_modulation",
    "add_kicker_track",
    "set_kicker_params",
    "add_monstro_track",
    "list_waveforms",
    // SoundFont
    "add_sf2_track",
    "set_sf2_patch",
    "set_sf2_effects",
    "describe_sf2_track",
    "list_gm_patches",
    // Render
    "lmms_version",
    "render_project",
    // Versioning
    "save_version",
    "list_versions",
    "restore_version",
];

/// Tools that take no arguments at all.
const PARAMETERLESS: [&str; 5] = [
    "list_available_effects",
    "list_filter_types",
    "list_waveforms",
    "list_gm_patches",
    "lmms_version",
];

fn server() -> LmmsMcp {
    LmmsMcp::new(ServerConfig::default())
}

/// All tools must be registered in the tool router.
#[test]
fn all_tools_registered() {
    let server = server();
    let tools = server.router().list_all();
    let names: HashSet<&str> = tools.iter().map(|t| t.name.as_ref()).collect();

    assert_eq!(
        tools.len(),
        EXPECTED.len(),
        "Expected {} tools, got {}: {:?}",
        EXPECTED.len(),
        tools.len(),
        names
    );
    for name in &EXPECTED {
        assert!(names.contains(name), "Missing tool: {name}");
    }
}

/// Every tool must have a non-empty description (from doc comments).
#[test]
fn all_tools_have_descriptions() {
    let server = server();
    for tool in &server.router().list_all() {
        let desc = tool.description.as_deref().unwrap_or("");
        assert!(!desc.is_empty(), "Tool '{}' has no description", tool.name);
    }
}

/// Tools that accept parameters must have a non-trivial input schema.
#[test]
fn parameterized_tools_have_input_schema() {
    let server = server();
    for tool in &server.router().list_all() {
        if PARAMETERLESS.contains(&tool.name.as_ref()) {
            continue;
        }
        let schema = serde_json::to_value(&*tool.input_schema).unwrap();
        let props = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .unwrap_or_else(|| panic!("Tool '{}' has no properties: {schema}", tool.name));
        assert!(!props.is_empty(), "Tool '{}' has empty properties", tool.name);
    }
}

/// Every project-bound tool names the project through `path`.
#[test]
fn project_tools_take_a_path() {
    let server = server();
    let pathless: HashSet<&str> = PARAMETERLESS
        .iter()
        .copied()
        .chain(["build_chord", "build_scale", "chord_progression"])
        .collect();
    for tool in &server.router().list_all() {
        if pathless.contains(tool.name.as_ref()) {
            continue;
        }
        let schema = serde_json::to_value(&*tool.input_schema).unwrap();
        let required = schema["required"].as_array().cloned().unwrap_or_default();
        assert!(
            required.iter().any(|r| r == "path"),
            "Tool '{}' does not require path: {schema}",
            tool.name
        );
    }
}

/// Parameter structs must deserialize correctly from JSON.
#[test]
fn param_deserialization() {
    use lmms_mcp::tools::effects::AddEffectParams;
    use lmms_mcp::tools::filters::SetTrackFilterParams;
    use lmms_mcp::tools::render::RenderProjectParams;
    use lmms_mcp::tools::synths::SetOscillatorParams;
    use lmms_mcp::tools::versioning::SaveVersionParams;

    let p: project::CreateProjectParams = serde_json::from_str(r#"{"path": "song.mmpz", "bpm": 140}"#).unwrap();
    assert_eq!(p.bpm, Some(140));
    assert!(p.overwrite.is_none());

    let p: patterns::AddNotesParams = serde_json::from_str(
        r#"{"path": "a.mmp", "track_id": 0, "pattern_id": 1,
            "notes": [{"pitch": "C4", "start": 0, "length": 1}, {"pitch": 64, "start": 1, "length": 0.5, "velocity": 90}]}"#,
    )
    .unwrap();
    assert_eq!(p.notes.len(), 2);
    assert_eq!(p.notes[1].velocity, Some(90));

    let p: bb::SetBbStepsParams =
        serde_json::from_str(r#"{"path": "a.mmp", "track_id": 2, "instrument_id": 0, "steps": [0, 4, 8, 12]}"#)
            .unwrap();
    assert_eq!(p.steps, vec![0, 4, 8, 12]);

    let p: automation::AddAutomationClipParams =
        serde_json::from_str(r#"{"path": "a.mmp", "track_id": 1, "progression": "cubic"}"#).unwrap();
    assert_eq!(p.progression.as_deref(), Some("cubic"));

    let p: AddEffectParams = serde_json::from_str(
        r#"{"path": "a.mmp", "track_id": 0, "effect_name": "reverbsc", "params": {"size": 0.8, "mode": "hall"}}"#,
    )
    .unwrap();
    assert_eq!(p.params.map(|m| m.len()), Some(2));

    let p: SetTrackFilterParams =
        serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "filter_type": "lowpass", "cutoff": 800}"#).unwrap();
    assert_eq!(p.cutoff, Some(800.0));
    let p: SetTrackFilterParams =
        serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "filter_type": 3}"#).unwrap();
    assert!(p.filter_type.is_some());

    let p: SetOscillatorParams =
        serde_json::from_str(r#"{"path": "a.mmp", "track_id": 0, "osc_num": 2, "wave": "square"}"#).unwrap();
    assert_eq!(p.osc_num, 2);

    let p: RenderProjectParams = serde_json::from_str(r#"{"path": "a.mmp", "format": "ogg"}"#).unwrap();
    assert_eq!(p.format.as_deref(), Some("ogg"));
    assert!(p.sample_rate.is_none());

    let p: SaveVersionParams = serde_json::from_str(r#"{"path": "a.mmp", "tag": "v1"}"#).unwrap();
    assert_eq!(p.tag.as_deref(), Some("v1"));
    assert!(p.message.is_none());
}

async fn new_song(store: &ProjectStore, path: &Path) {
    let params = project::CreateProjectParams {
        path: path.display().to_string(),
        name: None,
        bpm: None,
        time_sig_num: None,
        time_sig_den: None,
        overwrite: None,
    };
    let song = project::new_project(path, &params).unwrap();
    store.create(path, &song, false).await.unwrap();
}

/// Beat+Bassline steps survive being written to and re-read from disk.
#[tokio::test]
async fn bb_steps_persist_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beat.mmpz");
    let store = ProjectStore::new();
    new_song(&store, &path).await;

    store
        .modify(&path, |p| {
            bb::add_bb_track(p, serde_json::from_str(r#"{"path": "beat.mmpz"}"#).unwrap())?;
            bb::add_bb_instrument(
                p,
                serde_json::from_str(r#"{"path": "beat.mmpz", "track_id": 0, "name": "Kick"}"#).unwrap(),
            )?;
            bb::set_bb_pattern(
                p,
                serde_json::from_str(
                    r#"{"path": "beat.mmpz", "track_id": 0, "instrument_id": 0, "pattern": "x...x...x...x..."}"#,
                )
                .unwrap(),
            )
        })
        .await
        .unwrap();

    let described = store.read(&path, |p| bb::describe_bb_track(p, 0)).await.unwrap();
    assert_eq!(described["num_steps"], 16);
    assert!(described["grid"].as_str().unwrap().contains("x...x...x...x..."));
}

/// Chords and scale runs land in the pattern on disk in order.
#[tokio::test]
async fn notes_persist_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.mmp");
    let store = ProjectStore::new();
    new_song(&store, &path).await;

    store
        .modify(&path, |p| {
            tracks::add_instrument_track(p, serde_json::from_str(r#"{"path": "keys.mmp", "name": "Keys"}"#).unwrap())?;
            patterns::create_pattern(
                p,
                serde_json::from_str(r#"{"path": "keys.mmp", "track_id": 0, "name": "Verse"}"#).unwrap(),
            )?;
            patterns::add_chord(
                p,
                serde_json::from_str(
                    r#"{"path": "keys.mmp", "track_id": 0, "pattern_id": 0, "root": "C4", "chord_type": "maj",
                        "start": 0, "length": 4}"#,
                )
                .unwrap(),
            )
        })
        .await
        .unwrap();

    let described = store
        .read(&path, |p| patterns::describe_pattern(p, 0, 0))
        .await
        .unwrap();
    let pitches: Vec<i64> = described["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["pitch"].as_i64().unwrap())
        .collect();
    assert_eq!(pitches, vec![60, 64, 67]);
}

/// A rejected edit leaves the file exactly as it was.
#[tokio::test]
async fn failed_tool_edit_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.mmp");
    let store = ProjectStore::new();
    new_song(&store, &path).await;
    let before = std::fs::read(&path).unwrap();

    let result = store
        .modify(&path, |p| {
            tracks::add_instrument_track(p, serde_json::from_str(r#"{"path": "song.mmp", "name": "Lead"}"#).unwrap())?;
            patterns::create_pattern(
                p,
                serde_json::from_str(r#"{"path": "song.mmp", "track_id": 7, "name": "Nope"}"#).unwrap(),
            )
        })
        .await;
    assert!(result.is_err());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

/// Concurrent edits of one file are serialised, so none is lost.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_edits_are_serialised() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.mmpz");
    let store = std::sync::Arc::new(ProjectStore::new());
    new_song(&store, &path).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let path = path.clone();
        handles.push(tokio::spawn(async move {
            store
                .modify(&path, |p| {
                    tracks::add_sample_track(
                        p,
                        serde_json::from_str(&format!(
                            r#"{{"path": "busy.mmpz", "name": "Take {i}", "sample_path": "take{i}.wav"}}"#
                        ))
                        .unwrap(),
                    )
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let listing = store.read(&path, tracks::list_tracks).await.unwrap();
    assert_eq!(listing["count"], 8);
}
