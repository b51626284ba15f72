//! Encoder: typed [`Project`] to project file bytes.
//!
//! A project decoded from a file is spliced back into that file's text;
//! a project built in memory gets a fresh document skeleton.

mod entity;
mod track;

use std::fs;
use std::path::Path;

use super::document;
use super::framing::ProjectFormat;
use super::ticks::to_percent;
use super::xml::{write_document, Element};
use crate::error::EncodeError;
use crate::model::Project;

/// LMMS release the fresh skeleton claims to come from.
const CREATOR_VERSION: &str = "1.2.2";

/// Render a project as LMMS XML text.
pub fn encode_xml(project: &Project) -> Result<String, EncodeError> {
    project.validate()?;
    let tracks: Vec<Element> = project.tracks().iter().map(track::track).collect();
    match project.source() {
        Some(source) => {
            tracing::debug!(name = %project.name, tracks = tracks.len(), "splicing into source document");
            document::splice(source.text(), project, &tracks)
        }
        None => {
            tracing::debug!(name = %project.name, tracks = tracks.len(), "writing fresh document");
            write_document(&skeleton(project, tracks))
        }
    }
}

/// Render a project in the given on-disk format.
pub fn encode_bytes(project: &Project, format: ProjectFormat) -> Result<Vec<u8>, EncodeError> {
    let xml = encode_xml(project)?;
    format.wrap_bytes(xml.as_bytes())
}

/// Write a project to `path`, compressing when the extension is `.mmpz`.
pub fn encode_file(project: &Project, path: impl AsRef<Path>) -> Result<(), EncodeError> {
    let path = path.as_ref();
    let data = encode_bytes(project, ProjectFormat::from_path(path))?;
    fs::write(path, data)?;
    tracing::info!(path = %path.display(), "saved project");
    Ok(())
}

fn skeleton(project: &Project, tracks: Vec<Element>) -> Element {
    let (numerator, denominator) = project.time_signature();
    let head = Element::new("head")
        .attr("bpm", project.bpm())
        .attr("timesig_numerator", numerator)
        .attr("timesig_denominator", denominator)
        .attr("mastervol", to_percent(project.master_volume()))
        .attr("masterpitch", project.master_pitch());

    let mut container = Element::new("trackcontainer")
        .attr("type", "song")
        .attr("width", 600)
        .attr("x", 0)
        .attr("y", 0)
        .attr("maximized", 0)
        .attr("visible", 1);
    container.children = tracks;

    let song = Element::new("song")
        .child(container)
        .child(
            Element::new("fxmixer")
                .attr("width", 600)
                .attr("height", 200)
                .child(
                    Element::new("mixerchannel")
                        .attr("num", 0)
                        .attr("name", "Master")
                        .attr("volume", 1)
                        .attr("muted", 0),
                ),
        )
        .child(Element::new("ControllerRackView").attr("width", 350).attr("height", 200))
        .child(Element::new("pianoroll").attr("width", 600).attr("height", 480))
        .child(Element::new("automationeditor").attr("width", 600).attr("height", 400))
        .child(Element::new("projectnotes"));

    Element::new("lmms-project")
        .attr("version", "1.0")
        .attr("creator", "LMMS")
        .attr("creatorversion", CREATOR_VERSION)
        .attr("type", "song")
        .child(head)
        .child(song)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::decode::decode_str;
    use crate::model::{Note, Pattern, Track};
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_document_layout() {
        let mut project = Project::new("Demo");
        project.set_bpm(128).unwrap();
        let xml = encode_xml(&project).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<!DOCTYPE lmms-project>\n<lmms-project"));
        assert!(xml.contains("creatorversion=\"1.2.2\""));
        assert!(xml.contains("<head bpm=\"128\""));
        assert!(xml.contains("<mixerchannel num=\"0\" name=\"Master\""));
        assert!(xml.contains("<projectnotes/>"));
    }

    #[test]
    fn fresh_document_decodes_back() {
        let mut project = Project::new("Demo");
        project.set_time_signature(3, 4).unwrap();
        let mut lead = Track::instrument("Lead", "kicker");
        let mut pattern = Pattern::new("A", 1, 2).unwrap();
        pattern.add_note(Note::new(48, 0.5, 1.5).unwrap());
        lead.add_pattern(pattern).unwrap();
        project.add_track(lead);

        let decoded = decode_str(encode_xml(&project).unwrap(), "Demo").unwrap();
        assert_eq!(decoded, project);
    }

    #[test]
    fn invalid_model_is_rejected() {
        let mut project = Project::new("Bad");
        let mut track = Track::instrument("Lead", "tripleoscillator");
        if let Some(channel) = track.kind_mut().channel_mut() {
            channel.pitch = 40;
        }
        project.add_track(track);
        assert!(matches!(encode_xml(&project), Err(EncodeError::Model(_))));
    }
}
