//! Decoder: project file bytes to a typed [`Project`].
//!
//! The decoded project keeps the document text it was read from, so a later
//! encode can splice regenerated tracks into it and leave everything the
//! model does not cover byte-for-byte intact.

mod attrs;
mod entity;
mod track;

use std::fs;
use std::path::Path;

use roxmltree::{Document, ParsingOptions};

use self::attrs::{child, children, float, int};
use super::framing::ProjectFormat;
use super::ticks::from_percent;
use crate::error::DecodeError;
use crate::model::validate::narrow;
use crate::model::{Project, SourceDocument};

/// Read and decode a `.mmp` or `.mmpz` file. The project is named after the file stem.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Project, DecodeError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    decode_bytes(&data, ProjectFormat::from_path(path), &name)
}

/// Decode file contents in the given on-disk format.
pub fn decode_bytes(
    data: &[u8],
    format: ProjectFormat,
    name: &str,
) -> Result<Project, DecodeError> {
    let xml = format.unwrap_bytes(data)?;
    decode_str(String::from_utf8(xml)?, name)
}

/// Decode project XML text.
pub fn decode_str(text: impl Into<String>, name: &str) -> Result<Project, DecodeError> {
    let text = text.into();
    let mut project = {
        let doc = parse_document(&text)?;
        project(&doc, name)?
    };
    project.set_source(SourceDocument::new(text));
    Ok(project)
}

/// Parse LMMS XML. Project files carry a `<!DOCTYPE lmms-project>` line, so
/// DTDs must be allowed.
pub(crate) fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        },
    )
}

fn project(doc: &Document<'_>, name: &str) -> Result<Project, DecodeError> {
    let root = doc.root_element();
    if !root.has_tag_name("lmms-project") {
        tracing::debug!(root = root.tag_name().name(), "unexpected root element");
    }

    let mut project = Project::new(name);
    if let Some(head) = child(root, "head") {
        project.set_bpm(narrow("bpm", int(head, "bpm", 120)?, "20..=999")?)?;
        project.set_time_signature(
            narrow(
                "time signature numerator",
                int(head, "timesig_numerator", 4)?,
                "1..=32",
            )?,
            narrow(
                "time signature denominator",
                int(head, "timesig_denominator", 4)?,
                "1..=32",
            )?,
        )?;
        project.set_master_volume(from_percent(float(head, "mastervol", 100.0)?))?;
        project.set_master_pitch(narrow(
            "master pitch",
            int(head, "masterpitch", 0)?,
            "-12..=12",
        )?)?;
    }

    let container = child(root, "song").and_then(|song| child(song, "trackcontainer"));
    if let Some(container) = container {
        for node in children(container, "track") {
            if let Some(track) = track::track(node)? {
                project.add_track(track);
            }
        }
    }

    tracing::debug!(
        name,
        bpm = project.bpm(),
        tracks = project.tracks().len(),
        "decoded project"
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    #[test]
    fn missing_head_uses_defaults() {
        let project = decode_str("<lmms-project><song/></lmms-project>", "Empty").unwrap();
        assert_eq!(project.name, "Empty");
        assert_eq!(project.bpm(), 120);
        assert_eq!(project.time_signature(), (4, 4));
        assert_eq!(project.master_volume(), 1.0);
        assert_eq!(project.master_pitch(), 0);
        assert!(project.tracks().is_empty());
        assert!(project.source().is_some());
    }

    #[test]
    fn head_attributes() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE lmms-project>
<lmms-project version="1.0">
 <head bpm="140" timesig_numerator="6" timesig_denominator="8" mastervol="80" masterpitch="-2"/>
 <song><trackcontainer/></song>
</lmms-project>
"#;
        let project = decode_str(xml, "Song").unwrap();
        assert_eq!(project.bpm(), 140);
        assert_eq!(project.time_signature(), (6, 8));
        assert_eq!(project.master_volume(), 0.8);
        assert_eq!(project.master_pitch(), -2);
    }

    #[test]
    fn out_of_range_head_is_a_validation_error() {
        let err = decode_str(r#"<lmms-project><head bpm="5"/></lmms-project>"#, "x").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Model(ModelError::OutOfRange { field: "bpm", .. })
        ));
    }

    #[test]
    fn malformed_xml_fails() {
        assert!(matches!(
            decode_str("<lmms-project><head>", "x"),
            Err(DecodeError::Xml(_))
        ));
    }

    #[test]
    fn invalid_utf8_fails() {
        assert!(matches!(
            decode_bytes(&[0x3c, 0xff, 0xfe], ProjectFormat::Xml, "x"),
            Err(DecodeError::Utf8(_))
        ));
    }
}
