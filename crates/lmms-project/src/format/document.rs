//! Byte-range splicing of regenerated content into a preserved document.
//!
//! Only three regions change: the `head` start tag, the `track` children of
//! `song/trackcontainer`, and the insertion point before the container's
//! closing tag. Every track is dropped and regenerated, including types the
//! model does not represent. Everything else is copied through unchanged.

use std::ops::Range;

use roxmltree::Node;

use super::decode::parse_document;
use super::ticks::to_percent;
use super::xml::{start_tag, Element, INDENT};
use crate::error::EncodeError;
use crate::model::Project;

#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Rewrite `source` for `project`, replacing all of its tracks with `tracks`.
pub(crate) fn splice(
    source: &str,
    project: &Project,
    tracks: &[Element],
) -> Result<String, EncodeError> {
    let doc = parse_document(source).map_err(|e| EncodeError::Source(e.to_string()))?;
    let root = doc.root_element();

    let container = element_child(root, "song")
        .and_then(|song| element_child(song, "trackcontainer"))
        .ok_or_else(|| EncodeError::Source("no song/trackcontainer element".to_string()))?;

    let mut edits = vec![head_edit(source, root, project)];
    edits.extend(track_edits(source, container, tracks)?);
    Ok(apply(source, edits))
}

fn element_child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name(name))
}

fn head_values(project: &Project) -> [(&'static str, String); 5] {
    let (numerator, denominator) = project.time_signature();
    [
        ("bpm", project.bpm().to_string()),
        ("timesig_numerator", numerator.to_string()),
        ("timesig_denominator", denominator.to_string()),
        ("mastervol", to_percent(project.master_volume()).to_string()),
        ("masterpitch", project.master_pitch().to_string()),
    ]
}

fn head_edit(source: &str, root: Node<'_, '_>, project: &Project) -> Edit {
    let values = head_values(project);
    match element_child(root, "head") {
        Some(head) => {
            let tag = start_tag_range(source, head);
            let self_closing = source[tag.clone()].ends_with("/>");
            let mut attrs: Vec<(String, String)> = head
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect();
            for (key, value) in values {
                match attrs.iter_mut().find(|(k, _)| k == key) {
                    Some(slot) => slot.1 = value,
                    None => attrs.push((key.to_string(), value)),
                }
            }
            Edit {
                range: tag,
                text: start_tag("head", &attrs, self_closing),
            }
        }
        None => {
            let attrs: Vec<(String, String)> = values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            let at = start_tag_range(source, root).end;
            Edit {
                range: at..at,
                text: format!("\n{INDENT}{}", start_tag("head", &attrs, true)),
            }
        }
    }
}

fn track_edits(
    source: &str,
    container: Node<'_, '_>,
    tracks: &[Element],
) -> Result<Vec<Edit>, EncodeError> {
    let closing_indent = line_indent(source, container.range().start);
    let child_indent = container
        .children()
        .filter(Node::is_element)
        .find_map(|n| preceding_indent(source, n))
        .unwrap_or_else(|| format!("{closing_indent}{INDENT}"));

    let mut block = String::new();
    for track in tracks {
        block.push('\n');
        block.push_str(&child_indent);
        block.push_str(&track.to_xml_string()?.replace('\n', &format!("\n{child_indent}")));
    }

    let tag = start_tag_range(source, container);
    if source[tag.clone()].ends_with("/>") {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }
        let open = source[tag.start..tag.end - 2].trim_end();
        return Ok(vec![Edit {
            range: tag,
            text: format!("{open}>{block}\n{closing_indent}</trackcontainer>"),
        }]);
    }

    let mut edits: Vec<Edit> = container
        .children()
        .filter(|n| n.is_element() && n.has_tag_name("track"))
        .map(|n| {
            let mut range = n.range();
            if let Some(prev) = n.prev_sibling().filter(is_blank_text) {
                range.start = prev.range().start;
            }
            Edit {
                range,
                text: String::new(),
            }
        })
        .collect();

    if !block.is_empty() {
        let at = match container.last_child().filter(is_blank_text) {
            Some(trailing) => trailing.range().start,
            None => closing_tag_start(source, container),
        };
        edits.push(Edit {
            range: at..at,
            text: block,
        });
    }
    Ok(edits)
}

/// Apply non-overlapping edits back to front so earlier offsets stay valid.
fn apply(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut out = source.to_string();
    for edit in edits {
        out.replace_range(edit.range, &edit.text);
    }
    out
}

fn is_blank_text(node: &Node<'_, '_>) -> bool {
    node.is_text() && node.text().is_some_and(|t| t.trim().is_empty())
}

/// Byte range of an element's start tag, quote-aware since `>` may appear
/// unescaped in attribute values.
fn start_tag_range(source: &str, node: Node<'_, '_>) -> Range<usize> {
    let start = node.range().start;
    let mut quote = None;
    for (i, &b) in source.as_bytes()[start..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return start..start + i + 1,
            None => {}
        }
    }
    node.range()
}

fn closing_tag_start(source: &str, node: Node<'_, '_>) -> usize {
    let range = node.range();
    source[range.clone()]
        .rfind("</")
        .map_or(range.end, |i| range.start + i)
}

/// Leading whitespace of the line `pos` sits on, or empty when other text
/// precedes it.
fn line_indent(source: &str, pos: usize) -> String {
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..pos];
    if prefix.chars().all(char::is_whitespace) {
        prefix.to_string()
    } else {
        String::new()
    }
}

/// Indentation an element child was written with, taken from the blank text
/// node in front of it.
fn preceding_indent(source: &str, node: Node<'_, '_>) -> Option<String> {
    let prev = node.prev_sibling().filter(is_blank_text)?;
    let text = &source[prev.range()];
    let newline = text.rfind('\n')?;
    Some(text[newline + 1..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"<?xml version="1.0"?>
<!DOCTYPE lmms-project>
<lmms-project version="1.0" creator="LMMS">
  <head bpm="120" custom="x > y"/>
  <song>
    <trackcontainer type="song">
      <track type="0" name="Old"/>
      <track type="3" name="Video"/>
    </trackcontainer>
    <fxmixer width="600"><mixerchannel num="0" name="Master"/></fxmixer>
  </song>
</lmms-project>
"#;

    fn sample_track() -> Element {
        Element::new("track")
            .attr("type", 2)
            .attr("name", "Vox")
            .child(Element::new("sampletrack").attr("src", "vox.wav"))
    }

    #[test]
    fn splice_replaces_every_track() {
        let mut project = Project::new("Song");
        project.set_bpm(140).unwrap();
        let out = splice(SOURCE, &project, &[sample_track()]).unwrap();
        let expected = r#"<?xml version="1.0"?>
<!DOCTYPE lmms-project>
<lmms-project version="1.0" creator="LMMS">
  <head bpm="140" custom="x &gt; y" timesig_numerator="4" timesig_denominator="4" mastervol="100" masterpitch="0"/>
  <song>
    <trackcontainer type="song">
      <track type="2" name="Vox">
       <sampletrack src="vox.wav"/>
      </track>
    </trackcontainer>
    <fxmixer width="600"><mixerchannel num="0" name="Master"/></fxmixer>
  </song>
</lmms-project>
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn self_closing_container_is_expanded() {
        let source = "<lmms-project>\n <head/>\n <song>\n  <trackcontainer type=\"song\"/>\n </song>\n</lmms-project>\n";
        let out = splice(source, &Project::new("x"), &[Element::new("track")]).unwrap();
        assert!(out.contains(
            "  <trackcontainer type=\"song\">\n   <track/>\n  </trackcontainer>\n </song>"
        ));
    }

    #[test]
    fn missing_head_is_inserted() {
        let source = "<lmms-project><song><trackcontainer></trackcontainer></song></lmms-project>";
        let out = splice(source, &Project::new("x"), &[]).unwrap();
        assert!(out.starts_with("<lmms-project>\n <head bpm=\"120\""));
        assert!(out.ends_with("<song><trackcontainer></trackcontainer></song></lmms-project>"));
    }

    #[test]
    fn missing_container_is_an_error() {
        let err = splice("<lmms-project><head/></lmms-project>", &Project::new("x"), &[]);
        assert!(matches!(err, Err(EncodeError::Source(_))));
    }

    #[test]
    fn compact_container_gets_fallback_indent() {
        let source = "<lmms-project><song><trackcontainer></trackcontainer></song></lmms-project>";
        let out = splice(source, &Project::new("x"), &[Element::new("track")]).unwrap();
        assert!(out.contains("<trackcontainer>\n <track/></trackcontainer>"));
    }
}
