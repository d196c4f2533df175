//! XMind 8 compatible outline archive.
//!
//! The archive holds `content.xml` (the topic tree), `meta.xml`, `styles.xml` and
//! `META-INF/manifest.xml`. Every node is exported, collapsed or not.

use super::ExportError;
use chrono::{DateTime, SecondsFormat, Utc};
use mindcanvas_core::MindMap;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

pub const SHEET_TITLE: &str = "思维导图";
pub const CREATOR_NAME: &str = "AI测试用例生成器";
pub const CREATOR_VERSION: &str = "1.0";

/// Escapes the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// `task-N` marker bucket: progress quartile, clamped to `0..=3`.
pub fn task_marker(progress: u8) -> u8 {
    (progress / 25).min(3)
}

fn write_children(out: &mut String, map: &MindMap, node_id: &str, indent: usize) {
    let children: Vec<_> = map.children_of(node_id).collect();
    if children.is_empty() {
        return;
    }
    let sp = " ".repeat(indent);
    let _ = write!(out, "\n{sp}<children>\n{sp}  <topics type=\"attached\">");
    for child in children {
        let _ = write!(
            out,
            "\n{sp}    <topic id=\"{}\">\n{sp}      <title>{}</title>",
            escape_xml(&child.id),
            escape_xml(&child.text)
        );
        if let Some(notes) = child.notes_text() {
            let _ = write!(
                out,
                "\n{sp}      <notes><plain>{}</plain></notes>",
                escape_xml(notes)
            );
        }
        if child.priority.is_some() || child.progress.is_some() {
            let _ = write!(out, "\n{sp}      <markers>");
            if let Some(priority) = child.priority {
                let _ = write!(
                    out,
                    "\n{sp}        <marker-ref marker-id=\"priority-{}\"/>",
                    priority.marker_rank()
                );
            }
            if let Some(progress) = child.progress {
                let _ = write!(
                    out,
                    "\n{sp}        <marker-ref marker-id=\"task-{}\"/>",
                    task_marker(progress)
                );
            }
            let _ = write!(out, "\n{sp}      </markers>");
        }
        write_children(out, map, &child.id, indent + 6);
        let _ = write!(out, "\n{sp}    </topic>");
    }
    let _ = write!(out, "\n{sp}  </topics>\n{sp}</children>");
}

pub fn content_xml(map: &MindMap) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECL);
    out.push_str(
        "\n<xmap-content xmlns=\"urn:xmind:xmap:xmlns:content:2.0\" \
         xmlns:fo=\"http://www.w3.org/1999/XSL/Format\" \
         xmlns:svg=\"http://www.w3.org/2000/svg\" version=\"2.0\">",
    );
    let _ = write!(
        out,
        "\n  <sheet id=\"1\">\n    <topic id=\"root\">\n      <title>{}</title>",
        escape_xml(&map.root().text)
    );
    write_children(&mut out, map, map.root_id(), 6);
    let _ = write!(
        out,
        "\n    </topic>\n    <title>{SHEET_TITLE}</title>\n  </sheet>\n</xmap-content>"
    );
    out
}

pub fn meta_xml(created_at: DateTime<Utc>) -> String {
    format!(
        "{XML_DECL}\n<meta xmlns=\"urn:xmind:xmap:xmlns:meta:2.0\" version=\"2.0\">\n  <Creator>\n    \
         <Name>{CREATOR_NAME}</Name>\n    <Version>{CREATOR_VERSION}</Version>\n  </Creator>\n  \
         <Create>\n    <Time>{}</Time>\n  </Create>\n</meta>",
        created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

pub fn styles_xml() -> String {
    format!(
        "{XML_DECL}\n<xmap-styles xmlns=\"urn:xmind:xmap:xmlns:style:2.0\" \
         xmlns:fo=\"http://www.w3.org/1999/XSL/Format\" version=\"2.0\">\n  <styles>\n    \
         <style id=\"default\" name=\"默认\" type=\"topic\">\n      <topic-properties \
         border-line-color=\"#2D70B3\" border-line-width=\"1pt\" fo:fontFamily=\"Microsoft YaHei\" \
         fo:fontSize=\"10pt\" fo:fontStyle=\"normal\" fo:fontWeight=\"normal\" \
         fo:textDecoration=\"none\" line-class=\"org.xmind.branchConnection.curve\" \
         line-color=\"#2D70B3\" line-width=\"1pt\" shape-class=\"org.xmind.topicShape.roundedRect\" \
         svg:fill=\"#EDF5FE\" svg:opacity=\"100%\" text-align=\"center\"/>\n    </style>\n  \
         </styles>\n</xmap-styles>"
    )
}

pub fn manifest_xml() -> String {
    let mut out = format!(
        "{XML_DECL}\n<manifest xmlns=\"urn:xmind:xmap:xmlns:manifest:1.0\">"
    );
    for entry in ["content.xml", "meta.xml", "styles.xml"] {
        let _ = write!(
            out,
            "\n  <file-entry full-path=\"{entry}\" media-type=\"text/xml\"/>"
        );
    }
    out.push_str("\n</manifest>");
    out
}

/// Builds the complete zip archive in memory.
pub fn write_archive(map: &MindMap, created_at: DateTime<Utc>) -> Result<Vec<u8>, ExportError> {
    let entries = [
        ("content.xml", content_xml(map)),
        ("meta.xml", meta_xml(created_at)),
        ("styles.xml", styles_xml()),
        ("META-INF/manifest.xml", manifest_xml()),
    ];

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in &entries {
        zip.start_file(*name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}
