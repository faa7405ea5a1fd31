//! HTML findings report generation.
//!
//! Translates the XML findings file written by scss-lint into a standalone
//! HTML report. A malformed or missing XML file is logged and produces a
//! report with an empty findings body rather than failing the goal.

use crate::log;
use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

/// One reported lint issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issue {
    pub linter: String,
    pub line: String,
    pub column: String,
    pub severity: String,
    pub reason: String,
}

/// All issues reported for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFindings {
    pub name: String,
    pub issues: Vec<Issue>,
}

/// Generate the HTML report from the lint XML output.
pub fn generate(xml_file: &Path, html_file: &Path, description: &str) -> Result<()> {
    let findings = match load_findings(xml_file) {
        Ok(findings) => findings,
        Err(err) => {
            log!("error"; "error during xml conversion of {}: {err:#}", xml_file.display());
            Vec::new()
        }
    };

    if let Some(parent) = html_file.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create report directory `{}`", parent.display())
        })?;
    }

    let html = render_html(description, &findings);
    fs::write(html_file, html)
        .with_context(|| format!("failed to write report `{}`", html_file.display()))?;

    log!("lint"; "wrote findings report: {}", html_file.display());
    Ok(())
}

/// Parse the scss-lint XML findings file.
///
/// Format: `<lint><file name="..."><issue .../></file></lint>`.
pub fn load_findings(xml_file: &Path) -> Result<Vec<FileFindings>> {
    let content = fs::read_to_string(xml_file)
        .with_context(|| format!("failed to read `{}`", xml_file.display()))?;
    parse_findings(&content)
}

fn parse_findings(xml: &str) -> Result<Vec<FileFindings>> {
    let mut reader = Reader::from_str(xml);

    let mut findings: Vec<FileFindings> = Vec::new();

    loop {
        match reader.read_event().context("malformed lint XML")? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"file" => {
                    findings.push(FileFindings {
                        name: attr(&e, "name")?,
                        issues: Vec::new(),
                    });
                }
                b"issue" => {
                    let issue = Issue {
                        linter: attr(&e, "linter")?,
                        line: attr(&e, "line")?,
                        column: attr(&e, "column")?,
                        severity: attr(&e, "severity")?,
                        reason: attr(&e, "reason")?,
                    };
                    match findings.last_mut() {
                        Some(file) => file.issues.push(issue),
                        None => anyhow::bail!("issue element outside of a file element"),
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(findings)
}

/// Read one attribute, empty when absent.
fn attr(e: &BytesStart<'_>, name: &str) -> Result<String> {
    Ok(e.try_get_attribute(name)
        .context("malformed lint XML attribute")?
        .map(|a| a.unescape_value().map(|v| v.into_owned()))
        .transpose()
        .context("malformed lint XML attribute value")?
        .unwrap_or_default())
}

/// Render the standalone HTML report.
fn render_html(description: &str, findings: &[FileFindings]) -> String {
    let mut body = String::new();

    let total: usize = findings.iter().map(|f| f.issues.len()).sum();
    body.push_str(&format!(
        "<p>{} issue(s) in {} file(s).</p>\n",
        total,
        findings.len()
    ));

    for file in findings {
        body.push_str(&format!("<h2>{}</h2>\n", escape(&file.name)));
        if file.issues.is_empty() {
            body.push_str("<p>No issues.</p>\n");
            continue;
        }
        body.push_str(
            "<table>\n<tr><th>Line</th><th>Column</th><th>Severity</th>\
             <th>Linter</th><th>Reason</th></tr>\n",
        );
        for issue in &file.issues {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&issue.line),
                escape(&issue.column),
                escape(&issue.severity),
                escape(&issue.severity),
                escape(&issue.linter),
                escape(&issue.reason),
            ));
        }
        body.push_str("</table>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2em; }}\n\
         table {{ border-collapse: collapse; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }}\n\
         td.error {{ color: #b00; }}\n\
         td.warning {{ color: #a60; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(description),
        body = body,
    )
}

/// Minimal HTML escaping for text and attribute content.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
