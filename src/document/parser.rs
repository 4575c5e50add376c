//! Line-oriented parser for definition documents.

use anyhow::Result;

use super::{Block, PersistedDocument, INCLUDE_MARKER, MASTER_MARKER, SHARED_MARKER};

/// Parsing state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Reading header lines before the first marker
    InHeader,
    /// Reading the include list
    InIncludes,
    /// Reading entry blocks of the shared region
    InShared,
}

/// Returns true for a column-0 line equal to `marker` (ignoring trailing whitespace).
fn is_marker(line: &str, marker: &str) -> bool {
    line.trim_end() == marker
}

fn is_top_level(line: &str) -> bool {
    !line.is_empty() && !line.starts_with(char::is_whitespace)
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Returns true for a list bullet: `-` alone or followed by whitespace.
pub(crate) fn is_bullet(line: &str) -> bool {
    line.trim_start()
        .strip_prefix('-')
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Parses a definition document.
///
/// # Errors
///
/// Fails when the document has neither an `include:` nor a `shared:` marker, or
/// when the include list contains an unexpected top-level line.
pub fn parse_document(content: &str) -> Result<PersistedDocument> {
    let lines: Vec<&str> = content.lines().collect();

    let mut state = ParseState::InHeader;
    let mut header: Vec<&str> = Vec::new();
    let mut includes: Option<Vec<String>> = None;
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;
    let mut pending: Vec<String> = Vec::new();
    let mut trailer: Option<String> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_num = idx + 1;

        match state {
            ParseState::InHeader => {
                if is_marker(line, INCLUDE_MARKER) {
                    includes = Some(Vec::new());
                    state = ParseState::InIncludes;
                } else if is_marker(line, SHARED_MARKER) {
                    state = ParseState::InShared;
                } else {
                    header.push(line);
                }
            }
            ParseState::InIncludes => {
                if is_marker(line, SHARED_MARKER) {
                    state = ParseState::InShared;
                } else if is_blank_or_comment(line) {
                    continue;
                } else if is_top_level(line) {
                    anyhow::bail!("Line {line_num}: unexpected top-level line in include list: {line}");
                } else if is_bullet(line) {
                    let path = line.trim_start()[1..].trim();
                    if !path.is_empty() {
                        if let Some(list) = includes.as_mut() {
                            list.push(path.to_string());
                        }
                    }
                } else {
                    tracing::debug!("Line {line_num}: ignoring include-list line: {line}");
                }
            }
            ParseState::InShared => {
                if is_marker(line, MASTER_MARKER) {
                    trailer = Some(lines[idx..].join("\n").trim_end().to_string());
                    break;
                }

                if is_bullet(line) {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    current = Some(Block {
                        leading: trim_blank_edges(std::mem::take(&mut pending)),
                        lines: vec![(*line).to_string()],
                    });
                } else if is_blank_or_comment(line) {
                    pending.push((*line).to_string());
                } else if let Some(block) = current.as_mut() {
                    // Continuation: blank or comment lines in between belong to the block
                    block.lines.append(&mut pending);
                    block.lines.push((*line).to_string());
                } else {
                    // Content before the first bullet; kept so validation can report it
                    pending.push((*line).to_string());
                }
            }
        }
    }

    if state == ParseState::InHeader {
        anyhow::bail!("Document has no '{INCLUDE_MARKER}' or '{SHARED_MARKER}' section");
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }
    let closing = trim_blank_edges(pending);

    Ok(PersistedDocument {
        header: header.join("\n").trim_end().to_string(),
        includes,
        blocks,
        closing,
        trailer,
    })
}

/// Removes blank lines at both ends.
fn trim_blank_edges(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let first_content = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    lines.drain(..first_content);
    lines
}
