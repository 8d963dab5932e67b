//! Status codec: JSON payload wrapped in an HTML comment block.
//!
//! The block is embedded in a free-form issue body that humans also edit.
//! Locating and replacing the block is a plain text transform; only
//! [`encode`] and [`decode`] know about the payload format.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::Status;

/// Opens the embedded status block.
pub const OPEN_MARKER: &str = "<!-- ci-status:";
/// Closes the embedded status block.
pub const CLOSE_MARKER: &str = "-->";

static BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s){}(.*?){}",
        regex::escape(OPEN_MARKER),
        regex::escape(CLOSE_MARKER)
    ))
    .unwrap()
});

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("no status block found")]
    MissingMarkers,
    #[error("malformed status payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Serialize a status into a self-delimited block.
pub fn encode(status: &Status) -> Result<String, CodecError> {
    let json = serde_json::to_string_pretty(status)?;
    // `<` and `>` only occur inside JSON strings, where the escapes decode back.
    // Neither marker nor any other HTML comment terminator survives in the payload.
    let json = json.replace('<', "\\u003c").replace('>', "\\u003e");
    Ok(format!("{OPEN_MARKER}\n{json}\n{CLOSE_MARKER}"))
}

/// Decode the first status block found in `text`.
pub fn decode(text: &str) -> Result<Status, CodecError> {
    let (_, payload) = locate_block(text).ok_or(CodecError::MissingMarkers)?;
    Ok(serde_json::from_str(text[payload].trim())?)
}

/// Insert `block` into `text`, replacing the first existing status block.
/// Without one, the block is appended after a blank line.
pub fn splice(text: &str, block: &str) -> String {
    match locate_block(text) {
        Some((span, _)) => {
            let mut out = String::with_capacity(text.len() - span.len() + block.len());
            out.push_str(&text[..span.start]);
            out.push_str(block);
            out.push_str(&text[span.end..]);
            out
        }
        None => format!("{text}\n\n{block}"),
    }
}

/// Read the status stored in `text`.
///
/// Returns `None` when the text holds no block or the block cannot be
/// decoded. A broken record is treated as missing history, never as an error.
pub fn extract(text: &str) -> Option<Status> {
    if text.trim().is_empty() {
        return None;
    }
    match decode(text) {
        Ok(status) => Some(status),
        Err(CodecError::MissingMarkers) => None,
        Err(e) => {
            tracing::debug!("Ignoring unreadable status block: {}", e);
            None
        }
    }
}

/// Byte ranges of the first complete block and of its payload.
///
/// The first close marker is paired with the nearest open marker before it,
/// so a dangling open marker earlier in the text never swallows human text.
fn locate_block(text: &str) -> Option<(Range<usize>, Range<usize>)> {
    let m = BLOCK_REGEX.find(text)?;
    let matched = m.as_str();
    let start = m.start() + matched[..matched.len() - CLOSE_MARKER.len()].rfind(OPEN_MARKER)?;
    let payload = start + OPEN_MARKER.len()..m.end() - CLOSE_MARKER.len();
    Some((start..m.end(), payload))
}
