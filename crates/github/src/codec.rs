//! Thread text codec.
//!
//! A serialized thread has three zones, newline-separated: a
//! human-readable header line, the reply blocks, and a machine-readable
//! trailer holding `{anchor, resolved}` as compact JSON. The record
//! stays legible to anyone reading the raw comment while remaining a
//! round-trippable structured document.

use preview_comments_core::types::PinAnchor;
use serde::{Deserialize, Serialize};

const METADATA_PREFIX: &str = "<!-- preview-comments:";
const METADATA_SUFFIX: &str = " -->";
const REPLY_SEPARATOR: &str = "\n\n---\n\n";

/// One reply as it appears on the wire: author and body only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedComment {
    pub author: String,
    pub body: String,
}

/// Result of decoding a comment body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedThread {
    pub anchor: PinAnchor,
    pub resolved: bool,
    pub comments: Vec<SerializedComment>,
}

#[derive(Serialize, Deserialize)]
struct ThreadMetadata {
    anchor: PinAnchor,
    #[serde(default)]
    resolved: bool,
}

/// Encode a thread as a comment body.
pub fn serialize_thread(
    anchor: &PinAnchor,
    comments: &[SerializedComment],
    resolved: bool,
) -> String {
    let metadata = serde_json::json!({ "anchor": anchor, "resolved": resolved }).to_string();
    let header = format!("📌 **Preview comment** on `{}`", anchor.pathname);
    let blocks: Vec<String> = comments
        .iter()
        .map(|comment| format!("**{}:**\n{}", comment.author, comment.body))
        .collect();
    format!(
        "{header}\n\n{}\n\n{METADATA_PREFIX}{metadata}{METADATA_SUFFIX}",
        blocks.join(REPLY_SEPARATOR)
    )
}

/// Decode a comment body.
///
/// Returns `None` for anything that is not a preview-comment record:
/// missing trailer, truncated trailer, or unparseable metadata. Reply
/// blocks that do not match the `**author:**\nbody` shape are silently
/// dropped; hand-edited comment text must never raise an error.
pub fn parse_thread(body: &str) -> Option<ParsedThread> {
    let metadata_start = body.find(METADATA_PREFIX)?;
    let json_start = metadata_start + METADATA_PREFIX.len();
    let metadata_end = body[json_start..].find(METADATA_SUFFIX)? + json_start;

    let metadata: ThreadMetadata = serde_json::from_str(&body[json_start..metadata_end]).ok()?;

    let content = body[..metadata_start].trim();
    let without_header = match content.find('\n') {
        Some(end) => content[end + 1..].trim(),
        None => "",
    };

    let mut comments = Vec::new();
    if !without_header.is_empty() {
        for block in without_header.split(REPLY_SEPARATOR) {
            if let Some(comment) = parse_comment_block(block) {
                comments.push(comment);
            }
        }
    }

    Some(ParsedThread {
        anchor: metadata.anchor,
        resolved: metadata.resolved,
        comments,
    })
}

/// One `**author:**\nbody` block. The author sits on a single line; the
/// body may span several.
fn parse_comment_block(block: &str) -> Option<SerializedComment> {
    let rest = block.trim().strip_prefix("**")?;
    let split = rest.find(":**\n")?;
    let author = rest[..split].trim();
    let body = rest[split + ":**\n".len()..].trim();
    if author.is_empty() || author.contains('\n') || body.is_empty() {
        return None;
    }
    Some(SerializedComment {
        author: author.to_string(),
        body: body.to_string(),
    })
}
