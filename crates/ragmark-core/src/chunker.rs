//! Document chunking for embedding
//!
//! Splits markdown on level-2 headings so each chunk carries its own
//! heading line, and derives a stable anchor slug from that line.

/// Split a document into chunks on level-2 heading boundaries.
///
/// Splits on `"\n## "` and re-prefixes every segment with the `"## "`
/// marker it was split on, except a segment that already starts with a
/// level-1 heading. A document with `k` level-2 headings yields `k`
/// chunks, plus a leading chunk when content precedes the first heading.
/// Total over any input; an empty document yields one empty chunk.
pub fn chunk(content: &str) -> Vec<String> {
    content
        .split("\n## ")
        .map(|segment| {
            if segment.starts_with("# ") {
                segment.to_string()
            } else {
                format!("## {}", segment)
            }
        })
        .collect()
}

/// Derive the anchor slug for a chunk.
///
/// Takes the chunk's first line, strips a leading `"## "` or `"# "` marker,
/// lower-cases it and replaces spaces with hyphens. Pure: identical chunk
/// content always yields the identical anchor.
pub fn anchor(chunk: &str) -> String {
    let first_line = chunk.lines().next().unwrap_or("");
    let header = first_line
        .strip_prefix("## ")
        .or_else(|| first_line.strip_prefix("# "))
        .unwrap_or(first_line);

    header.to_lowercase().replace(' ', "-")
}
