//! GUID reference scanner for serialized prefab text
//!
//! Prefabs are YAML-like text where every cross-asset reference is written as
//! `{fileID: 11500000, guid: <value>, type: 3}`. The scanner only looks for the
//! `guid: <value>,` pattern line by line; it does not parse the document.
//!
//! Every occurrence on a line is extracted, so a line holding several references
//! contributes all of them. Lines mentioning `guid` without a terminating comma are
//! skipped rather than treated as errors.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IndexError, Result};
use crate::models::Guid;

const GUID_MARKER: &str = "guid";

static GUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern, cannot fail to compile
    Regex::new(r"(?i)guid: (.*?),").unwrap()
});

/// Extract the distinct GUIDs referenced by one line into `guids`
fn scan_line(line: &str, guids: &mut BTreeSet<Guid>) {
    // Cheap prefilter before running the regex
    let has_marker = line
        .as_bytes()
        .windows(GUID_MARKER.len())
        .any(|w| w.eq_ignore_ascii_case(GUID_MARKER.as_bytes()));
    if !has_marker {
        return;
    }

    for captures in GUID_PATTERN.captures_iter(line) {
        if let Some(value) = captures.get(1)
            && !value.as_str().is_empty()
        {
            guids.insert(value.as_str().to_string());
        }
    }
}

/// Scan already-loaded asset content
///
/// # Examples
///
/// ```
/// use prefab_index::scanner::scan_content;
///
/// let guids = scan_content("m_Script: {fileID: 11500000, guid: abcd1234ef, type: 3}");
/// assert!(guids.contains("abcd1234ef"));
/// assert_eq!(guids.len(), 1);
/// ```
pub fn scan_content(content: &str) -> BTreeSet<Guid> {
    let mut guids = BTreeSet::new();
    for line in content.lines() {
        scan_line(line, &mut guids);
    }
    guids
}

/// Scan an asset file by path, streaming it line by line
///
/// Lines that are not valid UTF-8 are decoded lossily, so a stray byte elsewhere on a
/// line never hides its references.
///
/// # Errors
///
/// Returns [`IndexError::Io`] if the file cannot be opened or read.
pub fn scan_file(path: &Path) -> Result<BTreeSet<Guid>> {
    let file = File::open(path).map_err(|e| IndexError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut guids = BTreeSet::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|e| IndexError::io(path, e))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        scan_line(line.trim_end_matches(['\n', '\r']), &mut guids);
    }

    Ok(guids)
}
