use crate::error::{Error, Result};
use std::ops::Range;

/// Replacement of a byte range in the original source.
///
/// An empty range is an insertion at `range.start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            replacement: text.into(),
        }
    }
}

/// Apply non-overlapping edits to `source`.
///
/// Edits may be given in any order; insertions at the same offset keep
/// their relative order.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in ordered {
        if edit.range.start < cursor || edit.range.end > source.len() {
            return Err(Error::Other(format!(
                "Overlapping or out-of-bounds edit at {:?}",
                edit.range
            )));
        }
        output.push_str(&source[cursor..edit.range.start]);
        output.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    output.push_str(&source[cursor..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_edits_is_identity() {
        let source = "import os  # keep\n";
        assert_eq!(apply_edits(source, &[]).unwrap(), source);
    }

    #[test]
    fn test_unordered_edits() {
        let source = "from foo import (a, b)\n";
        let edits = vec![
            TextEdit::insert(18, " as x"),
            TextEdit::replace(5..8, "..foo"),
        ];
        assert_eq!(
            apply_edits(source, &edits).unwrap(),
            "from ..foo import (a as x, b)\n"
        );
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let edits = vec![TextEdit::replace(0..4, "x"), TextEdit::replace(2..6, "y")];
        assert!(apply_edits("abcdefgh", &edits).is_err());
    }
}
