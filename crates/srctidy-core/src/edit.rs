//! Text edits and conflict-checked edit sets.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A replacement of a byte range within one file's text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextEdit {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Text inserted in place of the range.
    pub replacement: String,
}

impl TextEdit {
    /// Creates an edit replacing `range` with `replacement`.
    #[must_use]
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            replacement: replacement.into(),
        }
    }

    /// Creates an edit deleting `range`.
    #[must_use]
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range, String::new())
    }

    /// Creates an edit inserting `text` at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset..offset, text)
    }

    /// The replaced byte range.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns true if both edits touch the same bytes or insert at the
    /// same offset, which makes their combined result order-dependent.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        if self.start == other.start {
            return true;
        }
        self.start < other.end && other.start < self.end
    }
}

/// Errors from building or applying an [`EditSet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Two edits touch the same bytes.
    #[error("edits {first:?} and {second:?} overlap")]
    Overlap {
        /// Earlier edit range.
        first: Range<usize>,
        /// Later edit range.
        second: Range<usize>,
    },

    /// An edit is reversed, out of bounds, or splits a character.
    #[error("edit {range:?} is not a valid range of a {len}-byte text")]
    OutOfBounds {
        /// Offending range.
        range: Range<usize>,
        /// Length of the text.
        len: usize,
    },
}

/// A sorted, non-overlapping batch of edits for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    /// Sorts the edits by position and verifies that none overlap.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Overlap`] for the first overlapping pair.
    pub fn new(mut edits: Vec<TextEdit>) -> Result<Self, EditError> {
        edits.sort_by_key(|e| (e.start, e.end));
        for pair in edits.windows(2) {
            if pair[0].conflicts_with(&pair[1]) {
                return Err(EditError::Overlap {
                    first: pair[0].range(),
                    second: pair[1].range(),
                });
            }
        }
        Ok(Self { edits })
    }

    /// Number of edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Edits in position order.
    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Applies all edits in one pass from the end of the text toward the
    /// start, so earlier offsets stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfBounds`] if an edit does not fit the text.
    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        for edit in &self.edits {
            let valid = edit.start <= edit.end
                && edit.end <= text.len()
                && text.is_char_boundary(edit.start)
                && text.is_char_boundary(edit.end);
            if !valid {
                return Err(EditError::OutOfBounds {
                    range: edit.range(),
                    len: text.len(),
                });
            }
        }

        let mut output = text.to_string();
        for edit in self.edits.iter().rev() {
            output.replace_range(edit.range(), &edit.replacement);
        }
        Ok(output)
    }
}
