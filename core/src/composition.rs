//! Preedit text as the host should render it.
//!
//! While a character is being composed the host shows the tentative
//! candidate, underlined, with the cursor after it. `PreeditDisplay` carries
//! exactly that: the text, its underline attribute and the cursor.

use std::ops::Range;

/// Underline style of a preedit attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderlineStyle {
    Single,
}

/// An attribute span over the preedit text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreeditAttribute {
    /// Byte range in the preedit text
    pub range: Range<usize>,
    pub underline: UnderlineStyle,
}

/// Preedit snapshot for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreeditDisplay {
    /// Tentative text, empty when idle
    pub text: String,
    /// Attribute spans; one single underline over the whole text when non-empty
    pub attributes: Vec<PreeditAttribute>,
    /// Cursor position in characters (not bytes)
    pub cursor: usize,
}

impl PreeditDisplay {
    /// Nothing being composed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Display for a tentative match: fully underlined, cursor at the end.
    pub fn tentative(text: &str) -> Self {
        if text.is_empty() {
            return Self::empty();
        }
        Self {
            text: text.to_string(),
            attributes: vec![PreeditAttribute {
                range: 0..text.len(),
                underline: UnderlineStyle::Single,
            }],
            cursor: text.chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte range covered by the underline, if any.
    pub fn underline_range(&self) -> Option<Range<usize>> {
        self.attributes.first().map(|attr| attr.range.clone())
    }
}
