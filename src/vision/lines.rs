//! Word-to-line aggregation
//!
//! Engine tokens are filtered, grouped by their line index in the order each
//! index is first seen, and turned into one [`TextLine`] per group with the
//! union rectangle of the group's word boxes as its polygon.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::iter::FusedIterator;

use super::ocr::EngineOutput;

/// Four corners in pixel coordinates: top-left, top-right, bottom-right, bottom-left
pub type Polygon = [[i32; 2]; 4];

/// Axis-aligned box of a single token (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }
}

/// One recognized, non-empty word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDetection {
    pub text: String,
    pub line_index: i32,
    pub bbox: PixelBox,
}

/// A reconstructed line of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    /// Words joined by single spaces, in arrival order
    pub text: String,
    /// Bounding rectangle of every word on the line
    pub polygon: Polygon,
}

impl TextLine {
    pub fn into_pair(self) -> (String, Polygon) {
        (self.text, self.polygon)
    }
}

/// Turn engine output into tokens, dropping empty and whitespace-only text
pub fn extract_tokens(output: EngineOutput) -> impl Iterator<Item = TokenDetection> {
    let EngineOutput {
        text,
        line_num,
        left,
        top,
        width,
        height,
    } = output;

    text.into_iter()
        .zip(line_num)
        .zip(left.into_iter().zip(top))
        .zip(width.into_iter().zip(height))
        .filter_map(|(((text, line_index), (x, y)), (w, h))| {
            if text.trim().is_empty() {
                return None;
            }
            Some(TokenDetection {
                text,
                line_index,
                bbox: PixelBox::new(x, y, w, h),
            })
        })
}

/// Words and boxes collected for one line index
///
/// Only created from a token, so it always holds at least one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineGroup {
    words: Vec<String>,
    boxes: Vec<PixelBox>,
}

impl LineGroup {
    fn new(token: TokenDetection) -> Self {
        Self {
            words: vec![token.text],
            boxes: vec![token.bbox],
        }
    }

    fn push(&mut self, token: TokenDetection) {
        self.words.push(token.text);
        self.boxes.push(token.bbox);
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn boxes(&self) -> &[PixelBox] {
        &self.boxes
    }

    /// Union rectangle of all boxes in the group
    pub fn polygon(&self) -> Polygon {
        let (min_x, min_y, max_x, max_y) = self.boxes.iter().fold(
            (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            |(min_x, min_y, max_x, max_y), b| {
                (
                    min_x.min(b.x),
                    min_y.min(b.y),
                    max_x.max(b.right()),
                    max_y.max(b.bottom()),
                )
            },
        );

        [
            [min_x, min_y],
            [max_x, min_y],
            [max_x, max_y],
            [min_x, max_y],
        ]
    }

    fn into_text_line(self) -> TextLine {
        let polygon = self.polygon();
        TextLine {
            text: self.words.join(" "),
            polygon,
        }
    }
}

/// Groups tokens by line index, remembering first-seen order
#[derive(Debug, Default)]
pub struct LineAggregator {
    groups: Vec<LineGroup>,
    index: HashMap<i32, usize>,
}

impl LineAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: TokenDetection) {
        match self.index.get(&token.line_index) {
            Some(&slot) => self.groups[slot].push(token),
            None => {
                self.index.insert(token.line_index, self.groups.len());
                self.groups.push(LineGroup::new(token));
            }
        }
    }

    /// Number of distinct lines seen so far
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in creation order
    pub fn groups(&self) -> &[LineGroup] {
        &self.groups
    }

    pub fn into_lines(self) -> Lines {
        Lines {
            groups: self.groups.into_iter(),
        }
    }
}

impl Extend<TokenDetection> for LineAggregator {
    fn extend<I: IntoIterator<Item = TokenDetection>>(&mut self, iter: I) {
        for token in iter {
            self.push(token);
        }
    }
}

impl FromIterator<TokenDetection> for LineAggregator {
    fn from_iter<I: IntoIterator<Item = TokenDetection>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}

/// One-shot sequence of finished lines, built as they are pulled
#[derive(Debug)]
pub struct Lines {
    groups: std::vec::IntoIter<LineGroup>,
}

impl Iterator for Lines {
    type Item = TextLine;

    fn next(&mut self) -> Option<TextLine> {
        self.groups.next().map(LineGroup::into_text_line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}

impl ExactSizeIterator for Lines {}

impl FusedIterator for Lines {}

/// Full aggregation: extract, group and produce lines
pub fn group_lines(output: EngineOutput) -> Lines {
    extract_tokens(output).collect::<LineAggregator>().into_lines()
}
