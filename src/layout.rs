//! Spatial views over a parsed page: cropping and word/line assembly.

use serde::Serialize;

use crate::model::{BBox, Glyph, PageLayout, Word};

/// Horizontal gap (in points) that still joins two glyphs into one word.
pub(crate) const WORD_X_TOLERANCE: f64 = 3.0;
/// Vertical drift (in points) tolerated between glyphs on the same line.
pub(crate) const LINE_Y_TOLERANCE: f64 = 3.0;

const BOUNDS_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CropError {
    /// The requested box has no area.
    ZeroArea,
    /// The requested box reaches outside the page.
    OutsidePage,
}

/// Glyphs of a page whose centres fall inside a box.
#[derive(Debug, Clone)]
pub struct Region<'a> {
    pub bbox: BBox,
    glyphs: Vec<&'a Glyph>,
}

impl PageLayout {
    #[must_use]
    pub fn bbox(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Strict crop: the box must have area and lie within the page.
    pub fn crop(&self, bbox: BBox) -> Result<Region<'_>, CropError> {
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(CropError::ZeroArea);
        }
        if bbox.x0 < -BOUNDS_EPSILON
            || bbox.top < -BOUNDS_EPSILON
            || bbox.x1 > self.width + BOUNDS_EPSILON
            || bbox.bottom > self.height + BOUNDS_EPSILON
        {
            return Err(CropError::OutsidePage);
        }
        Ok(self.within(bbox))
    }

    /// Lenient crop used for cell text, where out-of-page geometry just yields fewer glyphs.
    #[must_use]
    pub fn within(&self, bbox: BBox) -> Region<'_> {
        let glyphs = self
            .glyphs
            .iter()
            .filter(|glyph| {
                let (x, y) = glyph.bbox.center();
                bbox.contains_point(x, y)
            })
            .collect();
        Region { bbox, glyphs }
    }
}

impl Region<'_> {
    /// Words in reading order: lines top-down, words left-right.
    #[must_use]
    pub fn words(&self) -> Vec<Word> {
        self.lines().into_iter().flatten().collect()
    }

    /// Text lines, each the line's words joined by single spaces.
    #[must_use]
    pub fn text_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| {
                line.iter()
                    .map(|word| word.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|line| !line.trim().is_empty())
            .collect()
    }

    /// Text of the region with lines separated by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.text_lines().join("\n")
    }

    fn lines(&self) -> Vec<Vec<Word>> {
        cluster_lines(&self.glyphs)
            .into_iter()
            .map(|line| assemble_words(&line))
            .filter(|words| !words.is_empty())
            .collect()
    }
}

fn cluster_lines<'a>(glyphs: &[&'a Glyph]) -> Vec<Vec<&'a Glyph>> {
    let mut sorted = glyphs.to_vec();
    sorted.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));

    let mut lines: Vec<Vec<&Glyph>> = Vec::new();
    let mut last_top = f64::NEG_INFINITY;
    for glyph in sorted {
        match lines.last_mut() {
            Some(line) if glyph.bbox.top - last_top <= LINE_Y_TOLERANCE => line.push(glyph),
            _ => lines.push(vec![glyph]),
        }
        last_top = glyph.bbox.top;
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines
}

fn assemble_words(line: &[&Glyph]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;

    for glyph in line {
        if glyph.ch.is_whitespace() {
            words.extend(current.take());
            continue;
        }

        match current.as_mut() {
            Some(word) if glyph.bbox.x0 - word.bbox.x1 <= WORD_X_TOLERANCE => {
                word.text.push(glyph.ch);
                word.bbox = word.bbox.union(&glyph.bbox);
            }
            _ => {
                words.extend(current.take());
                current = Some(Word {
                    text: glyph.ch.to_string(),
                    bbox: glyph.bbox,
                });
            }
        }
    }

    words.extend(current);
    words
}
