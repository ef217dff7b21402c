//! Font atlas metrics.
//!
//! Fonts are rasterised into a multi-channel distance field atlas by the
//! importer. The renderer only needs per-glyph metrics and kerning pairs to
//! lay out text quads.

use std::collections::HashMap;

use crate::handle::TextureId;

/// Axis-aligned rectangle in left/bottom/right/top form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphRect {
    /// Left edge.
    pub left: f32,
    /// Bottom edge.
    pub bottom: f32,
    /// Right edge.
    pub right: f32,
    /// Top edge.
    pub top: f32,
}

impl GlyphRect {
    /// Create a rectangle.
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Whether the rectangle has no area (e.g. the space glyph).
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.top <= self.bottom
    }
}

/// Metrics of one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Glyph {
    /// Horizontal advance in em units.
    pub advance: f32,
    /// Atlas texture coordinates (normalised).
    pub uv: GlyphRect,
    /// Quad bounds relative to the pen position, in em units.
    pub plane: GlyphRect,
}

/// A font: glyph metrics, kerning, line height and its atlas texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// Font name.
    pub name: String,
    /// Atlas texture.
    pub atlas: TextureId,
    /// Distance between baselines, in em units.
    pub line_height: f32,
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), f32>,
}

impl Font {
    /// Code point substituted for glyphs missing from the atlas.
    pub const FALLBACK: char = '?';

    /// Create a font with no glyphs.
    pub fn new(name: impl Into<String>, atlas: TextureId, line_height: f32) -> Self {
        Self {
            name: name.into(),
            atlas,
            line_height,
            glyphs: HashMap::new(),
            kerning: HashMap::new(),
        }
    }

    /// Add a glyph.
    #[must_use]
    pub fn with_glyph(mut self, code_point: char, glyph: Glyph) -> Self {
        self.glyphs.insert(code_point, glyph);
        self
    }

    /// Add a kerning adjustment applied between `left` and `right`.
    #[must_use]
    pub fn with_kerning(mut self, left: char, right: char, adjustment: f32) -> Self {
        self.kerning.insert((left, right), adjustment);
        self
    }

    /// Look up a glyph.
    pub fn glyph(&self, code_point: char) -> Option<&Glyph> {
        self.glyphs.get(&code_point)
    }

    /// Kerning adjustment between two consecutive code points (0 if none).
    pub fn kerning(&self, left: char, right: char) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    /// Number of glyphs in the font.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}
