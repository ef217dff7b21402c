//! Text layout into pre-transformed glyph quads.
//!
//! Text is laid out on the CPU: each visible glyph becomes one quad of four
//! [`TextVertex`] values already multiplied by the text's transform. All
//! text of a frame shares one index pattern and is drawn with a single
//! indirect command.
//!
//! # Layout rules
//!
//! - The pen starts at the origin; each glyph advances it by the glyph's
//!   advance plus the kerning between it and the next code point.
//! - `'\n'` moves the pen back to `x = 0` and down by the font's line height.
//! - Missing glyphs fall back to [`Font::FALLBACK`]; if that is missing too
//!   the character is skipped.
//! - Each glyph quad sits [`Z_BIAS`] further back than the previous one.
//! - A non-zero shadow distance emits a shadow quad per glyph, offset right
//!   and down by that distance. Shadow quads sit behind every glyph quad of
//!   the string, not only the glyph that casts them.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use lumen_core::font::{Font, Glyph};

/// Depth step between consecutive glyph quads.
pub const Z_BIAS: f32 = 0.0001;

/// Indices of one glyph quad, relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Vertices per glyph quad.
pub const QUAD_VERTICES: u32 = 4;

/// Vertex of a glyph quad.
///
/// # Memory Layout
///
/// - Total size: 52 bytes
/// - Alignment: 4 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TextVertex {
    /// World-space position (`w = 1`).
    pub position: [f32; 4],
    /// RGBA colour.
    pub color: [f32; 4],
    /// Atlas texture coordinates.
    pub uv: [f32; 2],
    /// Entity id written to the picking target.
    pub entity_id: u32,
    /// Bindless atlas handle split into low and high words.
    pub atlas: [u32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<TextVertex>(), 52);

/// One glyph quad: bottom-left, bottom-right, top-right, top-left.
pub type GlyphQuad = [TextVertex; 4];

/// Appearance of submitted text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Glyph colour.
    pub color: Vec4,
    /// Shadow offset in em units. Zero disables the shadow.
    pub shadow_distance: f32,
    /// Shadow colour.
    pub shadow_color: Vec4,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            shadow_distance: 0.0,
            shadow_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl TextStyle {
    /// Solid text without a shadow.
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Add a drop shadow.
    #[must_use]
    pub fn with_shadow(mut self, distance: f32, color: Vec4) -> Self {
        self.shadow_distance = distance;
        self.shadow_color = color;
        self
    }

    /// Whether a shadow quad is emitted per glyph.
    pub fn has_shadow(&self) -> bool {
        self.shadow_distance != 0.0
    }
}

/// Everything needed to turn a string into quads.
#[derive(Debug, Clone, Copy)]
pub struct TextLayout<'a> {
    /// Font metrics.
    pub font: &'a Font,
    /// Bindless handle of the font atlas.
    pub atlas_handle: u64,
    /// Appearance.
    pub style: TextStyle,
    /// Local-to-world transform applied on the CPU.
    pub transform: Mat4,
    /// Entity id stamped on every vertex.
    pub entity_id: u32,
}

impl TextLayout<'_> {
    /// Lay out `text`, returning quads in draw order (shadow before glyph).
    pub fn quads(&self, text: &str) -> Vec<GlyphQuad> {
        let chars: Vec<char> = text.chars().collect();
        let per_glyph = if self.style.has_shadow() { 2 } else { 1 };
        let mut quads = Vec::with_capacity(chars.len() * per_glyph);

        let visible = chars
            .iter()
            .filter(|&&c| c != '\n')
            .filter_map(|&c| self.glyph(c))
            .filter(|g| !g.plane.is_empty())
            .count();

        let mut pen_x = 0.0;
        let mut pen_y = 0.0;
        let mut depth = 0.0;
        // Below the deepest glyph at -(visible - 1) * Z_BIAS.
        let mut shadow_depth = -(visible as f32) * Z_BIAS;

        for (i, &c) in chars.iter().enumerate() {
            if c == '\n' {
                pen_x = 0.0;
                pen_y -= self.font.line_height;
                continue;
            }

            let Some(glyph) = self.glyph(c) else {
                log::warn!(
                    "Font '{}' has no glyph for {:?} and no fallback, skipping",
                    self.font.name,
                    c
                );
                continue;
            };

            if !glyph.plane.is_empty() {
                if self.style.has_shadow() {
                    let d = self.style.shadow_distance;
                    quads.push(self.quad(
                        glyph,
                        pen_x + d,
                        pen_y - d,
                        shadow_depth,
                        self.style.shadow_color,
                    ));
                    shadow_depth -= Z_BIAS;
                }
                quads.push(self.quad(glyph, pen_x, pen_y, depth, self.style.color));
                depth -= Z_BIAS;
            }

            let kerning = chars.get(i + 1).map_or(0.0, |&next| self.font.kerning(c, next));
            pen_x += glyph.advance + kerning;
        }

        quads
    }

    fn glyph(&self, c: char) -> Option<&Glyph> {
        self.font.glyph(c).or_else(|| self.font.glyph(Font::FALLBACK))
    }

    fn quad(&self, glyph: &Glyph, x: f32, y: f32, z: f32, color: Vec4) -> GlyphQuad {
        let plane = glyph.plane;
        let uv = glyph.uv;
        let atlas = [self.atlas_handle as u32, (self.atlas_handle >> 32) as u32];
        let corner = |px: f32, py: f32, u: f32, v: f32| {
            let world = self.transform.transform_point3(Vec3::new(x + px, y + py, z));
            TextVertex {
                position: world.extend(1.0).to_array(),
                color: color.to_array(),
                uv: [u, v],
                entity_id: self.entity_id,
                atlas,
            }
        };
        [
            corner(plane.left, plane.bottom, uv.left, uv.bottom),
            corner(plane.right, plane.bottom, uv.right, uv.bottom),
            corner(plane.right, plane.top, uv.right, uv.top),
            corner(plane.left, plane.top, uv.left, uv.top),
        ]
    }
}

/// Static index buffer contents for `max_quads` glyph quads.
pub fn quad_indices(max_quads: u32) -> Vec<u32> {
    (0..max_quads)
        .flat_map(|quad| QUAD_INDICES.map(|i| quad * QUAD_VERTICES + i))
        .collect()
}
