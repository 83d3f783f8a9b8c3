//! Color model utilities
//!
//! Background detection works on quantized 8-bit colors; matching compares
//! the un-quantized 16-bit channels. Both read the same `Rgba<u16>` view of an
//! image so 8-bit and 16-bit sources behave identically.

use std::collections::HashMap;

use image::{ImageBuffer, Rgba};

/// 16-bit RGBA pixel grid used for detection and matching
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Width of the sampled band along each edge, in pixels
pub const EDGE_SAMPLE_WIDTH: u32 = 10;

/// Per-channel tolerance on the 16-bit scale (out of 65535)
pub const MATCH_TOLERANCE: u32 = 5000;

/// Quantized RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Expand back to the 16-bit scale (`v * 257`, so 0xff maps to 0xffff)
    pub fn to_rgba16(self) -> Rgba<u16> {
        let widen = |v: u8| u16::from(v) * 257;
        Rgba([widen(self.r), widen(self.g), widen(self.b), widen(self.a)])
    }
}

/// Most frequent edge color and how many samples carried it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundSample {
    pub color: Color,
    pub count: usize,
}

/// Reduce a 16-bit sample to 8-bit channels.
pub fn quantize(pixel: Rgba<u16>) -> Color {
    let [r, g, b, a] = pixel.0;
    Color::new((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8)
}

/// Compare two colors on the 16-bit scale, ignoring alpha.
///
/// True only when each of R, G and B differs by strictly less than
/// [`MATCH_TOLERANCE`].
pub fn is_color_match(a: Rgba<u16>, b: Rgba<u16>) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .take(3)
        .all(|(x, y)| u32::from(x.abs_diff(*y)) < MATCH_TOLERANCE)
}

/// Detect the background color by sampling a band along every edge.
///
/// Scan order is fixed: for each row, the left band then the right band;
/// then for each column, the top band then the bottom band. Ties resolve to
/// the color seen first in that order. Bands are clamped to the image, so
/// narrow images sample overlapping pixels more than once.
///
/// Returns `None` for zero-area images.
pub fn detect_background_color(image: &Rgba16Image) -> Option<BackgroundSample> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let band_x = EDGE_SAMPLE_WIDTH.min(width);
    let band_y = EDGE_SAMPLE_WIDTH.min(height);

    // color -> (count, first seen)
    let mut table: HashMap<Color, (usize, usize)> = HashMap::new();
    let mut seen = 0usize;
    let mut tally = |pixel: &Rgba<u16>| {
        let entry = table.entry(quantize(*pixel)).or_insert((0, seen));
        entry.0 += 1;
        seen += 1;
    };

    for y in 0..height {
        for x in 0..band_x {
            tally(image.get_pixel(x, y));
        }
        for x in width - band_x..width {
            tally(image.get_pixel(x, y));
        }
    }

    for x in 0..width {
        for y in 0..band_y {
            tally(image.get_pixel(x, y));
        }
        for y in height - band_y..height {
            tally(image.get_pixel(x, y));
        }
    }

    table
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(color, (count, _))| BackgroundSample { color, count })
}
