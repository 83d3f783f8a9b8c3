//! Raster image handling
//!
//! Decoding and encoding of JPEG/PNG uploads, background color detection and
//! the pixel-level transforms behind the image routes.

pub mod codec;
pub mod color;
pub mod transform;

pub use codec::{decode_image, detect_format, encode_image, RasterImage, SourceFormat};
pub use color::{detect_background_color, is_color_match, quantize, BackgroundSample, Color};
