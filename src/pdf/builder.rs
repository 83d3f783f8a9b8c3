//! Single-page PDF construction
//!
//! Builds a one-page document from JPEG images using DCTDecode image
//! XObjects, so the JPEG bytes are embedded as-is.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

/// A4 width in points
pub const A4_WIDTH_PT: f32 = 595.28;

/// A4 height in points
pub const A4_HEIGHT_PT: f32 = 841.89;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Baseline JPEG ready for embedding
#[derive(Debug, Clone)]
pub struct PageImage {
    /// RGB JPEG bytes
    pub jpeg: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// Image placement in points, PDF coordinates (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
struct PlacedImage {
    image: PageImage,
    placement: Placement,
}

/// One-page document under construction
#[derive(Debug, Clone)]
pub struct SinglePageDocument {
    width: f32,
    height: f32,
    images: Vec<PlacedImage>,
}

impl SinglePageDocument {
    /// Portrait A4 page
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
            images: Vec::new(),
        }
    }

    /// Place an image with its top-left corner `left_mm`/`top_mm` from the
    /// page's top-left corner.
    ///
    /// When `height_mm` is `None` it is derived from the image's aspect ratio.
    pub fn place_image(
        &mut self,
        image: PageImage,
        left_mm: f32,
        top_mm: f32,
        width_mm: f32,
        height_mm: Option<f32>,
    ) -> Placement {
        let width = mm_to_pt(width_mm);
        let height = match height_mm {
            Some(h) => mm_to_pt(h),
            None => width * image.pixel_height as f32 / image.pixel_width.max(1) as f32,
        };
        let placement = Placement {
            x: mm_to_pt(left_mm),
            y: self.height - mm_to_pt(top_mm) - height,
            width,
            height,
        };

        self.images.push(PlacedImage { image, placement });
        placement
    }

    /// Serialize the page into PDF bytes.
    pub fn render(&self) -> lopdf::Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut xobjects = Dictionary::new();
        let mut operations = Vec::new();

        for (index, placed) in self.images.iter().enumerate() {
            let name = format!("Im{}", index + 1);
            let image_id = doc.add_object(image_xobject(&placed.image));
            xobjects.set(name.clone(), Object::Reference(image_id));

            let p = placed.placement;
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    Object::Real(p.width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(p.height),
                    Object::Real(p.x),
                    Object::Real(p.y),
                ],
            ));
            operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(self.width),
                    Object::Real(self.height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]));

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

fn image_xobject(image: &PageImage) -> Stream {
    let dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(image.pixel_width))),
        ("Height", Object::Integer(i64::from(image.pixel_height))),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"DCTDecode".to_vec())),
    ]);
    let mut stream = Stream::new(dict, image.jpeg.clone());
    // Already DCT-encoded
    stream.allows_compression = false;
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg(width: u32, height: u32) -> PageImage {
        let image = image::DynamicImage::new_rgb8(width, height);
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 90)
            .encode_image(&image.to_rgb8())
            .unwrap();
        PageImage {
            jpeg,
            pixel_width: width,
            pixel_height: height,
        }
    }

    #[test]
    fn test_placement_from_top_left() {
        let mut doc = SinglePageDocument::a4();
        let placement = doc.place_image(tiny_jpeg(200, 100), 10.0, 10.0, 190.0, None);

        assert!((placement.x - mm_to_pt(10.0)).abs() < 0.01);
        assert!((placement.width - mm_to_pt(190.0)).abs() < 0.01);
        assert!((placement.height - mm_to_pt(95.0)).abs() < 0.01);
        let top = placement.y + placement.height;
        assert!((A4_HEIGHT_PT - top - mm_to_pt(10.0)).abs() < 0.01);
    }

    #[test]
    fn test_render_single_page_with_image() {
        let mut doc = SinglePageDocument::a4();
        doc.place_image(tiny_jpeg(8, 8), 10.0, 10.0, 190.0, None);
        let bytes = doc.render().unwrap();

        let parsed = Document::load_mem(&bytes).unwrap();
        let pages = parsed.get_pages();
        assert_eq!(pages.len(), 1);

        let has_dct_image = parsed.objects.values().any(|object| match object {
            Object::Stream(stream) => matches!(
                stream.dict.get(b"Filter"),
                Ok(Object::Name(name)) if name == b"DCTDecode"
            ),
            _ => false,
        });
        assert!(has_dct_image);
    }
}
