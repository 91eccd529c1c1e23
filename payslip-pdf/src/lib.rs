//! [`DocumentBackend`] on top of `printpdf`.
//!
//! The layout works in millimetres from the top-left of the page; PDF puts
//! the origin bottom-left, so every `y` is flipped here.

use std::io::BufWriter;

use printpdf::image_crate::GenericImageView;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference,
};
use tracing::debug;

use payslip_core::assets::DecodedImage;
use payslip_core::render::backend::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use payslip_core::render::{
    BackendFactory, DocumentBackend, DocumentError, Point, Rect, Rgb, TextAlign, TextStyle,
};

const LINE_THICKNESS_PT: f32 = 0.5;
const IMAGE_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

pub struct PrintPdfBackend {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PrintPdfBackend {
    /// An empty A4 page.
    pub fn new(title: &str) -> Result<Self, DocumentError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DocumentError::Create(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DocumentError::Create(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
        })
    }

    fn font(
        &self,
        style: &TextStyle,
    ) -> &IndirectFontRef {
        if style.is_bold() { &self.bold } else { &self.regular }
    }
}

fn pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.to_unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - y)
}

fn pdf_point(point: Point) -> printpdf::Point {
    printpdf::Point::new(Mm(point.x), flip(point.y))
}

impl DocumentBackend for PrintPdfBackend {
    type Output = Vec<u8>;

    fn add_text(
        &mut self,
        text: &str,
        at: Point,
        style: &TextStyle,
        align: TextAlign,
    ) -> Result<(), DocumentError> {
        let x = match align {
            TextAlign::Left => at.x,
            TextAlign::Right => at.x - style.width_of(text),
            TextAlign::Center => at.x - style.width_of(text) / 2.0,
        };

        self.layer.set_fill_color(pdf_color(style.color));
        self.layer
            .use_text(text, style.size, Mm(x), flip(at.y), self.font(style));
        Ok(())
    }

    fn add_image(
        &mut self,
        image: &DecodedImage,
        frame: Rect,
    ) -> Result<(), DocumentError> {
        let decoded = printpdf::image_crate::load_from_memory(&image.bytes)
            .map_err(|e| DocumentError::Image(format!("{}: {e}", image.mime_type)))?;

        let natural_width = decoded.width() as f32 / IMAGE_DPI * MM_PER_INCH;
        let natural_height = decoded.height() as f32 / IMAGE_DPI * MM_PER_INCH;
        if natural_width <= 0.0 || natural_height <= 0.0 {
            return Err(DocumentError::Image(format!("{}: empty image", image.mime_type)));
        }

        // Fit inside the frame keeping the aspect ratio, centred.
        let scale = (frame.width / natural_width).min(frame.height / natural_height);
        let width = natural_width * scale;
        let height = natural_height * scale;
        let left = frame.x + (frame.width - width) / 2.0;
        let top = frame.y + (frame.height - height) / 2.0;

        debug!(
            mime = %image.mime_type,
            width_px = decoded.width(),
            height_px = decoded.height(),
            "embedding image"
        );

        Image::from_dynamic_image(&decoded).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(left)),
                translate_y: Some(flip(top + height)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn fill_rect(
        &mut self,
        rect: Rect,
        color: Rgb,
    ) -> Result<(), DocumentError> {
        self.layer.set_fill_color(pdf_color(color));
        self.layer.add_rect(
            printpdf::Rect::new(
                Mm(rect.x),
                flip(rect.y + rect.height),
                Mm(rect.x + rect.width),
                flip(rect.y),
            )
            .with_mode(PaintMode::Fill),
        );
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgb,
    ) -> Result<(), DocumentError> {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(LINE_THICKNESS_PT);
        self.layer.add_line(Line {
            points: vec![(pdf_point(from), false), (pdf_point(to), false)],
            is_closed: false,
        });
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| DocumentError::Finish(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| DocumentError::Finish(e.to_string()))
    }
}

/// Creates a [`PrintPdfBackend`] per export. The backend itself is not
/// `Send`, so it is built on the rendering thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintPdfFactory;

impl BackendFactory for PrintPdfFactory {
    type Backend = PrintPdfBackend;

    fn create(
        &self,
        title: &str,
    ) -> Result<PrintPdfBackend, DocumentError> {
        PrintPdfBackend::new(title)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{TimeZone, Utc};
    use payslip_core::calculations::calculate;
    use payslip_core::models::PayslipFormState;
    use payslip_core::render::{RenderOptions, export_payslip};
    use pretty_assertions::assert_eq;
    use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 2));
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("encode png");
        cursor.into_inner()
    }

    #[test]
    fn empty_page_is_a_pdf() {
        let backend = PrintPdfBackend::new("Empty").unwrap();

        let bytes = backend.finish().unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn draws_every_primitive() {
        let mut backend = PrintPdfBackend::new("Primitives").unwrap();
        let style = TextStyle::bold(12.0, Rgb::BRAND_GREEN);

        backend
            .add_text("PAYSLIP", Point::new(195.0, 20.0), &style, TextAlign::Right)
            .unwrap();
        backend
            .fill_rect(Rect::new(15.0, 30.0, 180.0, 10.0), Rgb::PANEL)
            .unwrap();
        backend
            .draw_line(Point::new(15.0, 45.0), Point::new(195.0, 45.0), Rgb::RULE)
            .unwrap();
        let image = DecodedImage {
            mime_type: "image/png".to_string(),
            bytes: png_bytes(),
        };
        backend
            .add_image(&image, Rect::new(15.0, 10.0, 40.0, 20.0))
            .unwrap();

        assert!(backend.finish().unwrap().len() > 100);
    }

    #[test]
    fn undecodable_image_is_an_image_error() {
        let mut backend = PrintPdfBackend::new("Broken").unwrap();
        let image = DecodedImage {
            mime_type: "image/png".to_string(),
            bytes: b"not a png".to_vec(),
        };

        let result = backend.add_image(&image, Rect::new(0.0, 0.0, 10.0, 10.0));

        assert!(matches!(result, Err(DocumentError::Image(_))));
    }

    #[test]
    fn exports_a_complete_payslip() {
        let form = PayslipFormState {
            company_name: "Acme Ltd".to_string(),
            employee_name: "Ada Obi".to_string(),
            pay_rate: "250000".to_string(),
            tax: "7.5%".to_string(),
            ..Default::default()
        };
        let totals = calculate(&form).unwrap();
        let options = RenderOptions::new(true, Utc::now().date_naive());
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let exported = export_payslip(&PrintPdfFactory, &form, &totals, &options, at).unwrap();

        assert_eq!(exported.file_name, "payslip-Ada Obi-1700000000000.pdf");
        assert!(exported.bytes.starts_with(b"%PDF"));
    }
}
