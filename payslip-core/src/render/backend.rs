//! The drawing-primitive port the PDF layout is written against.
//!
//! Coordinates are millimetres measured from the top-left corner of an A4
//! page (210 × 297 mm), with `y` growing downwards.

use thiserror::Error;

use super::color::Rgb;
use super::metrics;
use crate::assets::DecodedImage;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(
        x: f32,
        y: f32,
    ) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Where `at.x` sits relative to the drawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn normal(
        size: f32,
        color: Rgb,
    ) -> Self {
        Self {
            size,
            weight: FontWeight::Normal,
            color,
        }
    }

    pub const fn bold(
        size: f32,
        color: Rgb,
    ) -> Self {
        Self {
            size,
            weight: FontWeight::Bold,
            color,
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    /// Rendered width of `text` in millimetres.
    pub fn width_of(
        &self,
        text: &str,
    ) -> f32 {
        metrics::text_width_mm(text, self.size, self.is_bold())
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to create document: {0}")]
    Create(String),

    #[error("failed to draw {primitive}: {reason}")]
    Draw {
        primitive: &'static str,
        reason: String,
    },

    #[error("failed to embed image: {0}")]
    Image(String),

    #[error("failed to finalise document: {0}")]
    Finish(String),
}

/// A single-page document surface.
pub trait DocumentBackend {
    type Output;

    fn add_text(
        &mut self,
        text: &str,
        at: Point,
        style: &TextStyle,
        align: TextAlign,
    ) -> Result<(), DocumentError>;

    /// Draws an image scaled into `frame`. Implementations report undecodable
    /// image data as [`DocumentError::Image`].
    fn add_image(
        &mut self,
        image: &DecodedImage,
        frame: Rect,
    ) -> Result<(), DocumentError>;

    fn fill_rect(
        &mut self,
        rect: Rect,
        color: Rgb,
    ) -> Result<(), DocumentError>;

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgb,
    ) -> Result<(), DocumentError>;

    /// Splits `text` into lines no wider than `max_width` millimetres.
    fn wrap_text(
        &self,
        text: &str,
        max_width: f32,
        style: &TextStyle,
    ) -> Vec<String> {
        metrics::wrap_to_width(text, max_width, style.size, style.is_bold())
    }

    fn finish(self) -> Result<Self::Output, DocumentError>
    where
        Self: Sized;
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        at: Point,
        style: TextStyle,
        align: TextAlign,
    },
    Image {
        mime_type: String,
        frame: Rect,
    },
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
    },
}

/// Backend that records primitives instead of drawing them. Used for dry
/// runs and to inspect layouts in tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    ops: Vec<DrawOp>,
    reject_images: bool,
    fail_on_text: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `add_image` call fails as if the image data were corrupt.
    pub fn rejecting_images(mut self) -> Self {
        self.reject_images = true;
        self
    }

    /// `add_text` fails when asked to draw exactly `text`.
    pub fn failing_on_text(
        mut self,
        text: impl Into<String>,
    ) -> Self {
        self.fail_on_text = Some(text.into());
        self
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }
}

impl DocumentBackend for RecordingBackend {
    type Output = Vec<DrawOp>;

    fn add_text(
        &mut self,
        text: &str,
        at: Point,
        style: &TextStyle,
        align: TextAlign,
    ) -> Result<(), DocumentError> {
        if self.fail_on_text.as_deref() == Some(text) {
            return Err(DocumentError::Draw {
                primitive: "text",
                reason: format!("refused to draw '{text}'"),
            });
        }
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            style: *style,
            align,
        });
        Ok(())
    }

    fn add_image(
        &mut self,
        image: &DecodedImage,
        frame: Rect,
    ) -> Result<(), DocumentError> {
        if self.reject_images {
            return Err(DocumentError::Image(format!(
                "cannot decode {} image",
                image.mime_type
            )));
        }
        self.ops.push(DrawOp::Image {
            mime_type: image.mime_type.clone(),
            frame,
        });
        Ok(())
    }

    fn fill_rect(
        &mut self,
        rect: Rect,
        color: Rgb,
    ) -> Result<(), DocumentError> {
        self.ops.push(DrawOp::FillRect { rect, color });
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgb,
    ) -> Result<(), DocumentError> {
        self.ops.push(DrawOp::Line { from, to, color });
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, DocumentError> {
        Ok(self.ops)
    }
}
