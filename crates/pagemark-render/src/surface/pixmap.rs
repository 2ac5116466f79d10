//! CPU raster surface backed by a tiny-skia pixmap.
//!
//! Paths are rasterized directly; text is drawn through ab_glyph/imageproc
//! with a best-effort system font, matching how the raster export works in
//! screenshot annotators. A missing font downgrades text to a logged no-op
//! rather than an error.

use super::{Surface, SurfaceError};
use ab_glyph::FontArc;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use kurbo::{Affine, BezPath, PathEl, Rect};
use pagemark_core::options::Shadow;
use pagemark_core::text_metrics;
use pagemark_core::{Painter, TextRun};
use peniko::Color;
use tiny_skia::{
    BlendMode, FillRule, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

/// A software-rasterized drawing surface.
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Affine,
    alpha: f64,
    dash: Vec<f64>,
    shadow: Option<Shadow>,
    clip: Option<Mask>,
    font: Option<FontArc>,
}

impl PixmapSurface {
    /// Allocate a surface. Fails when the dimensions are unrepresentable,
    /// which aborts engine construction.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(width, height)
            .ok_or(SurfaceError::Allocation(width, height))?;
        Ok(Self {
            pixmap,
            transform: Affine::IDENTITY,
            alpha: 1.0,
            dash: Vec::new(),
            shadow: None,
            clip: None,
            font: load_system_font(),
        })
    }

    /// Raw premultiplied RGBA pixel data.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Whether a font was found for raster text.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Composite another surface over this one at the origin.
    pub fn composite_over(&mut self, other: &PixmapSurface) {
        self.pixmap.draw_pixmap(
            0,
            0,
            other.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Composite raw straight-alpha RGBA pixels beneath this surface's
    /// content, returning the combined surface.
    pub fn over_background(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<PixmapSurface, SurfaceError> {
        let mut combined = PixmapSurface::new(width.max(self.width()), height.max(self.height()))?;
        if let Some(background) =
            Pixmap::from_vec(rgba.to_vec(), tiny_skia::IntSize::from_wh(width, height)
                .ok_or(SurfaceError::Allocation(width, height))?)
        {
            combined.pixmap.draw_pixmap(
                0,
                0,
                background.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        combined.composite_over(self);
        Ok(combined)
    }

    fn paint_for(&self, color: Color) -> Paint<'static> {
        let rgba = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(
            rgba.r,
            rgba.g,
            rgba.b,
            (rgba.a as f64 * self.alpha).round().clamp(0.0, 255.0) as u8,
        );
        paint.anti_alias = true;
        paint
    }

    fn stroke_for(&self, width: f64) -> Stroke {
        Stroke {
            width: width as f32,
            dash: if self.dash.is_empty() {
                None
            } else {
                StrokeDash::new(self.dash.iter().map(|d| *d as f32).collect(), 0.0)
            },
            ..Stroke::default()
        }
    }

    fn skia_transform(&self) -> Transform {
        affine_to_transform(self.transform)
    }

    /// Transform shifted by the shadow offset (applied in device space).
    fn shadow_transform(&self, shadow: &Shadow) -> Transform {
        affine_to_transform(
            Affine::translate((shadow.offset_x, shadow.offset_y)) * self.transform,
        )
    }
}

impl Painter for PixmapSurface {
    fn fill_path(&mut self, path: &BezPath, color: Color) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        // Shadow first: an offset silhouette (blur is not rasterized)
        if let Some(shadow) = self.shadow {
            let paint = self.paint_for(shadow.color.into());
            self.pixmap.fill_path(
                &skia_path,
                &paint,
                FillRule::Winding,
                self.shadow_transform(&shadow),
                self.clip.as_ref(),
            );
        }
        let paint = self.paint_for(color);
        self.pixmap.fill_path(
            &skia_path,
            &paint,
            FillRule::Winding,
            self.skia_transform(),
            self.clip.as_ref(),
        );
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let stroke = self.stroke_for(width);
        if let Some(shadow) = self.shadow {
            let paint = self.paint_for(shadow.color.into());
            self.pixmap.stroke_path(
                &skia_path,
                &paint,
                &stroke,
                self.shadow_transform(&shadow),
                self.clip.as_ref(),
            );
        }
        let paint = self.paint_for(color);
        self.pixmap.stroke_path(
            &skia_path,
            &paint,
            &stroke,
            self.skia_transform(),
            self.clip.as_ref(),
        );
    }

    fn erase_path(&mut self, path: &BezPath, width: f64) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        paint.blend_mode = BlendMode::Clear;
        let stroke = Stroke {
            width: width as f32,
            line_cap: tiny_skia::LineCap::Round,
            line_join: tiny_skia::LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &skia_path,
            &paint,
            &stroke,
            self.skia_transform(),
            self.clip.as_ref(),
        );
    }

    fn draw_text(&mut self, run: &TextRun) {
        let Some(font) = self.font.clone() else {
            log::warn!("text skipped in raster output: no system font available");
            return;
        };
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let Some(mut image) = RgbaImage::from_raw(width, height, self.pixmap.data().to_vec())
        else {
            return;
        };

        let rgba = run.color.to_rgba8();
        let color = Rgba([
            rgba.r,
            rgba.g,
            rgba.b,
            (rgba.a as f64 * self.alpha).round().clamp(0.0, 255.0) as u8,
        ]);
        // Glyphs are drawn axis-aligned; only the transform's translation
        // applies to raster text.
        let translation = self.transform.translation();
        let block_width = text_metrics::measure(run.text, run.font).width;

        for (i, line) in text_metrics::split_lines(run.text).iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let shift = match run.font.align {
                pagemark_core::TextAlign::Left => 0.0,
                pagemark_core::TextAlign::Center => {
                    (block_width - text_metrics::line_width(line, run.font)) / 2.0
                }
                pagemark_core::TextAlign::Right => {
                    block_width - text_metrics::line_width(line, run.font)
                }
            };
            let x = run.origin.x + shift + translation.x;
            let y = run.origin.y
                + i as f64 * text_metrics::line_height(run.font)
                + translation.y;
            draw_text_mut(
                &mut image,
                color,
                x.round() as i32,
                y.round() as i32,
                run.font.size as f32,
                &font,
                line,
            );
        }

        self.pixmap.data_mut().copy_from_slice(image.as_raw());
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_dash(&mut self, pattern: &[f64]) {
        self.dash = pattern.to_vec();
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.shadow = shadow.copied();
    }

    fn reset_state(&mut self) {
        self.transform = Affine::IDENTITY;
        self.alpha = 1.0;
        self.dash.clear();
        self.shadow = None;
    }
}

impl Surface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let mut resized = Pixmap::new(width, height)
            .ok_or(SurfaceError::Allocation(width, height))?;
        resized.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        self.pixmap = resized;
        self.clip = None;
        Ok(())
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn clear_region(&mut self, region: Rect) {
        let Some(rect) = tiny_skia::Rect::from_ltrb(
            region.x0 as f32,
            region.y0 as f32,
            region.x1 as f32,
            region.y1 as f32,
        ) else {
            return;
        };
        let mut paint = Paint::default();
        paint.blend_mode = BlendMode::Clear;
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn set_clip(&mut self, region: Option<Rect>) {
        self.clip = region.and_then(|region| {
            let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
            let rect = tiny_skia::Rect::from_ltrb(
                region.x0 as f32,
                region.y0 as f32,
                region.x1 as f32,
                region.y1 as f32,
            )?;
            let path = PathBuilder::from_rect(rect);
            mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
            Some(mask)
        });
    }

    fn export_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let image = RgbaImage::from_raw(
            self.pixmap.width(),
            self.pixmap.height(),
            self.pixmap.data().to_vec(),
        )
        .ok_or_else(|| SurfaceError::Encode("pixel buffer size mismatch".to_string()))?;

        let mut buffer = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

/// Convert a kurbo path into a tiny-skia path.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => {
                pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32)
            }
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn affine_to_transform(affine: Affine) -> Transform {
    let c = affine.as_coeffs();
    Transform::from_row(
        c[0] as f32,
        c[1] as f32,
        c[2] as f32,
        c[3] as f32,
        c[4] as f32,
        c[5] as f32,
    )
}

/// Best-effort system font discovery for raster text.
fn load_system_font() -> Option<FontArc> {
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/SFNS.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                return Some(font);
            }
        }
    }

    None
}
