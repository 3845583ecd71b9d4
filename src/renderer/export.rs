use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use egui::Color32;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use image::RgbaImage;
use log::{info, warn};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use super::{Primitive, paint_order, shape_primitives, visual_order};
use crate::config::BoardConfig;
use crate::element::{DesignElement, ElementKind, STROKE_WIDTH};
use crate::error::{BoardError, BoardResult};
use crate::raster::{ImageLoader, png_data_url};

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl ExportedImage {
    pub fn to_data_url(&self) -> String {
        png_data_url(&self.png)
    }

    pub fn save(&self, path: &Path) -> BoardResult<()> {
        std::fs::write(path, &self.png)?;
        info!("Saved export to {}", path.display());
        Ok(())
    }
}

const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Fonts tried in order for each character of a text element.
///
/// Starts with the bundled DejaVu Sans (Latin and Hebrew) followed by egui's
/// default fonts for symbols and emoji. A configured font goes in front.
#[derive(Clone)]
pub struct FontChain {
    fonts: Vec<FontArc>,
}

impl FontChain {
    pub fn bundled() -> BoardResult<Self> {
        let mut fonts = vec![FontArc::try_from_slice(BUNDLED_FONT).map_err(|_| BoardError::Font)?];
        for (name, data) in egui::FontDefinitions::default().font_data {
            match FontArc::try_from_vec(data.font.to_vec()) {
                Ok(font) => fonts.push(font),
                Err(_) => warn!("Skipping unreadable egui font {}", name),
            }
        }
        Ok(Self { fonts })
    }

    pub fn with_primary(mut self, font: FontArc) -> Self {
        self.fonts.insert(0, font);
        self
    }

    /// Index of the first font with a glyph for `ch`, falling back to the
    /// primary font's missing-glyph box.
    fn font_for(&self, ch: char) -> (usize, GlyphId) {
        self.fonts
            .iter()
            .enumerate()
            .map(|(index, font)| (index, font.glyph_id(ch)))
            .find(|(_, id)| id.0 != 0)
            .unwrap_or((0, GlyphId(0)))
    }

    pub fn covers(&self, ch: char) -> bool {
        let (_, id) = self.font_for(ch);
        id.0 != 0
    }
}

/// Composites the board onto an offscreen surface of the canonical canvas
/// size.
///
/// Every image is loaded before anything is painted. An image that fails to
/// load is left out and the rest of the board is still exported.
#[derive(Clone)]
pub struct Exporter {
    loader: Arc<dyn ImageLoader>,
    width: u32,
    height: u32,
    background: Color32,
    fonts: FontChain,
}

impl Exporter {
    pub fn new(loader: Arc<dyn ImageLoader>, config: &BoardConfig) -> BoardResult<Self> {
        let mut fonts = FontChain::bundled()?;
        if let Some(path) = &config.export.font_path {
            fonts = fonts.with_primary(load_font(path)?);
        }
        Ok(Self {
            loader,
            width: config.canvas.width,
            height: config.canvas.height,
            background: config.export.background_color(),
            fonts,
        })
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.fonts = self.fonts.with_primary(font);
        self
    }

    pub fn export(&self, elements: &[DesignElement]) -> BoxFuture<'static, BoardResult<ExportedImage>> {
        let ordered: Vec<DesignElement> = paint_order(elements).into_iter().cloned().collect();
        let loads: Vec<_> = ordered
            .iter()
            .filter_map(|element| element.src())
            .map(|src| self.loader.load(src))
            .collect();

        let surface = Surface {
            width: self.width,
            height: self.height,
            background: self.background,
            fonts: self.fonts.clone(),
        };
        future::join_all(loads)
            .map(move |loaded| surface.render(&ordered, loaded))
            .boxed()
    }
}

pub fn load_font(path: &Path) -> BoardResult<FontArc> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|_| BoardError::Font)
}

struct Surface {
    width: u32,
    height: u32,
    background: Color32,
    fonts: FontChain,
}

impl Surface {
    /// `loaded` holds one result per image element, in paint order.
    fn render(
        &self,
        ordered: &[DesignElement],
        loaded: Vec<BoardResult<Arc<RgbaImage>>>,
    ) -> BoardResult<ExportedImage> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or(BoardError::CanvasSize {
            width: self.width,
            height: self.height,
        })?;
        pixmap.fill(skia_color(self.background, 1.0));

        let mut images = loaded.into_iter();
        let mut skipped = 0;
        for element in ordered {
            match &element.kind {
                ElementKind::Image { .. } => match images.next() {
                    Some(Ok(image)) => draw_image(&mut pixmap, element, &image),
                    Some(Err(e)) => {
                        warn!("Skipping image {} in export: {}", element.id, e);
                        skipped += 1;
                    }
                    None => skipped += 1,
                },
                ElementKind::Text { content, font_size } => {
                    draw_text(&mut pixmap, element, &self.fonts, content, *font_size)
                }
                _ => draw_primitives(&mut pixmap, element),
            }
        }

        let png = pixmap
            .encode_png()
            .map_err(|e| BoardError::Encode(e.to_string()))?;
        info!(
            "Exported {} elements ({} skipped) at {}x{}",
            ordered.len() - skipped,
            skipped,
            self.width,
            self.height
        );
        Ok(ExportedImage {
            width: self.width,
            height: self.height,
            png,
        })
    }
}

/// Rotation about the element center, mirrored horizontally first when
/// flipped.
fn element_transform(element: &DesignElement) -> Transform {
    let center = element.center();
    let rotate = Transform::from_rotate_at(element.rotation, center.x, center.y);
    if element.flip_x {
        rotate.pre_concat(Transform::from_row(-1.0, 0.0, 0.0, 1.0, 2.0 * center.x, 0.0))
    } else {
        rotate
    }
}

fn skia_color(color: Color32, alpha: f32) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    tiny_skia::Color::from_rgba8(r, g, b, (f32::from(a) * alpha).round() as u8)
}

fn paint_for(color: Color32, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color, alpha));
    paint.anti_alias = true;
    paint
}

fn pixmap_from_rgba(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn draw_image(pixmap: &mut Pixmap, element: &DesignElement, image: &RgbaImage) {
    let Some(source) = pixmap_from_rgba(image) else {
        warn!("Skipping empty bitmap for {}", element.id);
        return;
    };
    let size = element.size();
    let transform = element_transform(element)
        .pre_translate(element.position.x, element.position.y)
        .pre_scale(
            size.x / source.width() as f32,
            size.y / source.height() as f32,
        );
    let paint = PixmapPaint {
        opacity: element.alpha(),
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
}

/// Rasterises the text into its own layer with the baseline one font size
/// below the element's top edge, then composites it with the element
/// transform. Each character comes from the first font in the chain that
/// has it.
fn draw_text(pixmap: &mut Pixmap, element: &DesignElement, fonts: &FontChain, content: &str, font_size: f32) {
    let Some(primary) = fonts.fonts.first() else {
        return;
    };
    let mut advance = 0.0;
    let mut previous: Option<(usize, GlyphId)> = None;
    let mut glyphs = Vec::new();
    for ch in visual_order(content).chars() {
        let (index, id) = fonts.font_for(ch);
        let font = &fonts.fonts[index];
        let scaled = font.as_scaled(font_size);
        if let Some((previous_index, previous_id)) = previous {
            if previous_index == index {
                advance += scaled.kern(previous_id, id);
            }
        }
        glyphs.push((index, id.with_scale_and_position(font_size, point(advance, font_size))));
        advance += scaled.h_advance(id);
        previous = Some((index, id));
    }

    let descent = primary.as_scaled(font_size).descent();
    let width = advance.ceil().max(1.0) as u32 + 2;
    let height = (font_size - descent).ceil().max(1.0) as u32 + 2;
    let Some(mut layer) = Pixmap::new(width, height) else {
        return;
    };

    let [r, g, b, a] = element.color.to_srgba_unmultiplied();
    for (index, glyph) in glyphs {
        let Some(outlined) = fonts.fonts[index].outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let pixels = layer.pixels_mut();
        outlined.draw(|x, y, coverage| {
            let px = bounds.min.x as i32 + x as i32;
            let py = bounds.min.y as i32 + y as i32;
            if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                return;
            }
            let index = py as usize * width as usize + px as usize;
            let alpha = (coverage.clamp(0.0, 1.0) * f32::from(a)).round() as u8;
            if alpha > pixels[index].alpha() {
                pixels[index] = ColorU8::from_rgba(r, g, b, alpha).premultiply();
            }
        });
    }

    let transform = element_transform(element).pre_translate(element.position.x, element.position.y);
    let paint = PixmapPaint {
        opacity: element.alpha(),
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, transform, None);
}

fn draw_primitives(pixmap: &mut Pixmap, element: &DesignElement) {
    let alpha = element.alpha();
    let stroke = Stroke {
        width: STROKE_WIDTH,
        ..Stroke::default()
    };

    for primitive in shape_primitives(element) {
        match primitive {
            Primitive::Segment {
                from,
                to,
                width,
                color,
            } => {
                let mut builder = PathBuilder::new();
                builder.move_to(from.x, from.y);
                builder.line_to(to.x, to.y);
                if let Some(path) = builder.finish() {
                    let stroke = Stroke {
                        width,
                        ..Stroke::default()
                    };
                    pixmap.stroke_path(&path, &paint_for(color, alpha), &stroke, Transform::identity(), None);
                }
            }
            Primitive::Polygon {
                points,
                fill,
                stroke: outline,
            } => {
                let mut builder = PathBuilder::new();
                let mut iter = points.iter();
                if let Some(first) = iter.next() {
                    builder.move_to(first.x, first.y);
                }
                for p in iter {
                    builder.line_to(p.x, p.y);
                }
                builder.close();
                let Some(path) = builder.finish() else {
                    continue;
                };
                if let Some(fill) = fill {
                    pixmap.fill_path(&path, &paint_for(fill, alpha), FillRule::Winding, Transform::identity(), None);
                }
                if let Some(color) = outline {
                    pixmap.stroke_path(&path, &paint_for(color, alpha), &stroke, Transform::identity(), None);
                }
            }
            Primitive::Circle {
                center,
                radius,
                fill,
                stroke: color,
            } => {
                let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) else {
                    continue;
                };
                if let Some(fill) = fill {
                    pixmap.fill_path(&path, &paint_for(fill, alpha), FillRule::Winding, Transform::identity(), None);
                }
                pixmap.stroke_path(&path, &paint_for(color, alpha), &stroke, Transform::identity(), None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_transform_mirrors_about_center() {
        let mut element = crate::element::factory::create_shape(
            crate::element::factory::ShapeKind::Rectangle,
            egui::pos2(0.0, 0.0),
            Color32::BLACK,
            crate::element::Fill::Transparent,
        )
        .build(crate::element::ElementId::from("r"), 1);
        element.flip_x = true;

        let mut p = [tiny_skia::Point::from_xy(0.0, 10.0)];
        element_transform(&element).map_points(&mut p);
        assert!((p[0].x - 100.0).abs() < 1e-4);
        assert!((p[0].y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_bundled_fonts_cover_latin_and_hebrew() {
        let fonts = FontChain::bundled().unwrap();
        for ch in "Sale מבצע 50%".chars().filter(|c| !c.is_whitespace()) {
            assert!(fonts.covers(ch), "no glyph for {ch:?}");
        }
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let color = skia_color(Color32::from_rgb(255, 0, 0), 0.5);
        assert!((color.alpha() - 128.0 / 255.0).abs() < 1e-3);
    }
}
