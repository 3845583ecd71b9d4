use std::sync::Arc;

use egui::epaint::TextShape;
use egui::emath::Rot2;
use egui::{Color32, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2};
use image::RgbaImage;
use log::warn;
use parking_lot::Mutex;

use super::{Primitive, TextureManager, paint_order, shape_primitives, visual_order};
use crate::element::{DesignElement, ElementId, ElementKind, ImageSource};
use crate::geometry::hit_testing::transformed_corners;
use crate::geometry::{ElementTransform, Viewport, selection_handles};
use crate::raster::{BitmapCache, ImageLoader};

const SELECTION_COLOR: Color32 = Color32::from_rgb(59, 130, 246);
const CROP_FILL: Color32 = Color32::from_rgba_premultiplied(30, 64, 120, 60);
const PLACEHOLDER_COLOR: Color32 = Color32::from_gray(220);
const HANDLE_SIZE: f32 = 8.0;
const MAX_TEXTURES: usize = 64;
const MAX_BITMAPS: usize = 64;

/// Decode state of one image source.
#[derive(Clone)]
pub enum BitmapSlot {
    Loading,
    Ready(Arc<RgbaImage>),
    Failed,
}

/// What the interactive view draws on top of the elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub selected: Option<ElementId>,
    /// Live crop rectangle in canvas space.
    pub crop_rect: Option<Rect>,
}

/// Paints the board into an egui painter.
///
/// Image sources are decoded in the background through the loader; until a
/// bitmap arrives its element is drawn as a placeholder box.
pub struct CanvasView {
    loader: Arc<dyn ImageLoader>,
    bitmaps: Arc<Mutex<BitmapCache<BitmapSlot>>>,
    textures: TextureManager,
}

impl CanvasView {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            loader,
            bitmaps: Arc::new(Mutex::new(BitmapCache::new(MAX_BITMAPS))),
            textures: TextureManager::new(MAX_TEXTURES),
        }
    }

    pub fn bitmap(&self, source: &ImageSource) -> Option<BitmapSlot> {
        if let ImageSource::Raster(raster) = source {
            return Some(BitmapSlot::Ready(raster.pixels()));
        }
        self.bitmaps.lock().get(&source.cache_key())
    }

    /// Pixel size of a decoded source, if it has finished loading.
    pub fn natural_size(&self, source: &ImageSource) -> Option<Vec2> {
        match self.bitmap(source)? {
            BitmapSlot::Ready(image) => Some(Vec2::new(image.width() as f32, image.height() as f32)),
            _ => None,
        }
    }

    /// Starts decoding `source` unless it is already known. `ctx` is asked to
    /// repaint once the bitmap lands.
    pub fn request(&self, source: &ImageSource, ctx: &egui::Context) {
        if matches!(source, ImageSource::Raster(_)) || source.is_empty() {
            return;
        }
        let key = source.cache_key();
        {
            let mut bitmaps = self.bitmaps.lock();
            if bitmaps.contains(&key) {
                return;
            }
            bitmaps.insert(key.clone(), BitmapSlot::Loading);
        }

        let load = self.loader.load(source);
        let bitmaps = self.bitmaps.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let slot = match futures::executor::block_on(load) {
                Ok(image) => BitmapSlot::Ready(image),
                Err(e) => {
                    warn!("Could not display image: {}", e);
                    BitmapSlot::Failed
                }
            };
            bitmaps.lock().insert(key, slot);
            ctx.request_repaint();
        });
    }

    /// Draws the canvas background, every element in paint order and the
    /// overlay.
    pub fn paint(
        &mut self,
        painter: &Painter,
        viewport: Viewport,
        canvas_size: Vec2,
        background: Color32,
        elements: &[DesignElement],
        overlay: &Overlay,
    ) {
        self.textures.begin_frame();
        let canvas = viewport.rect_to_screen(Rect::from_min_size(Pos2::ZERO, canvas_size));
        painter.rect_filled(canvas, 0.0, background);

        let painter = painter.with_clip_rect(canvas);
        for element in paint_order(elements) {
            match &element.kind {
                ElementKind::Image { src, .. } => self.paint_image(&painter, viewport, element, src),
                ElementKind::Text { content, font_size } => {
                    paint_text(&painter, viewport, element, content, *font_size)
                }
                _ => paint_primitives(&painter, viewport, element),
            }
        }

        if let Some(selected) = overlay
            .selected
            .as_ref()
            .and_then(|id| elements.iter().find(|e| &e.id == id))
        {
            paint_selection(&painter, viewport, selected);
        }
        if let Some(crop) = overlay.crop_rect {
            let rect = viewport.rect_to_screen(crop);
            painter.rect_filled(rect, 0.0, CROP_FILL);
            painter.rect_stroke(rect, 0.0, Stroke::new(1.5, SELECTION_COLOR));
        }
    }

    fn paint_image(&mut self, painter: &Painter, viewport: Viewport, element: &DesignElement, src: &ImageSource) {
        self.request(src, painter.ctx());
        let corners = transformed_corners(element).map(|p| viewport.to_screen(p));
        let alpha = element.alpha();

        let image = match self.bitmap(src) {
            Some(BitmapSlot::Ready(image)) => image,
            _ => {
                painter.add(Shape::convex_polygon(
                    corners.to_vec(),
                    PLACEHOLDER_COLOR.gamma_multiply(alpha),
                    Stroke::NONE,
                ));
                return;
            }
        };

        let texture = self.textures.get_or_upload(&src.cache_key(), &image, painter.ctx());
        let rect = viewport.rect_to_screen(element.rect());
        let uv = if element.flip_x {
            Rect::from_min_max(pos2(1.0, 0.0), pos2(0.0, 1.0))
        } else {
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0))
        };

        let mut mesh = Mesh::with_texture(texture);
        mesh.add_rect_with_uv(rect, uv, Color32::WHITE.gamma_multiply(alpha));
        if element.rotation != 0.0 {
            mesh.rotate(Rot2::from_angle(element.rotation.to_radians()), rect.center());
        }
        painter.add(Shape::mesh(mesh));
    }
}

fn paint_text(painter: &Painter, viewport: Viewport, element: &DesignElement, content: &str, font_size: f32) {
    let color = element.color.gamma_multiply(element.alpha());
    let galley = painter.layout_no_wrap(
        visual_order(content).into_owned(),
        FontId::proportional(viewport.scale(font_size)),
        color,
    );
    // Glyphs cannot be mirrored here, so only rotation moves the anchor
    let transform = ElementTransform {
        flip_x: false,
        ..ElementTransform::for_element(element)
    };
    let anchor = viewport.to_screen(transform.apply(element.position));
    painter.add(TextShape::new(anchor, galley, color).with_angle(transform.rotation_radians));
}

fn paint_primitives(painter: &Painter, viewport: Viewport, element: &DesignElement) {
    let alpha = element.alpha();
    for primitive in shape_primitives(element) {
        match primitive {
            Primitive::Segment {
                from,
                to,
                width,
                color,
            } => {
                painter.line_segment(
                    [viewport.to_screen(from), viewport.to_screen(to)],
                    Stroke::new(viewport.scale(width), color.gamma_multiply(alpha)),
                );
            }
            Primitive::Polygon {
                points,
                fill,
                stroke,
            } => {
                let points: Vec<Pos2> = points.into_iter().map(|p| viewport.to_screen(p)).collect();
                let stroke = stroke.map_or(Stroke::NONE, |color| {
                    Stroke::new(viewport.scale(crate::element::STROKE_WIDTH), color.gamma_multiply(alpha))
                });
                match fill {
                    Some(fill) => {
                        painter.add(Shape::convex_polygon(points, fill.gamma_multiply(alpha), stroke));
                    }
                    None => {
                        painter.add(Shape::closed_line(points, stroke));
                    }
                }
            }
            Primitive::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                painter.circle(
                    viewport.to_screen(center),
                    viewport.scale(radius),
                    fill.map_or(Color32::TRANSPARENT, |c| c.gamma_multiply(alpha)),
                    Stroke::new(
                        viewport.scale(crate::element::STROKE_WIDTH),
                        stroke.gamma_multiply(alpha),
                    ),
                );
            }
        }
    }
}

fn paint_selection(painter: &Painter, viewport: Viewport, element: &DesignElement) {
    let outline: Vec<Pos2> = transformed_corners(element)
        .into_iter()
        .map(|p| viewport.to_screen(p))
        .collect();
    painter.add(Shape::closed_line(outline, Stroke::new(2.0, SELECTION_COLOR)));

    for handle in selection_handles(element) {
        let rect = Rect::from_center_size(viewport.to_screen(handle.center()), Vec2::splat(HANDLE_SIZE));
        painter.rect_filled(rect, 1.0, Color32::WHITE);
        painter.rect_stroke(rect, 1.0, Stroke::new(1.5, SELECTION_COLOR));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory::{ShapeKind, create_image, create_shape, create_text};
    use crate::element::{ElementId, Fill};
    use crate::error::BoardResult;
    use crate::raster::LoadFuture;
    use futures::FutureExt;

    struct NoLoader;

    impl ImageLoader for NoLoader {
        fn load(&self, source: &ImageSource) -> LoadFuture {
            let result: BoardResult<Arc<RgbaImage>> = Err(crate::error::BoardError::ImageLoad {
                location: source.cache_key(),
                reason: "offline".into(),
            });
            futures::future::ready(result).boxed()
        }
    }

    #[test]
    fn test_paints_every_kind_headlessly() {
        let raster = ImageSource::from_raster(RgbaImage::new(8, 8));
        let mut photo = create_image(raster.clone(), pos2(10.0, 10.0), Vec2::splat(50.0)).build(ElementId::from("img"), 1);
        photo.rotation = 45.0;
        let mut elements = vec![
            photo,
            create_text("Sale", Color32::RED).unwrap().build(ElementId::from("txt"), 2),
        ];
        for (i, shape) in ShapeKind::ALL.into_iter().enumerate() {
            let mut element = create_shape(shape, pos2(20.0, 20.0), Color32::BLACK, Fill::Solid(Color32::WHITE))
                .build(ElementId::from(shape.label()), 3 + i as i32);
            element.rotation = 30.0;
            element.flip_x = true;
            elements.push(element);
        }

        let mut view = CanvasView::new(Arc::new(NoLoader));
        let overlay = Overlay {
            selected: Some(ElementId::from("img")),
            crop_rect: Some(Rect::from_min_size(pos2(5.0, 5.0), Vec2::splat(20.0))),
        };
        let ctx = egui::Context::default();
        let _ = ctx.run(Default::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let viewport = Viewport::new(ui.max_rect().min, 1.5);
                view.paint(ui.painter(), viewport, Vec2::new(800.0, 600.0), Color32::WHITE, &elements, &overlay);
            });
        });

        assert_eq!(view.textures.cache_size(), 1);
        assert_eq!(view.natural_size(&raster), Some(Vec2::splat(8.0)));
    }
}
