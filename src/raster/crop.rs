use egui::{Rect, Vec2};
use futures::FutureExt;
use futures::future::BoxFuture;
use image::RgbaImage;
use image::imageops;
use log::{debug, info};

use super::ImageLoader;
use crate::element::factory;
use crate::element::{DEFAULT_OPACITY, DesignElement, ElementId, ImageSource};
use crate::geometry::{CropRegion, PixelRect};
use crate::error::BoardResult;
use crate::state::EditorModel;

/// Copies `rect` out of `image`.
pub fn crop_pixels(image: &RgbaImage, rect: PixelRect) -> RgbaImage {
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// A confirmed crop over one image element.
///
/// Crops always read the element's `original_src`, so cropping a keyed image
/// starts again from the unkeyed pixels.
#[derive(Debug, Clone)]
pub struct CropJob {
    target: ElementId,
    source: ImageSource,
    display_size: Vec2,
    region: CropRegion,
}

impl CropJob {
    /// `None` when the element is not an image or the drag, clipped to the
    /// element, is too small.
    pub fn new(element: &DesignElement, drag: Rect) -> Option<Self> {
        let source = element.original_src().or_else(|| element.src())?;
        let region = CropRegion::new(element.rect(), drag)?;
        Some(Self {
            target: element.id.clone(),
            source: source.clone(),
            display_size: element.size(),
            region,
        })
    }

    pub fn target(&self) -> &ElementId {
        &self.target
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn run(self, loader: &dyn ImageLoader) -> BoxFuture<'static, BoardResult<CropResult>> {
        let Self {
            target,
            source,
            display_size,
            region,
        } = self;
        loader
            .load(&source)
            .map(move |loaded| {
                let image = loaded?;
                let pixels = region.source_pixels(display_size, [image.width(), image.height()]);
                debug!("Cropping {:?} from {}", pixels, target);
                Ok(CropResult {
                    target,
                    region,
                    image: ImageSource::from_raster(crop_pixels(&image, pixels)),
                })
            })
            .boxed()
    }
}

#[derive(Debug, Clone)]
pub struct CropResult {
    pub target: ElementId,
    pub region: CropRegion,
    pub image: ImageSource,
}

impl CropResult {
    /// Inserts the cropped bitmap as a new element over the cropped area,
    /// on top of everything and fully opaque, then selects and commits it.
    pub fn apply(self, model: &mut EditorModel) -> ElementId {
        let draft = factory::create_image(self.image, self.region.canvas.min, self.region.canvas.size())
            .with_opacity(DEFAULT_OPACITY);
        let id = model.add_element(draft);
        model.commit();
        info!("Cropped {} into {}", self.target, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use image::Rgba;

    #[test]
    fn test_crop_pixels_copies_region() {
        let mut image = RgbaImage::new(4, 4);
        image.put_pixel(2, 1, Rgba([255, 0, 0, 255]));
        let cropped = crop_pixels(&image, PixelRect { x: 2, y: 1, width: 2, height: 3 });

        assert_eq!(cropped.dimensions(), (2, 3));
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_non_image_cannot_be_cropped() {
        let draft = factory::create_shape(
            factory::ShapeKind::Rectangle,
            pos2(0.0, 0.0),
            egui::Color32::BLACK,
            crate::element::Fill::Transparent,
        );
        let element = draft.build(ElementId::from("r"), 1);
        assert!(CropJob::new(&element, Rect::from_min_size(pos2(0.0, 0.0), Vec2::splat(50.0))).is_none());
    }
}
