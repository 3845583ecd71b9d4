use futures::FutureExt;
use futures::future::BoxFuture;
use image::RgbaImage;
use log::{debug, info};

use super::ImageLoader;
use crate::element::{DesignElement, ElementId, ElementPatch, ImageSource};
use crate::error::{BoardError, BoardResult};
use crate::state::EditorModel;

/// Keys out near-white pixels: alpha becomes 0 wherever r, g and b are all
/// strictly above `threshold`. Color channels are left as they were.
pub fn remove_white_background(image: &RgbaImage, threshold: u8) -> RgbaImage {
    let mut keyed = image.clone();
    for pixel in keyed.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r > threshold && g > threshold && b > threshold {
            pixel.0[3] = 0;
        }
    }
    keyed
}

/// Background removal captured against one element.
///
/// The job holds the element id and source at invocation time; the model is
/// only touched again when the finished result is applied.
#[derive(Debug, Clone)]
pub struct BackgroundJob {
    element_id: ElementId,
    source: ImageSource,
    threshold: u8,
}

impl BackgroundJob {
    pub fn new(element: &DesignElement, threshold: u8) -> BoardResult<Self> {
        let source = element
            .src()
            .ok_or_else(|| BoardError::NotAnImage(element.id.clone()))?;
        Ok(Self {
            element_id: element.id.clone(),
            source: source.clone(),
            threshold,
        })
    }

    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    pub fn run(self, loader: &dyn ImageLoader) -> BoxFuture<'static, BoardResult<BackgroundResult>> {
        let Self {
            element_id,
            source,
            threshold,
        } = self;
        loader
            .load(&source)
            .map(move |loaded| {
                let image = loaded?;
                debug!("Keying {}x{} image for {}", image.width(), image.height(), element_id);
                Ok(BackgroundResult {
                    element_id,
                    image: ImageSource::from_raster(remove_white_background(&image, threshold)),
                })
            })
            .boxed()
    }
}

#[derive(Debug, Clone)]
pub struct BackgroundResult {
    pub element_id: ElementId,
    pub image: ImageSource,
}

impl BackgroundResult {
    /// Replaces the element's `src` (keeping `original_src`) and commits.
    /// Returns false if the element was deleted meanwhile.
    pub fn apply(self, model: &mut EditorModel) -> bool {
        if !model.update_element(&self.element_id, ElementPatch::default().src(self.image)) {
            debug!("Background result for missing element {}", self.element_id);
            return false;
        }
        model.commit();
        info!("Removed background of {}", self.element_id);
        true
    }
}
