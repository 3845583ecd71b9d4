#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use design_board::BoardError;
use design_board::element::ImageSource;
use design_board::raster::{ImageLoader, LoadFuture};
use futures::FutureExt;
use futures::future;
use image::{Rgba, RgbaImage};

/// Serves images from memory. Unknown URLs fail like a broken link.
#[derive(Default)]
pub struct MemoryLoader {
    images: HashMap<String, Arc<RgbaImage>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, image: RgbaImage) -> Self {
        self.images.insert(url.to_owned(), Arc::new(image));
        self
    }
}

impl ImageLoader for MemoryLoader {
    fn load(&self, source: &ImageSource) -> LoadFuture {
        let result = match source {
            ImageSource::Raster(raster) => Ok(raster.pixels()),
            ImageSource::Url(url) => self.images.get(url).cloned().ok_or_else(|| BoardError::ImageLoad {
                location: url.clone(),
                reason: "not found".to_owned(),
            }),
        };
        future::ready(result).boxed()
    }
}

pub fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

pub const PRODUCT_URL: &str = "https://shop.example/product.png";
