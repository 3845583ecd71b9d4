use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use log::debug;

/// GPU textures for image sources, keyed by [`crate::element::ImageSource::cache_key`]
/// and evicted least-recently-used once the cache is full.
pub struct TextureManager {
    texture_cache: HashMap<String, TextureHandle>,
    /// Frame in which each texture was last drawn
    last_used: HashMap<String, u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Returns the texture for `key`, uploading `image` on a miss.
    pub fn get_or_upload(&mut self, key: &str, image: &RgbaImage, ctx: &Context) -> TextureId {
        if let Some(handle) = self.texture_cache.get(key) {
            self.last_used.insert(key.to_owned(), self.current_frame);
            return handle.id();
        }

        let color_image = ColorImage::from_rgba_unmultiplied(
            [image.width() as usize, image.height() as usize],
            image.as_raw(),
        );
        let handle = ctx.load_texture(format!("board_{}", key_label(key)), color_image, TextureOptions::LINEAR);
        let id = handle.id();

        self.texture_cache.insert(key.to_owned(), handle);
        self.last_used.insert(key.to_owned(), self.current_frame);
        self.prune_cache_if_needed();
        id
    }

    pub fn contains(&self, key: &str) -> bool {
        self.texture_cache.contains_key(key)
    }

    pub fn invalidate(&mut self, key: &str) {
        self.texture_cache.remove(key);
        self.last_used.remove(key);
    }

    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(String, u64)> = self
            .last_used
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() - self.max_cache_size;
        for (key, _) in entries.into_iter().take(to_remove) {
            debug!("Evicting texture {}", key_label(&key));
            self.invalidate(&key);
        }
    }

    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }
}

// Data URLs make unwieldy texture names
fn key_label(key: &str) -> &str {
    let end = key.char_indices().nth(48).map_or(key.len(), |(i, _)| i);
    &key[..end]
}
