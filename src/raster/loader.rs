use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, BoxFuture};
use image::{ImageFormat, RgbaImage};
use log::{debug, warn};
use parking_lot::Mutex;

use super::BitmapCache;
use crate::element::ImageSource;
use crate::error::{BoardError, BoardResult};

pub type LoadFuture = BoxFuture<'static, BoardResult<Arc<RgbaImage>>>;

const MAX_CACHED_IMAGES: usize = 32;

/// Resolves an [`ImageSource`] to decoded pixels.
///
/// The returned future owns everything it needs, so the board can keep
/// mutating while a load is in flight.
pub trait ImageLoader: Send + Sync {
    fn load(&self, source: &ImageSource) -> LoadFuture;
}

/// Loads URLs, `data:` URLs and file paths on worker threads and caches the
/// decoded result by source key.
#[derive(Clone)]
pub struct SourceLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    http: reqwest::blocking::Client,
    cache: Mutex<BitmapCache<Arc<RgbaImage>>>,
}

impl SourceLoader {
    pub fn new(timeout: Duration) -> BoardResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(LoaderInner {
                http,
                cache: Mutex::new(BitmapCache::new(MAX_CACHED_IMAGES)),
            }),
        })
    }

    pub fn cached(&self, source: &ImageSource) -> Option<Arc<RgbaImage>> {
        match source {
            ImageSource::Raster(raster) => Some(raster.pixels()),
            ImageSource::Url(url) => self.inner.cache.lock().get(url),
        }
    }

    pub fn cache_len(&self) -> usize {
        self.inner.cache.lock().len()
    }
}

impl LoaderInner {
    fn fetch(&self, location: &str) -> BoardResult<Vec<u8>> {
        if location.starts_with("data:") {
            return decode_data_url(location);
        }
        if location.starts_with("http://") || location.starts_with("https://") {
            let response = self.http.get(location).send()?.error_for_status()?;
            return Ok(response.bytes()?.to_vec());
        }
        let path = location.strip_prefix("file://").unwrap_or(location);
        Ok(std::fs::read(path)?)
    }
}

impl ImageLoader for SourceLoader {
    fn load(&self, source: &ImageSource) -> LoadFuture {
        let url = match source {
            ImageSource::Raster(raster) => return future::ready(Ok(raster.pixels())).boxed(),
            ImageSource::Url(url) => url.clone(),
        };
        if url.trim().is_empty() {
            return future::ready(Err(BoardError::ImageLoad {
                location: url,
                reason: "empty source".to_owned(),
            }))
            .boxed();
        }
        if let Some(image) = self.inner.cache.lock().get(&url) {
            return future::ready(Ok(image)).boxed();
        }

        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        let key = url.clone();
        std::thread::spawn(move || {
            let result = inner
                .fetch(&key)
                .and_then(|bytes| decode_image(&bytes))
                .map(Arc::new);
            match &result {
                Ok(image) => {
                    debug!("Loaded {}x{} image", image.width(), image.height());
                    inner.cache.lock().insert(key, image.clone());
                }
                Err(e) => warn!("Image load failed: {}", e),
            }
            let _ = tx.send(result);
        });

        rx.map(move |received| {
            received.unwrap_or_else(|_| {
                Err(BoardError::ImageLoad {
                    location: url,
                    reason: "loader thread stopped".to_owned(),
                })
            })
        })
        .boxed()
    }
}

pub fn decode_image(bytes: &[u8]) -> BoardResult<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Extracts the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> BoardResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| BoardError::DataUrl("missing data: prefix".to_owned()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| BoardError::DataUrl("missing payload".to_owned()))?;
    if !meta.ends_with(";base64") {
        return Err(BoardError::DataUrl(format!("unsupported encoding {meta:?}")));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| BoardError::DataUrl(e.to_string()))
}

pub fn encode_png(image: &RgbaImage) -> BoardResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| BoardError::Encode(e.to_string()))?;
    Ok(bytes)
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_roundtrip() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let url = png_data_url(&encode_png(&image).unwrap());
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = decode_image(&decode_data_url(&url).unwrap()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_rejects_non_base64_data_url() {
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(BoardError::DataUrl(_))
        ));
        assert!(decode_data_url("nope").is_err());
    }

    #[test]
    fn test_raster_sources_resolve_immediately() {
        let loader = SourceLoader::new(Duration::from_secs(1)).unwrap();
        let source = ImageSource::from_raster(RgbaImage::new(4, 4));
        let image = futures::executor::block_on(loader.load(&source)).unwrap();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(loader.cache_len(), 0);
    }

    #[test]
    fn test_load_from_data_url_is_cached() {
        let loader = SourceLoader::new(Duration::from_secs(1)).unwrap();
        let png = encode_png(&RgbaImage::new(5, 7)).unwrap();
        let source = ImageSource::url(png_data_url(&png));

        let image = futures::executor::block_on(loader.load(&source)).unwrap();
        assert_eq!(image.dimensions(), (5, 7));
        assert!(loader.cached(&source).is_some());
    }

    #[test]
    fn test_cache_is_bounded() {
        let loader = SourceLoader::new(Duration::from_secs(1)).unwrap();
        for i in 0..(MAX_CACHED_IMAGES + 8) {
            let png = encode_png(&RgbaImage::from_pixel(1, 1, image::Rgba([i as u8, 0, 0, 255]))).unwrap();
            futures::executor::block_on(loader.load(&ImageSource::url(png_data_url(&png)))).unwrap();
        }
        assert_eq!(loader.cache_len(), MAX_CACHED_IMAGES);
    }
}
