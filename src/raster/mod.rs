//! Pixel work on image elements: loading, background keying and cropping.
//!
//! Jobs capture what they need from the model up front and hand back a
//! result that is applied to the model when the load finishes.

pub mod background;
pub mod cache;
pub mod crop;
pub mod loader;

pub use background::{BackgroundJob, BackgroundResult, remove_white_background};
pub use cache::BitmapCache;
pub use crop::{CropJob, CropResult};
pub use loader::{ImageLoader, LoadFuture, SourceLoader, decode_image, encode_png, png_data_url};
