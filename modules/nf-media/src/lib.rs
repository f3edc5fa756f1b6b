pub mod cdn;
pub mod image_gen;
pub mod media_host;
pub mod video_gen;

pub use cdn::{CdnAdapter, HttpCdnAdapter};
pub use image_gen::{HttpImageGenAdapter, ImageGenAdapter};
pub use media_host::{AssetInfo, HttpMediaHostAdapter, MediaHostAdapter};
pub use video_gen::{HttpVideoGenAdapter, VideoGenAdapter};
