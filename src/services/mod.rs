pub mod image_registry;
pub mod render_cache;
pub mod renderer;

pub use image_registry::{ImageHandle, ImageId, ImageRegistry};
pub use render_cache::{
    CacheStats, EvictionPolicy, Lru, RenderCache, RenderedArt, TransformRequest, Unbounded,
};
pub use renderer::ArtRenderer;
