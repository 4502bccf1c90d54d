use art_pipeline::TransformOptions;

use crate::error::RenderError;
use crate::services::image_registry::ImageHandle;
use crate::services::render_cache::{RenderCache, RenderedArt, TransformRequest};

/// Cached front door to the transform pipeline.
pub struct ArtRenderer {
    cache: RenderCache,
}

impl ArtRenderer {
    pub fn new(cache: RenderCache) -> Self {
        Self { cache }
    }

    /// Render `handle` with `options`, reusing an earlier identical render.
    ///
    /// The pipeline itself runs on the blocking pool, keeping CPU-bound
    /// crop, dither and pack work off the async runtime.
    pub async fn render(
        &self,
        handle: &ImageHandle,
        options: TransformOptions,
    ) -> Result<RenderedArt, RenderError> {
        let key = TransformRequest::new(handle.id().clone(), options.clone());
        let handle = handle.clone();

        self.cache
            .get_or_compute(key, move || art_pipeline::render(handle.image(), &options))
            .await
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }
}
