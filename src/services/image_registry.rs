//! Read-only set of decoded images, built once at startup.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use rand::seq::SliceRandom;

use crate::error::RegistryError;

/// Stable identity of a served image: its file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded image plus its identity. Cloning shares the pixel data.
#[derive(Clone)]
pub struct ImageHandle {
    id: ImageId,
    image: Arc<DynamicImage>,
}

impl ImageHandle {
    pub fn new(id: ImageId, image: DynamicImage) -> Self {
        Self {
            id,
            image: Arc::new(image),
        }
    }

    pub fn id(&self) -> &ImageId {
        &self.id
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Name without its extension, `cat` for `cat.png`.
    fn stem(&self) -> &str {
        Path::new(self.id.as_str())
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.id.as_str())
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("id", &self.id)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// All images the server can hand out.
#[derive(Debug)]
pub struct ImageRegistry {
    images: Vec<ImageHandle>,
}

impl ImageRegistry {
    /// Decode every file in `dir`.
    ///
    /// Files that fail to decode are logged and skipped. Fails if the
    /// directory cannot be read or nothing in it decodes.
    pub fn scan(dir: &Path) -> Result<Self, RegistryError> {
        let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            match decode(&path) {
                Ok(image) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    tracing::debug!(
                        name = %name,
                        width = image.width(),
                        height = image.height(),
                        "Loaded image"
                    );
                    images.push(ImageHandle::new(ImageId::new(name), image));
                }
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable image"),
            }
        }

        if images.is_empty() {
            return Err(RegistryError::Empty(dir.display().to_string()));
        }

        tracing::info!(dir = %dir.display(), count = images.len(), "Scanned image directory");
        Ok(Self { images })
    }

    /// Build from already decoded images.
    pub fn from_images(images: Vec<ImageHandle>) -> Result<Self, RegistryError> {
        if images.is_empty() {
            return Err(RegistryError::Empty("<memory>".to_string()));
        }
        Ok(Self { images })
    }

    /// Look up by file name, then by stem.
    pub fn get(&self, name: &str) -> Result<&ImageHandle, RegistryError> {
        self.images
            .iter()
            .find(|handle| handle.id.as_str() == name)
            .or_else(|| self.images.iter().find(|handle| handle.stem() == name))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// A uniformly random image.
    pub fn pick_any(&self) -> &ImageHandle {
        // never empty: both constructors reject an empty set
        self.images
            .choose(&mut rand::thread_rng())
            .unwrap_or(&self.images[0])
    }

    /// The named image, or a random one when the name is missing or unknown.
    pub fn select(&self, name: Option<&str>) -> &ImageHandle {
        match name {
            Some(name) => self.get(name).unwrap_or_else(|_| {
                tracing::warn!(name = %name, "Unknown image name, picking a random image");
                self.pick_any()
            }),
            None => self.pick_any(),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.images.iter()
    }
}

fn decode(path: &Path) -> Result<DynamicImage, RegistryError> {
    let io_error = |source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    };
    let decode_error = |source| RegistryError::Decode {
        path: path.to_path_buf(),
        source,
    };

    image::ImageReader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?
        .decode()
        .map_err(decode_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::collections::HashSet;

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([9, 9, 9])))
    }

    fn registry() -> ImageRegistry {
        ImageRegistry::from_images(vec![
            ImageHandle::new(ImageId::new("cat.png"), solid(4, 2)),
            ImageHandle::new(ImageId::new("dog.jpg"), solid(2, 4)),
        ])
        .unwrap()
    }

    #[test]
    fn test_get_by_name_and_stem() {
        let registry = registry();
        assert_eq!(registry.get("cat.png").unwrap().id().as_str(), "cat.png");
        assert_eq!(registry.get("dog").unwrap().id().as_str(), "dog.jpg");
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        assert!(matches!(
            registry().get("bird"),
            Err(RegistryError::NotFound(name)) if name == "bird"
        ));
    }

    #[test]
    fn test_select_falls_back() {
        let registry = registry();
        let names: HashSet<_> = ["cat.png", "dog.jpg"].into_iter().collect();

        assert_eq!(registry.select(Some("cat")).id().as_str(), "cat.png");
        assert!(names.contains(registry.select(Some("bird")).id().as_str()));
        assert!(names.contains(registry.select(None).id().as_str()));
    }

    #[test]
    fn test_pick_any_reaches_every_image() {
        let registry = registry();
        let seen: HashSet<_> = (0..200)
            .map(|_| registry.pick_any().id().clone())
            .collect();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            ImageRegistry::from_images(Vec::new()),
            Err(RegistryError::Empty(_))
        ));
    }

    #[test]
    fn test_scan_skips_undecodable_files() {
        let dir = tempfile::tempdir().unwrap();
        solid(3, 3).save(dir.path().join("b.png")).unwrap();
        solid(5, 1).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let registry = ImageRegistry::scan(dir.path()).unwrap();
        let names: Vec<_> = registry.iter().map(|h| h.id().to_string()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(registry.get("a").unwrap().image().width(), 5);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), "# nothing here").unwrap();

        assert!(matches!(
            ImageRegistry::scan(dir.path()),
            Err(RegistryError::Empty(_))
        ));
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageRegistry::scan(&dir.path().join("missing")),
            Err(RegistryError::Io { .. })
        ));
    }
}
