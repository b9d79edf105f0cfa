// src/gallery.rs
use crate::image_ref::ImageReference;
use crate::utils::join_base;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: u32,
    pub name: String,
    pub thumbnail: ImageReference,
    pub size_label: String,
    pub uploaded_at: String,
}

impl GalleryEntry {
    pub fn new(id: u32, name: String, thumbnail: ImageReference) -> Self {
        Self {
            id,
            name,
            thumbnail,
            size_label: String::new(),
            uploaded_at: String::new(),
        }
    }

    pub fn with_size_label(mut self, label: String) -> Self {
        self.size_label = label;
        self
    }

    pub fn with_uploaded_at(mut self, label: String) -> Self {
        self.uploaded_at = label;
        self
    }

    /// The reference handed to the viewer: the thumbnail itself, verbatim.
    pub fn image_reference(&self) -> ImageReference {
        self.thumbnail.clone()
    }
}

// Predefined gallery contents
pub struct GalleryCatalog;

impl GalleryCatalog {
    pub const HERO_IMAGE_PATH: &'static str = "public/assets/hero-nebula.png";

    /// The demo catalog, with asset paths resolved against `base`.
    pub fn demo(base: &str) -> Vec<GalleryEntry> {
        let mut entries = Vec::new();

        if let Some(thumbnail) = ImageReference::parse(join_base(base, Self::HERO_IMAGE_PATH)) {
            entries.push(
                GalleryEntry::new(1, "Cosmic Nebula".to_string(), thumbnail)
                    .with_size_label("12.4 MB".to_string())
                    .with_uploaded_at("2 hours ago".to_string()),
            );
        }

        entries
    }

    pub fn find(entries: &[GalleryEntry], id: u32) -> Option<&GalleryEntry> {
        entries.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog() {
        let entries = GalleryCatalog::demo("");
        assert_eq!(entries.len(), 1);
        let nebula = &entries[0];
        assert_eq!(nebula.name, "Cosmic Nebula");
        assert_eq!(nebula.size_label, "12.4 MB");
        assert_eq!(nebula.uploaded_at, "2 hours ago");
        assert_eq!(nebula.thumbnail.as_str(), "/public/assets/hero-nebula.png");
    }

    #[test]
    fn test_hero_asset_is_shipped() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join(GalleryCatalog::HERO_IMAGE_PATH);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{} is not a PNG", path.display());
    }

    #[test]
    fn test_catalog_respects_base() {
        let entries = GalleryCatalog::demo("/deep-zoomer");
        assert_eq!(
            entries[0].thumbnail.as_str(),
            "/deep-zoomer/public/assets/hero-nebula.png"
        );
    }

    #[test]
    fn test_selection_passes_reference_verbatim() {
        let entries = GalleryCatalog::demo("");
        let entry = GalleryCatalog::find(&entries, 1).unwrap();
        assert_eq!(entry.image_reference(), entry.thumbnail);
        assert!(GalleryCatalog::find(&entries, 42).is_none());
    }
}
