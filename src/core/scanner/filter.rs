//! File filtering logic shared by the walking scanners.

use std::collections::HashSet;

/// Media classification derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Filters directory entries down to image and video files
#[derive(Debug, Clone)]
pub struct MediaFilter {
    image_extensions: HashSet<String>,
    video_extensions: HashSet<String>,
    include_hidden: bool,
}

impl MediaFilter {
    /// Create a filter with the default supported extensions
    pub fn new() -> Self {
        Self {
            image_extensions: [
                "jpg", "jpeg", "png", "webp", "heic", "heif", "gif", "bmp", "tiff", "tif",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            video_extensions: ["mp4", "mov", "mkv", "webm", "avi", "m4v", "3gp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Classify a file name by extension
    pub fn classify(&self, name: &str) -> Option<MediaKind> {
        let extension = name.rsplit_once('.')?.1.to_lowercase();
        if self.image_extensions.contains(&extension) {
            Some(MediaKind::Image)
        } else if self.video_extensions.contains(&extension) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Check if a file name should be reported. Directories and non-media
    /// files are the caller's responsibility to skip before this point.
    pub fn should_include(&self, name: &str) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return false;
        }
        self.classify(name).is_some()
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_images_and_videos() {
        let filter = MediaFilter::new();
        assert_eq!(filter.classify("photo.jpg"), Some(MediaKind::Image));
        assert_eq!(filter.classify("photo.HEIC"), Some(MediaKind::Image));
        assert_eq!(filter.classify("clip.mp4"), Some(MediaKind::Video));
        assert_eq!(filter.classify("clip.MOV"), Some(MediaKind::Video));
    }

    #[test]
    fn rejects_non_media_extensions() {
        let filter = MediaFilter::new();
        assert_eq!(filter.classify("document.txt"), None);
        assert_eq!(filter.classify("archive.zip"), None);
        assert_eq!(filter.classify("noextension"), None);
    }

    #[test]
    fn excludes_hidden_files_by_default() {
        let filter = MediaFilter::new();
        assert!(!filter.should_include(".hidden.jpg"));
        assert!(filter.should_include("visible.jpg"));
    }

    #[test]
    fn can_include_hidden_files() {
        let filter = MediaFilter::new().with_hidden(true);
        assert!(filter.should_include(".hidden.jpg"));
    }
}
