//! Path helpers for asset sources and exported media names

use std::path::{Path, PathBuf};

/// Normalize path for cross-platform compatibility
///
/// Converts backslashes to forward slashes so asset paths coming from a
/// Windows host resolve the same way everywhere.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path_str = path.as_ref().to_string_lossy().replace('\\', "/");
    PathBuf::from(path_str)
}

/// File name an exported media asset is stored under: `<id><.ext>`
///
/// The extension is copied verbatim from the source, and a source without one
/// yields the bare id.
pub fn media_file_name<P: AsRef<Path>>(id: &str, source: P) -> String {
    match source.as_ref().extension() {
        Some(ext) => format!("{id}.{}", ext.to_string_lossy()),
        None => id.to_string(),
    }
}

/// Reject names that would escape the directory they are joined onto
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_unix() {
        let path = Path::new("/home/user/file.txt");
        let normalized = normalize_path(path);
        assert_eq!(normalized.to_string_lossy(), "/home/user/file.txt");
    }

    #[test]
    fn test_normalize_path_windows_backslashes() {
        let path = Path::new("C:\\Users\\test\\file.txt");
        let normalized = normalize_path(path);
        assert_eq!(normalized.to_string_lossy(), "C:/Users/test/file.txt");
    }

    #[test]
    fn test_media_file_name_keeps_extension() {
        assert_eq!(media_file_name("state_0", "Assets/lobby.jpg"), "state_0.jpg");
        assert_eq!(media_file_name("state_3", "pano.final.PNG"), "state_3.PNG");
    }

    #[test]
    fn test_media_file_name_without_extension() {
        assert_eq!(media_file_name("state_1", "Assets/panorama"), "state_1");
    }

    #[test]
    fn test_is_plain_file_name() {
        assert!(is_plain_file_name("tour.json"));
        assert!(!is_plain_file_name("../tour.json"));
        assert!(!is_plain_file_name("out/tour.json"));
        assert!(!is_plain_file_name("out\\tour.json"));
        assert!(!is_plain_file_name(""));
    }
}
