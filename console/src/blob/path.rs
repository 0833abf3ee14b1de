//! Store path helpers
//!
//! Store paths are absolute (`/a/b`), use `/` separators, never end in `/`
//! except for the root, and may not climb out of the root.

use super::BlobError;

/// Normalize a store path
pub fn normalize(path: &str) -> Result<String, BlobError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment.trim() {
            "" | "." => continue,
            ".." => {
                return Err(BlobError::Access(format!(
                    "Path escapes the store root: {}",
                    path
                )))
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}", segments.join("/")))
    }
}

/// Join a folder path and a child name
pub fn join(folder: &str, name: &str) -> String {
    let folder = folder.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    format!("{}/{}", folder, name)
}

/// Last segment of a path
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Case-insensitive suffix check, e.g. `has_extension("A.JSON", "json")`
pub fn has_extension(name: &str, extension: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(extension))
}
