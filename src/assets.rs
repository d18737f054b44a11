//! Staging metadata for local website assets.
//!
//! The asset folder itself is uploaded by the deployment engine. Here we only
//! compute where it will be staged: an object prefix derived from a
//! fingerprint of the folder contents, so that changed content lands under a
//! new prefix and forces the bucket deployment to run again.

use std::path::{Path, PathBuf};

use adler32::RollingAdler32;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source_path: PathBuf,
    /// 8 lowercase hex characters.
    pub fingerprint: String,
}

impl Asset {
    /// fingerprints `source_path`. an unreadable or missing folder is not an
    /// error here: it is fingerprinted by its path and left for the
    /// deployment engine to report.
    pub fn stage<P: AsRef<Path>>(source_path: P) -> Self {
        let source_path = source_path.as_ref().to_path_buf();
        let hash = match fingerprint_dir(&source_path) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(path = %source_path.display(), error = %e, "could not read asset folder, fingerprinting by path");
                RollingAdler32::from_buffer(source_path.to_string_lossy().as_bytes()).hash()
            }
        };
        let fingerprint = format!("{:08x}", hash);
        tracing::debug!(path = %source_path.display(), %fingerprint, "staged website asset");
        Self { source_path, fingerprint }
    }

    /// prefix under the staging bucket the folder is synced to.
    pub fn object_prefix(&self) -> String {
        format!("assets/{}/", self.fingerprint)
    }
}

/// hashes relative file paths and file contents in a stable (sorted) order.
fn fingerprint_dir(root: &Path) -> Result<u32, String> {
    let meta = std::fs::metadata(root).map_err(|e| e.to_string())?;
    if !meta.is_dir() {
        return Err(format!("{} is not a directory", root.display()));
    }
    let mut hasher = RollingAdler32::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| e.to_string())?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).map_err(|e| e.to_string())?;
        hasher.update_buffer(relative.to_string_lossy().as_bytes());
        let contents = std::fs::read(entry.path()).map_err(|e| e.to_string())?;
        hasher.update_buffer(&contents);
    }
    Ok(hasher.hash())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, contents).unwrap();
        }
        dir
    }

    #[test]
    fn same_contents_same_fingerprint() {
        let a = site_dir(&[("index.html", "<h1>hi</h1>"), ("css/site.css", "body{}")]);
        let b = site_dir(&[("index.html", "<h1>hi</h1>"), ("css/site.css", "body{}")]);
        let asset_a = Asset::stage(a.path());
        let asset_b = Asset::stage(b.path());
        assert_eq!(asset_a.fingerprint, asset_b.fingerprint);
        assert_eq!(asset_a.fingerprint.len(), 8);
        assert_eq!(asset_a.object_prefix(), format!("assets/{}/", asset_a.fingerprint));
    }

    #[test]
    fn changed_contents_change_fingerprint() {
        let a = site_dir(&[("index.html", "<h1>hi</h1>")]);
        let b = site_dir(&[("index.html", "<h1>bye</h1>")]);
        assert_ne!(Asset::stage(a.path()).fingerprint, Asset::stage(b.path()).fingerprint);
    }

    #[test]
    fn missing_folder_falls_back_to_path() {
        let asset = Asset::stage("./no/such/site");
        let again = Asset::stage("./no/such/site");
        assert_eq!(asset.fingerprint, again.fingerprint);
        assert_eq!(asset.source_path, PathBuf::from("./no/such/site"));
    }
}
