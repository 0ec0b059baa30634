//! Plain-text document loading.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::warn;
use walkdir::WalkDir;

/// A loaded source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name relative to the loaded directory.
    pub name: String,
    pub content: String,
}

/// Load every `.txt` file under `dir`, recursively. Unreadable files are
/// logged and skipped so one bad file never sinks a batch. Results are
/// sorted by name for a stable chunk-id assignment across runs.
pub fn load_documents(dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    let mut documents = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }

        let name = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        match fs::read_to_string(path) {
            Ok(content) => documents.push(Document { name, content }),
            Err(err) => {
                warn!(file = %path.display(), %err, "skipping unreadable file");
            }
        }
    }

    documents.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("docshard_loader_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_loads_only_txt_files_sorted() {
        let dir = temp_dir("sorted");
        fs::write(dir.join("b.txt"), "beta").unwrap();
        fs::write(dir.join("a.txt"), "alpha").unwrap();
        fs::write(dir.join("notes.md"), "ignored").unwrap();

        let docs = load_documents(&dir).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "a.txt");
        assert_eq!(docs[0].content, "alpha");
        assert_eq!(docs[1].name, "b.txt");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_recurses_into_subdirectories() {
        let dir = temp_dir("nested");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("sub/inner.txt"), "nested").unwrap();

        let docs = load_documents(&dir).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].name.ends_with("inner.txt"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_does_not_sink_the_batch() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir("locked");
        fs::write(dir.join("ok.txt"), "fine").unwrap();
        let locked = dir.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // The locked subtree is logged and skipped; the rest still loads.
        let docs = load_documents(&dir).unwrap();
        assert!(docs.iter().any(|d| d.name == "ok.txt"));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_directory_yields_no_documents() {
        let dir = temp_dir("empty");
        let docs = load_documents(&dir).unwrap();
        assert!(docs.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }
}
