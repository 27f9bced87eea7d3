use std::path::PathBuf;

use super::{SourceError, SourceFuture, TextSource};

/// Text source reading files from disk.
///
/// URLs are joined onto the root directory. Reads are blocking (`std::fs`)
/// inside the returned future.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Create a source rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        self.root.join(url)
    }
}

impl TextSource for FileSource {
    fn fetch(&self, url: &str) -> SourceFuture<String> {
        let full_path = self.resolve(url);
        let url = url.to_owned();
        Box::pin(async move {
            let bytes = std::fs::read(&full_path).map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    SourceError::NotFound(full_path.display().to_string())
                } else {
                    SourceError::Io(err)
                }
            })?;
            String::from_utf8(bytes).map_err(|_| SourceError::InvalidUtf8(url))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("geometry_mesh_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_relative_to_root() {
        let dir = temp_dir("read");
        std::fs::write(dir.join("quad.obj"), "v 0 0 0\n").unwrap();

        let source = FileSource::new(&dir);
        let text = pollster::block_on(source.fetch("quad.obj")).unwrap();
        assert_eq!(text, "v 0 0 0\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_and_binary_files() {
        let dir = temp_dir("errors");
        std::fs::write(dir.join("bad.obj"), [0xff, 0xfe, 0x00]).unwrap();
        let source = FileSource::new(&dir);

        let missing = pollster::block_on(source.fetch("nope.obj"));
        assert!(matches!(missing, Err(SourceError::NotFound(_))));

        let binary = pollster::block_on(source.fetch("bad.obj"));
        assert!(matches!(binary, Err(SourceError::InvalidUtf8(url)) if url == "bad.obj"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
