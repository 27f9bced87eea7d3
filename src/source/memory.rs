use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{SourceError, SourceFuture, TextSource};

/// In-memory text source for tests and embedded assets.
///
/// Clones share the same storage, so text can still be inserted after the
/// source has been handed out.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert text at `url`, replacing any previous text.
    pub fn insert(&self, url: impl Into<String>, text: impl Into<String>) {
        self.files.write().insert(url.into(), text.into());
    }

    pub fn remove(&self, url: &str) -> Option<String> {
        self.files.write().remove(url)
    }
}

impl TextSource for MemorySource {
    fn fetch(&self, url: &str) -> SourceFuture<String> {
        let files = self.files.clone();
        let url = url.to_owned();
        Box::pin(async move {
            let map = files.read();
            map.get(&url).cloned().ok_or(SourceError::NotFound(url))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_fetch_remove() {
        let source = MemorySource::new();
        let shared = source.clone();
        shared.insert("a.obj", "v 1 2 3");

        let text = pollster::block_on(source.fetch("a.obj")).unwrap();
        assert_eq!(text, "v 1 2 3");

        assert_eq!(source.remove("a.obj").as_deref(), Some("v 1 2 3"));
        let result = pollster::block_on(source.fetch("a.obj"));
        assert!(matches!(result, Err(SourceError::NotFound(url)) if url == "a.obj"));
    }
}
