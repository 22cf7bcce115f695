//! # File-backed reducer.
//!
//! Resolves [`ResourceId`] `k` to `<dir>/resource<k>.txt`, reads it with
//! `tokio::fs` and sums it with [`parse::sum_positive_evens`](super::parse::sum_positive_evens).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ResourceError;
use crate::resources::{Reduce, ResourceId, parse, store};

/// Reads resources from a directory.
#[derive(Clone, Debug)]
pub struct FileReducer {
    dir: PathBuf,
}

impl FileReducer {
    /// Creates a reducer over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the resources are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one resource.
    pub fn path_of(&self, resource: ResourceId) -> PathBuf {
        store::resource_path(&self.dir, resource)
    }
}

#[async_trait]
impl Reduce for FileReducer {
    fn name(&self) -> &str {
        "file"
    }

    async fn reduce(&self, resource: ResourceId) -> Result<u64, ResourceError> {
        let path = self.path_of(resource);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ResourceError::Io {
                resource,
                error: format!("{}: {e}", path.display()),
            })?;
        parse::sum_positive_evens(resource, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_and_sums_a_resource() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resource1.txt"), "2\n-4\n3\n").unwrap();

        let reducer = FileReducer::new(dir.path());
        assert_eq!(reducer.reduce(ResourceId::new(1)).await, Ok(2));
    }

    #[tokio::test]
    async fn missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let reducer = FileReducer::new(dir.path());

        let err = reducer.reduce(ResourceId::new(9)).await.unwrap_err();
        assert_eq!(err.as_label(), "resource_io");
        assert_eq!(err.resource(), ResourceId::new(9));
    }
}
