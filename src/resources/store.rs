//! # Resource directory layout, discovery and synthetic generation.
//!
//! Resources live in one directory as `resource1.txt`, `resource2.txt`, ...
//! When a directory holds fewer resources than requested, synthetic ones can
//! be generated: each holds `size` random integers in `(-i32::MAX, i32::MAX)`,
//! one per line.

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::resources::ResourceId;

/// Path of `resource` inside `dir`.
pub fn resource_path(dir: &Path, resource: ResourceId) -> PathBuf {
    dir.join(format!("resource{}.txt", resource.index()))
}

/// Counts the `resource<k>.txt` files present in `dir`, for `k = 1, 2, ...`
/// until the first gap.
pub async fn discover(dir: &Path) -> io::Result<Vec<ResourceId>> {
    let mut found = Vec::new();
    let mut next = ResourceId::new(1);
    while tokio::fs::try_exists(resource_path(dir, next)).await? {
        found.push(next);
        next = ResourceId::new(next.index() + 1);
    }
    Ok(found)
}

/// Writes `count` synthetic resources of `size` integers each into `dir`,
/// overwriting existing ones.
pub async fn generate(dir: &Path, count: usize, size: usize) -> io::Result<Vec<ResourceId>> {
    tokio::fs::create_dir_all(dir).await?;
    let ids = ResourceId::range(count);
    for id in &ids {
        let body = random_body(size);
        tokio::fs::write(resource_path(dir, *id), body).await?;
    }
    Ok(ids)
}

/// Returns the resources of `dir`, generating `count` of them when fewer exist.
pub async fn discover_or_generate(
    dir: &Path,
    count: usize,
    size: usize,
) -> io::Result<Vec<ResourceId>> {
    let found = discover(dir).await?;
    if found.len() >= count {
        return Ok(found);
    }
    generate(dir, count, size).await
}

fn random_body(size: usize) -> String {
    let mut rng = rand::rng();
    let mut body = String::with_capacity(size * 12);
    for _ in 0..size {
        let magnitude = i64::from(rng.random_range(0..i32::MAX));
        let value = if rng.random_bool(0.5) { magnitude } else { -magnitude };
        body.push_str(&value.to_string());
        body.push('\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::parse;

    #[tokio::test]
    async fn generated_resources_are_discoverable_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        let ids = generate(dir.path(), 4, 7).await.unwrap();
        assert_eq!(ids, ResourceId::range(4));

        let found = discover(dir.path()).await.unwrap();
        assert_eq!(found, ids);

        let text = std::fs::read_to_string(resource_path(dir.path(), ids[0])).unwrap();
        assert_eq!(text.lines().count(), 7);
        assert!(parse::sum_positive_evens(ids[0], &text).is_ok());
    }

    #[tokio::test]
    async fn discovery_stops_at_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resource1.txt"), "1\n").unwrap();
        std::fs::write(dir.path().join("resource3.txt"), "1\n").unwrap();

        let found = discover(dir.path()).await.unwrap();
        assert_eq!(found, vec![ResourceId::new(1)]);
    }

    #[tokio::test]
    async fn existing_resources_are_kept_when_enough() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resource1.txt"), "2\n").unwrap();
        std::fs::write(dir.path().join("resource2.txt"), "4\n").unwrap();

        let ids = discover_or_generate(dir.path(), 2, 7).await.unwrap();
        assert_eq!(ids.len(), 2);
        let text = std::fs::read_to_string(dir.path().join("resource2.txt")).unwrap();
        assert_eq!(text, "4\n");
    }
}
