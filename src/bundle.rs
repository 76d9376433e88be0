//! The artifact bundle and its staged, all-or-nothing commit to disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{ArchiveError, Producer};

/// Artifact name for the plain-text body.
pub const PLAIN_TEXT: &str = "plain.txt";
/// Artifact name for the cleaned, template-wrapped HTML body.
pub const STRIPPED_HTML: &str = "stripped.html";
/// Artifact name for the self-contained full-page snapshot.
pub const FULL_PAGE_HTML: &str = "full_page.html";
/// Artifact name for the sidecar metadata record.
pub const META_FILE: &str = ".meta";

/// Named byte-content outputs of one pipeline run.
///
/// Built up on a single task, immutable once complete; persisted as a unit
/// by [`commit_bundle`].
#[derive(Debug, Default)]
pub struct ArtifactBundle {
    artifacts: BTreeMap<String, Vec<u8>>,
}

impl ArtifactBundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: Vec<u8>) {
        self.artifacts.insert(name.into(), content);
    }
}

/// Persist a bundle under `{archive_dir}/{dir_name}`, atomically.
///
/// Artifacts are first written concurrently (one task each, disjoint paths)
/// into a hidden staging directory inside the archive root, then the staging
/// directory is renamed into place. A failed write tears the staging
/// directory down, so a partial bundle is never observable at the final
/// path. If the destination name is taken, `-2`, `-3`, … are appended until
/// a free name is found.
///
/// Returns the destination directory actually used.
///
/// # Errors
///
/// Returns an I/O error if the archive root cannot be created, any artifact
/// write fails, or the final rename fails.
pub async fn commit_bundle(
    bundle: ArtifactBundle,
    archive_dir: &Path,
    dir_name: &str,
) -> Result<PathBuf, ArchiveError> {
    tokio::fs::create_dir_all(archive_dir)
        .await
        .map_err(|e| ArchiveError::io(Producer::Persist, archive_dir, e))?;

    let staging = tempfile::Builder::new()
        .prefix(".kiep-staging-")
        .tempdir_in(archive_dir)
        .map_err(|e| ArchiveError::io(Producer::Persist, archive_dir, e))?;

    let mut writes = JoinSet::new();
    for (name, content) in bundle.artifacts {
        let path = staging.path().join(&name);
        writes.spawn(async move {
            tokio::fs::write(&path, &content)
                .await
                .map_err(|e| (path, e))
        });
    }

    while let Some(joined) = writes.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err((path, e))) => {
                writes.shutdown().await;
                // staging dir is removed on drop; no partial bundle survives
                return Err(ArchiveError::io(Producer::Persist, path, e));
            }
            Err(e) => {
                writes.shutdown().await;
                return Err(ArchiveError::Task {
                    producer: Producer::Persist,
                    message: e.to_string(),
                });
            }
        }
    }

    let staged = staging.keep();
    let dest = claim_destination(archive_dir, dir_name);

    if let Err(e) = tokio::fs::rename(&staged, &dest).await {
        let _ = tokio::fs::remove_dir_all(&staged).await;
        return Err(ArchiveError::io(Producer::Persist, dest, e));
    }

    info!(dest = %dest.display(), "Bundle committed");
    Ok(dest)
}

/// Pick a collision-free destination path for the bundle.
///
/// Same-day runs with the same (possibly empty) title would otherwise land
/// on the same directory; a numeric suffix disambiguates them.
fn claim_destination(archive_dir: &Path, dir_name: &str) -> PathBuf {
    let first = archive_dir.join(dir_name);
    if !first.exists() {
        return first;
    }
    let mut n = 2u32;
    loop {
        let candidate = archive_dir.join(format!("{dir_name}-{n}"));
        if !candidate.exists() {
            debug!(dest = %candidate.display(), "Destination collision, using suffixed name");
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_bundle() -> ArtifactBundle {
        let mut bundle = ArtifactBundle::new();
        bundle.insert(PLAIN_TEXT, b"plain body".to_vec());
        bundle.insert(STRIPPED_HTML, b"<p>stripped</p>".to_vec());
        bundle.insert(FULL_PAGE_HTML, b"<html>full</html>".to_vec());
        bundle.insert(META_FILE, b"title=t\n".to_vec());
        bundle
    }

    #[tokio::test]
    async fn test_commit_writes_all_artifacts() {
        let temp = TempDir::new().unwrap();
        let dest = commit_bundle(sample_bundle(), temp.path(), "2024-03-09-Title")
            .await
            .unwrap();

        assert_eq!(dest, temp.path().join("2024-03-09-Title"));
        assert_eq!(
            tokio::fs::read(dest.join(PLAIN_TEXT)).await.unwrap(),
            b"plain body"
        );
        assert_eq!(
            tokio::fs::read(dest.join(META_FILE)).await.unwrap(),
            b"title=t\n"
        );
        let entries = std::fs::read_dir(&dest).unwrap().count();
        assert_eq!(entries, 4);
    }

    #[tokio::test]
    async fn test_commit_creates_archive_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("kiep");
        let dest = commit_bundle(sample_bundle(), &root, "2024-03-09-")
            .await
            .unwrap();
        assert!(dest.ends_with("2024-03-09-"));
        assert!(dest.join(FULL_PAGE_HTML).exists());
    }

    #[tokio::test]
    async fn test_commit_collision_appends_counter() {
        let temp = TempDir::new().unwrap();
        let first = commit_bundle(sample_bundle(), temp.path(), "2024-03-09-Same")
            .await
            .unwrap();
        let second = commit_bundle(sample_bundle(), temp.path(), "2024-03-09-Same")
            .await
            .unwrap();
        let third = commit_bundle(sample_bundle(), temp.path(), "2024-03-09-Same")
            .await
            .unwrap();

        assert_eq!(first, temp.path().join("2024-03-09-Same"));
        assert_eq!(second, temp.path().join("2024-03-09-Same-2"));
        assert_eq!(third, temp.path().join("2024-03-09-Same-3"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_partial_bundle() {
        let temp = TempDir::new().unwrap();
        let mut bundle = sample_bundle();
        // a name with a missing intermediate directory makes the write fail
        bundle.insert("missing/sub/file.txt", b"x".to_vec());

        let err = commit_bundle(bundle, temp.path(), "2024-03-09-Bad")
            .await
            .unwrap_err();
        assert_eq!(err.producer(), Producer::Persist);

        assert!(!temp.path().join("2024-03-09-Bad").exists());
        // staging directory must have been torn down too
        let leftovers = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}
