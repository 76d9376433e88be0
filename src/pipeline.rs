//! The archival orchestration pipeline.
//!
//! One invocation archives one article. Five acquisition tasks fan out
//! immediately (snapshot submission, full-page capture, page download,
//! header and footer loads); the orchestrator then joins them at the points
//! where their outputs are actually needed, assembles the artifact bundle,
//! and commits it in one batch. The first failure aborts the run, cancels
//! the surviving siblings, and leaves nothing behind on disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};
use url::Url;

use crate::assemble::assemble_html;
use crate::bundle::{
    commit_bundle, ArtifactBundle, FULL_PAGE_HTML, META_FILE, PLAIN_TEXT, STRIPPED_HTML,
};
use crate::config::Config;
use crate::download::{build_client, HttpDownloader};
use crate::error::{ArchiveError, Producer};
use crate::extract::extract_metadata;
use crate::fullpage::MonolithArchiver;
use crate::readable::make_readable;
use crate::record::ArticleRecord;
use crate::templates::load_template;
use crate::wayback::WaybackClient;

/// Downloads the raw article page.
#[async_trait]
pub trait PageDownloader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ArchiveError>;
}

/// Requests a durable third-party archive of a URL.
#[async_trait]
pub trait SnapshotRequester: Send + Sync {
    async fn submit(&self, url: &str) -> Result<String, ArchiveError>;
}

/// Captures a self-contained offline snapshot of a URL.
#[async_trait]
pub trait FullPageArchiver: Send + Sync {
    async fn capture(&self, url: &str) -> Result<Vec<u8>, ArchiveError>;
}

/// Single-article archival pipeline.
pub struct ArticlePipeline {
    config: Config,
    downloader: Arc<dyn PageDownloader>,
    snapshot: Arc<dyn SnapshotRequester>,
    fullpage: Arc<dyn FullPageArchiver>,
}

impl ArticlePipeline {
    /// Wire the production producers: HTTP download, Wayback Machine
    /// submission, and monolith full-page capture.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let downloader = Arc::new(HttpDownloader::new(build_client(config.http_timeout)));
        let snapshot = Arc::new(WaybackClient::new(config.http_timeout));
        let fullpage = Arc::new(MonolithArchiver::new(config.monolith_config()));
        Self {
            config,
            downloader,
            snapshot,
            fullpage,
        }
    }

    /// Build a pipeline with caller-supplied producers. Used by tests to
    /// substitute the external collaborators.
    #[must_use]
    pub fn with_producers(
        config: Config,
        downloader: Arc<dyn PageDownloader>,
        snapshot: Arc<dyn SnapshotRequester>,
        fullpage: Arc<dyn FullPageArchiver>,
    ) -> Self {
        Self {
            config,
            downloader,
            snapshot,
            fullpage,
        }
    }

    /// Archive one article. Returns the destination directory on success.
    ///
    /// # Errors
    ///
    /// Returns the first producer failure encountered at a join point; all
    /// sibling tasks still in flight are aborted, and no destination
    /// directory is created.
    pub async fn archive(&self, url: &str, tags: Vec<String>) -> Result<PathBuf, ArchiveError> {
        Url::parse(url)
            .map_err(|e| ArchiveError::parse(Producer::Download, format!("invalid URL: {e}")))?;

        let mut record = ArticleRecord::new(url, tags);
        info!(url = %url, "Archiving article");

        // Fan out all five acquisition tasks before blocking on any of them.
        let snapshot_task = {
            let snapshot = Arc::clone(&self.snapshot);
            let url = url.to_string();
            tokio::spawn(async move { snapshot.submit(&url).await })
        };
        let fullpage_task = {
            let fullpage = Arc::clone(&self.fullpage);
            let url = url.to_string();
            tokio::spawn(async move { fullpage.capture(&url).await })
        };
        let download_task = {
            let downloader = Arc::clone(&self.downloader);
            let url = url.to_string();
            tokio::spawn(async move { downloader.fetch(&url).await })
        };
        let header_task = {
            let path = self.config.header_path();
            tokio::spawn(async move { load_template(&path, Producer::HeaderTemplate).await })
        };
        let footer_task = {
            let path = self.config.footer_path();
            tokio::spawn(async move { load_template(&path, Producer::FooterTemplate).await })
        };

        // On any early return the guard aborts whichever siblings are still
        // running; aborting an already-joined task is a no-op.
        let _guard = AbortOnDrop::new(vec![
            snapshot_task.abort_handle(),
            fullpage_task.abort_handle(),
            download_task.abort_handle(),
            header_task.abort_handle(),
            footer_task.abort_handle(),
        ]);

        let timeout = self.config.producer_timeout;

        let page = join_producer(download_task, Producer::Download, timeout).await?;
        let html = String::from_utf8_lossy(&page).into_owned();

        // The buffered page is consumed twice: metadata first, readability second.
        let page_meta = extract_metadata(&html);
        record.title = page_meta.title;
        record.author = page_meta.author;
        debug!(title = %record.title, author = %record.author, "Metadata extracted");

        let readable = make_readable(&html, url)?;

        let header = join_producer(header_task, Producer::HeaderTemplate, timeout).await?;
        let footer = join_producer(footer_task, Producer::FooterTemplate, timeout).await?;
        let stripped = assemble_html(&header, &footer, &record.title, &readable.html);

        record.archived_url = join_producer(snapshot_task, Producer::Snapshot, timeout).await?;
        let full_page = join_producer(fullpage_task, Producer::FullPage, timeout).await?;

        let mut bundle = ArtifactBundle::new();
        bundle.insert(PLAIN_TEXT, readable.plain.into_bytes());
        bundle.insert(STRIPPED_HTML, stripped.into_bytes());
        bundle.insert(FULL_PAGE_HTML, full_page);
        bundle.insert(META_FILE, record.render_meta().into_bytes());

        let dest = commit_bundle(bundle, &self.config.archive_dir, &record.dir_name()).await?;
        info!(url = %url, dest = %dest.display(), "Article archived");
        Ok(dest)
    }
}

/// Join one producer task, bounded by the per-producer timeout.
async fn join_producer<T>(
    handle: JoinHandle<Result<T, ArchiveError>>,
    producer: Producer,
    timeout: Duration,
) -> Result<T, ArchiveError> {
    match tokio::time::timeout(timeout, handle).await {
        Err(_) => Err(ArchiveError::Timeout { producer, timeout }),
        Ok(Err(join_err)) => Err(ArchiveError::Task {
            producer,
            message: join_err.to_string(),
        }),
        Ok(Ok(result)) => result,
    }
}

/// Aborts the held tasks when dropped, so an early error return never leaks
/// still-running producers.
struct AbortOnDrop {
    handles: Vec<AbortHandle>,
}

impl AbortOnDrop {
    fn new(handles: Vec<AbortHandle>) -> Self {
        Self { handles }
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
