pub mod config;
pub mod models;

use std::future::Future;

use anyhow::Result;
use bytes::Bytes;

use crate::models::{Artifact, ExistingComment, PublishedComment};

/// Operations the publisher needs from the code hosting platform.
///
/// Every call targets the repository the implementation was created for.
pub trait Platform: Sync {
    /// List all artifacts uploaded by a workflow run.
    fn list_run_artifacts(&self, run_id: u64) -> impl Future<Output = Result<Vec<Artifact>>> + Send;

    /// Download an artifact as a zip archive.
    fn download_artifact(&self, artifact_id: u64) -> impl Future<Output = Result<Bytes>> + Send;

    /// List all comments on an issue or pull request.
    fn list_comments(
        &self,
        issue_number: u64,
    ) -> impl Future<Output = Result<Vec<ExistingComment>>> + Send;

    fn create_comment(
        &self,
        issue_number: u64,
        body: String,
    ) -> impl Future<Output = Result<PublishedComment>> + Send;

    /// Collapse a comment as outdated.
    fn minimize_comment(&self, node_id: &str) -> impl Future<Output = Result<()>> + Send;
}
