pub mod event;
pub mod graphql;

use anyhow::{Context, Result};
use bytes::Bytes;
use octocrab::{
    Octocrab,
    models::{ArtifactId, RunId, issues::Comment},
    params::actions::ArchiveFormat,
};
use size_report_core::{
    Platform,
    config::GitHubConfig,
    models::{Artifact, ExistingComment, PublishedComment, RepositoryRef},
};

/// GitHub client bound to a single repository.
#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
    pub repository: RepositoryRef,
}

impl GitHub {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(config.token.clone());
        if let Some(api_url) = &config.api_url {
            builder = builder
                .base_uri(api_url.as_str())
                .with_context(|| format!("Invalid GitHub API URL {api_url}"))?;
        }
        let client = builder.build().context("Failed to create GitHub client")?;
        Ok(Self { client, repository: config.repository.clone() })
    }

    fn owner(&self) -> &str { &self.repository.owner }

    fn repo(&self) -> &str { &self.repository.repo }
}

fn existing_comment(comment: Comment) -> ExistingComment {
    ExistingComment {
        author: comment.user.login,
        body: comment.body.unwrap_or_default(),
        node_id: comment.node_id,
    }
}

impl Platform for GitHub {
    async fn list_run_artifacts(&self, run_id: u64) -> Result<Vec<Artifact>> {
        let first_page = self
            .client
            .actions()
            .list_workflow_run_artifacts(self.owner(), self.repo(), RunId(run_id))
            .per_page(100)
            .send()
            .await
            .with_context(|| format!("Failed to fetch artifacts for run {run_id}"))?
            .value
            .unwrap_or_default();
        let artifacts = self
            .client
            .all_pages(first_page)
            .await
            .with_context(|| format!("Failed to fetch artifacts for run {run_id}"))?;
        tracing::debug!("Run {} (artifacts {})", run_id, artifacts.len());
        Ok(artifacts
            .into_iter()
            .map(|artifact| Artifact {
                id: artifact.id.into_inner(),
                name: artifact.name,
                expired: artifact.expired,
            })
            .collect())
    }

    async fn download_artifact(&self, artifact_id: u64) -> Result<Bytes> {
        let artifact = ArtifactId(artifact_id);
        self.client
            .actions()
            .download_artifact(self.owner(), self.repo(), artifact, ArchiveFormat::Zip)
            .await
            .with_context(|| format!("Failed to download artifact {artifact_id}"))
    }

    async fn list_comments(&self, issue_number: u64) -> Result<Vec<ExistingComment>> {
        let issues = self.client.issues(self.owner(), self.repo());
        let first_page = issues
            .list_comments(issue_number)
            .per_page(100)
            .send()
            .await
            .with_context(|| format!("Failed to fetch comments for #{issue_number}"))?;
        let comments = self
            .client
            .all_pages(first_page)
            .await
            .with_context(|| format!("Failed to fetch comments for #{issue_number}"))?;
        Ok(comments.into_iter().map(existing_comment).collect())
    }

    async fn create_comment(&self, issue_number: u64, body: String) -> Result<PublishedComment> {
        let comment = self
            .client
            .issues(self.owner(), self.repo())
            .create_comment(issue_number, &body)
            .await
            .with_context(|| format!("Failed to create comment on #{issue_number}"))?;
        Ok(PublishedComment { issue_number, body, html_url: comment.html_url })
    }

    async fn minimize_comment(&self, node_id: &str) -> Result<()> {
        let minimized = graphql::minimize_comment(&self.client, node_id)
            .await
            .with_context(|| format!("Failed to minimize comment {node_id}"))?;
        tracing::debug!("Comment {} minimized: {}", node_id, minimized);
        Ok(())
    }
}
