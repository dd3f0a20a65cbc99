pub mod extract;

use std::{io, path::Path};

use anyhow::{Context, Result};
use futures_util::future::try_join_all;
use size_report_core::{
    Platform,
    config::PublishConfig,
    models::{Artifact, Conclusion, PublishedComment, TriggerEvent, report_comment_body},
};

use crate::extract::Extractor;

/// Archive the artifact is downloaded to, relative to the working directory.
pub const REPORT_ARCHIVE: &str = "report.zip";
/// Report file expected inside the artifact.
pub const REPORT_FILE: &str = "report.md";

/// Why a run of the publisher stopped.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Outcome {
    /// Not triggered by a completed workflow run.
    WrongEvent,
    NoPullRequests,
    /// The workflow run did not succeed.
    Unsuccessful,
    NoArtifact,
    Published(Vec<PublishedComment>),
}

/// Publish the report of a completed workflow run to its pull requests.
///
/// Each pull request is processed in order: previous reports are minimized,
/// then the new report is posted. Platform and extraction failures abort the
/// run; preconditions that don't hold end it early with an [`Outcome`].
pub async fn publish<P, E>(
    platform: &P,
    event: &TriggerEvent,
    extractor: &E,
    config: &PublishConfig,
) -> Result<Outcome>
where
    P: Platform,
    E: Extractor,
{
    let Some(run) = event.completed_run() else {
        tracing::error!(
            "This action should be used in a workflow with \"workflow_run\" trigger, got: {} ({}).",
            event.name,
            event.payload.action.as_deref().unwrap_or("<no action>")
        );
        return Ok(Outcome::WrongEvent);
    };
    if run.pull_requests.is_empty() {
        tracing::info!(
            "The original workflow {} is not associated with pull requests, nowhere to post a comment to.",
            run.display_name()
        );
        return Ok(Outcome::NoPullRequests);
    }
    if run.conclusion != Some(Conclusion::Success) {
        tracing::info!(
            "Report can only be published for a successful workflow, got: {}.",
            run.conclusion.as_ref().map_or("<none>", |c| c.as_str())
        );
        return Ok(Outcome::Unsuccessful);
    }

    let Some(artifact) = find_report_artifact(platform, run.id, &config.artifact_name).await?
    else {
        tracing::info!("No report artifacts found, nothing to post.");
        return Ok(Outcome::NoArtifact);
    };

    let report = fetch_report(platform, extractor, &artifact, &config.workdir).await?;

    let pull_requests = run.pull_request_numbers();
    tracing::info!("Associated pull requests: {:?}", pull_requests);

    let body = report_comment_body(&report);
    let mut published = Vec::with_capacity(pull_requests.len());
    for number in pull_requests {
        hide_previous_reports(platform, number, &config.bot_login).await?;
        let comment = platform
            .create_comment(number, body.clone())
            .await
            .with_context(|| format!("Failed to publish report to #{number}"))?;
        tracing::info!("Commented at {}", comment.html_url);
        published.push(comment);
    }
    Ok(Outcome::Published(published))
}

/// Find the first unexpired artifact of the run named `artifact_name`.
pub async fn find_report_artifact<P: Platform>(
    platform: &P,
    run_id: u64,
    artifact_name: &str,
) -> Result<Option<Artifact>> {
    let artifacts = platform
        .list_run_artifacts(run_id)
        .await
        .with_context(|| format!("Failed to list artifacts of run {run_id}"))?;
    let mut reports = artifacts.into_iter().filter(|artifact| artifact.name == artifact_name);
    Ok(reports.find(|artifact| {
        if artifact.expired {
            tracing::debug!("Skipping expired artifact {} ({})", artifact.name, artifact.id);
        }
        !artifact.expired
    }))
}

/// Download and unpack the report artifact into `workdir`, returning the report text.
pub async fn fetch_report<P: Platform, E: Extractor>(
    platform: &P,
    extractor: &E,
    artifact: &Artifact,
    workdir: &Path,
) -> Result<String> {
    let data = platform
        .download_artifact(artifact.id)
        .await
        .with_context(|| format!("Failed to download artifact {}", artifact.name))?;
    let archive = workdir.join(REPORT_ARCHIVE);
    tokio::fs::write(&archive, &data)
        .await
        .with_context(|| format!("Failed to write {}", archive.display()))?;
    // Only a report extracted from this artifact may be published.
    let report_path = workdir.join(REPORT_FILE);
    match tokio::fs::remove_file(&report_path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(e).with_context(|| format!("Failed to remove {}", report_path.display()));
        }
        _ => {}
    }
    extractor
        .extract(&archive, workdir)
        .await
        .with_context(|| format!("Failed to extract {}", archive.display()))?;
    tokio::fs::read_to_string(&report_path)
        .await
        .with_context(|| format!("Failed to read {}", report_path.display()))
}

/// Minimize all previous reports on a pull request, returning how many were hidden.
pub async fn hide_previous_reports<P: Platform>(
    platform: &P,
    number: u64,
    bot_login: &str,
) -> Result<usize> {
    let comments = platform
        .list_comments(number)
        .await
        .with_context(|| format!("Failed to list comments of #{number}"))?;
    let stale =
        comments.iter().filter(|comment| comment.is_size_report(bot_login)).collect::<Vec<_>>();
    if stale.is_empty() {
        return Ok(0);
    }
    try_join_all(stale.iter().map(|comment| platform.minimize_comment(&comment.node_id)))
        .await
        .with_context(|| format!("Failed to hide previous reports on #{number}"))?;
    tracing::info!("Hid {} previous report(s) on #{}", stale.len(), number);
    Ok(stale.len())
}
