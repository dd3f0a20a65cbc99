use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Appended to every published report, and used to find our own reports later.
pub const COMMENT_MARKER: &str = "#outputSize";

/// Login of the account that posts comments when using the default Actions token.
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// The event that invoked the publisher.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TriggerEvent {
    /// Event name, as reported by `GITHUB_EVENT_NAME`.
    pub name: String,
    pub repository: RepositoryRef,
    pub payload: EventPayload,
}

impl TriggerEvent {
    /// The completed workflow run carried by this event, if it is the expected kind of event.
    pub fn completed_run(&self) -> Option<&RunRecord> {
        if self.name != "workflow_run" {
            return None;
        }
        if self.payload.action.as_deref().is_some_and(|action| action != "completed") {
            return None;
        }
        self.payload.workflow_run.as_ref()
    }
}

/// Subset of the webhook payload found at `GITHUB_EVENT_PATH`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct EventPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub workflow_run: Option<RunRecord>,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    /// Parses `owner/repo`, as found in `GITHUB_REPOSITORY`.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, repo) = full_name.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self { owner: owner.to_string(), repo: repo.to_string() })
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// The upstream workflow execution that triggered this invocation.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct RunRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// `None` while the run is still in progress.
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequestRef>,
}

impl RunRecord {
    pub fn display_name(&self) -> &str { self.name.as_deref().unwrap_or("<unnamed>") }

    pub fn pull_request_numbers(&self) -> Vec<u64> {
        self.pull_requests.iter().map(|pr| pr.number).collect()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(untagged)]
    Other(String),
}

impl Conclusion {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Neutral => "neutral",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
            Self::Stale => "stale",
            Self::StartupFailure => "startup_failure",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub struct PullRequestRef {
    pub number: u64,
}

/// A named file bundle uploaded by a run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    pub expired: bool,
}

/// A comment already present on a pull request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExistingComment {
    pub author: String,
    pub body: String,
    /// GraphQL node ID, used to minimize the comment.
    pub node_id: String,
}

impl ExistingComment {
    /// Whether this is a report previously posted by `bot_login`.
    pub fn is_size_report(&self, bot_login: &str) -> bool {
        self.author == bot_login && self.body.contains(COMMENT_MARKER)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PublishedComment {
    pub issue_number: u64,
    pub body: String,
    pub html_url: Url,
}

pub fn report_comment_body(report: &str) -> String { format!("{report}\n\n{COMMENT_MARKER}") }
