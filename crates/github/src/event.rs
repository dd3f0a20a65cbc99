use std::path::Path;

use anyhow::{Context, Result};
use size_report_core::{
    config::Config,
    models::{EventPayload, TriggerEvent},
};

/// Load the event that triggered the current workflow.
pub async fn load_trigger_event(config: &Config) -> Result<TriggerEvent> {
    let payload = read_event_payload(&config.event.path).await?;
    Ok(TriggerEvent {
        name: config.event.name.clone(),
        repository: config.github.repository.clone(),
        payload,
    })
}

/// Read a webhook payload as written by the Actions runner.
///
/// Payloads of other event kinds parse too, with no `workflow_run`.
pub async fn read_event_payload(path: &Path) -> Result<EventPayload> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read event payload {}", path.display()))?;
    serde_json::from_slice(&data)
        .with_context(|| format!("Failed to parse event payload {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_read_workflow_run_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "action": "completed",
                "workflow_run": {
                    "id": 42,
                    "name": "Measure size",
                    "conclusion": "failure",
                    "pull_requests": []
                }
            }"#,
        )
        .unwrap();
        let payload = read_event_payload(file.path()).await.unwrap();
        let run = payload.workflow_run.unwrap();
        assert_eq!(run.id, 42);
        assert_eq!(run.display_name(), "Measure size");
        assert!(run.pull_requests.is_empty());
    }

    #[tokio::test]
    async fn test_read_push_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"ref": "refs/heads/master", "before": "abc", "after": "def"}"#)
            .unwrap();
        let payload = read_event_payload(file.path()).await.unwrap();
        assert_eq!(payload, EventPayload::default());
    }

    #[tokio::test]
    async fn test_missing_payload() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_event_payload(&dir.path().join("event.json")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read event payload"), "{err}");
    }
}
