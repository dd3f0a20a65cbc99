use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::{DEFAULT_BOT_LOGIN, RepositoryRef};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub github: GitHubConfig,
    pub event: EventConfig,
    pub publish: PublishConfig,
    /// Running on a GitHub Actions runner, where workflow commands are understood.
    #[serde(default)]
    pub github_actions: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    pub token: String,
    /// Set for GitHub Enterprise; defaults to api.github.com.
    pub api_url: Option<Url>,
    pub repository: RepositoryRef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishConfig {
    pub artifact_name: String,
    pub bot_login: String,
    pub workdir: PathBuf,
    /// Extract with the `zip` crate instead of the `unzip` utility.
    #[serde(default)]
    pub builtin_unzip: bool,
}

/// Values that take precedence over the environment, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub artifact_name: Option<String>,
    pub bot_login: Option<String>,
    pub repository: Option<String>,
    pub event_name: Option<String>,
    pub event_path: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub builtin_unzip: bool,
}

impl Config {
    /// Loads the configuration from the GitHub Actions environment.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Loads the configuration using `lookup` to read environment variables.
    ///
    /// Action inputs follow the runner's `INPUT_<NAME>` convention.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{key} is not set"));

        let token = var("GITHUB_TOKEN")
            .or_else(|| var("INPUT_GITHUB_TOKEN"))
            .ok_or_else(|| anyhow!("GITHUB_TOKEN or INPUT_GITHUB_TOKEN is required"))?;
        let api_url = var("GITHUB_API_URL")
            .map(|url| Url::parse(&url).with_context(|| format!("Invalid GITHUB_API_URL {url}")))
            .transpose()?;
        let repository = match overrides.repository {
            Some(repository) => repository,
            None => required("GITHUB_REPOSITORY")?,
        };
        let repository = RepositoryRef::parse(&repository)
            .with_context(|| format!("Invalid repository {repository}, expected owner/repo"))?;

        let event_name = match overrides.event_name {
            Some(name) => name,
            None => required("GITHUB_EVENT_NAME")?,
        };
        let event_path = match overrides.event_path {
            Some(path) => path,
            None => PathBuf::from(required("GITHUB_EVENT_PATH")?),
        };

        let artifact_name = overrides
            .artifact_name
            .or_else(|| var("INPUT_ARTIFACT_NAME"))
            .context("Artifact name is required (--artifact-name or INPUT_ARTIFACT_NAME)")?;
        let bot_login = overrides
            .bot_login
            .or_else(|| var("INPUT_BOT_LOGIN"))
            .unwrap_or_else(|| DEFAULT_BOT_LOGIN.to_string());
        let workdir = overrides
            .workdir
            .or_else(|| var("GITHUB_WORKSPACE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let builtin_unzip = overrides.builtin_unzip
            || var("INPUT_BUILTIN_UNZIP").is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let github_actions = var("GITHUB_ACTIONS").is_some_and(|v| v == "true");

        Ok(Self {
            github: GitHubConfig { token, api_url, repository },
            event: EventConfig { name: event_name, path: event_path },
            publish: PublishConfig { artifact_name, bot_login, workdir, builtin_unzip },
            github_actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    const ACTIONS_ENV: &[(&str, &str)] = &[
        ("GITHUB_TOKEN", "ghs_token"),
        ("GITHUB_REPOSITORY", "gopherjs/gopherjs"),
        ("GITHUB_EVENT_NAME", "workflow_run"),
        ("GITHUB_EVENT_PATH", "/home/runner/work/_temp/_github_workflow/event.json"),
        ("INPUT_ARTIFACT_NAME", "size_report"),
    ];

    #[test]
    fn test_from_actions_env() {
        let config = Config::from_lookup(env(ACTIONS_ENV), ConfigOverrides::default()).unwrap();
        assert_eq!(config.github.repository.to_string(), "gopherjs/gopherjs");
        assert_eq!(config.github.api_url, None);
        assert_eq!(config.event.name, "workflow_run");
        assert_eq!(config.publish.artifact_name, "size_report");
        assert_eq!(config.publish.bot_login, DEFAULT_BOT_LOGIN);
        assert_eq!(config.publish.workdir, PathBuf::from("."));
        assert!(!config.publish.builtin_unzip);
        assert!(!config.github_actions);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = ConfigOverrides {
            artifact_name: Some("report".to_string()),
            bot_login: Some("size-bot[bot]".to_string()),
            repository: Some("other/repo".to_string()),
            workdir: Some(PathBuf::from("/tmp/publish")),
            builtin_unzip: true,
            ..Default::default()
        };
        let config = Config::from_lookup(env(ACTIONS_ENV), overrides).unwrap();
        assert_eq!(config.github.repository.to_string(), "other/repo");
        assert_eq!(config.publish.artifact_name, "report");
        assert_eq!(config.publish.bot_login, "size-bot[bot]");
        assert_eq!(config.publish.workdir, PathBuf::from("/tmp/publish"));
        assert!(config.publish.builtin_unzip);
    }

    #[test]
    fn test_missing_values() {
        let no_token = &ACTIONS_ENV[1..];
        let err = Config::from_lookup(env(no_token), ConfigOverrides::default()).unwrap_err();
        assert_eq!(err.to_string(), "GITHUB_TOKEN or INPUT_GITHUB_TOKEN is required");

        let no_artifact = &ACTIONS_ENV[..4];
        let err = Config::from_lookup(env(no_artifact), ConfigOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("Artifact name"), "{err}");
    }

    #[test]
    fn test_invalid_repository() {
        let overrides =
            ConfigOverrides { repository: Some("gopherjs".to_string()), ..Default::default() };
        let err = Config::from_lookup(env(ACTIONS_ENV), overrides).unwrap_err();
        assert!(err.to_string().contains("owner/repo"), "{err}");
    }

    #[test]
    fn test_github_actions_runner() {
        let mut vars = ACTIONS_ENV.to_vec();
        vars.push(("GITHUB_ACTIONS", "true"));
        vars.push(("GITHUB_WORKSPACE", "/home/runner/work/gopherjs/gopherjs"));
        let config = Config::from_lookup(env(&vars), ConfigOverrides::default()).unwrap();
        assert!(config.github_actions);
        assert_eq!(config.publish.workdir, PathBuf::from("/home/runner/work/gopherjs/gopherjs"));
    }

    #[test]
    fn test_enterprise_api_url() {
        let mut vars = ACTIONS_ENV.to_vec();
        vars.push(("GITHUB_API_URL", "https://ghe.example.com/api/v3"));
        let config = Config::from_lookup(env(&vars), ConfigOverrides::default()).unwrap();
        assert_eq!(config.github.api_url.unwrap().as_str(), "https://ghe.example.com/api/v3");
    }
}
