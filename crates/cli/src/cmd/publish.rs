use std::path::PathBuf;

use anyhow::{Context, Result};
use argp::FromArgs;
use size_report_core::config::{Config, ConfigOverrides};
use size_report_github::{GitHub, event::load_trigger_event};
use size_report_publish::{
    Outcome,
    extract::{UnzipCommand, ZipExtractor},
    publish,
};

use crate::util::native_path;

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Post the report of a completed workflow run to its pull requests.
#[argp(subcommand, name = "publish")]
pub struct Args {
    #[argp(option, short = 'a')]
    /// name of the artifact holding report.md (default: $INPUT_ARTIFACT_NAME)
    artifact_name: Option<String>,
    #[argp(option)]
    /// login of the account posting reports (default: github-actions[bot])
    bot_login: Option<String>,
    #[argp(option, short = 'r')]
    /// repository as owner/repo (default: $GITHUB_REPOSITORY)
    repository: Option<String>,
    #[argp(option)]
    /// triggering event name (default: $GITHUB_EVENT_NAME)
    event_name: Option<String>,
    #[argp(option, from_str_fn(native_path))]
    /// triggering event payload (default: $GITHUB_EVENT_PATH)
    event_path: Option<PathBuf>,
    #[argp(option, short = 'C', from_str_fn(native_path))]
    /// directory to download and extract the report in (default: $GITHUB_WORKSPACE)
    workdir: Option<PathBuf>,
    #[argp(switch)]
    /// extract the artifact without the unzip utility
    builtin_unzip: bool,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            artifact_name: args.artifact_name,
            bot_login: args.bot_login,
            repository: args.repository,
            event_name: args.event_name,
            event_path: args.event_path,
            workdir: args.workdir,
            builtin_unzip: args.builtin_unzip,
        }
    }
}

pub async fn run(args: Args) -> Result<()> {
    let config = Config::from_env(args.into()).context("Failed to load configuration")?;
    let github = GitHub::new(&config.github)?;
    let event = load_trigger_event(&config).await?;
    tracing::debug!(
        "Publishing artifact {} for {} ({} event)",
        config.publish.artifact_name,
        config.github.repository,
        event.name
    );

    let outcome = if config.publish.builtin_unzip {
        publish(&github, &event, &ZipExtractor, &config.publish).await?
    } else {
        let unzip = UnzipCommand { log_group: config.github_actions, ..Default::default() };
        publish(&github, &event, &unzip, &config.publish).await?
    };
    if let Outcome::Published(comments) = &outcome {
        tracing::debug!("Published {} report(s)", comments.len());
    }
    Ok(())
}
