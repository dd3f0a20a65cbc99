mod annotations;
mod cmd;
mod util;

use std::process::ExitCode;

use argp::FromArgs;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::annotations::WorkflowCommands;

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Publish size reports from GitHub Actions workflow runs to pull requests.
struct TopLevel {
    #[argp(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    Publish(cmd::publish::Args),
}

#[tokio::main]
async fn main() -> ExitCode {
    let github_actions = std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(!github_actions).with_filter(env_filter))
        .with(github_actions.then(|| WorkflowCommands.with_filter(LevelFilter::WARN)))
        .init();

    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);
    let result = match args.command {
        SubCommand::Publish(args) => cmd::publish::run(args).await,
    };
    if let Err(e) = result {
        tracing::error!("{e:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
