use std::fmt;

use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context};

/// Re-emits warnings and errors as GitHub Actions workflow commands, so they
/// show up as annotations on the run.
pub struct WorkflowCommands;

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for WorkflowCommands {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let command = match *event.metadata().level() {
            Level::ERROR => "error",
            Level::WARN => "warning",
            _ => return,
        };
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        println!("{}", workflow_command(command, &visitor.0));
    }
}

/// Formats `::command::message`, escaping the message the way the runner expects.
pub fn workflow_command(command: &str, message: &str) -> String {
    let escaped = message.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A");
    format!("::{command}::{escaped}")
}

#[cfg(test)]
mod tests {
    use super::workflow_command;

    #[test]
    fn test_workflow_command() {
        let cases = [
            ("error", "Report failed", "::error::Report failed"),
            ("warning", "50% larger", "::warning::50%25 larger"),
            ("error", "line 1\r\nline 2", "::error::line 1%0D%0Aline 2"),
        ];
        for (command, message, expected) in cases {
            assert_eq!(workflow_command(command, message), expected);
        }
    }
}
