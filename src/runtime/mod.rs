/// Runtime orchestrator module - Gateway

mod non_interactive;
mod orchestrator;
mod repl;
mod shell;

pub use non_interactive::{ExecutionMetadata, NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::Orchestrator;
pub use repl::Repl;
pub use shell::{Shell, ShellCommand};
