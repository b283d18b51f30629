use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `desk` binary.
#[derive(Debug, Parser)]
#[command(name = "desk", version, about = "Helpdesk task engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, OutputFormat};
    use crate::cli::subcommands::{NotificationCommands, TaskCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["desk", "seed", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Seed));
    }

    #[test]
    fn task_update_takes_id_actor_and_body() {
        let cli = Cli::try_parse_from([
            "desk", "task", "update", "tsk-1", "--as", "usr-1", "--body", "-",
        ])
        .expect("cli should parse");

        match cli.command {
            Commands::Task {
                action: TaskCommands::Update { id, actor, body },
            } => {
                assert_eq!(id, "tsk-1");
                assert_eq!(actor, "usr-1");
                assert_eq!(body, "-");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn notification_list_defaults_limit() {
        let cli = Cli::try_parse_from(["desk", "notification", "list", "--user", "usr-1"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Notification {
                action: NotificationCommands::List { limit: 20, .. }
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["desk", "--format", "xml", "seed"]).is_err());
    }
}
