//! Command grammar registry and line parser.
//!
//! Every shell command is declared once as a clap parser; the registry is
//! the [`ShellCommand`] subcommand enum behind a multicall parser, so a raw
//! line resolves to at most one interpretation. Parsing has no side effects:
//! the outcome is a structured command, a usage failure, or a help request.

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use hitdesk_marketplace::Environment;

/// One parsed input line.
#[derive(Debug, Parser)]
#[command(multicall = true, name = "hitdesk", disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// The command registry. Variant names render as snake_case command words.
#[derive(Debug, Subcommand, PartialEq)]
#[command(rename_all = "snake_case")]
pub enum ShellCommand {
    /// Switch between sandbox and live mode (no argument toggles)
    Mode(ModeArgs),
    /// Show server status and the active HIT count
    Status,
    /// Publish a HIT; prompts for any omitted field
    CreateHit(CreateHitArgs),
    /// Add assignments or hours to a published HIT
    ExtendHit(ExtendHitArgs),
    /// Expire a published HIT
    ExpireHit(ExpireHitArgs),
    /// Approve submitted assignments
    ApproveWorker(ApproveWorkerArgs),
    /// Reject submitted assignments
    RejectWorker(RejectWorkerArgs),
    /// List submitted assignments awaiting review
    GetWorkers,
    /// List currently active HITs
    GetActiveHits,
    /// Show the account balance for the active mode
    CheckBalance,
    /// Start the experiment server and wait until it is up
    LaunchServer,
    /// Stop the experiment server and wait until it is down
    ShutdownServer,
    /// Restart the experiment server
    RestartServer,
    /// Serve the HTTP status dashboard
    Dashboard(DashboardArgs),
    /// Print the tool version
    Version,
    /// Print the configuration file
    PrintConfig,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Args, PartialEq)]
pub struct ModeArgs {
    /// Target mode; omitted means the opposite of the current mode
    #[arg(value_enum)]
    pub which: Option<Environment>,
}

/// `create_hit` accepts either no positionals (interactive completion) or
/// all four. The `requires` chain rejects partially specified forms.
#[derive(Debug, Args, PartialEq)]
pub struct CreateHitArgs {
    /// sandbox or live
    #[arg(value_name = "WHERE", requires = "workers")]
    pub environment: Option<String>,

    /// Number of workers to recruit
    #[arg(value_name = "WORKERS", requires = "reward")]
    pub workers: Option<String>,

    /// Reward per assignment, dollars.cents (e.g. 2.00)
    #[arg(value_name = "REWARD", requires = "duration")]
    pub reward: Option<String>,

    /// HIT duration in hours
    #[arg(value_name = "DURATION")]
    pub duration: Option<String>,
}

#[derive(Debug, Args, PartialEq)]
pub struct ExtendHitArgs {
    /// Id of the HIT to extend
    #[arg(value_name = "HIT_ID")]
    pub hit_id: String,

    /// Additional assignments to add
    #[arg(short, long, value_name = "N")]
    pub assignments: Option<u32>,

    /// Additional expiration time in hours
    #[arg(short, long, value_name = "HOURS")]
    pub expiration: Option<u32>,
}

#[derive(Debug, Args, PartialEq)]
pub struct ExpireHitArgs {
    /// Id of the HIT to expire
    #[arg(value_name = "HIT_ID")]
    pub hit_id: String,
}

#[derive(Debug, Args, PartialEq)]
pub struct ApproveWorkerArgs {
    /// Approve every submitted assignment
    #[arg(long, conflicts_with = "assignment_ids")]
    pub all: bool,

    /// Assignment ids to approve
    #[arg(value_name = "ASSIGNMENT_ID", required_unless_present = "all")]
    pub assignment_ids: Vec<String>,
}

#[derive(Debug, Args, PartialEq)]
pub struct RejectWorkerArgs {
    /// Assignment ids to reject
    #[arg(value_name = "ASSIGNMENT_ID", required = true)]
    pub assignment_ids: Vec<String>,
}

#[derive(Debug, Args, PartialEq)]
pub struct DashboardArgs {
    /// Address to serve the dashboard on
    #[arg(short, long, value_name = "ADDRESS", default_value = "localhost")]
    pub ip: String,

    /// Port to serve the dashboard on
    #[arg(short, long, value_name = "NUM", default_value_t = 22361)]
    pub port: u16,
}

/// Outcome of parsing one raw line. Never a partially populated command.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The line matched a command grammar.
    Command(ShellCommand),
    /// The operator asked for help; the payload is the rendered help text.
    HelpRequested(String),
    /// The line matched no grammar; the payload is the usage text to show.
    UsageMismatch(String),
}

/// Parse a non-empty input line against the registry.
pub fn parse_line(line: &str) -> ParseOutcome {
    let Some(tokens) = shlex::split(line) else {
        return ParseOutcome::UsageMismatch("Invalid command: unbalanced quotes".to_string());
    };
    if tokens.is_empty() {
        return ParseOutcome::UsageMismatch("Invalid command".to_string());
    }
    match ShellLine::try_parse_from(&tokens) {
        Ok(parsed) => ParseOutcome::Command(parsed.command),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                ParseOutcome::HelpRequested(e.to_string())
            }
            _ => ParseOutcome::UsageMismatch(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn command(line: &str) -> ShellCommand {
        match parse_line(line) {
            ParseOutcome::Command(cmd) => cmd,
            other => panic!("expected command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn mode_accepts_bare_and_explicit_forms() {
        assert_eq!(command("mode"), ShellCommand::Mode(ModeArgs { which: None }));
        assert_eq!(
            command("mode live"),
            ShellCommand::Mode(ModeArgs {
                which: Some(Environment::Live)
            })
        );
    }

    #[test]
    fn mode_rejects_unknown_environment() {
        assert_matches!(parse_line("mode prod"), ParseOutcome::UsageMismatch(_));
    }

    #[test]
    fn create_hit_bare_form_is_fully_unset() {
        assert_eq!(
            command("create_hit"),
            ShellCommand::CreateHit(CreateHitArgs {
                environment: None,
                workers: None,
                reward: None,
                duration: None,
            })
        );
    }

    #[test]
    fn create_hit_full_form_captures_all_positionals() {
        assert_eq!(
            command("create_hit sandbox 5 2.00 1"),
            ShellCommand::CreateHit(CreateHitArgs {
                environment: Some("sandbox".to_string()),
                workers: Some("5".to_string()),
                reward: Some("2.00".to_string()),
                duration: Some("1".to_string()),
            })
        );
    }

    #[test]
    fn create_hit_partial_form_is_a_usage_mismatch() {
        assert_matches!(
            parse_line("create_hit sandbox 5"),
            ParseOutcome::UsageMismatch(_)
        );
        assert_matches!(
            parse_line("create_hit sandbox 5 2.00"),
            ParseOutcome::UsageMismatch(_)
        );
    }

    #[test]
    fn extend_hit_parses_named_options_with_aliases() {
        assert_eq!(
            command("extend_hit HIT1 --assignments 3 -e 2"),
            ShellCommand::ExtendHit(ExtendHitArgs {
                hit_id: "HIT1".to_string(),
                assignments: Some(3),
                expiration: Some(2),
            })
        );
    }

    #[test]
    fn extend_hit_requires_an_id() {
        assert_matches!(parse_line("extend_hit"), ParseOutcome::UsageMismatch(_));
    }

    #[test]
    fn approve_worker_takes_flag_or_ids_but_not_both() {
        assert_eq!(
            command("approve_worker --all"),
            ShellCommand::ApproveWorker(ApproveWorkerArgs {
                all: true,
                assignment_ids: vec![],
            })
        );
        assert_eq!(
            command("approve_worker A1 A2"),
            ShellCommand::ApproveWorker(ApproveWorkerArgs {
                all: false,
                assignment_ids: vec!["A1".to_string(), "A2".to_string()],
            })
        );
        assert_matches!(
            parse_line("approve_worker --all A1"),
            ParseOutcome::UsageMismatch(_)
        );
        assert_matches!(parse_line("approve_worker"), ParseOutcome::UsageMismatch(_));
    }

    #[test]
    fn reject_worker_requires_at_least_one_id() {
        assert_matches!(parse_line("reject_worker"), ParseOutcome::UsageMismatch(_));
        assert_eq!(
            command("reject_worker A7"),
            ShellCommand::RejectWorker(RejectWorkerArgs {
                assignment_ids: vec!["A7".to_string()],
            })
        );
    }

    #[test]
    fn dashboard_defaults_and_overrides() {
        assert_eq!(
            command("dashboard"),
            ShellCommand::Dashboard(DashboardArgs {
                ip: "localhost".to_string(),
                port: 22361,
            })
        );
        assert_eq!(
            command("dashboard --ip 0.0.0.0 -p 8080"),
            ShellCommand::Dashboard(DashboardArgs {
                ip: "0.0.0.0".to_string(),
                port: 8080,
            })
        );
    }

    #[test]
    fn exit_is_an_alias_for_quit() {
        assert_eq!(command("quit"), ShellCommand::Quit);
        assert_eq!(command("exit"), ShellCommand::Quit);
    }

    #[test]
    fn unknown_command_is_a_usage_mismatch() {
        assert_matches!(parse_line("frobnicate"), ParseOutcome::UsageMismatch(_));
    }

    #[test]
    fn help_is_reported_as_help_not_mismatch() {
        assert_matches!(parse_line("help"), ParseOutcome::HelpRequested(_));
        assert_matches!(
            parse_line("create_hit --help"),
            ParseOutcome::HelpRequested(_)
        );
    }

    #[test]
    fn unbalanced_quotes_are_a_usage_mismatch() {
        assert_matches!(
            parse_line("create_hit \"sandbox"),
            ParseOutcome::UsageMismatch(_)
        );
    }
}
