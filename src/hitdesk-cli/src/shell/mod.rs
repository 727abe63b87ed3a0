//! The interactive operator shell.
//!
//! Module organization:
//! - `grammar` - command registry and line parsing
//! - `validate` - interactive completion and semantic rules
//! - `session` - mode flag and per-mode HIT counters
//! - `prompt` - operator questions and the status prompt line
//! - `handlers` - one handler per command
//!
//! The dispatcher reads one line at a time and runs exactly one command to
//! completion before the next read. Parse and validation failures are
//! reported and the loop returns to reading; no handler error is fatal.

pub mod grammar;
pub mod handlers;
pub mod prompt;
pub mod session;
pub mod validate;

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use hitdesk_config::ConfigStore;
use hitdesk_marketplace::MarketplaceClient;
use hitdesk_server::ServerController;

use crate::styled_output::{Color, paint_if};
use self::grammar::{ParseOutcome, ShellCommand, parse_line};
use self::prompt::{PromptSource, render_prompt};
use self::session::Session;

/// Whether the REPL keeps reading after a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The shell: session state plus every collaborator a handler may call.
/// Collaborators are injected so the core stays testable (scripted prompts,
/// mock marketplace, captured output).
pub struct Shell<W: Write> {
    pub(crate) session: Session,
    pub(crate) config: ConfigStore,
    pub(crate) market: Arc<dyn MarketplaceClient>,
    pub(crate) server: ServerController,
    pub(crate) prompts: Box<dyn PromptSource>,
    pub(crate) out: W,
    pub(crate) colors: bool,
}

impl<W: Write> Shell<W> {
    pub fn new(
        session: Session,
        config: ConfigStore,
        market: Arc<dyn MarketplaceClient>,
        server: ServerController,
        prompts: Box<dyn PromptSource>,
        out: W,
        colors: bool,
    ) -> Self {
        Self {
            session,
            config,
            market,
            server,
            prompts,
            out,
            colors,
        }
    }

    /// Current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the REPL until an exit directive or end of input.
    pub async fn run(&mut self, input: impl BufRead) -> Result<()> {
        self.check_hits().await;
        self.print_banner()?;
        let mut lines = input.lines();
        loop {
            let prompt = self.render_prompt().await;
            write!(self.out, "{prompt}")?;
            self.out.flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let line = line.trim();
            // Blank input: re-render only, never dispatch.
            if line.is_empty() {
                continue;
            }
            if self.dispatch_line(line).await? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Parse one non-empty line and run the matching handler. Usage and
    /// help outcomes print text and leave all state untouched. The returned
    /// error covers output I/O only; command failures are reported inline.
    pub async fn dispatch_line(&mut self, line: &str) -> Result<Flow> {
        match parse_line(line) {
            ParseOutcome::UsageMismatch(usage) => {
                writeln!(self.out, "Invalid command!")?;
                writeln!(self.out, "{usage}")?;
                Ok(Flow::Continue)
            }
            ParseOutcome::HelpRequested(help) => {
                writeln!(self.out, "{help}")?;
                Ok(Flow::Continue)
            }
            ParseOutcome::Command(command) => self.dispatch(command).await,
        }
    }

    async fn dispatch(&mut self, command: ShellCommand) -> Result<Flow> {
        debug!(?command, "dispatching");
        match command {
            ShellCommand::Mode(args) => self.handle_mode(args).await?,
            ShellCommand::Status => self.handle_status().await?,
            ShellCommand::CreateHit(args) => self.handle_create_hit(args).await?,
            ShellCommand::ExtendHit(args) => self.handle_extend_hit(args).await?,
            ShellCommand::ExpireHit(args) => self.handle_expire_hit(args).await?,
            ShellCommand::ApproveWorker(args) => self.handle_approve_worker(args).await?,
            ShellCommand::RejectWorker(args) => self.handle_reject_worker(args).await?,
            ShellCommand::GetWorkers => self.handle_get_workers().await?,
            ShellCommand::GetActiveHits => self.handle_get_active_hits().await?,
            ShellCommand::CheckBalance => self.handle_check_balance().await?,
            ShellCommand::LaunchServer => self.handle_launch_server().await?,
            ShellCommand::ShutdownServer => self.handle_shutdown_server().await?,
            ShellCommand::RestartServer => self.handle_restart_server().await?,
            ShellCommand::Dashboard(args) => self.handle_dashboard(args).await?,
            ShellCommand::Version => self.handle_version()?,
            ShellCommand::PrintConfig => self.handle_print_config()?,
            ShellCommand::Quit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Refresh the active mode's counter from the marketplace. A failed or
    /// empty query leaves the previous value in place.
    pub(crate) async fn check_hits(&mut self) {
        match self.market.get_active_hits(self.session.mode()).await {
            Ok(hits) => self.session.refresh_counts(&hits),
            Err(e) => debug!(error = %e, "active HIT refresh failed"),
        }
    }

    async fn render_prompt(&mut self) -> String {
        let status = self.server.status().await;
        render_prompt(&self.session, status, self.colors)
    }

    fn print_banner(&mut self) -> Result<()> {
        let banner = format!(
            "hitdesk version {}\nType \"help\" for more information.",
            env!("CARGO_PKG_VERSION")
        );
        writeln!(self.out, "{}", paint_if(self.colors, &banner, Color::Green))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing;
