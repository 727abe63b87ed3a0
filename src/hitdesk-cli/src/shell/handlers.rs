//! Command handlers.
//!
//! Handlers convert collaborator failures into reported `*** failed to ...`
//! lines and never abort the REPL; the only errors they raise are output
//! I/O. Counters are adjusted only after a confirmed marketplace success.

use std::io::Write;

use anyhow::Result;
use tracing::{debug, warn};

use hitdesk_server::{ServerError, ServerStatus, dashboard};

use crate::shell::Shell;
use crate::shell::grammar::{
    ApproveWorkerArgs, CreateHitArgs, DashboardArgs, ExpireHitArgs, ExtendHitArgs, ModeArgs,
    RejectWorkerArgs,
};
use crate::shell::validate;
use crate::styled_output::{Color, paint_if};

impl<W: Write> Shell<W> {
    pub(crate) async fn handle_mode(&mut self, args: ModeArgs) -> Result<()> {
        let target = args.which.unwrap_or_else(|| self.session.mode().toggled());
        self.session.set_mode(target);
        self.config.set("hit", "using_sandbox", target.is_sandbox());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "could not persist mode change");
        }
        self.check_hits().await;
        writeln!(
            self.out,
            "Entered {} mode",
            paint_if(self.colors, &target.to_string(), Color::Bold)
        )?;
        Ok(())
    }

    pub(crate) async fn handle_status(&mut self) -> Result<()> {
        let status = self.server.status().await;
        let line = match status {
            ServerStatus::Running => paint_if(self.colors, "currently online", Color::Green),
            ServerStatus::Stopped => paint_if(self.colors, "currently offline", Color::Red),
            ServerStatus::Pending => paint_if(self.colors, "please wait", Color::Yellow),
        };
        writeln!(self.out, "Server: {line}")?;
        self.check_hits().await;
        writeln!(
            self.out,
            "worker site - {}: {} HITs available",
            paint_if(self.colors, &self.session.mode().to_string(), Color::Bold),
            self.session.current_count()
        )?;
        Ok(())
    }

    pub(crate) async fn handle_create_hit(&mut self, args: CreateHitArgs) -> Result<()> {
        let raw = validate::complete(&args, self.prompts.as_mut())?;
        let request = match validate::validate(&raw) {
            Ok(request) => request,
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(());
            }
        };

        // Creating in an environment moves the session there, and the
        // parameters are persisted so the next session reuses them.
        self.session.set_mode(request.environment);
        self.config
            .set("hit", "using_sandbox", request.environment.is_sandbox());
        self.config
            .set("hit", "max_assignments", i64::from(request.max_assignments));
        self.config.set("hit", "reward", request.reward.clone());
        self.config
            .set("hit", "duration", i64::from(request.duration_hours));
        if let Err(e) = self.config.save() {
            warn!(error = %e, "could not persist HIT parameters");
        }

        let created = match self.market.create_hit(&request).await {
            Ok(created) => created,
            Err(e) => {
                debug!(error = %e, "create_hit failed");
                writeln!(self.out, "*** failed to create HIT")?;
                return Ok(());
            }
        };
        self.session.adjust_count(1);

        let reward_value: f64 = request.reward.parse().unwrap_or(0.0);
        let total = f64::from(request.max_assignments) * reward_value;
        let fee = total / 10.0;
        writeln!(self.out, "*****************************")?;
        writeln!(self.out, "  Created HIT {}", created.hit_id)?;
        writeln!(self.out, "    Environment: {}", request.environment)?;
        writeln!(self.out, "    Max workers: {}", request.max_assignments)?;
        writeln!(self.out, "    Reward: ${}", request.reward)?;
        writeln!(self.out, "    Duration: {} hours", request.duration_hours)?;
        writeln!(self.out, "    Fee: ${fee:.2}")?;
        writeln!(self.out, "    ________________________")?;
        writeln!(self.out, "    Total: ${:.2}", total + fee)?;
        Ok(())
    }

    pub(crate) async fn handle_extend_hit(&mut self, args: ExtendHitArgs) -> Result<()> {
        let env = self.session.mode();
        match self
            .market
            .extend_hit(env, &args.hit_id, args.assignments, args.expiration)
            .await
        {
            Ok(()) => writeln!(self.out, "extended HIT {}", args.hit_id)?,
            Err(e) => {
                debug!(error = %e, "extend_hit failed");
                writeln!(self.out, "*** failed to extend HIT {}", args.hit_id)?;
            }
        }
        Ok(())
    }

    pub(crate) async fn handle_expire_hit(&mut self, args: ExpireHitArgs) -> Result<()> {
        let env = self.session.mode();
        match self.market.expire_hit(env, &args.hit_id).await {
            Ok(()) => {
                self.session.adjust_count(-1);
                writeln!(self.out, "expired HIT {}", args.hit_id)?;
            }
            Err(e) => {
                debug!(error = %e, "expire_hit failed");
                writeln!(self.out, "*** failed to expire HIT {}", args.hit_id)?;
            }
        }
        Ok(())
    }

    pub(crate) async fn handle_approve_worker(&mut self, args: ApproveWorkerArgs) -> Result<()> {
        let env = self.session.mode();
        let ids = if args.all {
            match self.market.get_workers(env).await {
                Ok(workers) if !workers.is_empty() => workers
                    .into_iter()
                    .map(|assignment| assignment.assignment_id)
                    .collect(),
                Ok(_) | Err(_) => {
                    writeln!(self.out, "*** failed to get workers")?;
                    return Ok(());
                }
            }
        } else {
            args.assignment_ids
        };
        for id in ids {
            match self.market.approve_worker(env, &id).await {
                Ok(true) => writeln!(self.out, "approved {id}")?,
                Ok(false) => writeln!(self.out, "*** failed to approve {id}")?,
                Err(e) => {
                    debug!(error = %e, "approve_worker failed");
                    writeln!(self.out, "*** failed to approve {id}")?;
                }
            }
        }
        Ok(())
    }

    pub(crate) async fn handle_reject_worker(&mut self, args: RejectWorkerArgs) -> Result<()> {
        let env = self.session.mode();
        for id in args.assignment_ids {
            match self.market.reject_worker(env, &id).await {
                Ok(true) => writeln!(self.out, "rejected {id}")?,
                Ok(false) => writeln!(self.out, "*** failed to reject {id}")?,
                Err(e) => {
                    debug!(error = %e, "reject_worker failed");
                    writeln!(self.out, "*** failed to reject {id}")?;
                }
            }
        }
        Ok(())
    }

    pub(crate) async fn handle_get_workers(&mut self) -> Result<()> {
        match self.market.get_workers(self.session.mode()).await {
            Ok(workers) if !workers.is_empty() => {
                for assignment in workers {
                    writeln!(
                        self.out,
                        "{}  worker:{}  hit:{}  status:{}",
                        assignment.assignment_id,
                        assignment.worker_id,
                        assignment.hit_id,
                        assignment.status
                    )?;
                }
            }
            Ok(_) | Err(_) => writeln!(self.out, "*** failed to get workers")?,
        }
        Ok(())
    }

    pub(crate) async fn handle_get_active_hits(&mut self) -> Result<()> {
        match self.market.get_active_hits(self.session.mode()).await {
            Ok(hits) if !hits.is_empty() => {
                for hit in hits {
                    writeln!(
                        self.out,
                        "{}  workers:{}  reward:${}  duration:{}h  status:{}",
                        hit.hit_id, hit.max_assignments, hit.reward, hit.duration_hours, hit.status
                    )?;
                }
            }
            Ok(_) | Err(_) => writeln!(self.out, "*** failed to retrieve active HITs")?,
        }
        Ok(())
    }

    pub(crate) async fn handle_check_balance(&mut self) -> Result<()> {
        match self.market.check_balance(self.session.mode()).await {
            Ok(balance) => writeln!(self.out, "{balance}")?,
            Err(e) => {
                debug!(error = %e, "check_balance failed");
                writeln!(self.out, "*** failed to check balance")?;
            }
        }
        Ok(())
    }

    pub(crate) async fn handle_launch_server(&mut self) -> Result<()> {
        match self.server.startup().await {
            Ok(()) => {}
            Err(ServerError::AlreadyRunning) => {
                writeln!(self.out, "experiment server is already running")?;
                return Ok(());
            }
            Err(e) => {
                writeln!(self.out, "*** failed to launch server: {e}")?;
                return Ok(());
            }
        }
        writeln!(self.out, "launching experiment server...")?;
        self.out.flush()?;
        match self.server.wait_for(ServerStatus::Running).await {
            Ok(()) => writeln!(self.out, "experiment server is up")?,
            Err(e) => writeln!(self.out, "*** {e}")?,
        }
        Ok(())
    }

    pub(crate) async fn handle_shutdown_server(&mut self) -> Result<()> {
        match self.server.shutdown().await {
            Ok(()) => {}
            Err(ServerError::NotRunning) => {
                writeln!(self.out, "experiment server is not running")?;
                return Ok(());
            }
            Err(e) => {
                writeln!(self.out, "*** failed to shut down server: {e}")?;
                return Ok(());
            }
        }
        writeln!(self.out, "shutting down experiment server...")?;
        self.out.flush()?;
        match self.server.wait_for(ServerStatus::Stopped).await {
            Ok(()) => writeln!(self.out, "experiment server is down")?,
            Err(e) => writeln!(self.out, "*** {e}")?,
        }
        Ok(())
    }

    pub(crate) async fn handle_restart_server(&mut self) -> Result<()> {
        match self.server.restart().await {
            Ok(()) => writeln!(self.out, "experiment server restarting")?,
            Err(e) => writeln!(self.out, "*** failed to restart server: {e}")?,
        }
        Ok(())
    }

    pub(crate) async fn handle_dashboard(&mut self, args: DashboardArgs) -> Result<()> {
        match dashboard::serve(&args.ip, args.port).await {
            Ok((addr, _handle)) => writeln!(self.out, "dashboard running at http://{addr}/")?,
            Err(e) => writeln!(self.out, "*** failed to start dashboard: {e}")?,
        }
        Ok(())
    }

    pub(crate) fn handle_version(&mut self) -> Result<()> {
        writeln!(self.out, "hitdesk version {}", env!("CARGO_PKG_VERSION"))?;
        Ok(())
    }

    pub(crate) fn handle_print_config(&mut self) -> Result<()> {
        match self.config.raw_contents() {
            Ok(raw) => write!(self.out, "{raw}")?,
            Err(e) => writeln!(self.out, "*** failed to read config: {e}")?,
        }
        Ok(())
    }
}
