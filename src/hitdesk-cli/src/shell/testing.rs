//! Shared test doubles for shell tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use hitdesk_config::ConfigStore;
use hitdesk_marketplace::{
    Assignment, Balance, CreatedHit, Environment, Hit, HitRequest, MarketplaceClient,
    MarketplaceError,
};
use hitdesk_server::{ControllerConfig, ServerController};

use crate::shell::Shell;
use crate::shell::prompt::ScriptedPrompt;
use crate::shell::session::Session;

/// Scriptable in-memory marketplace that records every call it receives.
#[derive(Default)]
pub(crate) struct MockMarket {
    pub hits: Vec<Hit>,
    pub workers: Vec<Assignment>,
    pub fail_queries: bool,
    pub fail_mutations: bool,
    pub refuse_reviews: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockMarket {
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: impl Into<String>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.into());
        }
    }

    fn mutation_error() -> MarketplaceError {
        MarketplaceError::Api {
            status: 500,
            message: "mock failure".to_string(),
        }
    }
}

#[async_trait]
impl MarketplaceClient for MockMarket {
    async fn create_hit(&self, request: &HitRequest) -> Result<CreatedHit, MarketplaceError> {
        self.record(format!("create_hit {}", request.environment));
        if self.fail_mutations {
            return Err(Self::mutation_error());
        }
        Ok(CreatedHit {
            hit_id: "HIT-NEW".to_string(),
        })
    }

    async fn get_active_hits(&self, env: Environment) -> Result<Vec<Hit>, MarketplaceError> {
        self.record(format!("get_active_hits {env}"));
        if self.fail_queries {
            return Err(Self::mutation_error());
        }
        Ok(self.hits.clone())
    }

    async fn get_workers(&self, env: Environment) -> Result<Vec<Assignment>, MarketplaceError> {
        self.record(format!("get_workers {env}"));
        if self.fail_queries {
            return Err(Self::mutation_error());
        }
        Ok(self.workers.clone())
    }

    async fn approve_worker(
        &self,
        _env: Environment,
        assignment_id: &str,
    ) -> Result<bool, MarketplaceError> {
        self.record(format!("approve_worker {assignment_id}"));
        if self.fail_mutations {
            return Err(Self::mutation_error());
        }
        Ok(!self.refuse_reviews)
    }

    async fn reject_worker(
        &self,
        _env: Environment,
        assignment_id: &str,
    ) -> Result<bool, MarketplaceError> {
        self.record(format!("reject_worker {assignment_id}"));
        if self.fail_mutations {
            return Err(Self::mutation_error());
        }
        Ok(!self.refuse_reviews)
    }

    async fn check_balance(&self, env: Environment) -> Result<Balance, MarketplaceError> {
        self.record(format!("check_balance {env}"));
        if self.fail_queries {
            return Err(Self::mutation_error());
        }
        Ok(Balance {
            available: "100.00".to_string(),
            currency: "USD".to_string(),
        })
    }

    async fn extend_hit(
        &self,
        _env: Environment,
        hit_id: &str,
        assignments: Option<u32>,
        expiration_hours: Option<u32>,
    ) -> Result<(), MarketplaceError> {
        self.record(format!(
            "extend_hit {hit_id} {assignments:?} {expiration_hours:?}"
        ));
        if self.fail_mutations {
            return Err(Self::mutation_error());
        }
        Ok(())
    }

    async fn expire_hit(&self, _env: Environment, hit_id: &str) -> Result<(), MarketplaceError> {
        self.record(format!("expire_hit {hit_id}"));
        if self.fail_mutations {
            return Err(Self::mutation_error());
        }
        Ok(())
    }
}

pub(crate) fn hit(id: &str) -> Hit {
    Hit {
        hit_id: id.to_string(),
        title: "test hit".to_string(),
        max_assignments: 1,
        reward: "1.00".to_string(),
        duration_hours: 1,
        expiration: None,
        status: "active".to_string(),
    }
}

pub(crate) fn assignment(id: &str) -> Assignment {
    Assignment {
        assignment_id: id.to_string(),
        hit_id: "HIT1".to_string(),
        worker_id: "W1".to_string(),
        status: "submitted".to_string(),
    }
}

/// A shell wired to test doubles: mock marketplace, scripted prompts,
/// captured output, and a controller pointed at a dead port.
pub(crate) fn test_shell(market: Arc<MockMarket>, answers: &[&str]) -> Shell<Vec<u8>> {
    let controller = ServerController::new(ControllerConfig {
        command: "sleep 30".to_string(),
        host: "127.0.0.1".to_string(),
        port: 1,
        poll_interval: Duration::from_millis(10),
        wait_timeout: Duration::from_millis(50),
    });
    Shell::new(
        Session::new(Environment::Sandbox),
        ConfigStore::in_memory(),
        market,
        controller,
        Box::new(ScriptedPrompt::new(answers)),
        Vec::new(),
        false,
    )
}

/// Captured output as a string.
pub(crate) fn output(shell: &Shell<Vec<u8>>) -> String {
    String::from_utf8_lossy(&shell.out).to_string()
}
