//! Interactive completion and semantic validation for `create_hit`.
//!
//! Completion first: promptable fields are collected in declared order
//! (environment, worker count, reward, duration) for whichever are missing.
//! Validation second: rules run in a fixed order and the first failure
//! aborts the command with its own message, before any collaborator call.

use std::io;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use hitdesk_marketplace::{Environment, HitRequest};

use crate::shell::grammar::CreateHitArgs;
use crate::shell::prompt::PromptSource;

/// Reward strings are dollars.cents with exactly two cent digits.
#[allow(clippy::unwrap_used)]
static REWARD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d*\.\d\d$").unwrap());

/// Semantic rule failures, in the order the rules run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("*** invalid experiment location")]
    InvalidEnvironment,

    #[error("*** number of workers must be a whole number")]
    WorkersNotInteger,

    #[error("*** number of workers must be greater than 0")]
    WorkersNotPositive,

    #[error("*** reward must have format [dollars].[cents]")]
    RewardFormat,

    #[error("*** duration must be a whole number")]
    DurationNotInteger,

    #[error("*** duration must be greater than 0")]
    DurationNotPositive,
}

/// Raw field values after completion, before semantic validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHitRequest {
    pub environment: String,
    pub workers: String,
    pub reward: String,
    pub duration: String,
}

/// Fill in any missing `create_hit` fields by asking the operator, in the
/// declared field order. Interactive answers may abbreviate the environment
/// as `s`/`l`; typed-out command arguments may not.
pub fn complete(
    args: &CreateHitArgs,
    prompts: &mut dyn PromptSource,
) -> io::Result<RawHitRequest> {
    let environment = match &args.environment {
        Some(value) => value.clone(),
        None => expand_abbreviation(&prompts.ask("[s]andbox or [l]ive? ")?),
    };
    let workers = match &args.workers {
        Some(value) => value.clone(),
        None => prompts.ask("number of workers? ")?,
    };
    let reward = match &args.reward {
        Some(value) => value.clone(),
        None => prompts.ask("reward per HIT? ")?,
    };
    let duration = match &args.duration {
        Some(value) => value.clone(),
        None => prompts.ask("duration of HIT (in hours)? ")?,
    };
    Ok(RawHitRequest {
        environment,
        workers,
        reward,
        duration,
    })
}

fn expand_abbreviation(answer: &str) -> String {
    match answer {
        "s" => "sandbox".to_string(),
        "l" => "live".to_string(),
        other => other.to_string(),
    }
}

/// Run the semantic rules in fixed order, short-circuiting on the first
/// failure. No side effects.
pub fn validate(raw: &RawHitRequest) -> Result<HitRequest, ValidationError> {
    let environment: Environment = raw
        .environment
        .parse()
        .map_err(|_| ValidationError::InvalidEnvironment)?;

    let workers: i64 = raw
        .workers
        .parse()
        .map_err(|_| ValidationError::WorkersNotInteger)?;
    if workers <= 0 {
        return Err(ValidationError::WorkersNotPositive);
    }
    let max_assignments =
        u32::try_from(workers).map_err(|_| ValidationError::WorkersNotInteger)?;

    if !REWARD_PATTERN.is_match(&raw.reward) {
        return Err(ValidationError::RewardFormat);
    }

    let duration: i64 = raw
        .duration
        .parse()
        .map_err(|_| ValidationError::DurationNotInteger)?;
    if duration <= 0 {
        return Err(ValidationError::DurationNotPositive);
    }
    let duration_hours =
        u32::try_from(duration).map_err(|_| ValidationError::DurationNotInteger)?;

    Ok(HitRequest {
        environment,
        max_assignments,
        reward: raw.reward.clone(),
        duration_hours,
    })
}
