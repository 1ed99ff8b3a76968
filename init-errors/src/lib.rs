use anyhow::Error;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MongoErr {
    #[error("Mongo is unreachable: {0:?}")]
    Unreachable(Error),
    #[error("Invalid Mongo URL: {0}")]
    InvalidUrl(String),
    #[error("{message}")]
    Command {
        code: i32,
        code_name: String,
        message: String,
    },
    #[error("{message}")]
    Write { code: i32, message: String },
    #[error("{0}")]
    Other(String),
}

impl MongoErr {
    /// Server provided error code, if the failure came with one
    pub fn code(&self) -> Option<i32> {
        match self {
            MongoErr::Command { code, .. } | MongoErr::Write { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            MongoErr::Command { message, .. } | MongoErr::Write { message, .. } => message.clone(),
            MongoErr::Unreachable(e) => format!("{e:#}"),
            MongoErr::InvalidUrl(reason) => format!("invalid url: {reason}"),
            MongoErr::Other(message) => message.clone(),
        }
    }
}

/// The bootstrap steps, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Connect,
    SwitchToAppDb,
    CreateAppUser,
    CreateCollection,
    SwitchToAdminDb,
    CreateAdminUser,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Connect => "connect",
            Step::SwitchToAppDb => "switch to application database",
            Step::CreateAppUser => "create application user",
            Step::CreateCollection => "create collection",
            Step::SwitchToAdminDb => "switch to admin database",
            Step::CreateAdminUser => "create admin user",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("Step {step:?} failed: {source}")]
pub struct StepErr {
    pub step: Step,
    #[source]
    pub source: MongoErr,
}

impl StepErr {
    pub fn new(step: Step, source: MongoErr) -> Self {
        Self { step, source }
    }
}
