use crate::core::types::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("duplicate entity name: {0}")]
    DuplicateEntity(String),

    #[error("unknown attribute `{attribute}` on entity `{entity}`")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("value {value} is outside the declared domain of `{name}`")]
    DomainViolation { name: String, value: Value },

    #[error("unknown motor signal `{motor}` on entity `{entity}`")]
    UnknownMotorSignal { entity: String, motor: String },

    #[error("assignment references unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("assignment is missing variable `{0}`")]
    MissingVariable(String),

    #[error("agent on entity `{0}` was never initialized")]
    MechanismNotInitialized(String),

    #[error("trigger dispatch exceeded {max_passes} passes in one tick; triggering cycle suspected")]
    TriggerCycle { max_passes: usize },

    #[error("malformed log record: {0}")]
    MalformedRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
