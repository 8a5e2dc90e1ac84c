use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid scenario id: {value}")]
    InvalidScenarioId { value: i64 },

    #[error("Scenario {id} ends before it starts")]
    InvertedPeriod { id: u32 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
