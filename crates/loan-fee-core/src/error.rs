use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanFeeError {
    #[error("Invalid term: {0} months is not a supported loan term")]
    InvalidTerm(u32),

    #[error("Amount out of range: {amount} is outside [{min}, {max}]")]
    AmountOutOfRange {
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Invalid fee table: {reason}")]
    InvalidTable { reason: String },

    #[error("No breakpoint at {amount} in fee table")]
    MissingBreakpoint { amount: Decimal },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanFeeError {
    fn from(e: serde_json::Error) -> Self {
        LoanFeeError::SerializationError(e.to_string())
    }
}
