pub mod error;
pub mod fee;
pub mod types;

pub use error::LoanFeeError;
pub use types::*;

/// Standard result type for all loan-fee operations
pub type LoanFeeResult<T> = Result<T, LoanFeeError>;
