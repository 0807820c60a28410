pub mod application;
pub mod resolver;
pub mod table;
pub mod term;

pub use application::{calculate_loan_fee, fee_schedule, LoanApplication, LoanFeeInput, LoanFeeOutput};
pub use resolver::{FeeBreakdown, FeeResolver, RangePolicy};
pub use table::{reference_structure, Breakpoint, FeeStructure, FeeTable};
pub use term::LoanTerm;
