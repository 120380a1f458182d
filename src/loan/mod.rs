//! Loan declarations and loading

mod data;
pub mod loader;

pub use data::{AmortizationStyle, InsuranceBasis, Loan, LoanTerms, YearMonth};
pub use loader::{load_loans, load_loans_from_reader, MAX_SECONDARY_LOANS};
