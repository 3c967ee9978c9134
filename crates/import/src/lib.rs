pub mod dedup;
pub mod statement;

pub use dedup::FitidIndex;
pub use statement::{RawTransaction, StatementError};
