pub mod posting;
pub mod transaction;

pub use posting::Posting;
pub use transaction::Transaction;
