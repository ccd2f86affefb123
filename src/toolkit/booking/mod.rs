

pub mod ledger;
pub mod models;

pub use ledger::BookingLedger;
pub use models::{BookingRecord, BookingStatus};
