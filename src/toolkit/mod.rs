

pub mod audit;
pub mod booking;
pub mod knowledge;
pub mod matching;
pub mod providers;
