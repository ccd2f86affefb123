

#![allow(dead_code)]

pub mod core;
pub mod mcp;
pub mod toolkit;


pub use crate::core::analyzer::{AnalyzeRequest, AnalyzeResponse, RefineRequest, RefineResponse, SymptomAnalyzer};
pub use crate::core::config::MediqueryConfig;
pub use crate::core::error::{MediqueryError, Result};
pub use crate::toolkit::booking::BookingLedger;


pub const DEFAULT_MAX_DISTANCE_KM: f64 = 20.0;


pub const DEFAULT_TOP_DISEASES: usize = 3;


pub const DEFAULT_TOP_PROVIDERS: usize = 10;


pub const DEFAULT_MAX_SLOTS: usize = 5;
