

pub mod server;

pub use server::{MediqueryMcpServer, run_server};
