pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::processing::HttpProcessingApi;
pub use adapters::storage::LocalStorage;
pub use adapters::supabase::{SupabaseClient, SupabaseRepository};
pub use core::dashboard::Dashboard;
pub use utils::error::{DashError, Result};
