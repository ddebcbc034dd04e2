pub mod erp_rpc_client;
pub mod executor;
pub mod progress_tracker;
pub mod salesforce_client;

pub use executor::ImportExecutor;
pub use progress_tracker::ProgressTracker;
