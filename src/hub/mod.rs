// Data hub API module.
// Provides the HTTP client, wire types and the gateway trait used by the dialogs.

pub mod client;
pub mod endpoints;
pub mod gateway;
pub mod types;

pub use client::HubClient;
pub use gateway::DataGateway;
pub use types::*;
