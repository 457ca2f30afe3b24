//! Process supervisors: the measuring client loop and the restarting server loop.

pub mod client;
pub mod server;

pub use client::{run_client, ClientOverrides, ClientReport, ClientSettings};
pub use server::{run_server_forever, RestartPolicy, ServerOverrides, ServerReport, ServerSettings};
