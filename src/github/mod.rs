// GitHub GraphQL module.
// Provides the transport, operation documents, and response types for issue-backed posts.

pub mod client;
pub mod operations;
pub mod types;

pub use client::{ClientSettings, Credentials, GraphQlClient, GraphQlRequest, Transport};
pub use operations::Operation;
pub use types::*;
