// proxmate-api: async client for the Proxmox VE management API.
//
// Ticket-based sessions, typed operations over nodes, guests, storage,
// users, tasks and cluster state, and one error taxonomy for all of them.

pub mod auth;
pub mod cancel;
pub mod client;
mod envelope;
pub mod error;
pub mod models;
pub mod store;
pub mod transport;

pub use auth::{ConnectionTarget, Credentials, Session};
pub use cancel::cancellable;
pub use client::{PveClient, authenticate, establish_session};
pub use error::Error;
pub use store::{CredentialStore, StoreError};
pub use transport::{TlsMode, TransportConfig};
