//! Dashboard proxy and view-state core for the Mural Pay payouts API.
//!
//! [`server`] exposes the proxy routes the browser calls; each forwards to
//! the upstream provider through [`provider`] with credentials injected
//! from [`config`]. [`dashboard`] holds the per-page state machines that
//! consume those routes.

pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod provider;
pub mod server;

pub use error::{PaydeskError, Result};
