//! Backend runtime entry point and public API surface.
//!
//! This crate owns the backend lifecycle: it authenticates the session, keeps
//! its token fresh, routes bridge messages to services, and fetches backend
//! resources on behalf of the frontend.

mod app;
mod config;
pub mod fragment;
pub mod resource;
mod runtime;
mod services;
pub mod session;
mod state;

#[cfg(test)]
mod test_support;

pub use crate::runtime::run;
