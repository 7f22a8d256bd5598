//! # bmshub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **platform configuration endpoint** (`/api/platform-config`)
//!   used to validate and save the SmartThings access token
//! - Send BRISE and SmartThings device commands through their dispatchers
//! - Switch the active workspace and turn status polling on or off
//! - Stream user-visible notifications as Server-Sent Events
//! - Answer CORS preflight requests so browser front-ends can call it
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into JSON responses
//!
//! ## Dependency rule
//! Depends on `bmshub-app` (for port traits and services) and `bmshub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
