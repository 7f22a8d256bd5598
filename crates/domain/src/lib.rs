//! # bmshub-domain
//!
//! Pure domain model for the bmshub device integration core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **action vocabulary** of each integration (BRISE, SmartThings)
//!   and the value shape each action accepts
//! - Define the **command** wire types sent to remote control endpoints
//! - Define **status snapshots** returned by remote status endpoints
//! - Define **notifications** surfaced to the user
//! - Define the single active **platform configuration** record
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod command;
pub mod integration;
pub mod notification;
pub mod platform_config;
pub mod status;
