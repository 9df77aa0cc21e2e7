//! Sitedesk Core - Shared domain types.
//!
//! This crate provides the types shared by every sitedesk component:
//! - `server` - REST API for site settings and user administration
//! - `cli` - Command-line tools for migrations and operator tasks
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. The `postgres` feature adds `sqlx` encode/decode support
//! for the newtypes and enums.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, roles and setting keys
//! - [`route_guard`] - Admin console navigation guard

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod route_guard;
pub mod types;

pub use route_guard::{GuardDecision, PendingRedirect, RouteGuard, SessionState};
pub use types::*;
