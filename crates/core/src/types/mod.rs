//! Core types for sitedesk.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the server and the CLI.

pub mod email;
pub mod id;
pub mod role;
pub mod setting;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::UserRole;
pub use setting::{SettingKey, SettingKeyError, SettingType};
