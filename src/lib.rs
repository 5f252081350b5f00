//! pr-deck: GitHub pull request tools with a merge UI
//!
//! Three tools over the GitHub REST API (list open PRs, merge one, show the
//! list UI) served over JSON-RPC on stdio, plus the presentation controller
//! that drives the merge UI from those tools.
//!
//! # Architecture
//!
//! - [`platform`]: GitHub access behind the `PlatformService` trait
//! - [`gateway`]: stable operation contract and tool dispatch
//! - [`server`]: JSON-RPC tool server
//! - [`app`]: merge UI state machine, controller and render model
//! - [`auth`], [`config`]: token discovery and runtime settings

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod platform;
pub mod server;
pub mod types;

pub use error::{Error, Result};
