//! Library components of the `observatorio` command.

pub mod auth;
pub mod cache;
pub mod config;
pub mod explore;
pub mod logging;
pub mod pipeline;
pub mod session;
