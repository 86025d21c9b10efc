#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod config;
pub mod entities;
pub mod framework;
pub mod processors;
pub mod source;
pub mod store;
pub mod tracking;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
