#![doc = include_str!("../README.md")]

mod config;
mod error;
mod partition;
pub mod pool;
mod populate;
mod storage;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::partition::*;
pub use crate::populate::*;
pub use crate::storage::*;
