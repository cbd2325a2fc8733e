#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod generator;
#[cfg(feature = "sieve")]
mod marks;
#[cfg(feature = "probabilistic")]
mod primality;
mod range;

pub use crate::error::*;
pub use crate::generator::*;
#[cfg(feature = "probabilistic")]
pub use crate::primality::*;
pub use crate::range::*;
