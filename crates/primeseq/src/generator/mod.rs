#[cfg(feature = "sieve")]
mod base;
mod interface;
#[cfg(feature = "probabilistic")]
mod probable;
#[cfg(feature = "sieve")]
mod sieve;
#[cfg(all(feature = "sieve", feature = "probabilistic"))]
mod strategy;

#[cfg_attr(docsrs, doc(cfg(feature = "sieve")))]
#[cfg(feature = "sieve")]
pub use base::*;
pub use interface::*;
#[cfg_attr(docsrs, doc(cfg(feature = "probabilistic")))]
#[cfg(feature = "probabilistic")]
pub use probable::*;
#[cfg_attr(docsrs, doc(cfg(feature = "sieve")))]
#[cfg(feature = "sieve")]
pub use sieve::*;
#[cfg_attr(docsrs, doc(cfg(all(feature = "sieve", feature = "probabilistic"))))]
#[cfg(all(feature = "sieve", feature = "probabilistic"))]
pub use strategy::*;
