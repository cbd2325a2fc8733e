//! Miller-Rabin probable-prime testing over arbitrary precision integers.
//!
//! A composite survives one Miller-Rabin round with a random base with
//! probability at most `1/4`, so [`MILLER_RABIN_ROUNDS`] rounds bound the
//! false-positive probability by `2^-CERTAINTY`.
//!
//! The first thirteen prime bases are always tried first. They are a proof of
//! primality for every `n < 3.3 * 10^24` (Sorenson and Webster, 2015), so
//! values in that range never need random bases and are never misreported.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::RngCore;

/// The declared confidence of the probabilistic path: a reported prime is
/// composite with probability at most `2^-CERTAINTY`.
pub const CERTAINTY: u32 = 100;

/// Number of Miller-Rabin rounds needed to reach [`CERTAINTY`].
pub const MILLER_RABIN_ROUNDS: u32 = CERTAINTY.div_ceil(2);

/// Every `n` below this limit is decided exactly by [`FIXED_WITNESSES`].
const DETERMINISTIC_LIMIT: u128 = 3_317_044_064_679_887_385_961_981;

const FIXED_WITNESSES: [u32; 13] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

const TRIAL_DIVISORS: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Returns `true` if `n` is probably prime, using [`MILLER_RABIN_ROUNDS`].
///
/// # Example
/// ```
/// use num_bigint::BigUint;
/// use primeseq::is_probable_prime;
///
/// assert!(is_probable_prime(&BigUint::from(1_000_000_007_u64)));
/// // Carmichael number
/// assert!(!is_probable_prime(&BigUint::from(561_u32)));
/// ```
pub fn is_probable_prime(n: &BigUint) -> bool {
    is_probable_prime_with_rounds(n, MILLER_RABIN_ROUNDS)
}

/// Like [`is_probable_prime`], with an explicit number of rounds.
///
/// The thirteen fixed witnesses are always tried, even when `rounds` is lower.
pub fn is_probable_prime_with_rounds(n: &BigUint, rounds: u32) -> bool {
    if let Some(small) = n.to_u32() {
        if small <= TRIAL_DIVISORS[TRIAL_DIVISORS.len() - 1] {
            return TRIAL_DIVISORS.contains(&small);
        }
    }
    if TRIAL_DIVISORS.iter().any(|&p| (n % p).is_zero()) {
        return false;
    }

    let n_minus_one = n - 1_u32;
    // `n` is odd here, so `n - 1` is even and non-zero.
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let fixed_pass = FIXED_WITNESSES
        .iter()
        .all(|&base| passes_round(n, &n_minus_one, &d, s, &BigUint::from(base)));
    if !fixed_pass {
        return false;
    }
    if n.to_u128().is_some_and(|v| v < DETERMINISTIC_LIMIT) {
        return true;
    }

    let extra = rounds.saturating_sub(FIXED_WITNESSES.len() as u32);
    let mut rng = rand::rng();
    (0..extra).all(|_| {
        let base = random_base(&mut rng, n);
        passes_round(n, &n_minus_one, &d, s, &base)
    })
}

/// Returns the smallest probable prime strictly greater than `n`.
///
/// # Example
/// ```
/// use num_bigint::BigUint;
/// use primeseq::next_probable_prime;
///
/// assert_eq!(next_probable_prime(&BigUint::from(0_u32)), BigUint::from(2_u32));
/// assert_eq!(next_probable_prime(&BigUint::from(13_u32)), BigUint::from(17_u32));
/// ```
pub fn next_probable_prime(n: &BigUint) -> BigUint {
    next_probable_prime_with_rounds(n, MILLER_RABIN_ROUNDS)
}

/// Like [`next_probable_prime`], with an explicit number of rounds.
pub fn next_probable_prime_with_rounds(n: &BigUint, rounds: u32) -> BigUint {
    if n.to_u32().is_some_and(|v| v < 2) {
        return BigUint::from(2_u32);
    }
    let mut candidate = n + 1_u32;
    if candidate.is_even() {
        candidate += 1_u32;
    }
    while !is_probable_prime_with_rounds(&candidate, rounds) {
        candidate += 2_u32;
    }
    candidate
}

/// One strong-probable-prime round of `n - 1 = d * 2^s` to the given base.
fn passes_round(n: &BigUint, n_minus_one: &BigUint, d: &BigUint, s: u64, base: &BigUint) -> bool {
    let mut x = base.modpow(d, n);
    if x.is_one() || x == *n_minus_one {
        return true;
    }
    for _ in 1..s {
        x = (&x * &x) % n;
        if x == *n_minus_one {
            return true;
        }
        if x.is_one() {
            return false;
        }
    }
    false
}

/// A uniformly distributed base in `[2, n - 2]`.
fn random_base(rng: &mut impl RngCore, n: &BigUint) -> BigUint {
    // Oversample by 64 bits so the modulo bias is negligible.
    let mut bytes = vec![0_u8; (n.bits() as usize).div_ceil(8) + 8];
    rng.fill_bytes(&mut bytes);
    BigUint::from_bytes_le(&bytes) % (n - 3_u32) + 2_u32
}
