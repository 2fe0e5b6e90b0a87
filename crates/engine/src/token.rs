//! Correlation tokens linking a trigger to its later callback.
//!
//! Tokens are drawn uniformly from a fixed space of [`TOKEN_SPACE`] values and
//! are never checked against previously issued ones. Uniqueness is therefore
//! probabilistic; [`collision_probability`] quantifies the risk for a given
//! number of outstanding requests.

use rand::Rng;

/// Number of distinct tokens: `T` followed by eight decimal digits.
pub const TOKEN_SPACE: u64 = 100_000_000;

/// Draw a fresh token such as `T04711023`.
pub fn generate_token() -> String {
    let value = rand::thread_rng().gen_range(0..TOKEN_SPACE);
    format!("T{value:08}")
}

/// Probability that at least two of `outstanding` tokens collide.
///
/// Uses the birthday bound `1 - exp(-n(n-1) / 2N)`. With 1,000 requests in
/// flight this is roughly 0.5%; with 10,000 it is close to 40%.
pub fn collision_probability(outstanding: u64) -> f64 {
    if outstanding < 2 {
        return 0.0;
    }
    let n = outstanding as f64;
    let pairs = n * (n - 1.0) / 2.0;
    1.0 - (-pairs / TOKEN_SPACE as f64).exp()
}
