//! Splits the crypto listing into top-tier coins and the rest.

use std::collections::HashSet;

use crate::contract::Instrument;

/// Partition `instruments` by exact code membership in `top_tier_codes`.
///
/// Stable: input order is kept inside each partition. Every instrument lands in
/// exactly one of the two.
pub fn classify<S: AsRef<str>>(
    instruments: &[Instrument],
    top_tier_codes: &[S],
) -> (Vec<Instrument>, Vec<Instrument>) {
    let top_tier: HashSet<&str> = top_tier_codes.iter().map(AsRef::as_ref).collect();
    instruments
        .iter()
        .cloned()
        .partition(|instrument| top_tier.contains(instrument.code.as_str()))
}
