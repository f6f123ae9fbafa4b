//! Identity derivation for remote entities.
//!
//! Every internal id in a playlist's entity pools is produced here and only
//! here; services never invent their own ids. The derivation is a one-way
//! deterministic hash of the service-provided external identifier, so
//! repeated observations of the same remote entity (within a run or across
//! runs) always collapse onto the same pool entry.

use sha2::{Digest, Sha256};

/// Derive the internal id for an external identifier.
///
/// The result is the lowercase hex SHA-256 digest of the input. Identical
/// inputs always produce identical ids; distinct inputs collide only with
/// cryptographically negligible probability.
///
/// # Examples
///
/// ```
/// use core_model::ident::derive_id;
///
/// let a = derive_id("4gzpq5DPGxSnKTe4SA8HAU");
/// let b = derive_id("4gzpq5DPGxSnKTe4SA8HAU");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn derive_id(external_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(external_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derive an internal id from an optional external identifier.
///
/// An absent external id maps to an absent internal id.
pub fn derive_opt_id(external_id: Option<&str>) -> Option<String> {
    external_id.map(derive_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_id_is_idempotent() {
        for input in ["", "x", "4gzpq5DPGxSnKTe4SA8HAU", "p.abcdefg"] {
            assert_eq!(derive_id(input), derive_id(input));
        }
    }

    #[test]
    fn test_derive_id_distinguishes_inputs() {
        assert_ne!(derive_id("a"), derive_id("b"));
        assert_ne!(derive_id("spotify:a"), derive_id("applemusic:a"));
    }

    #[test]
    fn test_derive_id_is_stable_across_runs() {
        // Pinned digest: a change here silently severs every stored playlist
        // from its entity pools.
        assert_eq!(
            derive_id("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_derive_opt_id_maps_absence_to_absence() {
        assert_eq!(derive_opt_id(None), None);
        assert_eq!(derive_opt_id(Some("x")), Some(derive_id("x")));
    }
}
