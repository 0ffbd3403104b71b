//! Deterministic fingerprints of sections and solutions.
//!
//! Fingerprints are SHA-256 over a canonical byte encoding, with domain
//! separation and length prefixing, so that equal structures hash equally
//! across runs and across stores that allocated IDs in the same order.
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)

use crate::core::{Connector, Link, Section, Slot};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain tag for section fingerprints.
pub const DOMAIN_SECTION_V0: &[u8] = b"SECTION_V0";

/// Domain tag for solution fingerprints.
pub const DOMAIN_SOLUTION_V0: &[u8] = b"SOLUTION_V0";

/// A 256-bit hash value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    /// Creates a zero hash (all zeros).
    #[inline]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns the raw byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes SHA-256 of the given data with domain separation.
    ///
    /// Input is `b"LKG:<domain>:v1" || length_prefix(data) || data`, the
    /// length prefix being a 64-bit little-endian byte count.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"LKG:");
        hasher.update(domain);
        hasher.update(b":v1");
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

impl std::fmt::Display for HashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HashValue({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Values with a canonical byte encoding.
pub trait Canonicalizable {
    /// Appends the canonical encoding of `self` to `out`.
    fn write_canonical(&self, out: &mut Vec<u8>);

    /// Returns the canonical encoding of `self`.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_canonical(&mut out);
        out
    }

    /// Domain-separated hash of the canonical encoding.
    fn fingerprint(&self, domain: &[u8]) -> HashValue {
        HashValue::hash_with_domain(domain, &self.to_canonical_bytes())
    }
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u64).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

impl Canonicalizable for Connector {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        write_str(out, self.link_type.as_str());
        write_str(out, self.pole.as_str());
    }
}

impl Canonicalizable for Link {
    // The link ID is store-local; the (type, from, to) triple is what it denotes.
    fn write_canonical(&self, out: &mut Vec<u8>) {
        write_str(out, self.link_type.as_str());
        out.extend_from_slice(&self.from.as_u64().to_le_bytes());
        out.extend_from_slice(&self.to.as_u64().to_le_bytes());
    }
}

impl Canonicalizable for Section {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.point().as_u64().to_le_bytes());
        out.extend_from_slice(&(self.slots().len() as u64).to_le_bytes());
        for slot in self.slots() {
            match slot {
                Slot::Open(connector) => {
                    out.push(0);
                    connector.write_canonical(out);
                }
                Slot::Linked(link) => {
                    out.push(1);
                    link.write_canonical(out);
                }
            }
        }
    }
}
