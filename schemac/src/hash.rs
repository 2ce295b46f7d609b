//! Deterministic hashing: the string hash used for key dispatch and the
//! structural identity hash over schema entities.
//!
//! The identity fold matches the one emitted for user structs: the first
//! term is XORed into zero, and every following term is XORed in after a
//! [`mix`] of the running value. Term order therefore affects the digest.

use crate::schema::{GlobalAnnotation, Member, MemberAnnotation, MemberKind, StructType};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a of `s`.
pub const fn hash_str(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// xorshift64 avalanche step placed between folded terms.
pub const fn mix(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

/// Running state of an identity fold.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFold {
    hash: u64,
    started: bool,
}

impl IdentityFold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one raw term.
    pub fn term(mut self, term: u64) -> Self {
        if self.started {
            self.hash = mix(self.hash);
        }
        self.hash ^= term;
        self.started = true;
        self
    }

    /// Fold in the identity hash of `value`.
    pub fn value<T: IdentityHash + ?Sized>(self, value: &T) -> Self {
        self.term(value.identity_hash())
    }

    pub fn finish(self) -> u64 {
        self.hash
    }
}

/// A value with a stable, structural 64-bit identity.
pub trait IdentityHash {
    fn identity_hash(&self) -> u64;
}

impl IdentityHash for str {
    fn identity_hash(&self) -> u64 {
        hash_str(self)
    }
}

impl IdentityHash for String {
    fn identity_hash(&self) -> u64 {
        hash_str(self)
    }
}

macro_rules! impl_identity_hash_for_int {
    ($($t:ty),*) => {
        $(
            impl IdentityHash for $t {
                fn identity_hash(&self) -> u64 {
                    // Sign-extended, like a C++ integral conversion.
                    *self as i64 as u64
                }
            }
        )*
    };
}

impl_identity_hash_for_int!(i32);

impl<T: IdentityHash> IdentityHash for [T] {
    fn identity_hash(&self) -> u64 {
        self.iter()
            .fold(IdentityFold::new(), |fold, item| fold.value(item))
            .finish()
    }
}

impl<T: IdentityHash> IdentityHash for Vec<T> {
    fn identity_hash(&self) -> u64 {
        self.as_slice().identity_hash()
    }
}

macro_rules! impl_identity_hash_for_unit_enum {
    ($($t:ty),*) => {
        $(
            impl IdentityHash for $t {
                fn identity_hash(&self) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

impl_identity_hash_for_unit_enum!(GlobalAnnotation, MemberAnnotation, MemberKind);

impl IdentityHash for Member {
    fn identity_hash(&self) -> u64 {
        IdentityFold::new()
            .value(&self.kind)
            .value(&self.ty)
            .value(&self.name)
            .value(&self.count)
            .value(&self.default_value)
            .value(&self.annotation)
            .finish()
    }
}

impl IdentityHash for StructType {
    fn identity_hash(&self) -> u64 {
        IdentityFold::new()
            .value(&self.qualified_name)
            .value(&self.name)
            .value(&self.annotation)
            .value(&self.members)
            .finish()
    }
}
