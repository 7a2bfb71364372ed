/*!
 * Key Hashing
 *
 * Hash and equality functions for `StepMap` keys. String keys use Paul Hsieh's
 * SuperFastHash, which spreads well on its own. Every other hash goes through
 * Doug Lea's secondary mix before it is masked down to a bucket index, so weak
 * caller hashes (identity hashes of integers or addresses) still fill buckets
 * evenly.
 */

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash and equality strategy for one key type
pub struct KeyHashing<K> {
    hash: fn(&K) -> usize,
    equals: fn(&K, &K) -> bool,
    premixed: bool,
}

impl<K> Clone for KeyHashing<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for KeyHashing<K> {}

impl<K> std::fmt::Debug for KeyHashing<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHashing")
            .field("premixed", &self.premixed)
            .finish()
    }
}

impl<K> KeyHashing<K> {
    /// Caller-supplied functions; the hash is mixed before use
    pub fn custom(hash: fn(&K) -> usize, equals: fn(&K, &K) -> bool) -> Self {
        Self {
            hash,
            equals,
            premixed: false,
        }
    }

    /// Whether hashes are used without the secondary mix
    pub fn is_premixed(&self) -> bool {
        self.premixed
    }

    /// Final hash of a key, ready to be masked into a bucket index
    #[inline]
    pub fn hash(&self, key: &K) -> usize {
        let h = (self.hash)(key);
        if self.premixed {
            h
        } else {
            secondary_mix(h)
        }
    }

    #[inline]
    pub fn equals(&self, a: &K, b: &K) -> bool {
        (self.equals)(a, b)
    }
}

impl<K: AsRef<[u8]>> KeyHashing<K> {
    /// Byte-string keys (`String`, `&str`, `Vec<u8>`, ...)
    pub fn string() -> Self {
        Self {
            hash: |key: &K| super_fast_hash(key.as_ref()) as usize,
            equals: |a: &K, b: &K| a.as_ref() == b.as_ref(),
            premixed: true,
        }
    }
}

impl<K: Hash + Eq> KeyHashing<K> {
    /// Any `Hash + Eq` key, through the standard library hasher
    pub fn standard() -> Self {
        Self {
            hash: |key: &K| {
                let mut hasher = DefaultHasher::new();
                key.hash(&mut hasher);
                hasher.finish() as usize
            },
            equals: |a: &K, b: &K| a == b,
            premixed: false,
        }
    }
}

impl KeyHashing<u32> {
    pub fn uint32() -> Self {
        Self::custom(|key| *key as usize, |a, b| a == b)
    }
}

impl KeyHashing<u64> {
    pub fn uint64() -> Self {
        Self::custom(|key| *key as usize, |a, b| a == b)
    }
}

impl<T> KeyHashing<*const T> {
    /// Address keys, compared by identity
    pub fn pointer() -> Self {
        Self::custom(|key| *key as usize, |a, b| std::ptr::eq(*a, *b))
    }
}

/// Doug Lea's supplemental hash
#[inline]
pub fn secondary_mix(mut h: usize) -> usize {
    h = h.wrapping_add(!(h << 9));
    h ^= ((h as u32) >> 14) as usize;
    h = h.wrapping_add(h << 4);
    h ^= ((h as u32) >> 10) as usize;
    h
}

#[inline]
fn get16(data: &[u8]) -> u32 {
    u16::from_le_bytes([data[0], data[1]]) as u32
}

/// Paul Hsieh's SuperFastHash
pub fn super_fast_hash(data: &[u8]) -> u32 {
    if data.is_empty() {
        return 0;
    }

    let mut hash = data.len() as u32;
    let mut chunks = data.chunks_exact(4);

    for chunk in &mut chunks {
        hash = hash.wrapping_add(get16(chunk));
        let tmp = (get16(&chunk[2..]) << 11) ^ hash;
        hash = (hash << 16) ^ tmp;
        hash = hash.wrapping_add(hash >> 11);
    }

    let rest = chunks.remainder();
    match rest.len() {
        3 => {
            hash = hash.wrapping_add(get16(rest));
            hash ^= hash << 16;
            hash ^= ((rest[2] as i8 as i32) << 18) as u32;
            hash = hash.wrapping_add(hash >> 11);
        }
        2 => {
            hash = hash.wrapping_add(get16(rest));
            hash ^= hash << 11;
            hash = hash.wrapping_add(hash >> 17);
        }
        1 => {
            hash = hash.wrapping_add(rest[0] as i8 as i32 as u32);
            hash ^= hash << 10;
            hash = hash.wrapping_add(hash >> 1);
        }
        _ => {}
    }

    // Final avalanche
    hash ^= hash << 3;
    hash = hash.wrapping_add(hash >> 5);
    hash ^= hash << 4;
    hash = hash.wrapping_add(hash >> 17);
    hash ^= hash << 25;
    hash = hash.wrapping_add(hash >> 6);

    hash
}
