use crate::hasher::Hasher;
use crate::H256;
use blake2b_rs::{Blake2b, Blake2bBuilder};

const BLAKE2B_LEN: usize = 32;
/// CKB's default BLAKE2b personalization: 16 bytes, zero salt, fanout 1,
/// depth 1 (the defaults `Blake2bBuilder` already applies).
const PERSONALIZATION: &[u8] = b"ckb-default-hash";

pub fn new_blake2b() -> Blake2b {
    Blake2bBuilder::new(BLAKE2B_LEN)
        .personal(PERSONALIZATION)
        .build()
}

/// Default [`Hasher`](crate::hasher::Hasher) implementation, backed by
/// `blake2b-rs` with the CKB personalization required by `calculate_root`
/// and `verify`.
pub struct Blake2bHasher(Blake2b);

impl Default for Blake2bHasher {
    fn default() -> Self {
        Blake2bHasher(new_blake2b())
    }
}

impl Hasher for Blake2bHasher {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
    fn finish(self) -> H256 {
        let mut hash = [0u8; 32];
        self.0.finalize(&mut hash);
        hash.into()
    }
}
