use crate::H256;

/// Trait for customizing the hash function the verifier runs on.
///
/// Implementations accumulate bytes and reduce to a 32-byte digest; the
/// verifier never needs to read back a partial hash, so `write_*` +
/// `finish` is deliberately the whole surface.
pub trait Hasher {
    fn write_bytes(&mut self, bytes: &[u8]);
    fn write_byte(&mut self, b: u8) {
        self.write_bytes(&[b]);
    }
    fn write_h256(&mut self, h: &H256) {
        self.write_bytes(h.as_slice());
    }
    fn finish(self) -> H256;
}
