use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::merge::{merge, MergeValue};
use crate::state::KvState;
use crate::H256;

/// Push the next normalized assertion as a leaf at height 0.
const OP_LEAF: u8 = 0x4C;
/// Pop the top entry, merge it with an explicit 32-byte sibling hash.
const OP_PROOF: u8 = 0x50;
/// Pop the top entry, merge it with a compressed `MergeWithZero` sibling.
const OP_COMPRESSED: u8 = 0x51;
/// Merge the top two stack entries, which must share a height.
const OP_MERGE: u8 = 0x48;
/// Perform `n` (0 meaning 256) consecutive zero-sibling merges.
const OP_ZERO_RUN: u8 = 0x4F;

/// A stack depth of 257 can reduce a full height-256 tree: a stack of size
/// `S` can reduce up to `2^(S-1)` leaves, and `2^256` vastly exceeds any
/// tree this verifier will ever see, so 257 is both the minimum that
/// handles a full tree and the default the public API uses.
pub const DEFAULT_STACK_SIZE: usize = 257;

#[derive(Debug, Clone, Copy)]
struct StackSlot {
    key: H256,
    merge: MergeValue,
    height: u16,
}

/// `(parent_key, merged)` for `entry` merging with `sibling` at `height`,
/// placing `entry` on the left or right per the bit of its key at that
/// height. This is the sole place that decides left/right placement; every
/// opcode that performs a sibling merge routes through it.
fn merge_with_sibling<H: Hasher + Default>(
    height: u8,
    entry_key: &H256,
    entry_merge: MergeValue,
    sibling: MergeValue,
) -> (H256, MergeValue) {
    let parent_key = entry_key.parent_path(height);
    let merged = if entry_key.get_bit(height) {
        merge::<H>(height, &parent_key, sibling, entry_merge)
    } else {
        merge::<H>(height, &parent_key, entry_merge, sibling)
    };
    (parent_key, merged)
}

/// Recompute the root of the height-256 tree described by `state`'s
/// normalized assertions and `proof`'s bytecode.
///
/// `state.normalize()` must already have been called; the VM walks
/// `state.pairs()` in order, consuming one entry per `0x4C` opcode.
pub fn calculate_root<H: Hasher + Default>(state: &KvState, proof: &[u8]) -> Result<H256> {
    calculate_root_with_stack::<H, DEFAULT_STACK_SIZE>(state, proof)
}

/// Same as [`calculate_root`], but with an explicit stack depth `S`
/// instead of the default 257. Embedders that know their proofs never
/// need the full-height stack can shrink `S`; `S` must still be large
/// enough or legitimate proofs will overflow with `InvalidStack`.
pub fn calculate_root_with_stack<H: Hasher + Default, const S: usize>(
    state: &KvState,
    proof: &[u8],
) -> Result<H256> {
    let empty_slot = StackSlot {
        key: H256::zero(),
        merge: MergeValue::Zero,
        height: 0,
    };
    let mut stack = [empty_slot; S];
    let mut stack_top = 0usize;
    let mut proof_index = 0usize;
    let mut leaf_index = 0usize;
    let pairs = state.pairs();

    while proof_index < proof.len() {
        let opcode = proof[proof_index];
        proof_index += 1;
        match opcode {
            OP_LEAF => {
                if stack_top >= S {
                    return Err(Error::InvalidStack);
                }
                if leaf_index >= pairs.len() {
                    return Err(Error::InvalidProof);
                }
                let pair = pairs[leaf_index];
                stack[stack_top] = StackSlot {
                    key: pair.key,
                    merge: MergeValue::from_h256(pair.value),
                    height: 0,
                };
                stack_top += 1;
                leaf_index += 1;
            }
            OP_PROOF => {
                if stack_top == 0 {
                    return Err(Error::InvalidStack);
                }
                if proof_index + 32 > proof.len() {
                    return Err(Error::InvalidProof);
                }
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&proof[proof_index..proof_index + 32]);
                proof_index += 32;
                let sibling = MergeValue::from_h256(bytes.into());

                let top = stack_top - 1;
                let entry = stack[top];
                if entry.height > 255 {
                    return Err(Error::InvalidProof);
                }
                let height = entry.height as u8;
                let (parent_key, merged) =
                    merge_with_sibling::<H>(height, &entry.key, entry.merge, sibling);
                stack[top] = StackSlot {
                    key: parent_key,
                    merge: merged,
                    height: entry.height + 1,
                };
            }
            OP_COMPRESSED => {
                if stack_top == 0 {
                    return Err(Error::InvalidStack);
                }
                if proof_index + 1 + 32 + 32 > proof.len() {
                    return Err(Error::InvalidProof);
                }
                let zc = proof[proof_index];
                proof_index += 1;
                let mut base = [0u8; 32];
                base.copy_from_slice(&proof[proof_index..proof_index + 32]);
                proof_index += 32;
                let mut zero_bits = [0u8; 32];
                zero_bits.copy_from_slice(&proof[proof_index..proof_index + 32]);
                proof_index += 32;
                let zero_count: u16 = if zc == 0 { 256 } else { zc as u16 };
                let sibling = MergeValue::MergeWithZero {
                    base: base.into(),
                    zero_bits: zero_bits.into(),
                    zero_count,
                };

                let top = stack_top - 1;
                let entry = stack[top];
                if entry.height > 255 {
                    return Err(Error::InvalidProof);
                }
                let height = entry.height as u8;
                let (parent_key, merged) =
                    merge_with_sibling::<H>(height, &entry.key, entry.merge, sibling);
                stack[top] = StackSlot {
                    key: parent_key,
                    merge: merged,
                    height: entry.height + 1,
                };
            }
            OP_MERGE => {
                if stack_top < 2 {
                    return Err(Error::InvalidStack);
                }
                let b = stack[stack_top - 1];
                let a = stack[stack_top - 2];
                stack_top -= 2;
                if a.height != b.height {
                    return Err(Error::InvalidProof);
                }
                if a.height > 255 {
                    return Err(Error::InvalidProof);
                }
                let height = a.height as u8;
                let parent_key_a = a.key.parent_path(height);
                let parent_key_b = b.key.parent_path(height);
                if parent_key_a != parent_key_b {
                    return Err(Error::InvalidProof);
                }
                let merged = if a.key.get_bit(height) {
                    merge::<H>(height, &parent_key_a, b.merge, a.merge)
                } else {
                    merge::<H>(height, &parent_key_a, a.merge, b.merge)
                };
                stack[stack_top] = StackSlot {
                    key: parent_key_a,
                    merge: merged,
                    height: a.height + 1,
                };
                stack_top += 1;
            }
            OP_ZERO_RUN => {
                if stack_top == 0 {
                    return Err(Error::InvalidStack);
                }
                if proof_index >= proof.len() {
                    return Err(Error::InvalidProof);
                }
                let n = proof[proof_index];
                proof_index += 1;
                let zero_count: u16 = if n == 0 { 256 } else { n as u16 };

                let top = stack_top - 1;
                let mut entry = stack[top];
                if entry.height > 255 {
                    return Err(Error::InvalidProof);
                }
                let base_height = entry.height;
                for idx in 0..zero_count {
                    let height_u16 = base_height + idx;
                    if height_u16 > 255 {
                        return Err(Error::InvalidProof);
                    }
                    let height = height_u16 as u8;
                    let (parent_key, merged) =
                        merge_with_sibling::<H>(height, &entry.key, entry.merge, MergeValue::Zero);
                    entry.key = parent_key;
                    entry.merge = merged;
                    entry.height = height_u16 + 1;
                }
                stack[top] = entry;
            }
            _ => return Err(Error::InvalidProof),
        }
    }

    if stack_top != 1 {
        return Err(Error::InvalidStack);
    }
    if stack[0].height != 256 {
        return Err(Error::InvalidProof);
    }
    if leaf_index != pairs.len() {
        return Err(Error::InvalidProof);
    }

    Ok(stack[0].merge.digest::<H>())
}

/// Recompute the root and compare it to `expected_root`.
pub fn verify<H: Hasher + Default>(
    expected_root: &H256,
    state: &KvState,
    proof: &[u8],
) -> Result<()> {
    verify_with_stack::<H, DEFAULT_STACK_SIZE>(expected_root, state, proof)
}

/// Same as [`verify`], with an explicit stack depth. See
/// [`calculate_root_with_stack`].
pub fn verify_with_stack<H: Hasher + Default, const S: usize>(
    expected_root: &H256,
    state: &KvState,
    proof: &[u8],
) -> Result<()> {
    let root = calculate_root_with_stack::<H, S>(state, proof)?;
    if &root == expected_root {
        Ok(())
    } else {
        Err(Error::InvalidProof)
    }
}
