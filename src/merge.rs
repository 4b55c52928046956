use crate::hasher::Hasher;
use crate::H256;

/// Domain tag for an ordinary binary merge of two non-trivial children.
const MERGE_NORMAL: u8 = 0x01;
/// Domain tag for lowering a [`MergeValue::MergeWithZero`] to a digest.
const MERGE_ZEROS: u8 = 0x02;

/// The digest of a subtree, represented so that long runs of zero-sibling
/// merges can be carried symbolically instead of re-hashed at every level.
///
/// Copying a `MergeValue` is cheap (at most 65 bytes), so implementations
/// are expected to pass it by value rather than worry about aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeValue {
    /// The subtree is entirely empty (every leaf under it is zero).
    Zero,
    /// An opaque, already-reduced 32-byte digest. Never the all-zero value
    /// (that case is always represented as `Zero`).
    Value(H256),
    /// A subtree with exactly one non-empty leaf ancestor (`base`), merged
    /// with `zero_count` consecutive zero siblings. `zero_bits` records, at
    /// bit position `h`, whether the zero sibling absorbed at height `h`
    /// sat on the right.
    MergeWithZero {
        base: H256,
        zero_bits: H256,
        zero_count: u16,
    },
}

impl MergeValue {
    pub fn is_zero(&self) -> bool {
        matches!(self, MergeValue::Zero)
    }

    pub fn from_h256(value: H256) -> Self {
        if value.is_zero() {
            MergeValue::Zero
        } else {
            MergeValue::Value(value)
        }
    }

    /// Lower this `MergeValue` to its raw 32-byte digest, finalizing a
    /// `MergeWithZero` chain with a single `MERGE_ZEROS`-tagged hash.
    pub fn digest<H: Hasher + Default>(&self) -> H256 {
        match self {
            MergeValue::Zero => H256::zero(),
            MergeValue::Value(h) => *h,
            MergeValue::MergeWithZero {
                base,
                zero_bits,
                zero_count,
            } => {
                let mut hasher = H::default();
                hasher.write_byte(MERGE_ZEROS);
                hasher.write_h256(base);
                hasher.write_h256(zero_bits);
                // zero_count ranges 1..=256; 256 wraps to the same "0 means
                // 256" byte convention the VM's opcode operands use.
                hasher.write_byte((*zero_count % 256) as u8);
                hasher.finish()
            }
        }
    }
}

/// `H_base(h, key, value) = BLAKE2b-256(h || key || value)`, untagged.
///
/// Used only to seed a [`MergeValue::MergeWithZero`] the first time a plain
/// `Value` absorbs a zero sibling.
pub fn base_node_hash<H: Hasher + Default>(height: u8, key: &H256, value: &H256) -> H256 {
    let mut hasher = H::default();
    hasher.write_byte(height);
    hasher.write_h256(key);
    hasher.write_h256(value);
    hasher.finish()
}

/// Merge two children at `height` whose common parent is `parent_key`.
///
/// `left`/`right` follow the tree's natural left/right order; callers are
/// responsible for placing the stack entry on the correct side per the bit
/// of its key at `height` (see the proof VM's ordering rule).
pub fn merge<H: Hasher + Default>(
    height: u8,
    parent_key: &H256,
    left: MergeValue,
    right: MergeValue,
) -> MergeValue {
    match (left, right) {
        (MergeValue::Zero, MergeValue::Zero) => MergeValue::Zero,
        (MergeValue::Zero, non_zero) => absorb_zero::<H>(height, parent_key, non_zero, false),
        (non_zero, MergeValue::Zero) => absorb_zero::<H>(height, parent_key, non_zero, true),
        (left, right) => {
            let mut hasher = H::default();
            hasher.write_byte(MERGE_NORMAL);
            hasher.write_byte(height);
            hasher.write_h256(parent_key);
            hasher.write_h256(&left.digest::<H>());
            hasher.write_h256(&right.digest::<H>());
            let result = hasher.finish();
            MergeValue::from_h256(result)
        }
    }
}

/// Absorb a zero sibling into `non_zero` at `height`. `zero_on_right` is
/// true when the zero sibling was the right child (i.e. `non_zero` was the
/// left child).
fn absorb_zero<H: Hasher + Default>(
    height: u8,
    parent_key: &H256,
    non_zero: MergeValue,
    zero_on_right: bool,
) -> MergeValue {
    match non_zero {
        MergeValue::Zero => unreachable!("absorb_zero called with a Zero non_zero side"),
        MergeValue::Value(value) => {
            let base = base_node_hash::<H>(height, parent_key, &value);
            let mut zero_bits = H256::zero();
            if zero_on_right {
                zero_bits.set_bit(height);
            }
            MergeValue::MergeWithZero {
                base,
                zero_bits,
                zero_count: 1,
            }
        }
        MergeValue::MergeWithZero {
            base,
            mut zero_bits,
            zero_count,
        } => {
            if zero_on_right {
                zero_bits.set_bit(height);
            }
            MergeValue::MergeWithZero {
                base,
                zero_bits,
                zero_count: zero_count + 1,
            }
        }
    }
}
