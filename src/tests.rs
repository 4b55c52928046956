use crate::{
    blake2b::Blake2bHasher,
    error::Error,
    state::{KvState, Pair},
    vm::{calculate_root, verify},
    H256,
};
use proptest::prelude::*;


/// `0x4C 0x4F 0x00`: push the sole leaf, then a full-height zero run.
/// Valid for any single-leaf state regardless of the key's bit pattern.
fn single_leaf_proof() -> Vec<u8> {
    vec![0x4C, 0x4F, 0x00]
}

fn leaves(min_leaves: usize, max_leaves: usize) -> impl Strategy<Value = Vec<(H256, H256)>> {
    prop::collection::vec(
        prop::array::uniform2(prop::array::uniform32(0u8..)),
        min_leaves..=max_leaves,
    )
    .prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|[k, v]| (k.into(), v.into()))
            .collect()
    })
}

proptest! {
    #[test]
    fn single_leaf_root_is_deterministic(key: [u8; 32], value: [u8; 32]) {
        let key: H256 = key.into();
        let value: H256 = value.into();
        let mut buf = [Pair::default(); 1];
        let mut state = KvState::init(&mut buf);
        state.insert(key, value).unwrap();
        state.normalize();
        let proof = single_leaf_proof();

        let root_a = calculate_root::<Blake2bHasher>(&state, &proof).expect("root");
        let root_b = calculate_root::<Blake2bHasher>(&state, &proof).expect("root");
        prop_assert_eq!(root_a, root_b);
        prop_assert!(verify::<Blake2bHasher>(&root_a, &state, &proof).is_ok());
    }

    #[test]
    fn single_leaf_sibling_key_changes_root(key: [u8; 32], value: [u8; 32]) {
        let key: H256 = key.into();
        let value: H256 = value.into();
        let mut sibling_key = key;
        if sibling_key.get_bit(0) {
            sibling_key.clear_bit(0);
        } else {
            sibling_key.set_bit(0);
        }

        let mut buf_a = [Pair::default(); 1];
        let mut state_a = KvState::init(&mut buf_a);
        state_a.insert(key, value).unwrap();
        state_a.normalize();

        let mut buf_b = [Pair::default(); 1];
        let mut state_b = KvState::init(&mut buf_b);
        state_b.insert(sibling_key, value).unwrap();
        state_b.normalize();

        let proof = single_leaf_proof();
        let root_a = calculate_root::<Blake2bHasher>(&state_a, &proof).expect("root");
        let root_b = calculate_root::<Blake2bHasher>(&state_b, &proof).expect("root");
        prop_assert_ne!(root_a, root_b);
    }

    #[test]
    fn single_leaf_tampered_value_fails_verify(key: [u8; 32], value: [u8; 32]) {
        let key: H256 = key.into();
        let value: H256 = value.into();
        let mut tampered = value;
        tampered.set_bit(0);
        tampered.clear_bit(1);
        prop_assume!(tampered != value);

        let mut buf = [Pair::default(); 1];
        let mut state = KvState::init(&mut buf);
        state.insert(key, value).unwrap();
        state.normalize();
        let proof = single_leaf_proof();
        let root = calculate_root::<Blake2bHasher>(&state, &proof).expect("root");

        let mut buf2 = [Pair::default(); 1];
        let mut tampered_state = KvState::init(&mut buf2);
        tampered_state.insert(key, tampered).unwrap();
        tampered_state.normalize();
        prop_assert_eq!(
            verify::<Blake2bHasher>(&root, &tampered_state, &proof).unwrap_err(),
            Error::InvalidProof
        );
    }

    #[test]
    fn normalize_is_sorted_descending_and_deduped(pairs in leaves(0, 40)) {
        let mut buf = vec![Pair::default(); pairs.len().max(1)];
        let mut state = KvState::init(&mut buf);
        for (k, v) in &pairs {
            state.insert(*k, *v).unwrap();
        }
        state.normalize();

        let kept = state.pairs();
        for w in kept.windows(2) {
            prop_assert!(w[0].key > w[1].key);
        }
        let mut unique_keys: Vec<H256> = pairs.iter().map(|(k, _)| *k).collect();
        unique_keys.sort_unstable();
        unique_keys.dedup();
        prop_assert_eq!(kept.len(), unique_keys.len());
    }
}
