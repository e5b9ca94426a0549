#![cfg(test)]

// Property tests for HashEngine kept inside the crate so they can use the
// structural consistency check.

use crate::config::HashConfig;
use crate::engine::{Handle, HashEngine, InsertPolicy};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks
// in length, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Assign(usize, i32),
    GetOrInsert(usize, i32),
    Erase(usize),
    RemoveHandle(usize),
    Find(usize),
    Clear,
    SetLoadFactor(u8),
    Rehash(u8),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=12).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Assign(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::GetOrInsert(i, v)),
            3 => idx.clone().prop_map(Op::Erase),
            1 => idx.clone().prop_map(Op::RemoveHandle),
            2 => idx.clone().prop_map(Op::Find),
            1 => Just(Op::Clear),
            1 => (1u8..=40).prop_map(Op::SetLoadFactor),
            1 => (1u8..=64).prop_map(Op::Rehash),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run<S: BuildHasher>(
    mut sut: HashEngine<String, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut live: HashMap<String, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        let before_buckets = sut.bucket_count();
        let before_len = sut.len();
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                let (inserted, h) = sut.insert(k.clone(), v, InsertPolicy::Reject).unwrap();
                prop_assert_eq!(inserted, !already);
                if inserted {
                    model.insert(k.clone(), v);
                    live.insert(k, h);
                } else {
                    prop_assert_eq!(Some(&h), live.get(&k));
                }
            }
            Op::Assign(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                let (inserted, h) = sut.insert(k.clone(), v, InsertPolicy::Replace).unwrap();
                prop_assert_eq!(inserted, !already);
                model.insert(k.clone(), v);
                live.insert(k, h);
            }
            Op::GetOrInsert(i, v) => {
                let k = pool[i].clone();
                let h = sut.get_or_insert_with(k.clone(), || v).unwrap();
                let expected = *model.entry(k.clone()).or_insert(v);
                prop_assert_eq!(h.value(&sut), Some(&expected));
                live.insert(k, h);
            }
            Op::Erase(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.erase(k), model.remove(k).is_some());
                if let Some(h) = live.remove(k) {
                    stale.push(h);
                }
            }
            Op::RemoveHandle(i) => {
                let k = &pool[i];
                if let Some(h) = live.remove(k) {
                    let (kk, vv) = sut.remove(h).expect("live handle removes");
                    prop_assert_eq!(&kk, k);
                    prop_assert_eq!(Some(vv), model.remove(k));
                    stale.push(h);
                }
            }
            Op::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k), live.get(k).copied());
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
                prop_assert_eq!(sut.bucket_count(), before_buckets);
            }
            Op::SetLoadFactor(tenths) => {
                let f = f32::from(tenths) / 10.0;
                let over = sut.load_factor() > f;
                sut.set_max_load_factor(f).unwrap();
                if over {
                    // f32 throughout, like the stored factor.
                    let expected = (before_len as f32 / f).ceil() as usize + 1;
                    prop_assert_eq!(sut.bucket_count(), expected);
                } else {
                    prop_assert_eq!(sut.bucket_count(), before_buckets);
                }
            }
            Op::Rehash(n) => {
                sut.rehash(usize::from(n)).unwrap();
                prop_assert!(sut.bucket_count() >= usize::from(n));
            }
        }

        // Growth, when it happens on insert, is exact doubling for factors
        // of at least 1.
        if sut.len() > before_len {
            prop_assert!(sut.load_factor() <= sut.max_load_factor());
            if sut.bucket_count() != before_buckets && sut.max_load_factor() >= 1.0 {
                prop_assert_eq!(sut.bucket_count(), before_buckets * 2);
            }
        }

        for &h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        for (k, h) in &live {
            prop_assert_eq!(h.value(&sut), model.get(k));
        }
        prop_assert_eq!(sut.len(), model.len());
        let keys: BTreeSet<_> = sut.iter().map(|(_, k, _)| k.clone()).collect();
        let model_keys: BTreeSet<_> = model.keys().cloned().collect();
        prop_assert_eq!(keys, model_keys);
        sut.assert_consistent();
    }
    Ok(())
}

#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: state-machine equivalence against std::collections::HashMap.
// - insert/assign/get_or_insert report insertion exactly when the key is new.
// - handles stay valid across every rehash and go stale only on removal.
// - growth keeps load_factor <= max_load_factor and doubles exactly.
// - shrink via set_max_load_factor lands on ceil(len / f) + 1 buckets.
// - clear keeps the bucket count; every entry sits in its hash bucket.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), buckets in 1usize..16) {
        let sut = HashEngine::with_config(HashConfig::new().bucket_count(buckets)).unwrap();
        run(sut, &pool, ops)?;
    }

    // Same invariants with every key hashed into a single chain.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = HashEngine::with_config_and_hasher(HashConfig::new(), ConstBuildHasher).unwrap();
        run(sut, &pool, ops)?;
    }
}
