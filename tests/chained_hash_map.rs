// ChainedHashMap integration tests.
//
// Each test states the behavior it verifies. Core invariants exercised:
// - Uniqueness: `insert` never overwrites; `insert_or_assign` always does.
// - Size: `len()` counts distinct keys and only `access` on a missing key
//   grows it among the read-shaped calls.
// - Resize: growth doubles, shrink via `set_max_load_factor` lands on
//   `ceil(len / f) + 1`, erase never shrinks.
// - Preconditions: zero buckets and bad factors are rejected unchanged.
use chained_hashmap::{ChainedHashMap, Failure, HashConfig};

// Test: default map, assign three keys, erase one.
// Verifies: size tracks distinct keys; erased key is gone, others stay.
#[test]
fn scenario_a_insert_or_assign_then_erase() {
    let mut m = ChainedHashMap::new();
    m.insert_or_assign("one".to_string(), 1);
    m.insert_or_assign("two".to_string(), 2);
    m.insert_or_assign("three".to_string(), 3);
    assert_eq!(m.len(), 3);

    assert!(m.erase("two"));
    assert_eq!(m.len(), 2);
    assert!(!m.contains_key("two"));
    assert!(m.contains_key("one"));
    assert_eq!(m.get("three"), Some(&3));
}

// Test: `access` on a never-inserted key of an empty map.
// Verifies: a zero value is returned and the map now holds one entry.
#[test]
fn scenario_b_access_inserts_default() {
    let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    assert_eq!(*m.access("four".to_string()), 0);
    assert_eq!(m.len(), 1);
    assert!(m.contains_key("four"));
}

// Test: four buckets at load factor 1.0, then a fifth key.
// Verifies: the fifth key triggers a rehash to exactly eight buckets and
// every earlier key keeps its value.
#[test]
fn scenario_c_growth_on_fifth_key() {
    let c = HashConfig::new().bucket_count(4).max_load_factor(1.0);
    let mut m = ChainedHashMap::with_config(c).unwrap();
    for i in 0..4 {
        m.insert_or_assign(format!("k{i}"), i);
    }
    assert_eq!(m.bucket_count(), 4);
    m.insert_or_assign("k4".to_string(), 4);
    assert_eq!(m.bucket_count(), 8);
    for i in 0..5 {
        assert_eq!(m.get(&format!("k{i}")), Some(&i));
    }
}

// Test: four entries in four buckets, then tighten the factor to 0.5.
// Verifies: immediate rehash to ceil(4 / 0.5) + 1 = 9 buckets.
#[test]
fn scenario_d_shrink_via_max_load_factor() {
    let mut m = ChainedHashMap::with_buckets(4).unwrap();
    for i in 0..4u32 {
        assert!(m.insert(i, i));
    }
    assert_eq!(m.bucket_count(), 4);
    m.set_max_load_factor(0.5).unwrap();
    assert_eq!(m.bucket_count(), 9);
    assert!(m.load_factor() <= 0.5);
    for i in 0..4u32 {
        assert_eq!(m.get(&i), Some(&i));
    }
}

// Test: plain insert twice on the same key.
// Verifies: second call returns false and the first value remains.
#[test]
fn insert_twice_keeps_first_value() {
    let mut m = ChainedHashMap::new();
    assert!(m.insert("k", "v1"));
    assert!(!m.insert("k", "v2"));
    assert_eq!(m.get("k"), Some(&"v1"));
    assert_eq!(m.len(), 1);
}

// Test: insert_or_assign over an existing key.
// Verifies: size unchanged, value replaced.
#[test]
fn insert_or_assign_updates_without_growing() {
    let mut m = ChainedHashMap::new();
    m.insert_or_assign(7u64, 1u64);
    let len = m.len();
    m.insert_or_assign(7, 2);
    assert_eq!(m.len(), len);
    assert_eq!(m.get(&7), Some(&2));
}

// Test: N distinct inserts, then N erasures.
// Verifies: empty afterwards, no key found, bucket count not reduced.
#[test]
fn insert_then_erase_all() {
    let mut m = ChainedHashMap::new();
    for i in 0..500u32 {
        m.insert_or_assign(i, i.to_string());
    }
    assert_eq!(m.len(), 500);
    let grown = m.bucket_count();
    for i in 0..500u32 {
        assert!(m.erase(&i));
    }
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
    assert!((0..500u32).all(|i| !m.contains_key(&i)));
    assert_eq!(m.bucket_count(), grown);
}

// Test: every growth step while inserting.
// Verifies: each rehash exactly doubles and load stays within bound.
#[test]
fn every_growth_step_doubles() {
    let mut m = ChainedHashMap::with_buckets(3).unwrap();
    let mut count = m.bucket_count();
    for i in 0..2000u32 {
        m.insert_or_assign(i, ());
        if m.bucket_count() != count {
            assert_eq!(m.bucket_count(), count * 2);
            count = m.bucket_count();
        }
        assert!(m.load_factor() <= m.max_load_factor());
    }
    assert_eq!(count, 3 * 1024);
}

// Test: value written via access and read back after many unrelated ops.
// Verifies: unrelated inserts/erasures and rehashes do not disturb it.
#[test]
fn access_value_survives_unrelated_churn() {
    let mut m: ChainedHashMap<String, Vec<u32>> = ChainedHashMap::with_buckets(1).unwrap();
    m.access("keep".to_string()).push(42);
    for i in 0..300 {
        m.insert_or_assign(format!("tmp{i}"), vec![i]);
        if i % 3 == 0 {
            m.erase(&format!("tmp{i}"));
        }
    }
    m.set_max_load_factor(0.2).unwrap();
    assert_eq!(m.get("keep"), Some(&vec![42]));
    m.access("keep".to_string()).push(43);
    assert_eq!(m["keep"], vec![42, 43]);
}

// Test: construction and configuration preconditions.
// Verifies: rejected with the right Failure; nothing clamped.
#[test]
fn preconditions_fail_fast() {
    assert_eq!(
        ChainedHashMap::<u8, u8>::with_buckets(0).err(),
        Some(Failure::ZeroBuckets)
    );
    let bad = HashConfig::new().max_load_factor(-1.0);
    assert_eq!(
        ChainedHashMap::<u8, u8>::with_config(bad).err(),
        Some(Failure::InvalidLoadFactor)
    );

    let mut m: ChainedHashMap<u8, u8> = ChainedHashMap::new();
    assert_eq!(m.set_max_load_factor(0.0), Err(Failure::InvalidLoadFactor));
    assert_eq!(m.set_max_load_factor(f32::NAN), Err(Failure::InvalidLoadFactor));
    assert_eq!(m.max_load_factor(), 1.0);
    assert_eq!(m.rehash(0), Err(Failure::ZeroBuckets));
    assert!(Failure::ZeroBuckets.is_precondition());
}

// Test: clear.
// Verifies: size 0, bucket count kept, map reusable.
#[test]
fn clear_then_reuse() {
    let mut m: ChainedHashMap<u32, u32> = (0..40).map(|i| (i, i)).collect();
    let count = m.bucket_count();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.bucket_count(), count);
    assert!(m.insert(1, 1));
    assert_eq!(m.len(), 1);
}

// Test: clone independence.
// Verifies: a clone is a full copy; changes on either side stay local.
#[test]
fn clone_is_independent() {
    let mut a: ChainedHashMap<String, u32> =
        ["x", "y", "z"].iter().map(|k| (k.to_string(), 1)).collect();
    let mut b = a.clone();
    assert_eq!(a, b);
    *b.access("x".to_string()) = 9;
    a.erase("y");
    assert_eq!(a.get("x"), Some(&1));
    assert_eq!(b.get("x"), Some(&9));
    assert!(b.contains_key("y"));
}

// Test: handle lookup after growth.
// Verifies: a handle obtained before a rehash still resolves after it.
#[test]
fn handle_stable_across_growth() {
    let mut m = ChainedHashMap::with_buckets(2).unwrap();
    m.insert_or_assign("first".to_string(), 1);
    let h = m.find("first").unwrap();
    for i in 0..100 {
        m.insert_or_assign(format!("k{i}"), i);
    }
    assert!(m.bucket_count() > 2);
    assert_eq!(m.value(h), Some(&1));
    assert_eq!(m.key(h).map(String::as_str), Some("first"));
}

// Test: bucket placement through the engine view.
// Verifies: chain lengths sum to len and each key maps inside the table.
#[test]
fn bucket_introspection() {
    let m: ChainedHashMap<u32, u32> = (0..64).map(|i| (i, i)).collect();
    let e = m.engine();
    let total: usize = (0..m.bucket_count()).filter_map(|i| e.bucket_len(i)).sum();
    assert_eq!(total, m.len());
    for i in 0..64u32 {
        let b = e.bucket(&i);
        assert!(b < m.bucket_count());
        assert!(e.bucket_len(b).unwrap() >= 1);
    }
}

// Test: tighten the factor to 0.7 with seven entries in seven buckets.
// Verifies: the rehash lands on ceil(7 / 0.7) + 1 = 11 buckets.
#[test]
fn shrink_with_inexact_factor() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::with_buckets(7).unwrap();
    for i in 0..7 {
        m.insert(i, i);
    }
    m.set_max_load_factor(0.7).unwrap();
    assert_eq!(m.bucket_count(), 11);
}

// Test: handle taken before clear, then a fresh insert.
// Verifies: the old handle resolves to nothing instead of the new entry.
#[test]
fn clear_makes_handles_stale() {
    let mut m = ChainedHashMap::new();
    m.insert_or_assign("old".to_string(), 1);
    let h = m.find("old").unwrap();
    m.clear();
    m.insert_or_assign("new".to_string(), 2);
    assert!(m.key(h).is_none());
    assert!(m.value(h).is_none());
}
