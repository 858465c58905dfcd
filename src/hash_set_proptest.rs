#![cfg(test)]

// Property tests for HashSet kept inside the crate so they can check the
// structural invariants through `assert_invariants`.

use crate::{Handle, HandleError, HashSet};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Emplace(usize),
    Erase(usize),
    EraseAt(usize),
    Find(usize),
    Absent(String),
    Rehash(usize),
    Reserve(usize),
    MaxLoad(u8),
    Clear,
    Iterate,
    CloneCheck,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => idx.clone().prop_map(Op::Insert),
            1 => idx.clone().prop_map(Op::Emplace),
            2 => idx.clone().prop_map(Op::Erase),
            2 => idx.clone().prop_map(Op::EraseAt),
            2 => idx.clone().prop_map(Op::Find),
            1 => "[A-Z]{1,3}".prop_map(Op::Absent),
            1 => (0usize..200).prop_map(Op::Rehash),
            1 => (0usize..100).prop_map(Op::Reserve),
            1 => (1u8..=8).prop_map(Op::MaxLoad),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
            1 => Just(Op::CloneCheck),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run<S: BuildHasher + Clone>(
    mut sut: HashSet<String, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: BTreeSet<String> = BTreeSet::new();
    let mut live: HashMap<String, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        let buckets_before = sut.bucket_count();
        let order_before: Vec<String> = sut.iter().cloned().collect();
        match op {
            Op::Insert(i) | Op::Emplace(i) => {
                let k = pool[i].clone();
                let already = model.contains(&k);
                let (h, inserted) = match op {
                    Op::Emplace(_) => sut.emplace(k.as_str()),
                    _ => sut.insert(k.clone()),
                };
                prop_assert_eq!(inserted, !already, "inserted iff absent");
                if inserted {
                    prop_assert!(live.insert(k.clone(), h).is_none());
                    model.insert(k);
                } else {
                    prop_assert_eq!(Some(&h), live.get(&k), "duplicate yields existing handle");
                    prop_assert_eq!(sut.bucket_count(), buckets_before, "duplicate never grows");
                    let order: Vec<String> = sut.iter().cloned().collect();
                    prop_assert_eq!(&order, &order_before, "duplicate keeps iteration order");
                }
            }
            Op::Erase(i) => {
                let k = &pool[i];
                let n = sut.erase(k.as_str());
                prop_assert_eq!(n, usize::from(model.remove(k)));
                if let Some(h) = live.remove(k) {
                    stale.push(h);
                }
                prop_assert!(sut.find(k.as_str()).is_none());
            }
            Op::EraseAt(i) => {
                let k = &pool[i];
                if let Some(h) = live.remove(k) {
                    let expected_next = sut.next_handle(h).expect("live handle");
                    let next = sut.erase_at(h).expect("live handle");
                    prop_assert_eq!(next, expected_next, "erase_at yields traversal successor");
                    model.remove(k);
                    stale.push(h);
                }
            }
            Op::Find(i) => {
                let k = &pool[i];
                let found = sut.find(k.as_str());
                prop_assert_eq!(found.is_some(), model.contains(k));
                prop_assert_eq!(found, live.get(k).copied(), "handles are stable");
                prop_assert_eq!(sut.count(k.as_str()), usize::from(model.contains(k)));
            }
            Op::Absent(s) => {
                // Upper-case keys are never in the lower-case pool.
                prop_assert!(sut.find(s.as_str()).is_none());
                prop_assert_eq!(sut.count(s.as_str()), 0);
                prop_assert_eq!(sut.erase(s.as_str()), 0);
            }
            Op::Rehash(n) => {
                sut.rehash(n);
                prop_assert_eq!(sut.bucket_count(), buckets_before.max(n));
                if n <= buckets_before {
                    let order: Vec<String> = sut.iter().cloned().collect();
                    prop_assert_eq!(&order, &order_before, "no-op rehash keeps iteration order");
                }
            }
            Op::Reserve(n) => {
                sut.reserve(n);
                let target = (n as f64 / sut.max_load_factor() as f64).floor() as usize + 1;
                prop_assert_eq!(sut.bucket_count(), buckets_before.max(target));
            }
            Op::MaxLoad(tenths) => {
                let ml = f32::from(tenths) / 4.0;
                let over = sut.load_factor() > ml;
                sut.set_max_load_factor(ml);
                let expected = if over { buckets_before * 2 } else { buckets_before };
                prop_assert_eq!(sut.bucket_count(), expected);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
                prop_assert_eq!(sut.bucket_count(), buckets_before);
            }
            Op::Iterate => {
                let seen: Vec<&String> = sut.iter().collect();
                prop_assert_eq!(seen.len(), model.len(), "each key exactly once");
                let keys: BTreeSet<String> = seen.into_iter().cloned().collect();
                prop_assert_eq!(&keys, &model);
            }
            Op::CloneCheck => {
                let mut copy = sut.clone();
                prop_assert!(copy == sut);
                prop_assert_eq!(copy.bucket_count(), sut.bucket_count());
                copy.insert("CLONE-ONLY".to_string());
                prop_assert!(!sut.contains("CLONE-ONLY"));
                if let Some(h) = live.values().next() {
                    prop_assert_eq!(copy.get(*h), Err(HandleError::WrongSet));
                }
            }
        }

        prop_assert!(sut.bucket_count() >= buckets_before, "bucket count never shrinks");
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        for h in &stale {
            prop_assert_eq!(sut.get(*h), Err(HandleError::Stale));
        }
        for (k, h) in &live {
            prop_assert_eq!(sut.get(*h), Ok(k));
        }
        sut.assert_invariants();
    }
    Ok(())
}

// Property: State-machine equivalence against a BTreeSet model.
// Invariants exercised across random operation sequences:
// - Duplicate inserts are no-ops that return the existing entry's handle
//   and leave bucket count and iteration order alone.
// - `find`/`count` parity with the model; absent keys stay absent.
// - `erase_at` returns exactly the traversal successor.
// - Growth only increases the bucket count and preserves content.
// - Stale handles never resolve; live handles resolve to their key.
// - Chains index every entry at `digest % bucket_count`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(HashSet::with_bucket_count(4), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain handling.
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(HashSet::with_bucket_count_and_hasher(2, ConstBuildHasher), &pool, ops)?;
    }
}
