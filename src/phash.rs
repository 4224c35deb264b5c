//! Minimal perfect hashing over a fixed string set.
//!
//! Displacement-based construction: keys are grouped into buckets by a
//! first-level hash, then each bucket (largest first) searches for a seed
//! that maps all of its keys onto still-free slots. Lookup recomputes the
//! two hashes; the caller verifies the candidate slot's stored key, since
//! a query for an absent key can still land on an occupied slot.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Displacement search cutoff. Distinct key sets converge long before
/// this; hitting it means the key set cannot be placed (e.g. duplicates).
const MAX_DISPLACEMENT: u32 = 65_536;

fn hash(seed: u64, key: &str) -> u64 {
    let mut h = FNV_OFFSET ^ seed.wrapping_mul(FNV_PRIME);
    for b in key.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

pub(crate) struct PerfectHash {
    /// Per-bucket displacement seed; 0 marks an empty bucket.
    disp: Vec<u32>,
}

impl PerfectHash {
    /// Build a minimal perfect hash over `keys`.
    ///
    /// Returns the hash plus, for each input key, the slot it occupies in
    /// `0..keys.len()`. Returns `None` if no placement was found, which
    /// with distinct keys only happens on pathological sets.
    pub(crate) fn build(keys: &[&str]) -> Option<(Self, Vec<usize>)> {
        let n = keys.len();
        if n == 0 {
            return Some((Self { disp: Vec::new() }, Vec::new()));
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, key) in keys.iter().enumerate() {
            buckets[(hash(0, key) as usize) % n].push(i);
        }

        // Place large buckets first, while free slots are plentiful.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&b| std::cmp::Reverse(buckets[b].len()));

        let mut disp = vec![0u32; n];
        let mut used = vec![false; n];
        let mut slot_of = vec![0usize; n];

        for &b in &order {
            let bucket = &buckets[b];
            if bucket.is_empty() {
                continue;
            }

            let mut d = 1u32;
            let mut claimed = Vec::with_capacity(bucket.len());
            loop {
                claimed.clear();
                let mut ok = true;
                for &ki in bucket {
                    let slot = (hash(u64::from(d), keys[ki]) as usize) % n;
                    if used[slot] || claimed.contains(&slot) {
                        ok = false;
                        break;
                    }
                    claimed.push(slot);
                }
                if ok {
                    break;
                }
                d += 1;
                if d > MAX_DISPLACEMENT {
                    return None;
                }
            }

            for (&ki, &slot) in bucket.iter().zip(&claimed) {
                used[slot] = true;
                slot_of[ki] = slot;
            }
            disp[b] = d;
        }

        Some((Self { disp }, slot_of))
    }

    /// Candidate slot for `key`, or `None` when the key's bucket is empty.
    ///
    /// A returned slot is only a candidate: the caller must compare the
    /// slot's stored key against the query before treating it as a match.
    pub(crate) fn index(&self, key: &str) -> Option<usize> {
        let n = self.disp.len();
        if n == 0 {
            return None;
        }
        let d = self.disp[(hash(0, key) as usize) % n];
        if d == 0 {
            return None;
        }
        Some((hash(u64::from(d), key) as usize) % n)
    }
}
