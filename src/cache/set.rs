// set.rs
//
// A fixed-size group of lines addressed by one index. Ported from
// original_source/cache_simulator/memory/set.py. The replacement policy
// instance is owned by the Cache (one per level, Copy, effectively
// stateless — all mutable policy state lives in Line::policy_state) and
// is threaded through each call rather than stored on the Set itself.

use super::address::reconstruct;
use super::line::Line;
use crate::policy::ReplacementPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Hit,
    Miss,
}

/// Outcome of filling a line, mirroring
/// `Set.fill_line`'s `(is_dirty, evicted, evicted_address, prefetch_miss)`
/// tuple in the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    pub was_dirty: bool,
    pub evicted: bool,
    pub evicted_addr: u64,
    /// The victim line had been filled by a prefetch and was evicted
    /// before ever receiving a demand access.
    pub prefetch_miss: bool,
}

pub struct Set {
    pub index: u32,
    lines: Vec<Line>,
    offset_bits: u32,
    index_bits: u32,
}

impl Set {
    pub fn new(index: u32, associativity: u32, offset_bits: u32, index_bits: u32) -> Self {
        Self {
            index,
            lines: (0..associativity).map(|_| Line::new()).collect(),
            offset_bits,
            index_bits,
        }
    }

    pub fn associativity(&self) -> usize {
        self.lines.len()
    }

    fn find_valid(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|line| line.is_valid() && line.tag() == Some(tag))
    }

    fn find_invalid(&self) -> Option<usize> {
        self.lines.iter().position(|line| !line.is_valid())
    }

    /// `invalid` slots are absent for this check regardless of any stale
    /// tag they may carry (spec §9's note on `contains_tag` ignoring
    /// `valid` in the original source — callers here always see the
    /// corrected semantics).
    pub fn contains_tag(&self, tag: u64) -> bool {
        self.lines.iter().any(|line| line.is_valid() && line.tag() == Some(tag))
    }

    pub fn is_full(&self) -> bool {
        self.lines.iter().all(Line::is_valid)
    }

    /// Returns (status, was_prefetched) — `was_prefetched` is only
    /// meaningful on a HIT.
    pub fn read_line(&mut self, tag: u64, t: i64, policy: &ReplacementPolicy) -> (Status, Option<bool>) {
        match self.find_valid(tag) {
            Some(idx) => {
                policy.update_on_access(&mut self.lines, idx, t);
                let was_prefetched = self.lines[idx].read();
                (Status::Hit, Some(was_prefetched))
            },
            None => (Status::Miss, None),
        }
    }

    pub fn write_line(&mut self, tag: u64, t: i64, policy: &ReplacementPolicy) -> Status {
        match self.find_valid(tag) {
            Some(idx) => {
                policy.update_on_access(&mut self.lines, idx, t);
                self.lines[idx].write();
                Status::Hit
            },
            None => Status::Miss,
        }
    }

    pub fn fill_line(
        &mut self,
        tag: u64,
        t: i64,
        is_prefetch: bool,
        policy: &ReplacementPolicy,
    ) -> FillOutcome {
        if let Some(idx) = self.find_invalid() {
            self.lines[idx].fill(tag, is_prefetch);
            policy.on_fill(&mut self.lines, idx, t);
            return FillOutcome { was_dirty: false, evicted: false, evicted_addr: 0, prefetch_miss: false };
        }

        let victim_idx = policy.evict(&mut self.lines);
        let victim_tag = self.lines[victim_idx].tag().expect("victim line must be valid");
        let evicted_addr = reconstruct(victim_tag, self.index, self.offset_bits, self.index_bits);
        let prefetch_miss = self.lines[victim_idx].is_prefetched();
        let was_dirty = self.lines[victim_idx].is_dirty();
        self.lines[victim_idx].clear_dirty();
        self.lines[victim_idx].fill(tag, is_prefetch);
        policy.on_fill(&mut self.lines, victim_idx, t);

        FillOutcome {
            was_dirty,
            evicted: true,
            evicted_addr: if was_dirty { evicted_addr } else { 0 },
            prefetch_miss,
        }
    }
}
