// cache.rs
//
// One memory level: owns its sets, the address decoder, and the three
// policies bound to it. Ported from
// original_source/cache_simulator/memory/cache.py, generalized from a
// single eviction-policy-by-string model into the tagged-variant
// policies of policy::{replacement, prefetch, bypass}.

use super::address::{decode, log2_exact};
use super::set::{FillOutcome, Set, Status};
use crate::policy::{BypassPolicy, PrefetchPolicy, ReplacementPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    WriteBack,
    WriteThrough,
}

impl WritePolicy {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "write-back" => Ok(WritePolicy::WriteBack),
            "write-through" => Ok(WritePolicy::WriteThrough),
            other => Err(format!("unknown write_policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatePolicy {
    WriteAllocate,
    NoWriteAllocate,
}

impl AllocatePolicy {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "write-allocate" => Ok(AllocatePolicy::WriteAllocate),
            "no-write-allocate" => Ok(AllocatePolicy::NoWriteAllocate),
            other => Err(format!("unknown allocation_policy '{other}'")),
        }
    }
}

/// Parameters needed to build one cache level. Validation (power-of-two
/// block_size/set_count, size divisibility) happens in `config.rs` before
/// this ever reaches `Cache::new` — by the time we get here, a violated
/// invariant is a programming bug, not a user error.
pub struct CacheParams {
    pub name: String,
    pub level_number: u32,
    pub cache_size_bytes: u64,
    pub block_size: u32,
    pub associativity: u32,
    pub hit_latency: u64,
    pub replacement_policy: ReplacementPolicy,
    pub write_policy: WritePolicy,
    pub allocate_policy: AllocatePolicy,
    pub prefetch_policy: PrefetchPolicy,
    pub bypass_policy: BypassPolicy,
}

pub struct Cache {
    pub name: String,
    pub level_number: u32,
    pub cache_size_bytes: u64,
    pub block_size: u32,
    pub associativity: u32,
    pub hit_latency: u64,
    pub set_count: u32,
    offset_bits: u32,
    index_bits: u32,
    sets: Vec<Set>,
    replacement_policy: ReplacementPolicy,
    pub write_policy: WritePolicy,
    pub allocate_policy: AllocatePolicy,
    prefetch_policy: PrefetchPolicy,
    bypass_policy: BypassPolicy,
    pub prefetch_count: u64,
    pub prefetch_miss_count: u64,
    pub useful_prefetch_count: u64,
    pub bypass_count: u64,
}

impl Cache {
    pub fn new(params: CacheParams) -> Self {
        let block_bytes = params.block_size as u64 * params.associativity as u64;
        assert!(block_bytes > 0, "block_size * associativity must be positive");
        assert_eq!(
            params.cache_size_bytes % block_bytes,
            0,
            "cache_size must be divisible by (associativity * block_size)"
        );
        let set_count = (params.cache_size_bytes / block_bytes) as u32;
        assert!(set_count.is_power_of_two(), "set_count must be a power of two");
        assert!(params.block_size.is_power_of_two(), "block_size must be a power of two");

        let offset_bits = log2_exact(params.block_size);
        let index_bits = log2_exact(set_count.max(1));

        let sets = (0..set_count)
            .map(|i| Set::new(i, params.associativity, offset_bits, index_bits))
            .collect();

        log::info!(
            "{}: {} sets x {}-way, block_size={}B ({}B total)",
            params.name,
            set_count,
            params.associativity,
            params.block_size,
            params.cache_size_bytes
        );

        Self {
            name: params.name,
            level_number: params.level_number,
            cache_size_bytes: params.cache_size_bytes,
            block_size: params.block_size,
            associativity: params.associativity,
            hit_latency: params.hit_latency,
            set_count,
            offset_bits,
            index_bits,
            sets,
            replacement_policy: params.replacement_policy,
            write_policy: params.write_policy,
            allocate_policy: params.allocate_policy,
            prefetch_policy: params.prefetch_policy,
            bypass_policy: params.bypass_policy,
            prefetch_count: 0,
            prefetch_miss_count: 0,
            useful_prefetch_count: 0,
            bypass_count: 0,
        }
    }

    fn set_index(&self, address: u64) -> (u64, usize) {
        let decoded = decode(address, self.block_size, self.set_count);
        (decoded.tag, decoded.index as usize)
    }

    pub fn read(&mut self, address: u64, t: i64) -> Status {
        let (tag, idx) = self.set_index(address);
        let (status, was_prefetched) = self.sets[idx].read_line(tag, t, &self.replacement_policy);
        match status {
            Status::Miss => self.handle_prefetch(address, t),
            Status::Hit if was_prefetched == Some(true) => self.useful_prefetch_count += 1,
            Status::Hit => {},
        }
        status
    }

    pub fn write(&mut self, address: u64, t: i64) -> Status {
        let (tag, idx) = self.set_index(address);
        self.sets[idx].write_line(tag, t, &self.replacement_policy)
    }

    /// Fill a line with `tag` decoded from `address`. Consults the bypass
    /// policy first; a bypassed fill performs no eviction and contributes
    /// only to `bypass_count`.
    pub fn fill(&mut self, address: u64, t: i64, is_prefetch: bool) -> FillOutcome {
        let (tag, idx) = self.set_index(address);
        let is_full = self.sets[idx].is_full();

        if self.bypass_policy.should_bypass(is_full, is_prefetch) {
            self.bypass_count += 1;
            return FillOutcome { was_dirty: false, evicted: false, evicted_addr: 0, prefetch_miss: false };
        }

        let outcome = self.sets[idx].fill_line(tag, t, is_prefetch, &self.replacement_policy);
        if outcome.prefetch_miss {
            self.prefetch_miss_count += 1;
        }
        outcome
    }

    fn handle_prefetch(&mut self, address: u64, t: i64) {
        let candidates = self.prefetch_policy.on_miss(address, self.block_size);
        for candidate in candidates {
            let (tag, idx) = self.set_index(candidate);
            if !self.sets[idx].contains_tag(tag) {
                self.prefetch_count += 1;
                self.fill(candidate, t, true);
            }
        }
    }

    pub fn contains_tag_for(&self, address: u64) -> bool {
        let (tag, idx) = self.set_index(address);
        self.sets[idx].contains_tag(tag)
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_mapped(size: u64, block_size: u32) -> Cache {
        Cache::new(CacheParams {
            name: "L0".into(),
            level_number: 0,
            cache_size_bytes: size,
            block_size,
            associativity: 1,
            hit_latency: 1,
            replacement_policy: ReplacementPolicy::Lru,
            write_policy: WritePolicy::WriteBack,
            allocate_policy: AllocatePolicy::WriteAllocate,
            prefetch_policy: PrefetchPolicy::none(),
            bypass_policy: BypassPolicy::no_bypass(),
        })
    }

    #[test]
    fn cold_miss_then_hit() {
        let mut cache = direct_mapped(16, 8); // 2 sets
        assert_eq!(cache.read(0x00, 1), Status::Miss);
        cache.fill(0x00, 1, false);
        assert_eq!(cache.read(0x00, 2), Status::Hit);
    }

    #[test]
    fn prefetch_hit_does_not_short_circuit_the_demand_miss_status() {
        let mut cache = Cache::new(CacheParams {
            name: "L0".into(),
            level_number: 0,
            cache_size_bytes: 16,
            block_size: 8,
            associativity: 1,
            hit_latency: 1,
            replacement_policy: ReplacementPolicy::Lru,
            write_policy: WritePolicy::WriteBack,
            allocate_policy: AllocatePolicy::WriteAllocate,
            prefetch_policy: PrefetchPolicy::next_n_line(1),
            bypass_policy: BypassPolicy::no_bypass(),
        });
        // Miss at 0x00 triggers a prefetch of 0x08, but the call still
        // reports MISS to the caller.
        assert_eq!(cache.read(0x00, 1), Status::Miss);
        assert_eq!(cache.prefetch_count, 1);
    }
}
