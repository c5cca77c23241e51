// controller.rs
//
// The traversal/write-back engine. Ported from spec's MemoryController
// description (original_source/cache_simulator/controller/control.py is an
// empty stub; this module follows the read/write/handle_write_back
// algorithm directly) with the no-write-allocate branch wired through.

use std::collections::HashMap;

use crate::cache::{MemoryHierarchy, Status};
use crate::metrics::Metrics;

pub struct MemoryController {
    pub hierarchy: MemoryHierarchy,
    pub metrics: Metrics,
    tick: i64,
}

impl MemoryController {
    pub fn new(hierarchy: MemoryHierarchy) -> Self {
        Self { hierarchy, metrics: Metrics::new(), tick: 0 }
    }

    pub fn read(&mut self, address: u64) {
        self.tick += 1;
        let t = self.tick;
        let n = self.hierarchy.depth();
        let mut total_latency: u64 = 0;
        let mut hit_level: i64 = -1;

        for (l, cache) in self.hierarchy.levels.iter_mut().enumerate() {
            let status = cache.read(address, t);
            if l == 0 {
                self.metrics.record_access(status);
            }
            self.metrics.record_level_access(&cache.name, Some(status));
            total_latency += cache.hit_latency;
            if status == Status::Hit {
                hit_level = l as i64;
                break;
            }
        }

        let came_from_main_memory = hit_level < 0;
        if came_from_main_memory {
            hit_level = n as i64;
            self.metrics.record_level_access("MainMemory", None);
            total_latency += self.hierarchy.main_memory_latency;
            total_latency += self.hierarchy.bus_latencies[n - 1];
        }

        // The topmost refill (into the level adjoining wherever the data
        // was actually found) reuses the bus hop already charged above
        // when that data came from main memory; only the hops above it
        // are new.
        let mut l = hit_level - 1;
        while l >= 0 {
            let level = l as usize;
            let outcome = self.hierarchy.levels[level].fill(address, t, false);
            if !(came_from_main_memory && l == hit_level - 1) {
                total_latency += self.hierarchy.bus_latencies[level];
            }
            if outcome.evicted {
                self.metrics.record_replacement();
            }
            if outcome.was_dirty {
                self.handle_write_back(outcome.evicted_addr, level + 1, false);
            }
            l -= 1;
        }

        self.metrics.record_latency(total_latency);
    }

    pub fn write(&mut self, address: u64) {
        self.metrics.record_latency(self.hierarchy.levels[0].hit_latency);
        self.handle_write_back(address, 0, true);
    }

    /// `sync` distinguishes the caller-driven write (advances the clock,
    /// records a global demand access) from a write-back issued
    /// recursively by a dirty eviction (neither).
    fn handle_write_back(&mut self, address: u64, level: usize, sync: bool) {
        let n = self.hierarchy.depth();
        if level >= n {
            return;
        }
        if sync {
            self.tick += 1;
        }
        let t = self.tick;

        let status = self.hierarchy.levels[level].write(address, t);
        self.metrics.record_level_access(&self.hierarchy.levels[level].name, Some(status));
        if sync {
            self.metrics.record_access(status);
        }

        if status == Status::Hit {
            return;
        }

        if self.hierarchy.levels[level].allocate_policy == crate::cache::AllocatePolicy::NoWriteAllocate {
            self.handle_write_back(address, level + 1, false);
            return;
        }

        // Locate the line downstream (or at main memory), then refill
        // upward from there to `level`.
        let mut found_level = n;
        for probe in (level + 1)..n {
            if self.hierarchy.levels[probe].contains_tag_for(address) {
                found_level = probe;
                break;
            }
        }

        let mut l = found_level;
        while l > level {
            l -= 1;
            let outcome = self.hierarchy.levels[l].fill(address, t, false);
            self.metrics.record_latency(self.hierarchy.levels[l].hit_latency);
            if outcome.evicted {
                self.metrics.record_replacement();
            }
            if outcome.was_dirty {
                self.handle_write_back(outcome.evicted_addr, l + 1, false);
            }
        }

        let status = self.hierarchy.levels[level].write(address, t);
        debug_assert_eq!(status, Status::Hit, "line must be present at level after refill");
    }

    pub fn collect_prefetch_information(&mut self) {
        for cache in &self.hierarchy.levels {
            self.metrics.prefetch_count += cache.prefetch_count;
            self.metrics.prefetch_miss_count += cache.prefetch_miss_count;
            self.metrics.useful_prefetch_count += cache.useful_prefetch_count;
            self.metrics.bypass_count += cache.bypass_count;
        }
    }

    pub fn calculate_amat(&mut self, level: usize) -> f64 {
        let mut cache_amat: HashMap<usize, f64> = HashMap::new();
        self.calculate_amat_rec(level, &mut cache_amat)
    }

    fn calculate_amat_rec(&mut self, level: usize, seen: &mut HashMap<usize, f64>) -> f64 {
        let n = self.hierarchy.depth();
        if level >= n {
            return self.hierarchy.main_memory_latency as f64;
        }
        if let Some(&cached) = seen.get(&level) {
            return cached;
        }

        let downstream = if level + 1 < n {
            self.calculate_amat_rec(level + 1, seen)
        } else {
            self.hierarchy.main_memory_latency as f64
        };

        let name = self.hierarchy.levels[level].name.clone();
        let miss_rate = self.metrics.get_miss_rate(&name);
        let hit_latency = self.hierarchy.levels[level].hit_latency as f64;
        let bus_latency = self.hierarchy.bus_latencies[level] as f64;
        let amat = hit_latency + miss_rate * (bus_latency + downstream);

        self.metrics.amat.insert(name, amat);
        seen.insert(level, amat);
        amat
    }
}
