// hierarchy.rs
//
// Ordered list of cache levels plus the bus/main-memory latencies between
// them. Ported from
// original_source/cache_simulator/controller/memoryHierarchy.py.

use super::cache::Cache;

pub struct MemoryHierarchy {
    pub levels: Vec<Cache>,
    /// `bus_latencies[i]` is the latency from level i to level i+1; the
    /// last entry is the latency from the deepest cache to main memory.
    pub bus_latencies: Vec<u64>,
    pub main_memory_latency: u64,
}

impl MemoryHierarchy {
    pub fn new(levels: Vec<Cache>, bus_latencies: Vec<u64>, main_memory_latency: u64) -> Self {
        assert_eq!(
            bus_latencies.len(),
            levels.len(),
            "bus_latencies must have one entry per level"
        );
        Self { levels, bus_latencies, main_memory_latency }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}
