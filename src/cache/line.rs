// line.rs
//
// Per-block state holder. Ported from
// original_source/cache_simulator/memory/line.py: no data contents are
// modelled (Non-goal), only the valid/tag/dirty/prefetched bits and an
// opaque policy_state slot a ReplacementPolicy reads and writes.

#[derive(Debug, Clone)]
pub struct Line {
    valid: bool,
    tag: Option<u64>,
    dirty: bool,
    prefetched: bool,
    /// Opaque to everyone but the owning ReplacementPolicy: an LRU
    /// timestamp or an SRRIP RRPV counter, depending on the policy bound
    /// to this line's set.
    pub policy_state: Option<i64>,
}

impl Line {
    pub fn new() -> Self {
        Self { valid: false, tag: None, dirty: false, prefetched: false, policy_state: None }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn tag(&self) -> Option<u64> {
        self.tag
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_prefetched(&self) -> bool {
        self.prefetched
    }

    /// A demand read on a valid, matching line. Returns whether the line
    /// had previously been filled by a prefetch that was never demand-used
    /// ("useful prefetch" accounting happens at the caller using this
    /// return value), and clears the prefetched flag.
    pub fn read(&mut self) -> bool {
        let was_prefetched = self.prefetched;
        self.prefetched = false;
        was_prefetched
    }

    pub fn write(&mut self) {
        self.dirty = true;
        self.prefetched = false;
    }

    /// Fill with `tag`; `is_prefetch` marks whether this fill originated
    /// from a prefetch rather than a demand miss. policy_state is left for
    /// the policy's on_fill to set.
    pub fn fill(&mut self, tag: u64, is_prefetch: bool) {
        self.valid = true;
        self.tag = Some(tag);
        self.dirty = false;
        self.prefetched = is_prefetch;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}
