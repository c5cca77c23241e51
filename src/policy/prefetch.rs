// prefetch.rs
//
// Per-level address predictor. Tagged variant per §9's REDESIGN FLAGS.
// Ported from original_source/cache_simulator/policy/prefetch.py. Only
// `on_miss` is invoked by the controller today; `on_hit` is implemented
// and reserved for a future caller, matching the Python base class
// contract.

const STREAM_HISTORY_LIMIT: usize = 16;

#[derive(Debug, Clone)]
struct StreamEntry {
    monitor_addr: i64,
    direction: i64,
    last_access_tick: u64,
}

#[derive(Debug, Clone)]
struct StreamState {
    degree: u32,
    table_size: usize,
    entries: Vec<StreamEntry>,
    miss_history: Vec<i64>,
    tick: u64,
}

impl StreamState {
    fn new(degree: u32, table_size: usize) -> Self {
        Self { degree, table_size, entries: Vec::new(), miss_history: Vec::new(), tick: 0 }
    }

    fn record_miss_history(&mut self, block_addr: i64) {
        self.miss_history.push(block_addr);
        if self.miss_history.len() > STREAM_HISTORY_LIMIT {
            self.miss_history.remove(0);
        }
    }

    fn allocate_entry(&mut self, entry: StreamEntry) {
        if self.entries.len() < self.table_size {
            self.entries.push(entry);
        } else if let Some((victim, _)) = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.last_access_tick)
        {
            self.entries[victim] = entry;
        }
    }

    fn candidates(&mut self, addr: u64, block_size: u32) -> Vec<u64> {
        let block_size_i = block_size as i64;
        let current_block = (addr as i64 / block_size_i) * block_size_i;
        self.tick += 1;

        for entry in self.entries.iter_mut() {
            let dist = (current_block - entry.monitor_addr) * entry.direction;
            let span = self.degree as i64 * block_size_i;
            if (0..=span).contains(&dist) {
                entry.last_access_tick = self.tick;
                let mut out = Vec::with_capacity(self.degree as usize);
                let mut next = current_block + entry.direction * block_size_i;
                for _ in 0..self.degree {
                    out.push(next);
                    next += entry.direction * block_size_i;
                }
                entry.monitor_addr = *out.last().unwrap();
                return out.into_iter().map(|a| a as u64).collect();
            }
        }

        let prev_block = current_block - block_size_i;
        let next_block = current_block + block_size_i;
        if self.miss_history.contains(&prev_block) {
            let out: Vec<i64> =
                (1..=self.degree as i64).map(|i| current_block + i * block_size_i).collect();
            self.allocate_entry(StreamEntry {
                monitor_addr: *out.last().unwrap(),
                direction: 1,
                last_access_tick: self.tick,
            });
            out.into_iter().map(|a| a as u64).collect()
        } else if self.miss_history.contains(&next_block) {
            let out: Vec<i64> =
                (1..=self.degree as i64).map(|i| current_block - i * block_size_i).collect();
            self.allocate_entry(StreamEntry {
                monitor_addr: *out.last().unwrap(),
                direction: -1,
                last_access_tick: self.tick,
            });
            out.into_iter().map(|a| a as u64).collect()
        } else {
            self.record_miss_history(current_block);
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrideEntryState {
    Initial,
    Training,
    Steady,
}

#[derive(Debug, Clone)]
struct StrideEntry {
    last_addr: i64,
    stride: i64,
    state: StrideEntryState,
    access_time: u64,
}

impl StrideEntry {
    fn reset(&mut self, at: i64, tick: u64) {
        self.last_addr = at;
        self.stride = 0;
        self.state = StrideEntryState::Initial;
        self.access_time = tick;
    }
}

#[derive(Debug, Clone)]
struct StrideState {
    degree: u32,
    max_entries: usize,
    entries: Vec<StrideEntry>,
    tick: u64,
}

impl StrideState {
    fn new(degree: u32, table_size: usize) -> Self {
        Self { degree, max_entries: table_size, entries: Vec::new(), tick: 0 }
    }

    fn candidates(&mut self, addr: u64, block_size: u32) -> Vec<u64> {
        let block_size_i = block_size as i64;
        let current_block = (addr as i64 / block_size_i) * block_size_i;
        self.tick += 1;

        for entry in self.entries.iter_mut() {
            let delta = (current_block - entry.last_addr) / block_size_i;

            match entry.state {
                StrideEntryState::Steady if delta == entry.stride => {
                    entry.last_addr = current_block;
                    entry.access_time = self.tick;
                    let mut out = Vec::with_capacity(self.degree as usize);
                    let mut pf = current_block;
                    for _ in 0..self.degree {
                        pf += entry.stride * block_size_i;
                        out.push(pf as u64);
                    }
                    return out;
                },
                StrideEntryState::Training if delta == entry.stride => {
                    entry.last_addr = current_block;
                    entry.access_time = self.tick;
                    entry.state = StrideEntryState::Steady;
                    return vec![(current_block + entry.stride * block_size_i) as u64];
                },
                StrideEntryState::Initial => {
                    if delta.abs() < 32 && delta != 0 {
                        entry.stride = delta;
                        entry.last_addr = current_block;
                        entry.state = StrideEntryState::Training;
                        entry.access_time = self.tick;
                        return vec![(current_block + entry.stride * block_size_i) as u64];
                    }
                },
                _ => {
                    // Mismatch in a non-Initial state: this entry's stream
                    // broke, give up on it until it re-trains.
                    entry.reset(current_block, self.tick);
                },
            }
        }

        if self.entries.len() < self.max_entries {
            self.entries.push(StrideEntry {
                last_addr: current_block,
                stride: 0,
                state: StrideEntryState::Initial,
                access_time: self.tick,
            });
        } else if let Some((victim, _)) =
            self.entries.iter().enumerate().min_by_key(|(_, e)| e.access_time)
        {
            self.entries[victim].reset(current_block, self.tick);
        }
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub enum PrefetchPolicy {
    None,
    NextNLine { degree: u32 },
    Stream(StreamState),
    Stride(StrideState),
}

impl PrefetchPolicy {
    pub fn none() -> Self {
        PrefetchPolicy::None
    }

    pub fn next_n_line(degree: u32) -> Self {
        PrefetchPolicy::NextNLine { degree }
    }

    pub fn stream(degree: u32, table_size: usize) -> Self {
        PrefetchPolicy::Stream(StreamState::new(degree, table_size))
    }

    pub fn stride(degree: u32, table_size: usize) -> Self {
        PrefetchPolicy::Stride(StrideState::new(degree, table_size))
    }

    pub fn from_config(
        policy_name: &str,
        degree: u32,
        table_size: usize,
    ) -> Result<Self, String> {
        match policy_name {
            "None" => Ok(PrefetchPolicy::none()),
            "NextNLine" => Ok(PrefetchPolicy::next_n_line(degree)),
            "Stream" => Ok(PrefetchPolicy::stream(degree, table_size)),
            "Stride" => Ok(PrefetchPolicy::stride(degree, table_size)),
            other => Err(format!("unknown prefetch policy_name '{other}'")),
        }
    }

    /// Candidate addresses to prefetch following a demand miss.
    pub fn on_miss(&mut self, addr: u64, block_size: u32) -> Vec<u64> {
        match self {
            PrefetchPolicy::None => Vec::new(),
            PrefetchPolicy::NextNLine { degree } => next_n_line_candidates(addr, block_size, *degree),
            PrefetchPolicy::Stream(state) => state.candidates(addr, block_size),
            PrefetchPolicy::Stride(state) => state.candidates(addr, block_size),
        }
    }

    /// Candidate addresses following a demand hit. Reserved: not called by
    /// the controller today.
    #[allow(dead_code)]
    pub fn on_hit(&mut self, addr: u64, block_size: u32) -> Vec<u64> {
        match self {
            PrefetchPolicy::None => Vec::new(),
            PrefetchPolicy::NextNLine { .. } => Vec::new(),
            PrefetchPolicy::Stream(state) => state.candidates(addr, block_size),
            PrefetchPolicy::Stride(state) => state.candidates(addr, block_size),
        }
    }
}

fn next_n_line_candidates(addr: u64, block_size: u32, degree: u32) -> Vec<u64> {
    let block_size = block_size as u64;
    let current_block = (addr / block_size) * block_size;
    (1..=degree as u64).map(|i| current_block + i * block_size).collect()
}
