// metrics.rs
//
// Counter aggregation, per-level stats, AMAT, and report rendering. Ported
// from original_source/cache_simulator/controller/performance.py.

use std::collections::HashMap;
use std::fmt::Write as _;

use colored::Colorize;

use crate::cache::Status;

#[derive(Debug, Clone, Copy, Default)]
pub struct LevelStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct Metrics {
    pub access_count: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub total_latency: u64,
    pub replacement_count: u64,
    pub prefetch_count: u64,
    pub prefetch_miss_count: u64,
    /// Demand hits on a line that was still carrying its prefetched flag —
    /// a prefetch that paid off before eviction.
    pub useful_prefetch_count: u64,
    /// Fills suppressed by a bypass policy rather than ever installed.
    pub bypass_count: u64,
    pub level_stats: HashMap<String, LevelStats>,
    /// Insertion order of level ids, so the per-level table in `render`
    /// reads top-to-bottom in hierarchy order rather than hash order.
    level_order: Vec<String>,
    pub amat: HashMap<String, f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a demand access at L0 — the only place the global hit/miss
    /// counters move. Fatal if the running counters ever drift apart.
    pub fn record_access(&mut self, status: Status) {
        self.access_count += 1;
        match status {
            Status::Hit => self.hit_count += 1,
            Status::Miss => self.miss_count += 1,
        }
        assert_eq!(
            self.access_count,
            self.hit_count + self.miss_count,
            "inconsistent performance metrics"
        );
    }

    /// Record a per-level access. `status` is `None` for a main-memory
    /// access, which has no hit/miss concept of its own.
    pub fn record_level_access(&mut self, level_id: &str, status: Option<Status>) {
        let stats = self.level_stats.entry(level_id.to_string()).or_insert_with(|| {
            self.level_order.push(level_id.to_string());
            LevelStats::default()
        });
        stats.accesses += 1;
        match status {
            Some(Status::Hit) => stats.hits += 1,
            Some(Status::Miss) => stats.misses += 1,
            None => {},
        }
    }

    pub fn record_replacement(&mut self) {
        self.replacement_count += 1;
    }

    pub fn record_latency(&mut self, latency: u64) {
        self.total_latency += latency;
    }

    pub fn get_miss_rate(&self, level_id: &str) -> f64 {
        match self.level_stats.get(level_id) {
            Some(stats) if stats.accesses > 0 => stats.misses as f64 / stats.accesses as f64,
            _ => 0.0,
        }
    }

    /// Integer-divide every counter by `warmup`; a no-op for `warmup <= 0`.
    pub fn calculate_average_metrics(&mut self, warmup: i64) {
        if warmup <= 0 {
            return;
        }
        let warmup = warmup as u64;
        self.access_count /= warmup;
        self.hit_count /= warmup;
        self.miss_count /= warmup;
        self.total_latency /= warmup;
        self.replacement_count /= warmup;
        self.prefetch_count /= warmup;
        self.prefetch_miss_count /= warmup;
        self.useful_prefetch_count /= warmup;
        self.bypass_count /= warmup;
        for stats in self.level_stats.values_mut() {
            stats.accesses /= warmup;
            stats.hits /= warmup;
            stats.misses /= warmup;
        }
    }

    /// Render the full report: configuration echo (if given), global
    /// statistics, and the per-level breakdown table. `use_color` selects
    /// ANSI styling for the terminal; the saved-to-file copy passes false.
    pub fn render(&self, config_json: Option<&str>, use_color: bool) -> String {
        let mut out = String::new();

        let title = |s: &str| if use_color { s.bold().cyan().to_string() } else { s.to_string() };
        let header = |s: &str| if use_color { s.bold().blue().to_string() } else { s.to_string() };
        let label = |s: &str| if use_color { s.bold().to_string() } else { s.to_string() };
        let val = |s: &str| if use_color { s.green().to_string() } else { s.to_string() };

        let rule = "=".repeat(40);
        let _ = writeln!(out, "{}", title(&rule));
        let _ = writeln!(out, "{}", title("       CACHE SIMULATOR RESULTS          "));
        let _ = writeln!(out, "{}", title(&rule));

        if let Some(config_json) = config_json {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", header("[System Configuration]"));
            let _ = writeln!(out, "{}", config_json);
            let _ = writeln!(out, "{}", "-".repeat(40));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", header("[Global Performance Statistics]"));
        let avg_latency =
            if self.access_count > 0 { self.total_latency as f64 / self.access_count as f64 } else { 0.0 };

        let _ = writeln!(out, "{} {}", label("Total Accesses:"), val(&format!("{:<10}", self.access_count)));
        let _ = writeln!(out, "{}", "-".repeat(20));
        let _ = writeln!(out, "{} {} cycles", label("Total Latency: "), self.total_latency);
        let _ = writeln!(out, "{} {:.2} cycles/access", label("Avg Latency:   "), avg_latency);
        let _ = writeln!(out, "{} {}", label("Total Replacements:"), self.replacement_count);
        let _ = writeln!(out, "{} {}", label("Prefetch Count:    "), self.prefetch_count);
        let _ = writeln!(out, "{} {}", label("Prefetch Misses:   "), self.prefetch_miss_count);
        let _ = writeln!(out, "{} {}", label("Useful Prefetches: "), self.useful_prefetch_count);
        let _ = writeln!(out, "{} {}", label("Bypassed Fills:    "), self.bypass_count);

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", header("[Per-Level Breakdown]"));
        let _ = writeln!(
            out,
            "{:<15} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10}",
            "Level", "Accesses", "Hits", "Misses", "Miss Rate", "AMAT"
        );
        let _ = writeln!(out, "{}", "-".repeat(75));

        for level_id in &self.level_order {
            let stats = self.level_stats[level_id];
            let amat = self.amat.get(level_id).copied().unwrap_or(0.0);
            let amat_str = if amat != 0.0 { format!("{amat:.2}") } else { "N/A".to_string() };
            let miss_rate_str = if stats.hits + stats.misses > 0 {
                format!("{:.2}%", (stats.misses as f64 / (stats.hits + stats.misses) as f64) * 100.0)
            } else {
                "N/A".to_string()
            };
            let _ = writeln!(
                out,
                "{:<15} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10}",
                level_id, stats.accesses, stats.hits, stats.misses, miss_rate_str, amat_str
            );
        }

        let _ = writeln!(out, "{}", title(&rule));
        out
    }
}
