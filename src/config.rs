// config.rs
//
// JSON configuration loading and validation. Ported from
// original_source/cache_simulator/controller/memoryHierarchy.py and
// memory/cache.py::parse_size_to_bytes. Unlike the teacher's
// timing_simulator/config.rs (builder-pattern, constructed entirely in
// Rust), this configuration is read from an external JSON document, so it
// is split into raw `serde`-deserialized structs and a validated,
// factory-built `MemoryHierarchy`.

use serde::Deserialize;

use crate::cache::{AllocatePolicy, Cache, CacheParams, MemoryHierarchy, WritePolicy};
use crate::errors::CacheSimError;
use crate::policy::{BypassPolicy, PrefetchPolicy, ReplacementPolicy};

#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub cache_hierarchy: Vec<RawCacheEntry>,
    pub interconnects: Vec<RawInterconnect>,
    pub main_memory: RawMainMemory,
}

#[derive(Debug, Deserialize)]
pub struct RawCacheEntry {
    pub id: String,
    pub level: u32,
    pub config: RawCacheConfig,
}

#[derive(Debug, Deserialize)]
pub struct RawCacheConfig {
    pub size: String,
    pub block_size: u32,
    pub associativity: u32,
    pub hit_latency: u64,
    pub replacement_policy: String,
    pub write_policy: String,
    pub allocation_policy: String,
    #[serde(default)]
    pub prefetch: Option<RawPrefetchConfig>,
    #[serde(default)]
    pub bypass: Option<RawBypassConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RawPrefetchConfig {
    pub policy_name: String,
    #[serde(default = "default_degree")]
    pub degree: u32,
    #[serde(default = "default_table_size")]
    pub table_size: usize,
}

fn default_degree() -> u32 {
    1
}

fn default_table_size() -> usize {
    16
}

#[derive(Debug, Deserialize)]
pub struct RawBypassConfig {
    pub policy_name: String,
    #[serde(default = "default_bypass_prob_demand")]
    pub bypass_prob_demand: f64,
    #[serde(default = "default_bypass_prob_prefetch")]
    pub bypass_prob_prefetch: f64,
}

fn default_bypass_prob_demand() -> f64 {
    0.05
}

fn default_bypass_prob_prefetch() -> f64 {
    0.2
}

#[derive(Debug, Deserialize)]
pub struct RawInterconnect {
    pub bus_latency: u64,
}

#[derive(Debug, Deserialize)]
pub struct RawMainMemory {
    pub access_latency: u64,
}

/// Parse strings like "32KB", "256MB", "8GB", "512B" (case-insensitive,
/// optional whitespace before the unit; a bare number is bytes).
pub fn parse_size_to_bytes(size_str: &str) -> Result<u64, CacheSimError> {
    let trimmed = size_str.trim();
    let split_at = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    let (num_str, unit_str) = trimmed.split_at(split_at);
    let unit_str = unit_str.trim();

    let number: u64 = num_str
        .parse()
        .map_err(|_| CacheSimError::Config(format!("invalid number '{num_str}' in size string '{size_str}'")))?;

    let multiplier: u64 = match unit_str.to_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        other => {
            return Err(CacheSimError::Config(format!(
                "invalid unit '{other}' in size string '{size_str}'"
            )))
        },
    };

    Ok(number * multiplier)
}

/// Build a validated `MemoryHierarchy` from a parsed configuration
/// document, constructing the tagged-variant policies via their
/// `from_name`/`from_config` factories. Fails fast with a diagnostic
/// naming the offending field.
pub fn build_hierarchy(raw: &RawConfig) -> Result<MemoryHierarchy, CacheSimError> {
    if raw.cache_hierarchy.is_empty() {
        return Err(CacheSimError::Config("cache_hierarchy must contain at least one level".into()));
    }
    if raw.interconnects.len() != raw.cache_hierarchy.len() {
        return Err(CacheSimError::Config(format!(
            "interconnects must have one entry per cache level: got {} interconnects for {} levels",
            raw.interconnects.len(),
            raw.cache_hierarchy.len()
        )));
    }

    let mut levels = Vec::with_capacity(raw.cache_hierarchy.len());
    for entry in &raw.cache_hierarchy {
        levels.push(build_cache(entry)?);
    }

    let bus_latencies = raw.interconnects.iter().map(|i| i.bus_latency).collect();

    Ok(MemoryHierarchy::new(levels, bus_latencies, raw.main_memory.access_latency))
}

fn build_cache(entry: &RawCacheEntry) -> Result<Cache, CacheSimError> {
    let cfg = &entry.config;
    let cache_size_bytes = parse_size_to_bytes(&cfg.size)?;

    if !cfg.block_size.is_power_of_two() {
        return Err(CacheSimError::Config(format!(
            "{}: block_size {} is not a power of two",
            entry.id, cfg.block_size
        )));
    }
    if cfg.associativity == 0 {
        return Err(CacheSimError::Config(format!("{}: associativity must be positive", entry.id)));
    }
    let block_bytes = cfg.block_size as u64 * cfg.associativity as u64;
    if block_bytes == 0 || cache_size_bytes % block_bytes != 0 {
        return Err(CacheSimError::Config(format!(
            "{}: size {} is not divisible by (associativity * block_size = {})",
            entry.id, cache_size_bytes, block_bytes
        )));
    }
    let set_count = cache_size_bytes / block_bytes;
    if !set_count.is_power_of_two() {
        return Err(CacheSimError::Config(format!(
            "{}: resulting set_count {} is not a power of two",
            entry.id, set_count
        )));
    }

    let replacement_policy = ReplacementPolicy::from_name(&cfg.replacement_policy)
        .map_err(|e| CacheSimError::Config(format!("{}: {}", entry.id, e)))?;
    let write_policy = WritePolicy::from_name(&cfg.write_policy)
        .map_err(|e| CacheSimError::Config(format!("{}: {}", entry.id, e)))?;
    let allocate_policy = AllocatePolicy::from_name(&cfg.allocation_policy)
        .map_err(|e| CacheSimError::Config(format!("{}: {}", entry.id, e)))?;

    let prefetch_policy = match &cfg.prefetch {
        None => PrefetchPolicy::none(),
        Some(p) => PrefetchPolicy::from_config(&p.policy_name, p.degree, p.table_size)
            .map_err(|e| CacheSimError::Config(format!("{}: {}", entry.id, e)))?,
    };

    let bypass_policy = match &cfg.bypass {
        None => BypassPolicy::no_bypass(),
        Some(b) => BypassPolicy::from_config(&b.policy_name, b.bypass_prob_demand, b.bypass_prob_prefetch)
            .map_err(|e| CacheSimError::Config(format!("{}: {}", entry.id, e)))?,
    };

    Ok(Cache::new(CacheParams {
        name: entry.id.clone(),
        level_number: entry.level,
        cache_size_bytes,
        block_size: cfg.block_size,
        associativity: cfg.associativity,
        hit_latency: cfg.hit_latency,
        replacement_policy,
        write_policy,
        allocate_policy,
        prefetch_policy,
        bypass_policy,
    }))
}

/// Load and validate a configuration file end to end. Returns the
/// untyped JSON value alongside the built hierarchy so the caller can
/// echo the configuration verbatim in the report, the way
/// `performance.py::_get_formatted_stats` re-dumps the raw `config_data`
/// rather than a normalized/defaulted view of it.
pub fn load_hierarchy(
    path: &std::path::Path,
) -> Result<(serde_json::Value, MemoryHierarchy), CacheSimError> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let raw: RawConfig = serde_json::from_value(value.clone())?;
    let hierarchy = build_hierarchy(&raw)?;
    Ok((value, hierarchy))
}
