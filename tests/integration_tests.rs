use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn no_policy_config(size: &str, associativity: u32) -> String {
    format!(
        r#"{{
  "cache_hierarchy": [
    {{
      "id": "L0",
      "level": 0,
      "config": {{
        "size": "{size}",
        "block_size": 8,
        "associativity": {associativity},
        "hit_latency": 1,
        "replacement_policy": "LRU",
        "write_policy": "write-back",
        "allocation_policy": "write-allocate"
      }}
    }}
  ],
  "interconnects": [ {{ "bus_latency": 10 }} ],
  "main_memory": {{ "access_latency": 100 }}
}}"#
    )
}

fn run(dir: &std::path::Path, config: &std::path::Path, trace: &std::path::Path) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cachesim").unwrap();
    cmd.current_dir(dir);
    cmd.arg("--config").arg(config).arg("--trace").arg(trace).arg("--warmup").arg("1");
    cmd.assert()
}

fn read_report(dir: &std::path::Path, trace_name: &str, config_name: &str) -> String {
    let path = dir.join("output").join(format!("{trace_name}_{config_name}.txt"));
    fs::read_to_string(path).unwrap()
}

#[test]
fn scenario_a_cold_miss_then_hit() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.json", &no_policy_config("16B", 1));
    let trace = write_file(dir.path(), "trace.txt", "r 0x00\nr 0x00\n");

    run(dir.path(), &config, &trace)
        .success()
        .stdout(predicate::str::contains("CACHE SIMULATOR RESULTS"));

    let report = read_report(dir.path(), "trace", "config");
    assert!(report.contains("112 cycles"));
}

#[test]
fn scenario_b_conflict_miss() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.json", &no_policy_config("8B", 1));
    let trace = write_file(dir.path(), "trace.txt", "r 0x00\nr 0x40\nr 0x00\n");

    run(dir.path(), &config, &trace).success();

    let report = read_report(dir.path(), "trace", "config");
    assert!(report.contains("333 cycles"));
}

#[test]
fn scenario_c_write_back_dirty_eviction() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.json", &no_policy_config("8B", 1));
    let trace = write_file(dir.path(), "trace.txt", "w 0x00\nr 0x40\n");

    run(dir.path(), &config, &trace).success();

    let report = read_report(dir.path(), "trace", "config");
    let expected_row = format!("{:<15} | {:<10} | {:<10} | {:<10} | ", "L0", 2, 0, 2);
    assert!(report.contains(&expected_row));
}

#[test]
fn scenario_d_prefetch_useful() {
    let dir = tempdir().unwrap();
    let config = format!(
        r#"{{
  "cache_hierarchy": [
    {{
      "id": "L0",
      "level": 0,
      "config": {{
        "size": "16B",
        "block_size": 8,
        "associativity": 1,
        "hit_latency": 1,
        "replacement_policy": "LRU",
        "write_policy": "write-back",
        "allocation_policy": "write-allocate",
        "prefetch": {{ "policy_name": "NextNLine", "degree": 1 }}
      }}
    }}
  ],
  "interconnects": [ {{ "bus_latency": 10 }} ],
  "main_memory": {{ "access_latency": 100 }}
}}"#
    );
    let config = write_file(dir.path(), "config.json", &config);
    let trace = write_file(dir.path(), "trace.txt", "r 0x00\nr 0x08\n");

    run(dir.path(), &config, &trace).success();

    let report = read_report(dir.path(), "trace", "config");
    assert!(report.contains(&format!("{} 1", "Prefetch Count:    ")));
    assert!(report.contains(&format!("{} 0", "Prefetch Misses:   ")));
    assert!(report.contains(&format!("{} 1", "Useful Prefetches: ")));
}

#[test]
fn scenario_e_prefetch_wasted() {
    // See the unit test of the same name in src/controller.rs for why
    // prefetch_count is 2 rather than a naive 1: 0x18's own miss triggers
    // its own prefetch in addition to evicting 0x00's never-used one.
    let dir = tempdir().unwrap();
    let config = format!(
        r#"{{
  "cache_hierarchy": [
    {{
      "id": "L0",
      "level": 0,
      "config": {{
        "size": "16B",
        "block_size": 8,
        "associativity": 1,
        "hit_latency": 1,
        "replacement_policy": "LRU",
        "write_policy": "write-back",
        "allocation_policy": "write-allocate",
        "prefetch": {{ "policy_name": "NextNLine", "degree": 1 }}
      }}
    }}
  ],
  "interconnects": [ {{ "bus_latency": 10 }} ],
  "main_memory": {{ "access_latency": 100 }}
}}"#
    );
    let config = write_file(dir.path(), "config.json", &config);
    let trace = write_file(dir.path(), "trace.txt", "r 0x00\nr 0x18\n");

    run(dir.path(), &config, &trace).success();

    let report = read_report(dir.path(), "trace", "config");
    assert!(report.contains(&format!("{} 2", "Prefetch Count:    ")));
    assert!(report.contains(&format!("{} 1", "Prefetch Misses:   ")));
}

#[test]
fn scenario_f_amat_with_conflict_misses() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.json", &no_policy_config("8B", 1));
    // Two conflicting addresses accessed alternately: every access misses
    // (miss rate 1.0), and since this is the only level, AMAT = hit_latency
    // + 1.0 * (bus_latency + main_memory_latency) = 1 + 110 = 111.
    let trace = write_file(dir.path(), "trace.txt", "r 0x00\nr 0x40\n");

    run(dir.path(), &config, &trace).success();

    let report = read_report(dir.path(), "trace", "config");
    assert!(report.contains("111.00"));
}

#[test]
fn bypass_count_reaches_the_report() {
    let dir = tempdir().unwrap();
    let config = format!(
        r#"{{
  "cache_hierarchy": [
    {{
      "id": "L0",
      "level": 0,
      "config": {{
        "size": "8B",
        "block_size": 8,
        "associativity": 1,
        "hit_latency": 1,
        "replacement_policy": "LRU",
        "write_policy": "write-back",
        "allocation_policy": "write-allocate",
        "bypass": {{ "policy_name": "Prob", "bypass_prob_demand": 1.0, "bypass_prob_prefetch": 1.0 }}
      }}
    }}
  ],
  "interconnects": [ {{ "bus_latency": 10 }} ],
  "main_memory": {{ "access_latency": 100 }}
}}"#
    );
    let config = write_file(dir.path(), "config.json", &config);
    // 0x00 fills the only line (set not yet full, so no bypass); 0x08
    // conflicts into the same full set and is always bypassed.
    let trace = write_file(dir.path(), "trace.txt", "r 0x00\nr 0x08\n");

    run(dir.path(), &config, &trace).success();

    let report = read_report(dir.path(), "trace", "config");
    assert!(report.contains(&format!("{} 1", "Bypassed Fills:    ")));
}

#[test]
fn missing_config_file_exits_non_zero() {
    let dir = tempdir().unwrap();
    let trace = write_file(dir.path(), "trace.txt", "r 0x00\n");

    let mut cmd = Command::cargo_bin("cachesim").unwrap();
    cmd.current_dir(dir.path());
    cmd.arg("--config").arg("does-not-exist.json").arg("--trace").arg(&trace);
    cmd.assert().failure().stderr(predicate::str::contains("Error:"));
}

#[test]
fn malformed_trace_lines_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.json", &no_policy_config("16B", 1));
    let trace = write_file(dir.path(), "trace.txt", "\nbogus line\nr 0x00\nx 0x10\nr 0x00\n");

    run(dir.path(), &config, &trace).success();

    let report = read_report(dir.path(), "trace", "config");
    assert!(report.contains("112 cycles"));
}
