// trace.rs
//
// Streaming trace file reader. Ported from
// original_source/main.py::run_simulation's inner loop: one access per
// line, whitespace-separated `<op> <hex-address>`, blank or malformed
// lines skipped with a warning rather than aborting the run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::errors::CacheSimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub op: Op,
    pub address: u64,
}

/// A single pass over a trace file. Reopened per warmup repetition rather
/// than buffered, so memory stays flat regardless of trace size.
pub struct TraceReader {
    lines: std::io::Lines<BufReader<File>>,
    path: PathBuf,
}

impl TraceReader {
    pub fn open(path: &Path) -> Result<Self, CacheSimError> {
        let file = File::open(path)?;
        Ok(Self { lines: BufReader::new(file).lines(), path: path.to_path_buf() })
    }
}

impl Iterator for TraceReader {
    type Item = Access;

    fn next(&mut self) -> Option<Access> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    log::warn!("{}: I/O error reading trace line: {}", self.path.display(), err);
                    continue;
                },
            };

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 2 {
                if !parts.is_empty() {
                    log::warn!("{}: skipping malformed line '{}'", self.path.display(), line);
                }
                continue;
            }

            let op = match parts[0] {
                "r" => Op::Read,
                "w" => Op::Write,
                other => {
                    log::warn!("{}: skipping unknown operation '{}'", self.path.display(), other);
                    continue;
                },
            };

            let addr_str = parts[1].strip_prefix("0x").or_else(|| parts[1].strip_prefix("0X")).unwrap_or(parts[1]);
            let address = match u64::from_str_radix(addr_str, 16) {
                Ok(address) => address,
                Err(_) => {
                    log::warn!("{}: skipping non-hex address '{}'", self.path.display(), parts[1]);
                    continue;
                },
            };

            return Some(Access { op, address });
        }
    }
}
