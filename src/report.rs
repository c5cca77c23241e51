// report.rs
//
// Output file path derivation and graceful report saving. Ported from
// original_source/cache_simulator/controller/performance.py::save_to_file.

use std::path::{Path, PathBuf};

use colored::Colorize;

/// `output/<trace_stem>_<config_stem>.txt`, creating `output/` if needed.
pub fn output_path(trace_path: &Path, config_path: &Path) -> PathBuf {
    let trace_stem = trace_path.file_stem().and_then(|s| s.to_str()).unwrap_or("trace");
    let config_stem = config_path.file_stem().and_then(|s| s.to_str()).unwrap_or("config");
    Path::new("output").join(format!("{trace_stem}_{config_stem}.txt"))
}

/// Save `content` (already rendered without color codes) to the derived
/// path. I/O failure here is reported to the terminal, never fatal.
pub fn save_report(trace_path: &Path, config_path: &Path, content: &str) {
    let path = output_path(trace_path, config_path);
    let save = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)
    };

    match save() {
        Ok(()) => {
            let abs = std::fs::canonicalize(&path).unwrap_or(path.clone());
            println!("{}", format!("Successfully saved detailed report to: {}", abs.display()).bold().green());
        },
        Err(err) => {
            eprintln!("{}", format!("Error saving report: {err}").bold().red());
        },
    }
}
