//! Runs the architecture lint over the hydraulic store sources.
//!
//! Usage: `architecture-lint [BACKEND_DIR]`. Without an argument the
//! `backend/` crate beside this tool's workspace is checked.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use architecture_lint::{ArchitectureLintError, lint_backend_sources};

fn main() -> ExitCode {
    let backend_dir = std::env::args_os()
        .nth(1)
        .map_or_else(default_backend_dir, PathBuf::from);

    match lint_backend_sources(&backend_dir) {
        Ok(checked) => {
            let _ = writeln!(
                io::stdout().lock(),
                "architecture lint passed: {checked} files under {}",
                backend_dir.join("src").display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "{err}");
            if let ArchitectureLintError::Violations(violations) = &err {
                let _ = writeln!(stderr, "{} violation(s) found", violations.len());
            } else {
                let _ = writeln!(stderr);
            }
            ExitCode::FAILURE
        }
    }
}

/// `tools/architecture-lint` sits two levels below the repository root.
fn default_backend_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap_or_else(|| Path::new("."))
        .join("backend")
}
