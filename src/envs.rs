//! Environment assembly for kernel builds.
//!
//! The kernel's build script reads its configuration from `ENV_*` variables,
//! so the resolver turns the option set into an ordered list of entries.
//! The relative order is fixed regardless of which entries are present, to
//! keep rendered invocations diff-stable across runs.

use serde::Serialize;

use crate::options::{Bench, BuildOptions, PfFreq};

/// A single key/value pair destined for the spawned toolchain's environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvEntry {
    pub key: &'static str,
    pub value: String,
}

impl EnvEntry {
    fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// Render the entry as it appears in the printed command line.
    ///
    /// Values a shell would reinterpret are quoted in the rendered form
    /// only; execution passes the raw value through the process
    /// environment.
    pub fn render(&self) -> String {
        if needs_quoting(&self.value) {
            format!("{}=\"{}\"", self.key, self.value)
        } else {
            format!("{}={}", self.key, self.value)
        }
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'))
}

/// Produce the ordered environment entries for an option set.
///
/// Boolean options emit the sentinel value `1` and are absent when false.
pub fn assemble(opts: &BuildOptions) -> Vec<EnvEntry> {
    let mut envs = Vec::new();

    if opts.bench != Bench::None {
        envs.push(EnvEntry::new("ENV_BENCH_TASK", opts.bench.as_str()));
    }

    if opts.pf_freq != PfFreq::None {
        envs.push(EnvEntry::new("ENV_PF_FREQ", opts.pf_freq.as_str()));
    }

    if let Some(ref app) = opts.app {
        envs.push(EnvEntry::new("ENV_APP", app.clone()));
    }

    envs.push(EnvEntry::new("ENV_BOARD", opts.board.as_str()));

    if opts.idem {
        envs.push(EnvEntry::new("ENV_IDEM", "1"));
        envs.push(EnvEntry::new("RUSTFLAGS", "--emit=llvm-bc"));
    }

    if opts.base {
        envs.push(EnvEntry::new("ENV_BASELINE", "1"));
    }

    if opts.sram_base {
        envs.push(EnvEntry::new("ENV_SRAM_BASELINE", "1"));
    }

    if opts.timer_daemon {
        envs.push(EnvEntry::new("ENV_TIMER_DAEMON", "1"));
    }

    envs
}
