//! Option set for a single build resolution.
//!
//! `BuildOptions` is the declared build intent: board, benchmark selection,
//! crash-safety mode, fault-injection parameters, and optimization toggles.
//! It is constructed once from parsed arguments (plus repo config defaults)
//! and never mutated afterwards; resolution is a pure function of this value.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Target development board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Board {
    /// Ambiq Apollo4 Blue Plus (Cortex-M4F)
    Apollo4bp,
    /// TI MSP430FR5994 LaunchPad (FRAM)
    #[default]
    Msp430fr5994,
    /// QEMU emulation of the Cortex-M target
    Qemu,
}

impl Board {
    pub fn as_str(self) -> &'static str {
        match self {
            Board::Apollo4bp => "apollo4bp",
            Board::Msp430fr5994 => "msp430fr5994",
            Board::Qemu => "qemu",
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benchmark application selection.
///
/// The `*_base` variants are the same applications built without the undo
/// logging optimization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Bench {
    Kv,
    Sense,
    Em,
    Mq,
    Dnn,
    Bc,
    Ar,
    KvBase,
    SenseBase,
    EmBase,
    MqBase,
    DnnBase,
    BcBase,
    ArBase,
    Etl,
    Pred,
    Stats,
    Train,
    #[default]
    None,
}

impl Bench {
    pub fn as_str(self) -> &'static str {
        match self {
            Bench::Kv => "kv",
            Bench::Sense => "sense",
            Bench::Em => "em",
            Bench::Mq => "mq",
            Bench::Dnn => "dnn",
            Bench::Bc => "bc",
            Bench::Ar => "ar",
            Bench::KvBase => "kv_base",
            Bench::SenseBase => "sense_base",
            Bench::EmBase => "em_base",
            Bench::MqBase => "mq_base",
            Bench::DnnBase => "dnn_base",
            Bench::BcBase => "bc_base",
            Bench::ArBase => "ar_base",
            Bench::Etl => "etl",
            Bench::Pred => "pred",
            Bench::Stats => "stats",
            Bench::Train => "train",
            Bench::None => "none",
        }
    }
}

impl std::fmt::Display for Bench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Power failure injection frequency.
///
/// Only meaningful when power failure injection itself is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum PfFreq {
    #[value(name = "100ns")]
    #[serde(rename = "100ns")]
    Ns100,
    #[value(name = "200ns")]
    #[serde(rename = "200ns")]
    Ns200,
    #[value(name = "500ns")]
    #[serde(rename = "500ns")]
    Ns500,
    #[value(name = "1ms")]
    #[serde(rename = "1ms")]
    Ms1,
    #[value(name = "2ms")]
    #[serde(rename = "2ms")]
    Ms2,
    #[value(name = "5ms")]
    #[serde(rename = "5ms")]
    Ms5,
    #[value(name = "10ms")]
    #[serde(rename = "10ms")]
    Ms10,
    #[default]
    #[value(name = "none")]
    #[serde(rename = "none")]
    None,
}

impl PfFreq {
    pub fn as_str(self) -> &'static str {
        match self {
            PfFreq::Ns100 => "100ns",
            PfFreq::Ns200 => "200ns",
            PfFreq::Ns500 => "500ns",
            PfFreq::Ms1 => "1ms",
            PfFreq::Ms2 => "2ms",
            PfFreq::Ms5 => "5ms",
            PfFreq::Ms10 => "10ms",
            PfFreq::None => "none",
        }
    }
}

impl std::fmt::Display for PfFreq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feature the user asked to compile in directly.
///
/// These map one-to-one onto kernel feature tokens and are emitted first,
/// in the order they appeared on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFeature {
    /// Inject power failures at a regular interval
    PowerFailure,
    /// Profile transactions
    ProfileTx,
    /// Profile the undo log
    ProfileLog,
    /// Debug tracing for power failure injection
    DebugPowerFailure,
    /// Debug tracing for benchmark applications
    DebugBench,
    /// Use timer B instead of timer A on the msp430fr5994 board
    Msp430UseTimerb,
    /// Drop the log optimization in the RIOT benchmark suite
    RiotbenchNoLogOpt,
}

impl InjectedFeature {
    /// The kernel feature token this selection compiles in.
    pub fn token(self) -> &'static str {
        match self {
            InjectedFeature::PowerFailure => crate::features::POWER_FAILURE,
            InjectedFeature::ProfileTx => crate::features::PROFILE_TX,
            InjectedFeature::ProfileLog => crate::features::PROFILE_LOG,
            InjectedFeature::DebugPowerFailure => crate::features::DEBUG_POWER_FAILURE,
            InjectedFeature::DebugBench => crate::features::DEBUG_BENCH,
            InjectedFeature::Msp430UseTimerb => crate::features::MSP430_USE_TIMERB,
            InjectedFeature::RiotbenchNoLogOpt => crate::features::RIOTBENCH_NO_LOG_OPT,
        }
    }
}

/// Declared build intent for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Print the resolved command without executing it.
    pub dry_run: bool,

    /// Build without compiler optimization and with debugging messages.
    pub debug: bool,

    /// Target development board.
    pub board: Board,

    /// Benchmark application selection.
    pub bench: Bench,

    /// Power failure injection frequency.
    pub pf_freq: PfFreq,

    /// Disable the list optimization.
    pub disable_list_opt: bool,

    /// Build without any crash safety mechanisms.
    pub vanilla: bool,

    /// Silence resource allocation messages from the kernel.
    pub no_os_verbose: bool,

    /// Use the bigger transaction size in the KV benchmark.
    pub bench_kv_large_tx: bool,

    /// Optimize the binary for size.
    pub size_opt: bool,

    /// Idempotent processing: emit LLVM bitcode and use NVM only.
    pub idem: bool,

    /// NVM baseline.
    pub base: bool,

    /// SRAM baseline.
    pub sram_base: bool,

    /// Run the application after compilation (QEMU).
    pub run: bool,

    /// Enable the timer daemon.
    pub timer_daemon: bool,

    /// Name of the user application to build.
    pub app: Option<String>,

    /// Directly injected features, in command-line order.
    pub injected: Vec<InjectedFeature>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_default_and_names() {
        assert_eq!(Board::default(), Board::Msp430fr5994);
        assert_eq!(Board::Apollo4bp.to_string(), "apollo4bp");
        assert_eq!(Board::Qemu.to_string(), "qemu");
    }

    #[test]
    fn test_bench_base_variant_names() {
        assert_eq!(Bench::KvBase.as_str(), "kv_base");
        assert_eq!(Bench::DnnBase.as_str(), "dnn_base");
        assert_eq!(Bench::default(), Bench::None);
    }

    #[test]
    fn test_pf_freq_names() {
        assert_eq!(PfFreq::Ns100.as_str(), "100ns");
        assert_eq!(PfFreq::Ms10.as_str(), "10ms");
        assert_eq!(PfFreq::default(), PfFreq::None);
    }

    #[test]
    fn test_config_enum_deserialization() {
        #[derive(serde::Deserialize)]
        struct Probe {
            board: Board,
            bench: Bench,
            pf_freq: PfFreq,
        }

        let probe: Probe =
            toml::from_str("board = \"apollo4bp\"\nbench = \"kv_base\"\npf_freq = \"100ns\"\n")
                .unwrap();
        assert_eq!(probe.board, Board::Apollo4bp);
        assert_eq!(probe.bench, Bench::KvBase);
        assert_eq!(probe.pf_freq, PfFreq::Ns100);
    }

    #[test]
    fn test_injected_feature_tokens() {
        assert_eq!(InjectedFeature::PowerFailure.token(), "power_failure");
        assert_eq!(InjectedFeature::Msp430UseTimerb.token(), "msp430_use_timerb");
        assert_eq!(
            InjectedFeature::RiotbenchNoLogOpt.token(),
            "riotbench_no_log_opt"
        );
    }

    #[test]
    fn test_default_options() {
        let opts = BuildOptions::default();
        assert!(!opts.vanilla);
        assert!(!opts.run);
        assert!(opts.app.is_none());
        assert!(opts.injected.is_empty());
    }
}
