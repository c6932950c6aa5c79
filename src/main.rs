//! Cinder build CLI
//!
//! Entry point for the `cinder-build` command-line tool. Parses the build
//! intent, folds in repo config defaults, resolves the cargo invocation,
//! prints it, and (unless suppressed) spawns it and mirrors the child's
//! exit status.

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cinder_build::config::{RepoConfig, DEFAULT_CONFIG_PATH};
use cinder_build::options::{Bench, Board, BuildOptions, InjectedFeature, PfFreq};
use cinder_build::{invocation, launch};

#[derive(Parser, Debug)]
#[command(name = "cinder-build")]
#[command(about = "Compile the Cinder kernel with different configurations", version)]
struct Cli {
    /// Print the resolved command without executing it
    #[arg(long)]
    dry_run: bool,

    /// Build in debug mode: no compiler optimization, debugging messages on
    #[arg(long)]
    debug: bool,

    /// Target development board
    #[arg(long, value_enum, default_value_t = Board::Msp430fr5994)]
    board: Board,

    /// Benchmark application selection; *_base variants drop the undo logging optimization
    #[arg(long, value_enum, default_value_t = Bench::None)]
    bench: Bench,

    /// Power failure injection frequency; use together with --fail
    #[arg(long, value_enum, default_value_t = PfFreq::None)]
    pf_freq: PfFreq,

    /// Disable the list optimization
    #[arg(long)]
    disable_list_opt: bool,

    /// Inject power failures at a regular interval
    #[arg(long)]
    fail: bool,

    /// Remove all crash safety mechanisms; requires --disable-list-opt
    #[arg(long)]
    vanilla: bool,

    /// Silence resource allocation messages from the kernel
    #[arg(long)]
    no_os_verbose: bool,

    /// Profile transactions
    #[arg(long)]
    profile_tx: bool,

    /// Profile the undo log
    #[arg(long)]
    profile_log: bool,

    /// Print debugging messages for power failure injection
    #[arg(long)]
    debug_pf: bool,

    /// Print debugging messages for benchmark applications
    #[arg(long)]
    debug_bench: bool,

    /// Use timer B on the msp430fr5994 board
    #[arg(long)]
    use_timerb: bool,

    /// Use the bigger transaction size in the KV benchmark
    #[arg(long)]
    bench_kv_large_tx: bool,

    /// Remove the log optimization in the RIOT benchmark suite
    #[arg(long)]
    riotbench_base: bool,

    /// Optimize the binary for size
    #[arg(long)]
    size_opt: bool,

    /// Idempotent processing: emit LLVM bitcode and use NVM only
    #[arg(long)]
    idem: bool,

    /// NVM baseline
    #[arg(long)]
    base: bool,

    /// SRAM baseline
    #[arg(long)]
    sram_base: bool,

    /// Run the application after compilation (QEMU)
    #[arg(long)]
    run: bool,

    /// Enable the timer daemon
    #[arg(long)]
    timer_daemon: bool,

    /// Name of the user application to build
    #[arg(long)]
    app: Option<String>,

    /// Path to the repo config file (default: .cinder/build.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Print the resolved invocation as canonical JSON and exit
    #[arg(long)]
    explain: bool,
}

/// Flags that inject a feature token directly, keyed by clap arg id.
const INJECTED_FLAGS: &[(&str, InjectedFeature)] = &[
    ("fail", InjectedFeature::PowerFailure),
    ("profile_tx", InjectedFeature::ProfileTx),
    ("profile_log", InjectedFeature::ProfileLog),
    ("debug_pf", InjectedFeature::DebugPowerFailure),
    ("debug_bench", InjectedFeature::DebugBench),
    ("use_timerb", InjectedFeature::Msp430UseTimerb),
    ("riotbench_base", InjectedFeature::RiotbenchNoLogOpt),
];

/// Injected features in the order their flags appeared on the command line.
///
/// The feature string is order-sensitive downstream, so argument positions
/// decide emission order, not the flag declaration order.
fn collect_injected(matches: &ArgMatches) -> Vec<InjectedFeature> {
    let mut indexed: Vec<(usize, InjectedFeature)> = Vec::new();
    for (id, feature) in INJECTED_FLAGS {
        if matches.get_flag(id) {
            if let Some(index) = matches.indices_of(id).and_then(|mut indices| indices.next()) {
                indexed.push((index, *feature));
            }
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, feature)| feature).collect()
}

/// Fold CLI values and repo config defaults into the immutable option set.
///
/// A config value applies only where the CLI left the flag at its built-in
/// default.
fn build_options(cli: &Cli, matches: &ArgMatches, config: &RepoConfig) -> BuildOptions {
    let explicit = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

    let board = if explicit("board") {
        cli.board
    } else {
        config.board.unwrap_or(cli.board)
    };
    let bench = if explicit("bench") {
        cli.bench
    } else {
        config.bench.unwrap_or(cli.bench)
    };
    let pf_freq = if explicit("pf_freq") {
        cli.pf_freq
    } else {
        config.pf_freq.unwrap_or(cli.pf_freq)
    };

    BuildOptions {
        dry_run: cli.dry_run,
        debug: cli.debug,
        board,
        bench,
        pf_freq,
        disable_list_opt: cli.disable_list_opt,
        vanilla: cli.vanilla,
        no_os_verbose: cli.no_os_verbose,
        bench_kv_large_tx: cli.bench_kv_large_tx,
        size_opt: cli.size_opt,
        idem: cli.idem,
        base: cli.base,
        sram_base: cli.sram_base,
        run: cli.run,
        timer_daemon: cli.timer_daemon,
        app: cli.app.clone().or_else(|| config.app.clone()),
        injected: collect_injected(matches),
    }
}

/// Initialize the tracing subscriber.
///
/// Log level is controlled by `RUST_LOG`; the default is INFO. Diagnostics
/// go to stderr so stdout stays reserved for the resolved command line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cinder_build=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let repo_config = match RepoConfig::load_optional(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let options = build_options(&cli, &matches, &repo_config);
    tracing::debug!(?options, "resolved option set");

    let invocation = match invocation::resolve(&options) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match invocation.fingerprint() {
        Ok(fingerprint) => tracing::debug!(%fingerprint, "resolved invocation"),
        Err(e) => tracing::debug!("fingerprint unavailable: {}", e),
    }

    if cli.explain {
        match invocation.to_canonical_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Error serializing invocation: {}", e);
                process::exit(1);
            }
        }
    }

    for notice in &invocation.notices {
        eprintln!("{}", notice);
    }
    println!("{}", invocation.render());

    if options.dry_run {
        return;
    }

    match launch::execute(&invocation) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
