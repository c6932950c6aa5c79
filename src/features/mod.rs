//! Feature composition for kernel builds.
//!
//! Turns an option set into the ordered feature-token list handed to cargo.
//! Tokens are appended in a fixed rule order and the set never holds
//! duplicates, so identical option sets always render the same feature
//! string.

use serde::Serialize;

use crate::options::{Bench, Board, BuildOptions};

/// Inject power failures at a regular interval.
pub const POWER_FAILURE: &str = "power_failure";
/// Transaction profiling.
pub const PROFILE_TX: &str = "profile_tx";
/// Undo log profiling.
pub const PROFILE_LOG: &str = "profile_log";
/// Debug tracing for power failure injection.
pub const DEBUG_POWER_FAILURE: &str = "debug_power_failure";
/// Debug tracing for benchmark applications.
pub const DEBUG_BENCH: &str = "debug_bench";
/// Use timer B on the msp430fr5994 board.
pub const MSP430_USE_TIMERB: &str = "msp430_use_timerb";
/// Drop the log optimization in the RIOT benchmark suite.
pub const RIOTBENCH_NO_LOG_OPT: &str = "riotbench_no_log_opt";

/// Undo logging and the rest of the kernel's crash safety mechanisms.
pub const CRASH_SAFE: &str = "crash_safe";
/// List optimization; only sound on top of `crash_safe`.
pub const OPT_LIST: &str = "opt_list";
/// Smaller transaction size in the KV benchmark.
pub const BENCH_KV_SMALLER_TX_SZ: &str = "bench_kv_smaller_tx_sz";
/// Loop-end optimization for transactional sections.
pub const OPT_LOOP_END: &str = "opt_loop_end";
/// Transaction cache space optimization.
pub const OPT_TX_CACHE_SPACE: &str = "opt_tx_cache_space";
/// Resource allocation messages from the kernel.
pub const VERBOSE_OS_INFO: &str = "verbose_os_info";

/// An ordered, duplicate-free collection of feature tokens.
///
/// Cargo accepts the tokens as one space-joined string, and the kernel's
/// build logs are compared across runs, so emission order matters as much
/// as membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSet {
    tokens: Vec<&'static str>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token unless it is already present. Returns whether the set
    /// changed.
    pub fn insert(&mut self, token: &'static str) -> bool {
        if self.contains(token) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| *t == token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens in emission order.
    pub fn tokens(&self) -> &[&'static str] {
        &self.tokens
    }

    /// The space-joined string cargo receives after `--features`.
    pub fn join(&self) -> String {
        self.tokens.join(" ")
    }
}

/// A board/benchmark-specific substitution for the cache and loop
/// optimizations normally enabled alongside `crash_safe`.
///
/// Exceptions are matched after the injected and derived tokens are in the
/// set; `requires` refers to a token that must already be present. New
/// exceptions are added here, not as inline conditionals.
struct CacheOptException {
    bench: Bench,
    board: Board,
    requires: &'static str,
    substitute: &'static [&'static str],
    notice: &'static str,
}

/// Optimizations enabled with `crash_safe` when no exception matches.
const DEFAULT_CACHE_OPTS: &[&str] = &[OPT_LOOP_END, OPT_TX_CACHE_SPACE];

/// Fault injection in the train benchmark overruns the transaction cache on
/// apollo4bp, so that combination builds without `opt_tx_cache_space`.
const CACHE_OPT_EXCEPTIONS: &[CacheOptException] = &[CacheOptException {
    bench: Bench::Train,
    board: Board::Apollo4bp,
    requires: POWER_FAILURE,
    substitute: &[OPT_LOOP_END],
    notice: "removed feature opt_tx_cache_space",
}];

/// Errors during feature composition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    /// The list optimization depends on the undo log that `crash_safe`
    /// provides; a vanilla build must disable it explicitly.
    #[error(
        "feature `opt_list` requires `crash_safe`; pass --disable-list-opt together with --vanilla"
    )]
    ListOptWithoutCrashSafety,
}

/// The composed feature set plus any policy notices raised while composing.
///
/// Notices are surfaced to the user by the caller; they never affect the
/// success of composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub features: FeatureSet,
    pub notices: Vec<&'static str>,
}

/// Compose the feature token list for an option set.
///
/// Rules apply in a fixed order: injected features first (command-line
/// order), then the crash-safety and optimization defaults, then the
/// cache/loop optimizations gated on `crash_safe`, then verbosity. The one
/// consistency requirement, `opt_list` only on top of `crash_safe`, is a
/// fatal error rather than a warning.
pub fn compose(opts: &BuildOptions) -> Result<Composition, ComposeError> {
    let mut features = FeatureSet::new();
    let mut notices = Vec::new();

    for injected in &opts.injected {
        features.insert(injected.token());
    }

    if !opts.vanilla {
        features.insert(CRASH_SAFE);
    }

    if !opts.disable_list_opt {
        features.insert(OPT_LIST);
    }

    if !opts.bench_kv_large_tx {
        features.insert(BENCH_KV_SMALLER_TX_SZ);
    }

    if features.contains(CRASH_SAFE) {
        let exception = CACHE_OPT_EXCEPTIONS.iter().find(|e| {
            e.bench == opts.bench && e.board == opts.board && features.contains(e.requires)
        });
        match exception {
            Some(exception) => {
                for token in exception.substitute {
                    features.insert(token);
                }
                notices.push(exception.notice);
                tracing::debug!(
                    bench = %opts.bench,
                    board = %opts.board,
                    "cache optimization exception matched"
                );
            }
            None => {
                for token in DEFAULT_CACHE_OPTS {
                    features.insert(token);
                }
            }
        }
    }

    if !features.contains(CRASH_SAFE) && features.contains(OPT_LIST) {
        return Err(ComposeError::ListOptWithoutCrashSafety);
    }

    if !opts.no_os_verbose {
        features.insert(VERBOSE_OS_INFO);
    }

    tracing::debug!(count = features.len(), "composed feature set");

    Ok(Composition { features, notices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::InjectedFeature;

    #[test]
    fn test_feature_set_insert_dedup() {
        let mut set = FeatureSet::new();
        assert!(set.insert(CRASH_SAFE));
        assert!(set.insert(OPT_LIST));
        assert!(!set.insert(CRASH_SAFE));
        assert_eq!(set.tokens(), &[CRASH_SAFE, OPT_LIST]);
        assert_eq!(set.join(), "crash_safe opt_list");
    }

    #[test]
    fn test_feature_set_membership_is_exact() {
        let mut set = FeatureSet::new();
        set.insert(OPT_LIST);
        // "opt" is a prefix of an inserted token, not a member.
        assert!(!set.contains("opt"));
        assert!(set.contains("opt_list"));
    }

    #[test]
    fn test_compose_defaults() {
        let composition = compose(&BuildOptions::default()).unwrap();
        assert_eq!(
            composition.features.tokens(),
            &[
                CRASH_SAFE,
                OPT_LIST,
                BENCH_KV_SMALLER_TX_SZ,
                OPT_LOOP_END,
                OPT_TX_CACHE_SPACE,
                VERBOSE_OS_INFO,
            ]
        );
        assert!(composition.notices.is_empty());
    }

    #[test]
    fn test_compose_injected_first_in_given_order() {
        let opts = BuildOptions {
            injected: vec![
                InjectedFeature::ProfileLog,
                InjectedFeature::PowerFailure,
                InjectedFeature::DebugBench,
            ],
            ..Default::default()
        };
        let composition = compose(&opts).unwrap();
        assert_eq!(
            &composition.features.tokens()[..3],
            &[PROFILE_LOG, POWER_FAILURE, DEBUG_BENCH]
        );
    }

    #[test]
    fn test_compose_vanilla_requires_disable_list_opt() {
        let opts = BuildOptions {
            vanilla: true,
            ..Default::default()
        };
        assert_eq!(
            compose(&opts),
            Err(ComposeError::ListOptWithoutCrashSafety)
        );
    }

    #[test]
    fn test_compose_vanilla_with_list_opt_disabled() {
        let opts = BuildOptions {
            vanilla: true,
            disable_list_opt: true,
            ..Default::default()
        };
        let composition = compose(&opts).unwrap();
        assert!(!composition.features.contains(CRASH_SAFE));
        assert!(!composition.features.contains(OPT_LIST));
        assert!(!composition.features.contains(OPT_LOOP_END));
        assert!(!composition.features.contains(OPT_TX_CACHE_SPACE));
        assert!(composition.features.contains(BENCH_KV_SMALLER_TX_SZ));
        assert!(composition.features.contains(VERBOSE_OS_INFO));
    }

    #[test]
    fn test_compose_cache_opt_exception() {
        let opts = BuildOptions {
            bench: Bench::Train,
            board: Board::Apollo4bp,
            injected: vec![InjectedFeature::PowerFailure],
            ..Default::default()
        };
        let composition = compose(&opts).unwrap();
        assert!(composition.features.contains(OPT_LOOP_END));
        assert!(!composition.features.contains(OPT_TX_CACHE_SPACE));
        assert_eq!(composition.notices, vec!["removed feature opt_tx_cache_space"]);
    }

    #[test]
    fn test_compose_exception_needs_all_three_conditions() {
        // Same bench and injection on a different board: default pair.
        let on_msp430 = BuildOptions {
            bench: Bench::Train,
            board: Board::Msp430fr5994,
            injected: vec![InjectedFeature::PowerFailure],
            ..Default::default()
        };
        let composition = compose(&on_msp430).unwrap();
        assert!(composition.features.contains(OPT_TX_CACHE_SPACE));
        assert!(composition.notices.is_empty());

        // Same bench and board without the injection: default pair.
        let no_injection = BuildOptions {
            bench: Bench::Train,
            board: Board::Apollo4bp,
            ..Default::default()
        };
        let composition = compose(&no_injection).unwrap();
        assert!(composition.features.contains(OPT_TX_CACHE_SPACE));
        assert!(composition.notices.is_empty());
    }

    #[test]
    fn test_compose_no_os_verbose() {
        let opts = BuildOptions {
            no_os_verbose: true,
            ..Default::default()
        };
        let composition = compose(&opts).unwrap();
        assert!(!composition.features.contains(VERBOSE_OS_INFO));
    }

    #[test]
    fn test_compose_large_tx_drops_smaller_tx_token() {
        let opts = BuildOptions {
            bench_kv_large_tx: true,
            ..Default::default()
        };
        let composition = compose(&opts).unwrap();
        assert!(!composition.features.contains(BENCH_KV_SMALLER_TX_SZ));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let opts = BuildOptions {
            bench: Bench::Train,
            board: Board::Apollo4bp,
            injected: vec![InjectedFeature::PowerFailure, InjectedFeature::ProfileTx],
            ..Default::default()
        };
        assert_eq!(compose(&opts).unwrap(), compose(&opts).unwrap());
    }
}
