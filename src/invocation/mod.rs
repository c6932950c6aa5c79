//! Invocation assembly for the resolved build.
//!
//! Combines the composed feature set, the environment entries, and the
//! target triple into the final cargo command. The result is a value:
//! rendering and execution are separate, later steps, and resolving the
//! same option set twice yields byte-identical output.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::envs::{self, EnvEntry};
use crate::features::{self, ComposeError, FeatureSet};
use crate::options::BuildOptions;
use crate::target;

/// Cargo subcommand selected for the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Build,
    Run,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Build => "build",
            Mode::Run => "run",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compilation profile. Exactly one is in effect per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    Debug,
    Release,
    ReleaseOptSize,
}

impl Profile {
    /// The cargo flag selecting this profile. Debug builds use cargo's
    /// default profile and need no flag.
    pub fn cargo_flag(self) -> Option<&'static str> {
        match self {
            Profile::Debug => None,
            Profile::Release => Some("--release"),
            Profile::ReleaseOptSize => Some("--profile=release-opt-size"),
        }
    }
}

/// Errors while rendering an invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// Canonical JSON serialization failed.
    #[error("canonical JSON error: {0}")]
    Json(String),
}

/// A fully resolved build: everything needed to print and spawn the cargo
/// command, and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInvocation {
    /// Cargo subcommand (`build` or `run`).
    pub mode: Mode,

    /// Compiler target triple.
    pub target: &'static str,

    /// Whether `core` is built from source (`-Z build-std=core`).
    pub build_std: bool,

    /// Selected compilation profile.
    pub profile: Profile,

    /// Ordered environment entries for the child process.
    pub envs: Vec<EnvEntry>,

    /// Ordered feature tokens.
    pub features: FeatureSet,

    /// Policy notices raised during composition, for the user's eyes only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<&'static str>,
}

/// Resolve an option set into a build invocation.
///
/// Pure: nothing is printed or spawned here, and notices are carried in the
/// result rather than emitted. The single fatal case is the feature
/// consistency guard.
pub fn resolve(opts: &BuildOptions) -> Result<BuildInvocation, ComposeError> {
    let composition = features::compose(opts)?;

    let profile = if opts.debug {
        Profile::Debug
    } else if opts.size_opt {
        Profile::ReleaseOptSize
    } else {
        Profile::Release
    };

    Ok(BuildInvocation {
        mode: if opts.run { Mode::Run } else { Mode::Build },
        target: target::triple_for(opts.board),
        build_std: opts.idem || target::needs_build_std(opts.board),
        profile,
        envs: envs::assemble(opts),
        features: composition.features,
        notices: composition.notices,
    })
}

impl BuildInvocation {
    /// The argument vector passed to `cargo`, excluding environment entries.
    ///
    /// The feature string is a single argument here; quoting only exists in
    /// the rendered line.
    pub fn cargo_args(&self) -> Vec<String> {
        let mut args = vec![self.mode.as_str().to_string()];
        if self.build_std {
            args.push("-Z".to_string());
            args.push("build-std=core".to_string());
        }
        args.push("--target".to_string());
        args.push(self.target.to_string());
        if let Some(flag) = self.profile.cargo_flag() {
            args.push(flag.to_string());
        }
        args.push("--no-default-features".to_string());
        if !self.features.is_empty() {
            args.push("--features".to_string());
            args.push(self.features.join());
        }
        args
    }

    /// The single space-joined command line, printed before any execution.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self.envs.iter().map(EnvEntry::render).collect();
        parts.push("cargo".to_string());
        parts.push(self.mode.as_str().to_string());
        if self.build_std {
            parts.push("-Z".to_string());
            parts.push("build-std=core".to_string());
        }
        parts.push("--target".to_string());
        parts.push(self.target.to_string());
        if let Some(flag) = self.profile.cargo_flag() {
            parts.push(flag.to_string());
        }
        parts.push("--no-default-features".to_string());
        if !self.features.is_empty() {
            parts.push("--features".to_string());
            parts.push(format!("\"{}\"", self.features.join()));
        }
        parts.join(" ")
    }

    /// Serialize to canonical JSON (RFC 8785), the `--explain` output form.
    pub fn to_canonical_json(&self) -> Result<String, InvocationError> {
        let bytes = serde_json_canonicalizer::to_vec(self)
            .map_err(|e| InvocationError::Json(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| InvocationError::Json(e.to_string()))
    }

    /// SHA-256 hex digest of the canonical JSON form.
    ///
    /// Two option sets resolve to the same fingerprint exactly when they
    /// produce the same invocation.
    pub fn fingerprint(&self) -> Result<String, InvocationError> {
        let bytes = serde_json_canonicalizer::to_vec(self)
            .map_err(|e| InvocationError::Json(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
