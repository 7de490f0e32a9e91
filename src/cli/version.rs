//! Version string for the patchstream binary.

/// The current version of patchstream, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `patchstream <version>`, as printed by `--version`.
pub fn version_line() -> String {
    format!("patchstream {}", VERSION)
}
