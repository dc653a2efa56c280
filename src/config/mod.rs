//! Configuration: site definitions, config fingerprinting, and loading.

pub mod fingerprint;
pub mod loader;
pub mod types;

pub use fingerprint::{fingerprint, ConfigFingerprint};
pub use loader::{compile_exclude_pattern, load_run_config};
pub use types::{RunConfig, Selectors, SiteConfig};
