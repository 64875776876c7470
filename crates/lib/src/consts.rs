//! Crate-wide constants.

/// Application name, used for default file names and log targets.
pub const APP_NAME: &str = "atomcss";

/// Manifest schema version. Bump whenever the serialized layout changes;
/// manifests written with any other version are discarded on load.
pub const MANIFEST_VERSION: u32 = 1;

/// Default manifest location, relative to the working directory.
pub const DEFAULT_MANIFEST_PATH: &str = "_build/atomcss/manifest.json";

/// Default stylesheet location, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "priv/static/assets/atomcss.css";

/// Default config file name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "atomcss.toml";

/// Environment variable overriding the manifest path.
pub const MANIFEST_ENV: &str = "ATOMCSS_MANIFEST";

/// Environment variable overriding the stylesheet output path.
pub const OUTPUT_ENV: &str = "ATOMCSS_OUTPUT";

/// Default prefix for every generated identifier.
pub const DEFAULT_CLASS_PREFIX: &str = "x";

/// Seed for the identifier hash.
pub const HASH_SEED: u32 = 1;

/// Modifier token hashed when a rule has neither pseudos nor at-rules.
pub const NULL_MODIFIER: &str = "null";

/// Selector prefix scoping RTL overrides.
pub const RTL_SCOPE: &str = "html[dir=\"rtl\"]";

/// Suffix appended to RTL keyframe names.
pub const RTL_KEYFRAMES_SUFFIX: &str = "-rtl";

/// Default lock retry interval in milliseconds.
pub const DEFAULT_LOCK_RETRY_MS: u64 = 10;

/// Default lock acquisition timeout in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// Locks older than this (milliseconds) are assumed abandoned.
pub const DEFAULT_LOCK_STALE_MS: u64 = 60_000;
