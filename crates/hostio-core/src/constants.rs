// Single source of truth for all default values.

// --- Watch ---
pub const DEFAULT_WATCH_RECURSIVE: bool = true;
pub const DEFAULT_WATCH_EVENT_BUFFER: usize = 64;
pub const DEFAULT_WATCH_CONTINUE_ON_ERROR: bool = false;

// --- Server ---
pub const DEFAULT_SERVER_HOSTNAME: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8000;

// --- Process ---
pub const DEFAULT_KILL_SIGNAL: &str = "SIGTERM";

// --- IO ---
pub const DEFAULT_READ_CHUNK_SIZE: usize = 16 * 1024;

// --- Diagnostics ---
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 256;

// --- Tracing ---
pub const LOG_ENV_VAR: &str = "HOSTIO_LOG";
pub const DEFAULT_LOG_FILTER: &str = "hostio=info";

// --- Config files ---
pub const PROJECT_CONFIG_FILENAME: &str = "hostio.toml";
pub const USER_CONFIG_DIRNAME: &str = ".hostio";
pub const USER_CONFIG_FILENAME: &str = "config.toml";
