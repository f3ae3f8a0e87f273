// Shared option and value types for the ADB client.
use std::time::Duration;

use serde::Serialize;

/// Default per-call timeout for spawned `adb` processes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Construction options for [`Adb`](super::Adb).
#[derive(Debug, Clone)]
pub struct AdbOptions {
    /// Path to the `adb` binary.
    pub path: String,
    /// ADB server host, passed as `-H`.
    pub host: Option<String>,
    /// ADB server port, passed as `-P`.
    pub port: Option<u16>,
    /// How long a single call may run before it is abandoned.
    pub timeout: Duration,
}

impl Default for AdbOptions {
    fn default() -> Self {
        AdbOptions {
            path: "adb".to_string(),
            host: None,
            port: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Per-call output toggles. `exec` consumes and resets them, so
/// `verbose()`/`no_throw()` only affect the next call.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub verbose: bool,
    pub no_throw: bool,
}

/// One row of `adb devices` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub serial: String,
    /// Free-form remainder of the row (product, model, ...), may be empty.
    pub description: String,
}

/// Snapshot of `/proc/meminfo`, all values in kB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceMemory {
    pub total_memory: u64,
    pub mem_free: u64,
    pub mem_used: u64,
}

/// One data row of a `df` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub k_blocks: String,
    pub used: u64,
    pub available: u64,
    pub use_percentage: String,
    pub mounted_on: String,
}

/// Input simulation actions for [`DeviceClient::control`](super::DeviceClient::control).
///
/// Tap and swipe coordinates are multiplied by their scale factors before
/// being sent, so callers can work in a scaled coordinate space (a preview
/// image, for example) and let the client map back to device pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Tap {
        x: f64,
        y: f64,
        scale_x: f64,
        scale_y: f64,
    },
    Swipe {
        x: f64,
        y: f64,
        x2: f64,
        y2: f64,
        scale_x: f64,
        scale_y: f64,
        duration_ms: Option<u32>,
    },
    Text {
        text: String,
    },
    Key {
        keycode: u32,
    },
}
