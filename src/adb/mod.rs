// ADB module - client for the Android Debug Bridge command-line tool.
// Spawns `adb` subprocesses and parses their text output; the wire
// protocol, authentication, and transports all live inside the external
// binary and are never reimplemented here.

pub mod cache;
pub mod client;
pub mod device;
pub mod doctor;
pub mod error;
pub mod exec;
pub mod parse;
pub mod types;


// Re-export the main types and functions for easy access
pub use cache::{CacheValue, TtlCache, DEFAULT_TTL};
pub use client::DeviceClient;
pub use device::DeviceAdb;
pub use error::{AdbError, AdbResult};
pub use exec::{Adb, LogcatHandle, PushProgress};
pub use types::{AdbOptions, Control, Device, DeviceMemory, StorageInfo, DEFAULT_TIMEOUT};
