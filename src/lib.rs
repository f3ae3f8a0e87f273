//! Thin async client around the Android Debug Bridge command-line tool.
//!
//! Three layers, thinnest first:
//! - [`Adb`]: spawns one `adb` process per call and resolves its output,
//!   raced against a timeout.
//! - [`DeviceAdb`]: the same verbs scoped to one device serial.
//! - [`DeviceClient`]: templated `adb shell` sub-commands for device info,
//!   app control, input simulation, and file transfer, with a fixed-TTL
//!   cache for slowly-changing device facts.

pub mod adb;

pub use adb::doctor::check_connection;
pub use adb::parse::property as parse_property;
pub use adb::{
    Adb, AdbError, AdbOptions, AdbResult, Control, Device, DeviceAdb, DeviceClient, DeviceMemory,
    LogcatHandle, PushProgress, StorageInfo, TtlCache,
};
