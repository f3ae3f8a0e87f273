//! Quick connectivity check for setup debugging.

use log::{error, info};

use super::exec::Adb;
use super::parse;
use super::types::AdbOptions;

/// Runs `adb devices` and reports whether the binary works and at least one
/// device is listed. Diagnostics go through the `log` facade so embedders
/// control where they end up.
pub async fn check_connection(path: Option<&str>) -> bool {
    let mut opts = AdbOptions::default();
    if let Some(path) = path {
        opts.path = path.to_string();
    }
    let mut adb = Adb::with_options(opts);

    info!("testing adb connection");
    let output = match adb.exec("devices", &[]).await {
        Ok(Some(output)) => output,
        Ok(None) => return false,
        Err(err) => {
            error!("adb devices failed: {err}");
            error!("check that adb is installed and in PATH");
            return false;
        }
    };

    let devices = parse::devices(&output);
    if devices.is_empty() {
        error!("no device found or device not authorized");
        info!("connect a device and accept the USB debugging prompt");
        return false;
    }

    info!("adb connection ok, {} device(s) attached", devices.len());
    true
}
