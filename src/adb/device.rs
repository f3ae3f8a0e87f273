//! Per-device decorator over [`Adb`]: the same verbs, with every invocation
//! prefixed by `-s <serial>` so it addresses exactly one device.

use std::path::Path;

use super::error::AdbResult;
use super::exec::{Adb, LogcatHandle, PushProgress};
use super::types::AdbOptions;

/// An [`Adb`] client scoped to a single device serial.
#[derive(Debug, Clone)]
pub struct DeviceAdb {
    adb: Adb,
    serial: String,
}

impl DeviceAdb {
    pub fn new(serial: &str, opts: AdbOptions) -> Self {
        DeviceAdb {
            adb: Adb::scoped_to(serial, opts),
            serial: serial.to_string(),
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn verbose(&mut self) -> &mut Self {
        self.adb.verbose();
        self
    }

    pub fn no_throw(&mut self) -> &mut Self {
        self.adb.no_throw();
        self
    }

    pub async fn exec(&mut self, verb: &str, args: &[&str]) -> AdbResult<Option<String>> {
        self.adb.exec(verb, args).await
    }

    pub async fn shell(&mut self, command: &str) -> AdbResult<Option<String>> {
        self.adb.shell(command).await
    }

    pub async fn push(
        &mut self,
        local: impl AsRef<Path>,
        remote_path: &str,
        progress: Option<PushProgress<'_>>,
    ) -> AdbResult<String> {
        self.adb.push(local, remote_path, progress).await
    }

    pub async fn pull(&mut self, path: &str, to: &str) -> AdbResult<()> {
        self.adb.pull(path, to).await
    }

    pub async fn reboot(&mut self) -> AdbResult<()> {
        self.adb.reboot().await
    }

    pub async fn uninstall(&mut self, package: &str) -> AdbResult<()> {
        self.adb.uninstall(package).await
    }

    pub fn logcat<F>(&self, on_log: F) -> AdbResult<LogcatHandle>
    where
        F: FnMut(String) + Send + 'static,
    {
        self.adb.logcat(on_log)
    }

    /// Drops this device from the adb server's TCP device list.
    pub async fn disconnect(&mut self) -> AdbResult<bool> {
        let serial = self.serial.clone();
        let output = self.adb.exec("disconnect", &[&serial]).await?;
        Ok(matches!(output, Some(ref text) if !text.is_empty()))
    }
}
