//! High-level convenience facade over one device.
//!
//! Knows the concrete `adb shell` sub-commands for device info, app
//! control, input simulation, and file transfer, and memoizes the
//! expensive, slowly-changing facts (name, memory, storage, property dump)
//! behind a fixed-TTL cache.

use std::collections::HashMap;
use std::path::Path;

use super::cache::{CacheValue, TtlCache};
use super::device::DeviceAdb;
use super::error::AdbResult;
use super::exec::{LogcatHandle, PushProgress};
use super::parse;
use super::types::{Control, DeviceMemory, StorageInfo};

/// Shell sub-commands the facade templates.
mod cmd {
    pub const DEVICE_NAME: &str = "getprop ro.product.name";
    pub const RESOLUTION: &str = "wm size";
    pub const ANDROID_VERSION: &str = "getprop ro.build.version.release";
    pub const MODEL: &str = "getprop ro.product.model";
    pub const MANUFACTURER: &str = "getprop ro.product.manufacturer";
    pub const BRAND: &str = "getprop ro.product.brand";
    pub const SDK_VERSION: &str = "getprop ro.build.version.sdk";
    pub const DENSITY: &str = "getprop ro.sf.lcd_density";
    pub const LANGUAGE: &str = "getprop persist.sys.language";
    pub const LOCALE: &str = "getprop persist.sys.locale";
    pub const ALL_PROPS: &str = "getprop";
    pub const MEMORY: &str = "cat /proc/meminfo";
    pub const STORAGE: &str = "df /data";
    pub const DISABLE_LAUNCHER: &str = "pm disable com.android.launcher3";
    pub const ENABLE_LAUNCHER: &str = "pm enable com.android.launcher3";
    pub const ENABLE_SYSTEM_UI: &str = "pm enable com.android.systemui";
    pub const DISABLE_SYSTEM_UI: &str = "pm disable com.android.systemui";
    pub const SCREEN_STATE: &str = r#"dumpsys power | grep "Display Power" | grep -oE "(ON|OFF)""#;
    pub const TOGGLE_SCREEN: &str = "input keyevent 26";
    pub const SET_HOME_APP: &str = "cmd package set-home-activity";
}

/// Convenience client for one attached device.
///
/// Obtained from [`Adb::devices`](super::Adb::devices) or
/// [`Adb::device`](super::Adb::device), or built directly from a
/// [`DeviceAdb`]. Methods that fetch slowly-changing facts cache their
/// result for five minutes; everything else goes straight to the device.
#[derive(Debug)]
pub struct DeviceClient {
    device: DeviceAdb,
    id: String,
    cache: TtlCache,
}

impl DeviceClient {
    pub fn new(device: DeviceAdb) -> Self {
        let id = device.serial().to_string();
        DeviceClient {
            device,
            id,
            cache: TtlCache::new(),
        }
    }

    /// The serial this client is scoped to.
    pub fn device_id(&self) -> &str {
        &self.id
    }

    /// The underlying per-device command layer, for verbs the facade does
    /// not template.
    pub fn device(&mut self) -> &mut DeviceAdb {
        &mut self.device
    }

    /// Product name, cached.
    pub async fn name(&mut self) -> AdbResult<Option<String>> {
        if let Some(CacheValue::Text(name)) = self.cache.get("name") {
            return Ok(Some(name.clone()));
        }
        let result = self.device.shell(cmd::DEVICE_NAME).await?;
        if let Some(name) = &result {
            self.cache.set("name", CacheValue::Text(name.clone()));
        }
        Ok(result)
    }

    /// Memory snapshot from `/proc/meminfo`, cached. `None` when the device
    /// returned no output at all; fields the device omits read as zero.
    pub async fn memory(&mut self) -> AdbResult<Option<DeviceMemory>> {
        if let Some(CacheValue::Memory(memory)) = self.cache.get("memory") {
            return Ok(Some(memory.clone()));
        }
        let Some(raw) = self.device.shell(cmd::MEMORY).await? else {
            return Ok(None);
        };
        let memory = parse::meminfo(&raw);
        self.cache.set("memory", CacheValue::Memory(memory.clone()));
        Ok(Some(memory))
    }

    /// Mounted-filesystem table from `df /data`, cached. `None` when the
    /// device returned no output at all.
    pub async fn storage(&mut self) -> AdbResult<Option<Vec<StorageInfo>>> {
        if let Some(CacheValue::Storage(storage)) = self.cache.get("storage") {
            return Ok(Some(storage.clone()));
        }
        let Some(raw) = self.device.shell(cmd::STORAGE).await? else {
            return Ok(None);
        };
        let storage = parse::df(&raw);
        self.cache.set("storage", CacheValue::Storage(storage.clone()));
        Ok(Some(storage))
    }

    /// The raw `getprop` dump, cached.
    pub async fn all_props(&mut self) -> AdbResult<Option<String>> {
        if let Some(CacheValue::Text(props)) = self.cache.get("props") {
            return Ok(Some(props.clone()));
        }
        let result = self.device.shell(cmd::ALL_PROPS).await?;
        if let Some(props) = &result {
            self.cache.set("props", CacheValue::Text(props.clone()));
        }
        Ok(result)
    }

    /// Selected properties out of the (cached) `getprop` dump. Properties
    /// the device does not report map to empty strings.
    pub async fn props(&mut self, names: &[&str]) -> AdbResult<Option<HashMap<String, String>>> {
        let Some(dump) = self.all_props().await? else {
            return Ok(None);
        };
        Ok(Some(
            names
                .iter()
                .map(|name| (name.to_string(), parse::property(&dump, name)))
                .collect(),
        ))
    }

    pub async fn device_name(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::DEVICE_NAME).await
    }

    pub async fn android_version(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::ANDROID_VERSION).await
    }

    /// `ON` or `OFF`, extracted on-device from the power service dump.
    pub async fn screen_state(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::SCREEN_STATE).await
    }

    pub async fn screen_resolution(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::RESOLUTION).await
    }

    pub async fn manufacturer(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::MANUFACTURER).await
    }

    pub async fn brand(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::BRAND).await
    }

    pub async fn sdk_version(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::SDK_VERSION).await
    }

    pub async fn screen_density(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::DENSITY).await
    }

    pub async fn system_language(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::LANGUAGE).await
    }

    pub async fn locale(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::LOCALE).await
    }

    pub async fn model(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::MODEL).await
    }

    pub async fn disable_launcher(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::DISABLE_LAUNCHER).await
    }

    pub async fn enable_launcher(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::ENABLE_LAUNCHER).await
    }

    pub async fn enable_system_ui(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::ENABLE_SYSTEM_UI).await
    }

    pub async fn disable_system_ui(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::DISABLE_SYSTEM_UI).await
    }

    /// Sets the default home activity (launcher) by package name.
    pub async fn set_home_app(&mut self, app: &str) -> AdbResult<Option<String>> {
        self.device
            .shell(&format!("{} {app}", cmd::SET_HOME_APP))
            .await
    }

    pub async fn clear_app_cache(&mut self, app: &str) -> AdbResult<Option<String>> {
        self.device.shell(&format!("pm clear {app}")).await
    }

    /// Presses KEYCODE_POWER, flipping the screen on or off.
    pub async fn toggle_screen(&mut self) -> AdbResult<Option<String>> {
        self.device.shell(cmd::TOGGLE_SCREEN).await
    }

    /// Simulates a tap, swipe, text entry, or key press.
    pub async fn control(&mut self, action: Control) -> AdbResult<()> {
        self.device.shell(&control_command(&action)).await?;
        Ok(())
    }

    /// Lists directory entries at `path` (device root when `None`). An
    /// empty listing or a swallowed failure yields an empty vec.
    pub async fn ls(&mut self, path: Option<&str>) -> AdbResult<Vec<String>> {
        let listing = self
            .device
            .shell(&format!("ls {}", path.unwrap_or("/")))
            .await?;
        Ok(listing
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default())
    }

    pub async fn reboot(&mut self) -> AdbResult<()> {
        self.device.reboot().await
    }

    pub async fn uninstall(&mut self, package: &str) -> AdbResult<()> {
        self.device.uninstall(package).await
    }

    /// Pushes a local file to the device, reporting a running byte count to
    /// `progress`. True when the transfer produced output (i.e. completed).
    pub async fn push(
        &mut self,
        local: impl AsRef<Path>,
        remote_path: &str,
        progress: Option<PushProgress<'_>>,
    ) -> AdbResult<bool> {
        let output = self.device.push(local, remote_path, progress).await?;
        Ok(!output.is_empty())
    }

    pub async fn pull(&mut self, path: &str, to: &str) -> AdbResult<()> {
        self.device.pull(path, to).await
    }

    pub fn logcat<F>(&self, on_log: F) -> AdbResult<LogcatHandle>
    where
        F: FnMut(String) + Send + 'static,
    {
        self.device.logcat(on_log)
    }

    /// Stores a shared-preference value in an app that listens for the
    /// `<app>.sp.*` broadcast convention.
    pub async fn put_shared_config(
        &mut self,
        app: &str,
        key: &str,
        value: &str,
        restart: bool,
    ) -> AdbResult<()> {
        self.device
            .shell(&shared_pref_command(app, "PUT", Some(key), Some(value), restart))
            .await?;
        Ok(())
    }

    pub async fn remove_shared_config(
        &mut self,
        app: &str,
        key: &str,
        value: &str,
        restart: bool,
    ) -> AdbResult<()> {
        self.device
            .shell(&shared_pref_command(app, "CLEAR", Some(key), Some(value), restart))
            .await?;
        Ok(())
    }

    pub async fn get_shared_config(&mut self, app: &str, key: &str) -> AdbResult<Option<String>> {
        self.device
            .shell(&shared_pref_command(app, "GET", Some(key), None, false))
            .await
    }

    pub async fn get_all_shared_config(&mut self, app: &str) -> AdbResult<Option<String>> {
        self.device
            .shell(&shared_pref_command(app, "GETALL", None, None, false))
            .await
    }

    pub async fn clear_all_shared_config(&mut self, app: &str) -> AdbResult<Option<String>> {
        self.device
            .shell(&shared_pref_command(app, "CLEARALL", None, None, false))
            .await
    }
}

fn control_command(action: &Control) -> String {
    match action {
        Control::Tap {
            x,
            y,
            scale_x,
            scale_y,
        } => format!(
            "input tap {} {}",
            (x * scale_x).round() as i64,
            (y * scale_y).round() as i64
        ),
        Control::Swipe {
            x,
            y,
            x2,
            y2,
            scale_x,
            scale_y,
            duration_ms,
        } => {
            let mut command = format!(
                "input swipe {} {} {} {}",
                (x * scale_x).round() as i64,
                (y * scale_y).round() as i64,
                (x2 * scale_x).round() as i64,
                (y2 * scale_y).round() as i64
            );
            if let Some(duration) = duration_ms {
                command.push_str(&format!(" {duration}"));
            }
            command
        }
        Control::Text { text } => format!("input text '{text}'"),
        Control::Key { keycode } => format!("input keyevent {keycode}"),
    }
}

fn shared_pref_command(
    app: &str,
    action: &str,
    key: Option<&str>,
    value: Option<&str>,
    restart: bool,
) -> String {
    let mut command = format!("am broadcast -a {app}.sp.{action}");
    if let Some(key) = key {
        command.push_str(&format!(" --es key {key}"));
    }
    if let Some(value) = value {
        command.push_str(&format!(" --es value \"{value}\""));
    }
    if restart {
        command.push_str(" --ez restart true");
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::types::AdbOptions;

    fn client() -> DeviceClient {
        DeviceClient::new(DeviceAdb::new("test-serial", AdbOptions::default()))
    }

    #[test]
    fn tap_command_scales_and_rounds() {
        let command = control_command(&Control::Tap {
            x: 100.0,
            y: 200.4,
            scale_x: 1.5,
            scale_y: 1.0,
        });
        assert_eq!(command, "input tap 150 200");
    }

    #[test]
    fn swipe_command_without_duration() {
        let command = control_command(&Control::Swipe {
            x: 10.0,
            y: 20.0,
            x2: 30.0,
            y2: 40.0,
            scale_x: 1.0,
            scale_y: 1.0,
            duration_ms: None,
        });
        assert_eq!(command, "input swipe 10 20 30 40");
    }

    #[test]
    fn swipe_command_with_duration() {
        let command = control_command(&Control::Swipe {
            x: 10.0,
            y: 20.0,
            x2: 30.0,
            y2: 40.0,
            scale_x: 1.0,
            scale_y: 1.0,
            duration_ms: Some(300),
        });
        assert_eq!(command, "input swipe 10 20 30 40 300");
    }

    #[test]
    fn text_command_is_quoted() {
        let command = control_command(&Control::Text {
            text: "hello world".to_string(),
        });
        assert_eq!(command, "input text 'hello world'");
    }

    #[test]
    fn key_command() {
        let command = control_command(&Control::Key { keycode: 4 });
        assert_eq!(command, "input keyevent 4");
    }

    #[test]
    fn shared_pref_put_command() {
        let command = shared_pref_command("com.example", "PUT", Some("theme"), Some("dark"), false);
        assert_eq!(
            command,
            "am broadcast -a com.example.sp.PUT --es key theme --es value \"dark\""
        );
    }

    #[test]
    fn shared_pref_put_with_restart() {
        let command = shared_pref_command("com.example", "PUT", Some("theme"), Some("dark"), true);
        assert!(command.ends_with(" --ez restart true"));
    }

    #[test]
    fn shared_pref_clear_all_command() {
        let command = shared_pref_command("com.example", "CLEARALL", None, None, false);
        assert_eq!(command, "am broadcast -a com.example.sp.CLEARALL");
    }

    #[tokio::test]
    async fn cached_name_short_circuits_the_device() {
        // The binary path points at plain "adb" which is never spawned: a
        // warm cache entry must be served without any process launch.
        let mut client = client();
        client
            .cache
            .set("name", CacheValue::Text("walleye\n".to_string()));
        let name = client.name().await.expect("cache hit cannot fail");
        assert_eq!(name.as_deref(), Some("walleye\n"));
    }

    #[tokio::test]
    async fn cached_memory_short_circuits_the_device() {
        let mut client = client();
        let snapshot = DeviceMemory {
            total_memory: 2048000,
            mem_free: 512000,
            mem_used: 1536000,
        };
        client
            .cache
            .set("memory", CacheValue::Memory(snapshot.clone()));
        let memory = client.memory().await.expect("cache hit cannot fail");
        assert_eq!(memory, Some(snapshot));
    }

    #[test]
    fn device_id_is_the_serial() {
        assert_eq!(client().device_id(), "test-serial");
    }
}
