//! Process-execution wrapper around the `adb` binary.
//!
//! Every call builds an argument list, spawns one `adb` process, and awaits
//! its natural exit raced against a timer. There is no protocol handling
//! here at all; the binary owns the wire format, authentication, and
//! transports, and this layer only moves text in and out of it.

use std::mem;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::client::DeviceClient;
use super::device::DeviceAdb;
use super::error::{AdbError, AdbResult};
use super::parse;
use super::types::{AdbOptions, Device, OutputOptions};

/// Chunk size for streaming a local file into the child's stdin.
const PUSH_CHUNK: usize = 8 * 1024;

/// Byte-count progress callback for pushes: bytes transferred so far, and
/// the total if it is known up front.
pub type PushProgress<'a> = &'a mut (dyn FnMut(u64, Option<u64>) + Send);

/// Client for the `adb` command-line tool.
///
/// Each method spawns one subprocess and resolves with its captured output.
/// [`verbose`](Adb::verbose) and [`no_throw`](Adb::no_throw) are one-shot
/// toggles that apply to the next call only:
///
/// ```no_run
/// # async fn demo() -> android_adb_client::AdbResult<()> {
/// let mut adb = android_adb_client::Adb::new();
/// let dump = adb.no_throw().shell("getprop").await?; // None on failure
/// # let _ = dump; Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Adb {
    path: String,
    host: Option<String>,
    port: Option<u16>,
    serial: Option<String>,
    timeout: Duration,
    output: OutputOptions,
}

impl Adb {
    pub fn new() -> Self {
        Self::with_options(AdbOptions::default())
    }

    pub fn with_options(opts: AdbOptions) -> Self {
        Adb {
            path: opts.path,
            host: opts.host,
            port: opts.port,
            serial: None,
            timeout: opts.timeout,
            output: OutputOptions::default(),
        }
    }

    /// A client whose every invocation is scoped to one device serial.
    pub(crate) fn scoped_to(serial: &str, opts: AdbOptions) -> Self {
        let mut adb = Self::with_options(opts);
        adb.serial = Some(serial.to_string());
        adb
    }

    /// Log the next call's command line and output at info level instead of
    /// debug. Resets after that call.
    pub fn verbose(&mut self) -> &mut Self {
        self.output.verbose = true;
        self
    }

    /// Turn the next call's failure into an `Ok(None)` instead of an error.
    /// Resets after that call.
    pub fn no_throw(&mut self) -> &mut Self {
        self.output.no_throw = true;
        self
    }

    /// The construction options this client was built from, for deriving
    /// per-device clients that share the same binary and timeout.
    pub fn options(&self) -> AdbOptions {
        AdbOptions {
            path: self.path.clone(),
            host: self.host.clone(),
            port: self.port,
            timeout: self.timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `adb <verb> <args...>` and resolves with the captured output.
    ///
    /// Returns `Ok(None)` only when a failure was swallowed by
    /// [`no_throw`](Adb::no_throw).
    pub async fn exec(&mut self, verb: &str, args: &[&str]) -> AdbResult<Option<String>> {
        let opts = mem::take(&mut self.output);
        match self.run(verb, args, &opts).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if opts.no_throw => {
                debug!("swallowing failure (no-throw): {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Runs `adb shell <command>` on the default (or scoped) device.
    pub async fn shell(&mut self, command: &str) -> AdbResult<Option<String>> {
        self.exec("shell", &[command]).await
    }

    pub async fn reboot(&mut self) -> AdbResult<()> {
        self.exec("reboot", &[]).await?;
        Ok(())
    }

    pub async fn uninstall(&mut self, package: &str) -> AdbResult<()> {
        if package.is_empty() {
            return Err(AdbError::MissingArgument("package name"));
        }
        self.exec("uninstall", &[package]).await?;
        Ok(())
    }

    pub async fn install(&mut self, remote_path: &str) -> AdbResult<Option<String>> {
        self.exec("install", &[remote_path]).await
    }

    pub async fn start_server(&mut self) -> AdbResult<bool> {
        let output = self.exec("start-server", &[]).await?;
        Ok(matches!(output, Some(ref text) if !text.is_empty()))
    }

    pub async fn version(&mut self) -> AdbResult<Option<String>> {
        self.exec("version", &[]).await
    }

    /// Connects to a device over TCP/IP, `adb connect [ip]`.
    pub async fn connect(&mut self, device_ip: Option<&str>) -> AdbResult<bool> {
        let output = match device_ip {
            Some(ip) => self.exec("connect", &[ip]).await?,
            None => self.exec("connect", &[]).await?,
        };
        Ok(matches!(output, Some(ref text) if !text.is_empty()))
    }

    pub async fn disconnect(&mut self, device_ip: &str) -> AdbResult<bool> {
        let output = self.exec("disconnect", &[device_ip]).await?;
        Ok(matches!(output, Some(ref text) if !text.is_empty()))
    }

    /// Raw `adb devices` listing.
    pub async fn list_devices(&mut self) -> AdbResult<Vec<Device>> {
        let output = self.exec("devices", &[]).await?;
        Ok(output.as_deref().map(parse::devices).unwrap_or_default())
    }

    /// One [`DeviceClient`] per attached device, each scoped to its serial
    /// and sharing this client's binary path and timeout.
    pub async fn devices(&mut self) -> AdbResult<Vec<DeviceClient>> {
        let opts = self.options();
        Ok(self
            .list_devices()
            .await?
            .into_iter()
            .map(|device| DeviceClient::new(DeviceAdb::new(&device.serial, opts.clone())))
            .collect())
    }

    /// A [`DeviceClient`] for one attached device, by serial.
    pub async fn device(&mut self, serial: &str) -> AdbResult<DeviceClient> {
        let devices = self.list_devices().await?;
        if !devices.iter().any(|device| device.serial == serial) {
            return Err(AdbError::DeviceNotFound {
                serial: serial.to_string(),
            });
        }
        Ok(DeviceClient::new(DeviceAdb::new(serial, self.options())))
    }

    /// Streams a local file into `adb push <remote_path>` via the child's
    /// stdin, reporting a running byte count to `progress`.
    ///
    /// A missing local file fails before any process is spawned.
    pub async fn push(
        &mut self,
        local: impl AsRef<Path>,
        remote_path: &str,
        mut progress: Option<PushProgress<'_>>,
    ) -> AdbResult<String> {
        let local = local.as_ref();
        let total = match tokio::fs::metadata(local).await {
            Ok(meta) => meta.len(),
            Err(_) => {
                return Err(AdbError::MissingLocalFile {
                    path: local.to_path_buf(),
                });
            }
        };

        let command_line = self.command_line("push", &[remote_path]);
        debug!("executing `{command_line}` ({total} bytes over stdin)");
        let mut cmd = Command::new(&self.path);
        cmd.args(self.global_args())
            .arg("push")
            .arg(remote_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|source| AdbError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        let mut stdin = child.stdin.take().ok_or_else(|| {
            AdbError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "child stdin unavailable",
            ))
        })?;

        let mut file = tokio::fs::File::open(local).await?;
        let mut transferred = 0u64;
        let mut buf = [0u8; PUSH_CHUNK];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            stdin.write_all(&buf[..n]).await?;
            transferred += n as u64;
            if let Some(on_progress) = progress.as_mut() {
                on_progress(transferred, Some(total));
            }
        }
        stdin.shutdown().await?;
        drop(stdin);

        self.resolve(child, true, command_line).await
    }

    /// Copies a file off the device, `adb pull <path> <to>`.
    pub async fn pull(&mut self, path: &str, to: &str) -> AdbResult<()> {
        self.exec("pull", &[path, to]).await?;
        Ok(())
    }

    /// Starts a long-lived `adb logcat` child and forwards each output line
    /// to `on_log` from a background task. The stream runs until the child
    /// exits on its own or the returned handle is [`stop`](LogcatHandle::stop)ped;
    /// the per-call timeout does not apply.
    pub fn logcat<F>(&self, mut on_log: F) -> AdbResult<LogcatHandle>
    where
        F: FnMut(String) + Send + 'static,
    {
        let command_line = self.command_line("logcat", &[]);
        debug!("starting `{command_line}`");
        let mut cmd = Command::new(&self.path);
        cmd.args(self.global_args())
            .arg("logcat")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        let mut child = cmd.spawn().map_err(|source| AdbError::Spawn {
            command: command_line,
            source,
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            AdbError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "child stdout unavailable",
            ))
        })?;

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                on_log(line);
            }
        });

        Ok(LogcatHandle { child, reader })
    }

    async fn run(&self, verb: &str, args: &[&str], opts: &OutputOptions) -> AdbResult<String> {
        let command_line = self.command_line(verb, args);
        if opts.verbose {
            info!("executing `{command_line}`");
        } else {
            debug!("executing `{command_line}`");
        }

        let mut cmd = Command::new(&self.path);
        cmd.args(self.global_args())
            .arg(verb)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let child = cmd.spawn().map_err(|source| AdbError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        // stderr folds into the captured text only when extra arguments
        // beyond the verb were supplied.
        self.resolve(child, !args.is_empty(), command_line).await
    }

    /// Accumulates the child's output and resolves on exit code 0, raced
    /// against the configured timeout. A timed-out child is abandoned to
    /// exit on its own, never force-killed.
    async fn resolve(
        &self,
        child: Child,
        capture_stderr: bool,
        command_line: String,
    ) -> AdbResult<String> {
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(waited) => waited?,
            Err(_) => {
                warn!("`{command_line}` timed out after {:?}", self.timeout);
                return Err(AdbError::Timeout {
                    command: command_line,
                    duration: self.timeout,
                });
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if capture_stderr {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        if output.status.success() {
            debug!("`{command_line}` exited cleanly ({} bytes)", text.len());
            Ok(text)
        } else {
            let code = output.status.code().unwrap_or(-1);
            warn!("`{command_line}` exited with code {code}: {text}");
            Err(AdbError::CommandFailed {
                command: command_line,
                code,
                output: text,
            })
        }
    }

    fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(host) = &self.host {
            args.push("-H".to_string());
            args.push(host.clone());
        }
        if let Some(port) = self.port {
            args.push("-P".to_string());
            args.push(port.to_string());
        }
        if let Some(serial) = &self.serial {
            args.push("-s".to_string());
            args.push(serial.clone());
        }
        args
    }

    fn command_line(&self, verb: &str, args: &[&str]) -> String {
        let mut parts = vec![self.path.clone()];
        parts.extend(self.global_args());
        parts.push(verb.to_string());
        parts.extend(args.iter().map(|arg| arg.to_string()));
        parts.join(" ")
    }
}

impl Default for Adb {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running `adb logcat` child.
#[derive(Debug)]
pub struct LogcatHandle {
    child: Child,
    reader: JoinHandle<()>,
}

impl LogcatHandle {
    /// Kills the child and tears down the forwarding task.
    pub async fn stop(mut self) {
        let _ = self.child.kill().await;
        self.reader.abort();
    }
}
