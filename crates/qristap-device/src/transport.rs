use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";
pub const DEFAULT_BRIDGE_PORT: u16 = 5037;

/// Commands accepted by the local device-control bridge.
///
/// Every call blocks until the bridge answers; there is no timeout. Success
/// means the transport accepted the command, not that the target's UI reached
/// any particular state.
pub trait AdbTransport: Send + Sync {
    /// Serials of connected targets, in bridge enumeration order.
    fn devices(&self) -> Result<Vec<String>>;

    /// Copy a local file onto the target's filesystem.
    fn push(&self, serial: &str, local: &Path, remote: &str) -> Result<()>;

    /// Run a shell-style command on the target.
    fn shell(&self, serial: &str, command: &str) -> Result<()>;
}

/// Transport backed by the `adb` binary talking to a local bridge daemon.
pub struct AdbCli {
    adb_path: PathBuf,
    host: String,
    port: u16,
}

impl AdbCli {
    /// Locate `adb` on the PATH and address the bridge daemon at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let adb_path = which::which("adb")
            .map_err(|_| Error::Bridge("adb binary not found on PATH".to_string()))?;

        Ok(Self {
            adb_path,
            host: host.into(),
            port,
        })
    }

    fn base_args(&self) -> Vec<String> {
        vec![
            "-H".to_string(),
            self.host.clone(),
            "-P".to_string(),
            self.port.to_string(),
        ]
    }

    fn devices_args(&self) -> Vec<String> {
        let mut args = self.base_args();
        args.push("devices".to_string());
        args
    }

    fn push_args(&self, serial: &str, local: &Path, remote: &str) -> Vec<String> {
        let mut args = self.base_args();
        args.extend([
            "-s".to_string(),
            serial.to_string(),
            "push".to_string(),
            local.display().to_string(),
            remote.to_string(),
        ]);
        args
    }

    fn shell_args(&self, serial: &str, command: &str) -> Vec<String> {
        let mut args = self.base_args();
        args.extend([
            "-s".to_string(),
            serial.to_string(),
            "shell".to_string(),
            command.to_string(),
        ]);
        args
    }

    fn run(&self, args: &[String]) -> std::io::Result<Output> {
        Command::new(&self.adb_path).args(args).output()
    }
}

impl AdbTransport for AdbCli {
    fn devices(&self) -> Result<Vec<String>> {
        let output = self
            .run(&self.devices_args())
            .map_err(|e| Error::Bridge(format!("failed to run adb devices: {e}")))?;

        if !output.status.success() {
            return Err(Error::Bridge(format!(
                "adb devices failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(parse_device_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn push(&self, serial: &str, local: &Path, remote: &str) -> Result<()> {
        let output = self
            .run(&self.push_args(serial, local, remote))
            .map_err(|e| Error::Transfer(format!("failed to run adb push: {e}")))?;

        if !output.status.success() {
            return Err(Error::Transfer(format!(
                "push {} -> {} failed: {}",
                local.display(),
                remote,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    fn shell(&self, serial: &str, command: &str) -> Result<()> {
        let output = self
            .run(&self.shell_args(serial, command))
            .map_err(|e| Error::Command(format!("failed to run adb shell: {e}")))?;

        if !output.status.success() {
            return Err(Error::Command(format!(
                "shell command `{command}` failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

/// Parse `adb devices` output into serials in the `device` state.
///
/// Skips the banner line and any `offline`/`unauthorized` entries.
fn parse_device_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            (state == "device").then(|| serial.to_string())
        })
        .collect()
}
