use crate::transport::AdbTransport;
use crate::{Error, Result};
use qristap_core::{Coord, Delay};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Pause between typed characters so the target's input buffer keeps up.
const TYPE_PACING: Duration = Duration::from_millis(100);

/// Literal token the input service expects in place of a space character.
const SPACE_TOKEN: &str = "%s";

/// Command channel to exactly one connected control target.
///
/// The target is picked once, at construction, by its position in the bridge's
/// enumeration. There is no reconnection logic; a target that goes away mid-run
/// surfaces as failed commands.
pub struct DeviceControlChannel<T> {
    transport: T,
    serial: String,
    delay: Arc<dyn Delay>,
}

impl<T> std::fmt::Debug for DeviceControlChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceControlChannel")
            .field("serial", &self.serial)
            .finish_non_exhaustive()
    }
}

impl<T: AdbTransport> DeviceControlChannel<T> {
    /// Bind the Nth enumerated target (0-indexed).
    pub fn connect(transport: T, index: usize, delay: Arc<dyn Delay>) -> Result<Self> {
        let devices = transport.devices()?;
        let serial = devices
            .get(index)
            .cloned()
            .ok_or(Error::DeviceUnavailable {
                index,
                connected: devices.len(),
            })?;

        tracing::info!("bound device {serial} (index {index})");

        Ok(Self {
            transport,
            serial,
            delay,
        })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Push a captured image to the target and make the media index pick it up.
    pub fn send_image(&self, local: &Path, remote: &str) -> Result<()> {
        self.transfer_image(local, remote)?;
        self.index_media(remote)
    }

    pub fn transfer_image(&self, local: &Path, remote: &str) -> Result<()> {
        self.transport.push(&self.serial, local, remote)?;
        tracing::info!("image {} sent to {remote}", local.display());
        Ok(())
    }

    pub fn index_media(&self, remote: &str) -> Result<()> {
        self.transport.shell(
            &self.serial,
            &format!(
                "am broadcast -a android.intent.action.MEDIA_SCANNER_SCAN_FILE -d file://{remote}"
            ),
        )?;
        tracing::info!("media scanner triggered for {remote}");
        Ok(())
    }

    /// Synthetic touch at absolute screen coordinates.
    pub fn tap(&self, coord: Coord) -> Result<()> {
        self.transport
            .shell(&self.serial, &format!("input tap {} {}", coord.x(), coord.y()))?;
        tracing::info!("tapped at ({}, {})", coord.x(), coord.y());
        Ok(())
    }

    /// Type text one character at a time, pacing each keystroke.
    ///
    /// Aborts on the first character whose command fails.
    pub fn type_text(&self, text: &str) -> Result<()> {
        for ch in text.chars() {
            let literal = if ch == ' ' {
                SPACE_TOKEN.to_string()
            } else {
                ch.to_string()
            };

            self.transport
                .shell(&self.serial, &format!("input text {literal}"))?;
            tracing::debug!("typed character: {literal}");
            self.delay.hold(TYPE_PACING);
        }
        Ok(())
    }

    /// Bulk-remove stale artifacts matching a glob on the target filesystem.
    pub fn remove_artifacts(&self, pattern: &str) -> Result<()> {
        self.transport.shell(&self.serial, &format!("rm {pattern}"))?;
        tracing::info!("removed artifacts matching {pattern}");
        Ok(())
    }
}
