use anyhow::Result;
use qristap_browser::QrCapture;
use qristap_core::{ArtifactNamer, Delay, RunConfiguration, TapStep, artifact};
use qristap_device::{AdbTransport, DeviceControlChannel};
use std::sync::Arc;
use std::time::Duration;

/// Bulk-remove stale artifacts every this many iterations.
const CLEANUP_CADENCE: u64 = 4;

/// Settle pause after periodic cleanup, rate-limiting against the upstream
/// service.
const CLEANUP_SETTLE: Duration = Duration::from_secs(3);

/// The control loop binding the browser session and the device channel.
///
/// One logical thread of control with strict step ordering and no recovery:
/// any error propagates out, is logged by the caller, and ends the run. The
/// in-flight iteration's transaction state is lost with it.
pub struct IterationOrchestrator<T, S> {
    config: RunConfiguration,
    device: DeviceControlChannel<T>,
    session: S,
    namer: ArtifactNamer,
    delay: Arc<dyn Delay>,
    iteration: u64,
}

impl<T: AdbTransport, S: QrCapture> IterationOrchestrator<T, S> {
    pub fn new(
        config: RunConfiguration,
        device: DeviceControlChannel<T>,
        session: S,
        namer: ArtifactNamer,
        delay: Arc<dyn Delay>,
    ) -> Self {
        Self {
            config,
            device,
            session,
            namer,
            delay,
            iteration: 1,
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// One upfront cleanup, then the unbounded cycle loop. Only returns on
    /// error; the process is expected to run until killed.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("starting profile {}", self.config.name);
        self.device.remove_artifacts(artifact::CLEANUP_PATTERN)?;

        loop {
            self.cycle().await?;
        }
    }

    /// One full pass: browser drive, transfer, tap sequence, reload.
    pub async fn cycle(&mut self) -> Result<()> {
        tracing::info!("starting iteration {}", self.iteration);

        if self.iteration % CLEANUP_CADENCE == 0 {
            self.device.remove_artifacts(artifact::CLEANUP_PATTERN)?;
            tracing::info!("waiting for safe request window");
            self.delay.hold(CLEANUP_SETTLE);
        }

        let capture = self.session.capture().await?;

        let remote = self.namer.next_remote_path();
        self.device.send_image(&capture, &remote)?;

        let tap_steps = [
            (self.config.press_qris_button, TapStep::QrisButton),
            (self.config.press_input_image, TapStep::InputImage),
            (self.config.choose_image, TapStep::ChooseImage),
            (self.config.press_next_button, TapStep::NextButton),
        ];
        for (coord, step) in tap_steps {
            self.device.tap(coord)?;
            self.delay.hold(self.config.hold_after(step));
        }

        for pin in &self.config.pin_taps {
            self.device.tap(*pin)?;
        }
        self.delay.hold(self.config.hold_after(TapStep::PinInput));

        self.device.tap(self.config.press_close_button)?;

        self.session.refresh().await?;
        tracing::info!("restarting the procedure");

        self.iteration += 1;
        Ok(())
    }
}
