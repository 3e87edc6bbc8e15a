use crate::launch::{self, ChromeHandle};
use crate::locate::LocateStrategy;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, ReloadParams, Viewport,
};
use chromiumoxide::page::Page;
use qristap_core::Delay;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline for each locate/click/capture step.
const STEP_TIMEOUT: Duration = Duration::from_secs(5);
/// Poll cadence while a step waits for the page to catch up.
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Settle pause after activating the candidate action.
const POST_SELECT_HOLD: Duration = Duration::from_millis(800);
/// Settle pause after submitting, while the QR renders.
const POST_SUBMIT_HOLD: Duration = Duration::from_millis(2500);

/// Produces one payment-QR screenshot per call.
///
/// The orchestrator is generic over this so its tests can drive the cycle
/// with a scripted page instead of a real browser.
#[async_trait]
pub trait QrCapture: Send + Sync {
    /// Drive the page through one selection/submission pass and write the QR
    /// region to a local image file.
    async fn capture(&self) -> Result<PathBuf>;

    /// Reload the page, discarding all transient UI state.
    async fn refresh(&self) -> Result<()>;
}

/// One long-lived headless page driven through a fixed sequence per
/// iteration.
///
/// There is a single deterministic path: every step either completes within
/// its deadline or fails the iteration. No reselection, no fallbacks.
pub struct BrowserAutomationSession {
    // Held to keep the Chrome process and DevTools connection alive.
    _chrome: ChromeHandle,
    page: Page,
    locator: Box<dyn LocateStrategy>,
    delay: Arc<dyn Delay>,
    capture_path: PathBuf,
}

impl BrowserAutomationSession {
    /// Launch Chrome, open the target page, and hold both for the process
    /// lifetime.
    pub async fn open(
        url: &str,
        chrome_path: Option<&Path>,
        locator: Box<dyn LocateStrategy>,
        delay: Arc<dyn Delay>,
        capture_path: PathBuf,
    ) -> Result<Self> {
        let chrome = launch::launch_headless(chrome_path).await?;
        let page = chrome.browser.new_page(url).await?;
        tracing::info!("opened {url}");

        Ok(Self {
            _chrome: chrome,
            page,
            locator,
            delay,
            capture_path,
        })
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        let deadline = Instant::now() + STEP_TIMEOUT;
        loop {
            let state = self
                .page
                .evaluate("document.readyState")
                .await
                .ok()
                .and_then(|r| r.value().and_then(|v| v.as_str().map(String::from)));

            if state.as_deref() == Some("complete") {
                tracing::info!("page loaded");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::UiInteraction(
                    "page never reached readyState=complete".to_string(),
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Re-evaluate a locating click expression until it reports a hit.
    async fn click_scripted(&self, what: &str, expr: String) -> Result<()> {
        let deadline = Instant::now() + STEP_TIMEOUT;
        loop {
            let clicked = self
                .page
                .evaluate(expr.clone())
                .await
                .ok()
                .and_then(|r| r.value().and_then(|v| v.as_bool()))
                .unwrap_or(false);

            if clicked {
                tracing::info!("{what} clicked");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::UiInteraction(format!("timed out locating {what}")));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click_selector(&self, what: &str, selector: &str) -> Result<()> {
        let deadline = Instant::now() + STEP_TIMEOUT;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                element
                    .click()
                    .await
                    .map_err(|e| Error::UiInteraction(format!("failed to click {what}: {e}")))?;
                tracing::info!("{what} clicked");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::UiInteraction(format!(
                    "timed out locating {what} ({selector})"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Measure the QR region so the screenshot can be clipped to it.
    async fn region_clip(&self, selector: &str) -> Result<Viewport> {
        let expr = format!(
            "(() => {{ const el = document.querySelector('{selector}'); \
             if (!el) return null; \
             const r = el.getBoundingClientRect(); \
             return {{ x: r.x, y: r.y, w: r.width, h: r.height }}; }})()"
        );

        let deadline = Instant::now() + STEP_TIMEOUT;
        loop {
            let rect = self
                .page
                .evaluate(expr.clone())
                .await
                .ok()
                .and_then(|r| r.value().cloned());

            if let Some(rect) = rect {
                let x = rect.get("x").and_then(|v| v.as_f64());
                let y = rect.get("y").and_then(|v| v.as_f64());
                let w = rect.get("w").and_then(|v| v.as_f64());
                let h = rect.get("h").and_then(|v| v.as_f64());

                if let (Some(x), Some(y), Some(w), Some(h)) = (x, y, w, h) {
                    if w > 0.0 && h > 0.0 {
                        return Ok(Viewport {
                            x,
                            y,
                            width: w,
                            height: h,
                            scale: 1.0,
                        });
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(Error::UiInteraction(format!(
                    "timed out measuring qr region ({selector})"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl QrCapture for BrowserAutomationSession {
    async fn capture(&self) -> Result<PathBuf> {
        self.wait_until_loaded().await?;

        self.click_scripted("category toggle", self.locator.category_toggle_click())
            .await?;
        self.click_scripted("candidate action", self.locator.candidate_action_click())
            .await?;
        self.delay.hold(POST_SELECT_HOLD);

        self.click_selector("submit control", self.locator.submit_control())
            .await?;
        self.delay.hold(POST_SUBMIT_HOLD);

        let clip = self.region_clip(self.locator.qr_region()).await?;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .clip(clip)
            .build();

        let response = self.page.execute(params).await?;
        let payload: &str = response.data.as_ref();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| Error::UiInteraction(format!("screenshot decode failed: {e}")))?;

        std::fs::write(&self.capture_path, &bytes)?;
        tracing::info!("screenshot written to {}", self.capture_path.display());

        Ok(self.capture_path.clone())
    }

    async fn refresh(&self) -> Result<()> {
        self.page.execute(ReloadParams::default()).await?;
        tracing::info!("page refreshed");
        Ok(())
    }
}

// Driving a real page needs a Chrome install; the sequence itself is
// exercised through the orchestrator tests with a scripted QrCapture.
