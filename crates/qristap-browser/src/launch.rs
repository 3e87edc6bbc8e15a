use crate::{Error, Result};
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;

const DEBUGGING_PORT: u16 = 9222;
const CONNECT_RETRIES: usize = 5;
const CONNECT_RETRY_WAIT: Duration = Duration::from_millis(500);

/// A headless Chrome process plus the DevTools connection into it.
///
/// Both live for the process lifetime; nothing here is torn down explicitly.
pub struct ChromeHandle {
    pub(crate) browser: Browser,
    // Held to keep the Chrome process and its profile directory alive.
    _child: Child,
    _profile: TempDir,
}

/// Locate Chrome, spawn it headless on a throwaway profile, and connect.
pub async fn launch_headless(custom_path: Option<&Path>) -> Result<ChromeHandle> {
    let binary = find_chrome(custom_path)?;
    let profile = tempfile::tempdir()?;

    let args = headless_args(profile.path(), DEBUGGING_PORT);
    let child = Command::new(&binary)
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Launch(format!("failed to spawn {}: {e}", binary.display())))?;

    tracing::info!("chrome started (pid {})", child.id());

    let browser = connect_with_retries(DEBUGGING_PORT).await?;

    Ok(ChromeHandle {
        browser,
        _child: child,
        _profile: profile,
    })
}

/// Connect to the DevTools endpoint, retrying while Chrome finishes starting,
/// and drive the protocol handler on its own task.
async fn connect_with_retries(port: u16) -> Result<Browser> {
    let endpoint = format!("http://127.0.0.1:{port}");

    let mut retries = CONNECT_RETRIES;
    let (browser, mut handler) = loop {
        match Browser::connect(&endpoint).await {
            Ok(connection) => break connection,
            Err(e) => {
                retries -= 1;
                if retries == 0 {
                    return Err(Error::Cdp(format!(
                        "failed to connect to chrome after {CONNECT_RETRIES} attempts: {e}"
                    )));
                }
                tracing::debug!("devtools connection attempt failed, retrying ({retries} left)");
                tokio::time::sleep(CONNECT_RETRY_WAIT).await;
            }
        }
    };

    // The handler stream must be polled for any browser command to complete.
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!("cdp handler event error (continuing): {e}");
            }
        }
    });

    tracing::info!("devtools connection established");
    Ok(browser)
}

fn headless_args(profile: &Path, port: u16) -> Vec<String> {
    vec![
        "--headless=new".to_string(),
        "--disable-gpu".to_string(),
        format!("--remote-debugging-port={port}"),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        format!("--user-data-dir={}", profile.display()),
        "about:blank".to_string(),
    ]
}

/// Find the Chrome binary: the custom path if given, else platform defaults.
fn find_chrome(custom_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = custom_path {
        return validate_chrome_path(path);
    }

    for path in default_paths() {
        if let Ok(valid) = validate_chrome_path(&path) {
            return Ok(valid);
        }
    }

    Err(Error::Launch(format!(
        "chrome not found, checked: {}; use --chrome-path to specify a location",
        default_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

fn default_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    return vec![
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
        PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
    ];

    #[cfg(target_os = "linux")]
    return vec![
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/chromium"),
        PathBuf::from("/usr/bin/chromium-browser"),
    ];

    #[cfg(target_os = "windows")]
    return vec![
        PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
        PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
    ];

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    return vec![];
}

fn validate_chrome_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::Launch(format!("chrome not found at {}", path.display())));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path)?;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(Error::Launch(format!(
                "chrome binary not executable: {}",
                path.display()
            )));
        }
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_args_pin_port_and_profile() {
        let args = headless_args(Path::new("/tmp/profile"), 9222);

        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
        assert!(args.contains(&"--no-first-run".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("about:blank"));
    }

    #[test]
    fn missing_custom_path_is_a_launch_error() {
        let err = find_chrome(Some(Path::new("/nonexistent/chrome"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_custom_path_is_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = find_chrome(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("not executable"));
    }

    // Connecting and launching require a Chrome install; exercised manually
    // and by the top-level binary, not by unit tests.
}
