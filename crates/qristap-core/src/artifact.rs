use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Directory on the device where captured QR images land.
pub const REMOTE_ARTIFACT_DIR: &str = "/sdcard/Pictures";

/// Glob handed to the device-side `rm` during periodic bulk cleanup. Matches
/// every path `next_remote_path` can produce.
pub const CLEANUP_PATTERN: &str = "/sdcard/Pictures/qris-*";

/// Local capture file, overwritten on every iteration.
pub const LOCAL_CAPTURE_FILE: &str = "qris.jpg";

/// Produces remote artifact paths with a random six-digit distinguishing
/// suffix.
///
/// Names are not deduplicated against live device state; stale artifacts are
/// bulk-removed by [`CLEANUP_PATTERN`] instead. A seeded namer replays the
/// same sequence, which is what the tests rely on.
pub struct ArtifactNamer {
    rng: StdRng,
}

impl ArtifactNamer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Next device path of the form `/sdcard/Pictures/qris-<6 digits>.jpg`.
    pub fn next_remote_path(&mut self) -> String {
        let suffix: u32 = self.rng.gen_range(111_111..=999_999);
        format!("{REMOTE_ARTIFACT_DIR}/qris-{suffix}.jpg")
    }
}

impl Default for ArtifactNamer {
    fn default() -> Self {
        Self::new()
    }
}
