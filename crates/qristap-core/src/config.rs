use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// A pixel position on the device screen, serialized as a `[x, y]` JSON pair.
///
/// Coordinates are unsigned, so a parsed configuration can never hold a
/// negative position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Coord(pub u32, pub u32);

impl Coord {
    pub fn x(&self) -> u32 {
        self.0
    }

    pub fn y(&self) -> u32 {
        self.1
    }
}

/// Steps of the on-device tap sequence that carry a configured hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapStep {
    QrisButton,
    InputImage,
    ChooseImage,
    NextButton,
    PinInput,
}

/// Device coordinates and step delays for one run profile.
///
/// Loaded once at startup and never mutated. The on-device payment app is a
/// black box driven by timed blind taps, so all device-specific tuning lives
/// here rather than in code.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfiguration {
    pub name: String,

    pub press_qris_button: Coord,
    pub press_input_image: Coord,
    pub choose_image: Coord,
    pub press_next_button: Coord,
    pub press_close_button: Coord,
    pub pin_taps: Vec<Coord>,

    pub press_qris_button_delay: f64,
    pub press_input_image_delay: f64,
    pub choose_image_delay: f64,
    pub press_next_button_delay: f64,
    pub pin_input_delay: f64,

    /// Added on top of every per-step delay.
    pub delay_adjustment: f64,
}

impl RunConfiguration {
    /// Read and validate a profile from a JSON file.
    ///
    /// Any missing field or out-of-range delay fails here, at startup, never
    /// mid-loop.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// The hold to apply after a step: `delay_adjustment` plus the step's own
    /// configured delay, in seconds.
    pub fn hold_after(&self, step: TapStep) -> Duration {
        Duration::from_secs_f64(self.delay_adjustment + self.step_delay(step))
    }

    fn step_delay(&self, step: TapStep) -> f64 {
        match step {
            TapStep::QrisButton => self.press_qris_button_delay,
            TapStep::InputImage => self.press_input_image_delay,
            TapStep::ChooseImage => self.choose_image_delay,
            TapStep::NextButton => self.press_next_button_delay,
            TapStep::PinInput => self.pin_input_delay,
        }
    }

    fn validate(&self) -> Result<()> {
        let delays = [
            ("press_qris_button_delay", self.press_qris_button_delay),
            ("press_input_image_delay", self.press_input_image_delay),
            ("choose_image_delay", self.choose_image_delay),
            ("press_next_button_delay", self.press_next_button_delay),
            ("pin_input_delay", self.pin_input_delay),
            ("delay_adjustment", self.delay_adjustment),
        ];

        for (field, value) in delays {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{field} must be a non-negative number of seconds, got {value}"
                )));
            }
        }

        if self.pin_taps.is_empty() {
            return Err(Error::InvalidConfig(
                "pin_taps must contain at least one coordinate pair".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        r#"{
            "name": "buleleng-festival",
            "press_qris_button": [540, 1650],
            "press_input_image": [120, 380],
            "choose_image": [200, 520],
            "press_next_button": [540, 1800],
            "press_close_button": [540, 1900],
            "pin_taps": [[180, 1500], [360, 1500], [540, 1500], [720, 1500], [180, 1650], [360, 1650]],
            "press_qris_button_delay": 2.0,
            "press_input_image_delay": 1.5,
            "choose_image_delay": 1.0,
            "press_next_button_delay": 3.0,
            "pin_input_delay": 4.0,
            "delay_adjustment": 0.5
        }"#
        .to_string()
    }

    #[test]
    fn parses_complete_profile() {
        let config: RunConfiguration = serde_json::from_str(&sample_json()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.name, "buleleng-festival");
        assert_eq!(config.press_qris_button, Coord(540, 1650));
        assert_eq!(config.pin_taps.len(), 6);
        assert_eq!(config.pin_taps[2], Coord(540, 1500));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let without_close = sample_json().replace(r#""press_close_button": [540, 1900],"#, "");
        let result: std::result::Result<RunConfiguration, _> =
            serde_json::from_str(&without_close);
        assert!(result.is_err());
    }

    #[test]
    fn negative_coordinate_is_a_parse_error() {
        let negative = sample_json().replace("[540, 1650]", "[-540, 1650]");
        let result: std::result::Result<RunConfiguration, _> = serde_json::from_str(&negative);
        assert!(result.is_err());
    }

    #[test]
    fn negative_delay_fails_validation() {
        let mut config: RunConfiguration = serde_json::from_str(&sample_json()).unwrap();
        config.pin_input_delay = -1.0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pin_input_delay"));
    }

    #[test]
    fn non_finite_delay_fails_validation() {
        let mut config: RunConfiguration = serde_json::from_str(&sample_json()).unwrap();
        config.delay_adjustment = f64::NAN;

        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_pin_taps_fails_validation() {
        let mut config: RunConfiguration = serde_json::from_str(&sample_json()).unwrap();
        config.pin_taps.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn hold_after_adds_the_global_adjustment() {
        let config: RunConfiguration = serde_json::from_str(&sample_json()).unwrap();

        assert_eq!(
            config.hold_after(TapStep::QrisButton),
            Duration::from_secs_f64(2.5)
        );
        assert_eq!(
            config.hold_after(TapStep::PinInput),
            Duration::from_secs_f64(4.5)
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let result = RunConfiguration::load(Path::new("/nonexistent/profile.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
