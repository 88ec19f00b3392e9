use crate::{IsoError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_VOLUME_LABEL: &str = "MY_ISO";

/// Recording dates are stored as a year offset from 1900 in a single byte.
pub const MIN_RECORDING_YEAR: i32 = 1900;
pub const MAX_RECORDING_YEAR: i32 = 1900 + u8::MAX as i32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageOptions {
    pub volume_label: String,
    pub publisher: Option<String>,
    pub application: Option<String>,
    /// Stamped into every date field. `None` writes the "not specified"
    /// encoding so identical inputs always produce identical images.
    pub recording_time: Option<DateTime<Utc>>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            volume_label: DEFAULT_VOLUME_LABEL.to_string(),
            publisher: None,
            application: None,
            recording_time: None,
        }
    }
}

impl ImageOptions {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            volume_label: label.into(),
            ..Self::default()
        }
    }

    /// Parse options from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: ImageOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file on disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(time) = self.recording_time {
            let year = time.year();
            if !(MIN_RECORDING_YEAR..=MAX_RECORDING_YEAR).contains(&year) {
                return Err(IsoError::Configuration(format!(
                    "recording year {} outside {}..={}",
                    year, MIN_RECORDING_YEAR, MAX_RECORDING_YEAR
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ImageOptions::default();
        assert_eq!(options.volume_label, "MY_ISO");
        assert!(options.recording_time.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = ImageOptions::from_json_str(r#"{"publisher": "ACME"}"#).unwrap();
        assert_eq!(options.volume_label, DEFAULT_VOLUME_LABEL);
        assert_eq!(options.publisher.as_deref(), Some("ACME"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ImageOptions::from_json_str(r#"{"label": "X"}"#);
        assert!(matches!(result, Err(IsoError::SerializationError(_))));
    }

    #[test]
    fn test_recording_year_range() {
        let mut options = ImageOptions::default();
        options.recording_time = Some(Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap());
        assert!(matches!(options.validate(), Err(IsoError::Configuration(_))));

        options.recording_time = Some(Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"volume_label": "backup", "application": "ISOFORGE"}}"#).unwrap();

        let options = ImageOptions::from_json_file(file.path()).unwrap();
        assert_eq!(options.volume_label, "backup");
        assert_eq!(options.application.as_deref(), Some("ISOFORGE"));
    }
}
