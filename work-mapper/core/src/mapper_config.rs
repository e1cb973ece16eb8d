// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::MapperError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings for a worker pool mapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Number of workers started by `init()`
    pub num_workers: usize,
    /// Upper bound for one `map()` call to collect its results.
    /// `None` waits forever, so a dead worker stalls the batch.
    pub drain_timeout_ms: Option<u64>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            drain_timeout_ms: None,
        }
    }
}

impl MapperConfig {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Self::default()
        }
    }

    /// Rounds up to whole milliseconds, never below 1 ms
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000).max(1);
        self.drain_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapperError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: MapperConfig = serde_json::from_str(&contents)
            .map_err(|e| MapperError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MapperError> {
        if self.num_workers == 0 {
            return Err(MapperError::NoWorkers);
        }
        if self.drain_timeout_ms == Some(0) {
            return Err(MapperError::Config(
                "drain_timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_waits_forever() {
        let config = MapperConfig::default();
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.drain_timeout(), None);
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "num_workers": 8 }}"#).unwrap();

        let config = MapperConfig::load(file.path()).unwrap();
        assert_eq!(config, MapperConfig::new(8));
    }

    #[test]
    fn load_reads_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "num_workers": 2, "drain_timeout_ms": 1500 }}"#).unwrap();

        let config = MapperConfig::load(file.path()).unwrap();
        assert_eq!(config.drain_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn sub_millisecond_timeout_rounds_up() {
        let config = MapperConfig::new(2).with_drain_timeout(Duration::from_micros(200));
        assert_eq!(config.drain_timeout_ms, Some(1));
        assert!(config.validate().is_ok());

        let config = MapperConfig::new(2).with_drain_timeout(Duration::from_micros(1500));
        assert_eq!(config.drain_timeout(), Some(Duration::from_millis(2)));
        assert!(MapperConfig::new(2)
            .with_drain_timeout(Duration::ZERO)
            .validate()
            .is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "num_workers": 0 }}"#).unwrap();

        assert!(matches!(
            MapperConfig::load(file.path()),
            Err(MapperError::NoWorkers)
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "num_workers = 3").unwrap();

        assert!(matches!(
            MapperConfig::load(file.path()),
            Err(MapperError::Config(_))
        ));
    }
}
