// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{initial_walkers, SegmentRunner, Walker};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;
use work_mapper_core::{MapperConfig, MapperError};

/// Settings of a simulation run, read from `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub num_walkers: usize,
    pub num_cycles: usize,
    pub segment_length: u32,
    pub dimensions: usize,
    pub seed: u64,
    pub runner: SegmentRunner,
    pub mapper: MapperConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_walkers: 48,
            num_cycles: 10,
            segment_length: 10_000,
            dimensions: 3,
            seed: 2025,
            runner: SegmentRunner::default(),
            mapper: MapperConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapperError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&contents)
            .map_err(|e| MapperError::Config(format!("{}: {}", path.display(), e)))?;
        config.runner.validate()?;
        config.mapper.validate()?;
        Ok(config)
    }

    /// Falls back to the defaults when the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn initial_walkers(&self) -> Vec<Walker> {
        initial_walkers(self.num_walkers, self.dimensions, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn nested_mapper_section_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "num_walkers": 12,
                "segment_length": 50,
                "runner": {{ "step_size": 0.5, "time_step": 0.01 }},
                "mapper": {{ "num_workers": 6, "drain_timeout_ms": 60000 }}
            }}"#
        )
        .unwrap();

        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.num_walkers, 12);
        assert_eq!(config.segment_length, 50);
        assert_eq!(config.num_cycles, RunConfig::default().num_cycles);
        assert_eq!(config.runner, SegmentRunner::new(0.5, 0.01));
        assert_eq!(config.mapper.num_workers, 6);
        assert_eq!(config.mapper.drain_timeout_ms, Some(60_000));
    }

    #[test]
    fn zero_workers_is_rejected_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "mapper": {{ "num_workers": 0 }} }}"#).unwrap();
        assert!(matches!(
            RunConfig::load(file.path()),
            Err(MapperError::NoWorkers)
        ));
        assert_eq!(RunConfig::load_or_default(file.path()), RunConfig::default());
    }

    #[test]
    fn negative_step_size_is_rejected_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "runner": {{ "step_size": -0.1, "time_step": 0.002 }} }}"#
        )
        .unwrap();
        assert!(matches!(
            RunConfig::load(file.path()),
            Err(MapperError::Config(_))
        ));
        assert_eq!(RunConfig::load_or_default(file.path()), RunConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            RunConfig::load("/nonexistent/config.json"),
            Err(MapperError::Io(_))
        ));
    }
}
