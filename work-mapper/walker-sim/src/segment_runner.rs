// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Walker;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use work_mapper_core::{task_fn, MapperError, TaskFn};

/// Arguments of one segment task: the walker and how many steps to take
pub type SegmentArgs = (Walker, u32);

/// Advances walkers with a bounded random walk.
///
/// Stands in for a molecular dynamics engine: deterministic for a given
/// walker state, and expensive enough per step to be worth distributing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentRunner {
    pub step_size: f64,
    pub time_step: f64,
}

impl Default for SegmentRunner {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            time_step: 0.002,
        }
    }
}

impl SegmentRunner {
    pub fn new(step_size: f64, time_step: f64) -> Self {
        Self {
            step_size,
            time_step,
        }
    }

    /// Rejects settings that would make every segment panic
    pub fn validate(&self) -> Result<(), MapperError> {
        if !self.step_size.is_finite() || self.step_size < 0.0 {
            return Err(MapperError::Config(format!(
                "step_size must be finite and non-negative, got {}",
                self.step_size
            )));
        }
        if !self.time_step.is_finite() {
            return Err(MapperError::Config(format!(
                "time_step must be finite, got {}",
                self.time_step
            )));
        }
        Ok(())
    }

    pub fn run_segment(&self, walker: Walker, segment_length: u32) -> Walker {
        let mut rng = StdRng::seed_from_u64(
            walker
                .seed
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .wrapping_add(walker.steps),
        );

        let mut positions = walker.positions;
        for _ in 0..segment_length {
            for x in positions.iter_mut() {
                *x += rng.random_range(-self.step_size..=self.step_size);
            }
        }

        Walker {
            positions,
            time: walker.time + self.time_step * f64::from(segment_length),
            steps: walker.steps + u64::from(segment_length),
            weight: walker.weight,
            seed: walker.seed,
        }
    }

    /// The task function handed to a mapper; the runner's settings are
    /// captured and shared by every task
    pub fn segment_fn(self) -> TaskFn<SegmentArgs, Walker> {
        task_fn(move |(walker, segment_length): SegmentArgs| {
            self.run_segment(walker, segment_length)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_is_deterministic() {
        let runner = SegmentRunner::default();
        let walker = Walker::new(3, 0.5, 42);
        assert_eq!(
            runner.run_segment(walker.clone(), 100),
            runner.run_segment(walker, 100)
        );
    }

    #[test]
    fn segment_advances_clock_and_keeps_weight() {
        let runner = SegmentRunner::new(0.1, 0.5);
        let walker = runner.run_segment(Walker::new(2, 0.125, 7), 10);
        assert_eq!(walker.steps, 10);
        assert_eq!(walker.time, 5.0);
        assert_eq!(walker.weight, 0.125);
        assert_eq!(walker.seed, 7);
    }

    #[test]
    fn steps_stay_within_step_size() {
        let runner = SegmentRunner::new(0.25, 0.001);
        let walker = runner.run_segment(Walker::new(4, 1.0, 3), 1);
        assert!(walker.positions.iter().all(|x| x.abs() <= 0.25));
    }

    #[test]
    fn consecutive_segments_use_fresh_noise() {
        let runner = SegmentRunner::default();
        let once = runner.run_segment(Walker::new(1, 1.0, 9), 5);
        let twice = runner.run_segment(once.clone(), 5);
        assert_ne!(once.positions, twice.positions);
    }

    #[test]
    fn validate_rejects_negative_or_non_finite_settings() {
        assert!(SegmentRunner::default().validate().is_ok());
        assert!(SegmentRunner::new(0.0, 0.001).validate().is_ok());
        for runner in [
            SegmentRunner::new(-0.1, 0.002),
            SegmentRunner::new(f64::NAN, 0.002),
            SegmentRunner::new(f64::INFINITY, 0.002),
            SegmentRunner::new(0.1, f64::NAN),
        ] {
            assert!(matches!(runner.validate(), Err(MapperError::Config(_))));
        }
    }

    #[test]
    fn zero_step_size_keeps_positions() {
        let walker = SegmentRunner::new(0.0, 0.1).run_segment(Walker::new(2, 1.0, 4), 3);
        assert_eq!(walker.positions, vec![0.0, 0.0]);
    }

    #[test]
    fn segment_fn_matches_run_segment() {
        let runner = SegmentRunner::default();
        let walker = Walker::new(2, 1.0, 11);
        let function = runner.segment_fn();
        assert_eq!(
            function((walker.clone(), 20)),
            runner.run_segment(walker, 20)
        );
    }
}
