// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};

/// One replica of the simulated system together with its statistical weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walker {
    pub positions: Vec<f64>,
    /// Simulated time reached so far
    pub time: f64,
    /// Total integration steps taken
    pub steps: u64,
    pub weight: f64,
    /// Seeds this walker's noise stream; together with `steps` it makes
    /// every segment reproducible
    pub seed: u64,
}

impl Walker {
    pub fn new(dimensions: usize, weight: f64, seed: u64) -> Self {
        Self {
            positions: vec![0.0; dimensions],
            time: 0.0,
            steps: 0,
            weight,
            seed,
        }
    }

    /// Euclidean distance from the origin
    pub fn displacement(&self) -> f64 {
        self.positions.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

/// Equal-weight starting population
pub fn initial_walkers(num_walkers: usize, dimensions: usize, base_seed: u64) -> Vec<Walker> {
    let weight = if num_walkers == 0 {
        0.0
    } else {
        1.0 / num_walkers as f64
    };
    (0..num_walkers)
        .map(|i| Walker::new(dimensions, weight, base_seed.wrapping_add(i as u64)))
        .collect()
}
