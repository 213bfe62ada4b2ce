//! Outcome sampling for register measurement
//!
//! This module provides:
//! - Single-shot selection by cumulative probability ([`sample_outcome`])
//! - Alias method for O(1) multi-shot sampling after O(n) setup
//! - Shot count aggregation ([`SamplingResult`])
//!
//! Distributions are `BTreeMap`s so outcomes are always visited in
//! ascending order, which keeps seeded sessions reproducible.

use crate::error::{Result, StateError};
use std::collections::{BTreeMap, HashMap};

/// Select an outcome from a marginal distribution
///
/// Walks the outcomes in ascending order accumulating probability and
/// returns the first one with `u < cumulative`. When rounding leaves the
/// total just below `u`, the last populated outcome is chosen.
///
/// # Arguments
/// * `distribution` - Map from outcome value to probability
/// * `u` - Uniform draw in `[0, 1)`
///
/// # Returns
/// `(outcome, probability)`, or `None` if the distribution is empty
pub fn sample_outcome(distribution: &BTreeMap<u64, f64>, u: f64) -> Option<(u64, f64)> {
    let mut cumulative = 0.0;
    for (&value, &probability) in distribution {
        cumulative += probability;
        if u < cumulative {
            return Some((value, probability));
        }
    }

    distribution
        .iter()
        .next_back()
        .map(|(&value, &probability)| (value, probability))
}

/// Select a bit value from the weights of its two outcomes
///
/// Outcome 0 occupies `[0, p_zero)` of the combined weight, outcome 1 the
/// rest. An outcome with no weight is never chosen, even when the weights
/// sum to slightly less than 1.
pub fn sample_bit(p_zero: f64, p_one: f64, u: f64) -> u8 {
    if p_one <= 0.0 {
        return 0;
    }
    if p_zero <= 0.0 {
        return 1;
    }
    if u * (p_zero + p_one) < p_zero {
        0
    } else {
        1
    }
}

/// Sampling result containing counts from multiple shots
#[derive(Debug, Clone, Default)]
pub struct SamplingResult {
    /// Map from outcome value to count
    pub counts: HashMap<u64, usize>,

    /// Total number of shots
    pub shots: usize,
}

impl SamplingResult {
    /// Create an empty result for `shots` shots
    pub fn new(shots: usize) -> Self {
        Self {
            counts: HashMap::new(),
            shots,
        }
    }

    /// Record one outcome
    pub fn add_outcome(&mut self, outcome: u64) {
        *self.counts.entry(outcome).or_insert(0) += 1;
    }

    /// Get the count for a specific outcome
    pub fn get_count(&self, outcome: u64) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Empirical probability of an outcome (count / shots)
    pub fn get_probability(&self, outcome: u64) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.get_count(outcome) as f64 / self.shots as f64
    }

    /// All outcomes sorted by count (descending), ties by outcome
    pub fn sorted_outcomes(&self) -> Vec<(u64, usize)> {
        let mut outcomes: Vec<_> = self.counts.iter().map(|(&k, &v)| (k, v)).collect();
        outcomes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        outcomes
    }

    /// Counts keyed by zero-padded bitstring
    pub fn to_bitstring_counts(&self, num_qubits: usize) -> HashMap<String, usize> {
        self.counts
            .iter()
            .map(|(&outcome, &count)| (format!("{:0width$b}", outcome, width = num_qubits), count))
            .collect()
    }
}

/// Alias table for O(1) sampling from a discrete distribution
///
/// Uses the alias method (Walker's algorithm) over the populated outcomes
/// of a sparse distribution.
#[derive(Debug, Clone)]
pub struct AliasTable {
    /// Outcome value for each column
    outcomes: Vec<u64>,

    /// Probability threshold for each column
    prob: Vec<f64>,

    /// Alias column for each column
    alias: Vec<usize>,
}

impl AliasTable {
    /// Build a table from a map of outcome to probability
    ///
    /// Probabilities are rescaled by their sum, so slight drift is fine.
    ///
    /// # Errors
    /// Returns error if the distribution is empty or has no weight
    pub fn new(distribution: &BTreeMap<u64, f64>) -> Result<Self> {
        let total: f64 = distribution.values().sum();
        if distribution.is_empty() || total <= 0.0 {
            return Err(StateError::ZeroNorm);
        }

        let n = distribution.len();
        let outcomes: Vec<u64> = distribution.keys().copied().collect();
        let mut scaled: Vec<f64> = distribution
            .values()
            .map(|&p| p / total * n as f64)
            .collect();

        let mut prob = vec![0.0; n];
        let mut alias: Vec<usize> = (0..n).collect();

        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| scaled[i] < 1.0);

        while let (Some(s), Some(l)) = (small.pop(), large.pop()) {
            prob[s] = scaled[s];
            alias[s] = l;

            scaled[l] = (scaled[l] + scaled[s]) - 1.0;
            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // Leftovers from floating-point error keep their own column
        for i in small.into_iter().chain(large) {
            prob[i] = 1.0;
        }

        Ok(Self {
            outcomes,
            prob,
            alias,
        })
    }

    /// Number of populated outcomes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Sample an outcome in O(1) time, consuming two uniform draws
    pub fn sample(&self, rng: &mut dyn FnMut() -> f64) -> u64 {
        let n = self.prob.len();
        let column = ((rng() * n as f64) as usize).min(n - 1);

        if rng() < self.prob[column] {
            self.outcomes[column]
        } else {
            self.outcomes[self.alias[column]]
        }
    }

    /// Draw `shots` outcomes into a [`SamplingResult`]
    pub fn sample_many(&self, shots: usize, rng: &mut dyn FnMut() -> f64) -> SamplingResult {
        let mut result = SamplingResult::new(shots);
        for _ in 0..shots {
            result.add_outcome(self.sample(rng));
        }
        result
    }
}
