//! Top-N ranking
//!
//! One full pass over the dataset per call: peak filter, then missing-aware
//! cosine, then a stable descending sort truncated to `n`.

use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::peak::PeakFilter;
use crate::record::Record;
use crate::similarity::{similarity, DEFAULT_MIN_COMMON_DIMS};
use crate::vector::Shape;
use serde::Serialize;
use std::sync::Arc;

/// A record paired with its similarity to the query
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub record: Arc<Record>,
    pub score: f32,
    /// Peak axis as seen by the filter that admitted this record
    pub peak_axis: Option<usize>,
}

/// Counters describing one ranking pass.
///
/// `peak_excluded + incomparable + qualifying == dataset_size`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingStats {
    pub dataset_size: usize,
    pub peak_excluded: usize,
    pub incomparable: usize,
    pub qualifying: usize,
    pub returned: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f32>,
}

/// Up to N candidates in descending score order
#[derive(Debug, Clone, Default)]
pub struct RankedResult {
    pub candidates: Vec<ScoredCandidate>,
    pub stats: RankingStats,
    /// Recompute counter, stamped by the publisher; 0 for ad-hoc passes
    pub generation: u64,
}

impl RankedResult {
    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredCandidate> {
        self.candidates.iter()
    }

    #[must_use]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingConfig {
    pub min_common_dims: usize,
    pub flat_has_peak: bool,
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_common_dims: DEFAULT_MIN_COMMON_DIMS,
            flat_has_peak: false,
            top_n: crate::config::DEFAULT_TOP_N,
        }
    }
}

impl From<&EngineConfig> for RankingConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            min_common_dims: config.min_common_dims,
            flat_has_peak: config.flat_has_peak,
            top_n: config.top_n,
        }
    }
}

/// Peak filter + similarity over a whole dataset
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    config: RankingConfig,
    peaks: PeakFilter,
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self {
            config,
            peaks: PeakFilter::new().with_flat_peaks(config.flat_has_peak),
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Rank with the configured `top_n`
    pub fn rank<Q: Shape + ?Sized>(&self, query: &Q, dataset: &Dataset) -> RankedResult {
        self.top_n(query, dataset, self.config.top_n)
    }

    /// Rank every record against `query` and keep the best `n`.
    ///
    /// Records whose peak axis disagrees with the query's, or that are not
    /// comparable, are left out. Ties keep dataset order.
    pub fn top_n<Q: Shape + ?Sized>(&self, query: &Q, dataset: &Dataset, n: usize) -> RankedResult {
        let mut stats = RankingStats {
            dataset_size: dataset.len(),
            ..RankingStats::default()
        };

        let query_peak = self.peaks.peak_axis(query);
        let mut scored: Vec<ScoredCandidate> = Vec::with_capacity(dataset.len());

        for record in dataset.records() {
            let candidate_peak = self.peaks.peak_axis(&record.vector);
            if PeakFilter::excludes(query_peak, candidate_peak) {
                stats.peak_excluded += 1;
                continue;
            }
            match similarity(query, &record.vector, self.config.min_common_dims) {
                Some(score) => scored.push(ScoredCandidate {
                    record: Arc::clone(record),
                    score,
                    peak_axis: candidate_peak,
                }),
                None => stats.incomparable += 1,
            }
        }
        stats.qualifying = scored.len();

        // sort_by is stable, so equal scores keep dataset order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n);

        stats.returned = scored.len();
        stats.best_score = scored.first().map(|c| c.score);
        if !scored.is_empty() {
            stats.mean_score = Some(scored.iter().map(|c| c.score).sum::<f32>() / scored.len() as f32);
        }

        RankedResult {
            candidates: scored,
            stats,
            generation: 0,
        }
    }
}

/// Rank with default settings (two shared axes, flat shapes have no peak)
pub fn top_n<Q: Shape + ?Sized>(query: &Q, dataset: &Dataset, n: usize) -> RankedResult {
    RankingEngine::default().top_n(query, dataset, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;
    use crate::vector::{FeatureVector, QueryVector};

    fn dense(values: &[f32]) -> FeatureVector {
        FeatureVector::new(values.iter().map(|&x| Some(x)).collect())
    }

    fn dataset<S: AsRef<str>>(records: Vec<(S, FeatureVector)>) -> Dataset {
        let dim = records.first().map(|(_, v)| v.dim()).unwrap_or(6);
        let keys = (0..dim).map(|i| format!("shape_{}", i + 1)).collect();
        let records = records
            .into_iter()
            .map(|(id, v)| Record::new(id.as_ref(), id.as_ref().to_uppercase(), v))
            .collect();
        Dataset::new(keys, records).unwrap()
    }

    fn ids(result: &RankedResult) -> Vec<String> {
        result.iter().map(|c| c.record.id.to_string()).collect()
    }

    #[test]
    fn test_reference_scenario() {
        let data = dataset(vec![
            ("a", dense(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
            ("b", dense(&[0.9, 0.1, 0.0, 0.0, 0.0, 0.0])),
            ("c", dense(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0])),
        ]);
        let query = QueryVector::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let result = top_n(&query, &data, 2);
        assert_eq!(ids(&result), vec!["a", "b"]);
        assert!((result.candidates[0].score - 1.0).abs() < 1e-6);
        assert!((result.candidates[1].score - 0.99388).abs() < 1e-4);
        assert_eq!(result.stats.peak_excluded, 1);
    }

    #[test]
    fn test_peak_filter_beats_raw_cosine() {
        let data = dataset(vec![
            ("spiked_1", dense(&[0.9, 1.0, 0.85, 0.0, 0.0, 0.0])),
            ("spiked_0", dense(&[1.0, 0.1, 0.05, 0.0, 0.0, 0.0])),
        ]);
        let query = QueryVector::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let result = top_n(&query, &data, 10);
        assert_eq!(ids(&result), vec!["spiked_0"]);
    }

    #[test]
    fn test_never_exceeds_n() {
        let records: Vec<(String, FeatureVector)> = (0..20)
            .map(|i| {
                let x = 0.5 + i as f32 / 40.0;
                (format!("r{}", i), dense(&[x, 0.1, 0.1]))
            })
            .collect();
        let data = dataset(records);
        let query = QueryVector::new(vec![0.9, 0.1, 0.1]);

        assert_eq!(top_n(&query, &data, 5).len(), 5);
        assert_eq!(top_n(&query, &data, 50).len(), 20);
        assert!(top_n(&query, &data, 0).is_empty());
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let data = dataset(vec![
            ("low", dense(&[0.5, 0.5, 0.0])),
            ("tie_first", dense(&[1.0, 0.5, 0.0])),
            ("best", dense(&[1.0, 0.0, 0.0])),
            ("tie_second", dense(&[0.5, 0.25, 0.0])),
        ]);
        let query = QueryVector::new(vec![1.0, 0.0, 0.0]);

        let result = top_n(&query, &data, 10);
        assert_eq!(ids(&result), vec!["best", "tie_first", "tie_second", "low"]);
        for pair in result.candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_missing_cells_still_rank() {
        let partial = FeatureVector::new(vec![Some(0.9), None, Some(0.1), None, None, Some(0.0)]);
        let too_sparse = FeatureVector::new(vec![Some(0.9), None, None, None, None, None]);
        let data = dataset(vec![("partial", partial), ("sparse", too_sparse)]);
        let query = QueryVector::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let result = top_n(&query, &data, 10);
        assert_eq!(ids(&result), vec!["partial"]);
        assert_eq!(result.stats.incomparable, 1);
    }

    #[test]
    fn test_flat_query_keeps_every_peak() {
        let data = dataset(vec![
            ("a", dense(&[1.0, 0.0, 0.2])),
            ("b", dense(&[0.0, 1.0, 0.2])),
            ("c", dense(&[0.1, 0.2, 1.0])),
        ]);
        let query = QueryVector::midpoint(3);

        let result = top_n(&query, &data, 10);
        assert_eq!(result.len(), 3);
        assert_eq!(result.stats.peak_excluded, 0);

        let first_axis = RankingEngine::new(RankingConfig {
            flat_has_peak: true,
            ..RankingConfig::default()
        });
        assert_eq!(ids(&first_axis.top_n(&query, &data, 10)), vec!["a"]);
    }

    #[test]
    fn test_stats_account_for_every_record() {
        let data = dataset(vec![
            ("keep", dense(&[1.0, 0.2, 0.0])),
            ("other_peak", dense(&[0.0, 1.0, 0.0])),
            ("zero", dense(&[0.0, 0.0, 0.0])),
        ]);
        let query = QueryVector::new(vec![1.0, 0.0, 0.0]);

        let stats = top_n(&query, &data, 10).stats;
        assert_eq!(stats.dataset_size, 3);
        assert_eq!(stats.peak_excluded + stats.incomparable + stats.qualifying, 3);
        assert_eq!(stats.qualifying, 1);
        assert_eq!(stats.returned, 1);
        assert!(stats.best_score.is_some());
    }

    #[test]
    fn test_deterministic_and_non_mutating() {
        let data = dataset(vec![
            ("a", dense(&[0.8, 0.3, 0.1])),
            ("b", dense(&[0.7, 0.4, 0.2])),
        ]);
        let query = QueryVector::new(vec![0.9, 0.2, 0.1]);
        let before = query.clone();

        let first = top_n(&query, &data, 10);
        let second = top_n(&query, &data, 10);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(query, before);
        assert_eq!(data.get(&RecordId::from("a")).unwrap().vector.value(0), Some(0.8));
    }

    #[test]
    fn test_empty_dataset() {
        let data = Dataset::empty(vec!["a".to_string(), "b".to_string()]);
        let result = top_n(&QueryVector::midpoint(2), &data, 5);
        assert!(result.is_empty());
        assert_eq!(result.stats, RankingStats::default());
    }
}
