//! Serializable views of ranked results
//!
//! Consumers such as render layers or the CLI host read these snapshots; they
//! carry the per-entry peak axis so a chart can highlight the dominant feature.

use crate::rank::{RankedResult, RankingStats, ScoredCandidate};
use crate::record::RecordId;
use crate::vector::FeatureVector;
use serde::Serialize;
use serde_json::Value;

/// One ranked entry
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    /// 1-based position in the result
    pub rank: usize,
    pub id: RecordId,
    pub name: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_axis: Option<usize>,
    pub vector: FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

impl RankedEntry {
    pub fn from_candidate(rank: usize, candidate: &ScoredCandidate, include_attributes: bool) -> Self {
        let record = &candidate.record;
        Self {
            rank,
            id: record.id.clone(),
            name: record.name.clone(),
            score: candidate.score,
            peak_axis: candidate.peak_axis,
            vector: record.vector.clone(),
            attributes: if include_attributes { record.attributes.clone() } else { None },
        }
    }
}

/// Response body for a published result set
#[derive(Debug, Clone, Serialize)]
pub struct RankedResponse {
    pub generation: u64,
    pub result: Vec<RankedEntry>,
    pub stats: RankingStats,
}

impl RankedResponse {
    pub fn from_ranked(ranked: &RankedResult, include_attributes: bool) -> Self {
        Self {
            generation: ranked.generation,
            result: ranked
                .iter()
                .enumerate()
                .map(|(i, c)| RankedEntry::from_candidate(i + 1, c, include_attributes))
                .collect(),
            stats: ranked.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::rank::{top_n, RankingConfig, RankingEngine};
    use crate::record::Record;
    use crate::vector::QueryVector;
    use serde_json::json;

    fn ranked() -> RankedResult {
        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let records = vec![
            Record::new("x", "Ex", FeatureVector::new(vec![Some(0.9), Some(0.1), None]))
                .with_attributes(json!({"lat": 36.2})),
            Record::new("y", "Why", FeatureVector::new(vec![Some(1.0), Some(0.5), Some(0.2)])),
        ];
        let dataset = Dataset::new(keys, records).unwrap();
        top_n(&QueryVector::new(vec![1.0, 0.1, 0.0]), &dataset, 10).with_generation(4)
    }

    #[test]
    fn test_response_entries_are_ranked_from_one() {
        let response = RankedResponse::from_ranked(&ranked(), true);
        assert_eq!(response.generation, 4);
        assert_eq!(response.result.len(), 2);
        assert_eq!(response.result[0].rank, 1);
        assert_eq!(response.result[0].id, RecordId::from("x"));
        assert_eq!(response.result[0].peak_axis, Some(0));
        assert_eq!(response.result[0].attributes, Some(json!({"lat": 36.2})));
        assert_eq!(response.stats.returned, 2);
    }

    #[test]
    fn test_response_without_attributes() {
        let response = RankedResponse::from_ranked(&ranked(), false);
        assert!(response.result.iter().all(|e| e.attributes.is_none()));
    }

    #[test]
    fn test_entry_peak_follows_engine_setting() {
        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let records = vec![Record::new(
            "flat",
            "Flat",
            FeatureVector::new(vec![Some(0.4), Some(0.4), Some(0.4)]),
        )];
        let dataset = Dataset::new(keys, records).unwrap();
        let query = QueryVector::new(vec![0.5, 0.5, 0.5]);

        let default = RankedResponse::from_ranked(&top_n(&query, &dataset, 10), false);
        assert_eq!(default.result[0].peak_axis, None);

        let engine = RankingEngine::new(RankingConfig {
            flat_has_peak: true,
            ..RankingConfig::default()
        });
        let flat_peaks = RankedResponse::from_ranked(&engine.top_n(&query, &dataset, 10), false);
        assert_eq!(flat_peaks.result[0].peak_axis, Some(0));
    }

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_value(RankedResponse::from_ranked(&ranked(), false)).unwrap();
        assert_eq!(json["result"][0]["name"], "Ex");
        assert_eq!(json["result"][0]["vector"].as_array().map(Vec::len), Some(3));
        assert!(json["result"][0]["vector"][2].is_null());
        assert_eq!(json["stats"]["dataset_size"], 2);
        assert!(json["result"][0].get("attributes").is_none());
    }
}
