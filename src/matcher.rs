use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::catalog::{MacroProfile, RecipeRecord};
use crate::search::{KnnIndex, MinMaxScaler};
use crate::targets::{MacroWeights, TargetProfile, ValidationError};

// The nearest-neighbor lookup fetches more candidates than requested so
// dedup losses don't leave the result short.
const KNN_OVERFETCH: usize = 4;

/// Ranking strategy. Both variants feed the same dedup/top-N selection,
/// so callers can swap one for the other without downstream changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Per-macro weighted absolute deviation over the raw macro values.
    WeightedDeviation,
    /// Euclidean distance in min-max scaled feature space.
    NearestNeighbor,
}

/// One ranked result. `score` is lower-is-better under both strategies:
/// a weighted deviation sum or a scaled-space distance.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RankedMatch {
    pub name: String,
    pub url: String,
    pub image: String,
    pub macros: MacroProfile,
    pub score: f32,
}

/// Sums the weighted absolute deviation between a recipe's macros and the
/// target, per macro.
pub fn weighted_deviation(
    profile: &MacroProfile,
    target: &MacroProfile,
    weights: &MacroWeights,
) -> f32 {
    weights.calories * (profile.calories - target.calories).abs()
        + weights.protein * (profile.protein - target.protein).abs()
        + weights.carbs * (profile.carbs - target.carbs).abs()
        + weights.fats * (profile.fats - target.fats).abs()
}

/// Walks score-ascending candidates, keeps the first occurrence of each
/// distinct recipe name, and stops at `top_n` matches. Shared by both
/// strategies; `scored` pairs a catalog index with its score.
pub fn select_top_n(
    records: &[RecipeRecord],
    scored: &[(usize, f32)],
    top_n: usize,
) -> Vec<RankedMatch> {
    let mut seen_names = HashSet::new();
    let mut results = Vec::new();

    for &(idx, score) in scored {
        if results.len() == top_n {
            break;
        }
        let record = &records[idx];
        let macros = match record.macros {
            Some(macros) => macros,
            None => continue,
        };
        if !seen_names.insert(record.name.clone()) {
            continue;
        }
        results.push(RankedMatch {
            name: record.name.clone(),
            url: record.url.clone(),
            image: record.image.clone(),
            macros,
            score,
        });
    }

    results
}

/// The matching engine over an immutable recipe catalog.
///
/// Built once at startup: records with unparseable nutrient data are set
/// aside, the min-max scaler is fitted over the rest, and the scaled
/// vectors go into the nearest-neighbor matrix. After that every query
/// only reads, so an index shared across threads needs no synchronization.
pub struct MatcherIndex {
    records: Vec<RecipeRecord>,
    valid: Vec<(usize, MacroProfile)>,
    scaler: MinMaxScaler,
    knn: KnnIndex,
    weights: MacroWeights,
}

impl MatcherIndex {
    pub fn new(records: Vec<RecipeRecord>, weights: MacroWeights) -> Result<Self, ValidationError> {
        weights.validate()?;

        println!("Building recipe matcher index...");
        let valid: Vec<(usize, MacroProfile)> = records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| record.macros.map(|macros| (idx, macros)))
            .collect();
        println!(
            " > {} catalog records, {} with parseable macros.",
            records.len(),
            valid.len()
        );

        let profiles: Vec<MacroProfile> = valid.iter().map(|&(_, macros)| macros).collect();
        let scaler = MinMaxScaler::fit(&profiles);

        let mut knn = KnnIndex::new();
        for &(idx, macros) in &valid {
            knn.add(idx, scaler.transform(&macros));
        }
        println!(" > Scaler fitted, {} vectors indexed.", knn.len());

        Ok(Self {
            records,
            valid,
            scaler,
            knn,
            weights,
        })
    }

    /// Ranks the catalog against a per-meal target and returns at most
    /// `top_n` uniquely named matches, ascending by score. An empty
    /// catalog (or one with no parseable records) yields an empty vector,
    /// not an error.
    pub fn rank(
        &self,
        target: &TargetProfile,
        top_n: usize,
        strategy: MatchStrategy,
    ) -> Result<Vec<RankedMatch>, ValidationError> {
        if top_n == 0 {
            return Err(ValidationError::InvalidTopN(top_n));
        }

        let scored = match strategy {
            MatchStrategy::WeightedDeviation => self.scan_weighted_deviation(target),
            MatchStrategy::NearestNeighbor => self.query_nearest(target, top_n),
        };

        Ok(select_top_n(&self.records, &scored, top_n))
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn valid_record_count(&self) -> usize {
        self.valid.len()
    }

    fn scan_weighted_deviation(&self, target: &TargetProfile) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .valid
            .par_iter()
            .map(|&(idx, macros)| (idx, weighted_deviation(&macros, &target.macros, &self.weights)))
            .collect();

        // Scores are finite here (validated weights, validated target,
        // parsed macros), so partial_cmp cannot actually fall through; the
        // catalog-index tie-break keeps the order deterministic either way.
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored
    }

    fn query_nearest(&self, target: &TargetProfile, top_n: usize) -> Vec<(usize, f32)> {
        let k = top_n.saturating_mul(KNN_OVERFETCH);
        let query = self.scaler.transform(&target.macros);
        self.knn
            .query(query, k)
            .into_iter()
            .map(|neighbor| (neighbor.id, neighbor.distance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, macros: Option<MacroProfile>) -> RecipeRecord {
        RecipeRecord {
            name: name.to_string(),
            url: format!("https://example.com/{}", name.replace(' ', "-")),
            image: String::new(),
            macros,
        }
    }

    fn profile(calories: f32, protein: f32, carbs: f32, fats: f32) -> MacroProfile {
        MacroProfile {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    fn target(calories: f32, protein: f32, carbs: f32, fats: f32) -> TargetProfile {
        TargetProfile::new(profile(calories, protein, carbs, fats)).unwrap()
    }

    #[test]
    fn test_weighted_deviation_perfect_match_is_zero() {
        let macros = profile(400.0, 30.0, 40.0, 12.0);
        assert_eq!(
            weighted_deviation(&macros, &macros, &MacroWeights::default()),
            0.0
        );
    }

    #[test]
    fn test_weighted_deviation_applies_weights_per_macro() {
        let macros = profile(410.0, 28.0, 45.0, 15.0);
        let target = profile(400.0, 30.0, 40.0, 12.0);
        let weights = MacroWeights::default();
        // 1.0*10 + 0.5*2 + 1.0*5 + 2.0*3 = 22
        assert_eq!(weighted_deviation(&macros, &target, &weights), 22.0);
    }

    #[test]
    fn test_select_top_n_dedups_by_name() {
        let records = vec![
            record("Omelette", Some(profile(300.0, 20.0, 2.0, 22.0))),
            record("Omelette", Some(profile(350.0, 24.0, 3.0, 25.0))),
            record("Porridge", Some(profile(250.0, 8.0, 40.0, 6.0))),
        ];
        let scored = vec![(0, 1.0), (1, 2.0), (2, 3.0)];

        let results = select_top_n(&records, &scored, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Omelette");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].name, "Porridge");
    }

    #[test]
    fn test_select_top_n_truncates() {
        let records = vec![
            record("A", Some(profile(1.0, 1.0, 1.0, 1.0))),
            record("B", Some(profile(2.0, 2.0, 2.0, 2.0))),
            record("C", Some(profile(3.0, 3.0, 3.0, 3.0))),
        ];
        let scored = vec![(0, 0.1), (1, 0.2), (2, 0.3)];

        let results = select_top_n(&records, &scored, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "A");
        assert_eq!(results[1].name, "B");
    }

    #[test]
    fn test_rank_orders_by_closeness() -> Result<(), ValidationError> {
        let records = vec![
            record("Far", Some(profile(900.0, 80.0, 120.0, 40.0))),
            record("Close", Some(profile(405.0, 29.0, 41.0, 12.0))),
            record("Exact", Some(profile(400.0, 30.0, 40.0, 12.0))),
        ];
        let index = MatcherIndex::new(records, MacroWeights::default())?;
        let target = target(400.0, 30.0, 40.0, 12.0);

        for strategy in [MatchStrategy::WeightedDeviation, MatchStrategy::NearestNeighbor] {
            let results = index.rank(&target, 3, strategy)?;
            assert_eq!(results.len(), 3);
            assert_eq!(results[0].name, "Exact");
            assert_eq!(results[1].name, "Close");
            assert_eq!(results[2].name, "Far");
            assert!(results[0].score <= results[1].score);
            assert!(results[1].score <= results[2].score);
        }
        Ok(())
    }

    #[test]
    fn test_rank_excludes_records_without_macros() -> Result<(), ValidationError> {
        let records = vec![
            record("Unparseable", None),
            record("Valid", Some(profile(400.0, 30.0, 40.0, 12.0))),
        ];
        let index = MatcherIndex::new(records, MacroWeights::default())?;
        assert_eq!(index.record_count(), 2);
        assert_eq!(index.valid_record_count(), 1);

        let results = index.rank(&target(400.0, 30.0, 40.0, 12.0), 10, MatchStrategy::WeightedDeviation)?;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Valid");
        Ok(())
    }

    #[test]
    fn test_rank_rejects_zero_top_n() -> Result<(), ValidationError> {
        let index = MatcherIndex::new(Vec::new(), MacroWeights::default())?;
        let result = index.rank(&target(100.0, 10.0, 10.0, 5.0), 0, MatchStrategy::WeightedDeviation);
        assert_eq!(result, Err(ValidationError::InvalidTopN(0)));
        Ok(())
    }

    #[test]
    fn test_rank_empty_catalog_yields_empty_result() -> Result<(), ValidationError> {
        let index = MatcherIndex::new(Vec::new(), MacroWeights::default())?;
        for strategy in [MatchStrategy::WeightedDeviation, MatchStrategy::NearestNeighbor] {
            let results = index.rank(&target(100.0, 10.0, 10.0, 5.0), 10, strategy)?;
            assert!(results.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_new_rejects_invalid_weights() {
        let weights = MacroWeights {
            protein: f32::NAN,
            ..Default::default()
        };
        assert!(MatcherIndex::new(Vec::new(), weights).is_err());
    }

    #[test]
    fn test_deviation_ties_break_by_catalog_order() -> Result<(), ValidationError> {
        // Same macros, different names: identical scores.
        let macros = profile(300.0, 20.0, 30.0, 10.0);
        let records = vec![
            record("First", Some(macros)),
            record("Second", Some(macros)),
        ];
        let index = MatcherIndex::new(records, MacroWeights::default())?;

        let results = index.rank(&target(100.0, 10.0, 10.0, 5.0), 2, MatchStrategy::WeightedDeviation)?;
        assert_eq!(results[0].name, "First");
        assert_eq!(results[1].name, "Second");
        Ok(())
    }
}
