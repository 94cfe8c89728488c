use crate::catalog::MacroProfile;

/// Macro vectors are 4-dimensional: calories, protein, carbs, fats.
pub const FEATURE_DIMENSION: usize = 4;

// Spans below this are treated as degenerate (all catalog values equal).
const DEGENERATE_SPAN: f32 = 1e-6;

/// Min-max scaler over the catalog's macro values.
///
/// Fitted once at index build time and reused for every query transform;
/// the nearest-neighbor strategy is only meaningful when catalog and
/// query vectors share the same feature space.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    mins: [f32; FEATURE_DIMENSION],
    maxs: [f32; FEATURE_DIMENSION],
}

impl MinMaxScaler {
    /// Computes per-macro min and max across the given profiles. Callers
    /// pass valid profiles only; records without macros are excluded
    /// upstream.
    pub fn fit(profiles: &[MacroProfile]) -> Self {
        let mut mins = [0.0_f32; FEATURE_DIMENSION];
        let mut maxs = [0.0_f32; FEATURE_DIMENSION];

        for (i, profile) in profiles.iter().enumerate() {
            let values = profile.as_array();
            if i == 0 {
                mins = values;
                maxs = values;
                continue;
            }
            for dim in 0..FEATURE_DIMENSION {
                mins[dim] = mins[dim].min(values[dim]);
                maxs[dim] = maxs[dim].max(values[dim]);
            }
        }

        Self { mins, maxs }
    }

    /// Maps each macro into [0,1] using the fitted range. Query values
    /// outside the fitted range clamp to the boundary; a degenerate macro
    /// (min == max across the catalog) maps to 0 for every input.
    pub fn transform(&self, profile: &MacroProfile) -> [f32; FEATURE_DIMENSION] {
        let values = profile.as_array();
        let mut scaled = [0.0_f32; FEATURE_DIMENSION];
        for dim in 0..FEATURE_DIMENSION {
            let span = self.maxs[dim] - self.mins[dim];
            if span > DEGENERATE_SPAN {
                scaled[dim] = ((values[dim] - self.mins[dim]) / span).clamp(0.0, 1.0);
            }
        }
        scaled
    }

    /// Undoes [`transform`](Self::transform) for in-range values.
    /// Degenerate macros invert to the fitted minimum.
    pub fn inverse(&self, scaled: &[f32; FEATURE_DIMENSION]) -> MacroProfile {
        let mut values = [0.0_f32; FEATURE_DIMENSION];
        for dim in 0..FEATURE_DIMENSION {
            let span = self.maxs[dim] - self.mins[dim];
            values[dim] = if span > DEGENERATE_SPAN {
                self.mins[dim] + scaled[dim] * span
            } else {
                self.mins[dim]
            };
        }
        MacroProfile {
            calories: values[0],
            protein: values[1],
            carbs: values[2],
            fats: values[3],
        }
    }
}
