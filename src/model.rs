//! Serialized charges model
//!
//! Loads the gradient-boosted tree ensemble exported by the training
//! pipeline and evaluates it over an encoded [`FeatureVector`]. The
//! artifact is plain JSON: feature column order, a base score, and a
//! list of binary decision trees whose leaf values sum to the raw
//! prediction. The model was trained on log(charges), so callers wanting
//! USD use [`ChargesModel::predict_charges`].
//!
//! Loaded once at startup and shared read-only for the process lifetime.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::features::FeatureVector;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model artifact columns {found:?} do not match expected {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("tree references feature index {index}, but only {n_features} features exist")]
    FeatureIndexOutOfRange { index: usize, n_features: usize },
}

/// One node of a binary decision tree.
///
/// Untagged: a node with `feature`/`threshold`/`left`/`right` is a split,
/// a node with only `value` is a leaf.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: f64,
    },
}

impl TreeNode {
    /// Walk to a leaf. Splits send `feature <= threshold` left.
    fn evaluate(&self, row: &[f64; 8]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.evaluate(row)
                } else {
                    right.evaluate(row)
                }
            }
        }
    }

    fn max_feature_index(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => (*feature)
                .max(left.max_feature_index())
                .max(right.max_feature_index()),
        }
    }
}

/// Pre-trained regression model over the 8-column patient schema.
#[derive(Debug, Deserialize)]
pub struct ChargesModel {
    feature_names: Vec<String>,
    base_score: f64,
    trees: Vec<TreeNode>,
}

impl ChargesModel {
    /// Load the model artifact from disk.
    ///
    /// Rejects artifacts whose column order differs from
    /// [`FeatureVector::COLUMNS`]: a reordered schema would not fail at
    /// predict time, it would just produce silently wrong numbers.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let contents = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let model: ChargesModel = serde_json::from_str(&contents)?;
        model.validate()?;
        Ok(model)
    }

    /// Parse a model from an in-memory JSON string (used by tests).
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: ChargesModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names != FeatureVector::COLUMNS {
            return Err(ModelError::ColumnMismatch {
                expected: FeatureVector::COLUMNS.iter().map(|s| s.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }

        let n_features = self.feature_names.len();
        for tree in &self.trees {
            let max_index = tree.max_feature_index();
            if max_index >= n_features {
                return Err(ModelError::FeatureIndexOutOfRange {
                    index: max_index,
                    n_features,
                });
            }
        }

        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw model output, on the log(charges) scale.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let row = features.as_array();
        self.base_score + self.trees.iter().map(|t| t.evaluate(&row)).sum::<f64>()
    }

    /// Predicted annual medical cost in USD: `exp` of the raw output.
    pub fn predict_charges(&self, features: &FeatureVector) -> f64 {
        self.predict(features).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build_features, Region, Sex, Smoker};
    use approx::assert_relative_eq;

    fn columns_json() -> String {
        serde_json::to_string(&FeatureVector::COLUMNS).unwrap()
    }

    /// Base score only, no trees.
    fn constant_model(base: f64) -> ChargesModel {
        let json = format!(
            r#"{{"feature_names": {}, "base_score": {}, "trees": []}}"#,
            columns_json(),
            base
        );
        ChargesModel::from_json(&json).unwrap()
    }

    /// Single split on smoker_yes (index 4).
    fn smoker_model() -> ChargesModel {
        let json = format!(
            r#"{{
                "feature_names": {},
                "base_score": 8.0,
                "trees": [
                    {{
                        "feature": 4,
                        "threshold": 0.5,
                        "left": {{"value": 0.0}},
                        "right": {{"value": 1.2}}
                    }}
                ]
            }}"#,
            columns_json()
        );
        ChargesModel::from_json(&json).unwrap()
    }

    #[test]
    fn test_constant_model_predicts_base_score() {
        let model = constant_model(9.3);
        let fv = build_features(25, 24.2, 0, Sex::Female, Smoker::No, Region::Northeast);
        assert_relative_eq!(model.predict(&fv), 9.3);
        assert_relative_eq!(model.predict_charges(&fv), 9.3_f64.exp());
    }

    #[test]
    fn test_smoker_split_routes_correctly() {
        let model = smoker_model();
        let non_smoker = build_features(40, 28.0, 1, Sex::Male, Smoker::No, Region::Southwest);
        let smoker = build_features(40, 28.0, 1, Sex::Male, Smoker::Yes, Region::Southwest);

        assert_relative_eq!(model.predict(&non_smoker), 8.0);
        assert_relative_eq!(model.predict(&smoker), 9.2);
        assert!(model.predict_charges(&smoker) > model.predict_charges(&non_smoker));
    }

    #[test]
    fn test_tree_outputs_sum() {
        let json = format!(
            r#"{{
                "feature_names": {},
                "base_score": 1.0,
                "trees": [{{"value": 0.5}}, {{"value": 0.25}}]
            }}"#,
            columns_json()
        );
        let model = ChargesModel::from_json(&json).unwrap();
        let fv = build_features(30, 25.0, 2, Sex::Male, Smoker::Yes, Region::Northwest);
        assert_relative_eq!(model.predict(&fv), 1.75);
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let json = r#"{
            "feature_names": ["bmi", "age", "children", "sex_male", "smoker_yes",
                              "region_northwest", "region_southeast", "region_southwest"],
            "base_score": 0.0,
            "trees": []
        }"#;
        match ChargesModel::from_json(json) {
            Err(ModelError::ColumnMismatch { .. }) => {}
            other => panic!("expected ColumnMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_feature_index_out_of_range_rejected() {
        let json = format!(
            r#"{{
                "feature_names": {},
                "base_score": 0.0,
                "trees": [
                    {{
                        "feature": 9,
                        "threshold": 0.5,
                        "left": {{"value": 0.0}},
                        "right": {{"value": 1.0}}
                    }}
                ]
            }}"#,
            columns_json()
        );
        assert!(matches!(
            ChargesModel::from_json(&json),
            Err(ModelError::FeatureIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_artifact_reports_path() {
        let err = ChargesModel::load(Path::new("no/such/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Read { .. }));
        assert!(err.to_string().contains("no/such/model.json"));
    }
}
