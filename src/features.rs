//! Patient input types and feature encoding
//!
//! Converts raw form/API inputs into the exact ordered, one-hot-encoded
//! feature vector the charges model was trained on. The column order is
//! fixed in [`FeatureVector::COLUMNS`]; the model loader checks its
//! artifact against it, since a silent reorder would corrupt every
//! prediction without any visible failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::bmi::calculate_bmi;

/// The region encoded as all-zero flags (one-hot baseline category).
///
/// The training pipeline dropped the first region level, so "northeast"
/// has no indicator column of its own.
pub const BASELINE_REGION: &str = "northeast";

/// Raw input could not be mapped to a known category.
#[derive(Debug, Error)]
pub enum ParseInputError {
    #[error("unknown sex '{0}' (expected 'male' or 'female')")]
    UnknownSex(String),
    #[error("unknown smoker value '{0}' (expected 'yes' or 'no')")]
    UnknownSmoker(String),
    #[error("unknown region '{0}' (expected northeast, northwest, southeast or southwest)")]
    UnknownRegion(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Err(ParseInputError::UnknownSex(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoker {
    Yes,
    No,
}

impl FromStr for Smoker {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(Smoker::Yes),
            "no" => Ok(Smoker::No),
            _ => Err(ParseInputError::UnknownSmoker(s.to_string())),
        }
    }
}

/// Residential region of the patient.
///
/// Unrecognized strings are rejected here at the boundary rather than
/// silently encoded as the baseline, so an input typo cannot masquerade
/// as a northeast patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl FromStr for Region {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "northeast" => Ok(Region::Northeast),
            "northwest" => Ok(Region::Northwest),
            "southeast" => Ok(Region::Southeast),
            "southwest" => Ok(Region::Southwest),
            _ => Err(ParseInputError::UnknownRegion(s.to_string())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Northeast => "northeast",
            Region::Northwest => "northwest",
            Region::Southeast => "southeast",
            Region::Southwest => "southwest",
        };
        f.write_str(name)
    }
}

/// One prediction request worth of patient attributes.
///
/// Transient: built per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: u32,
    pub sex: Sex,
    pub smoker: Smoker,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub children: u32,
    pub region: Region,
}

impl PatientInput {
    /// Derive BMI and encode the full feature vector.
    pub fn features(&self) -> FeatureVector {
        let bmi = calculate_bmi(self.height_cm, self.weight_kg);
        build_features(self.age, bmi, self.children, self.sex, self.smoker, self.region)
    }
}

/// Encoded model input: 8 numeric fields in training column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub age: f64,
    pub bmi: f64,
    pub children: f64,
    pub sex_male: f64,
    pub smoker_yes: f64,
    pub region_northwest: f64,
    pub region_southeast: f64,
    pub region_southwest: f64,
}

impl FeatureVector {
    /// Training-time column order. Must match the model artifact exactly.
    pub const COLUMNS: [&'static str; 8] = [
        "age",
        "bmi",
        "children",
        "sex_male",
        "smoker_yes",
        "region_northwest",
        "region_southeast",
        "region_southwest",
    ];

    /// Values in [`Self::COLUMNS`] order.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.age,
            self.bmi,
            self.children,
            self.sex_male,
            self.smoker_yes,
            self.region_northwest,
            self.region_southeast,
            self.region_southwest,
        ]
    }
}

/// Encode raw inputs into the fixed-order feature vector.
///
/// One-hot scheme: `sex_male` / `smoker_yes` binary indicators, one flag
/// per non-baseline region. [`Region::Northeast`] encodes as all three
/// region flags 0 (see [`BASELINE_REGION`]). No range validation is done
/// on `age` or `children`; out-of-range values pass through unchanged.
pub fn build_features(
    age: u32,
    bmi: f64,
    children: u32,
    sex: Sex,
    smoker: Smoker,
    region: Region,
) -> FeatureVector {
    FeatureVector {
        age: age as f64,
        bmi,
        children: children as f64,
        sex_male: if sex == Sex::Male { 1.0 } else { 0.0 },
        smoker_yes: if smoker == Smoker::Yes { 1.0 } else { 0.0 },
        region_northwest: if region == Region::Northwest { 1.0 } else { 0.0 },
        region_southeast: if region == Region::Southeast { 1.0 } else { 0.0 },
        region_southwest: if region == Region::Southwest { 1.0 } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_male_smoker_northwest() {
        let fv = build_features(30, 25.0, 2, Sex::Male, Smoker::Yes, Region::Northwest);
        assert_eq!(fv.age, 30.0);
        assert_eq!(fv.bmi, 25.0);
        assert_eq!(fv.children, 2.0);
        assert_eq!(fv.sex_male, 1.0);
        assert_eq!(fv.smoker_yes, 1.0);
        assert_eq!(fv.region_northwest, 1.0);
        assert_eq!(fv.region_southeast, 0.0);
        assert_eq!(fv.region_southwest, 0.0);
    }

    #[test]
    fn test_baseline_region_encodes_all_zero() {
        let fv = build_features(40, 22.0, 0, Sex::Female, Smoker::No, Region::Northeast);
        assert_eq!(fv.region_northwest, 0.0);
        assert_eq!(fv.region_southeast, 0.0);
        assert_eq!(fv.region_southwest, 0.0);
        assert_eq!(fv.sex_male, 0.0);
        assert_eq!(fv.smoker_yes, 0.0);
    }

    #[test]
    fn test_at_most_one_region_flag() {
        for region in [
            Region::Northeast,
            Region::Northwest,
            Region::Southeast,
            Region::Southwest,
        ] {
            let fv = build_features(50, 30.0, 1, Sex::Male, Smoker::No, region);
            let flags = fv.region_northwest + fv.region_southeast + fv.region_southwest;
            assert!(flags <= 1.0, "region {:?} set {} flags", region, flags);
        }
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let a = build_features(30, 25.0, 2, Sex::Male, Smoker::Yes, Region::Southeast);
        let b = build_features(30, 25.0, 2, Sex::Male, Smoker::Yes, Region::Southeast);
        assert_eq!(a, b);
    }

    #[test]
    fn test_column_order_is_fixed() {
        assert_eq!(
            FeatureVector::COLUMNS,
            [
                "age",
                "bmi",
                "children",
                "sex_male",
                "smoker_yes",
                "region_northwest",
                "region_southeast",
                "region_southwest",
            ]
        );
        // as_array follows the same order regardless of values
        let fv = build_features(1, 2.0, 3, Sex::Male, Smoker::Yes, Region::Southwest);
        assert_eq!(fv.as_array(), [1.0, 2.0, 3.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_passes_through() {
        let fv = build_features(300, -4.0, 12, Sex::Female, Smoker::No, Region::Northeast);
        assert_eq!(fv.age, 300.0);
        assert_eq!(fv.bmi, -4.0);
        assert_eq!(fv.children, 12.0);
    }

    #[test]
    fn test_region_parse_rejects_unknown() {
        assert!("northeast".parse::<Region>().is_ok());
        assert!("Northwest".parse::<Region>().is_ok());
        assert!("norhteast".parse::<Region>().is_err());
        assert!("".parse::<Region>().is_err());
    }

    #[test]
    fn test_patient_input_features_derives_bmi() {
        let input = PatientInput {
            age: 25,
            sex: Sex::Male,
            smoker: Smoker::No,
            height_cm: 170.0,
            weight_kg: 70.0,
            children: 0,
            region: Region::Southeast,
        };
        let fv = input.features();
        assert!((fv.bmi - 24.2214).abs() < 1e-3);
        assert_eq!(fv.region_southeast, 1.0);
    }

    #[test]
    fn test_zero_height_flows_as_zero_bmi() {
        let input = PatientInput {
            age: 25,
            sex: Sex::Female,
            smoker: Smoker::No,
            height_cm: 0.0,
            weight_kg: 70.0,
            children: 0,
            region: Region::Northeast,
        };
        assert_eq!(input.features().bmi, 0.0);
    }
}
