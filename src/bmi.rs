//! BMI computation
//!
//! Converts the form's height (cm) and weight (kg) inputs into the
//! body-mass-index feature the charges model was trained on.

/// Compute BMI from height in centimeters and weight in kilograms.
///
/// Non-positive height or weight yields 0.0, the "invalid/unset" sentinel.
/// The form ships with zeroable number inputs, so this soft-fails instead
/// of erroring and the prediction flow keeps going.
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_height_is_sentinel() {
        assert_eq!(calculate_bmi(0.0, 70.0), 0.0);
    }

    #[test]
    fn test_zero_weight_is_sentinel() {
        assert_eq!(calculate_bmi(170.0, 0.0), 0.0);
    }

    #[test]
    fn test_negative_inputs_are_sentinel() {
        assert_eq!(calculate_bmi(-170.0, 70.0), 0.0);
        assert_eq!(calculate_bmi(170.0, -70.0), 0.0);
    }

    #[test]
    fn test_reference_value() {
        // 70 kg at 1.70 m
        assert_relative_eq!(calculate_bmi(170.0, 70.0), 24.221453, epsilon = 1e-4);
    }

    #[test]
    fn test_scales_linearly_with_weight() {
        let base = calculate_bmi(180.0, 60.0);
        assert!(base > 0.0);
        assert_relative_eq!(calculate_bmi(180.0, 120.0), base * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scales_inversely_with_height_squared() {
        let base = calculate_bmi(150.0, 80.0);
        assert_relative_eq!(calculate_bmi(300.0, 80.0), base / 4.0, epsilon = 1e-9);
    }
}
