use crate::checker::{CheckError, CheckResult, MAX_CONFIDENCE};

/// Share of sampled artifacts that must show the practice
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// Lowest confidence a passing ratio can map to
pub const PASS_CONFIDENCE_FLOOR: u8 = 5;

fn normalize_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        1.0
    } else {
        threshold.clamp(f64::MIN_POSITIVE, 1.0)
    }
}

/// Map an observed ratio onto the confidence scale.
///
/// `ratio` is clamped to `[0, 1]` and `threshold` to `(0, 1]`.
pub fn proportional_confidence(ratio: f64, threshold: f64) -> u8 {
    let threshold = normalize_threshold(threshold);
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let floor = f64::from(PASS_CONFIDENCE_FLOOR);

    if ratio < threshold {
        let scaled = (ratio / threshold * floor).floor() as u8;
        return scaled.min(PASS_CONFIDENCE_FLOOR - 1);
    }

    let span = 1.0 - threshold;
    if span <= 0.0 {
        return MAX_CONFIDENCE;
    }
    let headroom = f64::from(MAX_CONFIDENCE - PASS_CONFIDENCE_FLOOR);
    let above = ((ratio - threshold) / span * headroom).floor() as u8;
    (PASS_CONFIDENCE_FLOOR + above).min(MAX_CONFIDENCE)
}

/// Pass iff `numerator / denominator >= threshold`.
///
/// Callers are expected to return an inconclusive result themselves when
/// there is nothing to sample; a zero `denominator` still yields an
/// inconclusive result here rather than a division by zero.
pub fn proportional_result(
    name: &str,
    numerator: usize,
    denominator: usize,
    threshold: f64,
) -> CheckResult {
    if denominator == 0 {
        return CheckResult::inconclusive(name, CheckError::NoEligibleObservations("observations"));
    }

    let threshold = normalize_threshold(threshold);
    let ratio = numerator.min(denominator) as f64 / denominator as f64;
    let confidence = proportional_confidence(ratio, threshold);

    if ratio >= threshold {
        CheckResult::pass(name, confidence)
    } else {
        CheckResult::fail(name, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Verdict, MIN_CONFIDENCE};

    #[test]
    fn test_majority_approved_passes() {
        // 10 merged, 8 approved
        let result = proportional_result("Code-Review", 8, 10, DEFAULT_THRESHOLD);
        assert_eq!(result.verdict(), Verdict::Pass);
        assert!(result.confidence >= PASS_CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_minority_approved_fails() {
        // 5 merged, 3 approved
        let result = proportional_result("Code-Review", 3, 5, DEFAULT_THRESHOLD);
        assert_eq!(result.verdict(), Verdict::Fail);
        assert!(result.confidence < PASS_CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(proportional_confidence(0.0, DEFAULT_THRESHOLD), MIN_CONFIDENCE);
        assert_eq!(proportional_confidence(1.0, DEFAULT_THRESHOLD), MAX_CONFIDENCE);
        assert_eq!(
            proportional_confidence(DEFAULT_THRESHOLD, DEFAULT_THRESHOLD),
            PASS_CONFIDENCE_FLOOR
        );
        assert_eq!(proportional_confidence(1.0, 1.0), MAX_CONFIDENCE);
    }

    #[test]
    fn test_zero_numerator_is_floor_fail() {
        let result = proportional_result("Code-Review", 0, 12, DEFAULT_THRESHOLD);
        assert_eq!(result.verdict(), Verdict::Fail);
        assert_eq!(result.confidence, MIN_CONFIDENCE);
    }

    #[test]
    fn test_zero_denominator_is_inconclusive() {
        let result = proportional_result("Code-Review", 0, 0, DEFAULT_THRESHOLD);
        assert!(result.is_inconclusive());
    }

    #[test]
    fn test_numerator_above_denominator_is_capped() {
        let result = proportional_result("Code-Review", 15, 10, DEFAULT_THRESHOLD);
        assert!(result.is_definitive_pass());
        assert_eq!(result.confidence, MAX_CONFIDENCE);
    }

    #[test]
    fn test_pass_iff_ratio_meets_threshold_and_monotonic() {
        for threshold in [0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
            for denominator in 1..=25usize {
                let mut previous = MIN_CONFIDENCE;
                for numerator in 0..=denominator {
                    let result = proportional_result("p", numerator, denominator, threshold);
                    let ratio = numerator as f64 / denominator as f64;

                    assert_eq!(
                        result.pass,
                        ratio >= threshold,
                        "{numerator}/{denominator} at {threshold}"
                    );
                    assert!(result.confidence <= MAX_CONFIDENCE);
                    assert!(
                        result.confidence >= previous,
                        "confidence dropped at {numerator}/{denominator} ({threshold})"
                    );
                    if result.pass {
                        assert!(result.confidence >= PASS_CONFIDENCE_FLOOR);
                    } else {
                        assert!(result.confidence < PASS_CONFIDENCE_FLOOR);
                    }
                    previous = result.confidence;
                }
            }
        }
    }
}
