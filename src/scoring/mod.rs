//! Proportional scoring
//!
//! Turns "k of n sampled artifacts show the practice" into a verdict plus
//! a confidence on the 0..=10 scale.
//!
//! # Confidence curve
//!
//! ```text
//! ratio < threshold:   confidence = floor(ratio / threshold * 5)            (0..=4)
//! ratio >= threshold:  confidence = 5 + floor((ratio - threshold)
//!                                             / (1 - threshold) * 5)        (5..=10)
//! ```
//!
//! A ratio of zero maps to 0, the threshold maps to the pass floor (5) and a
//! ratio of one maps to 10. Both segments are non-decreasing and the lower
//! one tops out below the floor, so the whole curve is monotonic.

mod proportional;

pub use proportional::{
    proportional_confidence, proportional_result, DEFAULT_THRESHOLD, PASS_CONFIDENCE_FLOOR,
};
