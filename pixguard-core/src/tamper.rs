//! Tamper scoring.
//!
//! Maps a fingerprint similarity onto a fixed five-band scale. Bands are
//! checked from the top with inclusive lower bounds:
//!
//! | similarity | level                               | colour | confidence |
//! |------------|-------------------------------------|--------|------------|
//! | >= 0.95    | No tampering detected               | green  | very_high  |
//! | >= 0.85    | Minor modifications                 | green  | high       |
//! | >= 0.70    | Moderate tampering                  | yellow | medium     |
//! | >= 0.50    | Significant tampering               | orange | medium     |
//! | otherwise  | Heavily modified or different image | red    | low        |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the "No tampering detected" band.
pub const NO_TAMPERING_THRESHOLD: f64 = 0.95;
/// Lower bound of the "Minor modifications" band.
pub const MINOR_THRESHOLD: f64 = 0.85;
/// Lower bound of the "Moderate tampering" band.
pub const MODERATE_THRESHOLD: f64 = 0.70;
/// Lower bound of the "Significant tampering" band.
pub const SIGNIFICANT_THRESHOLD: f64 = 0.50;

/// How much an image appears to have been altered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TamperLevel {
    #[serde(rename = "No tampering detected")]
    None,
    #[serde(rename = "Minor modifications")]
    Minor,
    #[serde(rename = "Moderate tampering")]
    Moderate,
    #[serde(rename = "Significant tampering")]
    Significant,
    #[serde(rename = "Heavily modified or different image")]
    Heavy,
}

impl TamperLevel {
    /// Human-readable label shown to end users.
    pub fn label(&self) -> &'static str {
        match self {
            TamperLevel::None => "No tampering detected",
            TamperLevel::Minor => "Minor modifications",
            TamperLevel::Moderate => "Moderate tampering",
            TamperLevel::Significant => "Significant tampering",
            TamperLevel::Heavy => "Heavily modified or different image",
        }
    }
}

impl fmt::Display for TamperLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Traffic-light colour for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorCode {
    Green,
    Yellow,
    Orange,
    Red,
}

/// Confidence band attached to a tamper level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    VeryHigh,
    High,
    Medium,
    Low,
}

/// Originality verdict derived from one similarity value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TamperScore {
    /// `round(similarity * 100)`, 0 to 100.
    pub originality_percentage: u8,
    pub tamper_level: TamperLevel,
    pub color_code: ColorCode,
    pub confidence: Confidence,
    /// Input similarity after clamping to `[0, 1]`.
    pub similarity_score: f64,
}

impl TamperScore {
    /// Score a similarity value. Out-of-range input is clamped; NaN counts as 0.
    pub fn from_similarity(similarity: f64) -> Self {
        let similarity = clamp_similarity(similarity);

        let (tamper_level, color_code, confidence) = if similarity >= NO_TAMPERING_THRESHOLD {
            (TamperLevel::None, ColorCode::Green, Confidence::VeryHigh)
        } else if similarity >= MINOR_THRESHOLD {
            (TamperLevel::Minor, ColorCode::Green, Confidence::High)
        } else if similarity >= MODERATE_THRESHOLD {
            (TamperLevel::Moderate, ColorCode::Yellow, Confidence::Medium)
        } else if similarity >= SIGNIFICANT_THRESHOLD {
            (TamperLevel::Significant, ColorCode::Orange, Confidence::Medium)
        } else {
            (TamperLevel::Heavy, ColorCode::Red, Confidence::Low)
        };

        Self {
            originality_percentage: (similarity * 100.0).min(100.0).round() as u8,
            tamper_level,
            color_code,
            confidence,
            similarity_score: similarity,
        }
    }

    /// Whether the image is considered unmodified.
    pub fn is_original(&self) -> bool {
        self.tamper_level == TamperLevel::None
    }
}

/// Score a similarity value. See [`TamperScore::from_similarity`].
pub fn score(similarity: f64) -> TamperScore {
    TamperScore::from_similarity(similarity)
}

/// Clamp to `[0, 1]`, mapping NaN to `0.0`.
pub fn clamp_similarity(similarity: f64) -> f64 {
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        let cases = [
            (1.0, TamperLevel::None, ColorCode::Green, Confidence::VeryHigh),
            (0.95, TamperLevel::None, ColorCode::Green, Confidence::VeryHigh),
            (0.9499, TamperLevel::Minor, ColorCode::Green, Confidence::High),
            (0.85, TamperLevel::Minor, ColorCode::Green, Confidence::High),
            (0.8499, TamperLevel::Moderate, ColorCode::Yellow, Confidence::Medium),
            (0.70, TamperLevel::Moderate, ColorCode::Yellow, Confidence::Medium),
            (0.6999, TamperLevel::Significant, ColorCode::Orange, Confidence::Medium),
            (0.50, TamperLevel::Significant, ColorCode::Orange, Confidence::Medium),
            (0.4999, TamperLevel::Heavy, ColorCode::Red, Confidence::Low),
            (0.0, TamperLevel::Heavy, ColorCode::Red, Confidence::Low),
        ];

        for (similarity, level, color, confidence) in cases {
            let s = score(similarity);
            assert_eq!(s.tamper_level, level, "similarity {similarity}");
            assert_eq!(s.color_code, color, "similarity {similarity}");
            assert_eq!(s.confidence, confidence, "similarity {similarity}");
        }
    }

    #[test]
    fn test_originality_percentage() {
        assert_eq!(score(1.0).originality_percentage, 100);
        assert_eq!(score(0.875).originality_percentage, 88);
        assert_eq!(score(0.123).originality_percentage, 12);
        assert_eq!(score(0.0).originality_percentage, 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(score(1.3).similarity_score, 1.0);
        assert_eq!(score(1.3).originality_percentage, 100);
        assert_eq!(score(-0.2).similarity_score, 0.0);
        assert_eq!(score(1.000_000_000_2).tamper_level, TamperLevel::None);
        assert_eq!(score(f64::NAN).similarity_score, 0.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(score(1.0).tamper_level.to_string(), "No tampering detected");
        assert_eq!(
            score(0.1).tamper_level.label(),
            "Heavily modified or different image"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(score(0.72)).unwrap();
        assert_eq!(json["originalityPercentage"], 72);
        assert_eq!(json["tamperLevel"], "Moderate tampering");
        assert_eq!(json["colorCode"], "yellow");
        assert_eq!(json["confidence"], "medium");
        assert_eq!(json["similarityScore"], 0.72);
        assert_eq!(serde_json::to_value(Confidence::VeryHigh).unwrap(), "very_high");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(score(0.8123), score(0.8123));
        assert!(score(0.97).is_original());
        assert!(!score(0.9).is_original());
    }
}
