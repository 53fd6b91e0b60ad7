//! Free-text questions: best-effort extraction of vehicle specs and canned guidance.
//!
//! The extractor is a set of independent patterns over the lowercased text,
//! not a grammar. Text that does not pin down all seven features yields no
//! prediction and is answered from the FAQ table instead.

use crate::error::PredictError;
use crate::predictor::Predictor;
use crate::schema::{Feature, FeatureVector, N_FEATURES};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static BATTERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*kwh").expect("valid battery pattern"));
static EFFICIENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*wh/?km").expect("valid efficiency pattern"));
static TOP_SPEED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*km/?h\b").expect("valid speed pattern"));
static ACCELERATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*s").expect("valid acceleration pattern"));
static DIMENSIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{3,5})\s*[x×]\s*(\d{3,5})\s*[x×]\s*(\d{3,5})").expect("valid dimensions pattern")
});

const USAGE_HINT: &str = "Ask about battery, efficiency, acceleration, or give rough specs \
     (e.g., '50 kWh, 160 Wh/km, 4300x1800x1600, 8.5s, 180 km/h').";

/// Values recovered from one piece of text, indexed by [`Feature`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extraction {
    values: [Option<f64>; N_FEATURES],
}

impl Extraction {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values[feature.index()]
    }

    fn set(&mut self, feature: Feature, value: Option<f64>) {
        self.values[feature.index()] = value;
    }

    /// Features the text did not provide, in schema order.
    pub fn missing(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// The full vector, only when every feature was found.
    pub fn complete(&self) -> Option<FeatureVector> {
        let mut out = [0.0; N_FEATURES];
        for (slot, value) in out.iter_mut().zip(self.values) {
            *slot = value?;
        }
        Some(FeatureVector::new(out))
    }
}

/// Zero code points of the decimal digit blocks accepted besides ASCII.
const DIGIT_ZEROS: [u32; 5] = [
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x0966, // Devanagari
    0x09E6, // Bengali
    0xFF10, // fullwidth
];

fn ascii_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() || c == '.' {
        return Some(c);
    }
    let cp = u32::from(c);
    DIGIT_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&cp))
        .and_then(|&zero| char::from_digit(cp - zero, 10))
}

/// Parses a matched number, folding non-ASCII decimal digits to ASCII.
fn parse_number(s: &str) -> Option<f64> {
    s.chars()
        .map(ascii_digit)
        .collect::<Option<String>>()?
        .parse()
        .ok()
}

/// First match whose number parses; an unreadable hit does not hide later ones.
fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text)
        .find_map(|c| c.get(1).and_then(|m| parse_number(m.as_str())))
}

/// First `<number> s` whose `s` is not the start of a longer word.
///
/// Still fooled by an unrelated bare "s" after a number, as in "2 s-class".
fn acceleration(text: &str) -> Option<f64> {
    ACCELERATION
        .captures_iter(text)
        .filter(|c| {
            let end = c.get(0).map_or(text.len(), |m| m.end());
            !text[end..]
                .chars()
                .next()
                .is_some_and(|ch| ch.is_ascii_lowercase())
        })
        .find_map(|c| c.get(1).and_then(|m| parse_number(m.as_str())))
}

pub fn extract_features(text: &str) -> Extraction {
    let s = text.to_lowercase();
    let mut ex = Extraction::default();
    ex.set(Feature::BatteryCapacity, first_number(&BATTERY, &s));
    ex.set(Feature::Efficiency, first_number(&EFFICIENCY, &s));
    ex.set(Feature::TopSpeed, first_number(&TOP_SPEED, &s));
    ex.set(Feature::Acceleration, acceleration(&s));

    let dims = DIMENSIONS.captures_iter(&s).find_map(|caps| {
        let dim = |i: usize| caps.get(i).and_then(|m| parse_number(m.as_str()));
        Some([dim(1)?, dim(2)?, dim(3)?])
    });
    if let Some([length, width, height]) = dims {
        ex.set(Feature::Length, Some(length));
        ex.set(Feature::Width, Some(width));
        ex.set(Feature::Height, Some(height));
    }
    ex
}

/// Formatted prediction when `text` names all seven features, `None` otherwise.
pub fn try_predict_from_text(
    predictor: &Predictor,
    text: &str,
) -> Result<Option<String>, PredictError> {
    let Some(features) = extract_features(text).complete() else {
        return Ok(None);
    };
    let km = predictor.predict_vector(&features)?;
    Ok(Some(format!("Estimated range ≈ {km:.1} km based on your text.")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Battery,
    Efficiency,
    Acceleration,
    LowRange,
    Tips,
}

impl Topic {
    const ORDER: [Topic; 5] = [
        Topic::Battery,
        Topic::Efficiency,
        Topic::Acceleration,
        Topic::LowRange,
        Topic::Tips,
    ];

    fn matches(self, s: &str) -> bool {
        match self {
            Topic::Battery => s.contains("battery"),
            Topic::Efficiency => s.contains("efficiency") || s.contains("wh/km"),
            Topic::Acceleration => s.contains("acceleration") || s.contains("0-100"),
            Topic::LowRange => s.contains("low") && s.contains("range"),
            Topic::Tips => s.contains("tip") || s.contains("improve"),
        }
    }

    fn text(self) -> &'static str {
        match self {
            Topic::Battery => {
                "Battery capacity (kWh) is the energy stored. Higher kWh → generally \
                 higher range, but weight and efficiency still matter."
            }
            Topic::Efficiency => {
                "Efficiency (Wh/km) is energy used per km. Lower Wh/km = better \
                 efficiency = more range from the same battery."
            }
            Topic::Acceleration => {
                "Quicker 0–100 km/h (lower seconds) often means stronger motors; \
                 spirited driving reduces real-world range."
            }
            Topic::LowRange => {
                "If predicted range looks low, check efficiency (Wh/km) and height/drag. \
                 Try lower Wh/km, or bigger battery."
            }
            Topic::Tips => {
                "Range tips: keep speeds moderate, gentle acceleration, proper tire \
                 pressure, reduce weight/roof racks, precondition battery in extreme temps."
            }
        }
    }
}

/// Canned explanations for every topic the text mentions, in fixed order.
pub fn quick_answer(text: &str) -> String {
    let s = text.to_lowercase();
    let parts: Vec<&str> = Topic::ORDER
        .into_iter()
        .filter(|t| t.matches(&s))
        .map(Topic::text)
        .collect();
    if parts.is_empty() {
        USAGE_HINT.to_string()
    } else {
        parts.join("\n\n")
    }
}

/// Reply to one free-text question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Prediction(String),
    Guidance(String),
    /// A prediction was attempted and failed; the message is user-facing.
    Error(String),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Prediction(s) | Answer::Guidance(s) => f.write_str(s),
            Answer::Error(s) => write!(f, "Error: {s}"),
        }
    }
}

pub fn answer(predictor: &Predictor, text: &str) -> Answer {
    match try_predict_from_text(predictor, text) {
        Ok(Some(msg)) => Answer::Prediction(msg),
        Ok(None) => Answer::Guidance(quick_answer(text)),
        Err(e) => Answer::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::tests::sample_artifact;

    const FULL: &str = "50 kWh, 160 Wh/km, 4300x1800x1600, 8.5s, 180 km/h";

    #[test]
    fn test_extracts_all_seven_features() {
        let ex = extract_features(FULL);
        assert_eq!(ex.get(Feature::BatteryCapacity), Some(50.0));
        assert_eq!(ex.get(Feature::Efficiency), Some(160.0));
        assert_eq!(ex.get(Feature::TopSpeed), Some(180.0));
        assert_eq!(ex.get(Feature::Acceleration), Some(8.5));
        assert_eq!(ex.get(Feature::Length), Some(4300.0));
        assert_eq!(ex.get(Feature::Width), Some(1800.0));
        assert_eq!(ex.get(Feature::Height), Some(1600.0));
        assert_eq!(ex.complete(), Some(FeatureVector::default()));
    }

    #[test]
    fn test_order_and_case_do_not_matter() {
        let ex = extract_features("0-100 in 6.1 S, 4700 × 1900 × 1500 mm, 77.4KWH, 175WHKM, 200 KMH top");
        assert_eq!(ex.get(Feature::BatteryCapacity), Some(77.4));
        assert_eq!(ex.get(Feature::Efficiency), Some(175.0));
        assert_eq!(ex.get(Feature::TopSpeed), Some(200.0));
        assert_eq!(ex.get(Feature::Acceleration), Some(6.1));
        assert_eq!(ex.get(Feature::Height), Some(1500.0));
        assert!(ex.missing().is_empty());
    }

    #[test]
    fn test_acceleration_skips_words() {
        let ex = extract_features("it does 8 seconds flat, then 7.2s");
        assert_eq!(ex.get(Feature::Acceleration), Some(7.2));
        assert_eq!(extract_features("2 sedans").get(Feature::Acceleration), None);
    }

    #[test]
    fn test_non_ascii_digits_are_read() {
        let ex = extract_features("５０ kWh, ١٦٠ Wh/km, ４３００x1800x1600");
        assert_eq!(ex.get(Feature::BatteryCapacity), Some(50.0));
        assert_eq!(ex.get(Feature::Efficiency), Some(160.0));
        assert_eq!(ex.get(Feature::Length), Some(4300.0));
        assert_eq!(ex.get(Feature::Height), Some(1600.0));
    }

    #[test]
    fn test_unreadable_number_does_not_hide_later_one() {
        // Thai digits match `\d` but are not folded
        let ex = extract_features("๕๐ kwh, or rather 64 kWh");
        assert_eq!(ex.get(Feature::BatteryCapacity), Some(64.0));
    }

    #[test]
    fn test_faq_texts_are_complete_sentences() {
        let reply = quick_answer("acceleration and efficiency");
        let parts: Vec<&str> = reply.split("\n\n").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("Efficiency (Wh/km) is energy used per km."));
        assert!(parts[1].ends_with("spirited driving reduces real-world range."));
    }

    #[test]
    fn test_partial_text_is_incomplete() {
        let ex = extract_features("my car has 64 kWh and does 150 Wh/km");
        assert_eq!(ex.get(Feature::BatteryCapacity), Some(64.0));
        assert_eq!(ex.complete(), None);
        assert_eq!(
            ex.missing(),
            vec![
                Feature::TopSpeed,
                Feature::Acceleration,
                Feature::Length,
                Feature::Width,
                Feature::Height
            ]
        );
    }

    #[test]
    fn test_faq_battery_then_tips() {
        let reply = quick_answer("What about battery tips?");
        let battery = reply.find("Battery capacity").unwrap();
        let tips = reply.find("Range tips").unwrap();
        assert!(battery < tips);
        assert_eq!(reply.matches("\n\n").count(), 1);
    }

    #[test]
    fn test_faq_low_range_and_generic_hint() {
        assert!(quick_answer("why is my range so low").starts_with("If predicted range looks low"));
        assert_eq!(quick_answer("hello"), USAGE_HINT);
    }

    #[test]
    fn test_answer_routes_prediction_and_guidance() {
        let p = Predictor::from_artifact(sample_artifact()).unwrap();

        match answer(&p, FULL) {
            Answer::Prediction(msg) => {
                assert!(msg.starts_with("Estimated range ≈ "));
                assert!(msg.ends_with(" km based on your text."));
            }
            other => panic!("expected a prediction, got {other:?}"),
        }
        assert!(matches!(
            answer(&p, "What about battery tips?"),
            Answer::Guidance(_)
        ));
    }
}
