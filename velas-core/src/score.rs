use chrono::Timelike;

use crate::config::MultiplierTerm;
use crate::models::{Quote, Score, Submission};

const DIRECT_LIMIT: f64 = 99.99;
const QUOTE_DISCOUNT: f64 = 0.8;

/// Optional "calculation" values that replace the submission's multiplier
/// and minute in the score formula.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreInputs {
    pub multiplier: Option<f64>,
    pub minute: Option<u32>,
}

/// `0.6 * (round mod 100) + M + minute`
pub fn raw_score(round: u64, multiplier: f64, minute: u32, term: MultiplierTerm) -> f64 {
    let m = match term {
        MultiplierTerm::Truncated => multiplier.floor(),
        MultiplierTerm::Whole => multiplier,
    };
    0.6 * (round % 100) as f64 + m + minute as f64
}

/// Up to 99.99 the integer part is shown as is. Above, the integer part is
/// collapsed to its digit sum, the fraction kept, and the result rounded to
/// one decimal.
pub fn format_score(raw: f64) -> String {
    if raw <= DIRECT_LIMIT {
        return format!("{}", raw.trunc() as i64);
    }
    let int_part = raw.floor();
    let digit_sum: u32 = format!("{:.0}", int_part)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .sum();
    let frac = raw - int_part;
    format!("{:.1}", digit_sum as f64 + frac)
}

pub fn score(submission: &Submission, inputs: ScoreInputs, term: MultiplierTerm) -> Score {
    let multiplier = inputs.multiplier.unwrap_or(submission.multiplier);
    let minute = inputs.minute.unwrap_or_else(|| submission.time.minute());
    let raw = raw_score(submission.round, multiplier, minute, term);
    Score {
        raw,
        formatted: format_score(raw),
    }
}

/// Two missing digits read as a two-digit number, minus 20%.
pub fn quote(digits: &[u8]) -> Quote {
    match digits {
        [tens, units] => {
            let original = *tens as u32 * 10 + *units as u32;
            let discounted = (original as f64 * QUOTE_DISCOUNT).round() as u32;
            Quote::Value { discounted, original }
        }
        _ => Quote::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_format_score_below_limit() {
        assert_eq!(format_score(99.99), "99");
        assert_eq!(format_score(86.04), "86");
        assert_eq!(format_score(0.6), "0");
    }

    #[test]
    fn test_format_score_digit_collapse() {
        assert_eq!(format_score(100.4), "1.4");
        assert_eq!(format_score(123.0), "6.0");
        // past u64::MAX the integer part keeps its own digits
        assert_eq!(format_score(1e20), "1.0");
        // 99.995: floor 99 -> 18, plus 0.995
        assert_eq!(format_score(99.995), "19.0");
        assert_eq!(format_score(158.75), "14.8");
    }

    #[test]
    fn test_raw_score_terms() {
        let truncated = raw_score(3294634, 16.64, 49, MultiplierTerm::Truncated);
        assert!((truncated - 85.4).abs() < 1e-9);
        let whole = raw_score(3294634, 16.64, 49, MultiplierTerm::Whole);
        assert!((whole - 86.04).abs() < 1e-9);
    }

    #[test]
    fn test_score_with_calculation_inputs() {
        let sub = Submission {
            round: 3294634,
            multiplier_text: "1.03".to_string(),
            multiplier: 1.03,
            time: NaiveTime::from_hms_opt(20, 49, 55).unwrap(),
        };
        let inputs = ScoreInputs { multiplier: Some(16.64), minute: Some(49) };
        let s = score(&sub, inputs, MultiplierTerm::Whole);
        assert!((s.raw - 86.04).abs() < 1e-9);
        assert_eq!(s.formatted, "86");

        // 0.6 * 34 + 1 + 49
        let s = score(&sub, ScoreInputs::default(), MultiplierTerm::Truncated);
        assert!((s.raw - 70.4).abs() < 1e-9);
        assert_eq!(s.to_string(), "70");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(&[4, 5]).to_string(), "36 a 45x");
        assert_eq!(quote(&[2, 4]), Quote::Value { discounted: 19, original: 24 });
        assert_eq!(quote(&[3]), Quote::Undefined);
        assert_eq!(quote(&[]).to_string(), "-");
    }
}
