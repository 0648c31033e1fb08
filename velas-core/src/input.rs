use chrono::NaiveTime;

use crate::error::SubmissionError;
use crate::models::Submission;

/// Parses a pasted block: round, multiplier and time, one per non-empty line.
/// Either every field parses or nothing is returned.
pub fn parse_block(text: &str) -> Result<Submission, SubmissionError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() != 3 {
        return Err(SubmissionError::InputShape { found: lines.len() });
    }

    parse_fields(lines[0], lines[1], lines[2])
}

pub fn parse_fields(round: &str, multiplier: &str, time: &str) -> Result<Submission, SubmissionError> {
    let round = parse_round(round)?;
    let (multiplier_text, multiplier) = parse_multiplier(multiplier)?;
    let time = parse_time(time)?;

    Ok(Submission {
        round,
        multiplier_text,
        multiplier,
        time,
    })
}

pub fn parse_round(raw: &str) -> Result<u64, SubmissionError> {
    let s = raw.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(SubmissionError::Round(raw.to_string()));
    }
    s.parse::<u64>()
        .map_err(|_| SubmissionError::Round(raw.to_string()))
}

/// Returns the cleaned text (e.g. "1.03") alongside its value.
/// Accepts a trailing `x`/`X` and a comma decimal separator.
pub fn parse_multiplier(raw: &str) -> Result<(String, f64), SubmissionError> {
    let s = raw.trim();
    let s = s
        .strip_suffix('x')
        .or_else(|| s.strip_suffix('X'))
        .unwrap_or(s)
        .trim_end();
    let normalized = s.replace(',', ".");

    let well_formed = normalized.chars().any(|c| c.is_ascii_digit())
        && normalized.chars().all(|c| c.is_ascii_digit() || c == '.')
        && normalized.matches('.').count() <= 1;
    if !well_formed {
        return Err(SubmissionError::Multiplier(raw.to_string()));
    }

    let value = normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SubmissionError::Multiplier(raw.to_string()))?;
    Ok((normalized, value))
}

/// `HH:MM:SS`, or `HH:MM` read as `HH:MM:00`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, SubmissionError> {
    let s = raw.trim();
    let full = match s.matches(':').count() {
        1 => format!("{}:00", s),
        2 => s.to_string(),
        _ => return Err(SubmissionError::Time(raw.to_string())),
    };
    NaiveTime::parse_from_str(&full, "%H:%M:%S")
        .map_err(|_| SubmissionError::Time(raw.to_string()))
}
