use chrono::{Duration, NaiveDateTime, Timelike};

use crate::models::{ConfluencePattern, Submission};

#[derive(Debug, Clone, PartialEq)]
pub struct ConfluenceMatch {
    pub pattern: ConfluencePattern,
    pub minute: u32,
    pub target: NaiveDateTime,
    /// Whole minutes from the base time, when positive.
    pub offset_minutes: Option<i64>,
}

/// Candidate minutes before validation. Values may exceed 59.
pub fn candidate_minutes(submission: &Submission) -> Vec<(ConfluencePattern, u32)> {
    let mut candidates = Vec::new();

    if let Some((int_part, frac_part)) = submission.multiplier_text.split_once('.') {
        if int_part.len() == 2 && int_part == frac_part {
            if let Ok(minute) = int_part.parse::<u32>() {
                candidates.push((ConfluencePattern::Multiplier, minute));
            }
        }
    }

    if submission.time.minute() == submission.time.second() {
        candidates.push((ConfluencePattern::Clock, submission.time.hour()));
    }

    if submission.round >= 10 {
        let tens = (submission.round / 10) % 10;
        let units = submission.round % 10;
        if tens == units {
            candidates.push((ConfluencePattern::Round, ((units * 11) % 60) as u32));
        }
    }

    candidates
}

/// Each candidate minute replaces the base minute. A target already behind
/// `now` moves one hour ahead. Minutes of 60 and above are dropped.
pub fn detect(submission: &Submission, base: NaiveDateTime, now: NaiveDateTime) -> Vec<ConfluenceMatch> {
    candidate_minutes(submission)
        .into_iter()
        .filter_map(|(pattern, minute)| {
            let Some(mut target) = base.with_minute(minute) else {
                log::debug!("Confluência {} ignorada: minuto {} inválido", pattern, minute);
                return None;
            };
            if target < now {
                target += Duration::hours(1);
            }
            let offset = (target - base).num_minutes();
            Some(ConfluenceMatch {
                pattern,
                minute,
                target,
                offset_minutes: (offset > 0).then_some(offset),
            })
        })
        .collect()
}
