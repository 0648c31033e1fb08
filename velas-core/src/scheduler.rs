use chrono::{Duration, NaiveDateTime};

use crate::config::VelasConfig;
use crate::confluence::ConfluenceMatch;
use crate::models::{Alert, FractionalPosition, MissingDigits, OriginKind, Quote, Score, Submission};

const FRACTIONAL_LIMIT: f64 = 10.0;

/// Values shared by every alert of one submission.
#[derive(Debug, Clone)]
pub struct AlertContext {
    pub round: u64,
    pub base: NaiveDateTime,
    pub score: Score,
    pub quote: Quote,
}

impl AlertContext {
    fn at_offset(&self, minutes: i64, origin: OriginKind) -> Alert {
        Alert {
            timestamp: self.base + Duration::minutes(minutes),
            origin,
            round: self.round,
            score: self.score.clone(),
            quote: self.quote,
            resultant_round: resultant(self.round, Some(minutes)),
        }
    }
}

/// None when the offset is not positive or the round would overflow.
fn resultant(round: u64, offset_minutes: Option<i64>) -> Option<u64> {
    offset_minutes
        .filter(|&m| m > 0)
        .and_then(|m| round.checked_add(m as u64))
}

/// Digit sum of the multiplier's decimals, e.g. "1.03" -> 3.
pub fn fractional_sum(submission: &Submission) -> u32 {
    submission
        .fractional_digits()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .sum()
}

pub fn fractional_branch_active(submission: &Submission, config: &VelasConfig) -> bool {
    config.fractional_branch && submission.multiplier < FRACTIONAL_LIMIT
}

pub fn schedule(
    ctx: &AlertContext,
    submission: &Submission,
    missing: &MissingDigits,
    confluences: &[ConfluenceMatch],
    config: &VelasConfig,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for &digit in missing.digits.iter().filter(|&&d| d > 0) {
        alerts.push(ctx.at_offset(digit as i64, OriginKind::Missing { digit, factor: 1 }));
        if config.emit_tenfold {
            alerts.push(ctx.at_offset(digit as i64 * 10, OriginKind::Missing { digit, factor: 10 }));
        }
    }

    if missing.sum > 0 {
        alerts.push(ctx.at_offset(missing.sum as i64, OriginKind::MissingSum { sum: missing.sum }));
    }

    if fractional_branch_active(submission, config) {
        let frac_sum = fractional_sum(submission) as i64;
        if frac_sum > 0 {
            let around = [
                (FractionalPosition::Before, frac_sum - 1),
                (FractionalPosition::Exact, frac_sum),
                (FractionalPosition::After, frac_sum + 1),
            ];
            for (position, offset) in around.into_iter().filter(|(_, o)| *o > 0) {
                alerts.push(ctx.at_offset(offset, OriginKind::Fractional { position, offset }));
            }
        }
    }

    for m in confluences {
        if config.confluence_requires_match && !shares_minute(&alerts, m.target) {
            log::debug!("Confluência {} descartada: sem alerta no mesmo minuto", m.pattern);
            continue;
        }
        alerts.push(Alert {
            timestamp: m.target,
            origin: OriginKind::Confluence { pattern: m.pattern, minute: m.minute },
            round: ctx.round,
            score: ctx.score.clone(),
            quote: ctx.quote,
            resultant_round: resultant(ctx.round, m.offset_minutes),
        });
    }

    alerts
}

fn shares_minute(alerts: &[Alert], target: NaiveDateTime) -> bool {
    let minute = target.format("%H:%M").to_string();
    alerts
        .iter()
        .any(|a| a.timestamp.format("%H:%M").to_string() == minute)
}
