use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::config::VelasConfig;
use crate::confluence;
use crate::consolidator::{consolidate, AlertTable};
use crate::digits::{missing_digits, observed_digits};
use crate::error::SubmissionError;
use crate::input::parse_block;
use crate::models::{ConsolidatedRow, Submission, SubmissionReport, Warning};
use crate::scheduler::{fractional_branch_active, fractional_sum, schedule, AlertContext};
use crate::score::{quote, score, ScoreInputs};

/// A clock time further ahead of `now` than this belongs to the previous day.
const MAX_LEAD_HOURS: i64 = 12;

/// Anchors a submitted clock time to a date. A round clocked before midnight
/// but submitted after it stays on the previous day.
pub fn base_timestamp(time: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(time);
    if today - now > Duration::hours(MAX_LEAD_HOURS) {
        today - Duration::days(1)
    } else {
        today
    }
}

/// One interactive session: its configuration and the consolidated table.
/// The table only changes through `submit*` and `clear`.
#[derive(Debug, Default)]
pub struct AlertSession {
    config: VelasConfig,
    table: AlertTable,
}

impl AlertSession {
    pub fn new(config: VelasConfig) -> Self {
        Self {
            config,
            table: AlertTable::new(),
        }
    }

    pub fn config(&self) -> &VelasConfig {
        &self.config
    }

    /// Parses the pasted block, then runs the pipeline. A parse error leaves
    /// the table untouched.
    pub fn submit(
        &mut self,
        text: &str,
        inputs: ScoreInputs,
        now: NaiveDateTime,
    ) -> Result<SubmissionReport, SubmissionError> {
        let submission = parse_block(text)?;
        Ok(self.submit_parsed(submission, inputs, now))
    }

    /// `now` is the wall clock at submission time. It anchors the base date
    /// and decides whether a confluence target rolls to the next hour.
    pub fn submit_parsed(
        &mut self,
        submission: Submission,
        inputs: ScoreInputs,
        now: NaiveDateTime,
    ) -> SubmissionReport {
        let base = base_timestamp(submission.time, now);

        let observed = observed_digits(&submission, self.config.digit_source);
        let missing = missing_digits(&observed);
        let score = score(&submission, inputs, self.config.multiplier_term);
        let quote = quote(&missing.digits);
        let confluences = confluence::detect(&submission, base, now);

        let ctx = AlertContext {
            round: submission.round,
            base,
            score: score.clone(),
            quote,
        };
        let alerts = schedule(&ctx, &submission, &missing, &confluences, &self.config);

        let mut warnings = Vec::new();
        if missing.digits.is_empty() {
            warnings.push(Warning::NoMissingDigits);
        }
        if fractional_branch_active(&submission, &self.config) && fractional_sum(&submission) == 0 {
            warnings.push(Warning::NoFractionalSum);
        }
        if confluences.is_empty() {
            warnings.push(Warning::NoConfluence);
        }
        if alerts.is_empty() {
            warnings.push(Warning::NoAlerts);
        }
        for w in &warnings {
            log::warn!("Rodada {}: {}", submission.round, w);
        }

        let batch = consolidate(
            alerts.clone(),
            self.config.group_window_secs,
            &self.config.rank_table,
        );

        let evicted = self.table.evict_before(base);
        if evicted > 0 {
            log::info!("{} linha(s) expirada(s) antes de {}", evicted, base.format("%H:%M:%S"));
        }
        for row in batch.iter().cloned() {
            self.table.merge(row);
        }

        log::info!(
            "Rodada {} aceita: {} alerta(s), {} horário(s) focado(s), tabela com {} linha(s)",
            submission.round,
            alerts.len(),
            batch.len(),
            self.table.len()
        );

        SubmissionReport {
            submission,
            base,
            missing,
            score,
            quote,
            alerts,
            batch,
            evicted,
            warnings,
        }
    }

    pub fn clear(&mut self) {
        log::info!("Tabela limpa ({} linha(s) removida(s))", self.table.len());
        self.table.clear();
    }

    pub fn rows(&self) -> Vec<&ConsolidatedRow> {
        self.table.rows()
    }

    pub fn row(&self, key: &str) -> Option<&ConsolidatedRow> {
        self.table.get(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
