use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{NaiveDateTime, Timelike};

use crate::models::{Alert, ConsolidatedRow, RankTable};

/// Sorts the batch and splits it into clusters: an alert joins the current
/// cluster when it is at most `window_secs` after the previous one.
pub fn group_alerts(mut alerts: Vec<Alert>, window_secs: i64) -> Vec<Vec<Alert>> {
    alerts.sort_by_key(|a| a.timestamp);

    let mut groups: Vec<Vec<Alert>> = Vec::new();
    for alert in alerts {
        let joins = groups
            .last()
            .and_then(|g| g.last())
            .is_some_and(|prev| (alert.timestamp - prev.timestamp).num_seconds() <= window_secs);
        match groups.last_mut() {
            Some(group) if joins => group.push(alert),
            _ => groups.push(vec![alert]),
        }
    }
    groups
}

/// Middle alert for odd-sized groups, last one for even-sized groups.
pub fn representative(group: &[Alert]) -> Option<&Alert> {
    if group.is_empty() {
        return None;
    }
    let idx = if group.len() % 2 == 1 {
        group.len() / 2
    } else {
        group.len() - 1
    };
    group.get(idx)
}

pub fn build_row(group: &[Alert], ranks: &RankTable) -> Option<ConsolidatedRow> {
    let rep = representative(group)?;
    Some(ConsolidatedRow {
        key: rep.key(),
        timestamp: rep.timestamp,
        rounds: group.iter().map(|a| a.round).collect(),
        origins: group.iter().map(|a| a.origin.tag()).collect(),
        details: group.iter().map(|a| a.origin.detail()).collect(),
        resultant_round: rep
            .resultant_round
            .or_else(|| group.iter().find_map(|a| a.resultant_round)),
        signal: ranks.rank_for(rep.timestamp.minute()),
        score: rep.score.clone(),
        quote: rep.quote,
    })
}

pub fn consolidate(alerts: Vec<Alert>, window_secs: i64, ranks: &RankTable) -> Vec<ConsolidatedRow> {
    group_alerts(alerts, window_secs)
        .iter()
        .filter_map(|g| build_row(g, ranks))
        .collect()
}

/// The running table, keyed by focused time `HH:MM:SS`.
#[derive(Debug, Default)]
pub struct AlertTable {
    rows: HashMap<String, ConsolidatedRow>,
}

impl AlertTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops rows whose focused time is before `base`. Returns how many.
    pub fn evict_before(&mut self, base: NaiveDateTime) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| row.timestamp >= base);
        before - self.rows.len()
    }

    /// Unions the contributing sets into an existing row. The signal comes
    /// from the key's minute, so it only changes if the rank table changed.
    pub fn merge(&mut self, row: ConsolidatedRow) {
        match self.rows.entry(row.key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                existing.rounds.extend(row.rounds);
                existing.origins.extend(row.origins);
                existing.details.extend(row.details);
                if row.signal.outranks(&existing.signal) {
                    existing.signal = row.signal;
                }
                if existing.resultant_round.is_none() {
                    existing.resultant_round = row.resultant_round;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn get(&self, key: &str) -> Option<&ConsolidatedRow> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in chronological order.
    pub fn rows(&self) -> Vec<&ConsolidatedRow> {
        let mut rows: Vec<&ConsolidatedRow> = self.rows.values().collect();
        rows.sort_by_key(|r| r.timestamp);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfluencePattern, FractionalPosition, OriginKind, Quote, Rank, Score};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    fn alert(ts: NaiveDateTime, round: u64, origin: OriginKind) -> Alert {
        Alert {
            timestamp: ts,
            origin,
            round,
            score: Score { raw: 50.0, formatted: "50".to_string() },
            quote: Quote::Undefined,
            resultant_round: Some(round + 1),
        }
    }

    fn v(digit: u8) -> OriginKind {
        OriginKind::Missing { digit, factor: 1 }
    }

    #[test]
    fn test_close_alerts_collapse() {
        let alerts = vec![alert(at(10, 0, 0), 1, v(1)), alert(at(10, 0, 45), 1, v(2))];
        let rows = consolidate(alerts, 61, &RankTable::default());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_distant_alerts_stay_apart() {
        let alerts = vec![alert(at(10, 2, 0), 1, v(1)), alert(at(10, 0, 0), 1, v(2))];
        let rows = consolidate(alerts, 61, &RankTable::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "10:00:00");
        assert_eq!(rows[1].key, "10:02:00");
    }

    #[test]
    fn test_chain_grouping_uses_consecutive_deltas() {
        // 10:00:00 -> 10:01:00 -> 10:02:00, each 60s apart
        let alerts = vec![
            alert(at(10, 0, 0), 1, v(1)),
            alert(at(10, 1, 0), 1, v(2)),
            alert(at(10, 2, 0), 1, v(3)),
        ];
        let groups = group_alerts(alerts, 61);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_window_boundary() {
        let alerts = vec![alert(at(10, 0, 0), 1, v(1)), alert(at(10, 1, 1), 1, v(2))];
        assert_eq!(group_alerts(alerts, 61).len(), 1);
        let alerts = vec![alert(at(10, 0, 0), 1, v(1)), alert(at(10, 1, 2), 1, v(2))];
        assert_eq!(group_alerts(alerts, 61).len(), 2);
    }

    #[test]
    fn test_representative_odd_and_even() {
        let odd = vec![
            alert(at(10, 0, 0), 1, v(1)),
            alert(at(10, 1, 0), 1, v(2)),
            alert(at(10, 2, 0), 1, v(3)),
        ];
        assert_eq!(representative(&odd).unwrap().timestamp, at(10, 1, 0));
        let even = &odd[..2];
        assert_eq!(representative(even).unwrap().timestamp, at(10, 1, 0));
        assert!(representative(&[]).is_none());
    }

    #[test]
    fn test_row_unions_origins() {
        let alerts = vec![
            alert(at(10, 3, 0), 7, OriginKind::MissingSum { sum: 3 }),
            alert(at(10, 3, 0), 7, v(3)),
            alert(
                at(10, 3, 0),
                7,
                OriginKind::Fractional { position: FractionalPosition::Exact, offset: 3 },
            ),
            alert(at(10, 3, 30), 7, OriginKind::Confluence { pattern: ConfluencePattern::Round, minute: 3 }),
        ];
        let rows = consolidate(alerts, 61, &RankTable::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].origins_label(), "C, RA, V, VT");
        assert_eq!(rows[0].details.len(), 4);
        assert_eq!(rows[0].key, "10:03:30");
        assert_eq!(rows[0].signal, Rank::T1);
    }

    #[test]
    fn test_merge_same_key_unions_rounds() {
        let ranks = RankTable::default();
        let mut table = AlertTable::new();
        for row in consolidate(vec![alert(at(10, 5, 0), 120, v(5))], 61, &ranks) {
            table.merge(row);
        }
        for row in consolidate(vec![alert(at(10, 5, 0), 99, OriginKind::MissingSum { sum: 5 })], 61, &ranks) {
            table.merge(row);
        }
        assert_eq!(table.len(), 1);
        let row = table.get("10:05:00").unwrap();
        assert_eq!(row.rounds_label(), "99, 120");
        assert_eq!(row.origins_label(), "V, VT");
        assert_eq!(row.resultant_round, Some(121));
    }

    #[test]
    fn test_merge_only_upgrades_signal() {
        let ranks = RankTable::default();
        let mut table = AlertTable::new();
        let mut row = build_row(&[alert(at(10, 5, 0), 1, v(5))], &ranks).unwrap();
        row.signal = Rank::T3;
        table.merge(row.clone());

        row.signal = Rank::T4;
        table.merge(row.clone());
        assert_eq!(table.get("10:05:00").unwrap().signal, Rank::T3);

        row.signal = Rank::T1;
        table.merge(row);
        assert_eq!(table.get("10:05:00").unwrap().signal, Rank::T1);
    }

    #[test]
    fn test_evict_before() {
        let ranks = RankTable::default();
        let mut table = AlertTable::new();
        let alerts = vec![alert(at(10, 0, 0), 1, v(1)), alert(at(10, 10, 0), 1, v(2))];
        for row in consolidate(alerts, 61, &ranks) {
            table.merge(row);
        }
        assert_eq!(table.evict_before(at(10, 0, 0)), 0);
        assert_eq!(table.evict_before(at(10, 0, 1)), 1);
        assert!(table.get("10:00:00").is_none());
        assert_eq!(table.rows().len(), 1);

        table.clear();
        assert!(table.is_empty());
    }
}
