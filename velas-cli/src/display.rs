use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use velas_core::config::VelasConfig;
use velas_core::models::{ConsolidatedRow, Rank, SubmissionReport};

pub fn display_report(report: &SubmissionReport) {
    let missing = if report.missing.digits.is_empty() {
        "—".to_string()
    } else {
        report
            .missing
            .digits
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" - ")
    };

    println!("\n📊 Rodada {} | vela {}x\n", report.submission.round, report.submission.multiplier_text);
    println!("  Resultado R       : {}", report.score);
    println!("  Cotação C         : {}", report.quote);
    println!("  Horário base      : {}", report.base.format("%H:%M:%S"));
    println!("  Faltantes (soma)  : {} ({})", missing, report.missing.sum);
    println!("  Alertas gerados   : {}", report.alerts.len());
    if report.evicted > 0 {
        println!("  Linhas expiradas  : {}", report.evicted);
    }

    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }
}

fn focused_label(row: &ConsolidatedRow) -> String {
    let time = row.timestamp.format("%H:%M:%S");
    match row.signal {
        Rank::T1 => format!("🔥 {}", time),
        Rank::T2 => format!("⭐ {}", time),
        _ => time.to_string(),
    }
}

fn signal_color(rank: Rank) -> Color {
    match rank {
        Rank::T1 => Color::Green,
        Rank::T2 => Color::Cyan,
        Rank::T3 => Color::White,
        Rank::T4 => Color::Yellow,
        Rank::T5 => Color::Red,
    }
}

pub fn display_table(rows: &[&ConsolidatedRow]) {
    if rows.is_empty() {
        println!("\nNenhum alerta ativo.");
        return;
    }

    println!("\n🎯 Alertas consolidados\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Horário focado",
            "Rodada resultante",
            "Rodadas",
            "R",
            "C",
            "Origem",
            "Detalhe",
            "Sinal",
        ]);

    for row in rows {
        let resultant = row
            .resultant_round
            .map(|r| r.to_string())
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            Cell::new(focused_label(row)),
            Cell::new(resultant),
            Cell::new(row.rounds_label()),
            Cell::new(row.score.to_string()),
            Cell::new(row.quote.to_string()),
            Cell::new(row.origins_label()),
            Cell::new(row.details_label()),
            Cell::new(row.signal.to_string()).fg(signal_color(row.signal)),
        ]);
    }

    println!("{table}");
}

pub fn display_config(config: &VelasConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
