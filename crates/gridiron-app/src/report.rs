// Terminal summary and CSV/JSON export of a finished run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use gridiron_core::lineup::SLOT_LABELS;
use gridiron_core::run::{RankedLineup, RunReport};
use serde::Serialize;
use tracing::info;

/// Exposure above which a player is listed in the terminal summary.
const SUMMARY_EXPOSURE_MIN: f64 = 0.30;

const STAT_COLUMNS: [&str; 12] = [
    "Salary",
    "Projection",
    "Ownership",
    "Score",
    "WinRate",
    "Top10Rate",
    "CashRate",
    "ExpectedPayout",
    "ROI",
    "MeanPlace",
    "MedianPlace",
    "Iterations",
];

/// Players per ownership tier.
const TIER_COLUMNS: [&str; 3] = ["Leverage", "Core", "Chalk"];

// ---------------------------------------------------------------------------
// Terminal summary
// ---------------------------------------------------------------------------

pub fn print_summary(report: &RunReport) {
    println!(
        "{} ({}) - seed {}",
        report.contest_name, report.contest, report.seed
    );
    println!(
        "Built {} of {} lineups in {} attempts ({} aborted, {} rejected, {} duplicates)",
        report.built(),
        report.requested,
        report.attempts,
        report.aborted,
        report.rejections.values().sum::<usize>(),
        report.duplicates
    );
    if report.is_partial() {
        println!("Attempt budget exhausted before every requested lineup was found.");
    }
    let mix = &report.mix;
    println!(
        "Leverage QB in {} (target {}), game stacks in {} (target {})",
        mix.leverage_qb, mix.leverage_qb_target, mix.game_stack, mix.game_stack_target
    );
    println!(
        "Prize pool ${:.0}, {} places paid",
        report.payout.prize_pool, report.payout.places_paid
    );
    println!();

    println!(
        "{:>4}  {:>6}  {:>6}  {:>6}  {:>6}  {:>6}  {:>8}",
        "Rank", "Score", "Salary", "Proj", "Own%", "Win%", "ROI%"
    );
    for entry in &report.lineups {
        let l = &entry.lineup;
        let o = &entry.outcome;
        println!(
            "{:>4}  {:>6.3}  {:>6}  {:>6.1}  {:>6.1}  {:>6.2}  {:>8.1}",
            entry.rank,
            l.score.unwrap_or(0.0),
            l.total_salary,
            l.total_projection,
            l.total_ownership,
            o.win_rate * 100.0,
            o.expected_roi
        );
        let names: Vec<String> = l
            .entries
            .iter()
            .map(|e| format!("{}: {}", e.slot, e.player.name))
            .collect();
        println!("      {}", names.join(", "));
        let tiers = entry.tiers.summary();
        if !tiers.is_empty() {
            println!("      tiers: {tiers}");
        }
    }

    let mut heavy: Vec<(&String, &f64)> = report
        .exposures
        .iter()
        .filter(|(_, e)| **e >= SUMMARY_EXPOSURE_MIN)
        .collect();
    if !heavy.is_empty() {
        heavy.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        println!();
        println!("Exposure:");
        for (name, exposure) in heavy {
            println!("  {:<28} {:>5.1}%", name, exposure * 100.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    generated_at: DateTime<Local>,
    #[serde(flatten)]
    report: &'a RunReport,
}

/// Write `lineups_<contest>_<timestamp>.csv` and a matching JSON summary
/// into `dir`, creating it if needed.
pub fn export(report: &RunReport, dir: &Path) -> anyhow::Result<ExportPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let now = Local::now();
    let stamp = now.format("%Y%m%d_%H%M%S");
    let csv_path = dir.join(format!("lineups_{}_{}.csv", report.contest, stamp));
    let json_path = dir.join(format!("summary_{}_{}.json", report.contest, stamp));

    write_csv(report, &csv_path)?;

    let file = std::fs::File::create(&json_path)
        .with_context(|| format!("failed to create {}", json_path.display()))?;
    let summary = RunSummary {
        generated_at: now,
        report,
    };
    serde_json::to_writer_pretty(file, &summary)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    info!(
        "Exported {} lineups to {} and {}",
        report.built(),
        csv_path.display(),
        json_path.display()
    );
    Ok(ExportPaths {
        csv: csv_path,
        json: json_path,
    })
}

fn write_csv(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(header())?;
    for entry in &report.lineups {
        wtr.write_record(record(entry))?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn header() -> Vec<&'static str> {
    std::iter::once("Rank")
        .chain(SLOT_LABELS)
        .chain(STAT_COLUMNS)
        .chain(TIER_COLUMNS)
        .collect()
}

/// One CSV row: rank, one player name per roster slot, then aggregates,
/// outcome stats and tier counts.
fn record(entry: &RankedLineup) -> Vec<String> {
    let l = &entry.lineup;
    let o = &entry.outcome;
    let mut row =
        Vec::with_capacity(1 + SLOT_LABELS.len() + STAT_COLUMNS.len() + TIER_COLUMNS.len());
    row.push(entry.rank.to_string());
    row.extend(l.entries.iter().map(|e| e.player.name.clone()));
    row.extend([
        l.total_salary.to_string(),
        format!("{:.2}", l.total_projection),
        format!("{:.2}", l.total_ownership),
        l.score.map(|s| format!("{s:.4}")).unwrap_or_default(),
        format!("{:.4}", o.win_rate),
        format!("{:.4}", o.top_decile_rate),
        format!("{:.4}", o.cash_rate),
        format!("{:.2}", o.expected_payout),
        format!("{:.2}", o.expected_roi),
        format!("{:.1}", o.mean_placement),
        format!("{:.1}", o.median_placement),
        o.iterations.to_string(),
        entry.tiers.ultra_leverage.to_string(),
        entry.tiers.core.to_string(),
        entry.tiers.chalk.to_string(),
    ]);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_core::lineup::{Lineup, LineupEntry, LineupSlot, SlotKind, ROSTER_TEMPLATE};
    use gridiron_core::pool::{Player, Position, TierCounts};
    use gridiron_core::sim::OutcomeStats;

    fn ranked() -> RankedLineup {
        let entries = ROSTER_TEMPLATE
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let (slot, pos) = match kind {
                    SlotKind::Fixed(p) => (LineupSlot::Fixed(*p), *p),
                    SlotKind::Flex => (LineupSlot::Flex(Position::WideReceiver), Position::WideReceiver),
                };
                LineupEntry {
                    slot,
                    player: Player::new(format!("P{i}"), pos, "AAA", 5000, 10.0, 8.0, 5.0),
                }
            })
            .collect();
        let mut lineup = Lineup::new(entries);
        lineup.score = Some(0.5);
        RankedLineup {
            rank: 1,
            lineup,
            tiers: TierCounts {
                ultra_leverage: 3,
                core: 4,
                chalk: 1,
                other: 1,
            },
            outcome: OutcomeStats::neutral(20.0),
        }
    }

    #[test]
    fn header_has_one_column_per_slot() {
        let h = header();
        assert_eq!(h.len(), 1 + 9 + STAT_COLUMNS.len() + TIER_COLUMNS.len());
        assert_eq!(&h[1..10], &SLOT_LABELS[..]);
        assert_eq!(&h[22..], &TIER_COLUMNS[..]);
    }

    #[test]
    fn record_lines_up_with_header() {
        let row = record(&ranked());
        assert_eq!(row.len(), header().len());
        assert_eq!(row[0], "1");
        assert_eq!(row[1], "P0");
        assert_eq!(row[9], "P8");
        assert_eq!(row[10], "45000");
        assert_eq!(row[13], "0.5000");
        assert_eq!(row[18], "-100.00");
        assert_eq!(&row[22..], &["3", "4", "1"]);
    }
}
