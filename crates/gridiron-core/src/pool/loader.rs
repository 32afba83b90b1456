// Player pool CSV loading.
//
// Accepts the common DFS export layout: Name (or Player), Position, Salary,
// Team, and optionally Opponent, Projection, Ownership and StdDev. Extra
// columns are ignored. Rows missing a projection get a salary-implied one,
// rows missing ownership get a value-based estimate, and rows missing a
// standard deviation fall back to the position variance table.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::config::PositionVariance;
use crate::pool::estimate;
use crate::pool::player::{Player, PlayerPool, Position};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to read player pool {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in player pool: {0}")]
    Csv(#[from] csv::Error),

    #[error("player pool is missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("row {row}: invalid {field} value `{value}`")]
    InvalidRow {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("player pool contains no usable players")]
    Empty,
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// One CSV row as text. Numeric columns are parsed by hand so that `$7,500`
/// and `12.5%` style cells are accepted.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPoolRow {
    #[serde(alias = "Player")]
    Name: String,
    #[serde(alias = "Pos")]
    Position: String,
    Salary: String,
    Team: String,
    #[serde(default, alias = "Opp")]
    Opponent: Option<String>,
    #[serde(default, alias = "Proj")]
    Projection: Option<String>,
    #[serde(default, alias = "Ownership %", alias = "Own")]
    Ownership: Option<String>,
    #[serde(default, alias = "Std Dev")]
    StdDev: Option<String>,
}

/// Required columns and the header names accepted for each.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("Name", &["Name", "Player"]),
    ("Position", &["Position", "Pos"]),
    ("Salary", &["Salary"]),
    ("Team", &["Team"]),
];

/// A parsed row before estimates are filled in.
#[derive(Debug)]
struct PoolRow {
    name: String,
    position: Position,
    team: String,
    opponent: String,
    salary: u32,
    projection: Option<f64>,
    ownership: Option<f64>,
    std_dev: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a numeric cell, tolerating `$`, `,`, `%` and surrounding space.
/// Blank cells are `Ok(None)`.
fn parse_number(cell: Option<&str>) -> Result<Option<f64>, ()> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%'))
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}

fn check_headers(headers: &csv::StringRecord) -> Result<(), PoolError> {
    for (column, accepted) in REQUIRED_COLUMNS {
        let present = headers
            .iter()
            .any(|h| accepted.contains(&h.trim()));
        if !present {
            return Err(PoolError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_row(raw: RawPoolRow, row: usize) -> Result<Option<PoolRow>, PoolError> {
    let name = raw.Name.trim().to_string();
    if name.is_empty() {
        warn!("skipping pool row {}: empty name", row);
        return Ok(None);
    }

    let Some(position) = Position::from_str_pos(&raw.Position) else {
        warn!(
            "skipping '{}': unsupported position '{}'",
            name,
            raw.Position.trim()
        );
        return Ok(None);
    };

    let salary = match parse_number(Some(&raw.Salary)) {
        Ok(Some(v)) if v > 0.0 => v.round() as u32,
        _ => {
            return Err(PoolError::InvalidRow {
                row,
                field: "salary",
                value: raw.Salary,
            })
        }
    };

    let projection =
        parse_number(raw.Projection.as_deref()).map_err(|_| PoolError::InvalidRow {
            row,
            field: "projection",
            value: raw.Projection.clone().unwrap_or_default(),
        })?;

    let ownership = match parse_number(raw.Ownership.as_deref()) {
        Ok(v) => v,
        Err(()) => {
            warn!("'{}': unparseable ownership, estimating instead", name);
            None
        }
    };

    let std_dev = match parse_number(raw.StdDev.as_deref()) {
        Ok(v) => v,
        Err(()) => {
            warn!("'{}': unparseable std dev, using position default", name);
            None
        }
    };

    Ok(Some(PoolRow {
        name,
        position,
        team: raw.Team.trim().to_uppercase(),
        opponent: raw
            .Opponent
            .map(|o| o.trim().to_uppercase())
            .unwrap_or_default(),
        salary,
        projection,
        ownership,
        std_dev,
    }))
}

/// Turn parsed rows into players, filling any missing estimate.
fn complete_rows(rows: Vec<PoolRow>, variance: &PositionVariance) -> Vec<Player> {
    let mut estimated_projections = 0usize;
    let projections: Vec<f64> = rows
        .iter()
        .map(|r| {
            r.projection.unwrap_or_else(|| {
                estimated_projections += 1;
                estimate::projection_from_salary(r.position, r.salary)
            })
        })
        .collect();

    let needs_ownership = rows.iter().filter(|r| r.ownership.is_none()).count();
    let estimated_ownership = if needs_ownership > 0 {
        let value_rows: Vec<(Position, u32, f64)> = rows
            .iter()
            .zip(&projections)
            .map(|(r, proj)| (r.position, r.salary, proj / (r.salary as f64 / 1000.0)))
            .collect();
        estimate::ownership_from_value(&value_rows)
    } else {
        Vec::new()
    };

    if estimated_projections > 0 || needs_ownership > 0 {
        info!(
            "Estimated {} projections and {} ownership values from salary",
            estimated_projections, needs_ownership
        );
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, r)| {
            let ownership = r.ownership.unwrap_or_else(|| estimated_ownership[i]);
            let std_dev = r
                .std_dev
                .unwrap_or_else(|| variance.for_position(r.position));
            Player::new(
                r.name,
                r.position,
                r.team,
                r.salary,
                projections[i],
                ownership,
                std_dev,
            )
            .with_opponent(r.opponent)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Load a pool from any reader. Split out so tests can feed CSV text directly.
pub fn load_pool_from_reader<R: Read>(
    rdr: R,
    variance: &PositionVariance,
) -> Result<PlayerPool, PoolError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(rdr);
    check_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<RawPoolRow>().enumerate() {
        // Header is line 1.
        let row = i + 2;
        match result {
            Ok(raw) => {
                if let Some(parsed) = parse_row(raw, row)? {
                    rows.push(parsed);
                }
            }
            Err(e) => {
                warn!("skipping malformed pool row {}: {}", row, e);
            }
        }
    }

    if rows.is_empty() {
        return Err(PoolError::Empty);
    }

    Ok(PlayerPool::new(complete_rows(rows, variance)))
}

/// Load the player pool CSV at `path`.
pub fn load_pool(path: &Path, variance: &PositionVariance) -> Result<PlayerPool, PoolError> {
    let file = std::fs::File::open(path).map_err(|e| PoolError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let pool = load_pool_from_reader(file, variance)?;

    let counts = pool.position_counts();
    info!(
        "Loaded {} players from {} ({})",
        pool.len(),
        path.display(),
        Position::ALL
            .iter()
            .map(|p| format!("{}={}", p, counts.get(p).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(" ")
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variance() -> PositionVariance {
        PositionVariance {
            QB: 6.5,
            RB: 7.0,
            WR: 6.0,
            TE: 5.0,
            DST: 4.0,
        }
    }

    fn load(csv: &str) -> Result<PlayerPool, PoolError> {
        load_pool_from_reader(csv.as_bytes(), &variance())
    }

    #[test]
    fn loads_full_rows() {
        let csv = "\
Name,Position,Team,Opponent,Salary,Projection,Ownership,StdDev,Game Info
Josh Allen,QB,BUF,MIA,7500,24.8,14.5,7.0,MIA@BUF
James Cook,RB,buf,mia,\"$8,000\",18.9,16.1%,,MIA@BUF
";
        let pool = load(csv).unwrap();
        assert_eq!(pool.len(), 2);

        let allen = pool.by_name("Josh Allen").unwrap();
        assert_eq!(allen.position, Position::Quarterback);
        assert_eq!(allen.salary, 7500);
        assert_eq!(allen.opponent, "MIA");
        assert!((allen.std_dev - 7.0).abs() < 1e-9);

        let cook = pool.by_name("James Cook").unwrap();
        assert_eq!(cook.salary, 8000);
        assert_eq!(cook.team, "BUF");
        assert!((cook.ownership - 16.1).abs() < 1e-9);
        // blank StdDev falls back to the RB default
        assert!((cook.std_dev - 7.0).abs() < 1e-9);
    }

    #[test]
    fn accepts_header_aliases() {
        let csv = "\
Player,Position,Team,Salary,Projection,Ownership %,Std Dev
Ravens,D/ST,BAL,3200,7.3,9.8,4.5
";
        let pool = load(csv).unwrap();
        let ravens = pool.by_name("Ravens").unwrap();
        assert_eq!(ravens.position, Position::Defense);
        assert!((ravens.ownership - 9.8).abs() < 1e-9);
        assert!((ravens.std_dev - 4.5).abs() < 1e-9);
        assert!(!ravens.has_opponent());
    }

    #[test]
    fn missing_required_column() {
        let csv = "Name,Position,Team,Projection\nJosh Allen,QB,BUF,24.8\n";
        match load(csv) {
            Err(PoolError::MissingColumn { column }) => assert_eq!(column, "Salary"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_salary_is_fatal() {
        let csv = "Name,Position,Team,Salary,Projection\nJosh Allen,QB,BUF,lots,24.8\n";
        match load(csv) {
            Err(PoolError::InvalidRow { row, field, value }) => {
                assert_eq!(row, 2);
                assert_eq!(field, "salary");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_projection_is_fatal() {
        let csv = "Name,Position,Team,Salary,Projection\nJosh Allen,QB,BUF,7500,n/a\n";
        match load(csv) {
            Err(PoolError::InvalidRow { field, .. }) => assert_eq!(field, "projection"),
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_positions_are_skipped() {
        let csv = "\
Name,Position,Team,Salary,Projection,Ownership
Harrison Butker,K,KC,5000,8.5,10.0
Travis Kelce,TE,KC,5200,11.6,8.7
";
        let pool = load(csv).unwrap();
        assert_eq!(pool.len(), 1);
        assert!(pool.by_name("Harrison Butker").is_none());
    }

    #[test]
    fn only_unsupported_rows_is_empty() {
        let csv = "Name,Position,Team,Salary\nHarrison Butker,K,KC,5000\n";
        assert!(matches!(load(csv), Err(PoolError::Empty)));
    }

    #[test]
    fn missing_projection_and_ownership_are_estimated() {
        let csv = "\
Name,Position,Team,Salary
Josh Allen,QB,BUF,7000
Ravens,DST,BAL,3000
";
        let pool = load(csv).unwrap();
        let allen = pool.by_name("Josh Allen").unwrap();
        assert!((allen.projection - 31.5).abs() < 1e-9);
        assert!((0.5..=45.0).contains(&allen.ownership));
        let ravens = pool.by_name("Ravens").unwrap();
        assert!((ravens.projection - 7.5).abs() < 1e-9);
        assert!((ravens.std_dev - 4.0).abs() < 1e-9);
    }

    #[test]
    fn load_pool_missing_file() {
        let path = std::env::temp_dir().join("gridiron_pool_does_not_exist.csv");
        match load_pool(&path, &variance()) {
            Err(PoolError::Io { path: p, .. }) => {
                assert!(p.ends_with("gridiron_pool_does_not_exist.csv"))
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn shipped_demo_pool_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../defaults/data/player_pool.csv");
        let pool = load_pool(&path, &variance()).unwrap();
        let counts = pool.position_counts();
        for pos in Position::ALL {
            assert!(counts.get(&pos).copied().unwrap_or(0) > 0, "no {pos} in demo pool");
        }
        // the kicker row is dropped
        assert!(pool.by_name("Harrison Butker").is_none());
    }
}
