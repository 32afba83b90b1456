// Baseline estimates for pool rows that arrive without a projection or an
// ownership figure.

use crate::pool::player::Position;

/// Fantasy points per salary unit used when a row has no projection.
pub fn projection_multiplier(pos: Position) -> f64 {
    match pos {
        Position::Quarterback => 0.0045,
        Position::RunningBack => 0.0035,
        Position::WideReceiver => 0.0032,
        Position::TightEnd => 0.0030,
        Position::Defense => 0.0025,
    }
}

/// Salary-implied projection.
pub fn projection_from_salary(pos: Position, salary: u32) -> f64 {
    salary as f64 * projection_multiplier(pos)
}

/// How heavily the field gravitates to each position at equal value.
fn ownership_factor(pos: Position) -> f64 {
    match pos {
        Position::Quarterback => 1.2,
        Position::RunningBack => 1.3,
        Position::WideReceiver => 1.0,
        Position::TightEnd => 0.8,
        Position::Defense => 0.6,
    }
}

const OWNERSHIP_SCALE: f64 = 30.0;
const STUD_SALARY: u32 = 8000;
const STUD_BOOST: f64 = 1.2;
const OWNERSHIP_MIN: f64 = 0.5;
const OWNERSHIP_MAX: f64 = 45.0;

/// Percentile rank (0, 1] of each value, ties sharing their average rank.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // 1-based positions i+1..=j+1 share the mean rank.
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg / n as f64;
        }
        i = j + 1;
    }
    ranks
}

/// Project ownership from value: a player's value percentile within the
/// whole pool, scaled to 0-30%, adjusted per position and for expensive
/// players, then clipped to [0.5, 45].
///
/// `rows` carries `(position, salary, value)` per player; the result is
/// index-aligned with it.
pub fn ownership_from_value(rows: &[(Position, u32, f64)]) -> Vec<f64> {
    let values: Vec<f64> = rows.iter().map(|(_, _, v)| *v).collect();
    let pct = percentile_ranks(&values);

    rows.iter()
        .zip(pct)
        .map(|((pos, salary, _), p)| {
            let mut own = p * OWNERSHIP_SCALE * ownership_factor(*pos);
            if *salary > STUD_SALARY {
                own *= STUD_BOOST;
            }
            own.clamp(OWNERSHIP_MIN, OWNERSHIP_MAX)
        })
        .collect()
}
