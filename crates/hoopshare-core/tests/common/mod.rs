// Shared fixtures for the calculator integration tests.

#![allow(dead_code)]

use hoopshare_core::StatRecord;

/// LeBron James, Cleveland 2008-09 regular season, with team, opponent and
/// league context for the same season.
pub fn lebron_2008_09() -> StatRecord {
    StatRecord::from_pairs([
        ("FGM", 789.0),
        ("FGA", 1613.0),
        ("FTM", 594.0),
        ("FTA", 762.0),
        ("ORB", 106.0),
        ("DRB", 507.0),
        ("AST", 587.0),
        ("TOV", 241.0),
        ("PTS", 2304.0),
        ("3PM", 132.0),
        ("BLK", 93.0),
        ("STL", 137.0),
        ("PF", 139.0),
        ("MP", 3054.0),
        ("Team_FGM", 3022.0),
        ("Team_FGA", 6454.0),
        ("Team_FTM", 1523.0),
        ("Team_FTA", 2012.0),
        ("Team_ORB", 886.0),
        ("Team_DRB", 2574.0),
        ("Team_AST", 1663.0),
        ("Team_TOV", 1045.0),
        ("Team_PTS", 8223.0),
        ("Team_3PM", 656.0),
        ("Team_BLK", 435.0),
        ("Team_STL", 593.0),
        ("Team_PF", 1663.0),
        ("Team_MP", 19780.0),
        ("Opponent_TRB", 3188.0),
        ("Opponent_ORB", 878.0),
        ("Opponent_FGA", 6444.0),
        ("Opponent_FGM", 2775.0),
        ("Opponent_PTS", 7491.0),
        ("Opponent_FTA", 1459.0),
        ("Opponent_FTM", 1895.0),
        ("Opponent_TOV", 1137.0),
        ("Opponent_MP", 19780.0),
        ("LPPP", 1.083),
        ("LPPG", 100.0),
        ("Team_Pace", 88.7),
        ("League_Pace", 91.7),
    ])
    .expect("fixture is valid")
}

/// The same season with no field-goal attempts (and therefore no makes).
pub fn no_field_goal_attempts() -> StatRecord {
    lebron_2008_09()
        .with_value("FGA", 0.0)
        .and_then(|r| r.with_value("FGM", 0.0))
        .and_then(|r| r.with_value("3PM", 0.0))
        .and_then(|r| r.with_value("PTS", 594.0))
        .expect("values are valid")
}

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
