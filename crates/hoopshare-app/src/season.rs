// Season aggregation: per-game splits summed into the player, team and
// opponent season lines that make up a StatRecord.

use std::path::Path;

use chrono::NaiveDate;
use hoopshare_core::{LeagueContext, RecordError, StatLine, StatRecord};
use serde::Serialize;
use tracing::{info, warn};

use crate::boxscore::{self, BoxScoreError, GameBoxScore, GameSplit};

/// Running totals over the games a player appeared in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonTotals {
    pub player: StatLine,
    pub team: StatLine,
    pub opponent: StatLine,
    pub games: usize,
    pub first_game: Option<NaiveDate>,
    pub last_game: Option<NaiveDate>,
}

impl SeasonTotals {
    pub fn add_game(&mut self, split: &GameSplit) {
        self.player += &split.player;
        self.team += &split.team;
        self.opponent += &split.opponent;
        self.games += 1;

        if let Some(date) = split.date {
            self.first_game = Some(self.first_game.map_or(date, |d| d.min(date)));
            self.last_game = Some(self.last_game.map_or(date, |d| d.max(date)));
        }
    }

    /// Merge the season lines with the league context into one record.
    pub fn to_record(&self, league: &LeagueContext) -> Result<StatRecord, RecordError> {
        StatRecord::assemble(&self.player, &self.team, &self.opponent, league)
    }
}

/// Sum `player`'s games. Games they did not appear in are skipped; having
/// no games at all is an error.
pub fn aggregate(
    games: &[GameBoxScore],
    player: &str,
    dir: &str,
) -> Result<SeasonTotals, BoxScoreError> {
    let mut totals = SeasonTotals::default();
    for game in games {
        match game.split(player) {
            Ok(split) => totals.add_game(&split),
            Err(BoxScoreError::PlayerNotFound { .. }) => {
                warn!("{}: '{}' did not play, skipping game", game.source, player);
            }
            Err(e) => return Err(e),
        }
    }

    if totals.games == 0 {
        return Err(BoxScoreError::NoGames {
            player: player.to_string(),
            dir: dir.to_string(),
        });
    }
    Ok(totals)
}

/// Load every game file in `dir` and aggregate `player`'s season.
pub fn load_season(dir: &Path, player: &str) -> Result<SeasonTotals, BoxScoreError> {
    let games = boxscore::load_games(dir)?;
    info!("Loaded {} box score(s) from {}", games.len(), dir.display());
    let totals = aggregate(&games, player, &dir.display().to_string())?;
    info!(
        "Aggregated {} game(s) for {}: {} PTS in {:.1} MP",
        totals.games, player, totals.player.pts, totals.player.mp
    );
    Ok(totals)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
