// Box-score loading and per-game splitting.
//
// One CSV per game, named YYYYMMDD.csv, with one row per player and a Team
// column (0 or 1) telling the two sides apart. Counting stats are parsed
// strictly: a cell that is not a non-negative integer is an error, not a
// zero.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hoopshare_core::StatLine;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::minutes::{self, MinutesError};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player's row from a game file.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxScoreRow {
    pub player: String,
    pub team: u8,
    pub line: StatLine,
}

/// A parsed game file.
#[derive(Debug, Clone)]
pub struct GameBoxScore {
    pub source: String,
    /// Taken from the file name; `None` when the stem is not a YYYYMMDD date.
    pub date: Option<NaiveDate>,
    pub rows: Vec<BoxScoreRow>,
}

/// A game seen from one player's side: their line, their team's line, and
/// the opposing team's line.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSplit {
    pub date: Option<NaiveDate>,
    pub player: StatLine,
    pub team: StatLine,
    pub opponent: StatLine,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BoxScoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}, line {line}: invalid {column} value `{value}`")]
    InvalidValue {
        path: String,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("{path}, line {line}: {source}")]
    InvalidMinutes {
        path: String,
        line: u64,
        source: MinutesError,
    },

    #[error("{path}, line {line}: team index must be 0 or 1, got `{value}`")]
    InvalidTeam {
        path: String,
        line: u64,
        value: String,
    },

    #[error("player `{player}` not found in {path}")]
    PlayerNotFound { player: String, path: String },

    #[error("no games for `{player}` in {dir}")]
    NoGames { player: String, dir: String },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// Box-score row as it appears on disk. Every cell is read as text so the
/// numeric parse can name the offending column. Percentage and plus/minus
/// columns are not read.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRow {
    Player: String,
    #[serde(default)]
    MP: String,
    #[serde(default)]
    FGM: String,
    #[serde(default)]
    FGA: String,
    #[serde(default, rename = "3PM")]
    TPM: String,
    #[serde(default, rename = "3PA")]
    TPA: String,
    #[serde(default)]
    FTM: String,
    #[serde(default)]
    FTA: String,
    #[serde(default)]
    ORB: String,
    #[serde(default)]
    DRB: String,
    #[serde(default)]
    TRB: String,
    #[serde(default)]
    AST: String,
    #[serde(default)]
    STL: String,
    #[serde(default)]
    BLK: String,
    #[serde(default)]
    TOV: String,
    #[serde(default)]
    PF: String,
    #[serde(default)]
    PTS: String,
    Team: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Summary and section rows that are not players.
fn is_placeholder(name: &str) -> bool {
    name.is_empty()
        || name == "Team Totals"
        || name == "Reserves"
        || name.chars().all(|c| c.is_ascii_digit())
}

/// Game date from a `YYYYMMDD.csv` file name.
pub fn date_from_path(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, "%Y%m%d").ok()
}

struct RowParser<'a> {
    path: &'a str,
    line: u64,
}

impl RowParser<'_> {
    fn count(&self, column: &'static str, value: &str) -> Result<u32, BoxScoreError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(0);
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.invalid(column, value));
        }
        value.parse().map_err(|_| self.invalid(column, value))
    }

    fn invalid(&self, column: &'static str, value: &str) -> BoxScoreError {
        BoxScoreError::InvalidValue {
            path: self.path.to_string(),
            line: self.line,
            column,
            value: value.to_string(),
        }
    }

    fn team(&self, value: &str) -> Result<u8, BoxScoreError> {
        match value.trim() {
            "0" => Ok(0),
            "1" => Ok(1),
            other => Err(BoxScoreError::InvalidTeam {
                path: self.path.to_string(),
                line: self.line,
                value: other.to_string(),
            }),
        }
    }

    fn stat_line(&self, raw: &RawRow) -> Result<StatLine, BoxScoreError> {
        let mp = minutes::parse_minutes(&raw.MP).map_err(|source| {
            BoxScoreError::InvalidMinutes {
                path: self.path.to_string(),
                line: self.line,
                source,
            }
        })?;
        Ok(StatLine {
            mp,
            fgm: self.count("FGM", &raw.FGM)?,
            fga: self.count("FGA", &raw.FGA)?,
            tpm: self.count("3PM", &raw.TPM)?,
            tpa: self.count("3PA", &raw.TPA)?,
            ftm: self.count("FTM", &raw.FTM)?,
            fta: self.count("FTA", &raw.FTA)?,
            orb: self.count("ORB", &raw.ORB)?,
            drb: self.count("DRB", &raw.DRB)?,
            trb: self.count("TRB", &raw.TRB)?,
            ast: self.count("AST", &raw.AST)?,
            stl: self.count("STL", &raw.STL)?,
            blk: self.count("BLK", &raw.BLK)?,
            tov: self.count("TOV", &raw.TOV)?,
            pf: self.count("PF", &raw.PF)?,
            pts: self.count("PTS", &raw.PTS)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_rows_from_reader<R: Read>(rdr: R, path: &str) -> Result<Vec<BoxScoreRow>, BoxScoreError> {
    let csv_err = |source| BoxScoreError::Csv {
        path: path.to_string(),
        source,
    };

    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        let line = record.position().map_or(0, |p| p.line());
        let raw: RawRow = record.deserialize(Some(&headers)).map_err(csv_err)?;

        let name = raw.Player.trim();
        if is_placeholder(name) {
            debug!("{}: skipping summary row '{}'", path, name);
            continue;
        }
        if !minutes::is_clock(&raw.MP) {
            warn!("{}: skipping '{}': no minutes ({})", path, name, raw.MP.trim());
            continue;
        }

        let parser = RowParser { path, line };
        rows.push(BoxScoreRow {
            player: name.to_string(),
            team: parser.team(&raw.Team)?,
            line: parser.stat_line(&raw)?,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load one game file.
pub fn load_game(path: &Path) -> Result<GameBoxScore, BoxScoreError> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| BoxScoreError::Io {
        path: source.clone(),
        source: e,
    })?;
    let rows = load_rows_from_reader(file, &source)?;
    let date = date_from_path(path);
    if date.is_none() {
        warn!("{}: file name is not a YYYYMMDD date", source);
    }
    Ok(GameBoxScore { source, date, rows })
}

/// Every `.csv` file in `dir`, sorted by name (chronological for YYYYMMDD
/// names).
pub fn game_files(dir: &Path) -> Result<Vec<PathBuf>, BoxScoreError> {
    let io_err = |e| BoxScoreError::Io {
        path: dir.display().to_string(),
        source: e,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every game file in `dir`.
pub fn load_games(dir: &Path) -> Result<Vec<GameBoxScore>, BoxScoreError> {
    game_files(dir)?.iter().map(|p| load_game(p)).collect()
}

// ---------------------------------------------------------------------------
// Game split
// ---------------------------------------------------------------------------

impl GameBoxScore {
    /// Parse a game from any reader. `source` names it in errors.
    pub fn from_reader<R: Read>(rdr: R, source: &str) -> Result<Self, BoxScoreError> {
        Ok(GameBoxScore {
            source: source.to_string(),
            date: date_from_path(Path::new(source)),
            rows: load_rows_from_reader(rdr, source)?,
        })
    }

    /// Split the game around `player`: their row, the sum of their side's
    /// rows, and the sum of the other side's rows.
    pub fn split(&self, player: &str) -> Result<GameSplit, BoxScoreError> {
        let subject = self
            .rows
            .iter()
            .find(|r| r.player == player)
            .ok_or_else(|| BoxScoreError::PlayerNotFound {
                player: player.to_string(),
                path: self.source.clone(),
            })?;

        let mut team = StatLine::default();
        let mut opponent = StatLine::default();
        for row in &self.rows {
            if row.team == subject.team {
                team += &row.line;
            } else {
                opponent += &row.line;
            }
        }

        Ok(GameSplit {
            date: self.date,
            player: subject.line,
            team,
            opponent,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
