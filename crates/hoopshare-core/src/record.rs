// StatRecord: the flat, validated input record handed to the calculator,
// plus the typed partitions (player/team/opponent lines, league context)
// and the merge step that assembles them.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing required field(s): {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("invalid value for `{field}`: {value} (expected a finite, non-negative number)")]
    InvalidInput { field: String, value: f64 },

    #[error("field `{field}` supplied by more than one source")]
    KeyCollision { field: String },
}

// ---------------------------------------------------------------------------
// Typed partitions
// ---------------------------------------------------------------------------

/// One partition's counting stats: a single player, or a team/opponent
/// aggregate, over one or more games.
///
/// Counts are integers; minutes are fractional because they come from
/// clock-format strings (`"37:12"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub mp: f64,
    pub fgm: u32,
    pub fga: u32,
    pub tpm: u32,
    pub tpa: u32,
    pub ftm: u32,
    pub fta: u32,
    pub orb: u32,
    pub drb: u32,
    pub trb: u32,
    pub ast: u32,
    pub stl: u32,
    pub blk: u32,
    pub tov: u32,
    pub pf: u32,
    pub pts: u32,
}

impl StatLine {
    /// Unprefixed field names paired with their values, counts widened to f64.
    pub fn entries(&self) -> [(&'static str, f64); 16] {
        [
            (fields::MP, self.mp),
            (fields::FGM, self.fgm as f64),
            (fields::FGA, self.fga as f64),
            (fields::THREE_PM, self.tpm as f64),
            (fields::THREE_PA, self.tpa as f64),
            (fields::FTM, self.ftm as f64),
            (fields::FTA, self.fta as f64),
            (fields::ORB, self.orb as f64),
            (fields::DRB, self.drb as f64),
            (fields::TRB, self.trb as f64),
            (fields::AST, self.ast as f64),
            (fields::STL, self.stl as f64),
            (fields::BLK, self.blk as f64),
            (fields::TOV, self.tov as f64),
            (fields::PF, self.pf as f64),
            (fields::PTS, self.pts as f64),
        ]
    }
}

impl AddAssign<&StatLine> for StatLine {
    fn add_assign(&mut self, rhs: &StatLine) {
        self.mp += rhs.mp;
        self.fgm += rhs.fgm;
        self.fga += rhs.fga;
        self.tpm += rhs.tpm;
        self.tpa += rhs.tpa;
        self.ftm += rhs.ftm;
        self.fta += rhs.fta;
        self.orb += rhs.orb;
        self.drb += rhs.drb;
        self.trb += rhs.trb;
        self.ast += rhs.ast;
        self.stl += rhs.stl;
        self.blk += rhs.blk;
        self.tov += rhs.tov;
        self.pf += rhs.pf;
        self.pts += rhs.pts;
    }
}

/// Season-level league constants plus the team's pace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeagueContext {
    /// League points per possession.
    pub lppp: f64,
    /// League points per game.
    pub lppg: f64,
    pub team_pace: f64,
    pub league_pace: f64,
}

impl LeagueContext {
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            (fields::LPPP, self.lppp),
            (fields::LPPG, self.lppg),
            (fields::TEAM_PACE, self.team_pace),
            (fields::LEAGUE_PACE, self.league_pace),
        ]
    }
}

// ---------------------------------------------------------------------------
// StatRecord
// ---------------------------------------------------------------------------

/// Flat mapping from field name to value. Every value is finite and
/// non-negative; this is enforced on construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct StatRecord {
    values: BTreeMap<String, f64>,
}

fn check_value(field: &str, value: f64) -> Result<(), RecordError> {
    if !value.is_finite() || value < 0.0 {
        return Err(RecordError::InvalidInput {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

impl StatRecord {
    /// Build a record from `(name, value)` pairs. A name appearing twice is a
    /// `KeyCollision`.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut builder = RecordBuilder::new();
        for (name, value) in pairs {
            builder.insert(name, value)?;
        }
        Ok(builder.build())
    }

    /// The merge step: player line unprefixed, team line under `Team_`,
    /// opponent line under `Opponent_`, then the league context.
    pub fn assemble(
        player: &StatLine,
        team: &StatLine,
        opponent: &StatLine,
        league: &LeagueContext,
    ) -> Result<Self, RecordError> {
        let mut builder = RecordBuilder::new();
        builder.line("", player)?;
        builder.line(fields::TEAM_PREFIX, team)?;
        builder.line(fields::OPPONENT_PREFIX, opponent)?;
        builder.league(league)?;
        Ok(builder.build())
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Check that every field in `required` is present, reporting all of the
    /// missing names (sorted, deduplicated) rather than the first one.
    pub fn require<'a, I>(&self, required: I) -> Result<(), RecordError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = required
            .into_iter()
            .filter(|f| !self.contains(f))
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        missing.dedup();
        Err(RecordError::MissingFields { fields: missing })
    }

    /// A copy of this record with one field set (added or replaced).
    pub fn with_value(&self, field: &str, value: f64) -> Result<Self, RecordError> {
        check_value(field, value)?;
        let mut values = self.values.clone();
        values.insert(field.to_string(), value);
        Ok(StatRecord { values })
    }

    /// A copy of this record with one field removed.
    pub fn without(&self, field: &str) -> Self {
        let mut values = self.values.clone();
        values.remove(field);
        StatRecord { values }
    }
}

// ---------------------------------------------------------------------------
// RecordBuilder
// ---------------------------------------------------------------------------

/// Incremental, collision-checked construction of a `StatRecord`.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    values: BTreeMap<String, f64>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: f64) -> Result<(), RecordError> {
        let field = field.into();
        check_value(&field, value)?;
        if self.values.contains_key(&field) {
            return Err(RecordError::KeyCollision { field });
        }
        self.values.insert(field, value);
        Ok(())
    }

    /// Insert every entry of `line` under `prefix` (`""` for the player).
    pub fn line(&mut self, prefix: &str, line: &StatLine) -> Result<(), RecordError> {
        for (name, value) in line.entries() {
            self.insert(format!("{prefix}{name}"), value)?;
        }
        Ok(())
    }

    pub fn league(&mut self, league: &LeagueContext) -> Result<(), RecordError> {
        for (name, value) in league.entries() {
            self.insert(name, value)?;
        }
        Ok(())
    }

    pub fn build(self) -> StatRecord {
        StatRecord {
            values: self.values,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
