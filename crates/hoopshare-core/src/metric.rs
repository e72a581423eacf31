// The fixed metric graph: every derived quantity, its declared inputs, and
// the dependency-ordered evaluation sequence.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::fields::*;

/// A derived metric computed by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Metric {
    // Team context
    TeamScoringPoss,
    TeamORBPercent,
    TeamPlayPercent,
    TeamORBWeight,
    TeamFGxPoss,
    TeamFTxPoss,
    TeamPoss,
    OpponentPoss,

    // Individual possessions
    #[serde(rename = "qAST")]
    QAst,
    FGPart,
    ASTPart,
    FTPart,
    ORBPart,
    ScoringPossessions,
    FGxPoss,
    FTxPoss,
    TotalPossessions,

    // Points produced
    PProdFGPart,
    PProdASTPart,
    PProdORBPart,
    PointsProduced,
    FloorPercentage,
    ORtg,

    // Offensive win shares
    MarginalOffensePlayer,
    MarginalPointsPerWin,
    OffensiveWinShares,

    // Defense
    DFGPercent,
    DORPercent,
    FMwt,
    StopsIndiv,
    StopsTeam,
    Stops,
    TeamDefensiveRating,
    DPtsPerScPoss,
    StopPercent,
    DRtg,
    MarginalDefense,
    MarginalPPW,
    DefensiveWinShares,

    WinShares,
}

/// One declared input of a metric: a raw record field or another metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    Field(&'static str),
    Metric(Metric),
}

use self::Input::{Field as F, Metric as M};

impl Metric {
    /// Every metric, in declaration order. Declaration order is only used to
    /// break ties in the topological sort.
    pub const ALL: [Metric; 40] = [
        Metric::TeamScoringPoss,
        Metric::TeamORBPercent,
        Metric::TeamPlayPercent,
        Metric::TeamORBWeight,
        Metric::TeamFGxPoss,
        Metric::TeamFTxPoss,
        Metric::TeamPoss,
        Metric::OpponentPoss,
        Metric::QAst,
        Metric::FGPart,
        Metric::ASTPart,
        Metric::FTPart,
        Metric::ORBPart,
        Metric::ScoringPossessions,
        Metric::FGxPoss,
        Metric::FTxPoss,
        Metric::TotalPossessions,
        Metric::PProdFGPart,
        Metric::PProdASTPart,
        Metric::PProdORBPart,
        Metric::PointsProduced,
        Metric::FloorPercentage,
        Metric::ORtg,
        Metric::MarginalOffensePlayer,
        Metric::MarginalPointsPerWin,
        Metric::OffensiveWinShares,
        Metric::DFGPercent,
        Metric::DORPercent,
        Metric::FMwt,
        Metric::StopsIndiv,
        Metric::StopsTeam,
        Metric::Stops,
        Metric::TeamDefensiveRating,
        Metric::DPtsPerScPoss,
        Metric::StopPercent,
        Metric::DRtg,
        Metric::MarginalDefense,
        Metric::MarginalPPW,
        Metric::DefensiveWinShares,
        Metric::WinShares,
    ];

    /// The name under which the metric appears in `DerivedMetrics`.
    pub fn name(self) -> &'static str {
        match self {
            Metric::TeamScoringPoss => "TeamScoringPoss",
            Metric::TeamORBPercent => "TeamORBPercent",
            Metric::TeamPlayPercent => "TeamPlayPercent",
            Metric::TeamORBWeight => "TeamORBWeight",
            Metric::TeamFGxPoss => "TeamFGxPoss",
            Metric::TeamFTxPoss => "TeamFTxPoss",
            Metric::TeamPoss => "TeamPoss",
            Metric::OpponentPoss => "OpponentPoss",
            Metric::QAst => "qAST",
            Metric::FGPart => "FGPart",
            Metric::ASTPart => "ASTPart",
            Metric::FTPart => "FTPart",
            Metric::ORBPart => "ORBPart",
            Metric::ScoringPossessions => "ScoringPossessions",
            Metric::FGxPoss => "FGxPoss",
            Metric::FTxPoss => "FTxPoss",
            Metric::TotalPossessions => "TotalPossessions",
            Metric::PProdFGPart => "PProdFGPart",
            Metric::PProdASTPart => "PProdASTPart",
            Metric::PProdORBPart => "PProdORBPart",
            Metric::PointsProduced => "PointsProduced",
            Metric::FloorPercentage => "FloorPercentage",
            Metric::ORtg => "ORtg",
            Metric::MarginalOffensePlayer => "MarginalOffensePlayer",
            Metric::MarginalPointsPerWin => "MarginalPointsPerWin",
            Metric::OffensiveWinShares => "OffensiveWinShares",
            Metric::DFGPercent => "DFGPercent",
            Metric::DORPercent => "DORPercent",
            Metric::FMwt => "FMwt",
            Metric::StopsIndiv => "StopsIndiv",
            Metric::StopsTeam => "StopsTeam",
            Metric::Stops => "Stops",
            Metric::TeamDefensiveRating => "TeamDefensiveRating",
            Metric::DPtsPerScPoss => "DPtsPerScPoss",
            Metric::StopPercent => "StopPercent",
            Metric::DRtg => "DRtg",
            Metric::MarginalDefense => "MarginalDefense",
            Metric::MarginalPPW => "MarginalPPW",
            Metric::DefensiveWinShares => "DefensiveWinShares",
            Metric::WinShares => "WinShares",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Declared inputs. The formula for each metric reads exactly these.
    pub fn inputs(self) -> &'static [Input] {
        match self {
            Metric::TeamScoringPoss => &[F(TEAM_FGM), F(TEAM_FTM), F(TEAM_FTA)],
            Metric::TeamORBPercent => &[F(TEAM_ORB), F(OPPONENT_TRB), F(OPPONENT_ORB)],
            Metric::TeamPlayPercent => &[
                M(Metric::TeamScoringPoss),
                F(TEAM_FGA),
                F(TEAM_FTA),
                F(TEAM_TOV),
            ],
            Metric::TeamORBWeight => &[M(Metric::TeamPlayPercent), M(Metric::TeamORBPercent)],
            Metric::TeamFGxPoss => &[F(TEAM_FGA), F(TEAM_FGM), M(Metric::TeamORBPercent)],
            Metric::TeamFTxPoss => &[F(TEAM_FTM), F(TEAM_FTA)],
            Metric::TeamPoss => &[F(TEAM_FGA), F(TEAM_FTA), F(TEAM_ORB), F(TEAM_TOV)],
            Metric::OpponentPoss => &[
                F(OPPONENT_FGA),
                F(OPPONENT_FTA),
                F(OPPONENT_ORB),
                F(OPPONENT_TOV),
            ],
            Metric::QAst => &[F(MP), F(TEAM_MP), F(TEAM_AST), F(AST), F(TEAM_FGM), F(FGM)],
            Metric::FGPart => &[F(FGM), F(PTS), F(FTM), F(FGA), M(Metric::QAst)],
            Metric::ASTPart => &[
                F(TEAM_PTS),
                F(TEAM_FTM),
                F(PTS),
                F(FTM),
                F(TEAM_FGA),
                F(FGA),
                F(AST),
            ],
            Metric::FTPart => &[F(FTM), F(FTA)],
            Metric::ORBPart => &[F(ORB), M(Metric::TeamORBWeight), M(Metric::TeamPlayPercent)],
            Metric::ScoringPossessions => &[
                M(Metric::FGPart),
                M(Metric::ASTPart),
                M(Metric::FTPart),
                F(TEAM_ORB),
                M(Metric::TeamScoringPoss),
                M(Metric::TeamORBWeight),
                M(Metric::TeamPlayPercent),
                M(Metric::ORBPart),
            ],
            Metric::FGxPoss => &[F(FGA), F(FGM), M(Metric::TeamORBPercent)],
            Metric::FTxPoss => &[F(FTM), F(FTA)],
            Metric::TotalPossessions => &[
                M(Metric::ScoringPossessions),
                M(Metric::FGxPoss),
                M(Metric::FTxPoss),
                F(TOV),
            ],
            Metric::PProdFGPart => &[F(FGM), F(THREE_PM), F(PTS), F(FTM), F(FGA), M(Metric::QAst)],
            Metric::PProdASTPart => &[
                F(TEAM_FGM),
                F(FGM),
                F(TEAM_3PM),
                F(THREE_PM),
                F(TEAM_PTS),
                F(TEAM_FTM),
                F(PTS),
                F(FTM),
                F(TEAM_FGA),
                F(FGA),
                F(AST),
            ],
            Metric::PProdORBPart => &[
                F(ORB),
                M(Metric::TeamORBWeight),
                M(Metric::TeamPlayPercent),
                F(TEAM_PTS),
                M(Metric::TeamScoringPoss),
            ],
            Metric::PointsProduced => &[
                M(Metric::PProdFGPart),
                M(Metric::PProdASTPart),
                F(FTM),
                F(TEAM_ORB),
                M(Metric::TeamScoringPoss),
                M(Metric::TeamORBWeight),
                M(Metric::TeamPlayPercent),
                M(Metric::PProdORBPart),
            ],
            Metric::FloorPercentage => &[M(Metric::ScoringPossessions), M(Metric::TotalPossessions)],
            Metric::ORtg => &[M(Metric::PointsProduced), M(Metric::TotalPossessions)],
            Metric::MarginalOffensePlayer => &[
                M(Metric::PointsProduced),
                F(LPPP),
                M(Metric::TotalPossessions),
            ],
            Metric::MarginalPointsPerWin => &[F(LPPG), F(TEAM_PACE), F(LEAGUE_PACE)],
            Metric::OffensiveWinShares => &[
                M(Metric::MarginalOffensePlayer),
                M(Metric::MarginalPointsPerWin),
            ],
            Metric::DFGPercent => &[F(OPPONENT_FGM), F(OPPONENT_FGA)],
            Metric::DORPercent => &[F(OPPONENT_ORB), F(TEAM_DRB)],
            Metric::FMwt => &[M(Metric::DFGPercent), M(Metric::DORPercent)],
            Metric::StopsIndiv => &[
                F(STL),
                F(BLK),
                M(Metric::FMwt),
                M(Metric::DORPercent),
                F(DRB),
            ],
            Metric::StopsTeam => &[
                F(OPPONENT_FGA),
                F(OPPONENT_FGM),
                F(TEAM_BLK),
                F(TEAM_MP),
                M(Metric::FMwt),
                M(Metric::DORPercent),
                F(OPPONENT_TOV),
                F(TEAM_STL),
                F(MP),
                F(PF),
                F(TEAM_PF),
                F(OPPONENT_FTA),
                F(OPPONENT_FTM),
            ],
            Metric::Stops => &[M(Metric::StopsIndiv), M(Metric::StopsTeam)],
            Metric::TeamDefensiveRating => &[F(OPPONENT_PTS), M(Metric::TeamPoss)],
            Metric::DPtsPerScPoss => &[
                F(OPPONENT_PTS),
                F(OPPONENT_FGM),
                F(OPPONENT_FTM),
                F(OPPONENT_FTA),
            ],
            Metric::StopPercent => &[
                M(Metric::Stops),
                F(OPPONENT_MP),
                M(Metric::TeamPoss),
                F(MP),
            ],
            Metric::DRtg => &[
                M(Metric::TeamDefensiveRating),
                M(Metric::DPtsPerScPoss),
                M(Metric::StopPercent),
            ],
            Metric::MarginalDefense => &[
                F(MP),
                F(TEAM_MP),
                M(Metric::OpponentPoss),
                F(LPPP),
                M(Metric::DRtg),
            ],
            Metric::MarginalPPW => &[F(LPPG), F(TEAM_PACE), F(LEAGUE_PACE)],
            Metric::DefensiveWinShares => &[M(Metric::MarginalDefense), M(Metric::MarginalPPW)],
            Metric::WinShares => &[
                M(Metric::OffensiveWinShares),
                M(Metric::DefensiveWinShares),
            ],
        }
    }

    /// Metrics this one reads directly.
    pub fn dependencies(self) -> impl Iterator<Item = Metric> {
        self.inputs().iter().filter_map(|input| match input {
            Input::Metric(m) => Some(*m),
            Input::Field(_) => None,
        })
    }

    /// Record fields this one reads directly.
    pub fn direct_fields(self) -> impl Iterator<Item = &'static str> {
        self.inputs().iter().filter_map(|input| match input {
            Input::Field(f) => Some(*f),
            Input::Metric(_) => None,
        })
    }

    /// Every record field needed to compute this metric, including the
    /// fields behind its dependencies.
    pub fn required_fields(self) -> BTreeSet<&'static str> {
        let mut out = BTreeSet::new();
        let mut stack = vec![self];
        let mut seen = BTreeSet::new();
        while let Some(metric) = stack.pop() {
            if !seen.insert(metric) {
                continue;
            }
            out.extend(metric.direct_fields());
            stack.extend(metric.dependencies());
        }
        out
    }

    /// All metrics in dependency order: every metric appears after all of
    /// its dependencies.
    pub fn evaluation_order() -> &'static [Metric] {
        static ORDER: OnceLock<Vec<Metric>> = OnceLock::new();
        ORDER.get_or_init(topological_order)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Topological sort
// ---------------------------------------------------------------------------

/// Kahn's algorithm over the declared dependencies. Among metrics that are
/// ready at the same time, declaration order wins so the result is stable.
fn topological_order() -> Vec<Metric> {
    let mut remaining: HashMap<Metric, usize> = Metric::ALL
        .iter()
        .map(|m| (*m, m.dependencies().count()))
        .collect();
    let mut order = Vec::with_capacity(Metric::ALL.len());

    while order.len() < Metric::ALL.len() {
        let Some(next) = Metric::ALL
            .iter()
            .copied()
            .find(|m| remaining.get(m) == Some(&0))
        else {
            // The graph is fixed; a cycle here is a programming error caught by tests.
            break;
        };
        remaining.remove(&next);
        order.push(next);
        for (metric, count) in remaining.iter_mut() {
            *count -= metric.dependencies().filter(|d| *d == next).count();
        }
    }
    order
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
