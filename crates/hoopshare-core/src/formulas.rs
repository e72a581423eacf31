// Formula bodies for every metric.
//
// Each arm reads only the inputs its metric declares in `Metric::inputs`.
// Divisions go through `Scope::div`, so a zero divisor becomes a named
// failure instead of an infinity or NaN leaking downstream.

use std::collections::HashMap;

use crate::engine::FailureCause;
use crate::fields::*;
use crate::metric::Metric;
use crate::record::StatRecord;

/// Read access to the record and the already-computed metrics while one
/// metric is being evaluated.
pub(crate) struct Scope<'a> {
    metric: Metric,
    record: &'a StatRecord,
    memo: &'a HashMap<Metric, f64>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        metric: Metric,
        record: &'a StatRecord,
        memo: &'a HashMap<Metric, f64>,
    ) -> Self {
        Scope { metric, record, memo }
    }

    /// A record field. The engine validates fields up front, so a miss here
    /// only happens when a formula reads something it did not declare.
    fn f(&self, field: &'static str) -> Result<f64, FailureCause> {
        debug_assert!(
            self.metric.direct_fields().any(|d| d == field),
            "{} reads undeclared field {}",
            self.metric,
            field
        );
        self.record.get(field).ok_or_else(|| FailureCause::MissingFields {
            fields: vec![field.to_string()],
        })
    }

    /// A dependency's memoized value.
    fn m(&self, metric: Metric) -> Result<f64, FailureCause> {
        debug_assert!(
            self.metric.dependencies().any(|d| d == metric),
            "{} reads undeclared metric {}",
            self.metric,
            metric
        );
        self.memo
            .get(&metric)
            .copied()
            .ok_or(FailureCause::Unresolved { metric })
    }

    fn div(&self, num: f64, den: f64, denominator: &'static str) -> Result<f64, FailureCause> {
        if den == 0.0 {
            return Err(FailureCause::DivisionByZero { denominator });
        }
        Ok(num / den)
    }

    /// `(1 - made/attempted)^2`, the squared free-throw miss rate.
    fn ft_miss_sq(&self, made: &'static str, attempted: &'static str) -> Result<f64, FailureCause> {
        let rate = self.div(self.f(made)?, self.f(attempted)?, attempted)?;
        Ok((1.0 - rate).powi(2))
    }
}

/// Evaluate one metric's formula.
pub(crate) fn compute(metric: Metric, s: &Scope<'_>) -> Result<f64, FailureCause> {
    match metric {
        // ---- team context ----
        Metric::TeamScoringPoss => {
            let miss = s.ft_miss_sq(TEAM_FTM, TEAM_FTA)?;
            Ok(s.f(TEAM_FGM)? + (1.0 - miss) * s.f(TEAM_FTA)? * 0.4)
        }
        Metric::TeamORBPercent => {
            let orb = s.f(TEAM_ORB)?;
            let opp_drb = s.f(OPPONENT_TRB)? - s.f(OPPONENT_ORB)?;
            s.div(orb, orb + opp_drb, "Team_ORB + Opponent_DRB")
        }
        Metric::TeamPlayPercent => {
            let plays = s.f(TEAM_FGA)? + s.f(TEAM_FTA)? * 0.4 + s.f(TEAM_TOV)?;
            s.div(s.m(Metric::TeamScoringPoss)?, plays, "Team_FGA + 0.4 * Team_FTA + Team_TOV")
        }
        Metric::TeamORBWeight => {
            let play = s.m(Metric::TeamPlayPercent)?;
            let orb = s.m(Metric::TeamORBPercent)?;
            let num = (1.0 - orb) * play;
            s.div(num, num + orb * (1.0 - play), "TeamORBWeight denominator")
        }
        Metric::TeamFGxPoss => {
            let misses = s.f(TEAM_FGA)? - s.f(TEAM_FGM)?;
            Ok(misses * (1.0 - 1.07 * s.m(Metric::TeamORBPercent)?))
        }
        Metric::TeamFTxPoss => Ok(s.ft_miss_sq(TEAM_FTM, TEAM_FTA)? * 0.4 * s.f(TEAM_FTA)?),
        Metric::TeamPoss => {
            Ok(s.f(TEAM_FGA)? + 0.44 * s.f(TEAM_FTA)? - s.f(TEAM_ORB)? + s.f(TEAM_TOV)?)
        }
        Metric::OpponentPoss => Ok(s.f(OPPONENT_FGA)? + 0.44 * s.f(OPPONENT_FTA)?
            - s.f(OPPONENT_ORB)?
            + s.f(OPPONENT_TOV)?),

        // ---- individual possessions ----
        Metric::QAst => {
            let mp = s.f(MP)?;
            let team_mp = s.f(TEAM_MP)?;
            let team_ast = s.f(TEAM_AST)?;
            let team_fgm = s.f(TEAM_FGM)?;
            let ast = s.f(AST)?;
            let fgm = s.f(FGM)?;

            let share = s.div(mp, team_mp / 5.0, "Team_MP / 5")?;
            let teammates = share * (1.14 * s.div(team_ast - ast, team_fgm, TEAM_FGM)?);
            let on_court_ast = s.div(team_ast, team_mp, TEAM_MP)? * mp * 5.0 - ast;
            let on_court_fgm = s.div(team_fgm, team_mp, TEAM_MP)? * mp * 5.0 - fgm;
            let assisted = s.div(on_court_ast, on_court_fgm, "teammates' on-court FGM")?;
            let bench = assisted * (1.0 - share);
            Ok(teammates + bench)
        }
        Metric::FGPart => {
            let fg_pts = s.div(s.f(PTS)? - s.f(FTM)?, 2.0 * s.f(FGA)?, "2 * FGA")?;
            Ok(s.f(FGM)? * (1.0 - 0.5 * fg_pts * s.m(Metric::QAst)?))
        }
        Metric::ASTPart => {
            let teammate_fg_pts = (s.f(TEAM_PTS)? - s.f(TEAM_FTM)?) - (s.f(PTS)? - s.f(FTM)?);
            let per_attempt = s.div(
                teammate_fg_pts,
                2.0 * (s.f(TEAM_FGA)? - s.f(FGA)?),
                "2 * (Team_FGA - FGA)",
            )?;
            Ok(0.5 * per_attempt * s.f(AST)?)
        }
        Metric::FTPart => Ok((1.0 - s.ft_miss_sq(FTM, FTA)?) * 0.4 * s.f(FTA)?),
        Metric::ORBPart => Ok(s.f(ORB)?
            * s.m(Metric::TeamORBWeight)?
            * s.m(Metric::TeamPlayPercent)?),
        Metric::ScoringPossessions => {
            let parts = s.m(Metric::FGPart)? + s.m(Metric::ASTPart)? + s.m(Metric::FTPart)?;
            let orb_ratio = s.div(s.f(TEAM_ORB)?, s.m(Metric::TeamScoringPoss)?, "TeamScoringPoss")?;
            let orb_adjust =
                1.0 - orb_ratio * s.m(Metric::TeamORBWeight)? * s.m(Metric::TeamPlayPercent)?;
            Ok(parts * orb_adjust + s.m(Metric::ORBPart)?)
        }
        Metric::FGxPoss => {
            let misses = s.f(FGA)? - s.f(FGM)?;
            Ok(misses * (1.0 - 1.07 * s.m(Metric::TeamORBPercent)?))
        }
        Metric::FTxPoss => Ok(s.ft_miss_sq(FTM, FTA)? * 0.4 * s.f(FTA)?),
        Metric::TotalPossessions => Ok(s.m(Metric::ScoringPossessions)?
            + s.m(Metric::FGxPoss)?
            + s.m(Metric::FTxPoss)?
            + s.f(TOV)?),

        // ---- points produced ----
        Metric::PProdFGPart => {
            let fg_pts = s.div(s.f(PTS)? - s.f(FTM)?, 2.0 * s.f(FGA)?, "2 * FGA")?;
            let weighted_fgm = s.f(FGM)? + 0.5 * s.f(THREE_PM)?;
            Ok(2.0 * weighted_fgm * (1.0 - 0.5 * fg_pts * s.m(Metric::QAst)?))
        }
        Metric::PProdASTPart => {
            let teammate_fgm = s.f(TEAM_FGM)? - s.f(FGM)?;
            let teammate_3pm = s.f(TEAM_3PM)? - s.f(THREE_PM)?;
            let value_per_make =
                s.div(teammate_fgm + 0.5 * teammate_3pm, teammate_fgm, "Team_FGM - FGM")?;
            let teammate_fg_pts = (s.f(TEAM_PTS)? - s.f(TEAM_FTM)?) - (s.f(PTS)? - s.f(FTM)?);
            let per_attempt = s.div(
                teammate_fg_pts,
                2.0 * (s.f(TEAM_FGA)? - s.f(FGA)?),
                "2 * (Team_FGA - FGA)",
            )?;
            Ok(2.0 * value_per_make * 0.5 * per_attempt * s.f(AST)?)
        }
        Metric::PProdORBPart => {
            let pts_per_scoring_poss =
                s.div(s.f(TEAM_PTS)?, s.m(Metric::TeamScoringPoss)?, "TeamScoringPoss")?;
            Ok(s.f(ORB)?
                * s.m(Metric::TeamORBWeight)?
                * s.m(Metric::TeamPlayPercent)?
                * pts_per_scoring_poss)
        }
        Metric::PointsProduced => {
            let parts = s.m(Metric::PProdFGPart)? + s.m(Metric::PProdASTPart)? + s.f(FTM)?;
            let orb_ratio = s.div(s.f(TEAM_ORB)?, s.m(Metric::TeamScoringPoss)?, "TeamScoringPoss")?;
            let orb_adjust =
                1.0 - orb_ratio * s.m(Metric::TeamORBWeight)? * s.m(Metric::TeamPlayPercent)?;
            Ok(parts * orb_adjust + s.m(Metric::PProdORBPart)?)
        }
        Metric::FloorPercentage => s.div(
            s.m(Metric::ScoringPossessions)?,
            s.m(Metric::TotalPossessions)?,
            "TotalPossessions",
        ),
        Metric::ORtg => Ok(100.0
            * s.div(
                s.m(Metric::PointsProduced)?,
                s.m(Metric::TotalPossessions)?,
                "TotalPossessions",
            )?),

        // ---- offensive win shares ----
        Metric::MarginalOffensePlayer => Ok(s.m(Metric::PointsProduced)?
            - 0.92 * s.f(LPPP)? * s.m(Metric::TotalPossessions)?),
        Metric::MarginalPointsPerWin | Metric::MarginalPPW => {
            let pace = s.div(s.f(TEAM_PACE)?, s.f(LEAGUE_PACE)?, LEAGUE_PACE)?;
            Ok(0.32 * s.f(LPPG)? * pace)
        }
        Metric::OffensiveWinShares => s.div(
            s.m(Metric::MarginalOffensePlayer)?,
            s.m(Metric::MarginalPointsPerWin)?,
            "MarginalPointsPerWin",
        ),

        // ---- defense ----
        Metric::DFGPercent => s.div(s.f(OPPONENT_FGM)?, s.f(OPPONENT_FGA)?, OPPONENT_FGA),
        Metric::DORPercent => {
            let opp_orb = s.f(OPPONENT_ORB)?;
            s.div(opp_orb, opp_orb + s.f(TEAM_DRB)?, "Opponent_ORB + Team_DRB")
        }
        Metric::FMwt => {
            let dfg = s.m(Metric::DFGPercent)?;
            let dor = s.m(Metric::DORPercent)?;
            let num = dfg * (1.0 - dor);
            s.div(num, num + (1.0 - dfg) * dor, "FMwt denominator")
        }
        Metric::StopsIndiv => {
            let fmwt = s.m(Metric::FMwt)?;
            let dor = s.m(Metric::DORPercent)?;
            Ok(s.f(STL)? + s.f(BLK)? * fmwt * (1.0 - 1.07 * dor) + s.f(DRB)? * (1.0 - fmwt))
        }
        Metric::StopsTeam => {
            let team_mp = s.f(TEAM_MP)?;
            let forced_misses = s.div(
                s.f(OPPONENT_FGA)? - s.f(OPPONENT_FGM)? - s.f(TEAM_BLK)?,
                team_mp,
                TEAM_MP,
            )?;
            let forced_tov = s.div(s.f(OPPONENT_TOV)? - s.f(TEAM_STL)?, team_mp, TEAM_MP)?;
            let dor_adjust = 1.0 - 1.07 * s.m(Metric::DORPercent)?;
            let foul_share = 0.4 * s.div(s.f(PF)?, s.f(TEAM_PF)?, TEAM_PF)? * s.f(OPPONENT_FTA)?;
            let opp_ft_miss = s.ft_miss_sq(OPPONENT_FTM, OPPONENT_FTA)?;
            Ok((forced_misses * s.m(Metric::FMwt)? * dor_adjust + forced_tov) * s.f(MP)?
                + foul_share * opp_ft_miss)
        }
        Metric::Stops => Ok(s.m(Metric::StopsIndiv)? + s.m(Metric::StopsTeam)?),
        Metric::TeamDefensiveRating => {
            Ok(100.0 * s.div(s.f(OPPONENT_PTS)?, s.m(Metric::TeamPoss)?, "TeamPoss")?)
        }
        Metric::DPtsPerScPoss => {
            let opp_fta = s.f(OPPONENT_FTA)?;
            let miss = s.ft_miss_sq(OPPONENT_FTM, OPPONENT_FTA)?;
            let scoring_poss = s.f(OPPONENT_FGM)? + (1.0 - miss) * opp_fta * 0.4;
            s.div(s.f(OPPONENT_PTS)?, scoring_poss, "opponent scoring possessions")
        }
        Metric::StopPercent => s.div(
            s.m(Metric::Stops)? * s.f(OPPONENT_MP)?,
            s.m(Metric::TeamPoss)? * s.f(MP)?,
            "TeamPoss * MP",
        ),
        Metric::DRtg => {
            let team = s.m(Metric::TeamDefensiveRating)?;
            let allowed = 100.0 * s.m(Metric::DPtsPerScPoss)? * (1.0 - s.m(Metric::StopPercent)?);
            Ok(team + 0.2 * (allowed - team))
        }
        Metric::MarginalDefense => {
            let minutes_share = s.div(s.f(MP)?, s.f(TEAM_MP)?, TEAM_MP)?;
            Ok(minutes_share
                * s.m(Metric::OpponentPoss)?
                * (1.08 * s.f(LPPP)? - s.m(Metric::DRtg)? / 100.0))
        }
        Metric::DefensiveWinShares => s.div(
            s.m(Metric::MarginalDefense)?,
            s.m(Metric::MarginalPPW)?,
            "MarginalPPW",
        ),

        Metric::WinShares => {
            Ok(s.m(Metric::OffensiveWinShares)? + s.m(Metric::DefensiveWinShares)?)
        }
    }
}
