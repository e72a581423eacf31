// Input field names consumed by the formula graph.
//
// Player fields are unprefixed; team and opponent aggregates carry the
// `Team_` / `Opponent_` prefixes. League context has no per-team meaning
// (`Team_Pace` is the exception: it is supplied with the league context).

pub const TEAM_PREFIX: &str = "Team_";
pub const OPPONENT_PREFIX: &str = "Opponent_";

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub const MP: &str = "MP";
pub const FGM: &str = "FGM";
pub const FGA: &str = "FGA";
pub const THREE_PM: &str = "3PM";
pub const THREE_PA: &str = "3PA";
pub const FTM: &str = "FTM";
pub const FTA: &str = "FTA";
pub const ORB: &str = "ORB";
pub const DRB: &str = "DRB";
pub const TRB: &str = "TRB";
pub const AST: &str = "AST";
pub const STL: &str = "STL";
pub const BLK: &str = "BLK";
pub const TOV: &str = "TOV";
pub const PF: &str = "PF";
pub const PTS: &str = "PTS";

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

pub const TEAM_MP: &str = "Team_MP";
pub const TEAM_FGM: &str = "Team_FGM";
pub const TEAM_FGA: &str = "Team_FGA";
pub const TEAM_3PM: &str = "Team_3PM";
pub const TEAM_FTM: &str = "Team_FTM";
pub const TEAM_FTA: &str = "Team_FTA";
pub const TEAM_ORB: &str = "Team_ORB";
pub const TEAM_DRB: &str = "Team_DRB";
pub const TEAM_AST: &str = "Team_AST";
pub const TEAM_STL: &str = "Team_STL";
pub const TEAM_BLK: &str = "Team_BLK";
pub const TEAM_TOV: &str = "Team_TOV";
pub const TEAM_PF: &str = "Team_PF";
pub const TEAM_PTS: &str = "Team_PTS";

// ---------------------------------------------------------------------------
// Opponent
// ---------------------------------------------------------------------------

pub const OPPONENT_MP: &str = "Opponent_MP";
pub const OPPONENT_FGM: &str = "Opponent_FGM";
pub const OPPONENT_FGA: &str = "Opponent_FGA";
pub const OPPONENT_FTM: &str = "Opponent_FTM";
pub const OPPONENT_FTA: &str = "Opponent_FTA";
pub const OPPONENT_ORB: &str = "Opponent_ORB";
pub const OPPONENT_TRB: &str = "Opponent_TRB";
pub const OPPONENT_TOV: &str = "Opponent_TOV";
pub const OPPONENT_PTS: &str = "Opponent_PTS";

// ---------------------------------------------------------------------------
// League context
// ---------------------------------------------------------------------------

/// League points per possession.
pub const LPPP: &str = "LPPP";
/// League points per game.
pub const LPPG: &str = "LPPG";
pub const TEAM_PACE: &str = "Team_Pace";
pub const LEAGUE_PACE: &str = "League_Pace";
