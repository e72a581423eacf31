// Configuration loading and parsing (config/analysis.toml).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hoopshare_core::{LeagueContext, Metric};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub player: String,
    pub season: String,
    /// Box-score directory, resolved against the base directory.
    pub boxscore_dir: PathBuf,
    /// League context for `season`.
    pub league: LeagueContext,
    pub output: OutputConfig,
    /// Metrics to report, in evaluation order. Every metric when
    /// `output.metrics` is empty.
    pub metrics: Vec<Metric>,
}

// ---------------------------------------------------------------------------
// analysis.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire analysis.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AnalysisFile {
    analysis: AnalysisSection,
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    seasons: HashMap<String, LeagueContext>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalysisSection {
    player: String,
    boxscore_dir: String,
    season: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Metric names to report (e.g. "ORtg", "qAST"). Empty means all.
    #[serde(default)]
    pub metrics: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/analysis.toml` relative to `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("analysis.toml");
    let text = read_file(&path)?;
    parse_config(&text, &path, base_dir)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

/// Parse and validate config text. `path` names the file in errors;
/// relative box-score directories resolve against `base_dir`.
pub fn parse_config(text: &str, path: &Path, base_dir: &Path) -> Result<Config, ConfigError> {
    let file: AnalysisFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(&file)?;

    let league = file
        .seasons
        .get(&file.analysis.season)
        .copied()
        .ok_or_else(|| ConfigError::ValidationError {
            field: "analysis.season".into(),
            message: format!("no [seasons.\"{}\"] table", file.analysis.season),
        })?;

    let metrics = resolve_metrics(&file.output.metrics)?;

    Ok(Config {
        player: file.analysis.player.trim().to_string(),
        season: file.analysis.season,
        boxscore_dir: base_dir.join(file.analysis.boxscore_dir),
        league,
        output: file.output,
        metrics,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn resolve_metrics(names: &[String]) -> Result<Vec<Metric>, ConfigError> {
    if names.is_empty() {
        return Ok(Metric::evaluation_order().to_vec());
    }
    let mut requested = Vec::with_capacity(names.len());
    for name in names {
        let metric = Metric::from_name(name).ok_or_else(|| ConfigError::ValidationError {
            field: "output.metrics".into(),
            message: format!("unknown metric `{name}`"),
        })?;
        requested.push(metric);
    }
    Ok(Metric::evaluation_order()
        .iter()
        .copied()
        .filter(|m| requested.contains(m))
        .collect())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(file: &AnalysisFile) -> Result<(), ConfigError> {
    if file.analysis.player.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "analysis.player".into(),
            message: "must not be empty".into(),
        });
    }

    if file.analysis.boxscore_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "analysis.boxscore_dir".into(),
            message: "must not be empty".into(),
        });
    }

    // League constants feed divisions; they must be usable as divisors.
    for (name, league) in &file.seasons {
        let constants: &[(&str, f64)] = &[
            ("lppp", league.lppp),
            ("lppg", league.lppg),
            ("team_pace", league.team_pace),
            ("league_pace", league.league_pace),
        ];
        for (key, val) in constants {
            if !val.is_finite() || *val <= 0.0 {
                return Err(ConfigError::ValidationError {
                    field: format!("seasons.\"{name}\".{key}"),
                    message: format!("must be a positive number, got {val}"),
                });
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[analysis]
player = "LeBron James"
boxscore_dir = "data/boxscores"
season = "2008-09"

[output]
format = "json"
metrics = ["ORtg", "qAST"]

[seasons."2008-09"]
lppp = 1.083
lppg = 100.0
team_pace = 88.7
league_pace = 91.7

[seasons."2009-10"]
lppp = 1.077
lppg = 100.4
team_pace = 91.9
league_pace = 92.7
"#;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        parse_config(text, Path::new("config/analysis.toml"), Path::new("/srv/hoopshare"))
    }

    /// Helper: the crate root, where the shipped config/ lives.
    fn crate_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn load_shipped_config() {
        let config = load_config_from(&crate_root()).expect("should load shipped config");
        assert_eq!(config.player, "LeBron James");
        assert_eq!(config.season, "2009-10");
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.metrics.len(), Metric::ALL.len());
        assert!((config.league.lppg - 100.4).abs() < f64::EPSILON);
        assert!(config.boxscore_dir.ends_with("tests/fixtures/boxscores"));
    }

    #[test]
    fn parses_valid_config() {
        let config = parse(VALID).unwrap();
        assert_eq!(config.player, "LeBron James");
        assert_eq!(config.boxscore_dir, PathBuf::from("/srv/hoopshare/data/boxscores"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!((config.league.lppp - 1.083).abs() < f64::EPSILON);
        assert!((config.league.team_pace - 88.7).abs() < f64::EPSILON);
        // Requested metrics come back in evaluation order.
        assert_eq!(config.metrics, vec![Metric::QAst, Metric::ORtg]);
    }

    #[test]
    fn output_section_is_optional() {
        let text = VALID.replace("[output]\nformat = \"json\"\nmetrics = [\"ORtg\", \"qAST\"]\n", "");
        let config = parse(&text).unwrap();
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.metrics.len(), Metric::ALL.len());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config_from(Path::new("/nonexistent/hoopshare")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse("[analysis\nplayer = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn rejects_unknown_season() {
        let text = VALID.replace("season = \"2008-09\"", "season = \"1999-00\"");
        let err = parse(&text).unwrap_err();
        match err {
            ConfigError::ValidationError { field, message } => {
                assert_eq!(field, "analysis.season");
                assert!(message.contains("1999-00"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_player() {
        let text = VALID.replace("player = \"LeBron James\"", "player = \"  \"");
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "analysis.player"));
    }

    #[test]
    fn rejects_zero_league_constant() {
        let text = VALID.replace("lppg = 100.4", "lppg = 0.0");
        let err = parse(&text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error for field `seasons.\"2009-10\".lppg`: must be a positive number, got 0"
        );
    }

    #[test]
    fn rejects_unknown_metric() {
        let text = VALID.replace("\"qAST\"", "\"PER\"");
        let err = parse(&text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error for field `output.metrics`: unknown metric `PER`"
        );
    }
}
