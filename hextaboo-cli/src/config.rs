//! Match configuration: seats, board size and seeding
//!
//! Level 4 - Utilities and configuration

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use hextaboo_core::{Difficulty, MAX_RADIUS};

/// Who controls a seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Seat {
    Human,
    Cpu(Difficulty),
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::Human => f.write_str("human"),
            Seat::Cpu(difficulty) => write!(f, "{difficulty}"),
        }
    }
}

impl FromStr for Seat {
    type Err = String;

    /// `human`, or any difficulty accepted by [`Difficulty`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("human") {
            Ok(Seat::Human)
        } else {
            s.parse().map(Seat::Cpu)
        }
    }
}

impl TryFrom<String> for Seat {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Seat> for String {
    fn from(seat: Seat) -> Self {
        seat.to_string()
    }
}

/// Everything needed to set up one or more games
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Board radius
    pub radius: u32,
    /// First-moving seat
    pub player1: Seat,
    /// Second-moving seat (holds the neutralization)
    pub player2: Seat,
    /// Number of games for `match`
    pub games: usize,
    /// Base random seed (None = 42)
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            radius: 4,
            player1: Seat::Human,
            player2: Seat::Cpu(Difficulty::Medium),
            games: 10,
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// File config if given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn override_with(
        mut self,
        radius: Option<u32>,
        player1: Option<Seat>,
        player2: Option<Seat>,
        seed: Option<u64>,
    ) -> Self {
        if let Some(radius) = radius {
            self.radius = radius;
        }
        if let Some(seat) = player1 {
            self.player1 = seat;
        }
        if let Some(seat) = player2 {
            self.player2 = seat;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    pub fn seed_or_default(&self) -> u64 {
        self.seed.unwrap_or(42)
    }

    pub fn validate(&self) -> Result<()> {
        if self.radius < 1 || self.radius > MAX_RADIUS {
            bail!("radius must be between 1 and {}, got {}", MAX_RADIUS, self.radius);
        }
        if self.games == 0 {
            bail!("games must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_parse() {
        assert_eq!("human".parse::<Seat>(), Ok(Seat::Human));
        assert_eq!("easy".parse::<Seat>(), Ok(Seat::Cpu(Difficulty::Easy)));
        assert_eq!(
            "hard:2".parse::<Seat>(),
            Ok(Seat::Cpu(Difficulty::Hard { depth: 2 }))
        );
        assert!("robot".parse::<Seat>().is_err());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{ "radius": 3, "player1": "hard:2" }"#).unwrap();
        assert_eq!(config.radius, 3);
        assert_eq!(config.player1, Seat::Cpu(Difficulty::Hard { depth: 2 }));
        assert_eq!(config.player2, Seat::Cpu(Difficulty::Medium));
        assert_eq!(config.games, 10);
    }

    #[test]
    fn test_config_round_trip_file() {
        let path = std::env::temp_dir().join(format!("hextaboo-config-{}.json", std::process::id()));
        let config = MatchConfig {
            radius: 5,
            player1: Seat::Cpu(Difficulty::Easy),
            player2: Seat::Human,
            games: 3,
            seed: Some(9),
        };
        config.save(&path).unwrap();
        let loaded = MatchConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_override_and_validate() {
        let config = MatchConfig::default().override_with(Some(0), None, Some(Seat::Human), Some(1));
        assert_eq!(config.player2, Seat::Human);
        assert_eq!(config.seed_or_default(), 1);
        assert!(config.validate().is_err());
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_file_errors() {
        let err = MatchConfig::load(Path::new("/nonexistent/hextaboo.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
