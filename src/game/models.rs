use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PredictionError;

/// Opponents the Suns can face, keyed by their three-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Team {
    Atlanta,
    Boston,
    Brooklyn,
    Chicago,
    Charlotte,
    Cleveland,
    Dallas,
    Denver,
    Detroit,
    GoldenState,
    Houston,
    Indiana,
    LaClippers,
    LaLakers,
    Memphis,
    Miami,
    Milwaukee,
    Minnesota,
    NewOrleans,
    NewYork,
    OklahomaCity,
    Orlando,
    Philadelphia,
    Portland,
    Sacramento,
    SanAntonio,
    Toronto,
    Utah,
    Washington,
}

impl Team {
    /// Every selectable opponent, in code order.
    pub const ALL: [Team; 29] = [
        Team::Atlanta,
        Team::Boston,
        Team::Brooklyn,
        Team::Chicago,
        Team::Charlotte,
        Team::Cleveland,
        Team::Dallas,
        Team::Denver,
        Team::Detroit,
        Team::GoldenState,
        Team::Houston,
        Team::Indiana,
        Team::LaClippers,
        Team::LaLakers,
        Team::Memphis,
        Team::Miami,
        Team::Milwaukee,
        Team::Minnesota,
        Team::NewOrleans,
        Team::NewYork,
        Team::OklahomaCity,
        Team::Orlando,
        Team::Philadelphia,
        Team::Portland,
        Team::Sacramento,
        Team::SanAntonio,
        Team::Toronto,
        Team::Utah,
        Team::Washington,
    ];

    /// Three-letter code the model was trained on.
    pub fn code(self) -> &'static str {
        match self {
            Team::Atlanta => "ATL",
            Team::Boston => "BOS",
            Team::Brooklyn => "BRK",
            Team::Chicago => "CHI",
            Team::Charlotte => "CHO",
            Team::Cleveland => "CLE",
            Team::Dallas => "DAL",
            Team::Denver => "DEN",
            Team::Detroit => "DET",
            Team::GoldenState => "GSW",
            Team::Houston => "HOU",
            Team::Indiana => "IND",
            Team::LaClippers => "LAC",
            Team::LaLakers => "LAL",
            Team::Memphis => "MEM",
            Team::Miami => "MIA",
            Team::Milwaukee => "MIL",
            Team::Minnesota => "MIN",
            Team::NewOrleans => "NOP",
            Team::NewYork => "NYK",
            Team::OklahomaCity => "OKC",
            Team::Orlando => "ORL",
            Team::Philadelphia => "PHI",
            Team::Portland => "POR",
            Team::Sacramento => "SAC",
            Team::SanAntonio => "SAS",
            Team::Toronto => "TOR",
            Team::Utah => "UTA",
            Team::Washington => "WAS",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Team {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Team::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or_else(|| {
                PredictionError::invalid_input("opponent", format!("unknown team code '{}'", s))
            })
    }
}

impl TryFrom<String> for Team {
    type Error = PredictionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Team> for String {
    fn from(team: Team) -> Self {
        team.code().to_string()
    }
}

/// Where the Suns play the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Home,
    Away,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Home => f.write_str("Home"),
            Location::Away => f.write_str("Away"),
        }
    }
}

impl FromStr for Location {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Location::Home),
            "away" => Ok(Location::Away),
            _ => Err(PredictionError::invalid_input(
                "location",
                format!("expected Home or Away, got '{}'", s),
            )),
        }
    }
}

/// Validated features for one game, as sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameContext {
    pub opponent: Team,
    pub location: Location,
    /// Positive = consecutive wins, negative = consecutive losses.
    pub suns_streak: i32,
    pub opponent_streak: i32,
    /// Days since the previous game, at least 1.
    pub suns_rest_days: i32,
    pub opponent_rest_days: i32,
}

impl GameContext {
    pub fn new(
        opponent: Team,
        location: Location,
        suns_streak: i32,
        opponent_streak: i32,
        suns_rest_days: i32,
        opponent_rest_days: i32,
    ) -> Result<Self, PredictionError> {
        check_rest_days("suns_rest_days", suns_rest_days)?;
        check_rest_days("opponent_rest_days", opponent_rest_days)?;
        Ok(GameContext {
            opponent,
            location,
            suns_streak,
            opponent_streak,
            suns_rest_days,
            opponent_rest_days,
        })
    }

    /// Suns rest minus opponent rest.
    pub fn rest_differential(&self) -> i64 {
        i64::from(self.suns_rest_days) - i64::from(self.opponent_rest_days)
    }
}

fn check_rest_days(field: &str, days: i32) -> Result<(), PredictionError> {
    if days < 1 {
        return Err(PredictionError::invalid_input(
            field,
            format!("rest days must be at least 1, got {}", days),
        ));
    }
    Ok(())
}

/// Raw, unvalidated game input as submitted by a form or JSON client.
///
/// Numeric fields accept JSON integers or integer strings (`"-3"`); anything
/// else is rejected before the model is called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameForm {
    #[serde(default)]
    pub opponent: serde_json::Value,
    #[serde(default)]
    pub location: serde_json::Value,
    #[serde(default)]
    pub suns_streak: serde_json::Value,
    #[serde(default, alias = "opp_streak")]
    pub opponent_streak: serde_json::Value,
    #[serde(default, alias = "suns_rest")]
    pub suns_rest_days: serde_json::Value,
    #[serde(default, alias = "opp_rest")]
    pub opponent_rest_days: serde_json::Value,
}

impl GameForm {
    pub fn validate(&self) -> Result<GameContext, PredictionError> {
        let opponent: Team = text_field("opponent", &self.opponent)?.parse()?;
        let location: Location = text_field("location", &self.location)?.parse()?;
        GameContext::new(
            opponent,
            location,
            int_field("suns_streak", &self.suns_streak)?,
            int_field("opponent_streak", &self.opponent_streak)?,
            int_field("suns_rest_days", &self.suns_rest_days)?,
            int_field("opponent_rest_days", &self.opponent_rest_days)?,
        )
    }
}

fn text_field<'a>(field: &str, value: &'a serde_json::Value) -> Result<&'a str, PredictionError> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Ok(s.as_str()),
        serde_json::Value::Null => Err(PredictionError::invalid_input(field, "missing value")),
        other => Err(PredictionError::invalid_input(
            field,
            format!("expected text, got {}", other),
        )),
    }
}

fn int_field(field: &str, value: &serde_json::Value) -> Result<i32, PredictionError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        serde_json::Value::Null => {
            return Err(PredictionError::invalid_input(field, "missing value"));
        }
        _ => None,
    };
    parsed
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| {
            PredictionError::invalid_input(field, format!("expected an integer, got {}", value))
        })
}

/// Binary label derived from the win probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    /// 0.5 counts as a win.
    pub fn from_probability(win_probability: f64) -> Self {
        if win_probability >= 0.5 {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => f.write_str("WIN"),
            Outcome::Loss => f.write_str("LOSS"),
        }
    }
}

/// Probability returned by the model plus its derived outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub win_probability: f64,
    pub outcome: Outcome,
}

impl PredictionResult {
    pub fn from_probability(win_probability: f64) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&win_probability),
            "win_probability out of range"
        );
        PredictionResult {
            win_probability,
            outcome: Outcome::from_probability(win_probability),
        }
    }
}
