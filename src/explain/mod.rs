//! Rule-based explanation of a model prediction.
//!
//! Each game factor is a *ladder*: an ordered list of rules evaluated top-down,
//! where the first rule whose predicate matches produces that factor's bullet.
//! Bullets are tagged with a [`Polarity`] when generated, and the report keeps
//! only the bullets that agree with the predicted outcome.
//!
//! Factors, in report order:
//! - **Opponent streak**: strong (3+), moderate (2), mild (1), struggling (-2 or
//!   worse), mild slump (-1). No bullet at 0.
//! - **Suns streak**: winning (2+), mild (1), losing (-1 or worse). No bullet at 0.
//! - **Rest**: 3+ Suns rest days is a negative signal and outranks the
//!   differential; otherwise advantage / equal / disadvantage.
//! - **Location**: home helps, away hurts.

use serde::Serialize;
use std::fmt;

use crate::game::{GameContext, Location, Outcome};

pub const WIN_HEADER: &str = "The model predicts a WIN primarily because:";
pub const LOSS_HEADER: &str = "The model predicts a LOSS because:";
pub const WIN_FALLBACK: &str = "Several factors modestly support the Suns in this matchup.";
pub const LOSS_FALLBACK: &str = "Several factors tilt the prediction toward a loss.";

/// Which way a bullet points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Supports a Suns win.
    Positive,
    /// Supports a Suns loss.
    Negative,
    /// Supports neither; kept for both outcomes.
    Neutral,
}

impl Polarity {
    pub fn agrees_with(self, outcome: Outcome) -> bool {
        match (self, outcome) {
            (Polarity::Neutral, _) => true,
            (Polarity::Positive, Outcome::Win) => true,
            (Polarity::Negative, Outcome::Loss) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    OpponentStreak,
    SunsStreak,
    Rest,
    Location,
    /// Canned sentence used when no factor bullet survives filtering.
    Fallback,
}

/// One supporting line of an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bullet {
    pub factor: Factor,
    pub polarity: Polarity,
    pub text: String,
}

/// Header plus at least one supporting bullet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplanationReport {
    pub outcome: Outcome,
    header: String,
    bullets: Vec<Bullet>,
}

impl ExplanationReport {
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Header first, then bullet texts in order.
    pub fn lines(&self) -> Vec<&str> {
        std::iter::once(self.header.as_str())
            .chain(self.bullets.iter().map(|b| b.text.as_str()))
            .collect()
    }
}

impl fmt::Display for ExplanationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for bullet in &self.bullets {
            writeln!(f, "- {}", bullet.text)?;
        }
        Ok(())
    }
}

/// A single rung of a factor ladder.
struct Rule {
    applies: fn(&GameContext) -> bool,
    render: fn(&GameContext) -> String,
    polarity: Polarity,
}

const OPPONENT_STREAK: &[Rule] = &[
    Rule {
        applies: |c| c.opponent_streak >= 3,
        render: |c| {
            format!(
                "The opponent is on a strong positive streak (+{}), heavily reducing Suns chances.",
                c.opponent_streak
            )
        },
        polarity: Polarity::Negative,
    },
    Rule {
        applies: |c| c.opponent_streak == 2,
        render: |_| {
            "The opponent has a +2 streak, which slightly reduces Suns win probability.".to_string()
        },
        polarity: Polarity::Negative,
    },
    Rule {
        applies: |c| c.opponent_streak == 1,
        render: |_| "The opponent has a mild +1 winning streak.".to_string(),
        polarity: Polarity::Negative,
    },
    Rule {
        applies: |c| c.opponent_streak <= -2,
        render: |c| {
            format!(
                "The opponent is struggling (streak {}), increasing Suns chances.",
                c.opponent_streak
            )
        },
        polarity: Polarity::Positive,
    },
    Rule {
        applies: |c| c.opponent_streak == -1,
        render: |_| {
            "The opponent has a small losing streak, slightly benefiting the Suns.".to_string()
        },
        polarity: Polarity::Positive,
    },
];

const SUNS_STREAK: &[Rule] = &[
    Rule {
        applies: |c| c.suns_streak >= 2,
        render: |c| format!("The Suns are on a +{} streak, helping the prediction.", c.suns_streak),
        polarity: Polarity::Positive,
    },
    Rule {
        applies: |c| c.suns_streak == 1,
        render: |_| "The Suns enter with +1 momentum.".to_string(),
        polarity: Polarity::Positive,
    },
    Rule {
        applies: |c| c.suns_streak <= -1,
        render: |c| {
            format!(
                "The Suns have a losing streak ({}), pulling the prediction toward a loss.",
                c.suns_streak
            )
        },
        polarity: Polarity::Negative,
    },
];

// Long rest outranks the differential.
const REST: &[Rule] = &[
    Rule {
        applies: |c| c.suns_rest_days >= 3,
        render: |c| {
            format!(
                "The Suns have {} rest days; historically long rest (3+) correlates with lower win probability.",
                c.suns_rest_days
            )
        },
        polarity: Polarity::Negative,
    },
    Rule {
        applies: |c| c.rest_differential() > 0,
        render: |c| {
            format!(
                "The Suns have a slight rest advantage ({} vs {}).",
                c.suns_rest_days, c.opponent_rest_days
            )
        },
        polarity: Polarity::Positive,
    },
    Rule {
        applies: |c| c.rest_differential() == 0,
        render: |_| "Both teams have equal rest.".to_string(),
        polarity: Polarity::Neutral,
    },
    Rule {
        applies: |c| c.rest_differential() < 0,
        render: |c| {
            format!(
                "The opponent has more rest ({} vs {}), slightly reducing Suns chances.",
                c.opponent_rest_days, c.suns_rest_days
            )
        },
        polarity: Polarity::Negative,
    },
];

const LOCATION: &[Rule] = &[
    Rule {
        applies: |c| c.location == Location::Home,
        render: |_| "Home-court provides a small benefit.".to_string(),
        polarity: Polarity::Positive,
    },
    Rule {
        applies: |c| c.location == Location::Away,
        render: |_| "Playing away slightly lowers Suns win probability.".to_string(),
        polarity: Polarity::Negative,
    },
];

const LADDERS: [(Factor, &[Rule]); 4] = [
    (Factor::OpponentStreak, OPPONENT_STREAK),
    (Factor::SunsStreak, SUNS_STREAK),
    (Factor::Rest, REST),
    (Factor::Location, LOCATION),
];

/// Evaluate one ladder; the first matching rule wins.
fn evaluate(factor: Factor, ladder: &[Rule], context: &GameContext) -> Option<Bullet> {
    ladder
        .iter()
        .find(|rule| (rule.applies)(context))
        .map(|rule| Bullet {
            factor,
            polarity: rule.polarity,
            text: (rule.render)(context),
        })
}

/// Every candidate bullet for `context`, before outcome filtering.
pub fn candidate_bullets(context: &GameContext) -> Vec<Bullet> {
    LADDERS
        .iter()
        .filter_map(|(factor, ladder)| evaluate(*factor, ladder, context))
        .collect()
}

/// Build the explanation for a prediction.
///
/// Deterministic: identical inputs always yield identical reports.
pub fn generate_explanation(context: &GameContext, win_probability: f64) -> ExplanationReport {
    let outcome = Outcome::from_probability(win_probability);

    let (header, fallback, fallback_polarity) = match outcome {
        Outcome::Win => (WIN_HEADER, WIN_FALLBACK, Polarity::Positive),
        Outcome::Loss => (LOSS_HEADER, LOSS_FALLBACK, Polarity::Negative),
    };

    let mut bullets: Vec<Bullet> = candidate_bullets(context)
        .into_iter()
        .filter(|b| b.polarity.agrees_with(outcome))
        .collect();

    if bullets.is_empty() {
        bullets.push(Bullet {
            factor: Factor::Fallback,
            polarity: fallback_polarity,
            text: fallback.to_string(),
        });
    }

    ExplanationReport {
        outcome,
        header: header.to_string(),
        bullets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Team;

    fn ctx(
        location: Location,
        suns_streak: i32,
        opponent_streak: i32,
        suns_rest: i32,
        opp_rest: i32,
    ) -> GameContext {
        GameContext::new(
            Team::LaLakers,
            location,
            suns_streak,
            opponent_streak,
            suns_rest,
            opp_rest,
        )
        .unwrap()
    }

    fn bullet_for(report: &ExplanationReport, factor: Factor) -> Option<&Bullet> {
        report.bullets().iter().find(|b| b.factor == factor)
    }

    #[test]
    fn header_reflects_outcome() {
        let c = ctx(Location::Home, 0, 0, 1, 1);
        assert_eq!(generate_explanation(&c, 0.5).header, WIN_HEADER);
        assert_eq!(generate_explanation(&c, 0.49).header, LOSS_HEADER);
        assert_eq!(generate_explanation(&c, 0.49).lines()[0], LOSS_HEADER);
    }

    #[test]
    fn strong_opponent_streak_only_in_losses() {
        for streak in [3, 4, 10, 250] {
            let c = ctx(Location::Home, 0, streak, 1, 1);
            let candidate = evaluate(Factor::OpponentStreak, OPPONENT_STREAK, &c).unwrap();
            assert_eq!(candidate.polarity, Polarity::Negative);
            assert!(candidate.text.contains("strong positive streak"));
            assert!(candidate.text.contains(&format!("+{}", streak)));

            let loss = generate_explanation(&c, 0.3);
            assert_eq!(bullet_for(&loss, Factor::OpponentStreak), Some(&candidate));

            let win = generate_explanation(&c, 0.7);
            assert!(bullet_for(&win, Factor::OpponentStreak).is_none());
        }
    }

    #[test]
    fn opponent_streak_ladder_bands() {
        let cases = [
            (2, Polarity::Negative, "+2 streak"),
            (1, Polarity::Negative, "mild +1"),
            (-1, Polarity::Positive, "small losing streak"),
            (-2, Polarity::Positive, "struggling (streak -2)"),
            (-9, Polarity::Positive, "struggling (streak -9)"),
        ];
        for (streak, polarity, fragment) in cases {
            let b = evaluate(
                Factor::OpponentStreak,
                OPPONENT_STREAK,
                &ctx(Location::Home, 0, streak, 1, 1),
            )
            .unwrap();
            assert_eq!(b.polarity, polarity, "streak {}", streak);
            assert!(b.text.contains(fragment), "{}", b.text);
        }
    }

    #[test]
    fn suns_streak_ladder_bands() {
        let cases = [
            (5, Polarity::Positive, "+5 streak"),
            (1, Polarity::Positive, "+1 momentum"),
            (-1, Polarity::Negative, "losing streak (-1)"),
            (-6, Polarity::Negative, "losing streak (-6)"),
        ];
        for (streak, polarity, fragment) in cases {
            let b = evaluate(
                Factor::SunsStreak,
                SUNS_STREAK,
                &ctx(Location::Home, streak, 0, 1, 1),
            )
            .unwrap();
            assert_eq!(b.polarity, polarity, "streak {}", streak);
            assert!(b.text.contains(fragment), "{}", b.text);
        }
    }

    #[test]
    fn zero_streaks_produce_no_streak_bullets() {
        let c = ctx(Location::Away, 0, 0, 2, 1);
        let factors: Vec<Factor> = candidate_bullets(&c).iter().map(|b| b.factor).collect();
        assert_eq!(factors, vec![Factor::Rest, Factor::Location]);

        for p in [0.1, 0.9] {
            let report = generate_explanation(&c, p);
            assert!(bullet_for(&report, Factor::OpponentStreak).is_none());
            assert!(bullet_for(&report, Factor::SunsStreak).is_none());
        }
    }

    #[test]
    fn long_rest_overrides_rest_advantage() {
        let c = ctx(Location::Home, 0, 0, 3, 1);
        assert_eq!(c.rest_differential(), 2);
        let b = evaluate(Factor::Rest, REST, &c).unwrap();
        assert_eq!(b.polarity, Polarity::Negative);
        assert!(b.text.contains("3 rest days"));
        assert!(!b.text.contains("advantage"));

        let win = generate_explanation(&c, 0.8);
        assert!(bullet_for(&win, Factor::Rest).is_none());
        let loss = generate_explanation(&c, 0.2);
        assert_eq!(bullet_for(&loss, Factor::Rest), Some(&b));
    }

    #[test]
    fn rest_differential_bands() {
        let adv = evaluate(Factor::Rest, REST, &ctx(Location::Home, 0, 0, 2, 1)).unwrap();
        assert_eq!(adv.polarity, Polarity::Positive);
        assert_eq!(adv.text, "The Suns have a slight rest advantage (2 vs 1).");

        let dis = evaluate(Factor::Rest, REST, &ctx(Location::Home, 0, 0, 1, 5)).unwrap();
        assert_eq!(dis.polarity, Polarity::Negative);
        assert_eq!(
            dis.text,
            "The opponent has more rest (5 vs 1), slightly reducing Suns chances."
        );
    }

    #[test]
    fn equal_rest_is_kept_for_both_outcomes() {
        let c = ctx(Location::Home, 0, 0, 2, 2);
        let win = generate_explanation(&c, 0.65);
        let rest = bullet_for(&win, Factor::Rest).unwrap();
        assert_eq!(rest.polarity, Polarity::Neutral);
        assert_eq!(rest.text, "Both teams have equal rest.");

        let c = ctx(Location::Away, 0, 0, 1, 1);
        let loss = generate_explanation(&c, 0.35);
        assert!(bullet_for(&loss, Factor::Rest).is_some());
    }

    #[test]
    fn location_polarity() {
        let home = generate_explanation(&ctx(Location::Home, 0, 0, 1, 2), 0.6);
        assert_eq!(
            bullet_for(&home, Factor::Location).unwrap().text,
            "Home-court provides a small benefit."
        );
        let away = generate_explanation(&ctx(Location::Away, 0, 0, 2, 1), 0.4);
        assert_eq!(
            bullet_for(&away, Factor::Location).unwrap().polarity,
            Polarity::Negative
        );
    }

    #[test]
    fn win_fallback_when_everything_points_to_a_loss() {
        let c = ctx(Location::Away, -1, 3, 4, 1);
        let report = generate_explanation(&c, 0.55);
        assert_eq!(report.lines().len(), 2);
        assert_eq!(report.bullets()[0].factor, Factor::Fallback);
        assert_eq!(report.bullets()[0].text, WIN_FALLBACK);
    }

    #[test]
    fn loss_fallback_when_everything_points_to_a_win() {
        let c = ctx(Location::Home, 2, -3, 2, 1);
        let report = generate_explanation(&c, 0.45);
        assert_eq!(report.lines(), vec![LOSS_HEADER, LOSS_FALLBACK]);
    }

    #[test]
    fn report_is_never_header_only() {
        for location in [Location::Home, Location::Away] {
            for suns_streak in -4..=4 {
                for opp_streak in -4..=4 {
                    for suns_rest in 1..=4 {
                        for opp_rest in 1..=4 {
                            let c = ctx(location, suns_streak, opp_streak, suns_rest, opp_rest);
                            for p in [0.0, 0.25, 0.4999, 0.5, 0.75, 1.0] {
                                let report = generate_explanation(&c, p);
                                assert!(report.lines().len() >= 2, "{:?} p={}", c, p);
                                assert!(report
                                    .bullets()
                                    .iter()
                                    .all(|b| b.polarity.agrees_with(report.outcome)));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn explanation_is_deterministic() {
        let c = ctx(Location::Away, -2, 1, 3, 2);
        assert_eq!(generate_explanation(&c, 0.31), generate_explanation(&c, 0.31));
    }

    #[test]
    fn lakers_home_win_scenario() {
        let c = ctx(Location::Home, 3, -2, 2, 1);
        let report = generate_explanation(&c, 0.72);
        assert_eq!(report.outcome, Outcome::Win);
        assert_eq!(
            report.lines(),
            vec![
                WIN_HEADER,
                "The opponent is struggling (streak -2), increasing Suns chances.",
                "The Suns are on a +3 streak, helping the prediction.",
                "The Suns have a slight rest advantage (2 vs 1).",
                "Home-court provides a small benefit.",
            ]
        );
    }

    #[test]
    fn rested_hot_opponent_loss_scenario() {
        let away = ctx(Location::Away, -2, 4, 1, 5);
        let report = generate_explanation(&away, 0.12);
        assert_eq!(report.outcome, Outcome::Loss);
        let factors: Vec<Factor> = report.bullets().iter().map(|b| b.factor).collect();
        assert_eq!(
            factors,
            vec![
                Factor::OpponentStreak,
                Factor::SunsStreak,
                Factor::Rest,
                Factor::Location
            ]
        );

        let home = ctx(Location::Home, -2, 4, 1, 5);
        let report = generate_explanation(&home, 0.12);
        assert_eq!(report.lines().len(), 4);
        assert!(bullet_for(&report, Factor::Location).is_none());
    }

    #[test]
    fn report_serializes_with_tags() {
        let report = generate_explanation(&ctx(Location::Home, 0, 0, 1, 1), 0.9);
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["outcome"], "WIN");
        assert_eq!(v["header"], WIN_HEADER);
        assert_eq!(v["bullets"][0]["polarity"], "neutral");
        assert_eq!(v["bullets"][1]["factor"], "location");
    }
}
