use crate::model::{MaturityStage, Stats};

/// One stat-driven look. Conditions are independent; several can hold at
/// once and combine via `COMPOSE_ORDER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Condition {
    Sleepy,
    Hungry,
    Dirty,
    Bored,
}

pub(crate) const SLEEPY_BELOW_ENERGY: f64 = 30.0;
pub(crate) const HUNGRY_BELOW_HUNGER: f64 = 50.0;
pub(crate) const DIRTY_BELOW_CLEANLINESS: f64 = 40.0;
pub(crate) const BORED_BELOW_HAPPINESS: f64 = 50.0;
pub(crate) const HAPPY_ALL_AT_LEAST: f64 = 80.0;

/// Fixed composition order for simultaneously true conditions. The combined
/// animation is each member's frames concatenated in this order, looped.
const COMPOSE_ORDER: [Condition; 4] = [
    Condition::Sleepy,
    Condition::Hungry,
    Condition::Dirty,
    Condition::Bored,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Appearance {
    /// Non-adult stages get one placeholder look regardless of stats.
    Placeholder(MaturityStage),
    /// All four stats at 80 or better.
    Happy,
    /// Nothing notable.
    Idle,
    /// One or more low-stat conditions, in composition order.
    Needs(Vec<Condition>),
}

/// Pure stat→look selection. Server-driven maturity gates the whole thing:
/// only adults use the stat-driven sprite set.
pub(crate) fn appearance(stats: &Stats, stage: MaturityStage) -> Appearance {
    if stage != MaturityStage::Adult {
        return Appearance::Placeholder(stage);
    }

    if stats.hunger >= HAPPY_ALL_AT_LEAST
        && stats.happiness >= HAPPY_ALL_AT_LEAST
        && stats.cleanliness >= HAPPY_ALL_AT_LEAST
        && stats.energy >= HAPPY_ALL_AT_LEAST
    {
        return Appearance::Happy;
    }

    let mut active = Vec::new();
    for cond in COMPOSE_ORDER {
        let hit = match cond {
            Condition::Sleepy => stats.energy < SLEEPY_BELOW_ENERGY,
            Condition::Hungry => stats.hunger < HUNGRY_BELOW_HUNGER,
            Condition::Dirty => stats.cleanliness < DIRTY_BELOW_CLEANLINESS,
            Condition::Bored => stats.happiness < BORED_BELOW_HAPPINESS,
        };
        if hit {
            active.push(cond);
        }
    }

    if active.is_empty() {
        Appearance::Idle
    } else {
        Appearance::Needs(active)
    }
}

impl Appearance {
    /// The looped frame sequence for this look.
    pub(crate) fn frames(&self) -> Vec<&'static str> {
        match self {
            Appearance::Placeholder(MaturityStage::Child) => CHILD_FRAMES.to_vec(),
            Appearance::Placeholder(_) => TEEN_FRAMES.to_vec(),
            Appearance::Happy => HAPPY_FRAMES.to_vec(),
            Appearance::Idle => IDLE_FRAMES.to_vec(),
            Appearance::Needs(conds) => {
                let mut out = Vec::new();
                for c in conds {
                    out.extend_from_slice(condition_frames(*c));
                }
                out
            }
        }
    }

    pub(crate) fn caption(&self) -> String {
        match self {
            Appearance::Placeholder(stage) => format!("growing ({})", stage.label()),
            Appearance::Happy => "happy".to_string(),
            Appearance::Idle => "idle".to_string(),
            Appearance::Needs(conds) => {
                let names: Vec<&str> = conds
                    .iter()
                    .map(|c| match c {
                        Condition::Sleepy => "sleepy",
                        Condition::Hungry => "hungry",
                        Condition::Dirty => "dirty",
                        Condition::Bored => "bored",
                    })
                    .collect();
                names.join(" + ")
            }
        }
    }
}

fn condition_frames(cond: Condition) -> &'static [&'static str] {
    match cond {
        Condition::Sleepy => &SLEEPY_FRAMES,
        Condition::Hungry => &HUNGRY_FRAMES,
        Condition::Dirty => &DIRTY_FRAMES,
        Condition::Bored => &BORED_FRAMES,
    }
}

/* -----------------------------
   Frame art
------------------------------ */

// Multi-line ASCII sprites; every frame of a set has the same height so the
// pet pane doesn't jump while looping.

const IDLE_FRAMES: [&str; 2] = [
    r#"
   .--.
  ( o o)
  /|. .|\
   |___|
  "     "
"#,
    r#"
   .--.
  ( o o)
  /|. .|\
   |___|
   "   "
"#,
];

const HAPPY_FRAMES: [&str; 2] = [
    r#"
   \.--./
  ( ^ ^ )
  /|. .|\
   |___|
  "     "
"#,
    r#"
  \ .--. /
  ( ^ ^ )
  /|. .|\
   |___|
   "   "
"#,
];

const SLEEPY_FRAMES: [&str; 2] = [
    r#"
   .--.  z
  ( - -)
  /|. .|\
   |___|
  "     "
"#,
    r#"
   .--. Z
  ( - -)
  /|. .|\
   |___|
  "     "
"#,
];

const HUNGRY_FRAMES: [&str; 2] = [
    r#"
   .--.
  ( o o)
  /|.o.|\
   |___|
  "     "
"#,
    r#"
   .--.
  ( O O)
  /|.o.|\
   |___|
  "     "
"#,
];

const DIRTY_FRAMES: [&str; 2] = [
    r#"
 ~ .--. ~
  (.o o)
  /|:,.|\
   |_:_|
  "     "
"#,
    r#"
  ~.--.~
  (.o o)
  /|.,:|\
   |_:_|
  "     "
"#,
];

const BORED_FRAMES: [&str; 2] = [
    r#"
   .--.
  ( . .)
  /|. .|\
   |___|
  "     "
"#,
    r#"
   .--.
  ( .  )
  /|. .|\
   |___|
  "     "
"#,
];

const CHILD_FRAMES: [&str; 2] = [
    r#"

   (\,/)
   (o o)
    \_/

"#,
    r#"

   (\./)
   (o o)
    \_/

"#,
];

const TEEN_FRAMES: [&str; 2] = [
    r#"
   (\,/)
   (o o)
   (. .)
    \_/

"#,
    r#"
   (\./)
   (o o)
   (. .)
    \_/

"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hunger: f64, happiness: f64, cleanliness: f64, energy: f64) -> Stats {
        Stats {
            hunger,
            happiness,
            cleanliness,
            energy,
        }
    }

    #[test]
    fn single_conditions() {
        let s = stats(70.0, 70.0, 70.0, 20.0);
        assert_eq!(
            appearance(&s, MaturityStage::Adult),
            Appearance::Needs(vec![Condition::Sleepy])
        );

        let s = stats(40.0, 70.0, 70.0, 70.0);
        assert_eq!(
            appearance(&s, MaturityStage::Adult),
            Appearance::Needs(vec![Condition::Hungry])
        );

        let s = stats(70.0, 70.0, 30.0, 70.0);
        assert_eq!(
            appearance(&s, MaturityStage::Adult),
            Appearance::Needs(vec![Condition::Dirty])
        );

        let s = stats(70.0, 30.0, 70.0, 70.0);
        assert_eq!(
            appearance(&s, MaturityStage::Adult),
            Appearance::Needs(vec![Condition::Bored])
        );
    }

    #[test]
    fn happy_override_needs_all_four_at_80() {
        let s = stats(80.0, 80.0, 80.0, 80.0);
        assert_eq!(appearance(&s, MaturityStage::Adult), Appearance::Happy);

        let s = stats(80.0, 80.0, 79.9, 80.0);
        assert_eq!(appearance(&s, MaturityStage::Adult), Appearance::Idle);
    }

    #[test]
    fn combined_conditions_follow_composition_order() {
        // hungry + dirty, regardless of which threshold is "more" violated
        let s = stats(10.0, 70.0, 5.0, 70.0);
        let a = appearance(&s, MaturityStage::Adult);
        assert_eq!(a, Appearance::Needs(vec![Condition::Hungry, Condition::Dirty]));

        // frame count is the concatenation of both sets
        let n = a.frames().len();
        assert_eq!(n, HUNGRY_FRAMES.len() + DIRTY_FRAMES.len());
    }

    #[test]
    fn all_four_conditions_at_once() {
        let s = stats(10.0, 10.0, 10.0, 10.0);
        assert_eq!(
            appearance(&s, MaturityStage::Adult),
            Appearance::Needs(vec![
                Condition::Sleepy,
                Condition::Hungry,
                Condition::Dirty,
                Condition::Bored,
            ])
        );
    }

    #[test]
    fn non_adult_stages_use_placeholder() {
        let starving = stats(0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            appearance(&starving, MaturityStage::Child),
            Appearance::Placeholder(MaturityStage::Child)
        );
        assert_eq!(
            appearance(&starving, MaturityStage::Teen),
            Appearance::Placeholder(MaturityStage::Teen)
        );
    }

    #[test]
    fn frames_never_empty() {
        for a in [
            Appearance::Placeholder(MaturityStage::Child),
            Appearance::Placeholder(MaturityStage::Teen),
            Appearance::Happy,
            Appearance::Idle,
            Appearance::Needs(vec![Condition::Sleepy, Condition::Bored]),
        ] {
            assert!(!a.frames().is_empty());
        }
    }
}
