use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Server-owned percentages, mirrored read-mostly. Replaced wholesale on
/// every successful response that carries them.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub(crate) struct Stats {
    pub(crate) hunger: f64,
    pub(crate) happiness: f64,
    pub(crate) cleanliness: f64,
    pub(crate) energy: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub(crate) struct Inventory {
    #[serde(default)]
    pub(crate) tree_seed: u32,
    #[serde(default)]
    pub(crate) blueberries: u32,
    #[serde(default)]
    pub(crate) mushroom: u32,
    #[serde(default)]
    pub(crate) acorn: u32,
    #[serde(default)]
    pub(crate) coins: u32,
}

impl Inventory {
    pub(crate) fn food_count(&self, food: Food) -> u32 {
        match food {
            Food::TreeSeed => self.tree_seed,
            Food::Blueberries => self.blueberries,
            Food::Mushroom => self.mushroom,
            Food::Acorn => self.acorn,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PetKind {
    Hedgehog,
    Hamster,
    Squirrel,
}

impl PetKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            PetKind::Hedgehog => "hedgehog",
            PetKind::Hamster => "hamster",
            PetKind::Squirrel => "squirrel",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MaturityStage {
    Child,
    Teen,
    Adult,
}

impl MaturityStage {
    pub(crate) fn label(self) -> &'static str {
        match self {
            MaturityStage::Child => "child",
            MaturityStage::Teen => "teen",
            MaturityStage::Adult => "adult",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Maturity {
    pub(crate) stage: MaturityStage,
    #[serde(default)]
    pub(crate) next_change_time: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Food {
    TreeSeed,
    Blueberries,
    Mushroom,
    Acorn,
}

impl Food {
    pub(crate) const ALL: [Food; 4] = [
        Food::TreeSeed,
        Food::Blueberries,
        Food::Mushroom,
        Food::Acorn,
    ];

    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            Food::TreeSeed => "tree_seed",
            Food::Blueberries => "blueberries",
            Food::Mushroom => "mushroom",
            Food::Acorn => "acorn",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Food::TreeSeed => "Tree seed",
            Food::Blueberries => "Blueberries",
            Food::Mushroom => "Mushroom",
            Food::Acorn => "Acorn",
        }
    }

    /// Shop price in coins.
    pub(crate) fn price(self) -> u32 {
        match self {
            Food::TreeSeed => 1,
            Food::Blueberries => 3,
            Food::Mushroom => 2,
            Food::Acorn => 6,
        }
    }

    /// Hunger points the server restores for one serving. Shown as a menu
    /// hint only; the server applies it.
    pub(crate) fn restore(self) -> u32 {
        match self {
            Food::TreeSeed => 5,
            Food::Blueberries => 15,
            Food::Mushroom => 10,
            Food::Acorn => 25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WashKind {
    WashHands,
    Shower,
    Bath,
}

impl WashKind {
    pub(crate) const ALL: [WashKind; 3] = [WashKind::WashHands, WashKind::Shower, WashKind::Bath];

    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            WashKind::WashHands => "wash_hands",
            WashKind::Shower => "shower",
            WashKind::Bath => "bath",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            WashKind::WashHands => "Wash hands",
            WashKind::Shower => "Shower",
            WashKind::Bath => "Bath",
        }
    }

    pub(crate) fn duration(self) -> Duration {
        Duration::from_secs(match self {
            WashKind::WashHands => 5,
            WashKind::Shower => 20,
            WashKind::Bath => 30,
        })
    }

    /// Cleanliness points restored, shown as a menu hint.
    pub(crate) fn restore(self) -> u32 {
        match self {
            WashKind::WashHands => 15,
            WashKind::Shower => 60,
            WashKind::Bath => 80,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayKind {
    PlayWithBall,
    SpinInWheel,
}

impl PlayKind {
    pub(crate) const ALL: [PlayKind; 2] = [PlayKind::PlayWithBall, PlayKind::SpinInWheel];

    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            PlayKind::PlayWithBall => "play_with_ball",
            PlayKind::SpinInWheel => "spin_in_wheel",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            PlayKind::PlayWithBall => "Play with ball",
            PlayKind::SpinInWheel => "Spin in wheel",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SleepKind {
    Nap,
    Sleep,
}

impl SleepKind {
    pub(crate) const ALL: [SleepKind; 2] = [SleepKind::Nap, SleepKind::Sleep];

    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            SleepKind::Nap => "nap",
            SleepKind::Sleep => "sleep",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            SleepKind::Nap => "Nap",
            SleepKind::Sleep => "Full sleep",
        }
    }

    pub(crate) fn duration(self) -> Duration {
        Duration::from_secs(match self {
            SleepKind::Nap => 60,
            SleepKind::Sleep => 120,
        })
    }
}

pub(crate) const FEED_DURATION: Duration = Duration::from_secs(5);
pub(crate) const PLAY_DURATION: Duration = Duration::from_secs(10);

/* -----------------------------
   Action thresholds
------------------------------ */

// Product constants, not derived. The play cap really is 89: 89 still
// allows playing, 90 blocks it.
pub(crate) const FEED_MAX_HUNGER: f64 = 80.0;
pub(crate) const PLAY_MAX_HAPPINESS: f64 = 89.0;
pub(crate) const WASH_MAX_CLEANLINESS: f64 = 85.0;
pub(crate) const NAP_MAX_ENERGY: f64 = 50.0;
pub(crate) const SLEEP_MAX_ENERGY: f64 = 30.0;
pub(crate) const MINIGAME_MIN_HAPPINESS: f64 = 40.0;

/// The four action families plus the minigame gate, as the validator sees
/// them. Subtypes that share a threshold share a variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActionCheck {
    Feed,
    Play,
    Wash,
    Sleep(SleepKind),
    Minigame,
}

/// Local precondition check. `Err` carries the feedback line shown in the
/// menu row (and as a toast if the key is pressed anyway); no network call
/// is made for a blocked action.
pub(crate) fn check_action(stats: &Stats, check: ActionCheck) -> Result<(), String> {
    match check {
        ActionCheck::Feed => {
            if stats.hunger > FEED_MAX_HUNGER {
                Err(format!("Hunger is above {FEED_MAX_HUNGER:.0}%"))
            } else {
                Ok(())
            }
        }
        ActionCheck::Play => {
            if stats.happiness > PLAY_MAX_HAPPINESS {
                Err(format!("Joy is above {PLAY_MAX_HAPPINESS:.0}%"))
            } else {
                Ok(())
            }
        }
        ActionCheck::Wash => {
            if stats.cleanliness > WASH_MAX_CLEANLINESS {
                Err(format!("Cleanliness is above {WASH_MAX_CLEANLINESS:.0}%"))
            } else {
                Ok(())
            }
        }
        ActionCheck::Sleep(SleepKind::Nap) => {
            if stats.energy > NAP_MAX_ENERGY {
                Err("Energy is too high for a nap".to_string())
            } else {
                Ok(())
            }
        }
        ActionCheck::Sleep(SleepKind::Sleep) => {
            if stats.energy > SLEEP_MAX_ENERGY {
                Err("Energy is too high for a full sleep".to_string())
            } else {
                Ok(())
            }
        }
        ActionCheck::Minigame => {
            if stats.happiness < MINIGAME_MIN_HAPPINESS {
                Err(format!("Joy is below {MINIGAME_MIN_HAPPINESS:.0}%"))
            } else {
                Ok(())
            }
        }
    }
}

/* -----------------------------
   Overlay timer
------------------------------ */

/// Which selection menu an overlay reopens when it finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Menu {
    Food,
    Play,
    Wash,
}

/// A running activity countdown, anchored to the monotonic clock once at
/// start (or once at resume, from the server's remaining time) and never
/// re-derived from wall clocks afterwards.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Overlay {
    pub(crate) deadline: Instant,
    pub(crate) total: Duration,
    pub(crate) reopen: Option<Menu>,
}

impl Overlay {
    pub(crate) fn started(total: Duration, reopen: Option<Menu>, now: Instant) -> Self {
        Self {
            deadline: now + total,
            total,
            reopen,
        }
    }

    /// Resume mid-activity after a reload: the server said `remaining` is
    /// left of a `total`-long activity.
    pub(crate) fn resumed(
        remaining: Duration,
        total: Duration,
        reopen: Option<Menu>,
        now: Instant,
    ) -> Self {
        Self {
            deadline: now + remaining.min(total),
            total,
            reopen,
        }
    }

    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub(crate) fn is_done(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    /// Whole seconds elapsed, for the stepped progress display.
    pub(crate) fn elapsed_whole_secs(&self, now: Instant) -> u64 {
        self.total.saturating_sub(self.remaining(now)).as_secs()
    }

    pub(crate) fn progress_pct(&self, now: Instant) -> u16 {
        progress_pct(self.elapsed_whole_secs(now), self.total.as_secs())
    }

    /// Remaining time rounded up, so the countdown starts at the full
    /// duration and reads 0 exactly when the overlay closes.
    pub(crate) fn countdown_secs(&self, now: Instant) -> u64 {
        let rem = self.remaining(now);
        let mut secs = rem.as_secs();
        if rem.subsec_nanos() > 0 {
            secs += 1;
        }
        secs
    }
}

/// Displayed percentage after `k` whole seconds of a `total`-second
/// activity: `min(100, round(100*k/total))`. Stepping to whole seconds keeps
/// the bar off non-round values between ticks.
pub(crate) fn progress_pct(k: u64, total: u64) -> u16 {
    if total == 0 {
        return 100;
    }
    let pct = (100.0 * k as f64 / total as f64).round() as u64;
    pct.min(100) as u16
}

pub(crate) fn fmt_countdown(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/* -----------------------------
   Current activity
------------------------------ */

/// At most one activity runs at a time; one union instead of a pile of
/// `is_sleeping`/`is_washing`/... flags.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Activity {
    Idle,
    Feeding { food: Food, overlay: Overlay },
    Playing { game: PlayKind, overlay: Overlay },
    Washing { kind: WashKind, overlay: Overlay },
    Sleeping { kind: SleepKind, overlay: Overlay },
}

impl Activity {
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Activity::Idle)
    }

    pub(crate) fn overlay(&self) -> Option<&Overlay> {
        match self {
            Activity::Idle => None,
            Activity::Feeding { overlay, .. }
            | Activity::Playing { overlay, .. }
            | Activity::Washing { overlay, .. }
            | Activity::Sleeping { overlay, .. } => Some(overlay),
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self {
            Activity::Idle => "Idle",
            Activity::Feeding { .. } => "Feeding",
            Activity::Playing { .. } => "Playing",
            Activity::Washing { kind, .. } => match kind {
                WashKind::WashHands => "Washing hands",
                WashKind::Shower => "Showering",
                WashKind::Bath => "Bathing",
            },
            Activity::Sleeping { kind, .. } => match kind {
                SleepKind::Nap => "Napping",
                SleepKind::Sleep => "Sleeping",
            },
        }
    }
}

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
    fn feed_blocked_above_threshold_with_reason() {
        let ok = stats(80.0, 50.0, 50.0, 50.0);
        assert!(check_action(&ok, ActionCheck::Feed).is_ok());

        let full = stats(85.0, 50.0, 50.0, 50.0);
        let reason = check_action(&full, ActionCheck::Feed).unwrap_err();
        assert!(reason.contains("80%"), "reason was: {reason}");
    }

    #[test]
    fn play_cap_is_89_not_90() {
        let at_cap = stats(50.0, 89.0, 50.0, 50.0);
        assert!(check_action(&at_cap, ActionCheck::Play).is_ok());

        let over = stats(50.0, 90.0, 50.0, 50.0);
        assert!(check_action(&over, ActionCheck::Play).is_err());
    }

    #[test]
    fn wash_threshold() {
        assert!(check_action(&stats(0.0, 0.0, 85.0, 0.0), ActionCheck::Wash).is_ok());
        assert!(check_action(&stats(0.0, 0.0, 85.1, 0.0), ActionCheck::Wash).is_err());
    }

    #[test]
    fn nap_and_sleep_energy_caps() {
        let low = stats(50.0, 50.0, 50.0, 40.0);
        assert!(check_action(&low, ActionCheck::Sleep(SleepKind::Nap)).is_ok());

        let mid = stats(50.0, 50.0, 50.0, 60.0);
        let reason = check_action(&mid, ActionCheck::Sleep(SleepKind::Nap)).unwrap_err();
        assert_eq!(reason, "Energy is too high for a nap");

        // 40 is fine for a nap but too high for a full sleep
        assert!(check_action(&low, ActionCheck::Sleep(SleepKind::Sleep)).is_err());
        let tired = stats(50.0, 50.0, 50.0, 30.0);
        assert!(check_action(&tired, ActionCheck::Sleep(SleepKind::Sleep)).is_ok());
    }

    #[test]
    fn minigames_need_joy() {
        assert!(check_action(&stats(0.0, 40.0, 0.0, 0.0), ActionCheck::Minigame).is_ok());
        assert!(check_action(&stats(0.0, 39.9, 0.0, 0.0), ActionCheck::Minigame).is_err());
    }

    #[test]
    fn progress_pct_matches_rounded_formula() {
        // D=30: 1s -> 3%, 15s -> 50%, 29s -> 97%, 30s -> 100%
        assert_eq!(progress_pct(0, 30), 0);
        assert_eq!(progress_pct(1, 30), 3);
        assert_eq!(progress_pct(15, 30), 50);
        assert_eq!(progress_pct(29, 30), 97);
        assert_eq!(progress_pct(30, 30), 100);
        // D=7: 3s -> round(42.857) = 43
        assert_eq!(progress_pct(3, 7), 43);
        // never above 100, even past the deadline
        assert_eq!(progress_pct(9, 7), 100);
    }

    #[test]
    fn resumed_overlay_matches_uninterrupted_countdown() {
        let start = Instant::now();
        let total = Duration::from_secs(120);

        let uninterrupted = Overlay::started(total, None, start);
        let later = start + Duration::from_secs(47);

        // A client that reloaded at `later` and was told 73s remain.
        let resumed = Overlay::resumed(Duration::from_secs(73), total, None, later);

        let a = uninterrupted.remaining(later).as_secs();
        let b = resumed.remaining(later).as_secs();
        assert!(a.abs_diff(b) <= 1, "drift {a} vs {b}");
        assert_eq!(uninterrupted.progress_pct(later), resumed.progress_pct(later));
    }

    #[test]
    fn countdown_rounds_up_and_ends_at_zero() {
        let start = Instant::now();
        let o = Overlay::started(Duration::from_secs(5), Some(Menu::Food), start);
        assert_eq!(o.countdown_secs(start), 5);
        assert_eq!(o.countdown_secs(start + Duration::from_millis(4_500)), 1);
        assert_eq!(o.countdown_secs(start + Duration::from_secs(5)), 0);
        assert!(o.is_done(start + Duration::from_secs(5)));
        assert!(!o.is_done(start + Duration::from_millis(4_999)));
    }

    #[test]
    fn resumed_remaining_never_exceeds_total() {
        let now = Instant::now();
        let o = Overlay::resumed(
            Duration::from_secs(500),
            Duration::from_secs(60),
            None,
            now,
        );
        assert!(o.remaining(now) <= Duration::from_secs(60));
        assert_eq!(o.progress_pct(now), 0);
    }
}
