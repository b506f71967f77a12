use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::{mpsc, RwLock};

use crate::api::{parse_server_time, ActionBody, ApiClient, StatsResponse};
use crate::config::{load_settings, save_settings_atomic, settings_path};
use crate::input::{map_key, PlayerAction};
use crate::minigame::higher_lower::{Guess, HigherLowerState};
use crate::minigame::labyrinth::LabyrinthState;
use crate::minigame::Game;
use crate::model::{
    check_action, ActionCheck, Activity, Food, Inventory, Maturity, Menu, Overlay, PetKind,
    PlayKind, SleepKind, Stats, WashKind, FEED_DURATION, PLAY_DURATION,
};
use crate::shop::ShopState;
use crate::{ui, Cli};

const POLL_INTERVAL: Duration = Duration::from_secs(60);
const TOAST_SECS: u64 = 3;
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub(crate) enum Scene {
    Main,
    FoodMenu { cursor: usize },
    PlayMenu { cursor: usize },
    WashMenu { cursor: usize },
    SleepMenu { cursor: usize },
    Shop(ShopState),
    GameMenu { cursor: usize },
    HigherLower(HigherLowerState),
    Labyrinth(LabyrinthState),
    Help,
}

#[derive(Clone, Debug)]
pub(crate) struct Toast {
    pub(crate) text: String,
    pub(crate) success: bool,
    pub(crate) until: Instant,
}

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) server_url: String,
    pub(crate) pet: PetKind,
    pub(crate) mono: bool,
    pub(crate) debug_keys: bool,
    pub(crate) stats: Option<Stats>,
    pub(crate) inventory: Option<Inventory>,
    pub(crate) maturity: Option<Maturity>,
    pub(crate) activity: Activity,
    pub(crate) scene: Scene,
    pub(crate) toast: Option<Toast>,
    pub(crate) started: Instant,
}

#[derive(Debug)]
pub(crate) enum Cmd {
    RefreshStats,
    StartAction(ActionBody),
    Purchase { food: Food, quantity: u32 },
    SubmitGuess(Guess),
    FinishLabyrinth { blueberry: u32, acorn: u32 },
    TestAction(&'static str),
    MaturityShift(&'static str),
}

impl AppState {
    fn toast(&mut self, text: impl Into<String>, success: bool) {
        self.toast = Some(Toast {
            text: text.into(),
            success,
            until: Instant::now() + Duration::from_secs(TOAST_SECS),
        });
    }

    /// Frame index for the looping pet animation.
    pub(crate) fn anim_index(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        (self.started.elapsed().as_millis() / 500) as usize % frame_count
    }

    /// Expire the toast and close a finished overlay. Feed/play/wash reopen
    /// the menu they were started from; sleep drops back to the main scene.
    fn advance_timers(&mut self, now: Instant) {
        if let Some(t) = &self.toast {
            if now >= t.until {
                self.toast = None;
            }
        }

        let done = self
            .activity
            .overlay()
            .map(|o| o.is_done(now))
            .unwrap_or(false);
        if done {
            let title = self.activity.title();
            let reopen = self.activity.overlay().and_then(|o| o.reopen);
            self.activity = Activity::Idle;
            self.scene = match reopen {
                Some(Menu::Food) => Scene::FoodMenu { cursor: 0 },
                Some(Menu::Play) => Scene::PlayMenu { cursor: 0 },
                Some(Menu::Wash) => Scene::WashMenu { cursor: 0 },
                None => Scene::Main,
            };
            self.toast(format!("{title} finished"), true);
        }
    }

    /// Fold a stats response into local state. Server activity timestamps
    /// are anchored to the monotonic clock exactly once, here.
    fn apply_stats_response(&mut self, resp: &StatsResponse, now: Instant) {
        self.stats = Some(resp.stats);
        if let Some(inv) = resp.inventory {
            self.inventory = Some(inv);
            if let Scene::Shop(shop) = &mut self.scene {
                shop.reclamp(inv.coins);
            }
        }
        if let Some(m) = &resp.maturity {
            self.maturity = Some(m.clone());
        }

        let sleep_remaining = resp
            .sleep_end_time
            .as_deref()
            .and_then(parse_server_time)
            .and_then(|end| (end - Utc::now()).to_std().ok());
        match (resp.is_sleeping, sleep_remaining) {
            (true, Some(rem)) if !rem.is_zero() => {
                let kind = resp.sleep_type.unwrap_or(SleepKind::Nap);
                self.activity = Activity::Sleeping {
                    kind,
                    overlay: Overlay::resumed(rem, kind.duration(), None, now),
                };
                return;
            }
            _ => {
                if matches!(self.activity, Activity::Sleeping { .. }) {
                    self.activity = Activity::Idle;
                }
            }
        }

        let wash_remaining = resp
            .wash_end_time
            .as_deref()
            .and_then(parse_server_time)
            .and_then(|end| (end - Utc::now()).to_std().ok());
        match (resp.is_washing, wash_remaining) {
            (true, Some(rem)) if !rem.is_zero() => {
                let kind = resp.wash_type.unwrap_or(WashKind::WashHands);
                self.activity = Activity::Washing {
                    kind,
                    overlay: Overlay::resumed(rem, kind.duration(), Some(Menu::Wash), now),
                };
            }
            _ => {
                if matches!(self.activity, Activity::Washing { .. }) {
                    self.activity = Activity::Idle;
                }
            }
        }
    }
}

pub(crate) async fn run(cli: Cli) -> Result<()> {
    let settings_file = settings_path()?;
    let mut settings = load_settings(&settings_file);
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(pet) = cli.pet {
        settings.pet = pet;
    }
    if cli.mono {
        settings.mono = true;
    }

    let api = ApiClient::new(&settings.server_url);

    let mut state = AppState {
        server_url: settings.server_url.clone(),
        pet: settings.pet,
        mono: settings.mono,
        debug_keys: cli.debug_keys,
        stats: None,
        inventory: None,
        maturity: None,
        activity: Activity::Idle,
        scene: Scene::Main,
        toast: None,
        started: Instant::now(),
    };

    // Initial fetch (best-effort; the UI still starts if it fails)
    match api.fetch_stats().await {
        Ok(resp) => state.apply_stats_response(&resp, Instant::now()),
        Err(e) => state.toast(format!("stats: {e:#}"), false),
    }

    let shared = RwLock::new(state);
    let (tx, mut rx) = mpsc::channel::<Cmd>(16);
    spawn_stats_refresher(tx.clone(), POLL_INTERVAL);

    let mut terminal = ui::setup_terminal()?;

    loop {
        // Drain commands from background refreshers and key handling
        while let Ok(cmd) = rx.try_recv() {
            handle_cmd(&api, &shared, cmd).await;
        }

        {
            let mut st = shared.write().await;
            st.advance_timers(Instant::now());
        }

        let snapshot = { shared.read().await.clone() };
        ui::draw_frame(&mut terminal, &snapshot)?;

        if event::poll(INPUT_POLL)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    if handle_key(&tx, &shared, k.code).await? {
                        break;
                    }
                }
            }
        }
    }

    ui::restore_terminal(&mut terminal)?;
    save_settings_atomic(&settings_file, &settings)?;
    Ok(())
}

fn spawn_stats_refresher(tx: mpsc::Sender<Cmd>, every: Duration) {
    tokio::spawn(async move {
        let mut t = tokio::time::interval(every);
        t.tick().await; // the startup fetch already happened
        loop {
            t.tick().await;
            tx.send(Cmd::RefreshStats).await.ok();
        }
    });
}

async fn handle_key(
    tx: &mpsc::Sender<Cmd>,
    shared: &RwLock<AppState>,
    code: crossterm::event::KeyCode,
) -> Result<bool> {
    let mut st = shared.write().await;

    // A running overlay blocks the whole UI; only quit gets through.
    if !st.activity.is_idle() {
        return Ok(matches!(
            code,
            crossterm::event::KeyCode::Char('q') | crossterm::event::KeyCode::Char('Q')
        ));
    }

    let Some(action) = map_key(&st.scene, code, st.debug_keys) else {
        return Ok(false);
    };

    match action {
        PlayerAction::Quit => return Ok(true),
        PlayerAction::Back => {
            st.scene = match &st.scene {
                Scene::HigherLower(_) | Scene::Labyrinth(_) => Scene::GameMenu { cursor: 0 },
                _ => Scene::Main,
            };
        }
        PlayerAction::HelpToggle => {
            st.scene = match st.scene {
                Scene::Help => Scene::Main,
                _ => Scene::Help,
            };
        }
        PlayerAction::Refresh => {
            tx.send(Cmd::RefreshStats).await.ok();
        }

        PlayerAction::OpenFood => open_gated_menu(&mut st, ActionCheck::Feed, |_| Scene::FoodMenu {
            cursor: 0,
        }),
        PlayerAction::OpenPlay => open_gated_menu(&mut st, ActionCheck::Play, |_| Scene::PlayMenu {
            cursor: 0,
        }),
        PlayerAction::OpenWash => open_gated_menu(&mut st, ActionCheck::Wash, |_| Scene::WashMenu {
            cursor: 0,
        }),
        PlayerAction::OpenSleep => {
            // both subtypes have their own caps; the menu shows them per row
            st.scene = Scene::SleepMenu { cursor: 0 };
        }
        PlayerAction::OpenShop => {
            st.scene = Scene::Shop(ShopState::new());
        }
        PlayerAction::OpenGames => open_gated_menu(&mut st, ActionCheck::Minigame, |_| {
            Scene::GameMenu { cursor: 0 }
        }),

        PlayerAction::MenuMove(delta) => menu_move(&mut st, delta),
        PlayerAction::MenuSelect => {
            if let Some(cmd) = menu_select(&mut st, None) {
                tx.send(cmd).await.ok();
            }
        }
        PlayerAction::MenuDigit(i) => {
            if let Some(cmd) = menu_select(&mut st, Some(i)) {
                tx.send(cmd).await.ok();
            }
        }
        PlayerAction::QtyAdjust(delta) => {
            let coins = st.inventory.map(|i| i.coins).unwrap_or(0);
            if let Scene::Shop(shop) = &mut st.scene {
                shop.adjust_qty(delta, coins);
            }
        }

        PlayerAction::GuessSet(g) => {
            if let Scene::HigherLower(HigherLowerState::Choosing { pick }) = &mut st.scene {
                *pick = g;
            }
        }
        PlayerAction::GuessSubmit => {
            if let Scene::HigherLower(HigherLowerState::Choosing { pick }) = &st.scene {
                let pick = *pick;
                st.scene = Scene::HigherLower(HigherLowerState::Waiting { pick });
                tx.send(Cmd::SubmitGuess(pick)).await.ok();
            }
        }
        PlayerAction::ResultDismiss => {
            if let Scene::HigherLower(HigherLowerState::Done { .. }) = &st.scene {
                st.scene = Scene::HigherLower(HigherLowerState::new());
            }
        }

        PlayerAction::Walk(dir) => {
            if let Scene::Labyrinth(lab) = &mut st.scene {
                let was_finished = lab.finished;
                lab.step(dir);
                if lab.finished && !was_finished {
                    let (blueberry, acorn) = lab.collected_counts();
                    tx.send(Cmd::FinishLabyrinth { blueberry, acorn }).await.ok();
                }
            }
        }

        PlayerAction::TestReduceHunger => {
            tx.send(Cmd::TestAction("reduce-hunger")).await.ok();
        }
        PlayerAction::TestReduceEnergy => {
            tx.send(Cmd::TestAction("reduce-energy")).await.ok();
        }
        PlayerAction::MaturityUp => {
            tx.send(Cmd::MaturityShift("up")).await.ok();
        }
        PlayerAction::MaturityDown => {
            tx.send(Cmd::MaturityShift("down")).await.ok();
        }
    }

    Ok(false)
}

/// Open a menu whose whole family shares one threshold; blocked families
/// toast the reason instead (the menu key acts as the disabled control).
fn open_gated_menu(
    st: &mut AppState,
    check: ActionCheck,
    make: impl FnOnce(&AppState) -> Scene,
) {
    let stats = st.stats.unwrap_or_default();
    match check_action(&stats, check) {
        Ok(()) => st.scene = make(st),
        Err(reason) => st.toast(reason, false),
    }
}

fn menu_move(st: &mut AppState, delta: i32) {
    let coins = st.inventory.map(|i| i.coins).unwrap_or(0);
    let wrap = |cursor: usize, len: usize| -> usize {
        (cursor as i32 + delta).rem_euclid(len as i32) as usize
    };
    match &mut st.scene {
        Scene::FoodMenu { cursor } => *cursor = wrap(*cursor, Food::ALL.len()),
        Scene::PlayMenu { cursor } => *cursor = wrap(*cursor, PlayKind::ALL.len()),
        Scene::WashMenu { cursor } => *cursor = wrap(*cursor, WashKind::ALL.len()),
        Scene::SleepMenu { cursor } => *cursor = wrap(*cursor, SleepKind::ALL.len()),
        Scene::GameMenu { cursor } => *cursor = wrap(*cursor, Game::ALL.len()),
        Scene::Shop(shop) => shop.move_cursor(delta, coins),
        _ => {}
    }
}

/// Enter (or a digit shortcut) on whatever menu is open. Returns the
/// network command to dispatch, if the selection passes its local checks.
fn menu_select(st: &mut AppState, digit: Option<usize>) -> Option<Cmd> {
    // Read the selection out first; acting on it wants the whole state.
    enum Sel {
        Food(Food),
        Play(PlayKind),
        Wash(WashKind),
        Sleep(SleepKind),
        Game(Game),
        Buy { food: Food, quantity: u32, enabled: bool },
    }

    let sel = match &st.scene {
        Scene::FoodMenu { cursor } => Sel::Food(*Food::ALL.get(digit.unwrap_or(*cursor))?),
        Scene::PlayMenu { cursor } => Sel::Play(*PlayKind::ALL.get(digit.unwrap_or(*cursor))?),
        Scene::WashMenu { cursor } => Sel::Wash(*WashKind::ALL.get(digit.unwrap_or(*cursor))?),
        Scene::SleepMenu { cursor } => Sel::Sleep(*SleepKind::ALL.get(digit.unwrap_or(*cursor))?),
        Scene::GameMenu { cursor } => Sel::Game(*Game::ALL.get(digit.unwrap_or(*cursor))?),
        Scene::Shop(shop) => Sel::Buy {
            food: shop.selected(),
            quantity: shop.selected_qty(),
            enabled: shop.buy_enabled(st.inventory.as_ref()),
        },
        _ => return None,
    };

    let stats = st.stats.unwrap_or_default();
    match sel {
        Sel::Food(food) => {
            let have = st.inventory.map(|inv| inv.food_count(food)).unwrap_or(0);
            if have == 0 {
                st.toast(format!("No {} left, visit the shop", food.label()), false);
                return None;
            }
            Some(Cmd::StartAction(ActionBody::Feed(food)))
        }
        Sel::Play(game) => Some(Cmd::StartAction(ActionBody::Play(game))),
        Sel::Wash(kind) => Some(Cmd::StartAction(ActionBody::Wash(kind))),
        Sel::Sleep(kind) => {
            if let Err(reason) = check_action(&stats, ActionCheck::Sleep(kind)) {
                st.toast(reason, false);
                return None;
            }
            Some(Cmd::StartAction(ActionBody::Sleep(kind)))
        }
        Sel::Game(Game::HigherLower) => {
            st.scene = Scene::HigherLower(HigherLowerState::new());
            None
        }
        Sel::Game(Game::Labyrinth) => {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
                ^ 0xA5A5_5A5A_D00D_F00D;
            st.scene = Scene::Labyrinth(LabyrinthState::new(seed));
            None
        }
        Sel::Buy {
            food,
            quantity,
            enabled,
        } => {
            if !enabled {
                st.toast("Not enough coins", false);
                return None;
            }
            Some(Cmd::Purchase { food, quantity })
        }
    }
}

async fn handle_cmd(api: &ApiClient, shared: &RwLock<AppState>, cmd: Cmd) {
    match cmd {
        Cmd::RefreshStats => {
            // Background polls sit out while an activity is running; the
            // overlay countdown is already authoritative locally.
            {
                let st = shared.read().await;
                if !st.activity.is_idle() {
                    return;
                }
            }
            match api.fetch_stats().await {
                Ok(resp) => {
                    let mut st = shared.write().await;
                    st.apply_stats_response(&resp, Instant::now());
                }
                Err(e) => {
                    let mut st = shared.write().await;
                    st.toast(format!("stats: {e:#}"), false);
                }
            }
        }

        Cmd::StartAction(body) => {
            // Overlay starts immediately so the modal is visible during the
            // request; a failed request cancels it and reopens the menu.
            let (origin, title) = {
                let mut st = shared.write().await;
                let now = Instant::now();
                st.activity = match body {
                    ActionBody::Feed(food) => Activity::Feeding {
                        food,
                        overlay: Overlay::started(FEED_DURATION, Some(Menu::Food), now),
                    },
                    ActionBody::Play(game) => Activity::Playing {
                        game,
                        overlay: Overlay::started(PLAY_DURATION, Some(Menu::Play), now),
                    },
                    ActionBody::Wash(kind) => Activity::Washing {
                        kind,
                        overlay: Overlay::started(kind.duration(), Some(Menu::Wash), now),
                    },
                    ActionBody::Sleep(kind) => Activity::Sleeping {
                        kind,
                        overlay: Overlay::started(kind.duration(), None, now),
                    },
                };
                let origin = st.activity.overlay().and_then(|o| o.reopen);
                st.scene = Scene::Main;
                (origin, st.activity.title())
            };

            match api.pet_action(body).await {
                Ok(resp) => {
                    let mut st = shared.write().await;
                    let now = Instant::now();
                    if let Some(stats) = resp.stats {
                        st.stats = Some(stats);
                    }
                    if let Some(inv) = resp.inventory {
                        st.inventory = Some(inv);
                    }
                    if let Some(m) = resp.maturity {
                        st.maturity = Some(m);
                    }
                    // Prefer the server's end time when it sent one.
                    let end = match body {
                        ActionBody::Sleep(_) => resp.sleep_end_time.as_deref(),
                        ActionBody::Wash(_) => resp.wash_end_time.as_deref(),
                        _ => None,
                    };
                    if let Some(rem) = end
                        .and_then(parse_server_time)
                        .and_then(|t| (t - Utc::now()).to_std().ok())
                    {
                        if let Some(overlay) = match &mut st.activity {
                            Activity::Sleeping { overlay, .. }
                            | Activity::Washing { overlay, .. } => Some(overlay),
                            _ => None,
                        } {
                            *overlay =
                                Overlay::resumed(rem, overlay.total, overlay.reopen, now);
                        }
                    }
                }
                Err(e) => {
                    let mut st = shared.write().await;
                    st.activity = Activity::Idle;
                    st.scene = match origin {
                        Some(Menu::Food) => Scene::FoodMenu { cursor: 0 },
                        Some(Menu::Play) => Scene::PlayMenu { cursor: 0 },
                        Some(Menu::Wash) => Scene::WashMenu { cursor: 0 },
                        None => Scene::Main,
                    };
                    st.toast(format!("{title} failed: {e:#}"), false);
                }
            }
        }

        Cmd::Purchase { food, quantity } => match api.purchase(food, quantity).await {
            Ok(resp) => {
                let mut st = shared.write().await;
                if let Some(inv) = resp.inventory {
                    st.inventory = Some(inv);
                    if let Scene::Shop(shop) = &mut st.scene {
                        shop.reclamp(inv.coins);
                    }
                }
                st.toast(format!("Bought {quantity} × {}", food.label()), true);
            }
            Err(e) => {
                let mut st = shared.write().await;
                st.toast(format!("Purchase failed: {e:#}"), false);
            }
        },

        Cmd::SubmitGuess(pick) => match api.higher_lower(pick.wire_name()).await {
            Ok(resp) => {
                let mut st = shared.write().await;
                if let Some(stats) = resp.stats {
                    st.stats = Some(stats);
                }
                if let Scene::HigherLower(_) = &st.scene {
                    st.scene = Scene::HigherLower(HigherLowerState::Done {
                        pick,
                        rolled: resp.rolled_number.unwrap_or(0),
                        correct: resp.is_correct.unwrap_or(false),
                        message: resp
                            .reward_message
                            .unwrap_or_else(|| "No message".to_string()),
                    });
                }
            }
            Err(e) => {
                let mut st = shared.write().await;
                if let Scene::HigherLower(_) = &st.scene {
                    st.scene = Scene::HigherLower(HigherLowerState::new());
                }
                st.toast(format!("Higher-lower failed: {e:#}"), false);
            }
        },

        Cmd::FinishLabyrinth { blueberry, acorn } => {
            match api.labyrinth_result(blueberry, acorn).await {
                Ok(resp) => {
                    let mut st = shared.write().await;
                    if let Some(inv) = resp.inventory {
                        st.inventory = Some(inv);
                    }
                    let msg = resp
                        .reward_message
                        .unwrap_or_else(|| "Labyrinth cleared!".to_string());
                    st.toast(msg, true);
                    st.scene = Scene::GameMenu { cursor: 0 };
                }
                Err(e) => {
                    let mut st = shared.write().await;
                    st.toast(format!("Labyrinth failed: {e:#}"), false);
                    st.scene = Scene::GameMenu { cursor: 0 };
                }
            }
        }

        Cmd::TestAction(name) => match api.test_action(name).await {
            Ok(resp) => {
                let mut st = shared.write().await;
                if let Some(stats) = resp.stats {
                    st.stats = Some(stats);
                }
                st.toast(format!("test: {name}"), true);
            }
            Err(e) => {
                let mut st = shared.write().await;
                st.toast(format!("test-action failed: {e:#}"), false);
            }
        },

        Cmd::MaturityShift(direction) => match api.maturity_shift(direction).await {
            Ok(resp) => {
                let mut st = shared.write().await;
                if let Some(m) = resp.maturity {
                    let label = m.stage.label();
                    st.maturity = Some(m);
                    st.toast(format!("Maturity: {label}"), true);
                }
            }
            Err(e) => {
                let mut st = shared.write().await;
                st.toast(format!("maturity failed: {e:#}"), false);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaturityStage;

    fn base_state() -> AppState {
        AppState {
            server_url: "http://localhost".into(),
            pet: PetKind::Hedgehog,
            mono: true,
            debug_keys: false,
            stats: Some(Stats {
                hunger: 50.0,
                happiness: 50.0,
                cleanliness: 50.0,
                energy: 50.0,
            }),
            inventory: Some(Inventory {
                tree_seed: 5,
                blueberries: 5,
                mushroom: 5,
                acorn: 5,
                coins: 100,
            }),
            maturity: None,
            activity: Activity::Idle,
            scene: Scene::Main,
            toast: None,
            started: Instant::now(),
        }
    }

    fn stats_resp(json: &str) -> StatsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn reload_mid_sleep_resumes_countdown_from_server_end_time() {
        let mut st = base_state();
        let end = Utc::now() + chrono::Duration::seconds(45);
        let body = format!(
            r#"{{
                "success": true,
                "stats": {{"hunger": 50, "happiness": 50, "cleanliness": 50, "energy": 20}},
                "is_sleeping": true,
                "sleep_type": "sleep",
                "sleep_end_time": "{}"
            }}"#,
            end.to_rfc3339()
        );
        let now = Instant::now();
        st.apply_stats_response(&stats_resp(&body), now);

        let overlay = st.activity.overlay().expect("sleeping overlay");
        let rem = overlay.remaining(now).as_secs();
        assert!((44..=45).contains(&rem), "remaining {rem}");
        assert_eq!(overlay.total, SleepKind::Sleep.duration());
        assert!(matches!(
            st.activity,
            Activity::Sleeping {
                kind: SleepKind::Sleep,
                ..
            }
        ));
    }

    #[test]
    fn stale_server_end_time_leaves_pet_awake() {
        let mut st = base_state();
        let end = Utc::now() - chrono::Duration::seconds(10);
        let body = format!(
            r#"{{
                "success": true,
                "stats": {{"hunger": 50, "happiness": 50, "cleanliness": 50, "energy": 20}},
                "is_sleeping": true,
                "sleep_type": "nap",
                "sleep_end_time": "{}"
            }}"#,
            end.to_rfc3339()
        );
        st.apply_stats_response(&stats_resp(&body), Instant::now());
        assert!(st.activity.is_idle());
    }

    #[test]
    fn fetch_saying_idle_clears_a_local_sleep() {
        let mut st = base_state();
        let now = Instant::now();
        st.activity = Activity::Sleeping {
            kind: SleepKind::Nap,
            overlay: Overlay::started(SleepKind::Nap.duration(), None, now),
        };
        let body = r#"{
            "success": true,
            "stats": {"hunger": 50, "happiness": 50, "cleanliness": 50, "energy": 80},
            "is_sleeping": false
        }"#;
        st.apply_stats_response(&stats_resp(body), now);
        assert!(st.activity.is_idle());
    }

    #[test]
    fn wash_resume_reopens_wash_menu_when_done() {
        let mut st = base_state();
        let end = Utc::now() + chrono::Duration::seconds(2);
        let body = format!(
            r#"{{
                "success": true,
                "stats": {{"hunger": 50, "happiness": 50, "cleanliness": 50, "energy": 50}},
                "is_washing": true,
                "wash_type": "shower",
                "wash_end_time": "{}"
            }}"#,
            end.to_rfc3339()
        );
        let now = Instant::now();
        st.apply_stats_response(&stats_resp(&body), now);
        let overlay = st.activity.overlay().expect("washing overlay");
        assert_eq!(overlay.reopen, Some(Menu::Wash));

        // fast-forward past the deadline
        st.advance_timers(now + Duration::from_secs(3));
        assert!(st.activity.is_idle());
        assert!(matches!(st.scene, Scene::WashMenu { .. }));
    }

    #[test]
    fn overlay_completion_reopens_food_menu_and_toasts() {
        let mut st = base_state();
        let now = Instant::now();
        st.activity = Activity::Feeding {
            food: Food::Acorn,
            overlay: Overlay::started(FEED_DURATION, Some(Menu::Food), now),
        };
        st.scene = Scene::Main;

        st.advance_timers(now + Duration::from_secs(2));
        assert!(!st.activity.is_idle(), "still feeding at 2s");

        st.advance_timers(now + FEED_DURATION);
        assert!(st.activity.is_idle());
        assert!(matches!(st.scene, Scene::FoodMenu { .. }));
        assert!(st.toast.as_ref().unwrap().text.contains("finished"));
    }

    #[test]
    fn maturity_mirror_is_applied_from_fetch() {
        let mut st = base_state();
        let body = r#"{
            "success": true,
            "stats": {"hunger": 50, "happiness": 50, "cleanliness": 50, "energy": 50},
            "maturity": {"stage": "adult", "next_change_time": null}
        }"#;
        st.apply_stats_response(&stats_resp(body), Instant::now());
        assert_eq!(st.maturity.unwrap().stage, MaturityStage::Adult);
    }
}
