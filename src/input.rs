use crossterm::event::KeyCode;

use crate::app::Scene;
use crate::minigame::higher_lower::{Guess, HigherLowerState};
use crate::minigame::labyrinth::Dir;

#[derive(Clone, Copy, Debug)]
pub(crate) enum PlayerAction {
    Quit,
    Back,
    HelpToggle,
    Refresh,
    OpenFood,
    OpenPlay,
    OpenWash,
    OpenSleep,
    OpenShop,
    OpenGames,
    MenuMove(i32),
    MenuSelect,
    MenuDigit(usize),
    QtyAdjust(i32),
    GuessSet(Guess),
    GuessSubmit,
    ResultDismiss,
    Walk(Dir),
    TestReduceHunger,
    TestReduceEnergy,
    MaturityUp,
    MaturityDown,
}

/// Scene-sensitive key map. The caller has already swallowed everything but
/// quit while an activity overlay is running.
pub(crate) fn map_key(scene: &Scene, code: KeyCode, debug_keys: bool) -> Option<PlayerAction> {
    // Global
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(PlayerAction::Quit),
        KeyCode::Esc => return Some(PlayerAction::Back),
        _ => {}
    }

    if debug_keys && matches!(scene, Scene::Main) {
        match code {
            KeyCode::F(2) => return Some(PlayerAction::TestReduceHunger),
            KeyCode::F(3) => return Some(PlayerAction::TestReduceEnergy),
            KeyCode::F(6) => return Some(PlayerAction::MaturityUp),
            KeyCode::F(7) => return Some(PlayerAction::MaturityDown),
            _ => {}
        }
    }

    match scene {
        Scene::Main => match code {
            KeyCode::Char('f') | KeyCode::Char('F') => Some(PlayerAction::OpenFood),
            KeyCode::Char('p') | KeyCode::Char('P') => Some(PlayerAction::OpenPlay),
            KeyCode::Char('w') | KeyCode::Char('W') => Some(PlayerAction::OpenWash),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(PlayerAction::OpenSleep),
            KeyCode::Char('b') | KeyCode::Char('B') => Some(PlayerAction::OpenShop),
            KeyCode::Char('g') | KeyCode::Char('G') => Some(PlayerAction::OpenGames),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(PlayerAction::Refresh),
            KeyCode::Char('h') | KeyCode::Char('H') => Some(PlayerAction::HelpToggle),
            _ => None,
        },
        Scene::FoodMenu { .. }
        | Scene::PlayMenu { .. }
        | Scene::WashMenu { .. }
        | Scene::SleepMenu { .. }
        | Scene::GameMenu { .. } => match code {
            KeyCode::Up => Some(PlayerAction::MenuMove(-1)),
            KeyCode::Down => Some(PlayerAction::MenuMove(1)),
            KeyCode::Enter => Some(PlayerAction::MenuSelect),
            KeyCode::Char(c @ '1'..='9') => {
                Some(PlayerAction::MenuDigit(c as usize - '1' as usize))
            }
            _ => None,
        },
        Scene::Shop(_) => match code {
            KeyCode::Up => Some(PlayerAction::MenuMove(-1)),
            KeyCode::Down => Some(PlayerAction::MenuMove(1)),
            KeyCode::Left => Some(PlayerAction::QtyAdjust(-1)),
            KeyCode::Right => Some(PlayerAction::QtyAdjust(1)),
            KeyCode::Enter => Some(PlayerAction::MenuSelect),
            _ => None,
        },
        Scene::HigherLower(hl) => match hl {
            HigherLowerState::Choosing { .. } => match code {
                KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('H') => {
                    Some(PlayerAction::GuessSet(Guess::Higher))
                }
                KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('L') => {
                    Some(PlayerAction::GuessSet(Guess::Lower))
                }
                KeyCode::Enter => Some(PlayerAction::GuessSubmit),
                _ => None,
            },
            HigherLowerState::Waiting { .. } => None,
            HigherLowerState::Done { .. } => match code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(PlayerAction::ResultDismiss),
                _ => None,
            },
        },
        Scene::Labyrinth(_) => match code {
            KeyCode::Up => Some(PlayerAction::Walk(Dir::Up)),
            KeyCode::Down => Some(PlayerAction::Walk(Dir::Down)),
            KeyCode::Left => Some(PlayerAction::Walk(Dir::Left)),
            KeyCode::Right => Some(PlayerAction::Walk(Dir::Right)),
            _ => None,
        },
        Scene::Help => match code {
            KeyCode::Char('h') | KeyCode::Char('H') => Some(PlayerAction::Back),
            _ => None,
        },
    }
}
