pub(crate) mod higher_lower;
pub(crate) mod labyrinth;

/// Rows of the minigame picker, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Game {
    HigherLower,
    Labyrinth,
}

impl Game {
    pub(crate) const ALL: [Game; 2] = [Game::HigherLower, Game::Labyrinth];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Game::HigherLower => "Higher or lower",
            Game::Labyrinth => "Labyrinth",
        }
    }
}
