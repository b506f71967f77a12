/// The server rolls 0..=20 (never the base); the player only picks a side.
pub(crate) const BASE_NUMBER: i64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Guess {
    Higher,
    Lower,
}

impl Guess {
    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            Guess::Higher => "higher",
            Guess::Lower => "lower",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Guess::Higher => "Higher",
            Guess::Lower => "Lower",
        }
    }

    pub(crate) fn toggled(self) -> Self {
        match self {
            Guess::Higher => Guess::Lower,
            Guess::Lower => Guess::Higher,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum HigherLowerState {
    /// Picking a side; Enter submits.
    Choosing { pick: Guess },
    /// Request in flight.
    Waiting { pick: Guess },
    /// Server answered; any key returns to the picker.
    Done {
        pick: Guess,
        rolled: i64,
        correct: bool,
        message: String,
    },
}

impl HigherLowerState {
    pub(crate) fn new() -> Self {
        HigherLowerState::Choosing {
            pick: Guess::Higher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_wire_names() {
        assert_eq!(Guess::Higher.wire_name(), "higher");
        assert_eq!(Guess::Lower.wire_name(), "lower");
    }

    #[test]
    fn toggle_flips_the_pick() {
        assert_eq!(Guess::Higher.toggled(), Guess::Lower);
        assert_eq!(Guess::Lower.toggled().toggled(), Guess::Lower);
    }
}
