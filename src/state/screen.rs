/// Screen navigation state machine
///
/// LOADING -> HOME -> EDITOR -> EXPORT, with EDITOR <-> HOME and
/// EXPORT -> EDITOR / HOME. Anything else is rejected.
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Loading,
    Home,
    Editor,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot navigate from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: Screen,
    pub to: Screen,
}

impl Screen {
    pub fn can_transition(self, to: Screen) -> bool {
        use Screen::*;
        matches!(
            (self, to),
            (Loading, Home)
                | (Home, Editor)
                | (Editor, Home)
                | (Editor, Export)
                | (Export, Editor)
                | (Export, Home)
        )
    }

    /// Move to `to`, or report why that is not allowed
    pub fn transition(self, to: Screen) -> Result<Screen, TransitionError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Screen; 4] = [Screen::Loading, Screen::Home, Screen::Editor, Screen::Export];

    #[test]
    fn test_allowed_transitions() {
        let allowed = [
            (Screen::Loading, Screen::Home),
            (Screen::Home, Screen::Editor),
            (Screen::Editor, Screen::Home),
            (Screen::Editor, Screen::Export),
            (Screen::Export, Screen::Editor),
            (Screen::Export, Screen::Home),
        ];

        for from in ALL {
            for to in ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(from.transition(to).is_ok(), expected, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn test_rejected_transition_reports_both_ends() {
        let err = Screen::Home.transition(Screen::Export).unwrap_err();
        assert_eq!(err, TransitionError { from: Screen::Home, to: Screen::Export });
    }
}
