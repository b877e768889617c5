use std::fmt;

/// Where the move just played came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
    PlayerBook,
    GeneralBook,
    #[default]
    EngineSearch,
}

impl SelectionMode {
    pub fn name(self) -> &'static str {
        match self {
            SelectionMode::PlayerBook => "Player Opening Explorer",
            SelectionMode::GeneralBook => "General Opening Explorer",
            SelectionMode::EngineSearch => "Engine Search",
        }
    }

    pub fn is_book(self) -> bool {
        self != SelectionMode::EngineSearch
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModeTracker {
    current: SelectionMode,
}

impl ModeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, mode: SelectionMode) {
        self.current = mode;
    }

    pub fn current(&self) -> SelectionMode {
        self.current
    }

    // Reply for the `mode` chat command
    pub fn describe(&self) -> String {
        format!("Currently using {}.", self.current)
    }
}
