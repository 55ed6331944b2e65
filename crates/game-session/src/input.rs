use tile_engine::engine::Direction;

/// A single accepted input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Move(Direction),
    Undo,
    Reset,
    Quit,
}

impl Input {
    /// Map a key or command name to an input. Anything unrecognised is
    /// `None` and should be ignored.
    pub fn parse(key: &str) -> Option<Input> {
        let key = key.trim().to_ascii_lowercase();
        let input = match key.as_str() {
            "arrowup" | "up" | "w" | "k" => Input::Move(Direction::Up),
            "arrowdown" | "down" | "s" | "j" => Input::Move(Direction::Down),
            "arrowleft" | "left" | "a" | "h" => Input::Move(Direction::Left),
            "arrowright" | "right" | "d" | "l" => Input::Move(Direction::Right),
            "u" | "undo" => Input::Undo,
            "r" | "reset" | "n" | "new" => Input::Reset,
            "q" | "quit" | "exit" => Input::Quit,
            _ => return None,
        };
        Some(input)
    }
}
