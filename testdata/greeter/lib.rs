//! Greeter builds greetings. It keeps no state between calls.

use std::fmt;

/// Greeter says hello. It is cheap to construct. Reuse it freely.
pub struct Greeter {
    /// Name used in every greeting.
    pub name: String,
    /// Greetings handed out so far.
    count: usize,
    pub loud: bool,
}

impl Greeter {
    /// New creates a greeter for name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            loud: false,
        }
    }

    /// Greet returns the greeting. The name is never empty.
    pub fn greet(&mut self) -> String {
        self.count += 1;
        let text = format!("Hello, {}!", self.name);
        if self.loud {
            shout(&text)
        } else {
            text
        }
    }
}

impl fmt::Display for &Greeter {
    /// Fmt writes the greeting without counting it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hello, {}!", self.name)
    }
}

/// Mood of a greeting.
pub enum Mood {
    /// A cheerful greeting.
    Happy,
    Plain,
}

/// Name greeted when none is given.
pub const DEFAULT_NAME: &str = "world";

pub static SEPARATOR: &str = ", ";

/// Shout upper-cases a greeting.
pub fn shout(text: &str) -> String {
    text.to_uppercase()
}

fn undocumented() {}
