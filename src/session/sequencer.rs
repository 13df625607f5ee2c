use serde::Serialize;
use std::fmt;

/// Identifies one submitted request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value())
    }
}

/// Last-submitted-wins guard.
///
/// Each submission or cancellation bumps the counter; an outcome may only be
/// applied if its generation is still the current one when it arrives.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    current: Generation,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request and returns its generation.
    pub fn begin(&mut self) -> Generation {
        self.bump()
    }

    /// Supersedes whatever is in flight without starting anything.
    pub fn invalidate(&mut self) {
        self.bump();
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current == generation
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    fn bump(&mut self) -> Generation {
        self.current = Generation(self.current.0.wrapping_add(1));
        self.current
    }
}
