use std::cell::Cell;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardState {
    #[default]
    Idle,
    Writing,
}

/// Marks the span of the engine's own text writes.
///
/// Mutation records delivered while the state is `Writing` were caused by
/// the engine itself and are dropped. The state only changes through
/// [`WriteScope`], which restores `Idle` when dropped, including during
/// unwinding.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    state: Cell<GuardState>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    pub fn is_writing(&self) -> bool {
        self.state.get() == GuardState::Writing
    }

    /// Enters the `Writing` state, or returns `None` if a write is already
    /// in progress.
    pub fn enter(&self) -> Option<WriteScope<'_>> {
        if self.is_writing() {
            return None;
        }
        self.state.set(GuardState::Writing);
        Some(WriteScope { guard: self })
    }
}

#[must_use = "the guard returns to Idle as soon as the scope is dropped"]
pub struct WriteScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for WriteScope<'_> {
    fn drop(&mut self) {
        self.guard.state.set(GuardState::Idle);
    }
}
