//! Optimistic values: a local guess shown before the server answers

/// A locally guessed value and its fate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Optimistic<T> {
    /// Request in flight; `guess` is displayed, `previous` is kept for rollback
    Pending { guess: T, previous: T },
    /// Server accepted (its value, or the guess when it sent none)
    Confirmed(T),
    /// Server refused or was unreachable; back to the value before the edit
    RolledBack(T),
}

/// Server verdict on a pending value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Accepted(Option<T>),
    Rejected,
}

impl<T> Optimistic<T> {
    /// Start an edit
    pub fn pending(previous: T, guess: T) -> Self {
        Optimistic::Pending { guess, previous }
    }

    /// Value to display right now
    pub fn value(&self) -> &T {
        match self {
            Optimistic::Pending { guess, .. } => guess,
            Optimistic::Confirmed(v) | Optimistic::RolledBack(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Optimistic::Pending { guess, .. } => guess,
            Optimistic::Confirmed(v) | Optimistic::RolledBack(v) => v,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Optimistic::Pending { .. })
    }

    /// Collapse a server verdict into a settled state.
    ///
    /// Settled values ignore further verdicts.
    pub fn resolve(self, outcome: Outcome<T>) -> Self {
        match (self, outcome) {
            (Optimistic::Pending { guess, .. }, Outcome::Accepted(server)) => {
                Optimistic::Confirmed(server.unwrap_or(guess))
            }
            (Optimistic::Pending { previous, .. }, Outcome::Rejected) => {
                Optimistic::RolledBack(previous)
            }
            (settled, _) => settled,
        }
    }
}

impl<T, E> From<Result<Option<T>, E>> for Outcome<T> {
    fn from(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(server) => Outcome::Accepted(server),
            Err(_) => Outcome::Rejected,
        }
    }
}
