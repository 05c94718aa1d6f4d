//! Consumer reference counting.
//!
//! The counter itself is plain state; the connection manager holds it under
//! its lock and turns the returned decisions into connect/disconnect calls,
//! so two consumers racing to attach or detach cannot lose a transition.

use tracing::error;

/// Outcome of [`ActivationRefCounter::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// First consumer: the connection should be opened.
    Activate,
    /// The connection is already wanted by someone else.
    AlreadyActive,
}

/// Outcome of [`ActivationRefCounter::detach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
    /// Last consumer left: the connection should be closed.
    Deactivate,
    /// Other consumers remain.
    StillActive,
    /// Detach without a matching attach. Nothing changed.
    Unbalanced,
}

/// Number of consumers currently interested in the live connection.
#[derive(Debug, Clone, Default)]
pub struct ActivationRefCounter {
    count: usize,
}

impl ActivationRefCounter {
    /// A counter with no consumers.
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Consumers currently attached.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// True while at least one consumer is attached.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.count > 0
    }

    /// Register a consumer. Only the first one activates.
    pub fn attach(&mut self) -> Activation {
        let previous = self.count;
        self.count += 1;
        if previous == 0 {
            Activation::Activate
        } else {
            Activation::AlreadyActive
        }
    }

    /// Release one consumer.
    ///
    /// A detach at zero is a reference-counting bug in the caller. It is
    /// logged and otherwise ignored; the count never goes negative.
    pub fn detach(&mut self) -> Deactivation {
        match self.count {
            0 => {
                error!("Consumer detached without a matching attach");
                Deactivation::Unbalanced
            }
            1 => {
                self.count = 0;
                Deactivation::Deactivate
            }
            _ => {
                self.count -= 1;
                Deactivation::StillActive
            }
        }
    }
}
