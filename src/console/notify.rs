//! Change notification.
//!
//! The console raises one signal after every command that changed persisted
//! state. What happens next (saving, waking a state machine) is up to the
//! receiver.

/// Receiver of the state-changed signal.
pub trait ChangeNotifier {
    fn state_changed(&mut self);
}

/// Counts notifications.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Counter {
    pub count: usize,
}

#[cfg(test)]
impl ChangeNotifier for Counter {
    fn state_changed(&mut self) {
        self.count += 1;
    }
}
