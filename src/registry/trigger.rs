/// Edge-triggered signal asking for a transaction refetch.
///
/// This is a signal, not a queue: raising it while already raised is absorbed, and a single
/// `take` consumes every raise that happened before it.
#[derive(Debug, Default)]
pub struct RefreshTrigger {
    raised: bool
}

impl RefreshTrigger {
    pub fn raise(&mut self) {
        self.raised = true;
    }

    pub fn is_raised(&self) -> bool {
        self.raised
    }

    /// Returns whether the trigger was raised and resets it.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.raised)
    }
}
