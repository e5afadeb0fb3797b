/// Monotonic counter for one kind of asynchronous operation.
///
/// Every new request takes the next generation; a result is only applied if its generation is
/// still the latest one issued, so responses overtaken by a newer request are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generation {
    current: u64
}

impl Generation {
    pub fn next(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.current
    }
}
