/// Per-session chunk counter.
///
/// Only the playout thread drives it, so it needs no synchronisation.
#[derive(Debug, Default)]
pub struct Sequencer {
    next: u32,
    issued: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current index and moves to the next one.
    pub fn advance(&mut self) -> u32 {
        let index = self.next;
        self.next = self.next.wrapping_add(1);
        self.issued += 1;
        index
    }

    /// Indices handed out so far, wraps included.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}
