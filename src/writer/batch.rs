/// Counters of one indexing run, threaded through the indexing loop by
/// value. A fresh run starts from `BatchState::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchState {
    pub added_into_this_batch: u64,
    pub added_since_last_commit: u64,
    pub added_in_total: u64,
}

impl BatchState {
    pub fn push(self) -> Self {
        BatchState {
            added_into_this_batch: self.added_into_this_batch + 1,
            ..self
        }
    }

    /// The current batch reached the engine.
    pub fn record_flush(self) -> Self {
        BatchState {
            added_into_this_batch: 0,
            added_since_last_commit: self.added_since_last_commit + self.added_into_this_batch,
            added_in_total: self.added_in_total + self.added_into_this_batch,
        }
    }

    /// The write path gave up on the current batch and rolled back, taking
    /// every flush since the last commit with it.
    pub fn roll_back(self) -> Self {
        BatchState {
            added_into_this_batch: 0,
            added_since_last_commit: 0,
            added_in_total: self.added_in_total - self.added_since_last_commit,
        }
    }

    pub fn should_commit(&self, commit_size: u64) -> bool {
        self.added_since_last_commit >= commit_size
    }

    pub fn after_commit(self) -> Self {
        BatchState {
            added_since_last_commit: 0,
            ..self
        }
    }
}
