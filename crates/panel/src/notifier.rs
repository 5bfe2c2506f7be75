use tokio::task::JoinHandle;

/// The single auto-hide timer. Each arm bumps the generation and aborts the
/// previous task, so only the most recent arm can hide the notification.
#[derive(Debug, Default)]
pub(crate) struct HideTimer {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl HideTimer {
    pub(crate) fn rearm(&mut self, spawn: impl FnOnce(u64) -> JoinHandle<()>) {
        self.cancel();
        self.generation += 1;
        self.task = Some(spawn(self.generation));
    }

    /// Returns true when `generation` is the live arm; the timer is then spent.
    pub(crate) fn fire(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.task.is_none() {
            return false;
        }
        self.task = None;
        true
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
