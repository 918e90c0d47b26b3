use crate::Document;

pub(crate) type FrameCallback = Box<dyn FnOnce(&mut Document)>;

/// Callbacks waiting for the next animation frame.
///
/// A frame runs exactly the callbacks queued before it started; anything
/// queued while it runs waits for the following frame.
#[derive(Default)]
pub(crate) struct FrameQueue {
    pending: Vec<FrameCallback>,
    frames_run: u64,
}

impl FrameQueue {
    pub(crate) fn push(&mut self, callback: FrameCallback) {
        self.pending.push(callback);
    }

    pub(crate) fn take(&mut self) -> Vec<FrameCallback> {
        self.frames_run += 1;
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn frames_run(&self) -> u64 {
        self.frames_run
    }
}
