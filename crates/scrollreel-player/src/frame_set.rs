use std::fmt;

/// Identifies one frame set. Every sequence switch gets a fresh generation, so
/// completions carrying an older one can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn first() -> Self {
        Generation(1)
    }

    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Handed to the host with each fetch and handed back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub generation: Generation,
    pub index: usize,
}

/// Load state of a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameState<I> {
    Pending,
    Loaded(I),
    Failed,
}

/// A fixed-length, ordered set of frame slots.
#[derive(Debug, Clone)]
pub struct FrameSet<I> {
    generation: Generation,
    frames: Vec<FrameState<I>>,
    loaded: usize,
    failed: usize,
}

impl<I> FrameSet<I> {
    /// All `len` slots start out pending.
    pub fn new(generation: Generation, len: usize) -> Self {
        let mut frames = Vec::with_capacity(len);
        frames.resize_with(len, || FrameState::Pending);
        Self {
            generation,
            frames,
            loaded: 0,
            failed: 0,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<&FrameState<I>> {
        self.frames.get(index)
    }

    /// The image at `index`, only if it finished loading.
    pub fn image(&self, index: usize) -> Option<&I> {
        match self.frames.get(index) {
            Some(FrameState::Loaded(image)) => Some(image),
            _ => None,
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn pending_count(&self) -> usize {
        self.frames.len() - self.loaded - self.failed
    }

    /// Every slot is either loaded or failed.
    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0
    }

    /// Whether `ticket` was issued for this set.
    pub fn owns(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && ticket.index < self.frames.len()
    }

    /// Pending -> Loaded. Returns false if the slot had already settled.
    pub(crate) fn mark_loaded(&mut self, index: usize, image: I) -> bool {
        match self.frames.get_mut(index) {
            Some(slot) if matches!(slot, FrameState::Pending) => {
                *slot = FrameState::Loaded(image);
                self.loaded += 1;
                true
            }
            _ => false,
        }
    }

    /// Pending -> Failed. Returns false if the slot had already settled.
    pub(crate) fn mark_failed(&mut self, index: usize) -> bool {
        match self.frames.get_mut(index) {
            Some(slot) if matches!(slot, FrameState::Pending) => {
                *slot = FrameState::Failed;
                self.failed += 1;
                true
            }
            _ => false,
        }
    }
}
