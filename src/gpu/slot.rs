//! Single-occupancy holder for the installed point buffer.

/// A GPU resource that can be released ahead of its drop.
pub trait Release {
    fn release(&self);
}

impl Release for wgpu::Buffer {
    fn release(&self) {
        self.destroy();
    }
}

/// Holds at most one buffer and the number of points in it.
///
/// [`BufferSlot::refill`] releases the current buffer before creating
/// the next one, so two fields are never alive at once.
#[derive(Debug)]
pub struct BufferSlot<B: Release> {
    current: Option<(B, u32)>,
}

impl<B: Release> BufferSlot<B> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Release the held buffer, then store the one `create` returns.
    pub fn refill(&mut self, count: u32, create: impl FnOnce() -> B) {
        if let Some((old, _)) = self.current.take() {
            old.release();
        }
        self.current = Some((create(), count));
    }

    /// Points in the held buffer; zero when empty.
    pub fn count(&self) -> u32 {
        self.current.as_ref().map_or(0, |(_, count)| *count)
    }

    /// The held buffer, if it has anything to draw.
    pub fn drawable(&self) -> Option<(&B, u32)> {
        self.current
            .as_ref()
            .filter(|(_, count)| *count > 0)
            .map(|(buffer, count)| (buffer, *count))
    }
}

impl<B: Release> Default for BufferSlot<B> {
    fn default() -> Self {
        Self::new()
    }
}
