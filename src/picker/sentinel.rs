//! Scroll proximity trigger for "load more".

/// Turns raw scroll events into at most one "load next page" decision per frame.
///
/// Raw events only overwrite the pending sample; [`ScrollSentinel::sample`] is
/// called once per frame and consumes it.
#[derive(Debug)]
pub struct ScrollSentinel {
    threshold: u32,
    pending: Option<u32>,
}

impl ScrollSentinel {
    /// Creates a sentinel firing below `threshold` units from the loaded edge
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            pending: None,
        }
    }

    /// Records a raw scroll event; the latest distance wins
    pub fn record(&mut self, distance_from_edge: u32) {
        self.pending = Some(distance_from_edge);
    }

    /// Whether a sample is waiting for the next frame
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending sample.
    ///
    /// Returns true when it is close enough to the loaded edge, more items exist
    /// and no request is outstanding.
    pub fn sample(&mut self, has_more: bool, in_flight: bool) -> bool {
        let Some(distance) = self.pending.take() else {
            return false;
        };
        let fire = distance < self.threshold && has_more && !in_flight;
        trace!("scroll sample {distance} (threshold {}): fire={fire}", self.threshold);
        fire
    }
}
