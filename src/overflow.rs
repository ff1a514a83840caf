//! Overflow detection for the tag container.
//!
//! After a mutation that can change rendered size, the container's natural content
//! size is compared with its visible box once layout for the new list exists. An
//! overflow vetoes the mutation: the caller rolls the tag store back and shows the
//! notice.

use egui::Vec2;

/// Outcome of comparing content size with box size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Everything fits
    None,
    /// A single row is wider than the box (usually one long text tag)
    Horizontal,
    /// The rows are taller than the box (too many tags)
    Vertical,
}

impl Overflow {
    /// Whether the mutation has to be reverted.
    pub fn is_overflow(self) -> bool {
        self != Overflow::None
    }

    /// User-facing explanation of the veto.
    pub fn notice(self) -> Option<&'static str> {
        match self {
            Overflow::None => None,
            Overflow::Horizontal => Some("This tag is too long to fit on the canvas."),
            Overflow::Vertical => Some("Too many tags: the canvas is full."),
        }
    }
}

/// Classifies `content` against `bounds`. Vertical overflow wins over horizontal.
pub fn classify(content: Vec2, bounds: Vec2) -> Overflow {
    // Sub-pixel rounding from text measurement is not an overflow.
    const EPSILON: f32 = 0.5;
    if content.y > bounds.y + EPSILON {
        Overflow::Vertical
    } else if content.x > bounds.x + EPSILON {
        Overflow::Horizontal
    } else {
        Overflow::None
    }
}

/// Defers the overflow check until layout for the mutated list has been computed.
///
/// The guard is armed with the frame in which the mutation happened and only resolves
/// on a later frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverflowGuard {
    armed_at: Option<u64>,
}

impl OverflowGuard {
    /// Creates a disarmed guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a check after the mutation made during `frame`.
    pub fn arm(&mut self, frame: u64) {
        self.armed_at = Some(frame);
    }

    /// Whether a check is pending.
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Drops a pending check, e.g. when the layout mode no longer measures overflow.
    pub fn disarm(&mut self) {
        self.armed_at = None;
    }

    /// Runs the pending check with the measurement from `frame`.
    ///
    /// Returns `None` when nothing is pending or the measurement is from the same frame
    /// as the mutation; otherwise disarms and returns the classification.
    pub fn check(&mut self, frame: u64, content: Vec2, bounds: Vec2) -> Option<Overflow> {
        let armed_at = self.armed_at?;
        if frame <= armed_at {
            return None;
        }
        self.armed_at = None;
        Some(classify(content, bounds))
    }
}
