//! Change notifications emitted by a [`Document`](super::Document).

use crate::types::StrokeId;

/// Emitted after each mutating document operation, so the rendering layer can
/// subscribe instead of polling.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// A finalized stroke was appended.
    StrokeAdded { id: StrokeId },
    /// The last live stroke moved to the undo-retained stack.
    Undone { id: StrokeId },
    /// A retained stroke was restored to the live sequence.
    Redone { id: StrokeId },
    /// Every live stroke moved to the undo-retained stack.
    Cleared { count: usize },
    /// One stroke was removed by id and retained for redo.
    StrokeRemoved { id: StrokeId },
    /// The whole document was replaced by a bulk import.
    Replaced { count: usize },
    /// Oldest strokes were dropped to stay within the stroke limit.
    Evicted { ids: Vec<StrokeId> },
}
