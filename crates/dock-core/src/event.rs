#![forbid(unsafe_code)]

//! Drag lifecycle input.
//!
//! The pointer collaborator owns gesture detection (thresholds, touch
//! heuristics, capture). Once it has decided a drag is underway it feeds the
//! engine these already-interpreted lifecycle events.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// One step of an ongoing drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DragInput {
    /// The gesture crossed the host's drag threshold at `position`.
    Start { position: Point },
    /// The pointer moved while dragging.
    Move { position: Point },
    /// The pointer was released.
    End { position: Point },
    /// The host aborted the gesture (escape, blur, lost capture).
    Cancel,
}

impl DragInput {
    /// Pointer position carried by the event, if any.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            Self::Start { position } | Self::Move { position } | Self::End { position } => {
                Some(*position)
            }
            Self::Cancel => None,
        }
    }

    /// Stable phase name used in logs.
    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Move { .. } => "move",
            Self::End { .. } => "end",
            Self::Cancel => "cancel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_carries_no_position() {
        assert_eq!(DragInput::Cancel.position(), None);
        assert_eq!(
            DragInput::Move {
                position: Point::new(3, 4)
            }
            .position(),
            Some(Point::new(3, 4))
        );
    }

    #[test]
    fn serialized_shape_is_phase_tagged() {
        let json = serde_json::to_string(&DragInput::End {
            position: Point::new(1, 2),
        })
        .expect("serialize");
        assert_eq!(json, r#"{"phase":"end","position":{"x":1,"y":2}}"#);
    }
}
