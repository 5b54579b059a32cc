#![forbid(unsafe_code)]

//! Layout mutation errors.

use std::fmt;

use crate::node::{NodeId, NodeType};

/// Result alias for tree mutations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Why a dock request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockRejection {
    /// Only stacks carry the header that docks.
    NotAStack,
    /// The merged header has docking disabled or no visible header.
    HeaderDisallows,
    /// The stack's parent is not a row or column.
    ParentNotLinear,
    /// Docking would leave the container without an undocked child.
    LastUndocked,
    /// Another sibling is already docked.
    AlreadyDocked,
    /// Hover expansion only applies to docked stacks.
    NotDocked,
}

impl DockRejection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAStack => "not_a_stack",
            Self::HeaderDisallows => "header_disallows",
            Self::ParentNotLinear => "parent_not_linear",
            Self::LastUndocked => "last_undocked",
            Self::AlreadyDocked => "already_docked",
            Self::NotDocked => "not_docked",
        }
    }
}

/// Why a drag could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRejection {
    /// The root never moves.
    Root,
    /// The node is not attached to the tree.
    Detached,
    /// Reordering is disabled globally or on the item.
    ReorderDisabled,
    /// The node is already undisplayed.
    Hidden,
}

impl DragRejection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Detached => "detached",
            Self::ReorderDisabled => "reorder_disabled",
            Self::Hidden => "hidden",
        }
    }
}

/// Errors produced by tree operations. A failed operation leaves the tree
/// exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    ZeroNodeId,
    NodeIdOverflow {
        current: NodeId,
    },
    UnknownNode {
        node: NodeId,
    },
    /// Insertion index past the end even after normalization.
    InvalidIndex {
        parent: NodeId,
        index: usize,
        len: usize,
    },
    NotAChild {
        parent: NodeId,
        child: NodeId,
    },
    /// A config fragment or stack state cannot be realized.
    ConfiguredStateInvalid {
        reason: String,
    },
    /// The node already has a parent.
    AlreadyAttached {
        node: NodeId,
        parent: NodeId,
    },
    /// Parent/child type combination is not allowed, or would form a cycle.
    InvalidChild {
        parent: NodeId,
        parent_type: NodeType,
        child: NodeId,
        child_type: NodeType,
    },
    CannotRemoveRoot {
        node: NodeId,
    },
    NotClosable {
        node: NodeId,
    },
    /// A splitter next to a docked child cannot be dragged.
    SplitterLocked {
        container: NodeId,
        splitter: usize,
    },
    DockRejected {
        node: NodeId,
        reason: DockRejection,
    },
    DragRejected {
        node: NodeId,
        reason: DragRejection,
    },
    NoActiveDrag,
    DragInProgress {
        node: NodeId,
    },
    /// Consistency check failure reported by [`crate::LayoutTree::validate`].
    InvariantViolated {
        node: NodeId,
        detail: String,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroNodeId => write!(f, "node id 0 is invalid"),
            Self::NodeIdOverflow { current } => {
                write!(f, "node id overflow after {current}")
            }
            Self::UnknownNode { node } => write!(f, "node {node} does not exist"),
            Self::InvalidIndex { parent, index, len } => write!(
                f,
                "index {index} out of range for node {parent} with {len} children"
            ),
            Self::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of node {parent}")
            }
            Self::ConfiguredStateInvalid { reason } => {
                write!(f, "configured state invalid: {reason}")
            }
            Self::AlreadyAttached { node, parent } => {
                write!(f, "node {node} is already attached to node {parent}")
            }
            Self::InvalidChild {
                parent,
                parent_type,
                child,
                child_type,
            } => write!(
                f,
                "{} node {child} cannot be a child of {} node {parent}",
                child_type.as_str(),
                parent_type.as_str()
            ),
            Self::CannotRemoveRoot { node } => write!(f, "root node {node} cannot be removed"),
            Self::NotClosable { node } => write!(f, "node {node} is not closable"),
            Self::SplitterLocked {
                container,
                splitter,
            } => write!(
                f,
                "splitter {splitter} of node {container} borders a docked child"
            ),
            Self::DockRejected { node, reason } => {
                write!(f, "dock rejected for node {node}: {}", reason.as_str())
            }
            Self::DragRejected { node, reason } => {
                write!(f, "drag rejected for node {node}: {}", reason.as_str())
            }
            Self::NoActiveDrag => write!(f, "no drag in progress"),
            Self::DragInProgress { node } => {
                write!(f, "a drag of node {node} is already in progress")
            }
            Self::InvariantViolated { node, detail } => {
                write!(f, "invariant violated at node {node}: {detail}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_nodes() {
        let parent = NodeId::new(4).expect("id");
        let child = NodeId::new(9).expect("id");
        let err = LayoutError::InvalidChild {
            parent,
            parent_type: NodeType::Stack,
            child,
            child_type: NodeType::Stack,
        };
        assert_eq!(err.to_string(), "stack node 9 cannot be a child of stack node 4");
    }

    #[test]
    fn rejection_reasons_are_stable() {
        let node = NodeId::MIN;
        let err = LayoutError::DockRejected {
            node,
            reason: DockRejection::LastUndocked,
        };
        assert_eq!(err.to_string(), "dock rejected for node 1: last_undocked");
    }
}
