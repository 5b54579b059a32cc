//! Content-tree node model.
//!
//! Nodes live in an arena owned by [`crate::LayoutTree`], addressed by
//! [`NodeId`]. A node owns its ordered child ids; the parent link is a plain
//! back-reference id and is never used to keep anything alive.

use std::collections::BTreeMap;
use std::fmt;

use dock_core::{HeaderOverride, HeaderSide};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::header::HeaderConfig;
use crate::tab_strip::TabStrip;

/// Stable identifier for content nodes.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node ID.
    pub const MIN: Self = Self(1);

    /// Create a new node ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, LayoutError> {
        if raw == 0 {
            return Err(LayoutError::ZeroNodeId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, LayoutError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(LayoutError::NodeIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Root,
    Row,
    Column,
    Stack,
    Component,
}

impl NodeType {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Row => "row",
            Self::Column => "column",
            Self::Stack => "stack",
            Self::Component => "component",
        }
    }

    /// Rows and columns.
    #[must_use]
    pub const fn is_linear(self) -> bool {
        matches!(self, Self::Row | Self::Column)
    }
}

/// Layout axis of a row (horizontal) or column (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Container type that lays children out along this axis.
    #[must_use]
    pub const fn container_type(self) -> NodeType {
        match self {
            Self::Horizontal => NodeType::Row,
            Self::Vertical => NodeType::Column,
        }
    }
}

/// Percentage size hints relative to siblings in a row or column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SizeHint {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SizeHint {
    /// Hint along `axis`.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Set the hint along `axis`.
    pub fn set_along(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Horizontal => self.width = Some(value),
            Axis::Vertical => self.height = Some(value),
        }
    }
}

/// Leaf payload: the host's component identity and opaque state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentState {
    /// Host-registered component kind.
    pub component_name: String,
    pub title: String,
    /// Opaque host state bag.
    #[serde(default)]
    pub component_state: BTreeMap<String, String>,
    /// `false` pins the tab: it cannot be dragged.
    pub reorder_enabled: bool,
    /// Header layer contributed when this component seeds a stack.
    #[serde(default)]
    pub header: Option<HeaderOverride>,
}

/// Remembered state of a docked row/column child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockRecord {
    pub child: NodeId,
    /// Share the child had before docking, restored on undock.
    pub size: f64,
    /// Expanded extent in pixels, used while hovering the docked strip.
    pub real_size: i32,
    /// Header side before docking moved it to the container's edge.
    pub header_side: Option<HeaderSide>,
}

/// Row/column payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearState {
    pub docked: Option<DockRecord>,
}

/// Stack payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StackState {
    pub(crate) header: HeaderConfig,
    pub(crate) tabs: TabStrip,
    pub(crate) active: Option<NodeId>,
    pub(crate) closable: bool,
    pub(crate) dockable: bool,
}

impl StackState {
    pub(crate) fn new(header: HeaderConfig) -> Self {
        let closable = header.close.is_some();
        Self {
            header,
            tabs: TabStrip::default(),
            active: None,
            closable,
            dockable: false,
        }
    }

    /// Merged header descriptor.
    #[must_use]
    pub fn header(&self) -> &HeaderConfig {
        &self.header
    }

    /// Tab handles in child order.
    #[must_use]
    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    /// Active child, `None` iff the stack is empty.
    #[must_use]
    pub const fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Propagated closability: header close enabled and every child closable.
    #[must_use]
    pub const fn closable(&self) -> bool {
        self.closable
    }

    /// Whether the dock button is currently usable.
    #[must_use]
    pub const fn dockable(&self) -> bool {
        self.dockable
    }
}

/// Node payload variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentKind {
    Root,
    Row(LinearState),
    Column(LinearState),
    Stack(StackState),
    Component(ComponentState),
}

impl ContentKind {
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Root => NodeType::Root,
            Self::Row(_) => NodeType::Row,
            Self::Column(_) => NodeType::Column,
            Self::Stack(_) => NodeType::Stack,
            Self::Component(_) => NodeType::Component,
        }
    }
}

/// One element of the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) size: SizeHint,
    pub(crate) is_closable: bool,
    pub(crate) is_maximised: bool,
    pub(crate) displayed: bool,
    pub(crate) kind: ContentKind,
}

impl ContentNode {
    pub(crate) fn new(id: NodeId, kind: ContentKind) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            size: SizeHint::default(),
            is_closable: true,
            is_maximised: false,
            displayed: true,
            kind,
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Parent back-reference; `None` for the root and for detached nodes.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub const fn size(&self) -> SizeHint {
        self.size
    }

    /// Configured closability of this node itself.
    #[must_use]
    pub const fn is_closable(&self) -> bool {
        self.is_closable
    }

    #[must_use]
    pub const fn is_maximised(&self) -> bool {
        self.is_maximised
    }

    /// `false` while soft-removed (undisplayed) during a drag.
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.displayed
    }

    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    #[must_use]
    pub const fn kind(&self) -> &ContentKind {
        &self.kind
    }

    /// Axis for rows and columns.
    #[must_use]
    pub const fn axis(&self) -> Option<Axis> {
        match self.kind {
            ContentKind::Row(_) => Some(Axis::Horizontal),
            ContentKind::Column(_) => Some(Axis::Vertical),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_stack(&self) -> Option<&StackState> {
        match &self.kind {
            ContentKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub(crate) fn as_stack_mut(&mut self) -> Option<&mut StackState> {
        match &mut self.kind {
            ContentKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_component(&self) -> Option<&ComponentState> {
        match &self.kind {
            ContentKind::Component(component) => Some(component),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_linear(&self) -> Option<&LinearState> {
        match &self.kind {
            ContentKind::Row(linear) | ContentKind::Column(linear) => Some(linear),
            _ => None,
        }
    }

    pub(crate) fn as_linear_mut(&mut self) -> Option<&mut LinearState> {
        match &mut self.kind {
            ContentKind::Row(linear) | ContentKind::Column(linear) => Some(linear),
            _ => None,
        }
    }

    /// Docked child of a row/column, if any.
    #[must_use]
    pub fn docked_child(&self) -> Option<NodeId> {
        self.as_linear()
            .and_then(|linear| linear.docked)
            .map(|record| record.child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_id_is_rejected() {
        assert_eq!(NodeId::new(0), Err(LayoutError::ZeroNodeId));
        assert_eq!(NodeId::new(7).map(NodeId::get), Ok(7));
    }

    #[test]
    fn id_overflow_is_reported() {
        let last = NodeId::new(u64::MAX).expect("non-zero");
        assert_eq!(
            last.checked_next(),
            Err(LayoutError::NodeIdOverflow { current: last })
        );
    }

    #[test]
    fn size_hint_reads_and_writes_along_axis() {
        let mut hint = SizeHint::default();
        hint.set_along(Axis::Vertical, 40.0);
        assert_eq!(hint.along(Axis::Vertical), Some(40.0));
        assert_eq!(hint.along(Axis::Horizontal), None);
        assert_eq!(Axis::Vertical.container_type(), NodeType::Column);
    }
}
