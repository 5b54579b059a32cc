#![forbid(unsafe_code)]

//! Content tree and drag-and-drop docking engine.
//!
//! # Role in the workspace
//! `dock-layout` owns the layout tree of a panel-docking manager: a root
//! holding rows, columns, and tabbed stacks of host components. It validates
//! and applies every structural mutation, solves rectangles for the displayed
//! nodes, classifies pointer positions into drop zones, and turns a finished
//! drag into the matching tree surgery.
//!
//! Rendering, gesture detection, and persistence belong to the host. The
//! engine consumes [`dock_core::DragInput`] events and publishes
//! [`LayoutEvent`]s to subscribers once each mutation has fully settled.
//!
//! # Example
//!
//! ```
//! use dock_core::{Area, LayoutConfig};
//! use dock_layout::{ItemConfig, LayoutTree};
//!
//! let mut tree = LayoutTree::from_config(
//!     LayoutConfig::default(),
//!     &[ItemConfig::row(vec![
//!         ItemConfig::component("editor"),
//!         ItemConfig::component("terminal"),
//!     ])],
//! )
//! .unwrap();
//! tree.set_container_area(Area::new(0, 0, 805, 600));
//!
//! let row = tree.children(tree.root())[0];
//! let left = tree.children(row)[0];
//! assert_eq!(tree.get_area(left), Some(Area::new(0, 0, 400, 600)));
//! ```

pub mod docking;
pub mod drop_zone;
pub mod error;
pub mod factory;
pub mod header;
pub mod layout;
pub mod node;
pub mod notify;
mod row_column;
mod stack;
pub mod tab_strip;
pub mod tree;

pub use docking::{
    DockingController, DragEffect, DragNoopReason, DragPhase, DragSession, DragTransition,
    DropHighlight, DropTarget,
};
pub use drop_zone::{
    DropSegment, DropZone, HeaderInsertion, Placeholder, RootEdge, StackZoneInput, classify,
    header_insertion, stack_drop_zones,
};
pub use error::{DockRejection, DragRejection, LayoutError, LayoutResult};
pub use factory::ItemConfig;
pub use header::HeaderConfig;
pub use layout::NodeGeometry;
pub use node::{
    Axis, ComponentState, ContentKind, ContentNode, DockRecord, LinearState, NodeId, NodeType,
    SizeHint, StackState,
};
pub use notify::{LayoutEvent, LayoutEventKind, Scope, SubscriptionId};
pub use tab_strip::{Tab, TabSpan, TabStrip};
pub use tree::LayoutTree;
