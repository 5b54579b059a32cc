#![forbid(unsafe_code)]

//! Drag-and-drop docking controller.
//!
//! One [`DockingController`] drives one drag gesture at a time through
//! `begin -> move* -> end | cancel`. The controller owns the transient
//! [`DragSession`]; nothing about an in-flight drag is stored on the nodes.
//!
//! # Lifecycle
//!
//! - **begin** soft-removes the dragged node (it stays attached, only
//!   undisplayed) so its source reflows as if it were gone.
//! - **move** recomputes the candidate areas from the current geometry,
//!   picks the smallest one under the pointer and classifies the pointer
//!   inside it.
//! - **end** redisplays the node and, when a target is highlighted, detaches
//!   the node from its source and commits it at the target. Without a target
//!   the node simply reappears where it was, with the source's previous
//!   active tab restored.
//! - **cancel** behaves like an end without a target.
//!
//! Every callback returns a [`DragTransition`] so hosts can repaint the
//! highlight and replay lifecycles deterministically.

use dock_core::{Area, DragInput, Point};
use tracing::{debug, debug_span, trace};

use crate::drop_zone::{
    DropSegment, Placeholder, RootEdge, StackZoneInput, classify, header_insertion,
    stack_drop_zones,
};
use crate::error::{DragRejection, LayoutError, LayoutResult};
use crate::node::{ContentNode, NodeId, NodeType};
use crate::tree::{LayoutTree, Sizing};

/// Where a drop would land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Stack {
        stack: NodeId,
        segment: DropSegment,
        /// Tab index among the stack's displayed tabs, header drops only.
        index: Option<usize>,
    },
    /// An edge strip of the root, or the whole root area (`edge: None`) when
    /// the root shows no content.
    Root { edge: Option<RootEdge> },
}

/// Current target plus the rectangle to paint for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropHighlight {
    pub target: DropTarget,
    /// `None` when the target has nothing to paint (pointer before every tab).
    pub area: Option<Area>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AreaOwner {
    Stack(NodeId),
    RootEdge(RootEdge),
    RootBody,
}

/// Candidate drop area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemArea {
    owner: AreaOwner,
    area: Area,
}

/// Transient state of the drag in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    node: NodeId,
    origin_parent: NodeId,
    origin_index: usize,
    /// Stacks whose selection moved when the node was hidden, with the child
    /// that was active before.
    reselected: Vec<(NodeId, NodeId)>,
    pointer: Point,
    highlight: Option<DropHighlight>,
}

impl DragSession {
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub const fn origin(&self) -> (NodeId, usize) {
        (self.origin_parent, self.origin_index)
    }

    /// Last pointer position, after clamping.
    #[must_use]
    pub const fn pointer(&self) -> Point {
        self.pointer
    }

    #[must_use]
    pub const fn highlight(&self) -> Option<DropHighlight> {
        self.highlight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging { node: NodeId },
}

/// Lifecycle events that were deliberately ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragNoopReason {
    /// The callback named a node other than the one being dragged.
    NodeMismatch { dragging: NodeId, requested: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    Started {
        node: NodeId,
        highlight: Option<DropHighlight>,
    },
    HighlightChanged {
        highlight: Option<DropHighlight>,
    },
    HighlightUnchanged,
    Dropped {
        node: NodeId,
        target: DropTarget,
    },
    /// The drag ended without a target; the node is back where it started.
    Restored {
        node: NodeId,
    },
    Ignored {
        reason: DragNoopReason,
    },
}

/// Result of one lifecycle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragPhase,
    pub to: DragPhase,
    pub effect: DragEffect,
}

#[derive(Debug, Default)]
pub struct DockingController {
    session: Option<DragSession>,
    transition_counter: u64,
}

impl DockingController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.session
            .as_ref()
            .map_or(DragPhase::Idle, |session| DragPhase::Dragging {
                node: session.node,
            })
    }

    /// Route one lifecycle input for `node`.
    pub fn handle(
        &mut self,
        tree: &mut LayoutTree,
        node: NodeId,
        input: DragInput,
    ) -> LayoutResult<DragTransition> {
        if let DragInput::Start { position } = input {
            return self.begin(tree, node, position);
        }
        if let Some(ignored) = self.ignore_foreign(node)? {
            return Ok(ignored);
        }
        match input {
            DragInput::Start { position } | DragInput::Move { position } => {
                self.highlight_drop_zone(tree, position)
            }
            DragInput::End { position } => self.end(tree, position),
            DragInput::Cancel => self.cancel(tree),
        }
    }

    fn ignore_foreign(&mut self, node: NodeId) -> LayoutResult<Option<DragTransition>> {
        let dragging = self
            .session
            .as_ref()
            .map(|session| session.node)
            .ok_or(LayoutError::NoActiveDrag)?;
        if dragging == node {
            return Ok(None);
        }
        let phase = self.phase();
        Ok(Some(self.transition(
            phase,
            phase,
            DragEffect::Ignored {
                reason: DragNoopReason::NodeMismatch {
                    dragging,
                    requested: node,
                },
            },
        )))
    }

    /// Start dragging `node`: validate, soft-remove it from its parent and
    /// resolve the first highlight.
    pub fn begin(
        &mut self,
        tree: &mut LayoutTree,
        node: NodeId,
        position: Point,
    ) -> LayoutResult<DragTransition> {
        let span = debug_span!(target: "dock.drag", "dock.drag", node = node.get(), phase = "start");
        let _guard = span.enter();

        if let Some(session) = &self.session {
            return Err(LayoutError::DragInProgress { node: session.node });
        }
        let entry = tree.get(node)?;
        let reject = |reason| Err(LayoutError::DragRejected { node, reason });
        if node == tree.root {
            return reject(DragRejection::Root);
        }
        let Some(parent) = entry.parent.filter(|_| tree.is_attached(node)) else {
            return reject(DragRejection::Detached);
        };
        if !entry.displayed {
            return reject(DragRejection::Hidden);
        }
        let item_allows = entry
            .as_component()
            .is_none_or(|component| component.reorder_enabled);
        if !tree.config.settings.reorder_enabled || !item_allows {
            return reject(DragRejection::ReorderDisabled);
        }

        let origin_index = tree.child_index(parent, node)?;
        tree.minimise_current();
        let reselected = tree.undisplay_inner(parent, node)?;
        tree.finish();

        let pointer = constrain(tree, position);
        let highlight = resolve(tree, node, pointer);
        debug!(
            target: "dock.drag",
            node = node.get(),
            parent = parent.get(),
            origin_index,
            "drag started"
        );
        self.session = Some(DragSession {
            node,
            origin_parent: parent,
            origin_index,
            reselected,
            pointer,
            highlight,
        });
        Ok(self.transition(
            DragPhase::Idle,
            DragPhase::Dragging { node },
            DragEffect::Started { node, highlight },
        ))
    }

    /// Re-classify the pointer and record the highlighted drop zone.
    pub fn highlight_drop_zone(
        &mut self,
        tree: &LayoutTree,
        position: Point,
    ) -> LayoutResult<DragTransition> {
        let session = self.session.as_mut().ok_or(LayoutError::NoActiveDrag)?;
        let node = session.node;
        let span = debug_span!(target: "dock.drag", "dock.drag", node = node.get(), phase = "move");
        let _guard = span.enter();

        session.pointer = constrain(tree, position);
        let highlight = resolve(tree, node, session.pointer);
        let effect = if highlight == session.highlight {
            DragEffect::HighlightUnchanged
        } else {
            trace!(
                target: "dock.drag",
                x = session.pointer.x,
                y = session.pointer.y,
                drop_target = ?highlight.map(|highlight| highlight.target),
                "drop zone changed"
            );
            session.highlight = highlight;
            DragEffect::HighlightChanged { highlight }
        };
        let phase = DragPhase::Dragging { node };
        Ok(self.transition(phase, phase, effect))
    }

    /// Release at `position`: commit onto the highlighted target, or put the
    /// node back when there is none. A rejected commit also puts it back.
    pub fn end(&mut self, tree: &mut LayoutTree, position: Point) -> LayoutResult<DragTransition> {
        let session = self.session.take().ok_or(LayoutError::NoActiveDrag)?;
        let node = session.node;
        let span = debug_span!(target: "dock.drag", "dock.drag", node = node.get(), phase = "end");
        let _guard = span.enter();

        let pointer = constrain(tree, position);
        let target = resolve(tree, node, pointer).map(|highlight| highlight.target);
        tree.redisplay(node);
        let from = DragPhase::Dragging { node };

        let Some(target) = target else {
            restore(tree, &session);
            tree.finish();
            debug!(target: "dock.drag", node = node.get(), "drag ended without target");
            return Ok(self.transition(from, DragPhase::Idle, DragEffect::Restored { node }));
        };
        if let Err(err) = commit(tree, &session, target) {
            restore(tree, &session);
            tree.finish();
            debug!(target: "dock.drag", node = node.get(), error = %err, "drop rejected");
            return Err(err);
        }
        tree.finish();
        debug!(
            target: "dock.drag",
            node = node.get(),
            drop_target = ?target,
            "drop committed"
        );
        Ok(self.transition(from, DragPhase::Idle, DragEffect::Dropped { node, target }))
    }

    /// Abort the drag and restore the node in place.
    pub fn cancel(&mut self, tree: &mut LayoutTree) -> LayoutResult<DragTransition> {
        let session = self.session.take().ok_or(LayoutError::NoActiveDrag)?;
        let node = session.node;
        let span = debug_span!(target: "dock.drag", "dock.drag", node = node.get(), phase = "cancel");
        let _guard = span.enter();

        tree.redisplay(node);
        restore(tree, &session);
        tree.finish();
        debug!(target: "dock.drag", node = node.get(), "drag cancelled");
        Ok(self.transition(
            DragPhase::Dragging { node },
            DragPhase::Idle,
            DragEffect::Restored { node },
        ))
    }

    fn transition(&mut self, from: DragPhase, to: DragPhase, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        DragTransition {
            transition_id: self.transition_counter,
            from,
            to,
            effect,
        }
    }
}

fn constrain(tree: &LayoutTree, position: Point) -> Point {
    if tree.config.settings.constrain_drag_to_container {
        tree.container.clamp(position)
    } else {
        position
    }
}

/// Candidate areas: every displayed stack outside the dragged subtree (its
/// element and, separately, its header strip), plus the root's edge strips or
/// its whole area when it shows nothing.
fn item_areas(tree: &LayoutTree, dragged: NodeId) -> Vec<ItemArea> {
    let mut areas = Vec::new();
    for id in tree.subtree(tree.root) {
        if tree.is_ancestor_or_self(dragged, id)
            || tree.nodes.get(&id).and_then(ContentNode::as_stack).is_none()
        {
            continue;
        }
        let Some(geometry) = tree.geometry.get(&id) else {
            continue;
        };
        let owner = AreaOwner::Stack(id);
        areas.push(ItemArea {
            owner,
            area: geometry.element,
        });
        if let Some(header) = geometry.header {
            areas.push(ItemArea {
                owner,
                area: header,
            });
        }
    }

    let shows_content = tree
        .children(tree.root)
        .iter()
        .any(|id| tree.nodes.get(id).is_some_and(|node| node.displayed));
    if shows_content {
        let thickness = tree.config.dimensions.root_edge_size;
        areas.extend(RootEdge::ALL.into_iter().map(|edge| ItemArea {
            owner: AreaOwner::RootEdge(edge),
            area: edge.strip(tree.container, thickness),
        }));
    } else {
        areas.push(ItemArea {
            owner: AreaOwner::RootBody,
            area: tree.container,
        });
    }
    areas
}

fn resolve(tree: &LayoutTree, dragged: NodeId, point: Point) -> Option<DropHighlight> {
    let owner = item_areas(tree, dragged)
        .into_iter()
        .filter(|candidate| candidate.area.contains(point))
        .min_by_key(|candidate| candidate.area.surface())?
        .owner;
    match owner {
        AreaOwner::Stack(stack) => resolve_stack(tree, stack, point),
        AreaOwner::RootEdge(edge) => Some(DropHighlight {
            target: DropTarget::Root { edge: Some(edge) },
            area: Some(edge.strip(tree.container, tree.config.dimensions.root_edge_size)),
        }),
        AreaOwner::RootBody => Some(DropHighlight {
            target: DropTarget::Root { edge: None },
            area: Some(tree.container),
        }),
    }
}

fn resolve_stack(tree: &LayoutTree, stack: NodeId, point: Point) -> Option<DropHighlight> {
    let node = tree.nodes.get(&stack)?;
    let state = node.as_stack()?;
    let geometry = tree.geometry.get(&stack)?;
    let displayed = |id: &NodeId| tree.nodes.get(id).filter(|child| child.displayed);
    let input = StackZoneInput {
        header: geometry.header,
        content: geometry.content,
        has_children: node.children.iter().any(|id| displayed(id).is_some()),
        active_is_container: state
            .active
            .and_then(|id| displayed(&id))
            .is_some_and(|child| child.node_type().is_linear()),
    };
    let zones = stack_drop_zones(&input);
    let zone = classify(&zones, point)?;

    if zone.segment != DropSegment::Header {
        return Some(DropHighlight {
            target: DropTarget::Stack {
                stack,
                segment: zone.segment,
                index: None,
            },
            area: Some(zone.highlight),
        });
    }
    let dims = &tree.config.dimensions;
    let side = state.header.show.unwrap_or_default();
    let spans = state.tabs.spans(zone.hover, side, dims.tab_width);
    let insertion = header_insertion(
        &spans,
        zone.hover,
        side,
        point,
        Placeholder {
            length: dims.tab_placeholder_width,
            thickness: dims.tab_placeholder_height,
        },
    );
    Some(DropHighlight {
        target: DropTarget::Stack {
            stack,
            segment: DropSegment::Header,
            index: insertion.index,
        },
        area: insertion.marker,
    })
}

/// Put the source stack's selection back to what it was before the drag.
fn restore(tree: &mut LayoutTree, session: &DragSession) {
    for &(stack, active) in session.reselected.iter().rev() {
        if tree.children(stack).contains(&active) {
            tree.set_active_inner(stack, active);
        }
    }
}

fn commit(tree: &mut LayoutTree, session: &DragSession, target: DropTarget) -> LayoutResult<()> {
    let node = session.node;
    let parent = tree.parent(node).ok_or(LayoutError::DragRejected {
        node,
        reason: DragRejection::Detached,
    })?;
    match target {
        DropTarget::Stack {
            stack,
            segment,
            index,
        } => {
            tree.check_stack_drop(stack, node, segment, None, false)?;
            let index = match segment {
                DropSegment::Header => header_slot(tree, stack, node, index),
                _ => None,
            };
            tree.detach_child(parent, node, true)?;
            tree.commit_stack_drop(stack, node, segment, index)
        }
        DropTarget::Root { edge } => {
            tree.detach_child(parent, node, true)?;
            tree.commit_root_drop(node, edge)
        }
    }
}

/// Map an index among the displayed tabs of `stack` to a child index once
/// `dragged` has left it.
fn header_slot(
    tree: &LayoutTree,
    stack: NodeId,
    dragged: NodeId,
    displayed_index: Option<usize>,
) -> Option<usize> {
    let displayed_index = displayed_index?;
    let remaining: Vec<NodeId> = tree
        .children(stack)
        .iter()
        .copied()
        .filter(|id| *id != dragged)
        .collect();
    let slot = remaining
        .iter()
        .enumerate()
        .filter(|(_, id)| tree.nodes.get(id).is_some_and(|node| node.displayed))
        .map(|(slot, _)| slot)
        .nth(displayed_index)
        .unwrap_or(remaining.len());
    Some(slot)
}

impl LayoutTree {
    /// Drop the detached `node` onto the root: into an empty root directly,
    /// or along one of its edges next to the current content.
    pub fn on_root_drop(&mut self, node: NodeId, edge: Option<RootEdge>) -> LayoutResult<()> {
        let entry = self.get(node)?;
        if let Some(parent) = entry.parent {
            return Err(LayoutError::AlreadyAttached { node, parent });
        }
        if entry.node_type() == NodeType::Root {
            return Err(LayoutError::CannotRemoveRoot { node });
        }
        self.commit_root_drop(node, edge)?;
        self.finish();
        Ok(())
    }

    /// A body drop onto a root that still holds hidden content is treated
    /// as a drop on its right edge.
    pub(crate) fn commit_root_drop(
        &mut self,
        node: NodeId,
        edge: Option<RootEdge>,
    ) -> LayoutResult<()> {
        let root = self.root;
        let Some(current) = self.get(root)?.children.first().copied() else {
            return self.insert_child(root, node, None, Sizing::Rescale).map(|_| ());
        };
        let (axis, insert_before) = edge.unwrap_or(RootEdge::Right).split();
        let dropped = match self.get(node)?.node_type() {
            NodeType::Component => self.wrap_in_stack(node)?,
            _ => node,
        };

        if self.get(current)?.axis() == Some(axis) {
            let children = self.children(current).to_vec();
            let (at, sibling) = if insert_before {
                (0, children.first().copied())
            } else {
                (children.len(), children.last().copied())
            };
            let share = match sibling {
                Some(sibling) => {
                    let fallback = 100.0 / children.len() as f64;
                    let entry = self.get_mut(sibling)?;
                    let half = entry.size.along(axis).unwrap_or(fallback) * 0.5;
                    entry.size.set_along(axis, half);
                    half
                }
                None => 100.0,
            };
            self.attach(current, dropped, at, Sizing::Suspended);
            if let Some(entry) = self.nodes.get_mut(&dropped) {
                entry.size.set_along(axis, share);
            }
            self.validate_docking(current);
        } else {
            let container = self.allocate(LayoutTree::linear_kind(axis))?;
            self.replace_child_inner(root, current, container)?;
            let order = if insert_before {
                [dropped, current]
            } else {
                [current, dropped]
            };
            for (slot, id) in order.into_iter().enumerate() {
                self.attach(container, id, slot, Sizing::Suspended);
                if let Some(entry) = self.nodes.get_mut(&id) {
                    entry.size.set_along(axis, 50.0);
                }
            }
            self.validate_docking(container);
        }
        debug!(
            target: "dock.tree",
            node = dropped.get(),
            edge = edge.map(RootEdge::as_str),
            "root drop committed"
        );
        Ok(())
    }
}
