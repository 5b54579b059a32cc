//! Stack behaviour: tab bookkeeping, selection, closability, and drop commit.

use tracing::debug;

use crate::drop_zone::DropSegment;
use crate::error::{LayoutError, LayoutResult};
use crate::header::HeaderConfig;
use crate::node::{ContentKind, ContentNode, NodeId, NodeType, StackState};
use crate::notify::LayoutEventKind;
use crate::tree::{LayoutTree, Sizing};

impl LayoutTree {
    /// Make `item` the visible child of `stack`. Re-selecting the active
    /// child is a no-op and emits nothing.
    pub fn set_active_content_item(&mut self, stack: NodeId, item: NodeId) -> LayoutResult<()> {
        self.expect_stack(stack)?;
        self.child_index(stack, item)?;
        if self.set_active_inner(stack, item) {
            self.finish();
        }
        Ok(())
    }

    /// Active child of `stack`, `None` for empty stacks and non-stacks.
    #[must_use]
    pub fn active_content_item(&self, stack: NodeId) -> Option<NodeId> {
        self.node(stack)
            .and_then(ContentNode::as_stack)
            .and_then(StackState::active)
    }

    /// Propagated closability of `stack`.
    #[must_use]
    pub fn is_stack_closable(&self, stack: NodeId) -> bool {
        self.node(stack)
            .and_then(ContentNode::as_stack)
            .is_some_and(StackState::closable)
    }

    /// Record the measured length of `item`'s tab along its header.
    pub fn set_tab_extent(&mut self, item: NodeId, extent: Option<i32>) -> LayoutResult<()> {
        let parent = self.get(item)?.parent.ok_or(LayoutError::NotAChild {
            parent: self.root,
            child: item,
        })?;
        let stack = self.expect_stack(parent)?;
        if let Some(state) = self.nodes.get_mut(&stack).and_then(ContentNode::as_stack_mut) {
            state.tabs.set_extent(item, extent);
        }
        Ok(())
    }

    pub(crate) fn expect_stack(&self, stack: NodeId) -> LayoutResult<NodeId> {
        let node = self.get(stack)?;
        if node.as_stack().is_some() {
            Ok(stack)
        } else {
            Err(LayoutError::InvalidChild {
                parent: stack,
                parent_type: node.node_type(),
                child: stack,
                child_type: NodeType::Stack,
            })
        }
    }

    /// Returns whether the active child changed.
    pub(crate) fn set_active_inner(&mut self, stack: NodeId, item: NodeId) -> bool {
        let Some(state) = self.nodes.get_mut(&stack).and_then(ContentNode::as_stack_mut) else {
            return false;
        };
        if state.active == Some(item) {
            return false;
        }
        let previous = state.active.replace(item);
        state.tabs.set_active(Some(item));
        debug!(
            target: "dock.stack",
            stack = stack.get(),
            previous = previous.map(NodeId::get),
            active = item.get(),
            "active content item changed"
        );
        self.notifier
            .queue(stack, LayoutEventKind::ActiveContentItemChanged { item });
        self.notifier.queue(stack, LayoutEventKind::StateChanged);
        true
    }

    pub(crate) fn stack_attached(
        &mut self,
        stack: NodeId,
        child: NodeId,
        index: usize,
        select: bool,
    ) {
        let closable = self.nodes.get(&child).is_some_and(|node| node.is_closable);
        if let Some(state) = self.nodes.get_mut(&stack).and_then(ContentNode::as_stack_mut) {
            state.tabs.create_tab(child, closable, index);
        }
        self.notifier
            .queue(stack, LayoutEventKind::TabCreated { item: child });
        if select {
            self.set_active_inner(stack, child);
        }
        self.validate_closability(stack);
    }

    pub(crate) fn stack_detached(&mut self, stack: NodeId, child: NodeId, index: usize) {
        let Some(node) = self.nodes.get_mut(&stack) else {
            return;
        };
        let next = node.children.get(index.saturating_sub(1)).copied();
        let Some(state) = node.as_stack_mut() else {
            return;
        };
        state.tabs.remove_tab(child);
        let was_active = state.active == Some(child);
        if was_active {
            state.active = None;
            state.tabs.set_active(None);
        }
        match next {
            Some(next) if was_active => {
                self.set_active_inner(stack, next);
            }
            None if was_active => {
                debug!(target: "dock.stack", stack = stack.get(), "stack emptied");
            }
            _ => {}
        }
        self.validate_closability(stack);
    }

    /// Soft removal: hide the tab and move selection to a displayed
    /// neighbour (the next one when `child` was first, else the previous).
    pub(crate) fn stack_undisplayed(&mut self, stack: NodeId, child: NodeId, index: usize) {
        let Some(node) = self.nodes.get(&stack) else {
            return;
        };
        let displayed = |id: &&NodeId| self.nodes.get(id).is_some_and(|n| n.displayed);
        let before = node.children[..index].iter().rev().find(displayed).copied();
        let after = node.children[index + 1..].iter().find(displayed).copied();
        let neighbour = if index == 0 { after } else { before.or(after) };
        let was_active = node.as_stack().is_some_and(|state| state.active == Some(child));

        if let Some(state) = self.nodes.get_mut(&stack).and_then(ContentNode::as_stack_mut) {
            state.tabs.set_displayed(child, false);
        }
        if was_active {
            if let Some(neighbour) = neighbour {
                self.set_active_inner(stack, neighbour);
            }
        }
    }

    pub(crate) fn stack_replaced(&mut self, stack: NodeId, index: usize, old: NodeId, new: NodeId) {
        let closable = self.nodes.get(&new).is_some_and(|node| node.is_closable);
        let Some(state) = self.nodes.get_mut(&stack).and_then(ContentNode::as_stack_mut) else {
            return;
        };
        state.tabs.remove_tab(old);
        state.tabs.create_tab(new, closable, index);
        let was_active = state.active == Some(old);
        self.notifier
            .queue(stack, LayoutEventKind::TabCreated { item: new });
        if was_active {
            self.set_active_inner(stack, new);
        }
        self.validate_closability(stack);
    }

    pub(crate) fn compute_closability(&self, stack: &ContentNode) -> bool {
        let header_allows = stack
            .as_stack()
            .is_some_and(|state| state.header.close.is_some());
        header_allows
            && stack
                .children
                .iter()
                .all(|id| self.nodes.get(id).is_some_and(|child| child.is_closable))
    }

    pub(crate) fn validate_closability(&mut self, stack: NodeId) {
        let Some(node) = self.nodes.get(&stack) else {
            return;
        };
        let closable = self.compute_closability(node);
        if let Some(state) = self.nodes.get_mut(&stack).and_then(ContentNode::as_stack_mut) {
            if state.closable != closable {
                debug!(
                    target: "dock.stack",
                    stack = stack.get(),
                    closable,
                    "stack closability changed"
                );
                state.closable = closable;
            }
        }
    }

    pub(crate) fn set_dockable(&mut self, stack: NodeId, dockable: bool) {
        if let Some(state) = self.nodes.get_mut(&stack).and_then(ContentNode::as_stack_mut) {
            state.dockable = dockable;
        }
    }

    /// Wrap the detached `node` in a new single-child stack. The stack takes
    /// the node's header layer and a copy of its size hint.
    pub(crate) fn wrap_in_stack(&mut self, node: NodeId) -> LayoutResult<NodeId> {
        let entry = self.get(node)?;
        let size = entry.size;
        let header_layer = entry
            .as_component()
            .and_then(|component| component.header.clone());
        let header = HeaderConfig::resolve(&self.config, None, header_layer.as_ref(), None);
        let stack = self.allocate(ContentKind::Stack(StackState::new(header)))?;
        if let Some(wrapper) = self.nodes.get_mut(&stack) {
            wrapper.size = size;
        }
        self.attach(stack, node, 0, Sizing::Rescale);
        debug!(
            target: "dock.tree",
            node = node.get(),
            stack = stack.get(),
            "node wrapped in stack"
        );
        Ok(stack)
    }

    /// Drop the detached `node` onto `stack` at `segment`.
    ///
    /// Header and body drops insert into the stack (a dropped stack is merged
    /// tab by tab). Side drops split: the node, wrapped in a stack unless it
    /// is one, becomes a sibling of `stack` in a row or column of matching
    /// orientation, created in place when the parent does not already match.
    pub fn on_drop(
        &mut self,
        stack: NodeId,
        node: NodeId,
        segment: DropSegment,
        index: Option<usize>,
    ) -> LayoutResult<()> {
        self.check_stack_drop(stack, node, segment, index, true)?;
        self.commit_stack_drop(stack, node, segment, index)?;
        self.finish();
        Ok(())
    }

    /// Where `detached` is false, `node` may still sit in its drag source;
    /// the checks then cover only what survives its removal.
    pub(crate) fn check_stack_drop(
        &self,
        stack: NodeId,
        node: NodeId,
        segment: DropSegment,
        index: Option<usize>,
        detached: bool,
    ) -> LayoutResult<()> {
        self.expect_stack(stack)?;
        let target = self.get(stack)?;
        let dropped = self.get(node)?;
        if detached {
            if let Some(parent) = dropped.parent {
                return Err(LayoutError::AlreadyAttached { node, parent });
            }
        }
        if dropped.node_type() == NodeType::Root || self.is_ancestor_or_self(node, stack) {
            return Err(LayoutError::InvalidChild {
                parent: stack,
                parent_type: NodeType::Stack,
                child: node,
                child_type: dropped.node_type(),
            });
        }
        match segment {
            DropSegment::Header => {
                if detached {
                    self.normalize_index(stack, index)?;
                }
                Ok(())
            }
            DropSegment::Body => Ok(()),
            DropSegment::Top | DropSegment::Right | DropSegment::Bottom | DropSegment::Left => {
                if target.parent.is_none() {
                    return Err(LayoutError::NotAChild {
                        parent: self.root,
                        child: stack,
                    });
                }
                Ok(())
            }
        }
    }

    pub(crate) fn commit_stack_drop(
        &mut self,
        stack: NodeId,
        node: NodeId,
        segment: DropSegment,
        index: Option<usize>,
    ) -> LayoutResult<()> {
        let index = match segment {
            DropSegment::Header => index,
            _ => None,
        };
        match segment.split() {
            None if self.get(node)?.node_type() == NodeType::Stack => {
                self.merge_stack(stack, node, index)
            }
            None => self.insert_child(stack, node, index, Sizing::Rescale).map(|_| ()),
            Some((axis, insert_before)) => {
                let dropped = match self.get(node)?.node_type() {
                    NodeType::Stack => node,
                    _ => self.wrap_in_stack(node)?,
                };
                let parent = self.get(stack)?.parent.ok_or(LayoutError::NotAChild {
                    parent: self.root,
                    child: stack,
                })?;

                if self.get(parent)?.axis() == Some(axis) {
                    let position = self.child_index(parent, stack)?;
                    let at = if insert_before { position } else { position + 1 };
                    let siblings = self.get(parent)?.children.len() as f64;
                    let current = self
                        .get(stack)?
                        .size
                        .along(axis)
                        .unwrap_or(100.0 / siblings);
                    let half = current * 0.5;
                    self.attach(parent, dropped, at, Sizing::Suspended);
                    for id in [stack, dropped] {
                        if let Some(entry) = self.nodes.get_mut(&id) {
                            entry.size.set_along(axis, half);
                        }
                    }
                    self.validate_docking(parent);
                } else {
                    let kind = LayoutTree::linear_kind(axis);
                    let container = self.allocate(kind)?;
                    self.replace_child_inner(parent, stack, container)?;
                    let order = if insert_before {
                        [dropped, stack]
                    } else {
                        [stack, dropped]
                    };
                    for (slot, id) in order.into_iter().enumerate() {
                        self.attach(container, id, slot, Sizing::Suspended);
                        if let Some(entry) = self.nodes.get_mut(&id) {
                            entry.size.set_along(axis, 50.0);
                        }
                    }
                    self.validate_docking(container);
                    debug!(
                        target: "dock.tree",
                        stack = stack.get(),
                        container = container.get(),
                        "stack split into new container"
                    );
                }
                Ok(())
            }
        }
    }

    /// Move every child of the detached stack `source` into `target`,
    /// preserving order, then destroy the emptied source.
    fn merge_stack(
        &mut self,
        target: NodeId,
        source: NodeId,
        index: Option<usize>,
    ) -> LayoutResult<()> {
        let mut at = self.normalize_index(target, index)?;
        let (children, source_active) = {
            let node = self.get(source)?;
            (
                node.children.clone(),
                node.as_stack().and_then(StackState::active),
            )
        };
        for child in children {
            self.detach_at(source, child, 0);
            self.attach(target, child, at, Sizing::Rescale);
            at += 1;
        }
        if let Some(active) = source_active {
            self.set_active_inner(target, active);
        }
        debug!(
            target: "dock.tree",
            source = source.get(),
            target = target.get(),
            "stacks merged"
        );
        self.destroy_subtree(source);
        Ok(())
    }
}
