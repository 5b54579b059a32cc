#![forbid(unsafe_code)]

//! Content tree arena and structural mutation primitives.
//!
//! [`LayoutTree`] owns every node in a `BTreeMap` keyed by [`NodeId`] and a
//! single [`ContentKind::Root`] node that holds at most one child. Each public
//! mutation validates everything it needs before touching a child sequence,
//! then commits, recomputes geometry, and only then flushes the notifications
//! it queued. A failed mutation leaves the tree exactly as it was.
//!
//! Nodes may exist detached (no parent) between creation and insertion, or
//! after a keep-alive removal; they are never attached to two parents.

use std::collections::BTreeMap;

use dock_core::{Area, LayoutConfig};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{LayoutError, LayoutResult};
use crate::layout::NodeGeometry;
use crate::node::{ContentKind, ContentNode, NodeId, NodeType, StackState};
use crate::notify::{LayoutEvent, LayoutEventKind, Notifier, Scope, SubscriptionId};

/// How a row/column redistributes hints when a child is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sizing {
    /// The newcomer gets `100 / n`, siblings are scaled down to make room.
    Rescale,
    /// Hints are left alone; the caller assigns them.
    Suspended,
    /// Like `Suspended`, and a stack parent does not select the newcomer.
    /// Used while building a fragment, which selects once at the end.
    Fragment,
}

/// Layout-wide content tree.
#[derive(Debug)]
pub struct LayoutTree {
    pub(crate) config: LayoutConfig,
    pub(crate) root: NodeId,
    pub(crate) next_id: u64,
    pub(crate) nodes: BTreeMap<NodeId, ContentNode>,
    pub(crate) container: Area,
    pub(crate) geometry: FxHashMap<NodeId, NodeGeometry>,
    pub(crate) maximised: Option<NodeId>,
    pub(crate) dock_hover: Option<NodeId>,
    pub(crate) notifier: Notifier,
}

impl LayoutTree {
    /// Empty layout: a root with no content.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        let root = NodeId::MIN;
        let mut root_node = ContentNode::new(root, ContentKind::Root);
        root_node.is_closable = false;
        let mut nodes = BTreeMap::new();
        nodes.insert(root, root_node);
        Self {
            config,
            root,
            next_id: root.get() + 1,
            nodes,
            container: Area::default(),
            geometry: FxHashMap::default(),
            maximised: None,
            dock_hover: None,
            notifier: Notifier::default(),
        }
    }

    /// Build a layout from the root's configured content (zero or one item).
    pub fn from_config(
        config: LayoutConfig,
        content: &[crate::factory::ItemConfig],
    ) -> LayoutResult<Self> {
        let mut tree = Self::new(config);
        match content {
            [] => {}
            [item] => {
                let root = tree.root;
                let node = tree.instantiate(item, Some(NodeType::Root))?;
                tree.insert_child(root, node, None, Sizing::Rescale)?;
            }
            _ => {
                return Err(LayoutError::ConfiguredStateInvalid {
                    reason: format!("root holds at most one item, got {}", content.len()),
                });
            }
        }
        tree.finish();
        Ok(tree)
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ContentNode> {
        self.nodes.get(&id)
    }

    /// All nodes, attached or detached, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &ContentNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of `id`; empty when `id` is unknown.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |node| node.children.as_slice())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    #[must_use]
    pub const fn maximised(&self) -> Option<NodeId> {
        self.maximised
    }

    /// Whether `node` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        let mut steps = 0usize;
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.parent(id);
        }
        false
    }

    /// `true` when `ancestor` is `node` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        let mut steps = 0usize;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.parent(id);
        }
        false
    }

    /// Pre-order ids of the subtree rooted at `id`.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Components registered under `component_name`, in id order.
    #[must_use]
    pub fn find_components(&self, component_name: &str) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| {
                node.as_component()
                    .is_some_and(|component| component.component_name == component_name)
            })
            .map(ContentNode::id)
            .collect()
    }

    pub(crate) fn get(&self, id: NodeId) -> LayoutResult<&ContentNode> {
        self.nodes
            .get(&id)
            .ok_or(LayoutError::UnknownNode { node: id })
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> LayoutResult<&mut ContentNode> {
        self.nodes
            .get_mut(&id)
            .ok_or(LayoutError::UnknownNode { node: id })
    }

    pub(crate) fn allocate(&mut self, kind: ContentKind) -> LayoutResult<NodeId> {
        let id = NodeId::new(self.next_id)?;
        self.next_id = id.checked_next()?.get();
        self.nodes.insert(id, ContentNode::new(id, kind));
        self.notifier.queue(id, LayoutEventKind::ItemCreated);
        Ok(id)
    }

    pub(crate) fn child_index(&self, parent: NodeId, child: NodeId) -> LayoutResult<usize> {
        self.get(parent)?
            .children
            .iter()
            .position(|id| *id == child)
            .ok_or(LayoutError::NotAChild { parent, child })
    }

    // --- subscriptions --------------------------------------------------

    /// Register an observer. Node-scoped observers are dropped when their
    /// node is destroyed.
    pub fn subscribe<F>(&mut self, scope: Scope, observer: F) -> SubscriptionId
    where
        F: FnMut(&LayoutEvent) + 'static,
    {
        self.notifier.subscribe(scope, Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Recompute geometry, then deliver queued notifications.
    pub(crate) fn finish(&mut self) {
        self.relayout();
        self.flush();
    }

    fn flush(&mut self) {
        for event in self.notifier.take_pending() {
            let path = self.delivery_path(&event);
            self.notifier.dispatch(&event, &path);
        }
        self.notifier.release_retired();
    }

    fn delivery_path(&self, event: &LayoutEvent) -> Vec<NodeId> {
        let mut path = vec![event.origin];
        if event.bubbles() {
            let mut current = self.parent(event.origin);
            while let Some(id) = current {
                if path.contains(&id) {
                    break;
                }
                path.push(id);
                current = self.parent(id);
            }
        }
        path
    }

    // --- insertion ------------------------------------------------------

    /// Insert a detached node under `parent`. Components added to anything
    /// but a stack are wrapped in a new stack first. Returns the id actually
    /// inserted (the wrapper when wrapping happened).
    pub fn add_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        index: Option<usize>,
    ) -> LayoutResult<NodeId> {
        let inserted = self.insert_child(parent, node, index, Sizing::Rescale)?;
        self.finish();
        Ok(inserted)
    }

    /// Create a node from `config` and insert it under `parent`.
    pub fn add_item(
        &mut self,
        parent: NodeId,
        config: &crate::factory::ItemConfig,
        index: Option<usize>,
    ) -> LayoutResult<NodeId> {
        let parent_type = self.get(parent)?.node_type();
        let node = self.instantiate(config, Some(parent_type))?;
        match self.insert_child(parent, node, index, Sizing::Rescale) {
            Ok(inserted) => {
                self.finish();
                Ok(inserted)
            }
            Err(err) => {
                self.discard(node);
                Err(err)
            }
        }
    }

    /// Throw away a freshly built detached subtree without notifying anyone.
    fn discard(&mut self, node: NodeId) {
        let doomed = self.subtree(node);
        for id in &doomed {
            self.nodes.remove(id);
        }
        let mut pending = self.notifier.take_pending();
        pending.retain(|event| !doomed.contains(&event.origin));
        for event in pending {
            self.notifier.queue(event.origin, event.kind);
        }
    }

    /// Validate an insertion; returns whether `node` must be wrapped.
    pub(crate) fn check_insert(&self, parent: NodeId, node: NodeId) -> LayoutResult<bool> {
        let parent_node = self.get(parent)?;
        let child = self.get(node)?;
        let invalid = || LayoutError::InvalidChild {
            parent,
            parent_type: parent_node.node_type(),
            child: node,
            child_type: child.node_type(),
        };
        if let Some(current) = child.parent {
            return Err(LayoutError::AlreadyAttached {
                node,
                parent: current,
            });
        }
        if child.node_type() == NodeType::Root || self.is_ancestor_or_self(node, parent) {
            return Err(invalid());
        }
        let is_component = child.node_type() == NodeType::Component;
        match parent_node.node_type() {
            NodeType::Root if !parent_node.children.is_empty() => Err(invalid()),
            NodeType::Root | NodeType::Row | NodeType::Column => Ok(is_component),
            NodeType::Stack if child.node_type() == NodeType::Stack => Err(invalid()),
            NodeType::Stack => Ok(false),
            NodeType::Component => Err(invalid()),
        }
    }

    /// Resolve an insertion index. An index past the end is pulled back by
    /// one before bounds checking.
    pub(crate) fn normalize_index(
        &self,
        parent: NodeId,
        index: Option<usize>,
    ) -> LayoutResult<usize> {
        let len = self.get(parent)?.children.len();
        let Some(requested) = index else {
            return Ok(len);
        };
        let mut normalized = requested;
        if normalized > len {
            normalized -= 1;
            warn!(
                target: "dock.tree",
                parent = parent.get(),
                requested,
                len,
                "insertion index past end, pulled back by one"
            );
        }
        if normalized > len {
            return Err(LayoutError::InvalidIndex {
                parent,
                index: requested,
                len,
            });
        }
        Ok(normalized)
    }

    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        index: Option<usize>,
        sizing: Sizing,
    ) -> LayoutResult<NodeId> {
        let wrap = self.check_insert(parent, node)?;
        let index = self.normalize_index(parent, index)?;
        let child = if wrap { self.wrap_in_stack(node)? } else { node };
        self.attach(parent, child, index, sizing);
        Ok(child)
    }

    /// Link a validated child in at `index`. Infallible by contract.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId, index: usize, sizing: Sizing) {
        let child_type = match self.nodes.get_mut(&child) {
            Some(node) => {
                node.parent = Some(parent);
                node.node_type()
            }
            None => return,
        };
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        let parent_type = parent_node.node_type();

        match parent_type {
            NodeType::Stack => {
                self.stack_attached(parent, child, index, sizing != Sizing::Fragment);
            }
            NodeType::Row | NodeType::Column => self.linear_attached(parent, child, sizing),
            NodeType::Root | NodeType::Component => {
                if child_type == NodeType::Stack {
                    self.set_dockable(child, false);
                }
            }
        }
        debug!(
            target: "dock.tree",
            parent = parent.get(),
            child = child.get(),
            index,
            "child added"
        );
        self.notifier.queue(parent, LayoutEventKind::StateChanged);
    }

    // --- removal --------------------------------------------------------

    /// Remove `child` from `parent`. Unless `keep_alive`, the removed subtree
    /// is destroyed. Closable containers left empty are removed in turn, and
    /// a closable row/column left with one child is replaced by that child.
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        keep_alive: bool,
    ) -> LayoutResult<()> {
        self.detach_child(parent, child, keep_alive)?;
        self.finish();
        Ok(())
    }

    pub(crate) fn detach_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        keep_alive: bool,
    ) -> LayoutResult<()> {
        if child == self.root {
            return Err(LayoutError::CannotRemoveRoot { node: child });
        }
        let index = self.child_index(parent, child)?;
        self.detach_at(parent, child, index);
        if !keep_alive {
            self.destroy_subtree(child);
        }
        self.collapse(parent)
    }

    /// Unlink `child` at `index` of `parent` with per-type bookkeeping.
    pub(crate) fn detach_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        if parent_node.children.get(index) != Some(&child) {
            return;
        }
        parent_node.children.remove(index);
        let parent_type = parent_node.node_type();
        let removed_size = match self.nodes.get_mut(&child) {
            Some(node) => {
                node.parent = None;
                node.size
            }
            None => return,
        };

        match parent_type {
            NodeType::Stack => self.stack_detached(parent, child, index),
            NodeType::Row | NodeType::Column => {
                self.linear_detached(parent, child, removed_size);
            }
            NodeType::Root | NodeType::Component => {}
        }
        self.release_maximise_within(child);
        if self.dock_hover == Some(child) {
            self.dock_hover = None;
        }
        debug!(
            target: "dock.tree",
            parent = parent.get(),
            child = child.get(),
            index,
            "child removed"
        );
        self.notifier.queue(parent, LayoutEventKind::StateChanged);
    }

    fn collapse(&mut self, container: NodeId) -> LayoutResult<()> {
        let Some(node) = self.nodes.get(&container) else {
            return Ok(());
        };
        if node.node_type() == NodeType::Root || !node.is_closable {
            return Ok(());
        }
        let Some(grandparent) = node.parent else {
            return Ok(());
        };
        match node.children.as_slice() {
            [] => self.detach_child(grandparent, container, false),
            [only] if node.node_type().is_linear() => {
                let only = *only;
                self.unwrap_single(grandparent, container, only)
            }
            _ => Ok(()),
        }
    }

    /// Replace `container` in `grandparent` by its only child.
    fn unwrap_single(
        &mut self,
        grandparent: NodeId,
        container: NodeId,
        only: NodeId,
    ) -> LayoutResult<()> {
        let index = self.child_index(grandparent, container)?;
        self.detach_at(container, only, 0);
        self.swap_in(grandparent, index, container, only);
        debug!(
            target: "dock.tree",
            container = container.get(),
            child = only.get(),
            "single-child container unwrapped"
        );
        self.destroy_subtree(container);
        Ok(())
    }

    // --- replacement ----------------------------------------------------

    /// Swap `old` for the detached `new` at the same index; `new` inherits
    /// `old`'s size hint. `old` is left detached and alive. Returns the id
    /// that took the slot (a wrapper when `new` had to be wrapped).
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> LayoutResult<NodeId> {
        let replacement = self.replace_child_inner(parent, old, new)?;
        self.finish();
        Ok(replacement)
    }

    pub(crate) fn replace_child_inner(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> LayoutResult<NodeId> {
        let index = self.child_index(parent, old)?;
        let parent_node = self.get(parent)?;
        let wrap = if parent_node.node_type() == NodeType::Root {
            let child = self.get(new)?;
            if let Some(current) = child.parent {
                return Err(LayoutError::AlreadyAttached {
                    node: new,
                    parent: current,
                });
            }
            if child.node_type() == NodeType::Root || self.is_ancestor_or_self(new, parent) {
                return Err(LayoutError::InvalidChild {
                    parent,
                    parent_type: NodeType::Root,
                    child: new,
                    child_type: child.node_type(),
                });
            }
            child.node_type() == NodeType::Component
        } else {
            self.check_insert(parent, new)?
        };
        let replacement = if wrap { self.wrap_in_stack(new)? } else { new };
        self.swap_in(parent, index, old, replacement);
        debug!(
            target: "dock.tree",
            parent = parent.get(),
            old = old.get(),
            new = replacement.get(),
            index,
            "child replaced"
        );
        Ok(replacement)
    }

    /// Put `new` where `old` sits at `index` of `parent`. Both validated.
    fn swap_in(&mut self, parent: NodeId, index: usize, old: NodeId, new: NodeId) {
        let size = match self.nodes.get_mut(&old) {
            Some(node) => {
                node.parent = None;
                node.size
            }
            None => return,
        };
        let new_type = match self.nodes.get_mut(&new) {
            Some(node) => {
                node.parent = Some(parent);
                node.size = size;
                node.node_type()
            }
            None => return,
        };
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        if let Some(slot) = parent_node.children.get_mut(index) {
            *slot = new;
        }
        match parent_node.node_type() {
            NodeType::Stack => self.stack_replaced(parent, index, old, new),
            NodeType::Row | NodeType::Column => self.linear_replaced(parent, old),
            NodeType::Root | NodeType::Component => {
                if new_type == NodeType::Stack {
                    self.set_dockable(new, false);
                }
            }
        }
        self.release_maximise_within(old);
        self.notifier.queue(parent, LayoutEventKind::StateChanged);
    }

    // --- soft removal ---------------------------------------------------

    /// Hide `child` without detaching it. A closable container whose
    /// children are all hidden is hidden in its own parent as well.
    pub fn undisplay_child(&mut self, parent: NodeId, child: NodeId) -> LayoutResult<()> {
        self.undisplay_inner(parent, child)?;
        self.finish();
        Ok(())
    }

    /// Returns `(stack, previous_active)` for every stack whose selection
    /// moved while hiding, innermost first.
    pub(crate) fn undisplay_inner(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> LayoutResult<Vec<(NodeId, NodeId)>> {
        let index = self.child_index(parent, child)?;
        let mut reselected = Vec::new();
        let mut current = (parent, child, index);
        loop {
            let (parent, child, index) = current;
            if let Some(node) = self.nodes.get_mut(&child) {
                node.displayed = false;
            }
            if let Some(previous) = self.get(parent)?.as_stack().map(StackState::active) {
                self.stack_undisplayed(parent, child, index);
                match previous {
                    Some(previous) if self.active_content_item(parent) != Some(previous) => {
                        reselected.push((parent, previous));
                    }
                    _ => {}
                }
            }
            debug!(
                target: "dock.tree",
                parent = parent.get(),
                child = child.get(),
                "child undisplayed"
            );

            let parent_node = self.get(parent)?;
            let all_hidden = parent_node.children.iter().all(|id| {
                self.nodes.get(id).is_none_or(|node| !node.displayed)
            });
            let propagate = all_hidden
                && parent_node.is_closable
                && parent_node.node_type() != NodeType::Root;
            match parent_node.parent {
                Some(grandparent) if propagate => {
                    let index = self.child_index(grandparent, parent)?;
                    current = (grandparent, parent, index);
                }
                _ => return Ok(reselected),
            }
        }
    }

    /// Undo [`Self::undisplay_inner`] for `node` and every ancestor it hid.
    pub(crate) fn redisplay(&mut self, node: NodeId) {
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(entry) = self.nodes.get_mut(&id) else {
                break;
            };
            entry.displayed = true;
            let parent = entry.parent;
            if let Some(stack) = parent
                .and_then(|p| self.nodes.get_mut(&p))
                .and_then(ContentNode::as_stack_mut)
            {
                stack.tabs.set_displayed(id, true);
            }
            current = parent.filter(|p| self.nodes.get(p).is_some_and(|n| !n.displayed));
        }
    }

    // --- destruction ----------------------------------------------------

    /// Destroy `node` and its subtree, detaching it first when attached.
    pub fn destroy(&mut self, node: NodeId) -> LayoutResult<()> {
        if node == self.root {
            return Err(LayoutError::CannotRemoveRoot { node });
        }
        match self.get(node)?.parent {
            Some(parent) => self.detach_child(parent, node, false)?,
            None => self.destroy_subtree(node),
        }
        self.finish();
        Ok(())
    }

    /// Children are destroyed before their parent.
    pub(crate) fn destroy_subtree(&mut self, node: NodeId) {
        let doomed = self.subtree(node);
        for id in doomed.into_iter().rev() {
            if self.nodes.remove(&id).is_none() {
                continue;
            }
            self.geometry.remove(&id);
            if self.maximised == Some(id) {
                self.maximised = None;
            }
            if self.dock_hover == Some(id) {
                self.dock_hover = None;
            }
            self.notifier.queue(id, LayoutEventKind::ItemDestroyed);
            self.notifier.retire(id);
            debug!(target: "dock.tree", node = id.get(), "node destroyed");
        }
    }

    /// Remove `node` if it is closable: components and containers by their
    /// own flag, stacks additionally by propagated closability.
    pub fn close(&mut self, node: NodeId) -> LayoutResult<()> {
        if node == self.root {
            return Err(LayoutError::CannotRemoveRoot { node });
        }
        let entry = self.get(node)?;
        let closable = match entry.as_stack() {
            Some(stack) => stack.closable && entry.is_closable,
            None => entry.is_closable,
        };
        if !closable {
            return Err(LayoutError::NotClosable { node });
        }
        self.destroy(node)
    }

    // --- maximise -------------------------------------------------------

    /// Maximise `node`, or restore it when it is already maximised. Returns
    /// whether `node` is maximised afterwards.
    pub fn toggle_maximise(&mut self, node: NodeId) -> LayoutResult<bool> {
        self.get(node)?;
        if node == self.root || !self.is_attached(node) {
            return Err(LayoutError::NotAChild {
                parent: self.root,
                child: node,
            });
        }
        let maximise = self.maximised != Some(node);
        self.minimise_current();
        if maximise {
            if let Some(entry) = self.nodes.get_mut(&node) {
                entry.is_maximised = true;
            }
            self.maximised = Some(node);
            debug!(target: "dock.dock", node = node.get(), "node maximised");
            self.notifier.queue(node, LayoutEventKind::Maximised);
            self.notifier.queue(node, LayoutEventKind::StateChanged);
        }
        self.finish();
        Ok(maximise)
    }

    pub(crate) fn minimise_current(&mut self) {
        let Some(node) = self.maximised.take() else {
            return;
        };
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.is_maximised = false;
        }
        debug!(target: "dock.dock", node = node.get(), "node minimised");
        self.notifier.queue(node, LayoutEventKind::Minimised);
        self.notifier.queue(node, LayoutEventKind::StateChanged);
    }

    fn release_maximise_within(&mut self, subtree: NodeId) {
        if self
            .maximised
            .is_some_and(|node| self.is_ancestor_or_self(subtree, node))
        {
            self.minimise_current();
        }
    }

    // --- consistency ----------------------------------------------------

    /// Check the structural invariants of the whole arena.
    pub fn validate(&self) -> LayoutResult<()> {
        let violation = |node: NodeId, detail: String| LayoutError::InvariantViolated { node, detail };
        let root = self.get(self.root)?;
        if root.node_type() != NodeType::Root || root.parent.is_some() {
            return Err(violation(self.root, "root must be an unparented root node".into()));
        }
        if root.children.len() > 1 {
            return Err(violation(self.root, "root holds more than one child".into()));
        }

        for node in self.nodes.values() {
            let id = node.id;
            if let Some(parent) = node.parent {
                let count = self
                    .nodes
                    .get(&parent)
                    .map_or(0, |p| p.children.iter().filter(|c| **c == id).count());
                if count != 1 {
                    return Err(violation(
                        id,
                        format!("appears {count} times in parent {parent}"),
                    ));
                }
            }
            for child in &node.children {
                let Some(child_node) = self.nodes.get(child) else {
                    return Err(violation(id, format!("missing child {child}")));
                };
                if child_node.parent != Some(id) {
                    return Err(violation(*child, format!("parent link does not point at {id}")));
                }
                let allowed = match node.node_type() {
                    NodeType::Root | NodeType::Row | NodeType::Column => matches!(
                        child_node.node_type(),
                        NodeType::Row | NodeType::Column | NodeType::Stack
                    ),
                    NodeType::Stack => matches!(
                        child_node.node_type(),
                        NodeType::Row | NodeType::Column | NodeType::Component
                    ),
                    NodeType::Component => false,
                };
                if !allowed {
                    return Err(violation(
                        *child,
                        format!(
                            "{} cannot be a child of {}",
                            child_node.node_type().as_str(),
                            node.node_type().as_str()
                        ),
                    ));
                }
            }
            if !self.is_ancestor_or_self(self.root, id) && self.parent_chain_loops(id) {
                return Err(violation(id, "parent chain forms a cycle".into()));
            }

            if let Some(stack) = node.as_stack() {
                let tab_order: Vec<NodeId> =
                    stack.tabs.tabs().iter().map(|tab| tab.content()).collect();
                if tab_order != node.children {
                    return Err(violation(id, "tab order differs from child order".into()));
                }
                match stack.active {
                    None if !node.children.is_empty() => {
                        return Err(violation(id, "non-empty stack without active child".into()));
                    }
                    Some(active) if !node.children.contains(&active) => {
                        return Err(violation(id, format!("active {active} is not a child")));
                    }
                    _ => {}
                }
                let marked = stack.tabs.tabs().iter().filter(|tab| tab.is_active()).count();
                if marked != usize::from(stack.active.is_some()) {
                    return Err(violation(id, format!("{marked} tabs marked active")));
                }
                if stack.closable != self.compute_closability(node) {
                    return Err(violation(id, "stale closability".into()));
                }
            }
            if let Some(docked) = node.docked_child() {
                if !node.children.contains(&docked) {
                    return Err(violation(id, format!("docked {docked} is not a child")));
                }
            }
            if node.is_maximised != (self.maximised == Some(id)) {
                return Err(violation(id, "maximise flag out of sync".into()));
            }
        }
        Ok(())
    }

    fn parent_chain_loops(&self, node: NodeId) -> bool {
        let mut seen = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if seen.contains(&id) {
                return true;
            }
            seen.push(id);
            current = self.parent(id);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::factory::ItemConfig;

    fn tree_with_stack(names: &[&str]) -> (LayoutTree, NodeId) {
        let content = names.iter().map(|name| ItemConfig::component(*name)).collect();
        let tree = LayoutTree::from_config(
            LayoutConfig::default(),
            &[ItemConfig::stack(content)],
        )
        .expect("valid layout");
        let stack = tree.children(tree.root())[0];
        (tree, stack)
    }

    #[test]
    fn empty_tree_validates() {
        let tree = LayoutTree::new(LayoutConfig::default());
        tree.validate().expect("valid");
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.node(tree.root()).expect("root").is_closable());
    }

    #[test]
    fn root_accepts_only_one_child() {
        let (mut tree, _) = tree_with_stack(&["a"]);
        let root = tree.root();
        let err = tree
            .add_item(root, &ItemConfig::stack(vec![]), None)
            .expect_err("second root child");
        assert!(matches!(err, LayoutError::InvalidChild { .. }));
        tree.validate().expect("unchanged");
    }

    #[test]
    fn invalid_index_leaves_tree_untouched() {
        let (mut tree, stack) = tree_with_stack(&["a", "b"]);
        let before = tree.children(stack).to_vec();
        let count = tree.node_count();
        let err = tree
            .add_item(stack, &ItemConfig::component("c"), Some(4))
            .expect_err("out of range");
        assert_eq!(
            err,
            LayoutError::InvalidIndex {
                parent: stack,
                index: 4,
                len: 2
            }
        );
        assert_eq!(tree.children(stack), before.as_slice());
        assert_eq!(tree.node_count(), count);
        tree.validate().expect("unchanged");
    }

    #[test]
    fn index_one_past_end_is_pulled_back() {
        let (mut tree, stack) = tree_with_stack(&["a", "b"]);
        let added = tree
            .add_item(stack, &ItemConfig::component("c"), Some(3))
            .expect("normalized");
        assert_eq!(tree.children(stack)[2], added);
    }

    #[test]
    fn never_attached_twice() {
        let (mut tree, stack) = tree_with_stack(&["a", "b"]);
        let first = tree.children(stack)[0];
        let err = tree.add_child(stack, first, None).expect_err("attached");
        assert_eq!(
            err,
            LayoutError::AlreadyAttached {
                node: first,
                parent: stack
            }
        );
    }

    #[test]
    fn remove_non_child_is_rejected() {
        let (mut tree, stack) = tree_with_stack(&["a"]);
        let root = tree.root();
        let component = tree.children(stack)[0];
        let err = tree
            .remove_child(root, component, false)
            .expect_err("not a child of root");
        assert_eq!(
            err,
            LayoutError::NotAChild {
                parent: root,
                child: component
            }
        );
    }

    #[test]
    fn removing_last_child_collapses_closable_stack() {
        let (mut tree, stack) = tree_with_stack(&["a"]);
        let component = tree.children(stack)[0];
        tree.remove_child(stack, component, false)
            .expect("remove");
        assert!(tree.node(stack).is_none());
        assert!(tree.node(component).is_none());
        assert!(tree.children(tree.root()).is_empty());
        tree.validate().expect("valid");
    }

    #[test]
    fn keep_alive_removal_leaves_detached_node() {
        let (mut tree, stack) = tree_with_stack(&["a", "b"]);
        let component = tree.children(stack)[0];
        tree.remove_child(stack, component, true).expect("remove");
        let detached = tree.node(component).expect("alive");
        assert_eq!(detached.parent(), None);
        assert!(!tree.is_attached(component));
        tree.validate().expect("valid");
    }

    #[test]
    fn replace_child_keeps_slot_and_size() {
        let mut tree = LayoutTree::from_config(
            LayoutConfig::default(),
            &[ItemConfig::row(vec![
                ItemConfig::component("a").with_width(30.0),
                ItemConfig::component("b").with_width(70.0),
            ])],
        )
        .expect("valid");
        let row = tree.children(tree.root())[0];
        let old = tree.children(row)[1];
        let replacement = tree
            .create_content_item(&ItemConfig::stack(vec![ItemConfig::component("c")]), None)
            .expect("detached stack");

        let slot = tree.replace_child(row, old, replacement).expect("replace");
        assert_eq!(slot, replacement);
        assert_eq!(tree.children(row)[1], replacement);
        let width = tree.node(replacement).expect("node").size().width;
        assert_eq!(width, Some(70.0));
        assert_eq!(tree.parent(old), None);
        tree.validate().expect("valid");
    }

    #[test]
    fn destroy_notifies_children_before_parent() {
        let (mut tree, stack) = tree_with_stack(&["a", "b"]);
        let children = tree.children(stack).to_vec();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        tree.subscribe(Scope::Global, move |event| {
            if event.kind == LayoutEventKind::ItemDestroyed {
                sink.borrow_mut().push(event.origin);
            }
        });
        tree.destroy(stack).expect("destroy");
        assert_eq!(*log.borrow(), vec![children[1], children[0], stack]);
    }

    #[test]
    fn node_scoped_observer_is_released_on_destroy() {
        let (mut tree, stack) = tree_with_stack(&["a", "b"]);
        let doomed = tree.children(stack)[0];
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        tree.subscribe(Scope::Node(doomed), move |event| {
            sink.borrow_mut().push(event.kind);
        });
        tree.remove_child(stack, doomed, false).expect("remove");
        assert_eq!(*seen.borrow(), vec![LayoutEventKind::ItemDestroyed]);
        assert_eq!(tree.notifier.subscription_count(), 0);
    }

    #[test]
    fn close_respects_closability() {
        let mut tree = LayoutTree::from_config(
            LayoutConfig::default(),
            &[ItemConfig::stack(vec![
                ItemConfig::component("pinned").closable(false),
                ItemConfig::component("loose"),
            ])],
        )
        .expect("valid");
        let stack = tree.children(tree.root())[0];
        let pinned = tree.children(stack)[0];
        let loose = tree.children(stack)[1];

        assert_eq!(tree.close(pinned), Err(LayoutError::NotClosable { node: pinned }));
        assert_eq!(tree.close(stack), Err(LayoutError::NotClosable { node: stack }));
        tree.close(loose).expect("closable component");
        assert_eq!(tree.children(stack), &[pinned]);
    }

    #[test]
    fn maximise_toggles_and_reports_state() {
        let (mut tree, stack) = tree_with_stack(&["a"]);
        assert!(tree.toggle_maximise(stack).expect("maximise"));
        assert_eq!(tree.maximised(), Some(stack));
        assert!(tree.node(stack).expect("stack").is_maximised());
        assert!(!tree.toggle_maximise(stack).expect("restore"));
        assert_eq!(tree.maximised(), None);
        tree.validate().expect("valid");
    }

    #[test]
    fn maximise_rejects_root_and_detached() {
        let (mut tree, _) = tree_with_stack(&["a"]);
        let root = tree.root();
        assert!(tree.toggle_maximise(root).is_err());
        let loose = tree
            .create_content_item(&ItemConfig::component("b"), None)
            .expect("detached");
        assert!(tree.toggle_maximise(loose).is_err());
    }
}
