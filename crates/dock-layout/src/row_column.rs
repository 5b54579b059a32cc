//! Row/column behaviour: percentage sizing, docking, and splitter drags.
//!
//! Children of a row (horizontal) or column (vertical) share the container's
//! extent by percentage hints along its axis. Hints are renormalized whenever
//! the child set changes:
//!
//! * a total of 100 is left alone,
//! * a total below 100 is topped up by sharing the remainder among children
//!   without a hint,
//! * anything else gives hintless children 50 and scales all hints so they
//!   sum to 100.
//!
//! At most one child is docked at a time: its hint drops to 0, the solver
//! gives it exactly the header thickness, and its former share is remembered
//! for the undock.

use dock_core::HeaderSide;
use tracing::debug;

use crate::error::{DockRejection, LayoutError, LayoutResult};
use crate::node::{Axis, ContentKind, ContentNode, DockRecord, LinearState, NodeId, SizeHint};
use crate::notify::LayoutEventKind;
use crate::tree::{LayoutTree, Sizing};

impl LayoutTree {
    pub(crate) fn linear_kind(axis: Axis) -> ContentKind {
        match axis {
            Axis::Horizontal => ContentKind::Row(LinearState::default()),
            Axis::Vertical => ContentKind::Column(LinearState::default()),
        }
    }

    pub(crate) fn linear_attached(&mut self, container: NodeId, child: NodeId, sizing: Sizing) {
        if sizing == Sizing::Rescale {
            self.rescale_for_newcomer(container, child);
        }
        self.validate_docking(container);
    }

    /// The newcomer gets `100 / n`; siblings shrink by `(100 - new) / 100`.
    fn rescale_for_newcomer(&mut self, container: NodeId, child: NodeId) {
        let Some((axis, siblings)) = self.linear_children(container) else {
            return;
        };
        let share = 100.0 / siblings.len() as f64;
        let factor = (100.0 - share) / 100.0;
        for id in &siblings {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if *id == child {
                node.size.set_along(axis, share);
            } else if let Some(current) = node.size.along(axis) {
                node.size.set_along(axis, current * factor);
            }
        }
        self.normalize_relative_sizes(container);
    }

    /// Share the removed child's hint equally among undocked survivors.
    pub(crate) fn linear_detached(&mut self, container: NodeId, child: NodeId, removed: SizeHint) {
        let was_docked = self
            .nodes
            .get(&container)
            .and_then(ContentNode::docked_child)
            == Some(child);
        if was_docked {
            let record = self
                .nodes
                .get_mut(&container)
                .and_then(ContentNode::as_linear_mut)
                .and_then(|linear| linear.docked.take());
            if let Some(record) = record {
                self.restore_header_side(child, record);
            }
        }
        let Some((axis, siblings)) = self.linear_children(container) else {
            return;
        };
        let docked = self.nodes.get(&container).and_then(ContentNode::docked_child);
        let undocked: Vec<NodeId> = siblings
            .iter()
            .copied()
            .filter(|id| Some(*id) != docked)
            .collect();

        if let Some(docked) = docked.filter(|_| undocked.is_empty()) {
            self.undock(container, docked, axis);
        } else if !undocked.is_empty() {
            let bonus = removed.along(axis).unwrap_or(0.0) / undocked.len() as f64;
            for id in &undocked {
                if let Some(node) = self.nodes.get_mut(id) {
                    let current = node.size.along(axis).unwrap_or(0.0);
                    node.size.set_along(axis, current + bonus);
                }
            }
        }
        self.validate_docking(container);
    }

    pub(crate) fn linear_replaced(&mut self, container: NodeId, old: NodeId) {
        if let Some(linear) = self.nodes.get_mut(&container).and_then(ContentNode::as_linear_mut) {
            if linear.docked.is_some_and(|record| record.child == old) {
                linear.docked = None;
            }
        }
        self.validate_docking(container);
    }

    fn linear_children(&self, container: NodeId) -> Option<(Axis, Vec<NodeId>)> {
        let node = self.nodes.get(&container)?;
        Some((node.axis()?, node.children.clone()))
    }

    /// Renormalize child hints along the container axis.
    pub(crate) fn normalize_relative_sizes(&mut self, container: NodeId) {
        let Some((axis, children)) = self.linear_children(container) else {
            return;
        };
        if children.is_empty() {
            return;
        }
        let mut total = 0.0;
        let mut unset = Vec::new();
        for id in &children {
            match self.nodes.get(id).and_then(|node| node.size.along(axis)) {
                Some(value) => total += value,
                None => unset.push(*id),
            }
        }

        let set = |tree: &mut Self, id: NodeId, value: f64| {
            if let Some(node) = tree.nodes.get_mut(&id) {
                node.size.set_along(axis, value);
            }
        };

        if total.round() == 100.0 && unset.is_empty() {
            return;
        }
        if total.round() < 100.0 && !unset.is_empty() {
            let share = (100.0 - total) / unset.len() as f64;
            for id in unset {
                set(self, id, share);
            }
            return;
        }
        for id in unset {
            set(self, id, 50.0);
            total += 50.0;
        }
        if total <= 0.0 {
            let share = 100.0 / children.len() as f64;
            for id in children {
                set(self, id, share);
            }
            return;
        }
        for id in children {
            let current = self
                .nodes
                .get(&id)
                .and_then(|node| node.size.along(axis))
                .unwrap_or(0.0);
            set(self, id, current / total * 100.0);
        }
    }

    /// Refresh every stack child's `dockable` flag: a stack can use its dock
    /// button when it is docked or at least two undocked siblings exist.
    pub(crate) fn validate_docking(&mut self, container: NodeId) {
        let Some(node) = self.nodes.get(&container) else {
            return;
        };
        let docked = node.docked_child();
        let undocked = node.children.len() - usize::from(docked.is_some());
        let can_dock = undocked > 1;
        let children = node.children.clone();
        for id in children {
            let Some(state) = self.nodes.get_mut(&id).and_then(ContentNode::as_stack_mut) else {
                continue;
            };
            state.dockable = state.header.dock.is_some() && (docked == Some(id) || can_dock);
        }
    }

    /// Whether `node` is the docked child of its row/column.
    #[must_use]
    pub fn is_docked(&self, node: NodeId) -> bool {
        self.parent(node)
            .and_then(|parent| self.node(parent))
            .and_then(ContentNode::docked_child)
            == Some(node)
    }

    /// Whether `node`'s dock button is usable.
    #[must_use]
    pub fn is_dockable(&self, node: NodeId) -> bool {
        self.node(node)
            .and_then(ContentNode::as_stack)
            .is_some_and(|state| state.dockable())
    }

    /// Dock or undock the stack `node`. `mode` forces a state; `None` toggles.
    /// Requesting the current state is a no-op.
    pub fn dock(&mut self, node: NodeId, mode: Option<bool>) -> LayoutResult<()> {
        let reject = |reason| LayoutError::DockRejected { node, reason };
        let entry = self.get(node)?;
        let Some(state) = entry.as_stack() else {
            return Err(reject(DockRejection::NotAStack));
        };
        if state.header.dock.is_none() || state.header.show.is_none() {
            return Err(reject(DockRejection::HeaderDisallows));
        }
        let Some(parent) = entry.parent else {
            return Err(reject(DockRejection::ParentNotLinear));
        };
        let container = self.get(parent)?;
        let Some(axis) = container.axis() else {
            return Err(reject(DockRejection::ParentNotLinear));
        };
        let docked = container.docked_child();
        let is_docked = docked == Some(node);
        if mode == Some(is_docked) {
            return Ok(());
        }

        if is_docked {
            self.undock(parent, node, axis);
        } else {
            if docked.is_some() {
                return Err(reject(DockRejection::AlreadyDocked));
            }
            if container.children.len() < 2 {
                return Err(reject(DockRejection::LastUndocked));
            }
            let index = self.child_index(parent, node)?;
            self.dock_child(parent, node, index, axis);
        }
        self.validate_docking(parent);
        self.notifier.queue(
            node,
            LayoutEventKind::Docked {
                docked: !is_docked,
            },
        );
        self.notifier.queue(parent, LayoutEventKind::StateChanged);
        self.finish();
        Ok(())
    }

    fn dock_child(&mut self, container: NodeId, node: NodeId, index: usize, axis: Axis) {
        let side = match (axis, index) {
            (Axis::Horizontal, 0) => HeaderSide::Left,
            (Axis::Horizontal, _) => HeaderSide::Right,
            (Axis::Vertical, 0) => HeaderSide::Top,
            (Axis::Vertical, _) => HeaderSide::Bottom,
        };
        let header_height = self.config.dimensions.header_height;
        let extent = self.geometry.get(&node).map_or(0, |geometry| match axis {
            Axis::Horizontal => geometry.element.width(),
            Axis::Vertical => geometry.element.height(),
        });
        let Some(entry) = self.nodes.get_mut(&node) else {
            return;
        };
        let removed = entry.size.along(axis).unwrap_or(0.0);
        entry.size.set_along(axis, 0.0);
        let header_side = entry
            .as_stack_mut()
            .and_then(|state| state.header.show.replace(side));

        let siblings: Vec<NodeId> = self
            .nodes
            .get(&container)
            .map(|c| c.children.iter().copied().filter(|id| *id != node).collect())
            .unwrap_or_default();
        if !siblings.is_empty() {
            let bonus = removed / siblings.len() as f64;
            for id in &siblings {
                if let Some(sibling) = self.nodes.get_mut(id) {
                    let current = sibling.size.along(axis).unwrap_or(0.0);
                    sibling.size.set_along(axis, current + bonus);
                }
            }
        }
        if let Some(linear) = self.nodes.get_mut(&container).and_then(ContentNode::as_linear_mut) {
            linear.docked = Some(DockRecord {
                child: node,
                size: removed,
                real_size: (extent - header_height).max(0),
                header_side,
            });
        }
        debug!(
            target: "dock.dock",
            container = container.get(),
            node = node.get(),
            size = removed,
            "stack docked"
        );
    }

    fn undock(&mut self, container: NodeId, node: NodeId, axis: Axis) {
        let Some(record) = self
            .nodes
            .get_mut(&container)
            .and_then(ContentNode::as_linear_mut)
            .and_then(|linear| linear.docked.take())
        else {
            return;
        };
        self.restore_header_side(node, record);
        let restored = record.size;
        let factor = (100.0 - restored) / 100.0;
        let children = self
            .nodes
            .get(&container)
            .map(|c| c.children.clone())
            .unwrap_or_default();
        for id in children {
            let Some(entry) = self.nodes.get_mut(&id) else {
                continue;
            };
            if id == node {
                entry.size.set_along(axis, restored);
            } else {
                let current = entry.size.along(axis).unwrap_or(0.0);
                entry.size.set_along(axis, current * factor);
            }
        }
        if self.dock_hover == Some(node) {
            self.dock_hover = None;
        }
        debug!(
            target: "dock.dock",
            container = container.get(),
            node = node.get(),
            size = restored,
            "stack undocked"
        );
    }

    fn restore_header_side(&mut self, node: NodeId, record: DockRecord) {
        if let Some(state) = self.nodes.get_mut(&node).and_then(ContentNode::as_stack_mut) {
            state.header.show = record.header_side.or(state.header.show);
        }
    }

    /// Expand (or collapse back) a docked stack while the pointer hovers it.
    /// Only the solved geometry changes.
    pub fn set_dock_hover(&mut self, node: NodeId, hovered: bool) -> LayoutResult<()> {
        self.get(node)?;
        if !self.is_docked(node) {
            return Err(LayoutError::DockRejected {
                node,
                reason: DockRejection::NotDocked,
            });
        }
        let next = if hovered {
            Some(node)
        } else {
            self.dock_hover.filter(|current| *current != node)
        };
        if next != self.dock_hover {
            self.dock_hover = next;
            self.finish();
        }
        Ok(())
    }

    /// Drag splitter `splitter` of `container` (between its displayed
    /// children `splitter` and `splitter + 1`) by `offset` pixels along the
    /// axis. The move is clamped so neither side drops below the minimum item
    /// size; only the two neighbours' hints change.
    pub fn resize_split(
        &mut self,
        container: NodeId,
        splitter: usize,
        offset: i32,
    ) -> LayoutResult<()> {
        let node = self.get(container)?;
        let Some(axis) = node.axis() else {
            return Err(LayoutError::InvalidChild {
                parent: container,
                parent_type: node.node_type(),
                child: container,
                child_type: node.node_type(),
            });
        };
        let displayed: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|id| self.nodes.get(id).is_some_and(|child| child.displayed))
            .collect();
        let (Some(before), Some(after)) = (
            displayed.get(splitter).copied(),
            displayed.get(splitter + 1).copied(),
        ) else {
            return Err(LayoutError::InvalidIndex {
                parent: container,
                index: splitter,
                len: displayed.len().saturating_sub(1),
            });
        };
        if node.docked_child().is_some_and(|id| id == before || id == after) {
            return Err(LayoutError::SplitterLocked {
                container,
                splitter,
            });
        }

        let extent = |id: NodeId| {
            self.geometry.get(&id).map_or(0, |geometry| match axis {
                Axis::Horizontal => geometry.element.width(),
                Axis::Vertical => geometry.element.height(),
            })
        };
        let (size_before, size_after) = (extent(before), extent(after));
        let span = size_before + size_after;
        if span <= 0 {
            return Ok(());
        }
        let min = match axis {
            Axis::Horizontal => self.config.dimensions.min_item_width,
            Axis::Vertical => self.config.dimensions.min_item_height,
        };
        let lower = min - size_before;
        let upper = size_after - min;
        let offset = if lower > upper { 0 } else { offset.clamp(lower, upper) };

        let hint = |id: NodeId| {
            self.nodes
                .get(&id)
                .and_then(|n| n.size.along(axis))
                .unwrap_or(0.0)
        };
        let total = hint(before) + hint(after);
        let position = f64::from(size_before + offset) / f64::from(span);
        for (id, value) in [(before, position * total), (after, (1.0 - position) * total)] {
            if let Some(entry) = self.nodes.get_mut(&id) {
                entry.size.set_along(axis, value);
            }
        }
        debug!(
            target: "dock.tree",
            container = container.get(),
            splitter,
            offset,
            "splitter moved"
        );
        self.notifier.queue(container, LayoutEventKind::StateChanged);
        self.finish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dock_core::{Area, HeaderLabel, HeaderOverride, LayoutConfig};

    use super::*;
    use crate::factory::ItemConfig;

    fn dockable_config() -> LayoutConfig {
        let mut config = LayoutConfig::default();
        config.settings.show_dock_icon = true;
        config
    }

    fn row_of(config: LayoutConfig, widths: &[Option<f64>]) -> (LayoutTree, NodeId, Vec<NodeId>) {
        let content = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let item = ItemConfig::component(format!("c{i}"));
                match width {
                    Some(width) => item.with_width(*width),
                    None => item,
                }
            })
            .collect();
        let mut tree = LayoutTree::from_config(config, &[ItemConfig::row(content)])
            .expect("valid");
        tree.set_container_area(Area::new(0, 0, 1000, 500));
        let row = tree.children(tree.root())[0];
        let children = tree.children(row).to_vec();
        (tree, row, children)
    }

    fn widths(tree: &LayoutTree, ids: &[NodeId]) -> Vec<f64> {
        ids.iter()
            .map(|id| tree.node(*id).and_then(|n| n.size().width).unwrap_or(f64::NAN))
            .collect()
    }

    #[test]
    fn hintless_children_share_remainder() {
        let (tree, _, children) = row_of(LayoutConfig::default(), &[Some(40.0), None, None]);
        assert_eq!(widths(&tree, &children), vec![40.0, 30.0, 30.0]);
    }

    #[test]
    fn oversized_totals_are_scaled() {
        let (tree, _, children) = row_of(LayoutConfig::default(), &[Some(100.0), None]);
        let sizes = widths(&tree, &children);
        assert!((sizes[0] - 100.0 / 1.5).abs() < 1e-9);
        assert!((sizes[1] - 50.0 / 1.5).abs() < 1e-9);
    }

    #[test]
    fn added_child_takes_equal_share() {
        let (mut tree, row, children) = row_of(LayoutConfig::default(), &[None, None]);
        let added = tree
            .add_item(row, &ItemConfig::component("new"), None)
            .expect("add");
        let sizes = widths(&tree, &[children[0], children[1], added]);
        for size in sizes {
            assert!((size - 100.0 / 3.0).abs() < 1e-9, "got {size}");
        }
    }

    #[test]
    fn removed_share_is_redistributed() {
        let (mut tree, row, children) = row_of(LayoutConfig::default(), &[Some(20.0), Some(30.0), Some(50.0)]);
        tree.remove_child(row, children[2], false).expect("remove");
        assert_eq!(widths(&tree, &children[..2]), vec![45.0, 55.0]);
    }

    #[test]
    fn closable_row_with_one_child_is_unwrapped() {
        let (mut tree, row, children) = row_of(LayoutConfig::default(), &[Some(30.0), Some(70.0)]);
        tree.remove_child(row, children[0], false).expect("remove");
        assert!(tree.node(row).is_none());
        assert_eq!(tree.children(tree.root()), &[children[1]]);
        tree.validate().expect("valid");
    }

    #[test]
    fn dock_and_undock_restore_shares() {
        let (mut tree, row, children) = row_of(dockable_config(), &[Some(20.0), Some(40.0), Some(40.0)]);
        let first = children[0];
        assert!(tree.is_dockable(first));
        tree.dock(first, None).expect("dock");
        assert!(tree.is_docked(first));
        assert_eq!(widths(&tree, &children), vec![0.0, 50.0, 50.0]);
        let header = tree.node(first).and_then(ContentNode::as_stack).expect("stack").header().show;
        assert_eq!(header, Some(HeaderSide::Left));
        assert_eq!(tree.get_area(first).map(|a| a.width()), Some(20));

        tree.dock(first, Some(true)).expect("no-op");
        tree.dock(first, Some(false)).expect("undock");
        assert!(!tree.is_docked(first));
        assert_eq!(widths(&tree, &children), vec![20.0, 40.0, 40.0]);
        let header = tree.node(first).and_then(ContentNode::as_stack).expect("stack").header().show;
        assert_eq!(header, Some(HeaderSide::Top));
        assert_eq!(tree.node(row).and_then(ContentNode::docked_child), None);
    }

    #[test]
    fn dock_rejections() {
        let (mut tree, _, children) = row_of(dockable_config(), &[None, None]);
        tree.dock(children[1], Some(true)).expect("dock second");
        assert_eq!(
            tree.dock(children[0], Some(true)),
            Err(LayoutError::DockRejected {
                node: children[0],
                reason: DockRejection::AlreadyDocked
            })
        );
        let component = tree.children(children[0])[0];
        assert_eq!(
            tree.dock(component, None),
            Err(LayoutError::DockRejected {
                node: component,
                reason: DockRejection::NotAStack
            })
        );
        assert!(!tree.is_dockable(children[0]));
    }

    #[test]
    fn dock_requires_header_permission() {
        let (mut tree, _, children) = row_of(LayoutConfig::default(), &[None, None]);
        assert_eq!(
            tree.dock(children[0], None),
            Err(LayoutError::DockRejected {
                node: children[0],
                reason: DockRejection::HeaderDisallows
            })
        );
    }

    #[test]
    fn stack_header_can_opt_into_docking() {
        let header = HeaderOverride {
            dock: Some(HeaderLabel::Flag(true)),
            ..HeaderOverride::default()
        };
        let mut tree = LayoutTree::from_config(
            LayoutConfig::default(),
            &[ItemConfig::column(vec![
                ItemConfig::stack(vec![ItemConfig::component("a")]).with_header(header),
                ItemConfig::stack(vec![ItemConfig::component("b")]),
            ])],
        )
        .expect("valid");
        let column = tree.children(tree.root())[0];
        let top = tree.children(column)[0];
        tree.dock(top, None).expect("dock");
        let show = tree.node(top).and_then(ContentNode::as_stack).map(|s| s.header().show);
        assert_eq!(show, Some(Some(HeaderSide::Top)));
    }

    #[test]
    fn dock_hover_expands_geometry_only() {
        let (mut tree, _, children) = row_of(dockable_config(), &[Some(40.0), Some(60.0)]);
        let first = children[0];
        let before = tree.get_area(first).expect("visible").width();
        tree.dock(first, None).expect("dock");
        let sizes = widths(&tree, &children);
        tree.set_dock_hover(first, true).expect("hover");
        assert_eq!(tree.get_area(first).map(|a| a.width()), Some(before - 20));
        assert_eq!(widths(&tree, &children), sizes);
        tree.set_dock_hover(first, false).expect("leave");
        assert_eq!(tree.get_area(first).map(|a| a.width()), Some(20));
        assert!(tree.set_dock_hover(children[1], true).is_err());
    }

    #[test]
    fn splitter_moves_between_neighbours_and_clamps() {
        let (mut tree, row, children) = row_of(LayoutConfig::default(), &[Some(50.0), Some(50.0)]);
        // 1000 px minus one 5 px splitter: 498 + 497.
        assert_eq!(tree.get_area(children[0]).map(|a| a.width()), Some(498));
        tree.resize_split(row, 0, 100).expect("resize");
        let sizes = widths(&tree, &children);
        assert!((sizes[0] + sizes[1] - 100.0).abs() < 1e-9);
        assert!((sizes[0] - 598.0 / 995.0 * 100.0).abs() < 1e-9);

        tree.resize_split(row, 0, 10_000).expect("clamped");
        let sizes = widths(&tree, &children);
        let after_px = sizes[1] / (sizes[0] + sizes[1]) * 995.0;
        assert!((after_px - 10.0).abs() < 1e-6, "got {after_px}");
        assert!(matches!(
            tree.resize_split(row, 1, 5),
            Err(LayoutError::InvalidIndex { .. })
        ));
    }
}
