#![forbid(unsafe_code)]

//! Size solver.
//!
//! A downward pass turns the container [`Area`] and the percentage hints into
//! concrete rectangles for every displayed node:
//!
//! - stacks split off a `header_height` strip on their header side and hand
//!   the rest to the active child only,
//! - rows/columns separate displayed children with `border_width` splitters,
//!   floor each child's share, and hand leftover pixels one by one to the
//!   leading children,
//! - a docked child takes exactly `header_height`, or its remembered size
//!   while hovered.
//!
//! With a maximised node, only its subtree is solved (against the whole
//! container); everything else reports no area.

use dock_core::{Area, HeaderSide};
use rustc_hash::FxHashMap;

use crate::node::{Axis, ContentKind, ContentNode, NodeId};
use crate::notify::LayoutEventKind;
use crate::tree::LayoutTree;

/// Solved rectangles of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeGeometry {
    /// Whole node.
    pub element: Area,
    /// Header strip of a stack with a visible header.
    pub header: Option<Area>,
    /// Area handed to children (stack content below the header).
    pub content: Area,
}

impl LayoutTree {
    /// Set the area the layout fills and re-solve.
    pub fn set_container_area(&mut self, area: Area) {
        self.container = area;
        self.finish();
    }

    #[must_use]
    pub const fn container_area(&self) -> Area {
        self.container
    }

    /// Element rectangle of `node`; `None` while hidden, inactive, detached,
    /// or outside the maximised subtree.
    #[must_use]
    pub fn get_area(&self, node: NodeId) -> Option<Area> {
        self.geometry.get(&node).map(|geometry| geometry.element)
    }

    #[must_use]
    pub fn geometry(&self, node: NodeId) -> Option<&NodeGeometry> {
        self.geometry.get(&node)
    }

    /// Re-solve every rectangle and queue `Resize` for nodes whose element
    /// changed or newly became visible.
    pub(crate) fn relayout(&mut self) {
        let start = match self.maximised {
            Some(node) if self.is_attached(node) => node,
            _ => self.root,
        };
        let mut solved = FxHashMap::default();
        self.solve(start, self.container, &mut solved);

        let mut changed: Vec<NodeId> = solved
            .iter()
            .filter(|(id, geometry)| {
                self.geometry.get(id).map(|previous| previous.element) != Some(geometry.element)
            })
            .map(|(id, _)| *id)
            .collect();
        changed.sort_unstable();
        for id in changed {
            self.notifier.queue(id, LayoutEventKind::Resize);
        }
        self.geometry = solved;
    }

    fn solve(&self, id: NodeId, element: Area, out: &mut FxHashMap<NodeId, NodeGeometry>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.displayed {
            return;
        }
        match &node.kind {
            ContentKind::Root => {
                out.insert(id, plain(element));
                for child in &node.children {
                    self.solve(*child, element, out);
                }
            }
            ContentKind::Component(_) => {
                out.insert(id, plain(element));
            }
            ContentKind::Stack(stack) => {
                let height = self.config.dimensions.header_height;
                let (header, content) = match stack.header.show {
                    Some(HeaderSide::Top) => split(element.split_top(height)),
                    Some(HeaderSide::Bottom) => split(element.split_bottom(height)),
                    Some(HeaderSide::Left) => split(element.split_left(height)),
                    Some(HeaderSide::Right) => split(element.split_right(height)),
                    None => (None, element),
                };
                out.insert(
                    id,
                    NodeGeometry {
                        element,
                        header,
                        content,
                    },
                );
                if let Some(active) = stack.active {
                    self.solve(active, content, out);
                }
            }
            ContentKind::Row(_) | ContentKind::Column(_) => {
                out.insert(id, plain(element));
                if let Some(axis) = node.axis() {
                    self.solve_linear(node, axis, element, out);
                }
            }
        }
    }

    fn solve_linear(
        &self,
        node: &ContentNode,
        axis: Axis,
        element: Area,
        out: &mut FxHashMap<NodeId, NodeGeometry>,
    ) {
        let displayed: Vec<&ContentNode> = node
            .children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|child| child.displayed)
            .collect();
        if displayed.is_empty() {
            return;
        }
        let dims = &self.config.dimensions;
        let extent = match axis {
            Axis::Horizontal => element.width(),
            Axis::Vertical => element.height(),
        };
        let gaps = i32::try_from(displayed.len() - 1).unwrap_or(i32::MAX);
        let splitters = dims.border_width.saturating_mul(gaps);
        let available = extent.saturating_sub(splitters).max(0);

        let docked = node.as_linear().and_then(|linear| linear.docked);
        let mut sizes = vec![0i32; displayed.len()];
        let mut fixed = 0i32;
        for (slot, child) in displayed.iter().enumerate() {
            if let Some(record) = docked.filter(|record| record.child == child.id) {
                let wanted = if self.dock_hover == Some(child.id) {
                    record.real_size.max(dims.header_height)
                } else {
                    dims.header_height
                };
                let size = wanted.min(available - fixed).max(0);
                sizes[slot] = size;
                fixed += size;
            }
        }

        let flexible: Vec<usize> = (0..displayed.len())
            .filter(|slot| docked.is_none_or(|record| record.child != displayed[*slot].id))
            .collect();
        let remaining = (available - fixed).max(0);
        let hint = |slot: usize| displayed[slot].size.along(axis).unwrap_or(0.0).max(0.0);
        let total: f64 = flexible.iter().map(|slot| hint(*slot)).sum();
        let mut assigned = 0i32;
        for slot in &flexible {
            let share = if total > 0.0 {
                hint(*slot) / total
            } else {
                1.0 / flexible.len() as f64
            };
            let size = (f64::from(remaining) * share).floor() as i32;
            sizes[*slot] = size;
            assigned += size;
        }
        let mut leftover = remaining - assigned;
        let mut cursor = 0usize;
        while leftover > 0 && !flexible.is_empty() {
            sizes[flexible[cursor % flexible.len()]] += 1;
            leftover -= 1;
            cursor += 1;
        }

        let mut offset = match axis {
            Axis::Horizontal => element.x1,
            Axis::Vertical => element.y1,
        };
        for (child, size) in displayed.iter().zip(sizes) {
            let area = match axis {
                Axis::Horizontal => Area::new(offset, element.y1, offset + size, element.y2),
                Axis::Vertical => Area::new(element.x1, offset, element.x2, offset + size),
            };
            self.solve(child.id, area, out);
            offset += size + dims.border_width;
        }
    }
}

const fn plain(element: Area) -> NodeGeometry {
    NodeGeometry {
        element,
        header: None,
        content: element,
    }
}

const fn split((strip, rest): (Area, Area)) -> (Option<Area>, Area) {
    (Some(strip), rest)
}
