//! Tab handles of a stack header.
//!
//! A stack keeps exactly one [`Tab`] per child, in child order. Tabs carry the
//! presentation state the drop-zone geometry needs: whether the tab is shown
//! and how long it is along the header.

use dock_core::{Area, HeaderSide};

use crate::node::NodeId;

/// Header handle bound to one stack child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    content: NodeId,
    active: bool,
    closable: bool,
    displayed: bool,
    extent: Option<i32>,
}

impl Tab {
    /// The child this tab represents.
    #[must_use]
    pub const fn content(&self) -> NodeId {
        self.content
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Mirrors the content's closability at tab creation.
    #[must_use]
    pub const fn is_closable(&self) -> bool {
        self.closable
    }

    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.displayed
    }

    /// Measured length along the header, if the host reported one.
    #[must_use]
    pub const fn extent(&self) -> Option<i32> {
        self.extent
    }
}

/// Span of a displayed tab along the header's primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSpan {
    pub content: NodeId,
    pub start: i32,
    pub end: i32,
}

impl TabSpan {
    #[must_use]
    pub const fn midpoint(&self) -> i32 {
        self.start + (self.end - self.start) / 2
    }
}

/// Ordered tabs of one stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStrip {
    tabs: Vec<Tab>,
}

impl TabStrip {
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    #[must_use]
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    #[must_use]
    pub fn tab(&self, content: NodeId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.content == content)
    }

    #[must_use]
    pub fn index_of(&self, content: NodeId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.content == content)
    }

    /// Insert a tab at `index`, appending when the index is past the end.
    pub(crate) fn create_tab(&mut self, content: NodeId, closable: bool, index: usize) {
        let tab = Tab {
            content,
            active: false,
            closable,
            displayed: true,
            extent: None,
        };
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, tab);
    }

    pub(crate) fn remove_tab(&mut self, content: NodeId) -> Option<Tab> {
        let index = self.index_of(content)?;
        Some(self.tabs.remove(index))
    }

    /// Mark `content` as the only active tab. `None` clears all marks.
    pub(crate) fn set_active(&mut self, content: Option<NodeId>) {
        for tab in &mut self.tabs {
            tab.active = Some(tab.content) == content;
        }
    }

    pub(crate) fn set_displayed(&mut self, content: NodeId, displayed: bool) {
        if let Some(tab) = self.tabs.iter_mut().find(|tab| tab.content == content) {
            tab.displayed = displayed;
        }
    }

    pub(crate) fn set_extent(&mut self, content: NodeId, extent: Option<i32>) -> bool {
        match self.tabs.iter_mut().find(|tab| tab.content == content) {
            Some(tab) => {
                tab.extent = extent.map(|value| value.max(0));
                true
            }
            None => false,
        }
    }

    /// Displayed tabs in order, laid out end to end from the header's start
    /// along its primary axis (x for top/bottom headers, y for sided ones).
    #[must_use]
    pub fn spans(&self, header: Area, side: HeaderSide, default_extent: i32) -> Vec<TabSpan> {
        let mut cursor = if side.is_sided() { header.y1 } else { header.x1 };
        self.tabs
            .iter()
            .filter(|tab| tab.displayed)
            .map(|tab| {
                let start = cursor;
                cursor = start.saturating_add(tab.extent.unwrap_or(default_extent));
                TabSpan {
                    content: tab.content,
                    start,
                    end: cursor,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw).expect("non-zero id")
    }

    #[test]
    fn create_tab_clamps_index() {
        let mut strip = TabStrip::default();
        strip.create_tab(id(1), true, 0);
        strip.create_tab(id(2), true, 9);
        strip.create_tab(id(3), false, 1);
        let order: Vec<_> = strip.tabs().iter().map(Tab::content).collect();
        assert_eq!(order, vec![id(1), id(3), id(2)]);
        assert!(!strip.tab(id(3)).expect("tab").is_closable());
    }

    #[test]
    fn single_active_mark() {
        let mut strip = TabStrip::default();
        strip.create_tab(id(1), true, 0);
        strip.create_tab(id(2), true, 1);
        strip.set_active(Some(id(2)));
        strip.set_active(Some(id(1)));
        let active: Vec<_> = strip.tabs().iter().filter(|t| t.is_active()).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].content(), id(1));
    }

    #[test]
    fn spans_skip_hidden_tabs_and_use_measured_extents() {
        let mut strip = TabStrip::default();
        for raw in 1..=3 {
            strip.create_tab(id(raw), true, usize::MAX);
        }
        strip.set_displayed(id(2), false);
        strip.set_extent(id(3), Some(40));
        let header = Area::new(10, 0, 400, 20);
        let spans = strip.spans(header, HeaderSide::Top, 100);
        assert_eq!(
            spans,
            vec![
                TabSpan {
                    content: id(1),
                    start: 10,
                    end: 110
                },
                TabSpan {
                    content: id(3),
                    start: 110,
                    end: 150
                },
            ]
        );
        assert_eq!(spans[0].midpoint(), 60);
    }

    #[test]
    fn sided_headers_lay_out_vertically() {
        let mut strip = TabStrip::default();
        strip.create_tab(id(1), true, 0);
        let spans = strip.spans(Area::new(0, 30, 20, 300), HeaderSide::Left, 100);
        assert_eq!(spans[0].start, 30);
        assert_eq!(spans[0].end, 130);
    }
}
