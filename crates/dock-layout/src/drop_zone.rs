#![forbid(unsafe_code)]

//! Drop-zone geometry.
//!
//! Pure functions from rectangles and a pointer to a classified drop zone.
//! They know nothing about the tree; the docking controller feeds them the
//! solved geometry of each candidate stack.
//!
//! # Stack zones
//!
//! ```text
//! +-----------------------------+
//! |           header            |  <- always checked first
//! +-------+-------------+-------+
//! |       |     top     |       |
//! | left  +-------------+ right |
//! |       |   bottom    |       |
//! +-------+-------------+-------+
//! ```
//!
//! Hover bands are narrower than what gets highlighted: a side band covers
//! the outer quarter of the content, but the highlight is the full half on
//! the split axis.

use dock_core::{Area, HeaderSide, Point};

use crate::node::Axis;
use crate::tab_strip::TabSpan;

/// Classified region of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropSegment {
    Header,
    Body,
    Top,
    Right,
    Bottom,
    Left,
}

impl DropSegment {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    /// Split axis and whether the dropped item goes first, for side segments.
    #[must_use]
    pub const fn split(self) -> Option<(Axis, bool)> {
        match self {
            Self::Top => Some((Axis::Vertical, true)),
            Self::Bottom => Some((Axis::Vertical, false)),
            Self::Left => Some((Axis::Horizontal, true)),
            Self::Right => Some((Axis::Horizontal, false)),
            Self::Header | Self::Body => None,
        }
    }
}

/// One candidate zone: where it reacts and what gets painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropZone {
    pub segment: DropSegment,
    pub hover: Area,
    pub highlight: Area,
}

/// Geometry of a stack as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackZoneInput {
    /// Header strip, `None` when the header is hidden.
    pub header: Option<Area>,
    pub content: Area,
    /// Whether the stack has any displayed child.
    pub has_children: bool,
    /// Whether the active child is a row or column rather than a component.
    pub active_is_container: bool,
}

/// Zones of a stack in priority order: header, then top, right, bottom, left
/// (or body for an empty stack).
#[must_use]
pub fn stack_drop_zones(input: &StackZoneInput) -> Vec<DropZone> {
    let mut zones = Vec::with_capacity(5);
    if let Some(header) = input.header {
        zones.push(DropZone {
            segment: DropSegment::Header,
            hover: header,
            highlight: header,
        });
    }
    if input.active_is_container {
        return zones;
    }
    let c = input.content;
    if !input.has_children {
        zones.push(DropZone {
            segment: DropSegment::Body,
            hover: c,
            highlight: c,
        });
        return zones;
    }

    let quarter_w = c.width() / 4;
    let half_w = c.width() / 2;
    let half_h = c.height() / 2;
    zones.push(DropZone {
        segment: DropSegment::Top,
        hover: Area::new(c.x1 + quarter_w, c.y1, c.x2 - quarter_w, c.y1 + half_h),
        highlight: Area::new(c.x1, c.y1, c.x2, c.y1 + half_h),
    });
    zones.push(DropZone {
        segment: DropSegment::Right,
        hover: Area::new(c.x2 - quarter_w, c.y1, c.x2, c.y2),
        highlight: Area::new(c.x1 + half_w, c.y1, c.x2, c.y2),
    });
    zones.push(DropZone {
        segment: DropSegment::Bottom,
        hover: Area::new(c.x1 + quarter_w, c.y1 + half_h, c.x2 - quarter_w, c.y2),
        highlight: Area::new(c.x1, c.y1 + half_h, c.x2, c.y2),
    });
    zones.push(DropZone {
        segment: DropSegment::Left,
        hover: Area::new(c.x1, c.y1, c.x1 + quarter_w, c.y2),
        highlight: Area::new(c.x1, c.y1, c.x1 + half_w, c.y2),
    });
    zones
}

/// First zone whose hover area contains `point`.
#[must_use]
pub fn classify(zones: &[DropZone], point: Point) -> Option<&DropZone> {
    zones.iter().find(|zone| zone.hover.contains(point))
}

/// Insertion point inside a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInsertion {
    /// Index among the displayed tabs; `None` when the pointer is before
    /// every tab.
    pub index: Option<usize>,
    /// Placeholder rectangle to paint, if any.
    pub marker: Option<Area>,
}

/// Placeholder size in header coordinates: length along the header and
/// thickness across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub length: i32,
    pub thickness: i32,
}

/// Tab insertion index for a pointer over a header.
///
/// Over a tab, the index is that tab's when the pointer is in its first
/// half and the next one otherwise. Past the last tab it appends. With no
/// tabs at all, a placeholder at the header's start (along its trailing
/// edge) takes index 0.
#[must_use]
pub fn header_insertion(
    spans: &[TabSpan],
    header: Area,
    side: HeaderSide,
    point: Point,
    placeholder: Placeholder,
) -> HeaderInsertion {
    let sided = side.is_sided();
    let marker_at = |start: i32| {
        if sided {
            Area::new(header.x1, start, header.x2, start + placeholder.length)
        } else {
            Area::new(start, header.y1, start + placeholder.length, header.y2)
        }
    };

    let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
        let marker = if sided {
            Area::new(
                header.x2 - placeholder.thickness,
                header.y1,
                header.x2,
                header.y1 + placeholder.length,
            )
        } else {
            Area::new(
                header.x1,
                header.y2 - placeholder.thickness,
                header.x1 + placeholder.length,
                header.y2,
            )
        };
        return HeaderInsertion {
            index: Some(0),
            marker: Some(marker),
        };
    };

    let primary = if sided { point.y } else { point.x };
    if primary < first.start {
        return HeaderInsertion {
            index: None,
            marker: None,
        };
    }
    for (index, span) in spans.iter().enumerate() {
        if primary >= span.start && primary < span.end {
            let (index, start) = if primary < span.midpoint() {
                (index, span.start)
            } else {
                (index + 1, span.end)
            };
            return HeaderInsertion {
                index: Some(index),
                marker: Some(marker_at(start)),
            };
        }
    }
    HeaderInsertion {
        index: Some(spans.len()),
        marker: Some(marker_at(last.end)),
    }
}

/// Edge strip of the root container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootEdge {
    Top,
    Right,
    Bottom,
    Left,
}

impl RootEdge {
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    /// Axis of the container the edge drop builds, and whether the dropped
    /// item goes first.
    #[must_use]
    pub const fn split(self) -> (Axis, bool) {
        match self {
            Self::Top => (Axis::Vertical, true),
            Self::Bottom => (Axis::Vertical, false),
            Self::Left => (Axis::Horizontal, true),
            Self::Right => (Axis::Horizontal, false),
        }
    }

    /// Strip of `thickness` along this edge of `area`.
    #[must_use]
    pub fn strip(self, area: Area, thickness: i32) -> Area {
        match self {
            Self::Top => area.split_top(thickness).0,
            Self::Right => area.split_right(thickness).0,
            Self::Bottom => area.split_bottom(thickness).0,
            Self::Left => area.split_left(thickness).0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    fn input(content: Area) -> StackZoneInput {
        StackZoneInput {
            header: Some(Area::new(content.x1, content.y1 - 20, content.x2, content.y1)),
            content,
            has_children: true,
            active_is_container: false,
        }
    }

    fn segment_at(zones: &[DropZone], x: i32, y: i32) -> Option<DropSegment> {
        classify(zones, Point::new(x, y)).map(|zone| zone.segment)
    }

    #[test]
    fn bands_tile_the_content() {
        let zones = stack_drop_zones(&input(Area::new(0, 20, 400, 220)));
        assert_eq!(segment_at(&zones, 200, 10), Some(DropSegment::Header));
        assert_eq!(segment_at(&zones, 200, 30), Some(DropSegment::Top));
        assert_eq!(segment_at(&zones, 200, 200), Some(DropSegment::Bottom));
        assert_eq!(segment_at(&zones, 10, 30), Some(DropSegment::Left));
        assert_eq!(segment_at(&zones, 399, 219), Some(DropSegment::Right));
        for y in (20..220).step_by(7) {
            for x in (0..400).step_by(7) {
                assert!(segment_at(&zones, x, y).is_some(), "gap at {x},{y}");
            }
        }
        assert_eq!(segment_at(&zones, 400, 100), None);
    }

    #[test]
    fn highlight_is_the_full_half() {
        let zones = stack_drop_zones(&input(Area::new(0, 20, 400, 220)));
        let left = zones
            .iter()
            .find(|zone| zone.segment == DropSegment::Left)
            .expect("left zone");
        assert_eq!(left.hover, Area::new(0, 20, 100, 220));
        assert_eq!(left.highlight, Area::new(0, 20, 200, 220));
    }

    #[test]
    fn empty_stack_has_body_zone() {
        let mut empty = input(Area::new(0, 20, 400, 220));
        empty.has_children = false;
        let zones = stack_drop_zones(&empty);
        let segments: Vec<_> = zones.iter().map(|zone| zone.segment).collect();
        assert_eq!(segments, vec![DropSegment::Header, DropSegment::Body]);
    }

    #[test]
    fn container_child_only_accepts_header() {
        let mut nested = input(Area::new(0, 20, 400, 220));
        nested.active_is_container = true;
        let zones = stack_drop_zones(&nested);
        assert_eq!(zones.len(), 1);
        nested.header = None;
        assert!(stack_drop_zones(&nested).is_empty());
    }

    fn spans(count: u64) -> Vec<TabSpan> {
        (0..count)
            .map(|i| {
                let start = i32::try_from(i).expect("small") * 100;
                TabSpan {
                    content: NodeId::new(i + 1).expect("id"),
                    start,
                    end: start + 100,
                }
            })
            .collect()
    }

    const PLACEHOLDER: Placeholder = Placeholder {
        length: 100,
        thickness: 20,
    };

    #[test]
    fn pointer_past_midpoint_inserts_after_tab() {
        let header = Area::new(0, 0, 800, 20);
        let at = |x| header_insertion(&spans(3), header, HeaderSide::Top, Point::new(x, 5), PLACEHOLDER);
        assert_eq!(at(160).index, Some(2));
        assert_eq!(at(140).index, Some(1));
        assert_eq!(at(140).marker, Some(Area::new(100, 0, 200, 20)));
        assert_eq!(at(650).index, Some(3));
        assert_eq!(at(650).marker, Some(Area::new(300, 0, 400, 20)));
    }

    #[test]
    fn pointer_before_tabs_shows_no_marker() {
        let header = Area::new(0, 0, 800, 20);
        let mut shifted = spans(2);
        for span in &mut shifted {
            span.start += 50;
            span.end += 50;
        }
        let insertion =
            header_insertion(&shifted, header, HeaderSide::Top, Point::new(10, 5), PLACEHOLDER);
        assert_eq!(
            insertion,
            HeaderInsertion {
                index: None,
                marker: None
            }
        );
    }

    #[test]
    fn empty_header_uses_placeholder() {
        let header = Area::new(10, 0, 800, 30);
        let insertion =
            header_insertion(&[], header, HeaderSide::Top, Point::new(400, 5), PLACEHOLDER);
        assert_eq!(insertion.index, Some(0));
        assert_eq!(insertion.marker, Some(Area::new(10, 10, 110, 30)));
    }

    #[test]
    fn root_edge_strips() {
        let area = Area::new(0, 0, 800, 600);
        assert_eq!(RootEdge::Top.strip(area, 50), Area::new(0, 0, 800, 50));
        assert_eq!(RootEdge::Right.strip(area, 50), Area::new(750, 0, 800, 600));
        assert_eq!(RootEdge::Bottom.strip(area, 50), Area::new(0, 550, 800, 600));
        assert_eq!(RootEdge::Left.strip(area, 50), Area::new(0, 0, 50, 600));
        assert_eq!(RootEdge::Left.split(), (Axis::Horizontal, true));
    }
}
