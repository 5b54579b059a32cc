#![forbid(unsafe_code)]

//! Core: geometry, configuration, and drag input for the docking engine.
//!
//! # Role in the workspace
//! `dock-core` holds the host-agnostic vocabulary shared by the layout engine
//! (`dock-layout`) and whatever adapter renders it: rectangles and points in
//! the shared coordinate space, the static [`LayoutConfig`], and the
//! [`DragInput`] lifecycle events a pointer adapter produces.

pub mod config;
pub mod event;
pub mod geometry;

pub use config::{
    ConfigError, Dimensions, HeaderLabel, HeaderOverride, HeaderShow, HeaderSide, Labels,
    LayoutConfig, Settings,
};
pub use event::DragInput;
pub use geometry::{Area, Point};
