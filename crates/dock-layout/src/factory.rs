//! Config fragments and the content item factory.
//!
//! An [`ItemConfig`] describes a subtree to build. The whole fragment is
//! validated before any node is allocated, so a bad fragment leaves the
//! arena untouched.
//!
//! ```json
//! { "type": "row", "content": [
//!     { "type": "component", "component_name": "editor", "width": 70 },
//!     { "type": "stack", "active_item_index": 1, "content": [
//!         { "type": "component", "component_name": "log" },
//!         { "type": "component", "component_name": "terminal" }
//!     ] }
//! ] }
//! ```

use std::collections::BTreeMap;

use dock_core::HeaderOverride;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::header::HeaderConfig;
use crate::node::{ComponentState, ContentKind, LinearState, NodeId, NodeType, StackState};
use crate::tree::{LayoutTree, Sizing};

/// Serializable description of one content item and its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ItemConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderOverride>,
    /// Stacks only: child shown first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_item_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub component_state: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_enabled: Option<bool>,
    /// Stacks only: `false` hides this stack's header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_headers: Option<bool>,
}

impl ItemConfig {
    #[must_use]
    pub fn new(kind: NodeType) -> Self {
        Self {
            kind,
            content: Vec::new(),
            width: None,
            height: None,
            is_closable: None,
            header: None,
            active_item_index: None,
            component_name: None,
            title: None,
            component_state: BTreeMap::new(),
            reorder_enabled: None,
            has_headers: None,
        }
    }

    #[must_use]
    pub fn component(name: impl Into<String>) -> Self {
        Self {
            component_name: Some(name.into()),
            ..Self::new(NodeType::Component)
        }
    }

    #[must_use]
    pub fn stack(content: Vec<ItemConfig>) -> Self {
        Self {
            content,
            ..Self::new(NodeType::Stack)
        }
    }

    #[must_use]
    pub fn row(content: Vec<ItemConfig>) -> Self {
        Self {
            content,
            ..Self::new(NodeType::Row)
        }
    }

    #[must_use]
    pub fn column(content: Vec<ItemConfig>) -> Self {
        Self {
            content,
            ..Self::new(NodeType::Column)
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: HeaderOverride) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn with_active_item_index(mut self, index: usize) -> Self {
        self.active_item_index = Some(index);
        self
    }

    #[must_use]
    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.component_state.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn closable(mut self, closable: bool) -> Self {
        self.is_closable = Some(closable);
        self
    }

    #[must_use]
    pub fn reorderable(mut self, enabled: bool) -> Self {
        self.reorder_enabled = Some(enabled);
        self
    }

    /// Stack that a component is wrapped in when its parent is not a stack.
    fn wrapper(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            header: self.header.clone(),
            content: vec![self.clone()],
            ..Self::new(NodeType::Stack)
        }
    }

    /// Check the whole fragment.
    pub fn validate(&self) -> LayoutResult<()> {
        let invalid = |reason: String| Err(LayoutError::ConfiguredStateInvalid { reason });
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return invalid(format!("{name} must be a non-negative number"));
            }
        }
        match self.kind {
            NodeType::Root => return invalid("root cannot appear in a config fragment".into()),
            NodeType::Component => {
                if self.component_name.as_deref().is_none_or(|name| name.trim().is_empty()) {
                    return invalid("component without component_name".into());
                }
                if !self.content.is_empty() {
                    return invalid("component cannot have content".into());
                }
            }
            NodeType::Stack => {
                if self.content.iter().any(|child| child.kind == NodeType::Stack) {
                    return invalid("stack cannot directly contain a stack".into());
                }
                if let Some(index) = self.active_item_index {
                    if !self.content.is_empty() && index >= self.content.len() {
                        return invalid(format!(
                            "activeItemIndex {index} out of bounds for {} items",
                            self.content.len()
                        ));
                    }
                }
            }
            NodeType::Row | NodeType::Column => {}
        }
        self.content.iter().try_for_each(ItemConfig::validate)
    }
}

impl LayoutTree {
    /// Build a detached subtree from `config`. A component whose `parent` is
    /// not a stack comes back wrapped in a new stack.
    pub fn create_content_item(
        &mut self,
        config: &ItemConfig,
        parent: Option<NodeId>,
    ) -> LayoutResult<NodeId> {
        let parent_type = parent
            .map(|id| self.get(id).map(|node| node.node_type()))
            .transpose()?;
        let node = self.instantiate(config, parent_type)?;
        self.finish();
        Ok(node)
    }

    pub(crate) fn instantiate(
        &mut self,
        config: &ItemConfig,
        parent_type: Option<NodeType>,
    ) -> LayoutResult<NodeId> {
        config.validate()?;
        if config.kind == NodeType::Component && parent_type != Some(NodeType::Stack) {
            self.build(&config.wrapper())
        } else {
            self.build(config)
        }
    }

    fn build(&mut self, config: &ItemConfig) -> LayoutResult<NodeId> {
        let kind = match config.kind {
            NodeType::Row => ContentKind::Row(LinearState::default()),
            NodeType::Column => ContentKind::Column(LinearState::default()),
            NodeType::Stack => {
                let first = config.content.first().and_then(|child| child.header.as_ref());
                let header = HeaderConfig::resolve(
                    &self.config,
                    config.has_headers,
                    config.header.as_ref(),
                    first,
                );
                ContentKind::Stack(StackState::new(header))
            }
            NodeType::Component => {
                let name = config.component_name.clone().unwrap_or_default();
                ContentKind::Component(ComponentState {
                    title: config.title.clone().unwrap_or_else(|| name.clone()),
                    component_name: name,
                    component_state: config.component_state.clone(),
                    reorder_enabled: config.reorder_enabled.unwrap_or(true),
                    header: config.header.clone(),
                })
            }
            NodeType::Root => {
                return Err(LayoutError::ConfiguredStateInvalid {
                    reason: "root cannot appear in a config fragment".into(),
                });
            }
        };
        let id = self.allocate(kind)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.size.width = config.width;
            node.size.height = config.height;
            node.is_closable = config.is_closable.unwrap_or(true);
        }

        for (index, child_config) in config.content.iter().enumerate() {
            let child = if child_config.kind == NodeType::Component && config.kind != NodeType::Stack
            {
                self.build(&child_config.wrapper())?
            } else {
                self.build(child_config)?
            };
            self.attach(id, child, index, Sizing::Fragment);
        }

        match config.kind {
            NodeType::Stack => {
                let initial = self
                    .nodes
                    .get(&id)
                    .and_then(|node| node.children.get(config.active_item_index.unwrap_or(0)))
                    .copied();
                if let Some(initial) = initial {
                    self.set_active_inner(id, initial);
                }
            }
            NodeType::Row | NodeType::Column => {
                self.normalize_relative_sizes(id);
                self.validate_docking(id);
            }
            NodeType::Component | NodeType::Root => {}
        }
        Ok(id)
    }
}
