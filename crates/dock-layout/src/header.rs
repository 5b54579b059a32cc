//! Merged stack header descriptor.
//!
//! A stack's header is resolved once at construction from up to four ordered
//! layers, later layers winning per field:
//!
//! 1. global settings and labels,
//! 2. the layout-wide header override,
//! 3. the stack's own configured header,
//! 4. the header of the stack's first configured child.

use dock_core::{HeaderLabel, HeaderOverride, HeaderShow, HeaderSide, LayoutConfig};

/// Resolved header. `None` means hidden / button disabled; otherwise the
/// label to render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderConfig {
    pub show: Option<HeaderSide>,
    pub popout: Option<String>,
    pub maximise: Option<String>,
    pub close: Option<String>,
    pub minimise: Option<String>,
    pub dock: Option<String>,
}

impl HeaderConfig {
    /// Base layer derived from global settings. `has_headers` is the stack's
    /// own toggle, which can only turn headers off.
    #[must_use]
    pub fn from_settings(config: &LayoutConfig, has_headers: Option<bool>) -> Self {
        let settings = &config.settings;
        let labels = &config.labels;
        let enabled = |on: bool, label: &str| on.then(|| label.to_string());
        Self {
            show: (settings.has_headers && has_headers != Some(false)).then_some(HeaderSide::Top),
            popout: enabled(settings.show_popout_icon, &labels.popout),
            maximise: enabled(settings.show_maximise_icon, &labels.maximise),
            close: enabled(settings.show_close_icon, &labels.close),
            minimise: Some(labels.minimise.clone()),
            dock: enabled(settings.show_dock_icon, &labels.dock),
        }
    }

    /// Resolve all layers in order.
    #[must_use]
    pub fn resolve(
        config: &LayoutConfig,
        has_headers: Option<bool>,
        stack: Option<&HeaderOverride>,
        first_child: Option<&HeaderOverride>,
    ) -> Self {
        let mut header = Self::from_settings(config, has_headers);
        for layer in [config.header.as_ref(), stack, first_child]
            .into_iter()
            .flatten()
        {
            header.apply(layer, config);
        }
        header
    }

    /// Overlay one layer; fields the layer leaves unset are kept.
    pub fn apply(&mut self, layer: &HeaderOverride, config: &LayoutConfig) {
        if let Some(show) = layer.show {
            self.show = match show {
                HeaderShow::Flag(true) => Some(HeaderSide::Top),
                HeaderShow::Flag(false) => None,
                HeaderShow::Side(side) => Some(side),
            };
        }
        let labels = &config.labels;
        overlay(&mut self.popout, layer.popout.as_ref(), &labels.popout);
        overlay(&mut self.maximise, layer.maximise.as_ref(), &labels.maximise);
        overlay(&mut self.close, layer.close.as_ref(), &labels.close);
        overlay(&mut self.minimise, layer.minimise.as_ref(), &labels.minimise);
        overlay(&mut self.dock, layer.dock.as_ref(), &labels.dock);
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.show.is_some()
    }
}

fn overlay(slot: &mut Option<String>, value: Option<&HeaderLabel>, default_label: &str) {
    match value {
        None => {}
        Some(HeaderLabel::Flag(false)) => *slot = None,
        Some(HeaderLabel::Flag(true)) => *slot = Some(default_label.to_string()),
        Some(HeaderLabel::Label(label)) => *slot = Some(label.clone()),
    }
}
