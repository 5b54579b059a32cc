//! Layout change notifications.
//!
//! Mutations queue [`LayoutEvent`]s while they run; the tree flushes the
//! queue only once the mutation and the size recomputation it triggers have
//! finished, so observers never see a half-applied tree. Bubbling events are
//! delivered to node-scoped observers on the origin and then each ancestor;
//! every event reaches the global observers once.

use std::collections::BTreeMap;
use std::fmt;

use crate::node::NodeId;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEventKind {
    /// Persistable state changed somewhere at or below the origin. Bubbles.
    StateChanged,
    /// A stack's active child changed.
    ActiveContentItemChanged { item: NodeId },
    /// A stack created a tab for `item`.
    TabCreated { item: NodeId },
    /// The origin's solved area changed.
    Resize,
    ItemCreated,
    ItemDestroyed,
    /// A stack was docked or undocked.
    Docked { docked: bool },
    Maximised,
    Minimised,
}

impl LayoutEventKind {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StateChanged => "state_changed",
            Self::ActiveContentItemChanged { .. } => "active_content_item_changed",
            Self::TabCreated { .. } => "tab_created",
            Self::Resize => "resize",
            Self::ItemCreated => "item_created",
            Self::ItemDestroyed => "item_destroyed",
            Self::Docked { .. } => "docked",
            Self::Maximised => "maximised",
            Self::Minimised => "minimised",
        }
    }
}

/// One notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEvent {
    pub origin: NodeId,
    pub kind: LayoutEventKind,
}

impl LayoutEvent {
    #[must_use]
    pub const fn new(origin: NodeId, kind: LayoutEventKind) -> Self {
        Self { origin, kind }
    }

    /// Whether node-scoped delivery continues up the ancestor chain.
    #[must_use]
    pub const fn bubbles(&self) -> bool {
        matches!(self.kind, LayoutEventKind::StateChanged)
    }
}

/// Where an observer listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every event in the layout.
    Global,
    /// Events originating at (or bubbling through) one node. The
    /// subscription ends when the node is destroyed.
    Node(NodeId),
}

/// Handle returned by [`crate::LayoutTree::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

pub(crate) type Observer = Box<dyn FnMut(&LayoutEvent)>;

struct Subscription {
    scope: Scope,
    observer: Observer,
}

/// Subscription registry plus the pending event queue.
#[derive(Default)]
pub(crate) struct Notifier {
    next_id: u64,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    pending: Vec<LayoutEvent>,
    retired: Vec<NodeId>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscriptions", &self.subscriptions.len())
            .field("pending", &self.pending)
            .field("retired", &self.retired)
            .finish()
    }
}

impl Notifier {
    pub(crate) fn subscribe(&mut self, scope: Scope, observer: Observer) -> SubscriptionId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = SubscriptionId(self.next_id);
        self.subscriptions
            .insert(id, Subscription { scope, observer });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    pub(crate) fn queue(&mut self, origin: NodeId, kind: LayoutEventKind) {
        self.pending.push(LayoutEvent::new(origin, kind));
    }

    /// Drop this node's scoped subscriptions after the next flush.
    pub(crate) fn retire(&mut self, node: NodeId) {
        self.retired.push(node);
    }

    pub(crate) fn take_pending(&mut self) -> Vec<LayoutEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Deliver one event. `path` is the origin followed by the ancestors the
    /// event bubbles through.
    pub(crate) fn dispatch(&mut self, event: &LayoutEvent, path: &[NodeId]) {
        for node in path {
            for subscription in self.subscriptions.values_mut() {
                if subscription.scope == Scope::Node(*node) {
                    (subscription.observer)(event);
                }
            }
        }
        for subscription in self.subscriptions.values_mut() {
            if subscription.scope == Scope::Global {
                (subscription.observer)(event);
            }
        }
    }

    pub(crate) fn release_retired(&mut self) {
        if self.retired.is_empty() {
            return;
        }
        let retired = std::mem::take(&mut self.retired);
        self.subscriptions.retain(|_, subscription| match subscription.scope {
            Scope::Node(node) => !retired.contains(&node),
            Scope::Global => true,
        });
    }

    #[cfg(test)]
    pub(crate) fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}
