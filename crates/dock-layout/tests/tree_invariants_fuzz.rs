//! Property/fuzz-style invariants for content tree mutations.
//!
//! Random operation streams (structural edits, drops, docking, splitter drags
//! and full drag lifecycles) run against the public API. Operations may be
//! rejected; after every step, accepted or not, the tree must validate and no
//! displayed stack may lose its active child.

use dock_core::{Area, LayoutConfig, Point};
use dock_layout::{
    ContentNode, DockingController, DropSegment, ItemConfig, LayoutTree, NodeId, NodeType,
    RootEdge,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_i32_range(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = u64::from((max - min) as u32) + 1;
        min + (self.next_u64() % span) as i32
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn choose_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 0
    }

    fn pick(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        if ids.is_empty() {
            None
        } else {
            Some(ids[self.choose_index(ids.len())])
        }
    }
}

const CONTAINER: Area = Area {
    x1: 0,
    y1: 0,
    x2: 960,
    y2: 640,
};

fn attached_of(tree: &LayoutTree, kind: NodeType) -> Vec<NodeId> {
    tree.subtree(tree.root())
        .into_iter()
        .filter(|id| tree.node(*id).map(ContentNode::node_type) == Some(kind))
        .collect()
}

fn random_point(rng: &mut Lcg) -> Point {
    Point::new(
        rng.next_i32_range(CONTAINER.x1, CONTAINER.x2 - 1),
        rng.next_i32_range(CONTAINER.y1, CONTAINER.y2 - 1),
    )
}

fn random_segment(rng: &mut Lcg) -> DropSegment {
    const SEGMENTS: [DropSegment; 6] = [
        DropSegment::Header,
        DropSegment::Body,
        DropSegment::Top,
        DropSegment::Right,
        DropSegment::Bottom,
        DropSegment::Left,
    ];
    SEGMENTS[rng.choose_index(SEGMENTS.len())]
}

fn seed_tree() -> LayoutTree {
    let mut tree = LayoutTree::from_config(
        LayoutConfig::default(),
        &[ItemConfig::row(vec![
            ItemConfig::stack(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
            ItemConfig::column(vec![
                ItemConfig::component("c"),
                ItemConfig::stack(vec![ItemConfig::component("d")]),
            ]),
        ])],
    )
    .expect("seed layout");
    tree.set_container_area(CONTAINER);
    tree
}

/// Apply one random operation; rejections are fine, corruption is not.
fn random_step(tree: &mut LayoutTree, controller: &mut DockingController, rng: &mut Lcg, step: usize) {
    let stacks = attached_of(tree, NodeType::Stack);
    let components = attached_of(tree, NodeType::Component);
    let rows: Vec<NodeId> = attached_of(tree, NodeType::Row)
        .into_iter()
        .chain(attached_of(tree, NodeType::Column))
        .collect();
    let name = format!("item-{step}");

    match rng.choose_index(10) {
        0 => {
            if let Some(stack) = rng.pick(&stacks) {
                let index = rng.choose_index(tree.children(stack).len() + 2);
                let _ = tree.add_item(stack, &ItemConfig::component(name), Some(index));
            } else {
                let root = tree.root();
                let _ = tree.add_item(root, &ItemConfig::component(name), None);
            }
        }
        1 => {
            if let Some(container) = rng.pick(&rows) {
                let _ = tree.add_item(container, &ItemConfig::component(name), None);
            }
        }
        2 => {
            if let Some(node) = rng.pick(&components) {
                if let Some(parent) = tree.parent(node) {
                    let _ = tree.remove_child(parent, node, false);
                }
            }
        }
        3 => {
            if let Some(stack) = rng.pick(&stacks) {
                if let Some(item) = rng.pick(tree.children(stack)) {
                    let _ = tree.set_active_content_item(stack, item);
                }
            }
        }
        4 => {
            if let Some(stack) = rng.pick(&stacks) {
                if let Ok(loose) =
                    tree.create_content_item(&ItemConfig::component(name), Some(stack))
                {
                    let segment = random_segment(rng);
                    if tree.on_drop(stack, loose, segment, None).is_err() {
                        let _ = tree.destroy(loose);
                    }
                }
            }
        }
        5 => {
            if let Some(stack) = rng.pick(&stacks) {
                let mode = rng.choose_bool().then_some(!tree.is_docked(stack));
                let _ = tree.dock(stack, mode);
            }
        }
        6 => {
            if let Some(container) = rng.pick(&rows) {
                let splitter = rng.choose_index(tree.children(container).len().max(1));
                let offset = rng.next_i32_range(-200, 200);
                let _ = tree.resize_split(container, splitter, offset);
            }
        }
        7 => {
            let node = rng.pick(&components).or_else(|| rng.pick(&stacks));
            if let Some(node) = node {
                let _ = tree.toggle_maximise(node);
            }
        }
        8 => {
            if let Ok(loose) = tree.create_content_item(&ItemConfig::component(name), None) {
                let edge = RootEdge::ALL[rng.choose_index(RootEdge::ALL.len())];
                let edge = rng.choose_bool().then_some(edge);
                if tree.on_root_drop(loose, edge).is_err() {
                    let _ = tree.destroy(loose);
                }
            }
        }
        _ => {
            let dragged = rng.pick(&components).or_else(|| rng.pick(&stacks));
            if let Some(node) = dragged {
                if controller.begin(tree, node, random_point(rng)).is_ok() {
                    for _ in 0..rng.choose_index(4) {
                        let _ = controller.highlight_drop_zone(tree, random_point(rng));
                    }
                    if rng.choose_index(5) == 0 {
                        let _ = controller.cancel(tree);
                    } else {
                        let _ = controller.end(tree, random_point(rng));
                    }
                }
            }
        }
    }
    assert!(!controller.is_dragging(), "every drag is finished within a step");
}

fn assert_tree_invariants(tree: &LayoutTree) {
    tree.validate()
        .expect("tree should remain structurally valid");
    for stack in attached_of(tree, NodeType::Stack) {
        let node = tree.node(stack).expect("attached stack");
        if !node.children().is_empty() {
            let active = tree.active_content_item(stack).expect("active child");
            assert!(node.children().contains(&active));
        }
    }
    for node in tree.nodes() {
        assert!(node.is_displayed(), "no node stays hidden after a drag");
    }
    let root_children = tree.children(tree.root());
    assert!(root_children.len() <= 1);
}

fn run_sequence(seed: u64, steps: usize) -> LayoutTree {
    let mut tree = seed_tree();
    let mut controller = DockingController::new();
    let mut rng = Lcg::new(seed);
    for step in 0..steps {
        random_step(&mut tree, &mut controller, &mut rng, step);
        assert_tree_invariants(&tree);
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_operation_sequences_preserve_invariants(
        seed in any::<u64>(),
        steps in 20usize..120,
    ) {
        let tree = run_sequence(seed, steps);
        assert_tree_invariants(&tree);
    }

    #[test]
    fn random_sequences_replay_deterministically(
        seed in any::<u64>(),
        steps in 20usize..80,
    ) {
        let first = run_sequence(seed, steps);
        let second = run_sequence(seed, steps);
        let shape = |tree: &LayoutTree| {
            tree.subtree(tree.root())
                .into_iter()
                .map(|id| (id, tree.node(id).map(ContentNode::node_type), tree.get_area(id)))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(shape(&first), shape(&second));
    }
}

#[test]
fn fuzz_seed_corpus_preserves_invariants() {
    let seeds = [
        0_u64,
        1,
        2,
        3,
        5,
        8,
        13,
        21,
        34,
        55,
        89,
        144,
        u32::MAX as u64,
        u64::MAX,
    ];
    for seed in seeds {
        let tree = run_sequence(seed, 160);
        assert_tree_invariants(&tree);
    }
}
