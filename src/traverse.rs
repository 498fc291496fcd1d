//! Post-order walks over a [`RenderTree`], either complete or limited to what changed since the preceding commit.
//!
//! Both walks visit every node *after* all of its descendants.
//! Boundary nodes only ever contribute their live subtree: the primary one ([`Node::child`](`crate::tree::Node::child`))
//! or, while [showing fallback](`crate::tree::Node::shows_fallback`), the fallback one (the primary's sibling).

use crate::tree::{NodeId, RenderTree, Tag};
use tracing::{trace, trace_span};

/// Visits `node`'s live subtree and then `node`.
///
/// With `include_siblings`, all following siblings of `node` (and their live subtrees) are visited too, before `node` itself.
/// The overall order is that of the recursive definition: the subtrees of `node` and each following sibling in sibling order,
/// then the siblings themselves from last to first, then `node`.
/// Sibling chains are walked iteratively, so the stack only grows with tree depth.
pub fn traverse_full<V: FnMut(NodeId)>(tree: &RenderTree, node: NodeId, visit: &mut V, include_siblings: bool) {
	if include_siblings {
		let chain: Vec<NodeId> = tree.siblings_from(node).collect();
		for &member in &chain {
			traverse_live_descendants(tree, member, visit);
		}
		for &member in chain.iter().rev() {
			visit(member);
		}
	} else {
		traverse_live_descendants(tree, node, visit);
		visit(node);
	}
}

fn traverse_live_descendants<V: FnMut(NodeId)>(tree: &RenderTree, node: NodeId, visit: &mut V) {
	let current = &tree[node];
	if current.shows_fallback() {
		// The primary subtree is inert while the fallback is showing.
		let fallback_content = current.child.and_then(|primary| tree[primary].sibling).and_then(|fallback| tree[fallback].child);
		if let Some(content) = fallback_content {
			let span = trace_span!("Boundary showing fallback", ?node, ?content);
			let _enter = span.enter();
			traverse_full(tree, content, visit, true);
		}
	} else if let Some(child) = current.child {
		traverse_full(tree, child, visit, true);
	}
}

/// Visits whatever changed under `node` since `previous`, then `node` itself.
///
/// `previous` must be `node`'s [`alternate`](`crate::tree::Node::alternate`).
/// This is only checked with debug assertions. Anything else yields unspecified (but memory-safe) visits.
///
/// Subtrees whose child pointer is unchanged are skipped entirely, so a commit that changed nothing below `node` visits only `node`.
pub fn traverse_incremental<V: FnMut(NodeId)>(tree: &RenderTree, node: NodeId, previous: NodeId, visit: &mut V) {
	let next = &tree[node];
	let prev = &tree[previous];
	debug_assert_eq!(next.alternate, Some(previous), "`previous` must be the alternate of `node`");
	debug_assert_ne!(node, previous, "A node can't be its own alternate");

	let is_boundary = next.tag == Tag::Boundary;
	let prev_shows_fallback = is_boundary && prev.committed_state.is_some();
	let next_shows_fallback = is_boundary && next.committed_state.is_some();

	match (prev_shows_fallback, next_shows_fallback) {
		(true, true) => {
			let fallback = next.child.and_then(|primary| tree[primary].sibling);
			let prev_fallback = prev.child.and_then(|primary| tree[primary].sibling);
			if let Some(fallback) = fallback {
				let span = trace_span!("Fallback still showing", ?node, ?fallback, ?prev_fallback);
				let _enter = span.enter();
				// A recreated fallback fragment has nothing to diff against.
				match prev_fallback.filter(|&prev_fallback| tree[fallback].alternate == Some(prev_fallback)) {
					Some(prev_fallback) => traverse_incremental(tree, fallback, prev_fallback, visit),
					None => traverse_full(tree, fallback, visit, true),
				}
			}
		}

		(true, false) => {
			let span = trace_span!("Fallback to primary", ?node);
			let _enter = span.enter();
			if let Some(primary) = next.child {
				traverse_full(tree, primary, visit, true);
			}
		}

		(false, true) => {
			let span = trace_span!("Primary to fallback", ?node);
			let _enter = span.enter();
			if let Some(fallback) = next.child.and_then(|primary| tree[primary].sibling) {
				traverse_full(tree, fallback, visit, true);
			}
		}

		(false, false) => {
			if next.child == prev.child {
				trace!(?node, "Child pointer unchanged. Skipping subtree.");
			} else {
				for child in tree.children(node) {
					match tree[child].alternate {
						Some(alternate) => traverse_incremental(tree, child, alternate, visit),
						None => traverse_full(tree, child, visit, false),
					}
				}
			}
		}
	}

	visit(node);
}
