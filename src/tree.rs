//! The host renderer's double-buffered tree, as seen by this crate.
//!
//! Nodes are never freed: every commit that produces a new node at some tree position [appends](`RenderTree::create`) it,
//! and the node that previously held that position stays reachable as its [***alternate***](`Node::alternate`).
//! Node identity is [`NodeId`] equality.

use crate::{mount::MountTarget, props::Props};
use core::convert::TryFrom;
use std::rc::Rc;

/// Index of a [`Node`] in its [`RenderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);
impl NodeId {
	#[must_use]
	pub fn index(self) -> usize {
		self.0 as usize
	}
}
impl From<NodeId> for u32 {
	fn from(id: NodeId) -> Self {
		id.0
	}
}

/// Identifies a [`Root`] across commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
	FunctionComponent,
	ClassComponent,
	IntrinsicElement,
	Text,
	/// Renders either its primary subtree ([`Node::child`]) or its fallback subtree (the primary's [sibling](`Node::sibling`)).
	Boundary,
	Other,
}

/// Committed state, where this crate cares about it.
///
/// For [`Tag::Boundary`] nodes, *any* state means the fallback is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommittedState {
	/// State of a root's current node. `element` is [`None`] once the root has been unmounted.
	Root { element: Option<u64> },
	Opaque,
}

#[derive(Debug, Clone)]
pub struct Node {
	pub tag: Tag,
	pub child: Option<NodeId>,
	pub sibling: Option<NodeId>,
	pub parent: Option<NodeId>,
	/// The node that held the same position in the preceding commit.
	pub alternate: Option<NodeId>,
	pub committed_props: Option<Props>,
	pub committed_state: Option<CommittedState>,
	pub key: Option<String>,
	pub ref_handle: Option<u64>,
}
impl Node {
	#[must_use]
	pub fn new(tag: Tag) -> Self {
		Self {
			tag,
			child: None,
			sibling: None,
			parent: None,
			alternate: None,
			committed_props: None,
			committed_state: None,
			key: None,
			ref_handle: None,
		}
	}

	#[must_use]
	pub fn with_props(mut self, props: Props) -> Self {
		self.committed_props = Some(props);
		self
	}

	#[must_use]
	pub fn with_state(mut self, state: CommittedState) -> Self {
		self.committed_state = Some(state);
		self
	}

	#[must_use]
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Whether this is a boundary currently showing its fallback subtree.
	#[must_use]
	pub fn shows_fallback(&self) -> bool {
		self.tag == Tag::Boundary && self.committed_state.is_some()
	}

	/// Whether this (root) node's state references a rendered element.
	#[must_use]
	pub fn has_rendered_element(&self) -> bool {
		matches!(self.committed_state, Some(CommittedState::Root { element: Some(_) }))
	}
}

/// Append-only arena of [`Node`]s across all commits.
#[derive(Debug, Clone, Default)]
pub struct RenderTree {
	nodes: Vec<Node>,
}
impl RenderTree {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// # Panics
	///
	/// Iff the arena is full (more than [`u32::MAX`] nodes).
	pub fn create(&mut self, node: Node) -> NodeId {
		assert!(u32::try_from(self.nodes.len()).is_ok(), "`RenderTree` node index space exhausted");
		#[allow(clippy::cast_possible_truncation)]
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(node);
		id
	}

	/// Creates the next commit's node for `current`'s position.
	///
	/// The new node copies tag, props, state and key, and **shares `current`'s child pointer** until the host relinks it.
	/// Its [`alternate`](`Node::alternate`) is `current`.
	pub fn create_work_in_progress(&mut self, current: NodeId) -> NodeId {
		let previous = &self[current];
		let node = Node {
			alternate: Some(current),
			child: previous.child,
			sibling: None,
			parent: None,
			..previous.clone()
		};
		self.create(node)
	}

	/// Makes `children` the child list of `parent`, in order.
	///
	/// Siblings links of the last child are cleared, as are `parent`'s child link if `children` is empty.
	pub fn link_children(&mut self, parent: NodeId, children: &[NodeId]) {
		self[parent].child = children.first().copied();
		for (i, &child) in children.iter().enumerate() {
			let node = &mut self[child];
			node.parent = Some(parent);
			node.sibling = children.get(i + 1).copied();
		}
	}

	pub fn set_props(&mut self, node: NodeId, props: Option<Props>) {
		self[node].committed_props = props;
	}

	pub fn set_state(&mut self, node: NodeId, state: Option<CommittedState>) {
		self[node].committed_state = state;
	}

	#[must_use]
	pub fn get(&self, node: NodeId) -> Option<&Node> {
		self.nodes.get(node.index())
	}

	/// Iterates over `node`'s direct children in sibling order.
	pub fn children(&self, node: NodeId) -> Siblings<'_> {
		Siblings { tree: self, next: self[node].child }
	}

	/// Iterates over `first` and its following siblings.
	#[must_use]
	pub fn siblings_from(&self, first: NodeId) -> Siblings<'_> {
		Siblings { tree: self, next: Some(first) }
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
impl core::ops::Index<NodeId> for RenderTree {
	type Output = Node;

	fn index(&self, index: NodeId) -> &Self::Output {
		&self.nodes[index.index()]
	}
}
impl core::ops::IndexMut<NodeId> for RenderTree {
	fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
		&mut self.nodes[index.index()]
	}
}

#[derive(Debug, Clone)]
pub struct Siblings<'a> {
	tree: &'a RenderTree,
	next: Option<NodeId>,
}
impl<'a> Iterator for Siblings<'a> {
	type Item = NodeId;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.next?;
		self.next = self.tree[current].sibling;
		Some(current)
	}
}

/// A mounted tree: its current root node and where it is attached.
#[derive(Debug, Clone)]
pub struct Root {
	pub id: RootId,
	pub current: NodeId,
	pub mount_target: Rc<dyn MountTarget>,
}
impl Root {
	#[must_use]
	pub fn new(id: RootId, current: NodeId, mount_target: Rc<dyn MountTarget>) -> Self {
		Self { id, current, mount_target }
	}

	#[must_use]
	pub fn is_mounted(&self, tree: &RenderTree) -> bool {
		tree[self.current].has_rendered_element()
	}

	/// The current node's alternate, if the root was mounted in the preceding commit.
	#[must_use]
	pub fn mounted_alternate(&self, tree: &RenderTree) -> Option<NodeId> {
		tree[self.current].alternate.filter(|&alternate| tree[alternate].has_rendered_element())
	}

	#[must_use]
	pub fn was_mounted(&self, tree: &RenderTree) -> bool {
		self.mounted_alternate(tree).is_some()
	}
}
