//! Identity → live node table, and the per-node marker handling that feeds it.

use crate::{
	config::HookConfig,
	error::DisposeError,
	props::{Identity, Sidecar},
	tree::{Node, NodeId, RenderTree},
};
use core::cell::RefCell;
use hashbrown::HashMap;
use tracing::trace;

/// Maps each [`Identity`] to the node that most recently carried it.
///
/// Entries are overwritten but never removed: after a node unmounts (or a boundary switches away from it),
/// lookups may keep returning it until another node registers the same identity.
#[derive(Debug, Default)]
pub struct Registry {
	id_to_node: RefCell<HashMap<Identity, NodeId>>,
}
impl Registry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Last write wins. Returns the identity's previous owner, if any.
	pub fn register(&self, identity: Identity, node: NodeId) -> Option<NodeId> {
		self.id_to_node.borrow_mut().insert(identity, node)
	}

	#[must_use]
	pub fn get(&self, identity: impl Into<Identity>) -> Option<NodeId> {
		self.id_to_node.borrow().get(&identity.into()).copied()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.id_to_node.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.id_to_node.borrow().is_empty()
	}

	/// Snapshot of all registered identities, in no particular order.
	#[must_use]
	pub fn identities(&self) -> Vec<Identity> {
		self.id_to_node.borrow().keys().copied().collect()
	}

	/// Visit callback for commit traversals.
	///
	/// Returns whether `node` carried an identity.
	pub fn register_if_identifiable(&self, tree: &RenderTree, node: NodeId, config: &HookConfig) -> bool {
		match Sidecar::read(tree[node].committed_props.as_ref(), config).identity {
			Some(identity) => {
				let previous = self.register(identity, node);
				trace!(?identity, ?node, ?previous, "Registered node.");
				true
			}
			None => false,
		}
	}
}

/// Whether `node`'s props carry the identity marker (regardless of its value).
#[must_use]
pub fn is_identifiable(node: &Node, config: &HookConfig) -> bool {
	node.committed_props.as_ref().map_or(false, |props| props.contains_key(&config.identity_prop))
}

/// Calls `node`'s disposal callback, if its props carry one.
///
/// Returns whether a callback was called.
///
/// # Errors
///
/// Iff the disposal callback fails. Its error is returned as-is.
pub fn dispose_if_requested(node: &Node, config: &HookConfig) -> Result<bool, DisposeError> {
	match Sidecar::read(node.committed_props.as_ref(), config).on_dispose {
		Some(on_dispose) => {
			trace!("Calling disposal callback.");
			on_dispose()?;
			Ok(true)
		}
		None => Ok(false),
	}
}
