//! Keeps a [`Registry`] current by walking every committed canvas tree.

use crate::{
	config::HookConfig,
	error::DisposeError,
	hook::{CommitEvent, UnmountEvent},
	mount,
	registry::{dispose_if_requested, Registry},
	traverse::{traverse_full, traverse_incremental},
	tree::RootId,
};
use core::cell::{Cell, RefCell};
use hashbrown::HashSet;
use std::rc::Rc;
use tracing::{info, instrument, level_filters::STATIC_MAX_LEVEL, trace, Level};

/// Commit and unmount handling, without any chaining.
///
/// See [`hook::chain_commit_root`](`crate::hook::chain_commit_root`) and [`hook::chain_commit_node_unmount`](`crate::hook::chain_commit_node_unmount`)
/// to compose it with previously installed callbacks.
#[derive(Debug)]
pub struct CommitInterceptor {
	registry: Rc<Registry>,
	config: HookConfig,
	/// Roots that had a full walk while mounted. Never shrinks.
	known_roots: RefCell<HashSet<RootId>>,
	commits: Cell<u64>,
}
impl CommitInterceptor {
	#[must_use]
	pub fn new(registry: Rc<Registry>, config: HookConfig) -> Self {
		Self {
			registry,
			config,
			known_roots: RefCell::default(),
			commits: Cell::new(0),
		}
	}

	#[must_use]
	pub fn registry(&self) -> &Rc<Registry> {
		&self.registry
	}

	#[must_use]
	pub fn config(&self) -> &HookConfig {
		&self.config
	}

	#[must_use]
	pub fn is_known(&self, root: RootId) -> bool {
		self.known_roots.borrow().contains(&root)
	}

	/// Number of in-scope commits of mounted roots seen so far.
	#[must_use]
	pub fn commit_count(&self) -> u64 {
		self.commits.get()
	}

	/// Registers the identifiable nodes of `event.root`'s tree, if it is mounted into an editor canvas.
	///
	/// A root that is new (or was unmounted in the preceding commit) gets a full walk.
	/// Afterwards, only what changed since the root's alternate is walked.
	#[instrument(skip(self, event), fields(root = ?event.root.id))]
	pub fn on_commit_root(&self, event: &CommitEvent<'_>) {
		let CommitEvent { tree, root, .. } = *event;

		if !mount::is_canvas(&*root.mount_target, &self.config.container_element_id) {
			return trace!("Not a canvas. Skipping.");
		}
		if !root.is_mounted(tree) {
			return trace!("Root is not mounted. Nothing to register.");
		}
		self.commits.set(self.commits.get() + 1);

		let mut visited = 0_usize;
		let mut registered = 0_usize;
		let mut visit = |node| {
			visited += 1;
			if self.registry.register_if_identifiable(tree, node, &self.config) {
				registered += 1;
			}
		};

		// `mounted_alternate` is only set if the root was mounted before, so a known root always has something to diff against.
		let known = self.is_known(root.id);
		match root.mounted_alternate(tree).filter(|_| known) {
			Some(alternate) => {
				trace!(?alternate, "Incremental walk.");
				traverse_incremental(tree, root.current, alternate, &mut visit);
			}
			None => {
				trace!(known, "Full walk.");
				traverse_full(tree, root.current, &mut visit, false);
				self.known_roots.borrow_mut().insert(root.id);
			}
		}

		if STATIC_MAX_LEVEL >= Level::INFO {
			info!(
				"Commit {}: visited {} node(s), registered {}. Registry size: {}",
				self.commits.get(),
				visited,
				registered,
				self.registry.len()
			);
		}
	}

	/// Calls the unmounted node's disposal callback, if it has one.
	///
	/// # Errors
	///
	/// Iff the disposal callback fails.
	#[instrument(skip(self, event), fields(node = ?event.node))]
	pub fn on_commit_node_unmount(&self, event: &UnmountEvent<'_>) -> Result<(), DisposeError> {
		if dispose_if_requested(&event.tree[event.node], &self.config)? {
			trace!("Disposed.");
		}
		Ok(())
	}
}
