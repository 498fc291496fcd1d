//! The single instrumentation interface a host runtime dispatches its commit lifecycle through.
//!
//! The host provides one [`InstrumentationInterface`] per thread (see [`InstrumentationInterface::provide_global`]),
//! and any number of tools may replace its callbacks. Well-behaved tools keep calling whatever they replaced,
//! which [`chain_commit_root`] and [`chain_commit_node_unmount`] do.

use crate::{
	error::DisposeError,
	registry::Registry,
	tree::{NodeId, RenderTree, Root},
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::{debug, trace_span};

pub type RendererId = u32;

/// Arguments of a commit notification, passed along unchanged to chained callbacks.
#[derive(Debug, Clone, Copy)]
pub struct CommitEvent<'a> {
	pub renderer: RendererId,
	pub tree: &'a RenderTree,
	pub root: &'a Root,
	pub priority_level: Option<u8>,
	pub did_error: bool,
}

/// Arguments of an unmount notification, passed along unchanged to chained callbacks.
#[derive(Debug, Clone, Copy)]
pub struct UnmountEvent<'a> {
	pub renderer: RendererId,
	pub tree: &'a RenderTree,
	pub node: NodeId,
}

pub type CommitRootCallback = Rc<dyn Fn(&CommitEvent<'_>)>;
pub type UnmountCallback = Rc<dyn Fn(&UnmountEvent<'_>) -> Result<(), DisposeError>>;

/// The replaceable callback slots of an [`InstrumentationInterface`].
#[derive(Clone, Default)]
pub struct HookCallbacks {
	pub on_commit_root: Option<CommitRootCallback>,
	pub on_commit_node_unmount: Option<UnmountCallback>,
}
impl Debug for HookCallbacks {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookCallbacks")
			.field("on_commit_root", &self.on_commit_root.as_ref().map(Rc::as_ptr))
			.field("on_commit_node_unmount", &self.on_commit_node_unmount.as_ref().map(Rc::as_ptr))
			.finish()
	}
}

/// What an installation leaves on the interface: its marker, the registry it feeds, and the callbacks it replaced.
#[derive(Debug)]
struct Extension {
	registry: Rc<Registry>,
	replaced: HookCallbacks,
}

#[derive(Debug, Default)]
pub struct InstrumentationInterface {
	callbacks: RefCell<HookCallbacks>,
	extension: RefCell<Option<Extension>>,
}

thread_local! {
	static GLOBAL_INTERFACE: RefCell<Option<Rc<InstrumentationInterface>>> = RefCell::new(None);
}

impl InstrumentationInterface {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_callbacks(callbacks: HookCallbacks) -> Self {
		Self { callbacks: RefCell::new(callbacks), extension: RefCell::default() }
	}

	/// Makes `interface` this thread's global instrumentation interface, returning the one it replaces.
	pub fn provide_global(interface: Rc<Self>) -> Option<Rc<Self>> {
		GLOBAL_INTERFACE.with(|global| global.borrow_mut().replace(interface))
	}

	#[must_use]
	pub fn global() -> Option<Rc<Self>> {
		GLOBAL_INTERFACE.with(|global| global.borrow().clone())
	}

	pub fn withdraw_global() -> Option<Rc<Self>> {
		GLOBAL_INTERFACE.with(|global| global.borrow_mut().take())
	}

	/// Snapshot of the current callback slots.
	#[must_use]
	pub fn callbacks(&self) -> HookCallbacks {
		self.callbacks.borrow().clone()
	}

	pub fn set_on_commit_root(&self, callback: Option<CommitRootCallback>) -> Option<CommitRootCallback> {
		core::mem::replace(&mut self.callbacks.borrow_mut().on_commit_root, callback)
	}

	pub fn set_on_commit_node_unmount(&self, callback: Option<UnmountCallback>) -> Option<UnmountCallback> {
		core::mem::replace(&mut self.callbacks.borrow_mut().on_commit_node_unmount, callback)
	}

	/// Dispatches a commit to the current callback, if any.
	pub fn commit_root(&self, event: &CommitEvent<'_>) {
		let callback = self.callbacks.borrow().on_commit_root.clone();
		if let Some(callback) = callback {
			let span = trace_span!("commit_root", renderer = event.renderer, root = ?event.root.id);
			let _enter = span.enter();
			callback(event)
		}
	}

	/// Dispatches an unmount to the current callback, if any.
	///
	/// # Errors
	///
	/// Whatever the callback chain returns, typically a failed disposal callback.
	pub fn commit_node_unmount(&self, event: &UnmountEvent<'_>) -> Result<(), DisposeError> {
		let callback = self.callbacks.borrow().on_commit_node_unmount.clone();
		match callback {
			Some(callback) => {
				let span = trace_span!("commit_node_unmount", renderer = event.renderer, node = ?event.node);
				let _enter = span.enter();
				callback(event)
			}
			None => Ok(()),
		}
	}

	/// Whether an installation's marker is present.
	#[must_use]
	pub fn is_extended(&self) -> bool {
		self.extension.borrow().is_some()
	}

	/// The registry exposed by the current installation, for external readers.
	#[must_use]
	pub fn registry(&self) -> Option<Rc<Registry>> {
		self.extension.borrow().as_ref().map(|extension| Rc::clone(&extension.registry))
	}

	/// Replaces the callbacks with `installed` and sets the marker.
	/// `replaced` is restored by [`Self::uninstall`].
	pub(crate) fn extend(&self, installed: HookCallbacks, replaced: HookCallbacks, registry: Rc<Registry>) {
		debug_assert!(!self.is_extended());
		*self.callbacks.borrow_mut() = installed;
		*self.extension.borrow_mut() = Some(Extension { registry, replaced });
	}

	/// Restores the callbacks that were present at installation and removes the marker.
	///
	/// Returns `false` iff nothing was installed.
	/// Callbacks set by other tools *after* installation are discarded along with the installed ones.
	pub fn uninstall(&self) -> bool {
		match self.extension.borrow_mut().take() {
			Some(Extension { registry, replaced }) => {
				*self.callbacks.borrow_mut() = replaced;
				debug!(registered = registry.len(), "Uninstalled.");
				true
			}
			None => false,
		}
	}
}

/// Runs `first`, then `previous` (if any) with the same event.
pub fn chain_commit_root(first: impl 'static + Fn(&CommitEvent<'_>), previous: Option<CommitRootCallback>) -> CommitRootCallback {
	Rc::new(move |event: &CommitEvent<'_>| {
		first(event);
		if let Some(previous) = &previous {
			previous(event)
		}
	})
}

/// Runs `first`, then `previous` (if any) with the same event.
///
/// If `first` fails, `previous` is skipped and the error returned.
pub fn chain_commit_node_unmount(first: impl 'static + Fn(&UnmountEvent<'_>) -> Result<(), DisposeError>, previous: Option<UnmountCallback>) -> UnmountCallback {
	Rc::new(move |event: &UnmountEvent<'_>| {
		first(event)?;
		match &previous {
			Some(previous) => previous(event),
			None => Ok(()),
		}
	})
}
