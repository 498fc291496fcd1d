use canvas_hook::{
	hook::{CommitEvent, HookCallbacks},
	install, install_global, install_if_enabled,
	tree::{RenderTree, RootId},
	uninstall, Enablement, HookConfig, InstallError, InstrumentationInterface, Registry,
};
use canvas_hook::js::canvas_hook_node_for;
use std::{cell::RefCell, rc::Rc};

use tree_builder_::{canvas_root, commit, element_with_id, host_root, init_logging, plain_root};

#[test]
fn disabled_installation_does_nothing() {
	init_logging();
	let interface = InstrumentationInterface::new();
	let installed = install_if_enabled(Some(&interface), Enablement::Disabled, HookConfig::default()).unwrap();
	assert!(installed.is_none());
	assert!(!interface.is_extended());
	assert!(interface.callbacks().on_commit_root.is_none());

	// Without enablement, a missing interface is fine too.
	assert!(install_if_enabled(None, Enablement::Disabled, HookConfig::default()).unwrap().is_none());
}

#[test]
fn enabled_installation_requires_an_interface() {
	let error = install_if_enabled(None, Enablement::Enabled, HookConfig::default()).unwrap_err();
	assert!(matches!(error, InstallError::MissingInterface));
}

#[test]
fn enabled_installation_exposes_a_registry() {
	let interface = InstrumentationInterface::new();
	let registry = install_if_enabled(Some(&interface), Enablement::Enabled, HookConfig::default()).unwrap().unwrap();
	assert!(interface.is_extended());
	assert!(Rc::ptr_eq(&registry, &interface.registry().unwrap()));
	assert!(registry.is_empty());
	assert!(interface.callbacks().on_commit_root.is_some());
	assert!(interface.callbacks().on_commit_node_unmount.is_some());
}

#[test]
fn previous_callbacks_run_after_the_interceptor() {
	let seen = Rc::new(RefCell::new(Vec::new()));
	let registry_slot: Rc<RefCell<Option<Rc<Registry>>>> = Rc::default();

	let interface = InstrumentationInterface::with_callbacks(HookCallbacks {
		on_commit_root: Some(Rc::new({
			let seen = Rc::clone(&seen);
			let registry_slot = Rc::clone(&registry_slot);
			move |event: &CommitEvent<'_>| {
				let registry = registry_slot.borrow().clone().unwrap();
				seen.borrow_mut().push((event.root.id, registry.len()));
			}
		})),
		on_commit_node_unmount: None,
	});

	let first = install(&interface, HookConfig::default());
	*registry_slot.borrow_mut() = Some(Rc::clone(&first));
	let second = install(&interface, HookConfig::default());
	assert!(Rc::ptr_eq(&first, &second));

	let mut tree = RenderTree::new();
	let root_node = host_root(&mut tree);
	let five = element_with_id(&mut tree, 5);
	tree.link_children(root_node, &[five]);
	let root = canvas_root(8, root_node);

	commit(&interface, &tree, &root);
	assert_eq!(*seen.borrow(), [(RootId(8), 1)]);
	assert_eq!(first.get(5), Some(five));

	// Out-of-scope commits are still forwarded.
	let outside = host_root(&mut tree);
	commit(&interface, &tree, &plain_root(9, outside));
	assert_eq!(*seen.borrow(), [(RootId(8), 1), (RootId(9), 1)]);
}

#[test]
fn uninstall_restores_replaced_callbacks() {
	let interface = InstrumentationInterface::new();
	let original_calls = Rc::new(RefCell::new(0));
	let original = {
		let original_calls = Rc::clone(&original_calls);
		Rc::new(move |_: &CommitEvent<'_>| *original_calls.borrow_mut() += 1) as Rc<dyn Fn(&CommitEvent<'_>)>
	};
	interface.set_on_commit_root(Some(Rc::clone(&original)));

	let registry = install(&interface, HookConfig::default());
	assert!(!Rc::ptr_eq(interface.callbacks().on_commit_root.as_ref().unwrap(), &original));

	assert!(uninstall(&interface));
	assert!(!interface.is_extended());
	assert!(interface.registry().is_none());
	assert!(Rc::ptr_eq(interface.callbacks().on_commit_root.as_ref().unwrap(), &original));
	assert!(interface.callbacks().on_commit_node_unmount.is_none());
	assert!(!uninstall(&interface));

	// Commits are no longer tracked.
	let mut tree = RenderTree::new();
	let root_node = host_root(&mut tree);
	let one = element_with_id(&mut tree, 1);
	tree.link_children(root_node, &[one]);
	commit(&interface, &tree, &canvas_root(0, root_node));
	assert!(registry.is_empty());
	assert_eq!(*original_calls.borrow(), 1);

	// A fresh installation starts over.
	let reinstalled = install(&interface, HookConfig::default());
	assert!(!Rc::ptr_eq(&registry, &reinstalled));
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn global_installation_stays_disabled_without_a_location() {
	InstrumentationInterface::provide_global(Rc::new(InstrumentationInterface::new()));
	assert!(install_global(HookConfig::default()).unwrap().is_none());
	assert!(!InstrumentationInterface::global().unwrap().is_extended());
	InstrumentationInterface::withdraw_global();

	// Disabled wins over a missing interface.
	assert!(install_global(HookConfig::default()).unwrap().is_none());
}

#[test]
fn node_lookup_for_javascript_yields_arena_indices() {
	assert_eq!(canvas_hook_node_for(5.0), None);

	let interface = Rc::new(InstrumentationInterface::new());
	InstrumentationInterface::provide_global(Rc::clone(&interface));
	install(&interface, HookConfig::default());

	let mut tree = RenderTree::new();
	let root_node = host_root(&mut tree);
	let five = element_with_id(&mut tree, 5);
	let also_five = element_with_id(&mut tree, 5);
	tree.link_children(root_node, &[five, also_five]);
	commit(&interface, &tree, &canvas_root(0, root_node));

	// Siblings are visited last to first, so the first one wins.
	assert_eq!(canvas_hook_node_for(5.0), Some(u32::from(five)));
	assert_eq!(canvas_hook_node_for(6.0), None);
	InstrumentationInterface::withdraw_global();
}
