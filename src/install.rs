//! One-time installation of a [`CommitInterceptor`] onto an [`InstrumentationInterface`].

use crate::{
	config::{Enablement, HookConfig},
	error::InstallError,
	hook::{chain_commit_node_unmount, chain_commit_root, HookCallbacks, InstrumentationInterface},
	intercept::CommitInterceptor,
	registry::Registry,
};
use std::rc::Rc;
use tracing::{debug, info, instrument};

/// Installs onto `interface` unless an installation is already present there.
///
/// The callbacks present on `interface` at this point keep being called, after the interceptor.
/// Returns the registry fed by the (new or existing) installation.
#[instrument(skip(interface))]
pub fn install(interface: &InstrumentationInterface, config: HookConfig) -> Rc<Registry> {
	if let Some(registry) = interface.registry() {
		debug!("Already installed.");
		return registry;
	}

	let replaced = interface.callbacks();
	let registry = Rc::new(Registry::new());
	let interceptor = Rc::new(CommitInterceptor::new(Rc::clone(&registry), config));

	let installed = HookCallbacks {
		on_commit_root: Some(chain_commit_root(
			{
				let interceptor = Rc::clone(&interceptor);
				move |event| interceptor.on_commit_root(event)
			},
			replaced.on_commit_root.clone(),
		)),
		on_commit_node_unmount: Some(chain_commit_node_unmount(move |event| interceptor.on_commit_node_unmount(event), replaced.on_commit_node_unmount.clone())),
	};
	interface.extend(installed, replaced, Rc::clone(&registry));
	info!("Installed commit interceptor.");
	registry
}

/// Installs onto `interface` iff `enablement` says so.
///
/// # Errors
///
/// Iff enabled but `interface` is [`None`].
pub fn install_if_enabled(interface: Option<&InstrumentationInterface>, enablement: Enablement, config: HookConfig) -> Result<Option<Rc<Registry>>, InstallError> {
	if !enablement.is_enabled() {
		debug!("Disabled. Not installing.");
		return Ok(None);
	}
	let interface = interface.ok_or(InstallError::MissingInterface)?;
	Ok(Some(install(interface, config)))
}

/// Installs onto this thread's global interface if the current location enables it.
///
/// Enablement is read from the location only once per thread; see [`Enablement::current`].
///
/// # Errors
///
/// Iff enabled but no global interface has been [provided](`InstrumentationInterface::provide_global`).
pub fn install_global(config: HookConfig) -> Result<Option<Rc<Registry>>, InstallError> {
	let enablement = Enablement::current(&config);
	let interface = InstrumentationInterface::global();
	install_if_enabled(interface.as_deref(), enablement, config)
}

/// Removes the installation from `interface`, restoring the callbacks it replaced.
///
/// Returns `false` iff nothing was installed.
pub fn uninstall(interface: &InstrumentationInterface) -> bool {
	let uninstalled = interface.uninstall();
	if !uninstalled {
		debug!("Nothing to uninstall.");
	}
	uninstalled
}
