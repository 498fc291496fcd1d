//! Entry points for JavaScript: installation and read access to the registry for external readers.

use crate::{config::HookConfig, hook::InstrumentationInterface, install::install_global, props::Identity};
use js_sys::Float64Array;
use wasm_bindgen::{prelude::wasm_bindgen, throw_str};

/// Installs onto the global instrumentation interface if the page's location enables it.
///
/// Returns whether an installation is (now) present.
/// Throws if enabled but the host didn't provide the interface.
#[wasm_bindgen(js_name = installCanvasHook)]
#[must_use]
pub fn install_canvas_hook() -> bool {
	match install_global(HookConfig::default()) {
		Ok(registry) => registry.is_some(),
		Err(error) => throw_str(&error.to_string()),
	}
}

/// Index of the node last registered for `identity`, if any.
///
/// This is the node's position in the host's render-tree arena (`NodeId`), so it only means something to code that can
/// look nodes up in that tree. On its own it answers whether an identity is registered and whether two identities
/// currently resolve to the same node. The node may have unmounted since, as entries are never removed.
#[wasm_bindgen(js_name = canvasHookNodeFor)]
#[must_use]
pub fn canvas_hook_node_for(identity: f64) -> Option<u32> {
	InstrumentationInterface::global()?.registry()?.get(Identity::new(identity)).map(u32::from)
}

/// All currently registered identities.
///
/// Empty if nothing is installed.
#[wasm_bindgen(js_name = canvasHookIdentities)]
#[must_use]
pub fn canvas_hook_identities() -> Float64Array {
	let identities: Vec<f64> = InstrumentationInterface::global()
		.and_then(|interface| interface.registry())
		.map(|registry| registry.identities().into_iter().map(Identity::value).collect())
		.unwrap_or_default();
	Float64Array::from(identities.as_slice())
}
