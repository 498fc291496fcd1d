//! Marker names and the enablement flag.

use core::cell::RefCell;
use hashbrown::HashMap;
use tracing::{debug, instrument};

/// Names shared with the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
	/// Props key carrying a node's stable numeric identity.
	pub identity_prop: String,
	/// Props key carrying a node's zero-argument disposal callback.
	pub dispose_prop: String,
	/// `id` of the element that marks a document as an editor canvas.
	pub container_element_id: String,
	/// Query parameter that enables installation.
	pub enable_flag: String,
}
impl Default for HookConfig {
	fn default() -> Self {
		Self {
			identity_prop: "data-canvas-node-id".to_owned(),
			dispose_prop: "data-canvas-on-dispose".to_owned(),
			container_element_id: "canvas-app".to_owned(),
			enable_flag: "canvasHook".to_owned(),
		}
	}
}

/// Whether instrumentation should be installed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enablement {
	Enabled,
	Disabled,
}
impl Enablement {
	#[must_use]
	pub fn is_enabled(self) -> bool {
		self == Self::Enabled
	}

	/// Looks for `flag` in a location's `search` string, falling back to a query embedded in its `hash`.
	///
	/// The hash may either be a query itself (`#flag&other=1`) or carry one after a path (`#/frame?flag`).
	/// A present flag enables unless its value is `0` or `false`.
	///
	/// In browsers, keys and values are percent-decoded (and `+` read as space) through `URLSearchParams`.
	/// Elsewhere they are compared as-is.
	#[must_use]
	pub fn from_location_parts(search: &str, hash: &str, flag: &str) -> Self {
		let hash = hash.strip_prefix('#').unwrap_or(hash);
		let hash_query = match hash.find('?') {
			Some(i) => &hash[i + 1..],
			None => hash,
		};

		match query_value(search.strip_prefix('?').unwrap_or(search), flag).or_else(|| query_value(hash_query, flag)).as_deref() {
			Some("0") | Some("false") => Self::Disabled,
			Some(_) => Self::Enabled,
			None => Self::Disabled,
		}
	}

	/// Reads the current location once per thread and [`HookConfig::enable_flag`].
	/// Later calls with the same flag name return the first result, even if the location changed since.
	///
	/// Outside a browser window, this is always [`Enablement::Disabled`].
	#[must_use]
	pub fn current(config: &HookConfig) -> Self {
		Self::cached(&config.enable_flag, || Self::read_location(config))
	}

	fn cached(flag: &str, read: impl FnOnce() -> Self) -> Self {
		thread_local! {
			static CURRENT: RefCell<HashMap<String, Enablement>> = RefCell::default();
		}
		if let Some(enablement) = CURRENT.with(|current| current.borrow().get(flag).copied()) {
			return enablement;
		}
		let enablement = read();
		CURRENT.with(|current| current.borrow_mut().insert(flag.to_owned(), enablement));
		enablement
	}

	#[cfg(target_arch = "wasm32")]
	#[instrument]
	fn read_location(config: &HookConfig) -> Self {
		let location = match web_sys::window() {
			Some(window) => window.location(),
			None => {
				debug!("No window. Staying disabled.");
				return Self::Disabled;
			}
		};
		let search = location.search().unwrap_or_default();
		let hash = location.hash().unwrap_or_default();
		let enablement = Self::from_location_parts(&search, &hash, &config.enable_flag);
		debug!(?enablement, "Read enablement from location.");
		enablement
	}

	#[cfg(not(target_arch = "wasm32"))]
	#[instrument]
	fn read_location(config: &HookConfig) -> Self {
		debug!(flag = %config.enable_flag, "No browser location on this target. Staying disabled.");
		Self::Disabled
	}
}

#[cfg(target_arch = "wasm32")]
fn query_value(query: &str, flag: &str) -> Option<String> {
	web_sys::UrlSearchParams::new_with_str(query).ok()?.get(flag)
}

#[cfg(not(target_arch = "wasm32"))]
fn query_value(query: &str, flag: &str) -> Option<String> {
	query.split('&').find_map(|pair| {
		let mut parts = pair.splitn(2, '=');
		match (parts.next(), parts.next()) {
			(Some(key), value) if key == flag => Some(value.unwrap_or("").to_owned()),
			_ => None,
		}
	})
}

#[cfg(test)]
mod tests {
	use super::Enablement::{self, Disabled, Enabled};

	#[test]
	fn search_flag() {
		assert_eq!(Enablement::from_location_parts("?canvasHook", "", "canvasHook"), Enabled);
		assert_eq!(Enablement::from_location_parts("?a=1&canvasHook=true", "", "canvasHook"), Enabled);
		assert_eq!(Enablement::from_location_parts("?canvasHook=false", "#canvasHook", "canvasHook"), Disabled);
		assert_eq!(Enablement::from_location_parts("?canvasHooks", "", "canvasHook"), Disabled);
		assert_eq!(Enablement::from_location_parts("", "", "canvasHook"), Disabled);
	}

	#[test]
	fn hash_fallback() {
		assert_eq!(Enablement::from_location_parts("", "#canvasHook&frame=3", "canvasHook"), Enabled);
		assert_eq!(Enablement::from_location_parts("?other", "#/frames/3?canvasHook=1", "canvasHook"), Enabled);
		assert_eq!(Enablement::from_location_parts("", "#/canvasHook", "canvasHook"), Disabled);
	}

	#[test]
	fn cache_is_per_flag() {
		assert_eq!(Enablement::cached("canvasHook", || Enabled), Enabled);
		assert_eq!(Enablement::cached("canvasHook", || Disabled), Enabled);
		assert_eq!(Enablement::cached("otherHook", || Disabled), Disabled);
		assert_eq!(Enablement::cached("otherHook", || unreachable!()), Disabled);
	}
}
