//! Where a [`Root`](`crate::tree::Root`) is attached, and whether that place belongs to an editor canvas.

use core::fmt::Debug;
use tracing::{error, instrument};
use wasm_bindgen::JsCast;

/// A root's mount target (***containerInfo*** in the host runtime).
pub trait MountTarget: Debug {
	/// Whether the document owning this target (or this target, if it is a document) contains an element with the given `id`.
	///
	/// [`None`] iff no document is reachable from this target at all.
	fn document_has_element(&self, element_id: &str) -> Option<bool>;
}

impl MountTarget for web_sys::Node {
	#[instrument(skip(self))]
	fn document_has_element(&self, element_id: &str) -> Option<bool> {
		let document = match self.owner_document() {
			Some(document) => document,
			None => self.dyn_ref::<web_sys::Document>()?.clone(),
		};
		Some(document.get_element_by_id(element_id).is_some())
	}
}

impl MountTarget for web_sys::Element {
	fn document_has_element(&self, element_id: &str) -> Option<bool> {
		let node: &web_sys::Node = self.as_ref();
		node.document_has_element(element_id)
	}
}

impl MountTarget for web_sys::Document {
	fn document_has_element(&self, element_id: &str) -> Option<bool> {
		Some(self.get_element_by_id(element_id).is_some())
	}
}

/// Whether commits into `target` should be tracked.
///
/// Targets without any reachable document are logged and treated as out of scope.
pub(crate) fn is_canvas(target: &dyn MountTarget, element_id: &str) -> bool {
	match target.document_has_element(element_id) {
		Some(found) => found,
		None => {
			error!("Mount target {:?} has no owner document and isn't one itself. Treating it as out of scope.", target);
			false
		}
	}
}
