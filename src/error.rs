use std::error::Error;
use thiserror::Error;

/// Raised by a disposal callback and handed back to whoever dispatched the unmount.
#[derive(Debug, Error)]
#[error("disposal callback failed: {source}")]
pub struct DisposeError {
	#[source]
	source: Box<dyn Error + 'static>,
}
impl DisposeError {
	pub fn new(source: impl Into<Box<dyn Error + 'static>>) -> Self {
		Self { source: source.into() }
	}

	#[must_use]
	pub fn into_inner(self) -> Box<dyn Error + 'static> {
		self.source
	}
}

#[derive(Debug, Error)]
pub enum InstallError {
	/// Installation was requested, but the host never provided the global instrumentation interface.
	#[error("the global instrumentation interface does not exist; the host runtime must provide it before installation")]
	MissingInterface,
}
