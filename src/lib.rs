#![doc(html_root_url = "https://docs.rs/canvas-hook/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod error;
pub mod hook;
pub mod install;
pub mod intercept;
pub mod js;
pub mod mount;
pub mod props;
pub mod registry;
pub mod traverse;
pub mod tree;

pub use config::{Enablement, HookConfig};
pub use error::{DisposeError, InstallError};
pub use hook::{CommitEvent, InstrumentationInterface, UnmountEvent};
pub use install::{install, install_global, install_if_enabled, uninstall};
pub use registry::Registry;
