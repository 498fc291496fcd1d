//! Opaque committed props and the typed marker sidecar read from them.

use crate::{config::HookConfig, error::DisposeError};
use core::{
	fmt::{self, Debug, Formatter},
	hash::{Hash, Hasher},
};
use hashbrown::HashMap;
use std::rc::Rc;

/// A zero-argument disposal callback, as smuggled through props.
pub type Disposer = Rc<dyn Fn() -> Result<(), DisposeError>>;

#[derive(Clone)]
pub enum PropValue {
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Callback(Disposer),
	/// Anything else the host may put into props (objects, arrays, elements…).
	Opaque,
}
impl Debug for PropValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("Null"),
			Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
			Self::Number(value) => f.debug_tuple("Number").field(value).finish(),
			Self::String(value) => f.debug_tuple("String").field(value).finish(),
			Self::Callback(callback) => f.debug_tuple("Callback").field(&Rc::as_ptr(callback)).finish(),
			Self::Opaque => f.write_str("Opaque"),
		}
	}
}
impl PropValue {
	/// Numeric value under ECMAScript `Number(value)` conversion.
	///
	/// Callbacks and opaque values convert to NaN.
	#[must_use]
	pub fn to_number(&self) -> f64 {
		match self {
			Self::Null => 0.0,
			Self::Bool(value) => f64::from(u8::from(*value)),
			Self::Number(value) => *value,
			Self::String(value) => string_to_number(value),
			Self::Callback(_) | Self::Opaque => f64::NAN,
		}
	}
}
impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}
impl From<i32> for PropValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}
impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}
impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

fn string_to_number(value: &str) -> f64 {
	let value = value.trim();
	if value.is_empty() {
		return 0.0;
	}

	for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)].iter() {
		if let Some(digits) = value.strip_prefix(*prefix) {
			return u64::from_str_radix(digits, *radix).map_or(f64::NAN, |n| n as f64);
		}
	}

	match value {
		"Infinity" | "+Infinity" => return f64::INFINITY,
		"-Infinity" => return f64::NEG_INFINITY,
		_ => (),
	}

	// Rust's float grammar also accepts "inf" and "NaN" spellings, which `Number(…)` doesn't.
	if value.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
		return f64::NAN;
	}
	value.parse().unwrap_or(f64::NAN)
}

/// A node's committed props: string keys to loosely typed values.
#[derive(Debug, Clone, Default)]
pub struct Props(HashMap<String, PropValue>);
impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Adds a disposal callback under `key`.
	#[must_use]
	pub fn with_disposer(self, key: impl Into<String>, on_dispose: impl 'static + Fn() -> Result<(), DisposeError>) -> Self {
		self.with(key, PropValue::Callback(Rc::new(on_dispose)))
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
		self.0.insert(key.into(), value.into())
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&PropValue> {
		self.0.get(key)
	}

	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}
}
impl<K: Into<String>, V: Into<PropValue>> core::iter::FromIterator<(K, V)> for Props {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// Registry key coerced from an identity marker.
///
/// Compares like *SameValueZero*: NaN equals NaN and `-0.0` equals `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct Identity(f64);
impl Identity {
	#[must_use]
	pub fn new(value: f64) -> Self {
		Self(value)
	}

	#[must_use]
	pub fn value(self) -> f64 {
		self.0
	}

	fn canonical_bits(self) -> u64 {
		if self.0.is_nan() {
			f64::NAN.to_bits()
		} else if self.0 == 0.0 {
			0
		} else {
			self.0.to_bits()
		}
	}
}
impl PartialEq for Identity {
	fn eq(&self, other: &Self) -> bool {
		self.canonical_bits() == other.canonical_bits()
	}
}
impl Eq for Identity {}
impl Hash for Identity {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.canonical_bits().hash(state)
	}
}
impl From<f64> for Identity {
	fn from(value: f64) -> Self {
		Self(value)
	}
}
impl From<u32> for Identity {
	fn from(value: u32) -> Self {
		Self(value.into())
	}
}
impl From<i32> for Identity {
	fn from(value: i32) -> Self {
		Self(value.into())
	}
}

/// The editor-facing capabilities found on one node, validated from its props.
#[derive(Clone, Default)]
pub struct Sidecar {
	pub identity: Option<Identity>,
	pub on_dispose: Option<Disposer>,
}
impl Sidecar {
	/// Reads both marker props named by `config`.
	///
	/// A present identity marker always yields an identity, coerced from whatever value it carries.
	/// The disposal marker only counts if it carries a callback.
	#[must_use]
	pub fn read(props: Option<&Props>, config: &HookConfig) -> Self {
		let props = match props {
			Some(props) => props,
			None => return Self::default(),
		};
		Self {
			identity: props.get(&config.identity_prop).map(|value| Identity(value.to_number())),
			on_dispose: match props.get(&config.dispose_prop) {
				Some(PropValue::Callback(callback)) => Some(Rc::clone(callback)),
				_ => None,
			},
		}
	}
}
impl Debug for Sidecar {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Sidecar")
			.field("identity", &self.identity)
			.field("on_dispose", &self.on_dispose.as_ref().map(Rc::as_ptr))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn number_coercion() {
		assert_eq!(PropValue::from("42").to_number(), 42.0);
		assert_eq!(PropValue::from("  7.5\n").to_number(), 7.5);
		assert_eq!(PropValue::from("").to_number(), 0.0);
		assert_eq!(PropValue::from("0x1F").to_number(), 31.0);
		assert_eq!(PropValue::from("-Infinity").to_number(), f64::NEG_INFINITY);
		assert!(PropValue::from("inf").to_number().is_nan());
		assert!(PropValue::from("12px").to_number().is_nan());
		assert_eq!(PropValue::from(true).to_number(), 1.0);
		assert_eq!(PropValue::Null.to_number(), 0.0);
		assert!(PropValue::Opaque.to_number().is_nan());
	}

	#[test]
	fn identity_same_value_zero() {
		assert_eq!(Identity::new(f64::NAN), Identity::new(-f64::NAN));
		assert_eq!(Identity::new(-0.0), Identity::new(0.0));
		assert_ne!(Identity::new(1.0), Identity::new(2.0));
	}
}
