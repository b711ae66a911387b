//! Registry trait for self-registering implementations.

/// Ties a pluggable backend to the name it is configured under.
///
/// Each backend module (storage, notifications) provides a `Registry` struct
/// implementing this trait so the service can build its factory maps from
/// the list of compiled-in implementations.
pub trait ImplementationRegistry {
	/// Key used in the TOML configuration, e.g. "memory" for
	/// `[storage.implementations.memory]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	fn factory() -> Self::Factory;
}
