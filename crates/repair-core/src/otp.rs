//! One-time codes for physical handoffs.

use rand::Rng;

/// Source of 6-digit handoff codes.
pub trait OtpGenerator: Send + Sync {
	/// Returns a code in `100000..=999999`. Codes are not unique across orders.
	fn generate(&self) -> String;
}

/// Draws codes from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOtpGenerator;

impl OtpGenerator for RandomOtpGenerator {
	fn generate(&self) -> String {
		rand::rng().random_range(100_000u32..=999_999).to_string()
	}
}

/// Checks `candidate` against an OTP slot and clears the slot on a match.
///
/// An empty slot never matches, so a consumed code cannot be replayed.
pub fn consume(slot: &mut Option<String>, candidate: &str) -> bool {
	if slot.as_deref() == Some(candidate) {
		*slot = None;
		true
	} else {
		false
	}
}
