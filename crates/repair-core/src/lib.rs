//! Core of the racket repair service.
//!
//! Holds the order state machine and the workflow built on top of it:
//! submission with rider assignment, the OTP-gated handoff chain, quoting,
//! payment, evidence photos, duration summaries and vendor earnings. The
//! [`RepairEngine`] bundles these behind one shareable handle and the
//! [`RepairBuilder`] assembles it from configuration.

pub mod builder;
pub mod durations;
pub mod engine;
pub mod handlers;
pub mod otp;
pub mod state;

pub use builder::{BuilderError, RepairBuilder, RepairFactories};
pub use engine::RepairEngine;
pub use handlers::WorkflowError;
pub use otp::{OtpGenerator, RandomOtpGenerator};

#[cfg(test)]
pub(crate) mod testing {
	use crate::handlers::{
		EvidenceHandler, OrderHandler, PartyHandler, PaymentHandler, QuoteHandler, ReportHandler,
	};
	use crate::otp::testing::SequenceOtpGenerator;
	use crate::state::OrderStateMachine;
	use crate::RepairEngine;
	use async_trait::async_trait;
	use chrono::Utc;
	use repair_config::Config;
	use repair_notify::{NotificationError, NotificationInterface, NotificationService};
	use repair_storage::implementations::memory::MemoryStorage;
	use repair_storage::StorageService;
	use repair_types::{
		ConfigSchema, NewOrderRequest, NewRiderRequest, NewVendorRequest, Notification, Order,
		OrderStatus, PaymentStatus, QuoteStatus, Schema, ValidationError,
	};
	use std::sync::{Arc, Mutex};

	pub fn storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	/// A freshly submitted order with the given pickup code.
	pub fn sample_order(id: &str, pickup_otp: &str) -> Order {
		let now = Utc::now();
		Order {
			id: id.to_string(),
			customer_id: "customer-1".to_string(),
			vendor_id: "vendor-1".to_string(),
			rider_id: Some("rider-1".to_string()),
			status: OrderStatus::Pending,
			pickup_address: "Court 3, Riverside Club".to_string(),
			delivery_address: None,
			racket_details: Some("Broken string".to_string()),
			vendor_notes: None,
			racket_image: None,
			quote_amount: None,
			quote_status: QuoteStatus::None,
			price: None,
			payment_status: PaymentStatus::Pending,
			payment_reference: None,
			rider_pickup_otp: Some(pickup_otp.to_string()),
			rider_delivery_to_vendor_otp: None,
			vendor_handover_to_rider_otp: None,
			customer_return_otp: None,
			created_at: now,
			updated_at: now,
			service_timer_start: Some(now),
			rider_pickup_start_time: None,
			rider_delivery_to_vendor_time: None,
			vendor_service_start_time: None,
			vendor_service_end_time: None,
			rider_return_to_court_time: None,
			customer_completion_time: None,
			total_rider_time: None,
			total_vendor_time: None,
			total_service_time: None,
			pickup_evidence_image: None,
			delivery_to_vendor_evidence_image: None,
			service_complete_evidence_image: None,
			return_to_court_evidence_image: None,
			customer_pickup_evidence_image: None,
		}
	}

	/// Notification sink that keeps everything it receives.
	#[derive(Clone, Default)]
	pub struct RecordingSink {
		sent: Arc<Mutex<Vec<Notification>>>,
	}

	impl RecordingSink {
		pub fn sent(&self) -> Vec<Notification> {
			self.sent.lock().unwrap().clone()
		}
	}

	struct NoSchema;

	impl ConfigSchema for NoSchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	#[async_trait]
	impl NotificationInterface for RecordingSink {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(NoSchema)
		}

		async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
			self.sent.lock().unwrap().push(notification.clone());
			Ok(())
		}
	}

	pub struct Harness {
		pub state: Arc<OrderStateMachine>,
		pub orders: Arc<OrderHandler>,
		pub quotes: Arc<QuoteHandler>,
		pub payments: Arc<PaymentHandler>,
		pub evidence: Arc<EvidenceHandler>,
		pub parties: Arc<PartyHandler>,
		pub reports: Arc<ReportHandler>,
		pub sink: RecordingSink,
		pub vendor_id: String,
	}

	impl Harness {
		pub fn order_request(&self) -> NewOrderRequest {
			NewOrderRequest {
				customer_id: "customer-1".to_string(),
				vendor_id: self.vendor_id.clone(),
				pickup_address: "Court 3, Riverside Club".to_string(),
				delivery_address: None,
				racket_details: Some("Broken string".to_string()),
				racket_image: None,
				price: None,
			}
		}
	}

	/// An engine over memory storage with one vendor and one rider
	/// registered. OTPs are handed out from `codes` in order.
	pub async fn harness(codes: &[&str]) -> Harness {
		let config: Config = r#"
[service]
id = "test"

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();

		let sink = RecordingSink::default();
		let notifications = Arc::new(NotificationService::new(vec![(
			"recording".to_string(),
			Box::new(sink.clone()) as Box<dyn NotificationInterface>,
		)]));
		let engine = RepairEngine::new(
			config,
			storage(),
			notifications,
			Arc::new(SequenceOtpGenerator::new(codes)),
		);

		let vendor = engine
			.parties()
			.register_vendor(NewVendorRequest {
				name: "Strings & Co".to_string(),
				email: None,
				phone: None,
				address: Some("12 Court Rd".to_string()),
				shop_name: Some("Strings & Co".to_string()),
			})
			.await
			.unwrap();
		engine
			.parties()
			.register_rider(NewRiderRequest {
				name: "Asha".to_string(),
				email: None,
				phone: None,
				vehicle: Some("Bike".to_string()),
			})
			.await
			.unwrap();

		Harness {
			state: engine.state_machine().clone(),
			orders: engine.orders().clone(),
			quotes: engine.quotes().clone(),
			payments: engine.payments().clone(),
			evidence: engine.evidence().clone(),
			parties: engine.parties().clone(),
			reports: engine.reports().clone(),
			sink,
			vendor_id: vendor.id,
		}
	}
}
