//! The repair engine ties storage, notifications and the workflow handlers
//! together behind one handle that the HTTP layer shares across requests.

use crate::handlers::{
	EvidenceHandler, OrderHandler, PartyHandler, PaymentHandler, QuoteHandler, ReportHandler,
};
use crate::otp::OtpGenerator;
use crate::state::OrderStateMachine;
use repair_config::Config;
use repair_notify::NotificationService;
use repair_storage::StorageService;
use std::sync::Arc;

/// Main engine exposing every workflow operation.
#[derive(Clone)]
pub struct RepairEngine {
	/// Service configuration.
	config: Config,
	/// Storage service for persisting orders and parties.
	storage: Arc<StorageService>,
	/// Fan-out to the configured notification sinks.
	notifications: Arc<NotificationService>,
	/// Order state machine shared by all handlers.
	state_machine: Arc<OrderStateMachine>,
	orders: Arc<OrderHandler>,
	quotes: Arc<QuoteHandler>,
	payments: Arc<PaymentHandler>,
	evidence: Arc<EvidenceHandler>,
	parties: Arc<PartyHandler>,
	reports: Arc<ReportHandler>,
}

impl RepairEngine {
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		notifications: Arc<NotificationService>,
		otp: Arc<dyn OtpGenerator>,
	) -> Self {
		let state_machine = Arc::new(OrderStateMachine::new(storage.clone()));
		let parties = Arc::new(PartyHandler::new(
			storage.clone(),
			config.service.default_rider_name.clone(),
		));

		let orders = Arc::new(OrderHandler::new(
			state_machine.clone(),
			parties.clone(),
			otp,
			notifications.clone(),
		));
		let quotes = Arc::new(QuoteHandler::new(state_machine.clone()));
		let payments = Arc::new(PaymentHandler::new(state_machine.clone()));
		let evidence = Arc::new(EvidenceHandler::new(state_machine.clone()));
		let reports = Arc::new(ReportHandler::new(state_machine.clone(), parties.clone()));

		Self {
			config,
			storage,
			notifications,
			state_machine,
			orders,
			quotes,
			payments,
			evidence,
			parties,
			reports,
		}
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	pub fn notifications(&self) -> &Arc<NotificationService> {
		&self.notifications
	}

	pub fn state_machine(&self) -> &Arc<OrderStateMachine> {
		&self.state_machine
	}

	pub fn orders(&self) -> &Arc<OrderHandler> {
		&self.orders
	}

	pub fn quotes(&self) -> &Arc<QuoteHandler> {
		&self.quotes
	}

	pub fn payments(&self) -> &Arc<PaymentHandler> {
		&self.payments
	}

	pub fn evidence(&self) -> &Arc<EvidenceHandler> {
		&self.evidence
	}

	pub fn parties(&self) -> &Arc<PartyHandler> {
		&self.parties
	}

	pub fn reports(&self) -> &Arc<ReportHandler> {
		&self.reports
	}
}
