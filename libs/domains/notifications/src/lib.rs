//! Notifications Domain
//!
//! Email notifications for the daycare: admins and parents hear about new
//! events, parents hear about new and paid invoices.
//!
//! # Features
//!
//! - Four fixed HTML templates with `PLACEHOLDER_<NAME>` tokens
//! - Recipient resolution by role or by child group
//! - Per-user opt-out settings (fail-closed on lookup errors)
//! - One delivery record per send attempt, success or failure
//! - HTTP and SMTP transports
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Caller      │  ← event created / invoice created / invoice paid
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ NotificationSvc │  ← one flow per notification kind
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ RecipientResolv │  ← admins, all parents, or parents by child group
//! └────────┬────────┘
//!          │  per recipient
//! ┌────────▼────────┐
//! │  SettingsGate   │  ← notifyOnEvents / notifyOnInvoices / notifyOnPayments
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ TemplateProcess │  ← substitute placeholders, escape values
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Dispatcher    │  ← EmailProvider::send + DeliveryLog::record
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{
//!     NotificationService, NotificationServiceConfig,
//!     mongo::{MongoDeliveryLog, MongoDirectory, MongoSettingsStore},
//!     providers::HttpEmailProvider,
//! };
//!
//! let service = NotificationService::new(
//!     Arc::new(MongoDirectory::new(&db)),
//!     Arc::new(MongoSettingsStore::new(&db)),
//!     Arc::new(MongoDeliveryLog::new(&db)),
//!     Arc::new(HttpEmailProvider::from_env()?),
//!     NotificationServiceConfig::from_env()?,
//! );
//!
//! let report = service.notify_parent_new_invoice(&invoice, &parent).await;
//! println!("{report}");
//! ```

pub mod dispatcher;
pub mod error;
pub mod models;
pub mod mongo;
pub mod processor;
pub mod providers;
pub mod recipients;
pub mod repository;
pub mod service;
pub mod settings;
pub mod templates;

// Re-export commonly used types
pub use dispatcher::{DeliveryOutcome, Dispatcher};
pub use error::{NotificationError, NotificationResult};
pub use models::{
    ChildRecord, DeliveryMetadata, DeliveryRecord, DeliveryStatus, EventRecord, InvoiceRecord,
    NotificationCategory, NotificationSettings, Recipient, Role, TemplateKind, UserRecord,
};
pub use processor::{EscapePolicy, RenderedEmail, TemplateProcessor};
pub use providers::{EmailProvider, HttpEmailProvider, MockEmailProvider, SmtpProvider};
pub use recipients::{RecipientResolver, RecipientScope};
pub use repository::{
    DeliveryLog, Directory, InMemoryDeliveryLog, InMemoryDirectory, InMemorySettingsStore, SettingsStore,
};
pub use service::{FlowReport, NotificationService, NotificationServiceConfig};
pub use settings::SettingsGate;
pub use templates::{TemplateField, TemplateRegistry, TemplateVars};
