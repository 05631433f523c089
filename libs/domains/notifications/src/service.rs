//! Notification service: the four orchestration flows.
//!
//! Each flow resolves its recipients, then for every recipient checks the
//! settings gate, renders the template and dispatches. Per-recipient work is
//! isolated; one failed send never stops the others.

use std::sync::Arc;

use chrono::DateTime;
use core_config::{ConfigError, FromEnv, env_flag, env_or_default, env_parse_or};
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::dispatcher::{DeliveryOutcome, Dispatcher};
use crate::error::NotificationResult;
use crate::models::{
    DeliveryMetadata, DeliveryRecord, EventRecord, InvoiceRecord, Recipient, TemplateKind, UserRecord,
};
use crate::processor::{EscapePolicy, TemplateProcessor};
use crate::providers::EmailProvider;
use crate::recipients::{RecipientResolver, RecipientScope};
use crate::repository::{DeliveryLog, Directory, SettingsStore};
use crate::settings::SettingsGate;
use crate::templates::{TemplateField, TemplateVars};

/// Configuration for the notification service.
#[derive(Debug, Clone)]
pub struct NotificationServiceConfig {
    /// Daycare name shown in subjects and footers.
    pub daycare_name: String,
    /// Base URL for dashboard links.
    pub frontend_url: String,
    /// Recipients processed at once within a flow. 1 is strictly sequential.
    pub max_concurrent_sends: usize,
    /// How substituted values are written into HTML bodies.
    pub escape_policy: EscapePolicy,
}

impl Default for NotificationServiceConfig {
    fn default() -> Self {
        Self {
            daycare_name: TemplateField::DaycareName.default_value().to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            max_concurrent_sends: 1,
            escape_policy: EscapePolicy::Html,
        }
    }
}

impl FromEnv for NotificationServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let max_concurrent_sends: usize = env_parse_or("NOTIFY_MAX_CONCURRENT_SENDS", defaults.max_concurrent_sends)?;
        let escape_policy = if env_flag("NOTIFY_ESCAPE_HTML", true) {
            EscapePolicy::Html
        } else {
            EscapePolicy::Trusted
        };

        Ok(Self {
            daycare_name: env_or_default("DAYCARE_NAME", &defaults.daycare_name),
            frontend_url: env_or_default("FRONTEND_URL", &defaults.frontend_url),
            max_concurrent_sends: max_concurrent_sends.max(1),
            escape_policy,
        })
    }
}

impl NotificationServiceConfig {
    fn dashboard_url(&self, path: &str) -> String {
        format!("{}/{}", self.frontend_url.trim_end_matches('/'), path)
    }
}

/// Summary of one flow, rendered as the caller's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowReport {
    pub kind: TemplateKind,
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl FlowReport {
    fn new(kind: TemplateKind) -> Self {
        Self {
            kind,
            recipients: 0,
            sent: 0,
            failed: 0,
            skipped: 0,
        }
    }
}

impl std::fmt::Display for FlowReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sent, {} failed, {} skipped", self.sent, self.failed, self.skipped)
    }
}

enum Step {
    Skipped,
    Delivered(DeliveryOutcome),
}

/// Service for sending daycare notifications.
///
/// Built once at start-up and shared by reference.
pub struct NotificationService {
    resolver: RecipientResolver,
    gate: SettingsGate,
    processor: TemplateProcessor,
    dispatcher: Dispatcher,
    log: Arc<dyn DeliveryLog>,
    config: NotificationServiceConfig,
}

impl NotificationService {
    /// Create a new notification service.
    pub fn new(
        directory: Arc<dyn Directory>,
        settings: Arc<dyn SettingsStore>,
        log: Arc<dyn DeliveryLog>,
        provider: Arc<dyn EmailProvider>,
        config: NotificationServiceConfig,
    ) -> Self {
        debug!(
            provider = provider.name(),
            max_concurrent_sends = config.max_concurrent_sends,
            escape_policy = ?config.escape_policy,
            "Creating notification service"
        );

        Self {
            resolver: RecipientResolver::new(directory),
            gate: SettingsGate::new(settings),
            processor: TemplateProcessor::new(config.escape_policy),
            dispatcher: Dispatcher::new(provider, log.clone()),
            log,
            config,
        }
    }

    /// Tell every admin about a new event.
    pub async fn notify_admins_new_event(&self, event: &EventRecord) -> NotificationResult<FlowReport> {
        let kind = TemplateKind::AdminEvent;
        let recipients = self.resolve(kind, &RecipientScope::AllAdmins).await?;
        let base = self.event_vars(event).set(TemplateField::DashboardUrl, self.config.dashboard_url("admin/dashboard"));

        let report = self
            .fan_out(kind, recipients, event.id.clone(), |recipient| {
                base.clone()
                    .set_opt(TemplateField::AdminName, recipient.user.display_name.as_deref())
            })
            .await;

        info!(kind = %kind, event_id = ?event.id, %report, "Admin event notifications finished");
        Ok(report)
    }

    /// Tell parents about a new event, scoped by the event's group.
    pub async fn notify_parents_new_event(&self, event: &EventRecord) -> NotificationResult<FlowReport> {
        let kind = TemplateKind::ParentEvent;
        let scope = RecipientScope::for_event_group(event.group.as_deref());
        let recipients = self.resolve(kind, &scope).await?;
        let base = self
            .event_vars(event)
            .set(TemplateField::DashboardUrl, self.config.dashboard_url("parent/dashboard"));

        let report = self
            .fan_out(kind, recipients, event.id.clone(), |recipient| {
                let children = (!recipient.child_names.is_empty()).then(|| recipient.child_names.join(" & "));
                base.clone()
                    .set_opt(TemplateField::ParentName, recipient.user.display_name.as_deref())
                    .set_opt(TemplateField::ChildName, children)
            })
            .await;

        info!(kind = %kind, event_id = ?event.id, scope = %scope, %report, "Parent event notifications finished");
        Ok(report)
    }

    /// Tell the invoiced parent about a new invoice.
    pub async fn notify_parent_new_invoice(&self, invoice: &InvoiceRecord, parent: &UserRecord) -> FlowReport {
        let kind = TemplateKind::NewInvoice;
        let vars = self.invoice_vars(invoice, parent);
        let report = self
            .fan_out(kind, vec![Recipient::from(parent.clone())], invoice.id.clone(), |_| vars.clone())
            .await;

        info!(kind = %kind, invoice_id = ?invoice.id, parent = %parent.uid, %report, "Invoice notification finished");
        report
    }

    /// Tell the invoiced parent their payment was received.
    pub async fn notify_parent_invoice_paid(&self, invoice: &InvoiceRecord, parent: &UserRecord) -> FlowReport {
        let kind = TemplateKind::InvoicePaid;
        let vars = self
            .invoice_vars(invoice, parent)
            .set_opt(TemplateField::PaidDate, invoice.paid_at.as_deref().map(format_paid_at));
        let report = self
            .fan_out(kind, vec![Recipient::from(parent.clone())], invoice.id.clone(), |_| vars.clone())
            .await;

        info!(kind = %kind, invoice_id = ?invoice.id, parent = %parent.uid, %report, "Payment notification finished");
        report
    }

    /// Look up an invoiced parent by uid.
    pub async fn find_parent(&self, parent_id: &str) -> NotificationResult<UserRecord> {
        self.resolver.parent(parent_id).await
    }

    /// Most recent delivery records for an address.
    pub async fn delivery_history(&self, email: &str, limit: usize) -> NotificationResult<Vec<DeliveryRecord>> {
        self.log.list_for_recipient(email, limit).await
    }

    /// Check the configured transport.
    pub async fn health_check(&self) -> NotificationResult<bool> {
        self.dispatcher.health_check().await
    }

    async fn resolve(&self, kind: TemplateKind, scope: &RecipientScope) -> NotificationResult<Vec<Recipient>> {
        self.resolver.resolve(scope).await.map_err(|err| {
            error!(kind = %kind, scope = %scope, error = %err, "Recipient resolution failed, aborting flow");
            err
        })
    }

    fn event_vars(&self, event: &EventRecord) -> TemplateVars {
        TemplateVars::new()
            .set(TemplateField::DaycareName, &self.config.daycare_name)
            .set_opt(TemplateField::EventTitle, event.title.as_deref())
            .set_opt(TemplateField::EventDate, event.date.as_deref())
            .set_opt(TemplateField::EventTime, event.time.as_deref())
            .set_opt(TemplateField::EventGroup, event.group.as_deref())
            .set_opt(TemplateField::EventDescription, event.description.as_deref())
    }

    fn invoice_vars(&self, invoice: &InvoiceRecord, parent: &UserRecord) -> TemplateVars {
        let parent_name = invoice
            .parent_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(parent.display_name.as_deref());

        TemplateVars::new()
            .set(TemplateField::DaycareName, &self.config.daycare_name)
            .set(TemplateField::DashboardUrl, self.config.dashboard_url("parent/invoices"))
            .set_opt(TemplateField::ParentName, parent_name)
            .set_opt(TemplateField::ChildName, invoice.child_name.as_deref())
            .set_opt(TemplateField::InvoiceNo, invoice.invoice_no.as_deref())
            .set_opt(TemplateField::TotalAmount, invoice.total_amount.map(|a| format!("{:.2}", a)))
            .set_opt(TemplateField::DueDate, invoice.due_date.as_deref())
            .set_opt(TemplateField::InvoiceStatus, invoice.status.as_deref().map(str::to_uppercase))
    }

    /// Gate, render and dispatch for every recipient, at most
    /// `max_concurrent_sends` at a time. Results keep recipient order.
    async fn fan_out<F>(
        &self,
        kind: TemplateKind,
        recipients: Vec<Recipient>,
        related_id: Option<String>,
        vars_for: F,
    ) -> FlowReport
    where
        F: Fn(&Recipient) -> TemplateVars,
    {
        let mut report = FlowReport::new(kind);
        report.recipients = recipients.len();
        let limit = self.config.max_concurrent_sends.max(1);
        let vars_for = &vars_for;
        let related_id = &related_id;

        let steps: Vec<Step> = futures::stream::iter(recipients)
            .map(|recipient| async move {
                if recipient.user.email.trim().is_empty() {
                    warn!(uid = %recipient.user.uid, kind = %kind, "Recipient has no email address, skipping");
                    return Step::Skipped;
                }
                if !self.gate.is_enabled(&recipient.user.uid, kind.category()).await {
                    return Step::Skipped;
                }

                let email = self.processor.render(kind, &vars_for(&recipient));
                let metadata = DeliveryMetadata::new(kind, related_id.clone());
                Step::Delivered(self.dispatcher.dispatch(&recipient.user, email, metadata).await)
            })
            .buffered(limit)
            .collect()
            .await;

        for step in steps {
            match step {
                Step::Skipped => report.skipped += 1,
                Step::Delivered(DeliveryOutcome::Sent { .. }) => report.sent += 1,
                Step::Delivered(DeliveryOutcome::Failed { .. }) => report.failed += 1,
            }
        }

        report
    }
}

/// `paidAt` as a calendar date when it is an RFC 3339 timestamp.
fn format_paid_at(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::models::{ChildRecord, DeliveryStatus, NotificationSettings, Role};
    use crate::providers::MockEmailProvider;
    use crate::repository::{
        InMemoryDeliveryLog, InMemoryDirectory, InMemorySettingsStore, MockDirectory, MockSettingsStore,
    };

    struct Harness {
        service: NotificationService,
        provider: Arc<MockEmailProvider>,
        log: Arc<InMemoryDeliveryLog>,
    }

    fn harness(directory: Arc<dyn Directory>, settings: Arc<dyn SettingsStore>, provider: MockEmailProvider) -> Harness {
        let provider = Arc::new(provider);
        let log = Arc::new(InMemoryDeliveryLog::new());
        let config = NotificationServiceConfig {
            daycare_name: "Little Acorns".to_string(),
            frontend_url: "https://acorns.test/".to_string(),
            ..Default::default()
        };
        let service = NotificationService::new(directory, settings, log.clone(), provider.clone(), config);
        Harness { service, provider, log }
    }

    fn invoice() -> InvoiceRecord {
        InvoiceRecord {
            id: Some("inv-1".to_string()),
            invoice_no: Some("INV-1".to_string()),
            total_amount: Some(100.0),
            due_date: Some("2025-06-01".to_string()),
            status: Some("pending".to_string()),
            parent_id: Some("u1".to_string()),
            ..Default::default()
        }
    }

    fn parent() -> UserRecord {
        UserRecord::new("u1", "p@x.com", Role::Parent)
    }

    #[test]
    fn test_report_status_line() {
        let report = FlowReport {
            kind: TemplateKind::ParentEvent,
            recipients: 6,
            sent: 3,
            failed: 1,
            skipped: 2,
        };
        assert_eq!(report.to_string(), "3 sent, 1 failed, 2 skipped");
    }

    #[test]
    fn test_format_paid_at() {
        assert_eq!(format_paid_at("2025-06-03T14:22:00Z"), "2025-06-03");
        assert_eq!(format_paid_at("June 3rd"), "June 3rd");
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("DAYCARE_NAME", Some("Little Acorns")),
                ("FRONTEND_URL", None),
                ("NOTIFY_MAX_CONCURRENT_SENDS", Some("0")),
                ("NOTIFY_ESCAPE_HTML", Some("false")),
            ],
            || {
                let config = NotificationServiceConfig::from_env().unwrap();
                assert_eq!(config.daycare_name, "Little Acorns");
                assert_eq!(config.frontend_url, "http://localhost:3000");
                assert_eq!(config.max_concurrent_sends, 1);
                assert_eq!(config.escape_policy, EscapePolicy::Trusted);
            },
        );
    }

    #[tokio::test]
    async fn test_new_invoice_renders_amount_and_status() {
        let h = harness(
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemorySettingsStore::new()),
            MockEmailProvider::new(),
        );

        let report = h.service.notify_parent_new_invoice(&invoice(), &parent()).await;

        assert_eq!(report.sent, 1);
        let sent = h.provider.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("INV-1"));
        assert!(sent[0].html_body.contains("$100.00"));
        assert!(sent[0].html_body.contains("PENDING"));
        assert!(sent[0].html_body.contains("https://acorns.test/parent/invoices"));

        let records = h.log.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DeliveryStatus::Sent);
        assert_eq!(records[0].metadata.kind, TemplateKind::NewInvoice);
        assert_eq!(records[0].metadata.related_id.as_deref(), Some("inv-1"));
    }

    #[tokio::test]
    async fn test_paid_invoice_formats_paid_date() {
        let h = harness(
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemorySettingsStore::new()),
            MockEmailProvider::new(),
        );
        let paid = InvoiceRecord {
            status: Some("paid".to_string()),
            paid_at: Some("2025-06-03T09:00:00+02:00".to_string()),
            parent_name: Some("Pat".to_string()),
            ..invoice()
        };

        let report = h.service.notify_parent_invoice_paid(&paid, &parent()).await;

        assert_eq!(report.sent, 1);
        let sent = h.provider.sent_emails().await;
        assert_eq!(sent[0].subject, "Payment Received for Invoice INV-1");
        assert!(sent[0].html_body.contains("2025-06-03"));
        assert!(sent[0].html_body.contains("Pat"));
    }

    #[tokio::test]
    async fn test_opted_out_parent_is_skipped_without_record() {
        let settings = InMemorySettingsStore::new();
        settings
            .set(
                "u1",
                NotificationSettings {
                    notify_on_invoices: false,
                    ..Default::default()
                },
            )
            .await;
        let h = harness(Arc::new(InMemoryDirectory::new()), Arc::new(settings), MockEmailProvider::new());

        let report = h.service.notify_parent_new_invoice(&invoice(), &parent()).await;

        assert_eq!(report.skipped, 1);
        assert_eq!(h.provider.sent_count().await, 0);
        assert!(h.log.is_empty().await);
    }

    #[tokio::test]
    async fn test_settings_failure_skips_without_record() {
        let mut settings = MockSettingsStore::new();
        settings
            .expect_get_settings()
            .returning(|_| Err(NotificationError::StoreError("deadline exceeded".to_string())));
        let h = harness(Arc::new(InMemoryDirectory::new()), Arc::new(settings), MockEmailProvider::new());

        let report = h.service.notify_parent_invoice_paid(&invoice(), &parent()).await;

        assert_eq!(report.skipped, 1);
        assert_eq!(h.provider.sent_count().await, 0);
        assert!(h.log.is_empty().await);
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_not_raised() {
        let h = harness(
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemorySettingsStore::new()),
            MockEmailProvider::failing("quota exceeded"),
        );

        let report = h.service.notify_parent_new_invoice(&invoice(), &parent()).await;

        assert_eq!(report.to_string(), "0 sent, 1 failed, 0 skipped");
        let records = h.log.records().await;
        assert_eq!(records[0].status, DeliveryStatus::Failed);
        assert_eq!(records[0].error.as_deref(), Some("quota exceeded"));
    }

    #[tokio::test]
    async fn test_admin_event_goes_to_every_admin() {
        let directory = InMemoryDirectory::with_users(vec![
            UserRecord::new("a1", "a1@x.com", Role::Admin).with_name("Alex"),
            UserRecord::new("a2", "a2@x.com", Role::Admin),
            UserRecord::new("p1", "p1@x.com", Role::Parent),
        ]);
        let h = harness(
            Arc::new(directory),
            Arc::new(InMemorySettingsStore::new()),
            MockEmailProvider::new(),
        );
        let event = EventRecord {
            id: Some("ev-1".to_string()),
            title: Some("Pajama Day".to_string()),
            ..Default::default()
        };

        let report = h.service.notify_admins_new_event(&event).await.unwrap();

        assert_eq!(report.recipients, 2);
        assert_eq!(report.sent, 2);
        let sent = h.provider.sent_emails().await;
        assert_eq!(sent[0].subject, "New Event Created: Pajama Day");
        assert!(sent[0].html_body.contains("Alex"));
        assert!(sent[1].html_body.contains("Admin"));
        assert!(!h.provider.was_sent_to("p1@x.com").await);
    }

    #[tokio::test]
    async fn test_group_event_personalises_child_names() {
        let directory = InMemoryDirectory::with_users(vec![
            UserRecord::new("p1", "p1@x.com", Role::Parent).with_name("Pat"),
            UserRecord::new("p2", "p2@x.com", Role::Parent),
        ])
        .with_children(vec![
            ChildRecord::new("c1", "Mia", "Toddler", "p1"),
            ChildRecord::new("c2", "Noah", "Toddler", "p1"),
            ChildRecord::new("c3", "Leo", "Infant", "p2"),
        ]);
        let h = harness(
            Arc::new(directory),
            Arc::new(InMemorySettingsStore::new()),
            MockEmailProvider::new(),
        );
        let event = EventRecord {
            title: Some("Music Class".to_string()),
            group: Some("Toddler".to_string()),
            ..Default::default()
        };

        let report = h.service.notify_parents_new_event(&event).await.unwrap();

        assert_eq!(report.sent, 1);
        let sent = h.provider.sent_emails().await;
        assert_eq!(sent[0].to_email, "p1@x.com");
        assert!(sent[0].html_body.contains("Mia &amp; Noah"));
    }

    #[tokio::test]
    async fn test_resolution_failure_aborts_flow() {
        let mut directory = MockDirectory::new();
        directory
            .expect_users_by_role()
            .returning(|_| Err(NotificationError::StoreError("unavailable".to_string())));
        let h = harness(
            Arc::new(directory),
            Arc::new(InMemorySettingsStore::new()),
            MockEmailProvider::new(),
        );

        let result = h.service.notify_parents_new_event(&EventRecord::default()).await;

        assert!(result.is_err());
        assert_eq!(h.provider.sent_count().await, 0);
        assert!(h.log.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_fan_out_keeps_counts() {
        let users = (0..12)
            .map(|i| UserRecord::new(format!("p{i}"), format!("p{i}@x.com"), Role::Parent))
            .collect();
        let settings = InMemorySettingsStore::new();
        settings
            .set(
                "p3",
                NotificationSettings {
                    notify_on_events: false,
                    ..Default::default()
                },
            )
            .await;
        let provider = Arc::new(MockEmailProvider::new());
        let log = Arc::new(InMemoryDeliveryLog::new());
        let config = NotificationServiceConfig {
            max_concurrent_sends: 4,
            ..Default::default()
        };
        let service = NotificationService::new(
            Arc::new(InMemoryDirectory::with_users(users)),
            Arc::new(settings),
            log.clone(),
            provider.clone(),
            config,
        );

        let report = service.notify_parents_new_event(&EventRecord::default()).await.unwrap();

        assert_eq!(report.recipients, 12);
        assert_eq!(report.sent, 11);
        assert_eq!(report.skipped, 1);
        assert_eq!(log.len().await, 11);
    }
}
