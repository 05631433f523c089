//! Data models for the notifications domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Notification kinds
// ============================================================================

/// The four notifications the daycare sends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// New event, sent to every admin.
    AdminEvent,
    /// New event, sent to parents (all, or by child group).
    ParentEvent,
    /// New invoice, sent to the invoiced parent.
    NewInvoice,
    /// Invoice paid, sent to the invoiced parent.
    InvoicePaid,
}

impl TemplateKind {
    /// The opt-out category a recipient's settings are checked against.
    pub fn category(&self) -> NotificationCategory {
        match self {
            TemplateKind::AdminEvent | TemplateKind::ParentEvent => NotificationCategory::Events,
            TemplateKind::NewInvoice => NotificationCategory::Invoices,
            TemplateKind::InvoicePaid => NotificationCategory::Payments,
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::AdminEvent => write!(f, "admin_event"),
            TemplateKind::ParentEvent => write!(f, "parent_event"),
            TemplateKind::NewInvoice => write!(f, "new_invoice"),
            TemplateKind::InvoicePaid => write!(f, "invoice_paid"),
        }
    }
}

/// Categories a user can opt out of.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Events,
    Invoices,
    Payments,
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationCategory::Events => write!(f, "events"),
            NotificationCategory::Invoices => write!(f, "invoices"),
            NotificationCategory::Payments => write!(f, "payments"),
        }
    }
}

// ============================================================================
// Directory records (users, children, settings)
// ============================================================================

/// Role of an application user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Parent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Parent => write!(f, "parent"),
        }
    }
}

/// A user document from the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
}

impl UserRecord {
    pub fn new(uid: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: None,
            role,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// A child document from the `children` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub id: String,
    pub name: String,
    pub group: String,
    pub parent_id: String,
}

impl ChildRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        group: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group: group.into(),
            parent_id: parent_id.into(),
        }
    }
}

/// A resolved notification recipient.
///
/// `child_names` is filled for group-scoped parent events with the names of
/// this parent's children in the targeted groups; it is empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub user: UserRecord,
    pub child_names: Vec<String>,
}

impl Recipient {
    pub fn with_children(user: UserRecord, child_names: Vec<String>) -> Self {
        Self { user, child_names }
    }
}

impl From<UserRecord> for Recipient {
    fn from(user: UserRecord) -> Self {
        Self {
            user,
            child_names: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-user notification settings (opt-out model: every flag defaults to on).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub notify_on_events: bool,
    #[serde(default = "default_true")]
    pub notify_on_invoices: bool,
    #[serde(default = "default_true")]
    pub notify_on_payments: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            notify_on_events: true,
            notify_on_invoices: true,
            notify_on_payments: true,
        }
    }
}

impl NotificationSettings {
    /// Check if a category is enabled.
    pub fn is_enabled(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::Events => self.notify_on_events,
            NotificationCategory::Invoices => self.notify_on_invoices,
            NotificationCategory::Payments => self.notify_on_payments,
        }
    }
}

// ============================================================================
// Caller-supplied entities
// ============================================================================

/// An event as stored by the scheduling side of the app.
///
/// Every field is optional; missing values fall back to template defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    /// "All", "All Groups", a single group name or a comma-separated list.
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An invoice as stored by the billing side of the app.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub invoice_no: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub child_name: Option<String>,
    /// RFC 3339 timestamp or a plain date.
    #[serde(default)]
    pub paid_at: Option<String>,
}

// ============================================================================
// Delivery log
// ============================================================================

/// Outcome recorded for a send attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What a delivery was about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMetadata {
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
}

impl DeliveryMetadata {
    pub fn new(kind: TemplateKind, related_id: Option<String>) -> Self {
        Self { kind, related_id }
    }
}

/// Append-only audit entry, one per attempted send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub id: Uuid,
    pub recipient_id: String,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub metadata: DeliveryMetadata,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryRecord {
    fn base(
        recipient: &UserRecord,
        subject: String,
        body: String,
        metadata: DeliveryMetadata,
        status: DeliveryStatus,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            recipient_id: recipient.uid.clone(),
            recipient_email: recipient.email.clone(),
            subject,
            body,
            metadata,
            status,
            message_id: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Record for a message the transport accepted.
    pub fn sent(
        recipient: &UserRecord,
        subject: String,
        body: String,
        metadata: DeliveryMetadata,
        message_id: Option<String>,
    ) -> Self {
        Self {
            message_id,
            ..Self::base(recipient, subject, body, metadata, DeliveryStatus::Sent)
        }
    }

    /// Record for a message the transport failed to deliver.
    pub fn failed(
        recipient: &UserRecord,
        subject: String,
        body: String,
        metadata: DeliveryMetadata,
        error: String,
    ) -> Self {
        Self {
            error: Some(error),
            ..Self::base(recipient, subject, body, metadata, DeliveryStatus::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_categories() {
        assert_eq!(TemplateKind::AdminEvent.category(), NotificationCategory::Events);
        assert_eq!(TemplateKind::ParentEvent.category(), NotificationCategory::Events);
        assert_eq!(TemplateKind::NewInvoice.category(), NotificationCategory::Invoices);
        assert_eq!(TemplateKind::InvoicePaid.category(), NotificationCategory::Payments);
    }

    #[test]
    fn test_settings_missing_flags_default_to_enabled() {
        let settings: NotificationSettings =
            serde_json::from_str(r#"{"notifyOnInvoices": false}"#).unwrap();
        assert!(settings.is_enabled(NotificationCategory::Events));
        assert!(!settings.is_enabled(NotificationCategory::Invoices));
        assert!(settings.is_enabled(NotificationCategory::Payments));
    }

    #[test]
    fn test_invoice_record_accepts_app_json() {
        let invoice: InvoiceRecord = serde_json::from_str(
            r#"{"invoiceNo":"INV-1","totalAmount":100,"dueDate":"2025-06-01","status":"pending"}"#,
        )
        .unwrap();
        assert_eq!(invoice.invoice_no.as_deref(), Some("INV-1"));
        assert_eq!(invoice.total_amount, Some(100.0));
        assert!(invoice.paid_at.is_none());
    }

    #[test]
    fn test_failed_record_serializes_type_and_error() {
        let parent = UserRecord::new("u1", "p@x.com", Role::Parent);
        let record = DeliveryRecord::failed(
            &parent,
            "Subject".to_string(),
            "<p>Body</p>".to_string(),
            DeliveryMetadata::new(TemplateKind::NewInvoice, Some("inv-1".to_string())),
            "quota exceeded".to_string(),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "quota exceeded");
        assert_eq!(json["metadata"]["type"], "new_invoice");
        assert_eq!(json["recipientId"], "u1");
        assert!(json.get("messageId").is_none());
    }
}
