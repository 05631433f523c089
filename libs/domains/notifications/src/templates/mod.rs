//! Notification template registry.
//!
//! The four daycare notifications are fixed HTML templates compiled into the
//! binary. Subjects and bodies carry `PLACEHOLDER_<NAME>` tokens that the
//! [`TemplateProcessor`](crate::processor::TemplateProcessor) fills in.

mod variables;

pub use variables::{TOKEN_PREFIX, TemplateField, TemplateVars};

use crate::models::TemplateKind;

/// A static subject/body pair for one notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub kind: TemplateKind,
    pub subject: &'static str,
    pub body: &'static str,
}

static TEMPLATES: [NotificationTemplate; 4] = [
    NotificationTemplate {
        kind: TemplateKind::AdminEvent,
        subject: "New Event Created: PLACEHOLDER_EVENT_TITLE",
        body: ADMIN_EVENT_HTML_TEMPLATE,
    },
    NotificationTemplate {
        kind: TemplateKind::ParentEvent,
        subject: "Upcoming Event at PLACEHOLDER_DAYCARE_NAME: PLACEHOLDER_EVENT_TITLE",
        body: PARENT_EVENT_HTML_TEMPLATE,
    },
    NotificationTemplate {
        kind: TemplateKind::NewInvoice,
        subject: "New Invoice PLACEHOLDER_INVOICE_NO from PLACEHOLDER_DAYCARE_NAME",
        body: NEW_INVOICE_HTML_TEMPLATE,
    },
    NotificationTemplate {
        kind: TemplateKind::InvoicePaid,
        subject: "Payment Received for Invoice PLACEHOLDER_INVOICE_NO",
        body: INVOICE_PAID_HTML_TEMPLATE,
    },
];

/// Lookup for the fixed templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// The template registered for `kind`.
    pub fn get(kind: TemplateKind) -> &'static NotificationTemplate {
        match kind {
            TemplateKind::AdminEvent => &TEMPLATES[0],
            TemplateKind::ParentEvent => &TEMPLATES[1],
            TemplateKind::NewInvoice => &TEMPLATES[2],
            TemplateKind::InvoicePaid => &TEMPLATES[3],
        }
    }

    pub fn all() -> &'static [NotificationTemplate] {
        &TEMPLATES
    }
}

const ADMIN_EVENT_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>New Event Created</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="background-color: #ffffff; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
        <h1 style="color: #18181b; font-size: 24px; font-weight: 600; margin: 0 0 16px 0;">
          New Event Created
        </h1>
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 24px 0;">
          Hi PLACEHOLDER_ADMIN_NAME, a new event has been added to the PLACEHOLDER_DAYCARE_NAME calendar.
        </p>
        <table width="100%" cellspacing="0" cellpadding="0" style="margin-bottom: 24px; border: 1px solid #e4e4e7; border-radius: 6px;">
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px; width: 35%;">Event</td>
            <td style="padding: 12px 16px; color: #18181b; font-size: 14px; font-weight: 600;">PLACEHOLDER_EVENT_TITLE</td>
          </tr>
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px;">Date</td>
            <td style="padding: 12px 16px; color: #18181b; font-size: 14px;">PLACEHOLDER_EVENT_DATE</td>
          </tr>
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px;">Time</td>
            <td style="padding: 12px 16px; color: #18181b; font-size: 14px;">PLACEHOLDER_EVENT_TIME</td>
          </tr>
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px;">Group</td>
            <td style="padding: 12px 16px; color: #18181b; font-size: 14px;">PLACEHOLDER_EVENT_GROUP</td>
          </tr>
        </table>
        <p style="color: #52525b; font-size: 14px; line-height: 22px; margin: 0 0 32px 0;">
          PLACEHOLDER_EVENT_DESCRIPTION
        </p>
        <table width="100%" cellspacing="0" cellpadding="0">
          <tr>
            <td style="text-align: center;">
              <a href="PLACEHOLDER_DASHBOARD_URL" style="display: inline-block; background-color: #2563eb; color: #ffffff; font-size: 16px; font-weight: 500; padding: 12px 32px; text-decoration: none; border-radius: 6px;">
                Open Admin Dashboard
              </a>
            </td>
          </tr>
        </table>
      </td>
    </tr>
    <tr>
      <td style="padding: 24px 0; text-align: center;">
        <p style="color: #a1a1aa; font-size: 11px; margin: 0;">
          PLACEHOLDER_DAYCARE_NAME
        </p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const PARENT_EVENT_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Upcoming Event</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="background-color: #ffffff; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
        <h1 style="color: #18181b; font-size: 24px; font-weight: 600; margin: 0 0 16px 0; text-align: center;">
          PLACEHOLDER_EVENT_TITLE
        </h1>
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 24px 0;">
          Dear PLACEHOLDER_PARENT_NAME,
        </p>
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 24px 0;">
          We are excited to let you know about an upcoming event for PLACEHOLDER_CHILD_NAME at PLACEHOLDER_DAYCARE_NAME.
        </p>
        <table width="100%" cellspacing="0" cellpadding="0" style="margin-bottom: 24px; background-color: #f0fdf4; border-radius: 8px;">
          <tr>
            <td style="padding: 16px;">
              <p style="color: #166534; font-size: 14px; margin: 0 0 8px 0;"><strong>Date:</strong> PLACEHOLDER_EVENT_DATE</p>
              <p style="color: #166534; font-size: 14px; margin: 0 0 8px 0;"><strong>Time:</strong> PLACEHOLDER_EVENT_TIME</p>
              <p style="color: #166534; font-size: 14px; margin: 0;"><strong>Group:</strong> PLACEHOLDER_EVENT_GROUP</p>
            </td>
          </tr>
        </table>
        <p style="color: #52525b; font-size: 14px; line-height: 22px; margin: 0 0 32px 0;">
          PLACEHOLDER_EVENT_DESCRIPTION
        </p>
        <table width="100%" cellspacing="0" cellpadding="0">
          <tr>
            <td style="text-align: center;">
              <a href="PLACEHOLDER_DASHBOARD_URL" style="display: inline-block; background-color: #16a34a; color: #ffffff; font-size: 16px; font-weight: 500; padding: 12px 32px; text-decoration: none; border-radius: 6px;">
                View Calendar
              </a>
            </td>
          </tr>
        </table>
      </td>
    </tr>
    <tr>
      <td style="padding: 24px 0; text-align: center;">
        <p style="color: #71717a; font-size: 12px; margin: 0 0 16px 0;">
          You can turn off event emails in your notification settings.
        </p>
        <p style="color: #a1a1aa; font-size: 11px; margin: 0;">
          PLACEHOLDER_DAYCARE_NAME
        </p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const NEW_INVOICE_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>New Invoice</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="background-color: #ffffff; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
        <h1 style="color: #18181b; font-size: 24px; font-weight: 600; margin: 0 0 16px 0;">
          Invoice PLACEHOLDER_INVOICE_NO
        </h1>
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 24px 0;">
          Dear PLACEHOLDER_PARENT_NAME, a new invoice for PLACEHOLDER_CHILD_NAME is ready.
        </p>
        <table width="100%" cellspacing="0" cellpadding="0" style="margin-bottom: 32px; border: 1px solid #e4e4e7; border-radius: 6px;">
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px; width: 40%;">Invoice Number</td>
            <td style="padding: 12px 16px; color: #18181b; font-size: 14px;">PLACEHOLDER_INVOICE_NO</td>
          </tr>
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px;">Amount Due</td>
            <td style="padding: 12px 16px; color: #18181b; font-size: 18px; font-weight: 700;">$PLACEHOLDER_TOTAL_AMOUNT</td>
          </tr>
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px;">Due Date</td>
            <td style="padding: 12px 16px; color: #18181b; font-size: 14px;">PLACEHOLDER_DUE_DATE</td>
          </tr>
          <tr>
            <td style="padding: 12px 16px; color: #71717a; font-size: 14px;">Status</td>
            <td style="padding: 12px 16px; color: #b45309; font-size: 14px; font-weight: 600;">PLACEHOLDER_INVOICE_STATUS</td>
          </tr>
        </table>
        <table width="100%" cellspacing="0" cellpadding="0">
          <tr>
            <td style="text-align: center;">
              <a href="PLACEHOLDER_DASHBOARD_URL" style="display: inline-block; background-color: #2563eb; color: #ffffff; font-size: 16px; font-weight: 500; padding: 12px 32px; text-decoration: none; border-radius: 6px;">
                View &amp; Pay Invoice
              </a>
            </td>
          </tr>
        </table>
      </td>
    </tr>
    <tr>
      <td style="padding: 24px 0; text-align: center;">
        <p style="color: #a1a1aa; font-size: 11px; margin: 0;">
          PLACEHOLDER_DAYCARE_NAME
        </p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const INVOICE_PAID_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Payment Received</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <tr>
      <td style="background-color: #ffffff; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
        <h1 style="color: #166534; font-size: 24px; font-weight: 600; margin: 0 0 16px 0; text-align: center;">
          Payment Received
        </h1>
        <p style="color: #52525b; font-size: 16px; line-height: 24px; margin: 0 0 24px 0;">
          Dear PLACEHOLDER_PARENT_NAME, thank you! We have received your payment for invoice PLACEHOLDER_INVOICE_NO.
        </p>
        <table width="100%" cellspacing="0" cellpadding="0" style="margin-bottom: 32px; background-color: #f0fdf4; border-radius: 8px;">
          <tr>
            <td style="padding: 16px;">
              <p style="color: #166534; font-size: 14px; margin: 0 0 8px 0;"><strong>Invoice:</strong> PLACEHOLDER_INVOICE_NO</p>
              <p style="color: #166534; font-size: 14px; margin: 0 0 8px 0;"><strong>Amount Paid:</strong> $PLACEHOLDER_TOTAL_AMOUNT</p>
              <p style="color: #166534; font-size: 14px; margin: 0;"><strong>Paid On:</strong> PLACEHOLDER_PAID_DATE</p>
            </td>
          </tr>
        </table>
        <table width="100%" cellspacing="0" cellpadding="0">
          <tr>
            <td style="text-align: center;">
              <a href="PLACEHOLDER_DASHBOARD_URL" style="display: inline-block; background-color: #18181b; color: #ffffff; font-size: 16px; font-weight: 500; padding: 12px 32px; text-decoration: none; border-radius: 6px;">
                View Billing History
              </a>
            </td>
          </tr>
        </table>
      </td>
    </tr>
    <tr>
      <td style="padding: 24px 0; text-align: center;">
        <p style="color: #a1a1aa; font-size: 11px; margin: 0;">
          PLACEHOLDER_DAYCARE_NAME
        </p>
      </td>
    </tr>
  </table>
</body>
</html>"#;
