//! Placeholder fields and the values substituted for them.

use std::collections::BTreeMap;

/// Prefix shared by every placeholder token.
pub const TOKEN_PREFIX: &str = "PLACEHOLDER_";

/// A semantic template field with its placeholder token and fallback value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateField {
    DaycareName,
    DashboardUrl,
    AdminName,
    ParentName,
    ChildName,
    EventTitle,
    EventDate,
    EventTime,
    EventGroup,
    EventDescription,
    InvoiceNo,
    TotalAmount,
    DueDate,
    InvoiceStatus,
    PaidDate,
}

impl TemplateField {
    /// Every known field.
    pub const ALL: [TemplateField; 15] = [
        TemplateField::DaycareName,
        TemplateField::DashboardUrl,
        TemplateField::AdminName,
        TemplateField::ParentName,
        TemplateField::ChildName,
        TemplateField::EventTitle,
        TemplateField::EventDate,
        TemplateField::EventTime,
        TemplateField::EventGroup,
        TemplateField::EventDescription,
        TemplateField::InvoiceNo,
        TemplateField::TotalAmount,
        TemplateField::DueDate,
        TemplateField::InvoiceStatus,
        TemplateField::PaidDate,
    ];

    /// The token written in template text.
    pub fn token(&self) -> &'static str {
        match self {
            TemplateField::DaycareName => "PLACEHOLDER_DAYCARE_NAME",
            TemplateField::DashboardUrl => "PLACEHOLDER_DASHBOARD_URL",
            TemplateField::AdminName => "PLACEHOLDER_ADMIN_NAME",
            TemplateField::ParentName => "PLACEHOLDER_PARENT_NAME",
            TemplateField::ChildName => "PLACEHOLDER_CHILD_NAME",
            TemplateField::EventTitle => "PLACEHOLDER_EVENT_TITLE",
            TemplateField::EventDate => "PLACEHOLDER_EVENT_DATE",
            TemplateField::EventTime => "PLACEHOLDER_EVENT_TIME",
            TemplateField::EventGroup => "PLACEHOLDER_EVENT_GROUP",
            TemplateField::EventDescription => "PLACEHOLDER_EVENT_DESCRIPTION",
            TemplateField::InvoiceNo => "PLACEHOLDER_INVOICE_NO",
            TemplateField::TotalAmount => "PLACEHOLDER_TOTAL_AMOUNT",
            TemplateField::DueDate => "PLACEHOLDER_DUE_DATE",
            TemplateField::InvoiceStatus => "PLACEHOLDER_INVOICE_STATUS",
            TemplateField::PaidDate => "PLACEHOLDER_PAID_DATE",
        }
    }

    /// Value used when the caller did not supply one.
    pub fn default_value(&self) -> &'static str {
        match self {
            TemplateField::DaycareName => "Our Daycare",
            TemplateField::DashboardUrl => "#",
            TemplateField::AdminName => "Admin",
            TemplateField::ParentName => "Parent",
            TemplateField::ChildName => "Your Child",
            TemplateField::EventTitle => "Untitled Event",
            TemplateField::EventDate => "Not specified",
            TemplateField::EventTime => "Not specified",
            TemplateField::EventGroup => "All Groups",
            TemplateField::EventDescription => "No description provided",
            TemplateField::InvoiceNo => "N/A",
            TemplateField::TotalAmount => "0.00",
            TemplateField::DueDate => "Not specified",
            TemplateField::InvoiceStatus => "PENDING",
            TemplateField::PaidDate => "Not specified",
        }
    }

    /// The field whose token starts `text`, preferring the longest token.
    pub fn match_token(text: &str) -> Option<TemplateField> {
        Self::ALL
            .iter()
            .copied()
            .filter(|field| text.starts_with(field.token()))
            .max_by_key(|field| field.token().len())
    }
}

/// Values supplied for a render. Absent fields resolve to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    values: BTreeMap<TemplateField, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; numbers use their plain `to_string` form.
    pub fn set(mut self, field: TemplateField, value: impl ToString) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a value if present. `None` and blank strings leave the field unset.
    pub fn set_opt<V: ToString>(mut self, field: TemplateField, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.trim().is_empty() {
                self.values.insert(field, value);
            }
        }
        self
    }

    pub fn insert(&mut self, field: TemplateField, value: impl ToString) {
        self.values.insert(field, value.to_string());
    }

    /// The supplied value, if any.
    pub fn get(&self, field: TemplateField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// The supplied value or the field's default.
    pub fn resolve(&self, field: TemplateField) -> &str {
        self.get(field).unwrap_or_else(|| field.default_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_prefixed() {
        for field in TemplateField::ALL {
            assert!(field.token().starts_with(TOKEN_PREFIX));
            let same = TemplateField::ALL
                .iter()
                .filter(|other| other.token() == field.token())
                .count();
            assert_eq!(same, 1, "duplicate token {}", field.token());
        }
    }

    #[test]
    fn test_match_token_prefers_longest() {
        let text = "PLACEHOLDER_EVENT_TIME and more";
        assert_eq!(TemplateField::match_token(text), Some(TemplateField::EventTime));
        assert_eq!(TemplateField::match_token("PLACEHOLDER_UNKNOWN"), None);
    }

    #[test]
    fn test_numbers_use_plain_to_string() {
        let vars = TemplateVars::new()
            .set(TemplateField::TotalAmount, 100)
            .set(TemplateField::InvoiceNo, 42.5);
        assert_eq!(vars.get(TemplateField::TotalAmount), Some("100"));
        assert_eq!(vars.get(TemplateField::InvoiceNo), Some("42.5"));
    }

    #[test]
    fn test_set_opt_skips_none_and_blank() {
        let vars = TemplateVars::new()
            .set_opt(TemplateField::EventDate, None::<&str>)
            .set_opt(TemplateField::EventTime, Some("  "))
            .set_opt(TemplateField::EventTitle, Some("Picnic"));

        assert_eq!(vars.resolve(TemplateField::EventDate), "Not specified");
        assert_eq!(vars.resolve(TemplateField::EventTime), "Not specified");
        assert_eq!(vars.resolve(TemplateField::EventTitle), "Picnic");
    }
}
