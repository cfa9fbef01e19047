//! User-facing classification of bulk action results.

use serde::Serialize;

use crate::envelope::Envelope;
use crate::repository::BulkCount;

/// A bulk action as named in banners ("update", "delete").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Update,
    Delete,
}

impl BulkAction {
    fn verb(&self) -> &'static str {
        match self {
            BulkAction::Update => "update",
            BulkAction::Delete => "delete",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            BulkAction::Update => "updated",
            BulkAction::Delete => "deleted",
        }
    }
}

/// How a bulk action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    /// Nothing succeeded.
    Failed,
    /// Some, but not all, succeeded.
    Partial,
    /// Everything succeeded.
    Complete,
}

/// Entity noun in singular and plural form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noun {
    pub singular: &'static str,
    pub plural: &'static str,
}

impl Noun {
    pub const CONTACT: Noun = Noun {
        singular: "contact",
        plural: "contacts",
    };
    pub const PROPERTY: Noun = Noun {
        singular: "property",
        plural: "properties",
    };
    pub const ACCOUNT: Noun = Noun {
        singular: "account",
        plural: "accounts",
    };

    pub fn for_count(&self, n: usize) -> &'static str {
        if n == 1 {
            self.singular
        } else {
            self.plural
        }
    }
}

/// Bulk result ready to be shown in a banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub status: BulkStatus,
    pub requested: usize,
    pub succeeded: usize,
    pub message: String,
}

impl BulkOutcome {
    pub fn from_count(action: BulkAction, noun: Noun, count: &BulkCount) -> Self {
        let status = if count.count == 0 {
            BulkStatus::Failed
        } else if count.count < count.requested {
            BulkStatus::Partial
        } else {
            BulkStatus::Complete
        };

        let message = match status {
            BulkStatus::Failed => format!("Failed to {} {}.", action.verb(), noun.plural),
            BulkStatus::Partial | BulkStatus::Complete => format!(
                "Successfully {} {} {}.",
                action.past_tense(),
                count.count,
                noun.for_count(count.count)
            ),
        };

        Self {
            status,
            requested: count.requested,
            succeeded: count.count,
            message,
        }
    }

    /// Classify an adapter envelope; a data-less failure counts as nothing done.
    pub fn from_envelope(action: BulkAction, noun: Noun, envelope: &Envelope<BulkCount>) -> Self {
        match &envelope.data {
            Some(count) => Self::from_count(action, noun, count),
            None => Self {
                status: BulkStatus::Failed,
                requested: 0,
                succeeded: 0,
                message: envelope
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("Failed to {} {}.", action.verb(), noun.plural)),
            },
        }
    }

    pub fn failed_count(&self) -> usize {
        self.requested - self.succeeded
    }

    pub fn is_success(&self) -> bool {
        self.status != BulkStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(requested: usize, succeeded: usize) -> BulkCount {
        BulkCount {
            requested,
            count: succeeded,
            failed: Vec::new(),
        }
    }

    #[test]
    fn test_partial_success_message() {
        let outcome = BulkOutcome::from_count(BulkAction::Update, Noun::PROPERTY, &count(3, 2));
        assert_eq!(outcome.status, BulkStatus::Partial);
        assert_eq!(outcome.message, "Successfully updated 2 properties.");
        assert_eq!(outcome.failed_count(), 1);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_zero_success_is_failure() {
        let outcome = BulkOutcome::from_count(BulkAction::Delete, Noun::CONTACT, &count(4, 0));
        assert_eq!(outcome.status, BulkStatus::Failed);
        assert_eq!(outcome.message, "Failed to delete contacts.");
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_complete_singular() {
        let outcome = BulkOutcome::from_count(BulkAction::Update, Noun::ACCOUNT, &count(1, 1));
        assert_eq!(outcome.status, BulkStatus::Complete);
        assert_eq!(outcome.message, "Successfully updated 1 account.");
    }

    #[test]
    fn test_from_failed_envelope_without_data() {
        let envelope: Envelope<BulkCount> = Envelope::err("No contact records selected");
        let outcome = BulkOutcome::from_envelope(BulkAction::Update, Noun::CONTACT, &envelope);
        assert_eq!(outcome.status, BulkStatus::Failed);
        assert_eq!(outcome.message, "No contact records selected");
    }
}
