//! Outbound message payloads and templating helpers.
//!
//! Templates render the wording used for finance notifications (verification
//! codes, payment confirmations, bill reminders, account alerts). Amounts are
//! integer cents and render as `$12.34`.

use chrono::NaiveDate;
use std::borrow::Cow;
use std::fmt;

/// Short, non-sensitive description of a payload for failure telemetry.
///
/// Implementations must not leak message bodies: summaries end up in logs and
/// error reports.
pub trait Summarize {
    /// Describe the payload.
    fn summary(&self) -> Cow<'_, str>;
}

impl Summarize for String {
    fn summary(&self) -> Cow<'_, str> {
        Cow::Owned(format!("text ({} chars)", self.chars().count()))
    }
}

impl Summarize for str {
    fn summary(&self) -> Cow<'_, str> {
        Cow::Owned(format!("text ({} chars)", self.chars().count()))
    }
}

/// Amount in cents, rendered in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cents(pub i64);

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = (self.0 / 100).unsigned_abs();
        let cents = (self.0 % 100).unsigned_abs();
        if self.0 < 0 {
            write!(f, "-${}.{:02}", dollars, cents)
        } else {
            write!(f, "${}.{:02}", dollars, cents)
        }
    }
}

/// SMS notification templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsTemplate {
    /// One-time verification code
    VerificationCode {
        /// The code to deliver
        code: String,
    },
    /// Confirmation of a completed payment
    PaymentConfirmation {
        /// Amount paid, in cents
        amount_cents: i64,
        /// Payee name
        recipient: String,
    },
    /// Reminder for an upcoming bill, inviting a YES/NO reply
    BillReminder {
        /// Bill identifier echoed in the reply keywords
        bill_id: String,
        /// Amount due, in cents
        amount_cents: i64,
        /// Due date
        due_date: NaiveDate,
    },
}

impl SmsTemplate {
    /// Stable template name, used as the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SmsTemplate::VerificationCode { .. } => "verification_code",
            SmsTemplate::PaymentConfirmation { .. } => "payment_confirmation",
            SmsTemplate::BillReminder { .. } => "bill_reminder",
        }
    }

    /// Render the message body.
    pub fn render(&self) -> String {
        match self {
            SmsTemplate::VerificationCode { code } => {
                format!("Your verification code is: {}", code)
            }
            SmsTemplate::PaymentConfirmation {
                amount_cents,
                recipient,
            } => format!(
                "Your payment of {} to {} was successful.",
                Cents(*amount_cents),
                recipient
            ),
            SmsTemplate::BillReminder {
                bill_id,
                amount_cents,
                due_date,
            } => format!(
                "You have a bill (ID: {id}) of {amount} due on {due}. Would you like to pay it now? \
                 Reply 'YES {id}' to pay or 'NO {id}' to remind you later.",
                id = bill_id,
                amount = Cents(*amount_cents),
                due = due_date.format("%Y-%m-%d"),
            ),
        }
    }
}

/// Account alert templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertTemplate {
    /// Spending in a category went over its budget
    BudgetExceeded {
        /// Budget category
        category: String,
        /// Amount spent, in cents
        spent_cents: i64,
        /// Budgeted amount, in cents
        budget_cents: i64,
    },
    /// A transaction was flagged as unusual
    UnusualActivity {
        /// Flagged transaction
        transaction_id: String,
        /// Transaction amount, in cents
        amount_cents: i64,
        /// Why it was flagged
        reason: String,
    },
    /// An account balance dropped below its threshold
    LowBalance {
        /// Account identifier
        account_id: String,
        /// Current balance, in cents
        balance_cents: i64,
        /// Alert threshold, in cents
        threshold_cents: i64,
    },
}

impl AlertTemplate {
    /// Stable alert type name.
    pub fn kind(&self) -> &'static str {
        match self {
            AlertTemplate::BudgetExceeded { .. } => "budget_exceeded",
            AlertTemplate::UnusualActivity { .. } => "unusual_activity",
            AlertTemplate::LowBalance { .. } => "low_balance",
        }
    }

    /// Render the alert text.
    pub fn render(&self) -> String {
        match self {
            AlertTemplate::BudgetExceeded {
                category,
                spent_cents,
                budget_cents,
            } => format!(
                "Budget exceeded for {}. Spent {}, budget was {}",
                category,
                Cents(*spent_cents),
                Cents(*budget_cents)
            ),
            // The reason is kept for the alert record, not the customer-facing text.
            AlertTemplate::UnusualActivity {
                transaction_id,
                amount_cents,
                ..
            } => format!(
                "Unusual activity detected. Transaction ID: {}, Amount: {}",
                transaction_id,
                Cents(*amount_cents)
            ),
            AlertTemplate::LowBalance {
                account_id,
                balance_cents,
                threshold_cents,
            } => format!(
                "Low balance alert for account {}. Current balance: {}, Threshold: {}",
                account_id,
                Cents(*balance_cents),
                Cents(*threshold_cents)
            ),
        }
    }
}

/// An SMS payload: a body plus the name of what produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    kind: Cow<'static, str>,
    body: String,
}

impl SmsMessage {
    /// Free-form text message.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: Cow::Borrowed("text"),
            body: body.into(),
        }
    }

    /// Message body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Template or origin name.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl From<SmsTemplate> for SmsMessage {
    fn from(template: SmsTemplate) -> Self {
        Self {
            kind: Cow::Borrowed(template.kind()),
            body: template.render(),
        }
    }
}

impl From<AlertTemplate> for SmsMessage {
    fn from(alert: AlertTemplate) -> Self {
        Self {
            kind: Cow::Borrowed(alert.kind()),
            body: alert.render(),
        }
    }
}

impl Summarize for SmsMessage {
    fn summary(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} ({} chars)", self.kind, self.body.chars().count()))
    }
}
