//! Status enums for invoices and trade-in orders.
//!
//! Statuses are stored as lowercase text in Postgres and parsed back through
//! `FromStr`; a row holding an unknown value is surfaced as data corruption
//! by the repositories rather than silently coerced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a status string fails.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

/// Wholesale invoice lifecycle.
///
/// Transitions are guarded: callers must check [`Self::can_transition_to`]
/// before persisting a change. The admin API rejects anything else.
///
/// ```text
/// draft ──> finalized ──> sent ──> shipped ──> paid
///   │           │           └──────────────────^
///   └──> cancelled <────────┘  (draft/finalized only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being assembled; items may still be added or removed.
    Draft,
    /// Contents locked, ready to ship.
    Finalized,
    /// Shipping label purchased and sent to the buyer.
    Sent,
    /// Carrier has the parcel.
    Shipped,
    /// Buyer has paid. Terminal.
    Paid,
    /// Abandoned before shipping. Terminal.
    Cancelled,
}

impl InvoiceStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::Finalized,
        Self::Sent,
        Self::Shipped,
        Self::Paid,
        Self::Cancelled,
    ];

    /// Lowercase database/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Sent => "sent",
            Self::Shipped => "shipped",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// Small wholesale buyers often pay before carrier pickup, so `sent`
    /// may move straight to `paid` without passing through `shipped`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Finalized | Self::Cancelled)
                | (Self::Finalized, Self::Sent | Self::Cancelled)
                | (Self::Sent, Self::Shipped | Self::Paid)
                | (Self::Shipped, Self::Paid)
        )
    }

    /// True for terminal statuses with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Whether invoice items may still be edited.
    #[must_use]
    pub const fn allows_item_edits(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "finalized" => Ok(Self::Finalized),
            "sent" => Ok(Self::Sent),
            "shipped" => Ok(Self::Shipped),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// Seller-side trade-in order lifecycle, strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeInStatus {
    /// Label issued, waiting for the seller to ship the phone in.
    PendingShipment,
    /// Inbound parcel is in transit.
    Shipped,
    /// Phone arrived at the warehouse for inspection.
    Received,
    /// Payout sent to the seller's wallet. Terminal.
    Paid,
}

impl TradeInStatus {
    /// Lowercase database/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingShipment => "pending_shipment",
            Self::Shipped => "shipped",
            Self::Received => "received",
            Self::Paid => "paid",
        }
    }

    /// The next status in the linear flow, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::PendingShipment => Some(Self::Shipped),
            Self::Shipped => Some(Self::Received),
            Self::Received => Some(Self::Paid),
            Self::Paid => None,
        }
    }

    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        self.next() == Some(next)
    }
}

impl fmt::Display for TradeInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeInStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_shipment" => Ok(Self::PendingShipment),
            "shipped" => Ok(Self::Shipped),
            "received" => Ok(Self::Received),
            "paid" => Ok(Self::Paid),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_status_str_roundtrip() {
        for status in InvoiceStatus::ALL {
            let parsed: InvoiceStatus = status.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_invoice_status_unknown() {
        let err = "refunded".parse::<InvoiceStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("refunded".to_owned()));
    }

    #[test]
    fn test_invoice_happy_path() {
        use InvoiceStatus::{Draft, Finalized, Paid, Sent, Shipped};
        assert!(Draft.can_transition_to(Finalized));
        assert!(Finalized.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Paid));
        assert!(Sent.can_transition_to(Paid));
    }

    #[test]
    fn test_invoice_terminal_states_have_no_exits() {
        for terminal in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for next in InvoiceStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_invoice_no_backwards_transitions() {
        use InvoiceStatus::{Draft, Finalized, Sent};
        assert!(!Finalized.can_transition_to(Draft));
        assert!(!Sent.can_transition_to(Finalized));
        assert!(!Sent.can_transition_to(Draft));
    }

    #[test]
    fn test_invoice_cancel_only_before_ship() {
        use InvoiceStatus::{Cancelled, Draft, Finalized, Sent, Shipped};
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Finalized.can_transition_to(Cancelled));
        assert!(!Sent.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn test_item_edits_draft_only() {
        assert!(InvoiceStatus::Draft.allows_item_edits());
        assert!(!InvoiceStatus::Finalized.allows_item_edits());
        assert!(!InvoiceStatus::Sent.allows_item_edits());
    }

    #[test]
    fn test_trade_in_status_linear() {
        use TradeInStatus::{Paid, PendingShipment, Received, Shipped};
        assert_eq!(PendingShipment.next(), Some(Shipped));
        assert_eq!(Shipped.next(), Some(Received));
        assert_eq!(Received.next(), Some(Paid));
        assert_eq!(Paid.next(), None);
        assert!(!Received.can_transition_to(Shipped));
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&TradeInStatus::PendingShipment).expect("serialize");
        assert_eq!(json, "\"pending_shipment\"");
        let json = serde_json::to_string(&InvoiceStatus::Finalized).expect("serialize");
        assert_eq!(json, "\"finalized\"");
    }
}
