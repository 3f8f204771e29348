//! Activity classification
//!
//! Transactions carry no stored direction; it is derived from the viewer's
//! own account every time it is needed.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::models::{Transaction, TransactionType};

/// Money direction relative to the viewer's account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Classify a transaction relative to the viewer's CVU
///
/// An explicit origin or destination naming the viewer wins; otherwise the
/// sign of the amount decides, positive amounts being incoming.
pub fn classify_direction(activity: &Transaction, viewer_cvu: &str) -> Direction {
    if !viewer_cvu.is_empty() {
        if activity.origin == viewer_cvu {
            return Direction::Outgoing;
        }
        if activity.destination.as_deref() == Some(viewer_cvu) {
            return Direction::Incoming;
        }
    }
    if activity.amount > Decimal::ZERO {
        Direction::Incoming
    } else {
        Direction::Outgoing
    }
}

/// Display classification of an activity row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    TransferIn,
    TransferOut,
    Deposit,
    Other,
}

impl ActivityKind {
    pub fn of(activity: &Transaction, viewer_cvu: &str) -> Self {
        match activity.kind {
            TransactionType::Deposit => ActivityKind::Deposit,
            TransactionType::Transfer => match classify_direction(activity, viewer_cvu) {
                Direction::Incoming => ActivityKind::TransferIn,
                Direction::Outgoing => ActivityKind::TransferOut,
            },
            TransactionType::Other => ActivityKind::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::TransferIn => "Transferencia recibida",
            ActivityKind::TransferOut => "Transferencia enviada",
            ActivityKind::Deposit => "Ingreso de dinero",
            ActivityKind::Other => "Movimiento",
        }
    }
}

/// A counterparty the viewer has received money from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyRecord {
    pub name: String,
    pub origin: String,
}

/// Transfer counterparties that sent money to the viewer
///
/// Non-transfer and outgoing records are dropped; duplicates by origin are
/// removed keeping the first occurrence, in input order.
pub fn incoming_counterparties(activities: &[Transaction], viewer_cvu: &str) -> Vec<CounterpartyRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();
    for activity in activities {
        if activity.kind != TransactionType::Transfer
            || classify_direction(activity, viewer_cvu) != Direction::Incoming
        {
            continue;
        }
        if seen.insert(activity.origin.as_str()) {
            records.push(CounterpartyRecord {
                name: activity.name.clone(),
                origin: activity.origin.clone(),
            });
        }
    }
    records
}
