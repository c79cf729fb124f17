//! # Kind Registry & Transition Table
//!
//! A static table mapping each message kind to its data schema and to the
//! set of kinds that may legally follow it within one exchange.
//!
//! ```text
//! rfq               → quote, close
//! quote             → order, close
//! order             → orderinstructions, orderstatus
//! orderinstructions → orderstatus, cancel, close
//! orderstatus       → orderstatus, close
//! cancel            → orderstatus, close
//! close             → (terminal)
//! ```
//!
//! The table is a `static` built at compile time and read-only thereafter,
//! so lookups are safe from any number of threads without synchronization.
//! [`is_valid_next`] is a pure single-step lookup; tracking a whole
//! exchange is the job of [`crate::Exchange`].

use fxp_core::{MessageKind, ResourceKind};

/// Registry row for one message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindEntry {
    /// The message kind.
    pub kind: MessageKind,
    /// Schema validating the kind's `data` object.
    pub schema_name: &'static str,
    /// Kinds that may follow this one in the same exchange.
    pub valid_next: &'static [MessageKind],
}

impl KindEntry {
    /// Whether no message may follow this kind.
    pub fn is_terminal(&self) -> bool {
        self.valid_next.is_empty()
    }
}

/// Schema validating the message envelope (`metadata`, `signature`, ...).
pub const MESSAGE_ENVELOPE_SCHEMA: &str = "message.schema.json";

/// Schema validating the resource envelope.
pub const RESOURCE_ENVELOPE_SCHEMA: &str = "resource.schema.json";

/// Schema validating RFQ `privateData`.
pub const RFQ_PRIVATE_SCHEMA: &str = "rfq-private.schema.json";

use MessageKind::{Cancel, Close, Order, OrderInstructions, OrderStatus, Quote, Rfq};

static KIND_TABLE: [KindEntry; 7] = [
    KindEntry {
        kind: Rfq,
        schema_name: "rfq.schema.json",
        valid_next: &[Quote, Close],
    },
    KindEntry {
        kind: Quote,
        schema_name: "quote.schema.json",
        valid_next: &[Order, Close],
    },
    KindEntry {
        kind: Order,
        schema_name: "order.schema.json",
        valid_next: &[OrderInstructions, OrderStatus],
    },
    KindEntry {
        kind: OrderInstructions,
        schema_name: "orderinstructions.schema.json",
        valid_next: &[OrderStatus, Cancel, Close],
    },
    KindEntry {
        kind: OrderStatus,
        schema_name: "orderstatus.schema.json",
        valid_next: &[OrderStatus, Close],
    },
    KindEntry {
        kind: Cancel,
        schema_name: "cancel.schema.json",
        valid_next: &[OrderStatus, Close],
    },
    KindEntry {
        kind: Close,
        schema_name: "close.schema.json",
        valid_next: &[],
    },
];

/// The full registry, in exchange order.
pub fn kind_table() -> &'static [KindEntry] {
    &KIND_TABLE
}

/// The registry row for `kind`.
pub fn entry(kind: MessageKind) -> &'static KindEntry {
    match kind {
        Rfq => &KIND_TABLE[0],
        Quote => &KIND_TABLE[1],
        Order => &KIND_TABLE[2],
        OrderInstructions => &KIND_TABLE[3],
        OrderStatus => &KIND_TABLE[4],
        Cancel => &KIND_TABLE[5],
        Close => &KIND_TABLE[6],
    }
}

/// Look up a registry row by wire tag. `None` for unknown kinds.
pub fn lookup(kind: &str) -> Option<&'static KindEntry> {
    KIND_TABLE.iter().find(|e| e.kind.as_str() == kind)
}

/// Kinds that may follow `kind`.
pub fn valid_next(kind: MessageKind) -> &'static [MessageKind] {
    entry(kind).valid_next
}

/// Whether `candidate` may directly follow `current` in an exchange.
pub fn is_valid_next(current: MessageKind, candidate: MessageKind) -> bool {
    valid_next(current).contains(&candidate)
}

/// String form of [`is_valid_next`]. Unknown kinds are never valid.
pub fn is_valid_next_str(current: &str, candidate: &str) -> bool {
    match (lookup(current), lookup(candidate)) {
        (Some(cur), Some(cand)) => cur.valid_next.contains(&cand.kind),
        _ => false,
    }
}

/// Schema validating the `data` object of a resource kind.
pub fn resource_schema_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Offering => "offering.schema.json",
        ResourceKind::Balance => "balance.schema.json",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_kind_once() {
        for kind in MessageKind::ALL {
            assert_eq!(entry(kind).kind, kind);
            assert_eq!(kind_table().iter().filter(|e| e.kind == kind).count(), 1);
        }
    }

    #[test]
    fn test_schema_names_follow_kind() {
        for e in kind_table() {
            assert_eq!(e.schema_name, format!("{}.schema.json", e.kind.as_str()));
        }
    }

    #[test]
    fn test_rfq_then_quote() {
        assert!(is_valid_next(Rfq, Quote));
        assert!(is_valid_next_str("rfq", "quote"));
    }

    #[test]
    fn test_close_is_terminal() {
        assert!(entry(Close).is_terminal());
        for kind in MessageKind::ALL {
            assert!(!is_valid_next(Close, kind));
        }
        assert!(!is_valid_next_str("close", "orderstatus"));
    }

    #[test]
    fn test_order_status_self_loop() {
        assert!(is_valid_next(OrderStatus, OrderStatus));
    }

    #[test]
    fn test_full_table() {
        let expected: [(MessageKind, &[MessageKind]); 7] = [
            (Rfq, &[Quote, Close]),
            (Quote, &[Order, Close]),
            (Order, &[OrderInstructions, OrderStatus]),
            (OrderInstructions, &[OrderStatus, Cancel, Close]),
            (OrderStatus, &[OrderStatus, Close]),
            (Cancel, &[OrderStatus, Close]),
            (Close, &[]),
        ];
        for (current, next) in expected {
            for candidate in MessageKind::ALL {
                assert_eq!(
                    is_valid_next(current, candidate),
                    next.contains(&candidate),
                    "{current} -> {candidate}"
                );
            }
        }
    }

    #[test]
    fn test_rfq_never_follows() {
        for kind in MessageKind::ALL {
            assert!(!is_valid_next(kind, Rfq));
        }
    }

    #[test]
    fn test_unknown_kinds_are_invalid() {
        assert!(lookup("hoarder").is_none());
        assert!(!is_valid_next_str("hoarder", "quote"));
        assert!(!is_valid_next_str("rfq", "hoarder"));
        assert!(!is_valid_next_str("offering", "rfq"));
    }

    #[test]
    fn test_resource_schema_names() {
        assert_eq!(resource_schema_name(ResourceKind::Offering), "offering.schema.json");
        assert_eq!(resource_schema_name(ResourceKind::Balance), "balance.schema.json");
    }
}
