//! Domain models for the storefront.

pub mod order;

pub use order::{NewTradeInOrder, OrderEvent, TradeInOrder, generate_order_number};
