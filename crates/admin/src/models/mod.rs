//! Domain models for the admin API.

pub mod buyer;
pub mod invoice;

pub use buyer::{Buyer, NewBuyer};
pub use invoice::{Invoice, InvoiceItem, NewInvoiceItem, generate_invoice_number};
