//! Gift module - payment validation, processed-zap records, and the ledger.
//!
//! # Module Structure
//!
//! - `validator` - Paid amount vs. tier price with tolerance
//! - `record` - Insert-once audit records
//! - `ledger` - Idempotency guard and the account transition
//! - `errors` - Processing error taxonomy

mod errors;
mod ledger;
mod record;
mod validator;

pub use errors::GiftError;
pub use ledger::{GiftActivation, SubscriptionLedger};
pub use record::{ProcessedZapRecord, ZapStatus};
pub use validator::{evaluate, PaymentDecision, PaymentValidator, PAYMENT_TOLERANCE_PERCENT};
