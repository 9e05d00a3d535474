//! Database entities.

pub mod payment;
pub mod payment_initialization;
pub mod registration;

pub use payment::Entity as Payment;
pub use payment_initialization::Entity as PaymentInitialization;
pub use registration::Entity as Registration;
