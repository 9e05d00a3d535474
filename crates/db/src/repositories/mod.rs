//! Database repositories.

mod payment;
mod payment_initialization;
mod registration;

pub use payment::PaymentRepository;
pub use payment_initialization::PaymentInitializationRepository;
pub use registration::RegistrationRepository;
