//! Business services.

pub mod assignment;
pub mod export;
pub mod mailer;
pub mod paystack;
pub mod registration;

pub use assignment::{Assignment, COMMITTEE, COUNTRIES, assign};
pub use export::ExportService;
pub use mailer::{MailOutcome, Mailer};
pub use paystack::{PaystackService, PublicConfig, VerifyOutcome};
pub use registration::{
    CreateRegistrationInput, FinancialSummary, PaidTransition, RegistrationService,
};
