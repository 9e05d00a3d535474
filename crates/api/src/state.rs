//! Application state.

use munreg_core::{ExportService, PaystackService, RegistrationService};

use crate::auth::AdminGate;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Registration lifecycle service.
    pub registration_service: RegistrationService,
    /// Payment gateway adapter.
    pub paystack_service: PaystackService,
    /// Bulk export service.
    pub export_service: ExportService,
    /// Static-key gate for the admin and export surfaces.
    pub gate: AdminGate,
}
