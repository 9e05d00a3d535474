//! Bulk export of registration data.
//!
//! The export surface always materializes the whole table; there is no
//! pagination by design, since the data set is one conference's delegates.

use munreg_common::AppResult;
use munreg_db::entities::registration::{self, PaymentMethod, PaymentStatus};
use serde_json::json;

use super::registration::RegistrationService;

/// CSV header for registration exports.
const CSV_HEADER: &str = "registration_code,first_name,surname,other_names,date_of_birth,gender,\
email,phone,institution,education_level,nationality,city,emergency_contact_name,\
emergency_contact_phone,special_needs,has_mun_experience,experience_details,payment_status,\
payment_method,payment_reference,assigned_committee,assigned_country,created_at\n";

/// Export service.
#[derive(Clone)]
pub struct ExportService {
    registrations: RegistrationService,
}

impl ExportService {
    /// Create a new export service.
    #[must_use]
    pub const fn new(registrations: RegistrationService) -> Self {
        Self { registrations }
    }

    /// Export every registration as CSV.
    pub async fn export_csv(&self) -> AppResult<String> {
        let (registrations, _) = self.registrations.list_all().await?;
        Ok(Self::registrations_as_csv(&registrations))
    }

    /// Export every registration plus the financial summary as JSON.
    pub async fn export_json(&self) -> AppResult<serde_json::Value> {
        let (registrations, summary) = self.registrations.list_all().await?;
        Ok(json!({
            "registrations": registrations,
            "summary": summary,
        }))
    }

    /// Render registrations as a CSV string.
    ///
    /// CSV format: see [`CSV_HEADER`].
    #[must_use]
    pub fn registrations_as_csv(registrations: &[registration::Model]) -> String {
        let mut csv = String::from(CSV_HEADER);

        for reg in registrations {
            // Escape CSV fields (double quotes and newlines)
            let escape_csv = |s: &str| {
                if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
                    format!("\"{}\"", s.replace('"', "\"\""))
                } else {
                    s.to_string()
                }
            };

            let other_names = reg.other_names.as_deref().unwrap_or("");
            let special_needs = reg.special_needs.as_deref().unwrap_or("");
            let experience_details = reg.experience_details.as_deref().unwrap_or("");
            let payment_reference = reg.payment_reference.as_deref().unwrap_or("");
            let assigned_committee = reg.assigned_committee.as_deref().unwrap_or("");
            let assigned_country = reg.assigned_country.as_deref().unwrap_or("");
            let payment_method = reg.payment_method.map_or("", method_label);

            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&reg.registration_code),
                escape_csv(&reg.first_name),
                escape_csv(&reg.surname),
                escape_csv(other_names),
                escape_csv(&reg.date_of_birth),
                escape_csv(&reg.gender),
                escape_csv(&reg.email),
                escape_csv(&reg.phone),
                escape_csv(&reg.institution),
                escape_csv(&reg.education_level),
                escape_csv(&reg.nationality),
                escape_csv(&reg.city),
                escape_csv(&reg.emergency_contact_name),
                escape_csv(&reg.emergency_contact_phone),
                escape_csv(special_needs),
                reg.has_mun_experience,
                escape_csv(experience_details),
                status_label(reg.payment_status),
                payment_method,
                escape_csv(payment_reference),
                escape_csv(assigned_committee),
                escape_csv(assigned_country),
                reg.created_at.to_rfc3339(),
            ));
        }

        csv
    }
}

const fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::PendingVerification => "pending_verification",
        PaymentStatus::Paid => "paid",
    }
}

const fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Paystack => "paystack",
        PaymentMethod::Momo => "momo",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mock_registration(code: &str) -> registration::Model {
        registration::Model {
            id: "01hq3ktv9zr6v5x8w2k4m7p9t1".to_string(),
            registration_code: code.to_string(),
            first_name: "Ama".to_string(),
            surname: "Mensah".to_string(),
            other_names: None,
            date_of_birth: "2004-03-15".to_string(),
            gender: "female".to_string(),
            email: "ama@example.com".to_string(),
            phone: "+233200000000".to_string(),
            institution: "University of Ghana".to_string(),
            education_level: "undergraduate".to_string(),
            nationality: "Ghanaian".to_string(),
            city: "Accra".to_string(),
            emergency_contact_name: "Kofi Mensah".to_string(),
            emergency_contact_phone: "+233200000001".to_string(),
            special_needs: None,
            has_mun_experience: false,
            experience_details: None,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            payment_reference: None,
            assigned_committee: None,
            assigned_country: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_csv_header_is_stable() {
        let csv = ExportService::registrations_as_csv(&[]);
        assert!(csv.starts_with("registration_code,first_name,surname"));
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_csv_escapes_commas_and_quotes() {
        let mut reg = mock_registration("MUNC-100000-0001");
        reg.institution = "Accra Academy, Senior High".to_string();
        reg.special_needs = Some("Requires \"quiet\" room".to_string());

        let csv = ExportService::registrations_as_csv(&[reg]);

        assert!(csv.contains("\"Accra Academy, Senior High\""));
        assert!(csv.contains("\"Requires \"\"quiet\"\" room\""));
    }

    #[test]
    fn test_csv_renders_status_and_assignment() {
        let mut reg = mock_registration("MUNC-100000-0001");
        reg.payment_status = PaymentStatus::Paid;
        reg.payment_method = Some(PaymentMethod::Paystack);
        reg.assigned_committee = Some("General Assembly".to_string());
        reg.assigned_country = Some("Ghana".to_string());

        let csv = ExportService::registrations_as_csv(&[reg]);
        let row = csv.lines().nth(1).unwrap();

        assert!(row.contains("paid"));
        assert!(row.contains("paystack"));
        assert!(row.contains("General Assembly"));
        assert!(row.contains("Ghana"));
    }

    #[test]
    fn test_csv_one_row_per_registration() {
        let reg1 = mock_registration("MUNC-100000-0001");
        let mut reg2 = mock_registration("MUNC-100000-0002");
        reg2.email = "kojo@example.com".to_string();

        let csv = ExportService::registrations_as_csv(&[reg1, reg2]);
        assert_eq!(csv.lines().count(), 3);
    }
}
