//! Birthday campaign API client methods

use super::{ClientError, FundraiserClient};
use crate::client::request::{ApiRequest, FormPart};
use crate::types::{Campaign, DonationReceipt, DonationRequest, DonationResponse};
use rust_decimal::Decimal;
use tracing::info;

/// Smallest donation the backend accepts, in rupees
pub const MIN_DONATION_AMOUNT: Decimal = Decimal::ONE_HUNDRED;

impl DonationRequest {
    /// Check the request before it is sent
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.amount < MIN_DONATION_AMOUNT {
            return Err(ClientError::Validation(format!(
                "Minimum donation amount is Rs. {MIN_DONATION_AMOUNT}"
            )));
        }
        if self.donor_name.trim().is_empty() {
            return Err(ClientError::Validation("Donor name is required".into()));
        }
        Ok(())
    }

    /// Form fields as a browser would submit the donation form
    fn form_parts(&self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("donor_name", self.donor_name.clone()),
            FormPart::text("donor_email", self.donor_email.clone()),
            FormPart::text("donor_phone", self.donor_phone.clone()),
            FormPart::text("amount", self.amount.to_string()),
            FormPart::text("message", self.message.clone()),
        ];
        // unchecked checkboxes are omitted from form submissions
        if self.is_anonymous {
            parts.push(FormPart::text("is_anonymous", "on"));
        }
        parts
    }
}

fn campaign_path(id: u64) -> String {
    format!("/api/applications/birthday-campaign/{id}/")
}

impl FundraiserClient {
    /// Fetch a campaign with its completed donations
    pub async fn campaign(&self, id: u64) -> Result<Campaign, ClientError> {
        self.execute(ApiRequest::get(campaign_path(id))).await
    }

    /// Submit a donation as JSON
    pub async fn donate(
        &self,
        campaign_id: u64,
        donation: &DonationRequest,
    ) -> Result<DonationReceipt, ClientError> {
        donation.validate()?;
        let request =
            ApiRequest::post(format!("{}donate/", campaign_path(campaign_id))).json(donation)?;
        self.submit_donation(campaign_id, request).await
    }

    /// Submit a donation as a multipart form
    pub async fn donate_form(
        &self,
        campaign_id: u64,
        donation: &DonationRequest,
    ) -> Result<DonationReceipt, ClientError> {
        donation.validate()?;
        let request = ApiRequest::post(format!("{}donate/", campaign_path(campaign_id)))
            .multipart(donation.form_parts());
        self.submit_donation(campaign_id, request).await
    }

    async fn submit_donation(
        &self,
        campaign_id: u64,
        request: ApiRequest,
    ) -> Result<DonationReceipt, ClientError> {
        let response: DonationResponse = self.execute(request).await?;
        if !response.success {
            return Err(ClientError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "Failed to record donation".to_string()),
            ));
        }

        info!(
            campaign_id,
            donation_id = ?response.donation_id,
            "Donation accepted"
        );
        Ok(DonationReceipt {
            donation_id: response.donation_id,
            payment_url: response.payment_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(amount: i64) -> DonationRequest {
        DonationRequest {
            donor_name: "Sita".into(),
            donor_email: "sita@example.com".into(),
            donor_phone: String::new(),
            amount: Decimal::new(amount, 0),
            message: "Happy birthday".into(),
            is_anonymous: false,
        }
    }

    #[test]
    fn test_minimum_amount() {
        assert!(donation(100).validate().is_ok());
        let err = donation(99).validate().unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref msg) if msg.contains("Rs. 100")));
    }

    #[test]
    fn test_fractional_amount_below_minimum() {
        let mut request = donation(0);
        request.amount = Decimal::new(9999, 2);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_requires_donor_name_only() {
        let mut request = donation(500);
        request.donor_email = "  ".into();
        assert!(request.validate().is_ok());

        request.donor_name = "  ".into();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_form_parts_omit_unchecked_anonymous() {
        let names = |parts: Vec<FormPart>| -> Vec<String> {
            parts
                .into_iter()
                .map(|p| match p {
                    FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
                })
                .collect()
        };

        let mut request = donation(500);
        assert!(!names(request.form_parts()).contains(&"is_anonymous".to_string()));

        request.is_anonymous = true;
        assert!(names(request.form_parts()).contains(&"is_anonymous".to_string()));
    }
}
