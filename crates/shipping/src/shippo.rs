//! Shippo REST API client.
//!
//! Covers the four calls ReFit makes: address validation, shipment/rate
//! creation, label purchase, and tracking. All calls are synchronous on
//! the Shippo side (`async: false`) so responses carry the full result.

use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ShippingError;
use crate::types::{
    Address, AddressValidation, Parcel, PurchasedLabel, RateQuote, TrackingEvent, TrackingStatus,
};

/// Shippo API base URL.
const BASE_URL: &str = "https://api.goshippo.com";

/// Shippo REST API client.
#[derive(Clone)]
pub struct ShippoClient {
    client: reqwest::Client,
}

impl ShippoClient {
    /// Create a new Shippo client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(api_key: &SecretString) -> Result<Self, ShippingError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("ShippoToken {}", api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ShippingError::Parse(format!("invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Validate and normalize an address.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError` if the request or response handling fails.
    pub async fn validate_address(
        &self,
        address: &Address,
    ) -> Result<AddressValidation, ShippingError> {
        let url = format!("{BASE_URL}/addresses/");
        let body = serde_json::json!({
            "name": address.name,
            "company": address.company,
            "street1": address.street1,
            "street2": address.street2,
            "city": address.city,
            "state": address.state,
            "zip": address.zip,
            "country": address.country,
            "phone": address.phone,
            "validate": true,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let payload: AddressResponse = check(response).await?;

        let results = payload.validation_results.unwrap_or_default();
        let normalized = Address {
            name: payload.name.unwrap_or_else(|| address.name.clone()),
            company: address.company.clone(),
            street1: payload.street1.unwrap_or_else(|| address.street1.clone()),
            street2: payload.street2.or_else(|| address.street2.clone()),
            city: payload.city.unwrap_or_else(|| address.city.clone()),
            state: payload.state.unwrap_or_else(|| address.state.clone()),
            zip: payload.zip.unwrap_or_else(|| address.zip.clone()),
            country: payload.country.unwrap_or_else(|| address.country.clone()),
            phone: address.phone.clone(),
            is_default: address.is_default,
        };

        Ok(AddressValidation {
            is_valid: results.is_valid.unwrap_or(false),
            normalized,
            messages: results.messages.into_iter().map(|m| m.text).collect(),
        })
    }

    /// Create a shipment and return its rates, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError::NoRates` if Shippo returns no usable rates.
    pub async fn get_rates(
        &self,
        from: &Address,
        to: &Address,
        parcel: &Parcel,
    ) -> Result<Vec<RateQuote>, ShippingError> {
        let url = format!("{BASE_URL}/shipments/");
        let body = serde_json::json!({
            "address_from": from,
            "address_to": to,
            "parcels": [parcel],
            "async": false,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let payload: ShipmentResponse = check(response).await?;

        let mut rates: Vec<RateQuote> = payload
            .rates
            .into_iter()
            .filter_map(|rate| {
                let amount = Decimal::from_str(&rate.amount).ok()?;
                let servicelevel = rate.servicelevel?;
                Some(RateQuote {
                    rate_id: rate.object_id,
                    carrier: rate.provider,
                    service: servicelevel.name,
                    amount,
                    currency: rate.currency,
                    estimated_days: rate.estimated_days,
                })
            })
            .collect();

        if rates.is_empty() {
            return Err(ShippingError::NoRates);
        }
        rates.sort_by(|a, b| a.amount.cmp(&b.amount));
        Ok(rates)
    }

    /// Purchase a label for a quoted rate.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError::LabelRejected` if the transaction status is
    /// not `SUCCESS`.
    pub async fn purchase_label(&self, rate_id: &str) -> Result<PurchasedLabel, ShippingError> {
        let url = format!("{BASE_URL}/transactions/");
        let body = serde_json::json!({
            "rate": rate_id,
            "label_file_type": "PDF",
            "async": false,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let payload: TransactionResponse = check(response).await?;

        if payload.status.as_deref() != Some("SUCCESS") {
            let detail = payload
                .messages
                .into_iter()
                .map(|m| m.text)
                .collect::<Vec<_>>()
                .join(", ");
            let detail = if detail.is_empty() {
                "label purchase failed".to_owned()
            } else {
                detail
            };
            return Err(ShippingError::LabelRejected(detail));
        }

        Ok(PurchasedLabel {
            tracking_number: payload.tracking_number.unwrap_or_default(),
            label_url: payload.label_url.unwrap_or_default(),
            tracking_url: payload.tracking_url_provider,
            carrier: payload.carrier_account.unwrap_or_default(),
            cost: payload.rate.and_then(|r| Decimal::from_str(&r).ok()),
        })
    }

    /// Look up tracking status for a shipment.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError` if the request or response handling fails.
    pub async fn track(
        &self,
        carrier: &str,
        tracking_number: &str,
    ) -> Result<TrackingStatus, ShippingError> {
        let url = format!("{BASE_URL}/tracks/{carrier}/{tracking_number}");

        let response = self.client.get(&url).send().await?;
        let payload: TrackResponse = check(response).await?;

        Ok(TrackingStatus {
            carrier: carrier.to_owned(),
            tracking_number: tracking_number.to_owned(),
            status: payload
                .tracking_status
                .map(|s| s.status)
                .unwrap_or_else(|| "UNKNOWN".to_owned()),
            eta: payload.eta,
            history: payload
                .tracking_history
                .into_iter()
                .map(|event| TrackingEvent {
                    status: event.status,
                    location: event.location.map(|l| l.display()),
                    occurred_at: event.status_date,
                })
                .collect(),
        })
    }
}

/// Check response status and deserialize, mapping failures to typed errors.
async fn check<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ShippingError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ShippingError::Api {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json()
        .await
        .map_err(|e| ShippingError::Parse(e.to_string()))
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AddressResponse {
    name: Option<String>,
    street1: Option<String>,
    street2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    country: Option<String>,
    validation_results: Option<ValidationResults>,
}

#[derive(Debug, Deserialize, Default)]
struct ValidationResults {
    is_valid: Option<bool>,
    #[serde(default)]
    messages: Vec<ValidationMessage>,
}

#[derive(Debug, Deserialize)]
struct ValidationMessage {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ShipmentResponse {
    #[serde(default)]
    rates: Vec<RateResponse>,
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    object_id: String,
    provider: String,
    servicelevel: Option<ServiceLevel>,
    amount: String,
    currency: String,
    estimated_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ServiceLevel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    status: Option<String>,
    tracking_number: Option<String>,
    label_url: Option<String>,
    tracking_url_provider: Option<String>,
    carrier_account: Option<String>,
    /// Label cost as a decimal string.
    rate: Option<String>,
    #[serde(default)]
    messages: Vec<ValidationMessage>,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    tracking_status: Option<TrackStatusResponse>,
    eta: Option<String>,
    #[serde(default)]
    tracking_history: Vec<TrackEventResponse>,
}

#[derive(Debug, Deserialize)]
struct TrackStatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct TrackEventResponse {
    status: String,
    location: Option<TrackLocation>,
    status_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackLocation {
    city: Option<String>,
    state: Option<String>,
}

impl TrackLocation {
    fn display(self) -> String {
        match (self.city, self.state) {
            (Some(city), Some(state)) => format!("{city}, {state}"),
            (Some(city), None) => city,
            (None, Some(state)) => state,
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_response_parses_and_filters() {
        let json = r#"{
          "rates": [
            { "object_id": "r1", "provider": "USPS",
              "servicelevel": { "name": "Priority Mail" },
              "amount": "8.45", "currency": "USD", "estimated_days": 3 },
            { "object_id": "r2", "provider": "USPS",
              "servicelevel": null,
              "amount": "28.75", "currency": "USD", "estimated_days": 1 },
            { "object_id": "r3", "provider": "UPS",
              "servicelevel": { "name": "Ground" },
              "amount": "not-a-number", "currency": "USD", "estimated_days": 5 }
          ]
        }"#;
        let parsed: ShipmentResponse = serde_json::from_str(json).expect("parses");
        assert_eq!(parsed.rates.len(), 3);

        // Rows without a service level or a parseable amount are dropped by
        // get_rates; mirror that filter here.
        let usable: Vec<_> = parsed
            .rates
            .into_iter()
            .filter(|r| r.servicelevel.is_some() && Decimal::from_str(&r.amount).is_ok())
            .collect();
        assert_eq!(usable.len(), 1);
    }

    #[test]
    fn test_transaction_response_parses() {
        let json = r#"{
          "status": "SUCCESS",
          "tracking_number": "9205590164917312751089",
          "label_url": "https://shippo-delivery.s3.amazonaws.com/label.pdf",
          "tracking_url_provider": "https://tools.usps.com/go/Track?q=9205590164917312751089",
          "carrier_account": "usps",
          "rate": "8.45",
          "messages": []
        }"#;
        let parsed: TransactionResponse = serde_json::from_str(json).expect("parses");
        assert_eq!(parsed.status.as_deref(), Some("SUCCESS"));
        assert_eq!(
            parsed.rate.and_then(|r| Decimal::from_str(&r).ok()),
            Some(Decimal::new(845, 2))
        );
    }

    #[test]
    fn test_failed_transaction_collects_messages() {
        let json = r#"{
          "status": "ERROR",
          "messages": [ { "text": "rate expired" }, { "text": "retry with a fresh rate" } ]
        }"#;
        let parsed: TransactionResponse = serde_json::from_str(json).expect("parses");
        assert_eq!(parsed.status.as_deref(), Some("ERROR"));
        assert_eq!(parsed.messages.len(), 2);
    }

    #[test]
    fn test_track_location_display() {
        let loc = TrackLocation {
            city: Some("Atlanta".to_owned()),
            state: Some("GA".to_owned()),
        };
        assert_eq!(loc.display(), "Atlanta, GA");
    }

    #[test]
    fn test_address_validation_results_default() {
        let json = r#"{ "street1": "4931 ANCLOTE DR", "validation_results": { "is_valid": true } }"#;
        let parsed: AddressResponse = serde_json::from_str(json).expect("parses");
        let results = parsed.validation_results.expect("present");
        assert_eq!(results.is_valid, Some(true));
        assert!(results.messages.is_empty());
    }
}
