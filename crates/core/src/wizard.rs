//! The four-step trade-in wizard.
//!
//! Strictly linear: Device Info -> Quote -> Shipping -> Payment, with an
//! explicit `back()` and no other cycles. Each state is a tagged-union
//! variant carrying exactly the data accumulated so far, so a step can
//! never observe a missing prerequisite at runtime. The wizard checks step
//! ordering only; field-level validation belongs to each step's handler.
//!
//! The storefront serializes the wizard into the session between requests;
//! it has no durability beyond that session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Carrier;
use crate::quote::{Accessories, Condition, IssueCode, Quote};

/// Wizard step ordinal, 1-based to match the storefront progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    DeviceInfo,
    Quote,
    Shipping,
    Payment,
}

impl WizardStep {
    /// 1-based step number.
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::DeviceInfo => 1,
            Self::Quote => 2,
            Self::Shipping => 3,
            Self::Payment => 4,
        }
    }
}

/// The seller's declared device configuration from step one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    pub model_id: String,
    pub storage: String,
    pub carrier: Carrier,
    pub condition: Condition,
    #[serde(default)]
    pub issues: Vec<IssueCode>,
    #[serde(default)]
    pub accessories: Accessories,
}

/// The inbound shipping address collected in step three.
///
/// Canonical snake_case schema; mirrors the shipping crate's address but
/// kept independent so core stays free of service types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardAddress {
    pub name: String,
    pub street1: String,
    #[serde(default)]
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The shipping rate chosen in step three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenRate {
    pub rate_id: String,
    pub carrier: String,
    pub service: String,
    /// Rate price in USD, as quoted by the carrier.
    pub amount: crate::types::Money,
}

/// Everything the storefront needs to open a trade-in order, produced when
/// the wizard completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInSubmission {
    pub selection: DeviceSelection,
    pub quote: Quote,
    pub address: WizardAddress,
    pub rate: ChosenRate,
    /// Solana wallet receiving the payout.
    pub payout_wallet: String,
}

/// An action was attempted from the wrong step. Recoverable: the caller
/// re-renders the current step.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} from the {step:?} step")]
pub struct WizardError {
    pub step: WizardStep,
    pub action: &'static str,
}

/// The wizard state machine. One per seller session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TradeInWizard {
    /// Step 1: picking the device. Nothing accumulated yet.
    #[default]
    DeviceInfo,
    /// Step 2: reviewing the computed quote.
    Quote {
        selection: DeviceSelection,
        quote: Quote,
    },
    /// Step 3: entering the address and picking a rate.
    Shipping {
        selection: DeviceSelection,
        quote: Quote,
    },
    /// Step 4: choosing the payout wallet.
    Payment {
        selection: DeviceSelection,
        quote: Quote,
        address: WizardAddress,
        rate: ChosenRate,
    },
}

impl TradeInWizard {
    /// Start a fresh wizard at step one.
    #[must_use]
    pub const fn new() -> Self {
        Self::DeviceInfo
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        match self {
            Self::DeviceInfo => WizardStep::DeviceInfo,
            Self::Quote { .. } => WizardStep::Quote,
            Self::Shipping { .. } => WizardStep::Shipping,
            Self::Payment { .. } => WizardStep::Payment,
        }
    }

    /// The quote accumulated so far, if past step one.
    #[must_use]
    pub const fn quote(&self) -> Option<&Quote> {
        match self {
            Self::DeviceInfo => None,
            Self::Quote { quote, .. }
            | Self::Shipping { quote, .. }
            | Self::Payment { quote, .. } => Some(quote),
        }
    }

    /// Step 1 -> 2: record the device selection and its computed quote.
    ///
    /// # Errors
    ///
    /// `WizardError` if the wizard is past device selection.
    pub fn submit_device(
        &mut self,
        selection: DeviceSelection,
        quote: Quote,
    ) -> Result<(), WizardError> {
        match self {
            Self::DeviceInfo => {
                *self = Self::Quote { selection, quote };
                Ok(())
            }
            _ => Err(self.invalid("submit a device")),
        }
    }

    /// Step 2 -> 3: the seller accepted the offer.
    ///
    /// # Errors
    ///
    /// `WizardError` unless the wizard is on the quote step.
    pub fn accept_quote(&mut self) -> Result<(), WizardError> {
        match std::mem::take(self) {
            Self::Quote { selection, quote } => {
                *self = Self::Shipping { selection, quote };
                Ok(())
            }
            other => {
                *self = other;
                Err(self.invalid("accept the quote"))
            }
        }
    }

    /// Step 3 -> 4: record the validated address and chosen rate.
    ///
    /// # Errors
    ///
    /// `WizardError` unless the wizard is on the shipping step.
    pub fn submit_shipping(
        &mut self,
        address: WizardAddress,
        rate: ChosenRate,
    ) -> Result<(), WizardError> {
        match std::mem::take(self) {
            Self::Shipping { selection, quote } => {
                *self = Self::Payment {
                    selection,
                    quote,
                    address,
                    rate,
                };
                Ok(())
            }
            other => {
                *self = other;
                Err(self.invalid("submit shipping"))
            }
        }
    }

    /// Step 4 -> done: consume the wizard and produce the submission.
    ///
    /// # Errors
    ///
    /// Returns the wizard unchanged (inside the error) unless it is on the
    /// payment step.
    pub fn complete(self, payout_wallet: String) -> Result<TradeInSubmission, Box<(Self, WizardError)>> {
        match self {
            Self::Payment {
                selection,
                quote,
                address,
                rate,
            } => Ok(TradeInSubmission {
                selection,
                quote,
                address,
                rate,
                payout_wallet,
            }),
            other => {
                let err = other.invalid("complete the trade-in");
                Err(Box::new((other, err)))
            }
        }
    }

    /// Go back one step, dropping that step's data.
    ///
    /// # Errors
    ///
    /// `WizardError` on step one, which has nowhere to go.
    pub fn back(&mut self) -> Result<(), WizardError> {
        match std::mem::take(self) {
            Self::DeviceInfo => {
                *self = Self::DeviceInfo;
                Err(self.invalid("go back"))
            }
            Self::Quote { .. } => {
                *self = Self::DeviceInfo;
                Ok(())
            }
            Self::Shipping { selection, quote } => {
                *self = Self::Quote { selection, quote };
                Ok(())
            }
            Self::Payment {
                selection, quote, ..
            } => {
                *self = Self::Shipping { selection, quote };
                Ok(())
            }
        }
    }

    const fn invalid(&self, action: &'static str) -> WizardError {
        WizardError {
            step: self.step(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Carrier, Catalog};
    use crate::quote::{QuoteRequest, calculate_quote};

    fn selection() -> DeviceSelection {
        DeviceSelection {
            model_id: "iphone-16-pro".to_owned(),
            storage: "256GB".to_owned(),
            carrier: Carrier::Unlocked,
            condition: Condition::Good,
            issues: Vec::new(),
            accessories: Accessories::default(),
        }
    }

    fn quote_for(selection: &DeviceSelection) -> Quote {
        let catalog = Catalog::builtin().expect("builtin catalog parses");
        let req = QuoteRequest {
            model_id: selection.model_id.clone(),
            storage: selection.storage.clone(),
            carrier: selection.carrier,
            condition: selection.condition,
            issues: selection.issues.clone(),
            accessories: selection.accessories,
        };
        calculate_quote(&catalog, &req, None).expect("quote")
    }

    fn address() -> WizardAddress {
        WizardAddress {
            name: "Ada Seller".to_owned(),
            street1: "100 Main St".to_owned(),
            street2: None,
            city: "Atlanta".to_owned(),
            state: "GA".to_owned(),
            zip: "30301".to_owned(),
            country: "US".to_owned(),
            phone: None,
        }
    }

    fn rate() -> ChosenRate {
        ChosenRate {
            rate_id: "rate_abc123".to_owned(),
            carrier: "USPS".to_owned(),
            service: "Priority Mail".to_owned(),
            amount: crate::types::Money::new(rust_decimal::Decimal::new(845, 2)),
        }
    }

    #[test]
    fn test_happy_path_is_linear() {
        let sel = selection();
        let quote = quote_for(&sel);

        let mut wizard = TradeInWizard::new();
        assert_eq!(wizard.step(), WizardStep::DeviceInfo);

        wizard.submit_device(sel, quote.clone()).expect("step 1->2");
        assert_eq!(wizard.step(), WizardStep::Quote);
        assert_eq!(wizard.quote(), Some(&quote));

        wizard.accept_quote().expect("step 2->3");
        assert_eq!(wizard.step(), WizardStep::Shipping);

        wizard.submit_shipping(address(), rate()).expect("step 3->4");
        assert_eq!(wizard.step(), WizardStep::Payment);

        let submission = wizard
            .complete("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_owned())
            .expect("completes");
        assert_eq!(submission.quote, quote);
        assert_eq!(submission.rate.rate_id, "rate_abc123");
    }

    #[test]
    fn test_skipping_steps_is_rejected() {
        let mut wizard = TradeInWizard::new();

        assert!(wizard.accept_quote().is_err());
        assert!(wizard.submit_shipping(address(), rate()).is_err());
        assert_eq!(wizard.step(), WizardStep::DeviceInfo);

        let err = TradeInWizard::new()
            .complete("wallet".to_owned())
            .unwrap_err();
        assert_eq!(err.1.step, WizardStep::DeviceInfo);
        // The wizard is handed back untouched.
        assert_eq!(err.0.step(), WizardStep::DeviceInfo);
    }

    #[test]
    fn test_resubmitting_device_mid_flow_is_rejected() {
        let sel = selection();
        let quote = quote_for(&sel);

        let mut wizard = TradeInWizard::new();
        wizard.submit_device(sel.clone(), quote.clone()).expect("step 1->2");

        let err = wizard.submit_device(sel, quote).unwrap_err();
        assert_eq!(err.step, WizardStep::Quote);
    }

    #[test]
    fn test_back_walks_one_step_and_drops_data() {
        let sel = selection();
        let quote = quote_for(&sel);

        let mut wizard = TradeInWizard::new();
        wizard.submit_device(sel, quote).expect("step 1->2");
        wizard.accept_quote().expect("step 2->3");
        wizard.submit_shipping(address(), rate()).expect("step 3->4");

        wizard.back().expect("4->3");
        assert_eq!(wizard.step(), WizardStep::Shipping);
        wizard.back().expect("3->2");
        assert_eq!(wizard.step(), WizardStep::Quote);
        wizard.back().expect("2->1");
        assert_eq!(wizard.step(), WizardStep::DeviceInfo);
        assert!(wizard.back().is_err());
        assert_eq!(wizard.quote(), None);
    }

    #[test]
    fn test_session_serde_roundtrip() {
        let sel = selection();
        let quote = quote_for(&sel);

        let mut wizard = TradeInWizard::new();
        wizard.submit_device(sel, quote).expect("step 1->2");
        wizard.accept_quote().expect("step 2->3");

        let json = serde_json::to_string(&wizard).expect("serialize");
        let restored: TradeInWizard = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, wizard);
        assert_eq!(restored.step(), WizardStep::Shipping);
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(WizardStep::DeviceInfo.number(), 1);
        assert_eq!(WizardStep::Payment.number(), 4);
    }
}
