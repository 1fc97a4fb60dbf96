//! The trade-in quote calculator.
//!
//! A pure, deterministic function over the [`Catalog`]: look up the
//! wholesale price for the declared configuration, apply the condition
//! margin, subtract fixed per-issue deductions, credit accessory bonuses,
//! and clamp at zero. Every failure is a recoverable error value; the
//! calculator never panics on caller input.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Carrier, Catalog, Category, PriceTable, SupplierGrade};
use crate::types::Money;

/// Quotes above this total are high confidence.
const HIGH_CONFIDENCE_FLOOR: i64 = 500;
/// Quotes above this total (up to the high floor) are medium confidence.
const MEDIUM_CONFIDENCE_FLOOR: i64 = 200;

/// How the calculator can fail.
///
/// `MissingSelection` and `InvalidCondition` are validation errors surfaced
/// as inline form text; the rest are lookup errors surfaced as a top-level
/// message. All are locally recoverable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// Required selection was blank.
    #[error("missing required selection: {0}")]
    MissingSelection(&'static str),

    /// No model with this slug exists in the catalog.
    #[error("model not found: {0}")]
    UnknownModel(String),

    /// The model exists but not in this storage/carrier configuration.
    #[error("configuration not available for {model_id}: {storage}")]
    UnknownVariant { model_id: String, storage: String },

    /// The condition does not apply to this device category
    /// (e.g. "broken" on an iPhone, "good" on a Solana phone).
    #[error("condition {condition} does not apply to {category} devices")]
    InvalidCondition {
        condition: Condition,
        category: Category,
    },

    /// The supplier sheet has no price for this grade.
    #[error("price not available for this condition")]
    PriceUnavailable,
}

/// Declared device condition.
///
/// `Excellent`/`Good`/`Fair` apply to graded devices (iPhone/Android);
/// `Working`/`Broken` apply to the simplified Solana category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Working,
    Broken,
}

impl Condition {
    /// Supplier grade and margin for graded conditions; `None` for the
    /// simple working/broken conditions.
    #[must_use]
    pub fn grade_mapping(&self) -> Option<(SupplierGrade, Decimal)> {
        match self {
            Self::Excellent => Some((SupplierGrade::B, Decimal::new(85, 2))),
            Self::Good => Some((SupplierGrade::C, Decimal::new(82, 2))),
            Self::Fair => Some((SupplierGrade::D, Decimal::new(80, 2))),
            Self::Working | Self::Broken => None,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Working => "working",
            Self::Broken => "broken",
        };
        f.write_str(s)
    }
}

/// A named cosmetic or functional defect with a fixed deduction.
///
/// Deductions come off the supplier price sheets and are purely additive;
/// issues never interact with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    FaceIdBroken,
    CrackedCameraLens,
    UnknownParts,
    BadChargingPort,
    BackCrack,
    MdmLocked,
    BatteryMessage,
    MissingStylus,
    SeedVaultIssue,
}

impl IssueCode {
    /// Fixed deduction for this issue, in dollars.
    #[must_use]
    pub fn deduction(&self) -> Money {
        let dollars = match self {
            Self::FaceIdBroken => 400,
            Self::BadChargingPort | Self::MdmLocked => 200,
            Self::BackCrack => 150,
            Self::SeedVaultIssue => 100,
            Self::CrackedCameraLens | Self::UnknownParts => 80,
            Self::BatteryMessage => 50,
            Self::MissingStylus => 40,
        };
        Money::from_dollars(dollars)
    }

    /// Customer-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FaceIdBroken => "Face ID not working",
            Self::CrackedCameraLens => "Cracked camera lens",
            Self::UnknownParts => "Non-genuine parts",
            Self::BadChargingPort => "Bad charging port",
            Self::BackCrack => "Cracked back glass",
            Self::MdmLocked => "MDM locked",
            Self::BatteryMessage => "Battery service message",
            Self::MissingStylus => "Missing S Pen",
            Self::SeedVaultIssue => "Seed Vault issue",
        }
    }
}

/// Included accessories, credited as small bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Accessories {
    #[serde(default)]
    pub charger: bool,
    #[serde(default)]
    pub original_box: bool,
}

/// Input to [`calculate_quote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub model_id: String,
    pub storage: String,
    pub carrier: Carrier,
    pub condition: Condition,
    #[serde(default)]
    pub issues: Vec<IssueCode>,
    #[serde(default)]
    pub accessories: Accessories,
}

/// One line of the quote breakdown. Positive amounts reduce the total
/// (issue deductions); negative amounts increase it (accessory bonuses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Money,
}

/// Confidence tier shown alongside the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A computed trade-in offer. Ephemeral: recomputed on every input change
/// and only copied onto an order when the seller completes the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub model_id: String,
    pub display: String,
    pub category: Category,
    /// Supplier grade the condition mapped to; `None` for Solana phones.
    pub supplier_grade: Option<SupplierGrade>,
    /// Margin-adjusted base value before deductions, whole dollars.
    pub base_value: Money,
    /// Ordered deduction/bonus breakdown.
    pub line_items: Vec<LineItem>,
    /// Final offer: `max(0, base_value - sum(line_items))`.
    pub total: Money,
    /// Payout in SOL at the configured rate, 3 decimal places. `None` when
    /// no rate is configured.
    pub sol_amount: Option<Decimal>,
    pub confidence: Confidence,
    pub processing_estimate: String,
}

/// Compute a trade-in quote.
///
/// `sol_rate_usd` is the USD price of one SOL; pass `None` to omit the
/// crypto payout figure.
///
/// # Errors
///
/// Returns a [`QuoteError`] for blank selections, unknown models or
/// configurations, and conditions that do not apply to the device category.
pub fn calculate_quote(
    catalog: &Catalog,
    request: &QuoteRequest,
    sol_rate_usd: Option<Decimal>,
) -> Result<Quote, QuoteError> {
    if request.model_id.trim().is_empty() {
        return Err(QuoteError::MissingSelection("model"));
    }
    if request.storage.trim().is_empty() {
        return Err(QuoteError::MissingSelection("storage"));
    }

    let model = catalog
        .model(&request.model_id)
        .ok_or_else(|| QuoteError::UnknownModel(request.model_id.clone()))?;

    let variant = model
        .variant(&request.storage, request.carrier)
        .ok_or_else(|| QuoteError::UnknownVariant {
            model_id: request.model_id.clone(),
            storage: request.storage.clone(),
        })?;

    let (base_value, supplier_grade) = base_value(model.category, &variant.prices, request)?;

    let mut line_items = Vec::new();

    // Broken Solana phones are bought at the flat broken price; the issue
    // list is informational only and is skipped entirely.
    let skip_issues = model.category == Category::Solana && request.condition == Condition::Broken;
    if !skip_issues {
        for issue in &request.issues {
            line_items.push(LineItem {
                label: issue.label().to_owned(),
                amount: issue.deduction(),
            });
        }
    }

    if request.accessories.charger {
        line_items.push(LineItem {
            label: "Charger included".to_owned(),
            amount: -Money::from_dollars(5),
        });
    }
    if request.accessories.original_box {
        line_items.push(LineItem {
            label: "Original box included".to_owned(),
            amount: -Money::from_dollars(5),
        });
        // Sealed Saga/Seeker boxes resell; they get an extra credit.
        if model.category == Category::Solana {
            line_items.push(LineItem {
                label: "Solana box bonus".to_owned(),
                amount: -Money::from_dollars(20),
            });
        }
    }

    let deducted: Money = line_items.iter().map(|item| item.amount).sum();
    let total = (base_value - deducted).clamp_non_negative();

    let sol_amount = sol_rate_usd
        .filter(|rate| rate.is_sign_positive() && !rate.is_zero())
        .map(|rate| {
            (total.amount() / rate).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        });

    Ok(Quote {
        model_id: model.id.clone(),
        display: model.display.clone(),
        category: model.category,
        supplier_grade,
        base_value,
        line_items,
        total,
        sol_amount,
        confidence: confidence(total),
        processing_estimate: if model.category == Category::Solana {
            "1-2 business days".to_owned()
        } else {
            "2-3 business days".to_owned()
        },
    })
}

/// Resolve the margin-adjusted base value for the declared condition.
fn base_value(
    category: Category,
    prices: &PriceTable,
    request: &QuoteRequest,
) -> Result<(Money, Option<SupplierGrade>), QuoteError> {
    let invalid = || QuoteError::InvalidCondition {
        condition: request.condition,
        category,
    };

    match (category, prices) {
        (Category::Solana, PriceTable::Simple { working, broken }) => match request.condition {
            Condition::Working => Ok((*working, None)),
            Condition::Broken => Ok((*broken, None)),
            _ => Err(invalid()),
        },
        (Category::Iphone | Category::Android, PriceTable::Graded(_)) => {
            let (grade, margin) = request.condition.grade_mapping().ok_or_else(invalid)?;
            let wholesale = prices.grade(grade).ok_or(QuoteError::PriceUnavailable)?;
            let base = Money::new(wholesale.amount() * margin).round_dollars();
            Ok((base, Some(grade)))
        }
        // Mismatched price table for the category: treat as unpriced.
        _ => Err(QuoteError::PriceUnavailable),
    }
}

fn confidence(total: Money) -> Confidence {
    if total > Money::from_dollars(HIGH_CONFIDENCE_FLOOR) {
        Confidence::High
    } else if total > Money::from_dollars(MEDIUM_CONFIDENCE_FLOOR) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn catalog() -> Catalog {
        Catalog::builtin().expect("builtin catalog parses")
    }

    fn request(model_id: &str, storage: &str, condition: Condition) -> QuoteRequest {
        QuoteRequest {
            model_id: model_id.to_owned(),
            storage: storage.to_owned(),
            carrier: Carrier::Unlocked,
            condition,
            issues: Vec::new(),
            accessories: Accessories::default(),
        }
    }

    #[test]
    fn test_good_iphone_with_back_crack() {
        // C-grade sheet price 732 x 0.82 margin rounds to a $600 base;
        // cracked back glass deducts $150.
        let catalog = catalog();
        let mut req = request("iphone-15-pro", "256GB", Condition::Good);
        req.issues = vec![IssueCode::BackCrack];

        let quote = calculate_quote(&catalog, &req, None).expect("quote");
        assert_eq!(quote.base_value, Money::from_dollars(600));
        assert_eq!(quote.total, Money::from_dollars(450));
        assert_eq!(quote.supplier_grade, Some(SupplierGrade::C));
        assert_eq!(quote.line_items.len(), 1);
    }

    #[test]
    fn test_zero_issues_total_equals_base() {
        let catalog = catalog();
        let quote = calculate_quote(
            &catalog,
            &request("iphone-16-pro", "256GB", Condition::Excellent),
            None,
        )
        .expect("quote");
        assert!(quote.line_items.is_empty());
        assert_eq!(quote.total, quote.base_value);
    }

    #[test]
    fn test_unknown_model_is_error_value() {
        let catalog = catalog();
        let err = calculate_quote(&catalog, &request("pixel-9", "128GB", Condition::Good), None)
            .unwrap_err();
        assert_eq!(err, QuoteError::UnknownModel("pixel-9".to_owned()));
    }

    #[test]
    fn test_unknown_variant_is_error_value() {
        let catalog = catalog();
        let err = calculate_quote(
            &catalog,
            &request("iphone-14", "1TB", Condition::Good),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::UnknownVariant { .. }));
    }

    #[test]
    fn test_blank_selection_is_validation_error() {
        let catalog = catalog();
        let err =
            calculate_quote(&catalog, &request("", "128GB", Condition::Good), None).unwrap_err();
        assert_eq!(err, QuoteError::MissingSelection("model"));

        let err =
            calculate_quote(&catalog, &request("iphone-14", "  ", Condition::Good), None)
                .unwrap_err();
        assert_eq!(err, QuoteError::MissingSelection("storage"));
    }

    #[test]
    fn test_total_clamps_at_zero() {
        // iphone-14 128GB fair: D 220 x 0.80 = 176; stacked issues exceed it.
        let catalog = catalog();
        let mut req = request("iphone-14", "128GB", Condition::Fair);
        req.issues = vec![
            IssueCode::FaceIdBroken,
            IssueCode::BadChargingPort,
            IssueCode::MdmLocked,
        ];

        let quote = calculate_quote(&catalog, &req, None).expect("quote");
        assert_eq!(quote.total, Money::ZERO);
        assert_eq!(quote.confidence, Confidence::Low);
    }

    #[test]
    fn test_deduction_order_does_not_affect_total() {
        let catalog = catalog();
        let mut forward = request("iphone-16-pro-max", "512GB", Condition::Excellent);
        forward.issues = vec![
            IssueCode::BackCrack,
            IssueCode::BatteryMessage,
            IssueCode::CrackedCameraLens,
        ];
        let mut reversed = forward.clone();
        reversed.issues.reverse();

        let a = calculate_quote(&catalog, &forward, None).expect("quote");
        let b = calculate_quote(&catalog, &reversed, None).expect("quote");
        assert_eq!(a.total, b.total);
    }

    #[test]
    fn test_broken_solana_skips_issue_list() {
        let catalog = catalog();
        let mut req = request("saga", "512GB", Condition::Broken);
        req.issues = vec![IssueCode::SeedVaultIssue, IssueCode::BackCrack];

        let quote = calculate_quote(&catalog, &req, None).expect("quote");
        assert!(quote.line_items.is_empty());
        assert_eq!(quote.total, Money::from_dollars(200));
        assert_eq!(quote.supplier_grade, None);
    }

    #[test]
    fn test_working_solana_applies_issues() {
        let catalog = catalog();
        let mut req = request("saga", "512GB", Condition::Working);
        req.issues = vec![IssueCode::SeedVaultIssue];

        let quote = calculate_quote(&catalog, &req, None).expect("quote");
        assert_eq!(quote.base_value, Money::from_dollars(500));
        assert_eq!(quote.total, Money::from_dollars(400));
    }

    #[test]
    fn test_graded_condition_on_solana_rejected() {
        let catalog = catalog();
        let err =
            calculate_quote(&catalog, &request("saga", "512GB", Condition::Good), None)
                .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidCondition { .. }));
    }

    #[test]
    fn test_simple_condition_on_iphone_rejected() {
        let catalog = catalog();
        let err = calculate_quote(
            &catalog,
            &request("iphone-16", "128GB", Condition::Broken),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidCondition { .. }));
    }

    #[test]
    fn test_accessories_credit_as_negative_lines() {
        let catalog = catalog();
        let mut req = request("iphone-16", "128GB", Condition::Good);
        req.accessories = Accessories {
            charger: true,
            original_box: true,
        };

        let quote = calculate_quote(&catalog, &req, None).expect("quote");
        assert_eq!(quote.line_items.len(), 2);
        assert!(quote.line_items.iter().all(|l| l.amount.is_negative()));
        assert_eq!(quote.total, quote.base_value + Money::from_dollars(10));
    }

    #[test]
    fn test_solana_box_bonus() {
        let catalog = catalog();
        let mut req = request("seeker", "128GB", Condition::Working);
        req.accessories = Accessories {
            charger: false,
            original_box: true,
        };

        let quote = calculate_quote(&catalog, &req, None).expect("quote");
        // $5 box credit plus the $20 Solana box bonus.
        assert_eq!(quote.total, Money::from_dollars(380 + 25));
    }

    #[test]
    fn test_sol_conversion() {
        let catalog = catalog();
        let quote = calculate_quote(
            &catalog,
            &request("saga", "512GB", Condition::Working),
            Some(Decimal::from(180)),
        )
        .expect("quote");
        // 500 / 180 = 2.777... -> 2.778
        assert_eq!(quote.sol_amount, Some(Decimal::new(2778, 3)));

        let no_rate = calculate_quote(
            &catalog,
            &request("saga", "512GB", Condition::Working),
            None,
        )
        .expect("quote");
        assert_eq!(no_rate.sol_amount, None);
    }

    #[test]
    fn test_total_non_negative_for_all_valid_combinations() {
        let catalog = catalog();
        for model in catalog.iter() {
            let conditions: &[Condition] = match model.category {
                Category::Solana => &[Condition::Working, Condition::Broken],
                _ => &[Condition::Excellent, Condition::Good, Condition::Fair],
            };
            for variant in &model.variants {
                for carrier in [Carrier::Unlocked, Carrier::Locked] {
                    if !variant.lock_status.matches(carrier) {
                        continue;
                    }
                    for &condition in conditions {
                        let req = QuoteRequest {
                            model_id: model.id.clone(),
                            storage: variant.storage.clone(),
                            carrier,
                            condition,
                            issues: vec![IssueCode::FaceIdBroken, IssueCode::MdmLocked],
                            accessories: Accessories::default(),
                        };
                        let quote = calculate_quote(&catalog, &req, None)
                            .unwrap_or_else(|e| panic!("{}/{}: {e}", model.id, variant.storage));
                        assert!(!quote.total.is_negative());
                    }
                }
            }
        }
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(confidence(Money::from_dollars(600)), Confidence::High);
        assert_eq!(confidence(Money::from_dollars(500)), Confidence::Medium);
        assert_eq!(confidence(Money::from_dollars(250)), Confidence::Medium);
        assert_eq!(confidence(Money::from_dollars(200)), Confidence::Low);
        assert_eq!(confidence(Money::ZERO), Confidence::Low);
    }

    #[test]
    fn test_issue_code_serde_snake_case() {
        let json = serde_json::to_string(&IssueCode::FaceIdBroken).expect("serialize");
        assert_eq!(json, "\"face_id_broken\"");
        let back: IssueCode = serde_json::from_str("\"back_crack\"").expect("deserialize");
        assert_eq!(back, IssueCode::BackCrack);
    }
}
