//! The request body shared by the create and edit transaction routes.

use serde::{Deserialize, Serialize};

use crate::{Error, envelope::RequiredFields, transaction::TransactionBuilder};

/// An amount as sent by a client, either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// A JSON number, e.g. `12.5`.
    Number(f64),
    /// A string holding a number, e.g. `"12.5"`.
    Text(String),
}

/// The raw transaction fields sent by a client.
///
/// Every field is optional so that absent fields are reported to the client
/// as missing rather than as a malformed body. Unknown fields such as a user
/// ID are ignored, the owner always comes from the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The amount of money spent.
    pub amount: Option<AmountInput>,
    /// The category label.
    pub category: Option<String>,
    /// An optional external reference.
    pub reference: Option<String>,
    /// What the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Option<String>,
}

impl TransactionForm {
    /// Check the required fields and convert the form into a [TransactionBuilder].
    ///
    /// Text fields are trimmed. A zero amount counts as missing and a blank
    /// reference is dropped.
    ///
    /// # Errors
    ///
    /// Returns an [Error::MissingFields] naming every required field that is
    /// absent or blank, or an [Error::Validation] if the amount is not a finite number.
    pub fn validate(&self) -> Result<TransactionBuilder, Error> {
        let amount = match &self.amount {
            None => None,
            Some(AmountInput::Number(amount)) => Some(*amount),
            Some(AmountInput::Text(text)) if text.trim().is_empty() => None,
            Some(AmountInput::Text(text)) => Some(text.trim().parse::<f64>().map_err(|_| {
                Error::Validation(format!("amount \"{text}\" is not a number"))
            })?),
        };

        if let Some(amount) = amount.filter(|amount| !amount.is_finite()) {
            return Err(Error::Validation(format!(
                "amount {amount} is not a finite number"
            )));
        }

        let mut required = RequiredFields::default();
        required.require("amount", amount.is_none_or(|amount| amount == 0.0));
        let category = required.take("category", &self.category);
        let description = required.take("description", &self.description);
        let date = required.take("date", &self.date);
        required.check()?;

        let reference = self
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
            .map(str::to_owned);

        Ok(TransactionBuilder {
            amount: amount.unwrap_or_default(),
            category: category.to_owned(),
            reference,
            description: description.to_owned(),
            date: date.to_owned(),
        })
    }
}

#[cfg(test)]
mod transaction_form_tests {
    use serde_json::json;

    use crate::{Error, transaction::Transaction};

    use super::TransactionForm;

    fn parse(value: serde_json::Value) -> TransactionForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_form_produces_builder() {
        let form = parse(json!({
            "amount": 12.5,
            "category": " Food ",
            "reference": "INV-1",
            "description": "Lunch",
            "date": "2025-06-01"
        }));

        let got = form.validate();

        assert_eq!(
            got,
            Ok(Transaction::build(12.5, "Food", "Lunch", "2025-06-01")
                .reference(Some("INV-1".to_owned())))
        );
    }

    #[test]
    fn numeric_string_amount_is_accepted() {
        let form = parse(json!({
            "amount": "42.10",
            "category": "Food",
            "description": "Dinner",
            "date": "2025-06-01"
        }));

        assert_eq!(form.validate().unwrap().amount, 42.10);
    }

    #[test]
    fn negative_amount_is_accepted() {
        let form = parse(json!({
            "amount": -3,
            "category": "Refund",
            "description": "Returned shoes",
            "date": "2025-06-01"
        }));

        assert_eq!(form.validate().unwrap().amount, -3.0);
    }

    #[test]
    fn non_numeric_amount_is_invalid() {
        let form = parse(json!({
            "amount": "twelve",
            "category": "Food",
            "description": "Lunch",
            "date": "2025-06-01"
        }));

        assert!(matches!(form.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn infinite_amount_is_invalid() {
        let form = parse(json!({
            "amount": "inf",
            "category": "Food",
            "description": "Lunch",
            "date": "2025-06-01"
        }));

        assert!(matches!(form.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn zero_amount_counts_as_missing() {
        let form = parse(json!({
            "amount": 0,
            "category": "Food",
            "description": "Lunch",
            "date": "2025-06-01"
        }));

        assert_eq!(form.validate(), Err(Error::MissingFields(vec!["amount"])));
    }

    #[test]
    fn lists_all_missing_fields_in_order() {
        let form = parse(json!({ "category": "   ", "reference": "R" }));

        assert_eq!(
            form.validate(),
            Err(Error::MissingFields(vec![
                "amount",
                "category",
                "description",
                "date"
            ]))
        );
    }

    #[test]
    fn blank_reference_is_dropped() {
        let form = parse(json!({
            "amount": 1,
            "category": "Food",
            "reference": "  ",
            "description": "Lunch",
            "date": "2025-06-01"
        }));

        assert_eq!(form.validate().unwrap().reference, None);
    }

    #[test]
    fn user_id_in_body_is_ignored() {
        let form = parse(json!({
            "userId": 99,
            "amount": 1,
            "category": "Food",
            "description": "Lunch",
            "date": "2025-06-01"
        }));

        assert!(form.validate().is_ok());
    }
}
