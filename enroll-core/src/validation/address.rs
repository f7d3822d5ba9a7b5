use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::{MOBILE, PIN_CODE};
use super::{Field, FieldErrors, display_or_empty, text_len};
use crate::models::{AddressDetails, EnrollmentAnswer, PaymentMode, PaymentPlan};
use crate::pins::PinDirectory;

const ADDRESS_MIN: usize = 10;
const ADDRESS_MAX: usize = 120;
const GUARDIAN_NAME_MIN: usize = 2;

/// Raw values of the address, guardian and payment step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressForm {
    pub pin_code: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub guardian_name: String,
    pub guardian_mobile: String,
    pub payment_plan: String,
    pub payment_mode: String,
}

impl AddressForm {
    /// Pre-fills the form from previously stored answers.
    pub fn from_answer(answer: &EnrollmentAnswer) -> Self {
        Self {
            pin_code: answer.pin_code.clone().unwrap_or_default(),
            city: answer.city.clone().unwrap_or_default(),
            state: answer.state.clone().unwrap_or_default(),
            address: answer.address.clone().unwrap_or_default(),
            guardian_name: answer.guardian_name.clone().unwrap_or_default(),
            guardian_mobile: answer.guardian_mobile.clone().unwrap_or_default(),
            payment_plan: display_or_empty(answer.payment_plan),
            payment_mode: display_or_empty(answer.payment_mode),
        }
    }

    /// Sets the PIN code and auto-fills city and state when it resolves.
    ///
    /// Returns `true` when the lookup hit and the location was overwritten.
    pub fn set_pin_code(
        &mut self,
        pin_code: &str,
        directory: &PinDirectory,
    ) -> bool {
        self.pin_code = pin_code.to_string();
        self.apply_pin_lookup(directory)
    }

    /// Overwrites city and state from `directory` when the current PIN is a
    /// known 6-digit code. Manual entries are replaced.
    pub fn apply_pin_lookup(
        &mut self,
        directory: &PinDirectory,
    ) -> bool {
        match directory.lookup(&self.pin_code) {
            Some(location) => {
                debug!(pin = %self.pin_code.trim(), city = %location.city, "PIN auto-fill");
                self.city = location.city.clone();
                self.state = location.state.clone();
                true
            }
            None => false,
        }
    }
}

/// Step 3 rule: address, guardian contact and payment choices.
pub fn validate_address(form: &AddressForm) -> Result<AddressDetails, FieldErrors> {
    let mut errors = FieldErrors::new();

    let pin_code = form.pin_code.trim();
    if !PIN_CODE.is_match(pin_code) {
        errors.push(Field::PinCode, "Must be a valid 6-digit PIN");
    }

    let state = form.state.trim();
    if state.is_empty() {
        errors.push(Field::State, "State is required");
    }
    let city = form.city.trim();
    if city.is_empty() {
        errors.push(Field::City, "City is required");
    }

    let address = form.address.trim();
    let address_len = text_len(address);
    if address_len < ADDRESS_MIN {
        errors.push(Field::Address, "Address too short");
    } else if address_len > ADDRESS_MAX {
        errors.push(
            Field::Address,
            format!("Address must be at most {ADDRESS_MAX} characters"),
        );
    }

    let guardian_name = form.guardian_name.trim();
    if text_len(guardian_name) < GUARDIAN_NAME_MIN {
        errors.push(Field::GuardianName, "Guardian name required");
    }

    let guardian_mobile = form.guardian_mobile.trim();
    if !MOBILE.is_match(guardian_mobile) {
        errors.push(
            Field::GuardianMobile,
            "Must be a valid Indian mobile number",
        );
    }

    let payment_plan = errors.required_choice::<PaymentPlan>(Field::PaymentPlan, &form.payment_plan);
    let payment_mode = errors.required_choice::<PaymentMode>(Field::PaymentMode, &form.payment_mode);

    match (payment_plan, payment_mode) {
        (Some(payment_plan), Some(payment_mode)) if errors.is_empty() => Ok(AddressDetails {
            pin_code: pin_code.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            address: address.to_string(),
            guardian_name: guardian_name.to_string(),
            guardian_mobile: guardian_mobile.to_string(),
            payment_plan,
            payment_mode,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid_form() -> AddressForm {
        AddressForm {
            pin_code: "400001".to_string(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
            address: "12 Marine Drive, Flat 4B".to_string(),
            guardian_name: "R. Rao".to_string(),
            guardian_mobile: "9812345679".to_string(),
            payment_plan: "Annual".to_string(),
            payment_mode: "UPI".to_string(),
        }
    }

    #[test]
    fn valid_form_produces_typed_details() {
        let details = validate_address(&valid_form()).unwrap();

        assert_eq!(details.payment_plan, PaymentPlan::Annual);
        assert_eq!(details.payment_mode, PaymentMode::Upi);
        assert_eq!(details.city, "Mumbai");
    }

    #[test]
    fn from_answer_round_trips_stored_details() {
        let details = validate_address(&valid_form()).unwrap();
        let answer = EnrollmentAnswer::default().merged(details.into());

        assert_eq!(AddressForm::from_answer(&answer), valid_form());
    }

    #[test]
    fn pin_lookup_overwrites_manual_city_and_state() {
        let mut form = AddressForm {
            city: "Pune".to_string(),
            state: "Goa".to_string(),
            ..valid_form()
        };

        let hit = form.set_pin_code("110001", &PinDirectory::default());

        assert!(hit);
        assert_eq!(form.city, "New Delhi");
        assert_eq!(form.state, "Delhi");
    }

    #[test]
    fn unknown_pin_leaves_manual_entry() {
        let mut form = AddressForm {
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            ..valid_form()
        };

        assert!(!form.set_pin_code("411001", &PinDirectory::default()));
        assert!(!form.set_pin_code("11000", &PinDirectory::default()));
        assert_eq!(form.city, "Pune");
        assert_eq!(form.state, "Maharashtra");
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = validate_address(&AddressForm::default()).unwrap_err();

        assert_eq!(errors.len(), 8);
        assert_eq!(errors.messages_for(Field::PaymentPlan), vec!["Plan is required"]);
        assert_eq!(errors.messages_for(Field::PaymentMode), vec!["Mode is required"]);
        assert_eq!(errors.messages_for(Field::Address), vec!["Address too short"]);
    }

    #[test]
    fn pin_must_be_exactly_six_digits() {
        for pin in ["12345", "1234567", "12a456"] {
            let form = AddressForm {
                pin_code: pin.to_string(),
                ..valid_form()
            };
            let errors = validate_address(&form).unwrap_err();
            assert_eq!(
                errors.messages_for(Field::PinCode),
                vec!["Must be a valid 6-digit PIN"],
                "pin = {pin}"
            );
        }
    }

    #[test]
    fn address_length_bounds() {
        let short = AddressForm {
            address: "Flat 4B".to_string(),
            ..valid_form()
        };
        let long = AddressForm {
            address: "x".repeat(121),
            ..valid_form()
        };
        let edge = AddressForm {
            address: "x".repeat(120),
            ..valid_form()
        };

        assert!(validate_address(&short).is_err());
        assert!(validate_address(&long).is_err());
        assert!(validate_address(&edge).is_ok());
    }

    #[test]
    fn guardian_mobile_uses_mobile_pattern() {
        let form = AddressForm {
            guardian_mobile: "0812345679".to_string(),
            ..valid_form()
        };

        let errors = validate_address(&form).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.has(Field::GuardianMobile));
    }

    #[test]
    fn invalid_payment_choices_name_allowed_values() {
        let form = AddressForm {
            payment_plan: "Monthly".to_string(),
            payment_mode: "Cash".to_string(),
            ..valid_form()
        };

        let errors = validate_address(&form).unwrap_err();

        assert_eq!(
            errors.messages_for(Field::PaymentPlan),
            vec!["Plan must be one of: Quarterly, Half-Yearly, Annual"]
        );
        assert_eq!(
            errors.messages_for(Field::PaymentMode),
            vec!["Mode must be one of: UPI, Card, NetBanking"]
        );
    }
}
