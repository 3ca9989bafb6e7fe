use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::order::ShippingMethod;

/// Default shipping fees in minor currency units.
const DEFAULT_STANDARD_FEE: i64 = 25_000;
const DEFAULT_EXPRESS_FEE: i64 = 35_000;

/// Flat fee table for the supported shipping methods.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ShippingRates {
    #[serde(default = "default_standard_fee")]
    #[validate(range(min = 0))]
    pub standard_fee: i64,

    #[serde(default = "default_express_fee")]
    #[validate(range(min = 0))]
    pub express_fee: i64,
}

fn default_standard_fee() -> i64 {
    DEFAULT_STANDARD_FEE
}

fn default_express_fee() -> i64 {
    DEFAULT_EXPRESS_FEE
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            standard_fee: DEFAULT_STANDARD_FEE,
            express_fee: DEFAULT_EXPRESS_FEE,
        }
    }
}

impl ShippingRates {
    /// Quotes the flat fee for a shipping method.
    pub fn quote(&self, method: ShippingMethod) -> i64 {
        match method {
            ShippingMethod::Standard => self.standard_fee,
            ShippingMethod::Express => self.express_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fee_table() {
        let rates = ShippingRates::default();
        assert_eq!(rates.quote(ShippingMethod::Standard), 25_000);
        assert_eq!(rates.quote(ShippingMethod::Express), 35_000);
    }

    #[test]
    fn overridden_rates_are_quoted_as_configured() {
        let rates = ShippingRates {
            standard_fee: 10_000,
            express_fee: 99_000,
        };
        assert_eq!(rates.quote(ShippingMethod::Standard), 10_000);
        assert_eq!(rates.quote(ShippingMethod::Express), 99_000);
    }
}
