//! The candidate record produced by the extraction gateway.
//!
//! Every field is optional: a supplier email rarely states everything at once,
//! and follow-up emails in a clarification thread often carry a single fact.
//! The full record is stored verbatim in the email audit log, including fields
//! the reconciliation engine does not use (e.g. `product`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedQuote {
    /// The name of the quoted product, e.g. "Almonds".
    pub product: Option<String>,
    /// The price per pound in USD, numeric value only.
    pub price_per_pound: Option<f64>,
    /// The country where the product is sourced.
    pub country_of_origin: Option<String>,
    /// Product certifications mentioned anywhere in the email.
    pub certifications: Option<Vec<String>>,
    /// The minimum order quantity in pounds, numeric value only.
    pub minimum_order_quantity: Option<i64>,
    /// The supplier's company name, usually from the signature.
    pub company_name: Option<String>,
    /// The supplier's contact person, usually from the signature.
    pub contact_name: Option<String>,
    /// The supplier's contact email, usually from the signature.
    pub supplier_email: Option<String>,
    /// The supplier's contact phone number, usually from the signature.
    pub supplier_phone: Option<String>,
}

impl ExtractedQuote {
    /// Supplier email with surrounding whitespace removed; blank counts as absent.
    pub fn supplier_email(&self) -> Option<&str> {
        non_blank(self.supplier_email.as_deref())
    }

    pub fn company_name(&self) -> Option<&str> {
        non_blank(self.company_name.as_deref())
    }

    pub fn contact_name(&self) -> Option<&str> {
        non_blank(self.contact_name.as_deref())
    }

    pub fn supplier_phone(&self) -> Option<&str> {
        non_blank(self.supplier_phone.as_deref())
    }

    pub fn country_of_origin(&self) -> Option<&str> {
        non_blank(self.country_of_origin.as_deref())
    }

    /// Certification names as listed, or an empty slice when none were given.
    pub fn certification_names(&self) -> &[String] {
        self.certifications.as_deref().unwrap_or(&[])
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
