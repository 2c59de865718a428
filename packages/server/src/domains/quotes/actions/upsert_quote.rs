//! Find or create the quote for a (supplier, RFQ) pair and merge candidate terms.

use tracing::{debug, info};

use crate::common::{CertificationId, ExtractedQuote, RfqId, SupplierId};
use crate::config::CertificationMergePolicy;
use crate::domains::certifications::models::Certification;
use crate::domains::quotes::models::Quote;
use crate::kernel::{StoreResult, StoreTx};

/// The scalar terms a candidate can state about a quote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteFields {
    pub price_per_pound: Option<f64>,
    pub country_of_origin: Option<String>,
    pub min_order_quantity: Option<i64>,
}

impl QuoteFields {
    pub fn from_candidate(candidate: &ExtractedQuote) -> Self {
        Self {
            price_per_pound: candidate.price_per_pound,
            country_of_origin: candidate.country_of_origin().map(str::to_string),
            min_order_quantity: candidate.minimum_order_quantity,
        }
    }

    /// Overwrite with stated values; unstated (`None`) values never erase.
    pub fn merge_into(self, quote: &mut Quote) {
        if self.price_per_pound.is_some() {
            quote.price_per_pound = self.price_per_pound;
        }
        if self.country_of_origin.is_some() {
            quote.country_of_origin = self.country_of_origin;
        }
        if self.min_order_quantity.is_some() {
            quote.min_order_quantity = self.min_order_quantity;
        }
    }
}

/// Result of an upsert: the stored quote and its certifications after the merge.
#[derive(Debug, Clone)]
pub struct UpsertedQuote {
    pub quote: Quote,
    pub certifications: Vec<Certification>,
    pub created: bool,
}

impl UpsertedQuote {
    pub fn certification_names(&self) -> Vec<String> {
        self.certifications.iter().map(|c| c.name.clone()).collect()
    }
}

/// Combine the stored certification set with the latest email's set.
fn merge_certifications(
    existing: Vec<Certification>,
    latest: &[Certification],
    policy: CertificationMergePolicy,
) -> Vec<Certification> {
    match policy {
        CertificationMergePolicy::Replace => latest.to_vec(),
        CertificationMergePolicy::Union => {
            let mut merged = existing;
            for certification in latest {
                if !merged.iter().any(|c| c.id == certification.id) {
                    merged.push(certification.clone());
                }
            }
            merged
        }
    }
}

pub async fn upsert_quote(
    supplier_id: SupplierId,
    rfq_id: RfqId,
    fields: QuoteFields,
    certifications: &[Certification],
    policy: CertificationMergePolicy,
    tx: &mut dyn StoreTx,
) -> StoreResult<UpsertedQuote> {
    let (quote, certifications, created) = match tx.find_quote_for_pair(supplier_id, rfq_id).await? {
        Some(mut quote) => {
            debug!(quote_id = %quote.id, "Merging into existing quote");
            let existing = match policy {
                CertificationMergePolicy::Replace => Vec::new(),
                CertificationMergePolicy::Union => tx
                    .certifications_for_quotes(&[quote.id])
                    .await?
                    .into_iter()
                    .map(|(_, c)| c)
                    .collect(),
            };
            fields.merge_into(&mut quote);
            let quote = tx.update_quote_terms(&quote).await?;
            (quote, merge_certifications(existing, certifications, policy), false)
        }
        None => {
            let mut quote = Quote::builder().supplier_id(supplier_id).rfq_id(rfq_id).build();
            fields.merge_into(&mut quote);
            let quote = tx.insert_quote(&quote).await?;
            (quote, certifications.to_vec(), true)
        }
    };

    let ids: Vec<CertificationId> = certifications.iter().map(|c| c.id).collect();
    tx.replace_quote_certifications(quote.id, &ids).await?;

    info!(
        quote_id = %quote.id,
        supplier_id = %supplier_id,
        rfq_id = %rfq_id,
        created,
        certifications = ids.len(),
        "Upserted quote"
    );

    Ok(UpsertedQuote {
        quote,
        certifications,
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> Quote {
        Quote::builder()
            .supplier_id(SupplierId::new())
            .rfq_id(RfqId::new())
            .price_per_pound(Some(2.5))
            .country_of_origin(Some("USA".to_string()))
            .build()
    }

    #[test]
    fn test_null_never_erases() {
        let mut q = quote();
        QuoteFields::default().merge_into(&mut q);
        assert_eq!(q.price_per_pound, Some(2.5));
        assert_eq!(q.country_of_origin.as_deref(), Some("USA"));
        assert_eq!(q.min_order_quantity, None);
    }

    #[test]
    fn test_stated_values_overwrite() {
        let mut q = quote();
        QuoteFields {
            price_per_pound: Some(3.1),
            country_of_origin: None,
            min_order_quantity: Some(500),
        }
        .merge_into(&mut q);
        assert_eq!(q.price_per_pound, Some(3.1));
        assert_eq!(q.country_of_origin.as_deref(), Some("USA"));
        assert_eq!(q.min_order_quantity, Some(500));
    }

    #[test]
    fn test_blank_country_is_unstated() {
        let candidate = ExtractedQuote {
            country_of_origin: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(QuoteFields::from_candidate(&candidate).country_of_origin, None);
    }

    #[test]
    fn test_replace_policy_drops_previous_certifications() {
        let organic = Certification::new("Organic");
        let halal = Certification::new("Halal");
        let merged = merge_certifications(
            vec![organic],
            &[halal.clone()],
            CertificationMergePolicy::Replace,
        );
        assert_eq!(merged, vec![halal]);
    }

    #[test]
    fn test_union_policy_keeps_previous_certifications() {
        let organic = Certification::new("Organic");
        let halal = Certification::new("Halal");
        let merged = merge_certifications(
            vec![organic.clone()],
            &[halal.clone(), organic.clone()],
            CertificationMergePolicy::Union,
        );
        assert_eq!(merged, vec![organic, halal]);
    }
}
