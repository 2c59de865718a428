//! Email reconciliation against the in-memory store and a mock extractor.

mod common;

use crate::common::{candidate, cert_names, init_tracing, seed_rfq, strings};
use rfq_core::common::{ExtractedQuote, RfqId};
use rfq_core::config::CertificationMergePolicy;
use rfq_core::domains::quotes::actions::{process_email, quote_emails, ProcessEmailError};
use rfq_core::domains::suppliers::actions::list_suppliers;
use rfq_core::kernel::{ExtractionError, InjectedFault, StoreOp, TestDependencies};

fn setup() -> TestDependencies {
    init_tracing();
    TestDependencies::new()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn scenario_a_first_email_creates_supplier_quote_and_certification() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        company_name: Some("Acme".to_string()),
        price_per_pound: Some(2.5),
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));

    let record = process_email(rfq.id, "Hi, $2.50/lb, organic. -- Acme", &deps)
        .await
        .unwrap();

    assert_eq!(record.rfq_id, rfq.id);
    assert_eq!(record.price_per_pound, Some(2.5));
    assert_eq!(record.country_of_origin, None);
    assert_eq!(record.min_order_quantity, None);
    assert_eq!(record.certifications, strings(&["Organic"]));

    let suppliers = list_suppliers(&deps).await.unwrap();
    assert_eq!(suppliers.len(), 1);
    assert_eq!(suppliers[0].company_name, "Acme");
    assert_eq!(suppliers[0].contact_email, "a@x.com");
    assert_eq!(record.supplier_id, suppliers[0].id);

    let counts = test.store.counts().unwrap();
    assert_eq!(counts.quotes, 1);
    assert_eq!(counts.emails, 1);
    assert_eq!(test.store.certification_names().unwrap(), strings(&["Organic"]));
}

#[tokio::test]
async fn scenario_b_follow_up_keeps_price_and_replaces_certifications() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        company_name: Some("Acme".to_string()),
        price_per_pound: Some(2.5),
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));
    let first = process_email(rfq.id, "first", &deps).await.unwrap();

    test.extractor.push(Ok(ExtractedQuote {
        price_per_pound: None,
        certifications: cert_names(&["Organic", "Halal"]),
        ..candidate("a@x.com")
    }));
    let second = process_email(rfq.id, "second", &deps).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.price_per_pound, Some(2.5));
    assert_eq!(second.certifications, strings(&["Halal", "Organic"]));

    let counts = test.store.counts().unwrap();
    assert_eq!(counts.suppliers, 1);
    assert_eq!(counts.quotes, 1);
    assert_eq!(counts.certifications, 2);
    assert_eq!(counts.emails, 2);
}

// =============================================================================
// Supplier resolution
// =============================================================================

#[tokio::test]
async fn known_supplier_is_reused_and_never_modified() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        company_name: Some("Acme".to_string()),
        contact_name: Some("Dana".to_string()),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(ExtractedQuote {
        company_name: Some("Acme Renamed".to_string()),
        contact_name: Some("Someone Else".to_string()),
        supplier_phone: Some("555-0100".to_string()),
        ..candidate("  a@x.com ")
    }));

    let first = process_email(rfq.id, "one", &deps).await.unwrap();
    let second = process_email(rfq.id, "two", &deps).await.unwrap();
    assert_eq!(first.supplier_id, second.supplier_id);

    let suppliers = list_suppliers(&deps).await.unwrap();
    assert_eq!(suppliers.len(), 1);
    assert_eq!(suppliers[0].company_name, "Acme");
    assert_eq!(suppliers[0].contact_name.as_deref(), Some("Dana"));
    assert_eq!(suppliers[0].contact_phone, None);
}

#[tokio::test]
async fn missing_company_name_gets_placeholder() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(candidate("sales@nuts.example")));
    process_email(rfq.id, "price to follow", &deps).await.unwrap();

    let suppliers = list_suppliers(&deps).await.unwrap();
    assert_eq!(suppliers[0].company_name, "Supplier (sales@nuts.example)");
}

#[tokio::test]
async fn missing_supplier_email_writes_nothing() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &["Organic"]).await;
    let before = test.store.counts().unwrap();

    test.extractor.push(Ok(ExtractedQuote {
        company_name: Some("Acme".to_string()),
        price_per_pound: Some(2.5),
        certifications: cert_names(&["Halal"]),
        ..Default::default()
    }));

    let err = process_email(rfq.id, "no signature", &deps).await.unwrap_err();
    assert!(matches!(err, ProcessEmailError::MissingIdentifier));
    assert!(err.is_caller_error());
    assert_eq!(test.store.counts().unwrap(), before);
}

#[tokio::test]
async fn blank_supplier_email_counts_as_missing() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(candidate("   ")));
    let err = process_email(rfq.id, "blank", &deps).await.unwrap_err();
    assert!(matches!(err, ProcessEmailError::MissingIdentifier));
    assert_eq!(test.store.counts().unwrap().suppliers, 0);
}

// =============================================================================
// Merge policy
// =============================================================================

#[tokio::test]
async fn each_field_keeps_its_latest_stated_value() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        price_per_pound: Some(2.5),
        country_of_origin: Some("USA".to_string()),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(ExtractedQuote {
        minimum_order_quantity: Some(1000),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(ExtractedQuote {
        price_per_pound: Some(2.75),
        country_of_origin: Some("".to_string()),
        ..candidate("a@x.com")
    }));

    process_email(rfq.id, "1", &deps).await.unwrap();
    process_email(rfq.id, "2", &deps).await.unwrap();
    let last = process_email(rfq.id, "3", &deps).await.unwrap();

    assert_eq!(last.price_per_pound, Some(2.75));
    assert_eq!(last.country_of_origin.as_deref(), Some("USA"));
    assert_eq!(last.min_order_quantity, Some(1000));
}

#[tokio::test]
async fn certification_set_is_replaced_wholesale() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Halal"]),
        ..candidate("a@x.com")
    }));

    process_email(rfq.id, "1", &deps).await.unwrap();
    let second = process_email(rfq.id, "2", &deps).await.unwrap();

    assert_eq!(second.certifications, strings(&["Halal"]));
    // The dropped certification still exists globally
    assert_eq!(
        test.store.certification_names().unwrap(),
        strings(&["Halal", "Organic"])
    );
}

#[tokio::test]
async fn email_without_certifications_clears_the_set_under_replace() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(ExtractedQuote {
        price_per_pound: Some(3.0),
        ..candidate("a@x.com")
    }));

    process_email(rfq.id, "1", &deps).await.unwrap();
    let second = process_email(rfq.id, "2", &deps).await.unwrap();
    assert!(second.certifications.is_empty());
    assert_eq!(test.store.counts().unwrap().quote_certifications, 0);
}

#[tokio::test]
async fn union_policy_keeps_previously_confirmed_certifications() {
    let test = setup().certification_policy(CertificationMergePolicy::Union);
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Halal"]),
        ..candidate("a@x.com")
    }));

    process_email(rfq.id, "1", &deps).await.unwrap();
    let second = process_email(rfq.id, "2", &deps).await.unwrap();
    assert_eq!(second.certifications, strings(&["Halal", "Organic"]));
}

#[tokio::test]
async fn duplicate_certification_names_create_one_row_each() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Organic", "Organic", "Halal"]),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Halal", " Organic "]),
        ..candidate("b@y.com")
    }));

    let first = process_email(rfq.id, "1", &deps).await.unwrap();
    let second = process_email(rfq.id, "2", &deps).await.unwrap();

    assert_eq!(first.certifications, strings(&["Halal", "Organic"]));
    assert_eq!(second.certifications, strings(&["Halal", "Organic"]));
    assert_eq!(test.store.counts().unwrap().certifications, 2);
}

#[tokio::test]
async fn rfq_required_certifications_are_shared_with_quotes() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &["Organic"]).await;

    test.extractor.push(Ok(ExtractedQuote {
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));
    process_email(rfq.id, "1", &deps).await.unwrap();

    assert_eq!(test.store.counts().unwrap().certifications, 1);
}

// =============================================================================
// Quote identity
// =============================================================================

#[tokio::test]
async fn one_quote_per_supplier_and_rfq() {
    let test = setup();
    let deps = test.deps();
    let almonds = seed_rfq(&deps, "Almonds", &[]).await;
    let cashews = seed_rfq(&deps, "Cashews", &[]).await;

    for _ in 0..3 {
        test.extractor.push(Ok(candidate("a@x.com")));
    }
    test.extractor.push(Ok(candidate("b@y.com")));

    let a1 = process_email(almonds.id, "1", &deps).await.unwrap();
    let a2 = process_email(almonds.id, "2", &deps).await.unwrap();
    let c1 = process_email(cashews.id, "3", &deps).await.unwrap();
    let b1 = process_email(almonds.id, "4", &deps).await.unwrap();

    assert_eq!(a1.id, a2.id);
    assert_ne!(a1.id, c1.id);
    assert_ne!(a1.id, b1.id);
    assert_eq!(test.store.counts().unwrap().quotes, 3);
}

#[tokio::test]
async fn audit_log_keeps_raw_text_and_full_payload_in_order() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        product: Some("Almonds".to_string()),
        price_per_pound: Some(2.5),
        ..candidate("a@x.com")
    }));
    test.extractor.push(Ok(candidate("a@x.com")));

    let record = process_email(rfq.id, "first email", &deps).await.unwrap();
    process_email(rfq.id, "second email", &deps).await.unwrap();

    let emails = quote_emails(record.id, &deps).await.unwrap();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0].raw_text, "first email");
    assert_eq!(emails[1].raw_text, "second email");
    assert_eq!(emails[0].extracted_data["product"], "Almonds");
    assert_eq!(emails[0].extracted_data["price_per_pound"], 2.5);
    assert!(emails[1].extracted_data["price_per_pound"].is_null());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn unknown_rfq_is_rejected_before_extraction() {
    let test = setup();
    let deps = test.deps();
    test.extractor.push(Ok(candidate("a@x.com")));

    let err = process_email(RfqId::new(), "text", &deps).await.unwrap_err();

    assert!(matches!(err, ProcessEmailError::RfqNotFound(_)));
    assert!(err.is_caller_error());
    assert_eq!(test.extractor.call_count(), 0);
    assert_eq!(test.store.counts().unwrap().suppliers, 0);
}

#[tokio::test]
async fn gateway_unavailable_writes_nothing() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;
    let before = test.store.counts().unwrap();

    test.extractor
        .push(Err(ExtractionError::Unavailable("timed out after 30s".to_string())));

    let err = process_email(rfq.id, "text", &deps).await.unwrap_err();
    assert!(matches!(err, ProcessEmailError::GatewayUnavailable(_)));
    assert!(!err.is_retryable());
    assert!(!err.is_caller_error());
    assert_eq!(test.extractor.call_count(), 1);
    assert_eq!(test.store.counts().unwrap(), before);
}

#[tokio::test]
async fn gateway_invalid_output_preserves_raw_payload() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;
    let before = test.store.counts().unwrap();

    test.extractor.push(Err(ExtractionError::InvalidOutput {
        reason: "invalid type: string \"cheap\", expected f64".to_string(),
        raw: Some(r#"{"price_per_pound":"cheap"}"#.to_string()),
    }));

    let err = process_email(rfq.id, "text", &deps).await.unwrap_err();
    match &err {
        ProcessEmailError::GatewayInvalidOutput { raw, .. } => {
            assert_eq!(raw.as_deref(), Some(r#"{"price_per_pound":"cheap"}"#));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(test.store.counts().unwrap(), before);
}

#[tokio::test]
async fn conflicting_quote_insert_rolls_back_everything() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;
    let before = test.store.counts().unwrap();

    test.store.inject_fault(
        StoreOp::InsertQuote,
        InjectedFault::Conflict("quotes_supplier_rfq_key".to_string()),
    );
    test.extractor.push(Ok(ExtractedQuote {
        company_name: Some("Acme".to_string()),
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));

    let err = process_email(rfq.id, "text", &deps).await.unwrap_err();
    match &err {
        ProcessEmailError::StorageConflict { constraint } => {
            assert_eq!(constraint, "quotes_supplier_rfq_key")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
    // Supplier and certification created earlier in the transaction are gone
    assert_eq!(test.store.counts().unwrap(), before);

    // A retry succeeds once the conflict is gone
    test.extractor.push(Ok(candidate("a@x.com")));
    process_email(rfq.id, "text", &deps).await.unwrap();
    assert_eq!(test.store.counts().unwrap().quotes, 1);
}

#[tokio::test]
async fn audit_log_failure_undoes_the_quote_update() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;

    test.extractor.push(Ok(ExtractedQuote {
        price_per_pound: Some(2.5),
        certifications: cert_names(&["Organic"]),
        ..candidate("a@x.com")
    }));
    let first = process_email(rfq.id, "1", &deps).await.unwrap();
    let before = test.store.counts().unwrap();

    test.store.inject_fault(
        StoreOp::InsertEmail,
        InjectedFault::Internal("disk full".to_string()),
    );
    test.extractor.push(Ok(ExtractedQuote {
        price_per_pound: Some(9.99),
        certifications: cert_names(&["Kosher"]),
        ..candidate("a@x.com")
    }));

    let err = process_email(rfq.id, "2", &deps).await.unwrap_err();
    assert!(matches!(err, ProcessEmailError::InternalFailure));
    assert_eq!(err.to_string(), "internal failure");
    assert_eq!(test.store.counts().unwrap(), before);

    let emails = quote_emails(first.id, &deps).await.unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(test.store.certification_names().unwrap(), strings(&["Organic"]));
}

#[tokio::test]
async fn commit_failure_is_reported_and_nothing_is_kept() {
    let test = setup();
    let deps = test.deps();
    let rfq = seed_rfq(&deps, "Almonds", &[]).await;
    let before = test.store.counts().unwrap();

    test.store.inject_fault(
        StoreOp::Commit,
        InjectedFault::Conflict("serialization".to_string()),
    );
    test.extractor.push(Ok(candidate("a@x.com")));

    let err = process_email(rfq.id, "text", &deps).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(test.store.counts().unwrap(), before);
}
