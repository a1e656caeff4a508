//! Record service: coercion on write, rendering on read.

mod common;

use collector_core::{ErrorKind, FieldInput, FieldType, RecordRepository};
use common::{field, form, save_request, text, Harness};
use serde_json::json;

async fn coins(h: &Harness) {
    h.catalog
        .registry
        .save(
            h.owner,
            save_request(
                None,
                "Coins",
                vec![
                    field("Country", FieldType::Text),
                    field("Year", FieldType::Number),
                    field("Proof", FieldType::Boolean),
                ],
                false,
            ),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_coerces_and_fills_defaults() {
    let h = Harness::new();
    coins(&h).await;

    let record = h
        .catalog
        .records
        .create(
            h.owner,
            "coins",
            form(&[("country", text("Peru")), ("year", text(" 1921 "))]),
        )
        .await
        .unwrap();

    assert_eq!(
        serde_json::Value::Object(record.fields),
        json!({"country": "Peru", "year": 1921, "proof": false})
    );
}

#[tokio::test]
async fn test_non_numeric_number_is_rejected_and_nothing_written() {
    let h = Harness::new();
    coins(&h).await;

    let err = h
        .catalog
        .records
        .create(h.owner, "coins", form(&[("year", text("abc"))]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("year"));
    assert_eq!(h.records.count(h.owner, None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_field_and_category() {
    let h = Harness::new();
    coins(&h).await;

    let err = h
        .catalog
        .records
        .create(h.owner, "coins", form(&[("mintage", text("5000"))]))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = h
        .catalog
        .records
        .create(h.owner, "stamps", form(&[]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_uses_schema_then_stored_shape() {
    let h = Harness::new();
    coins(&h).await;
    let record = h
        .catalog
        .records
        .create(h.owner, "coins", form(&[("country", text("Peru"))]))
        .await
        .unwrap();

    // drop "proof" from the schema without migrating; the record keeps it
    h.catalog
        .registry
        .save(
            h.owner,
            save_request(
                Some("coins"),
                "Coins",
                vec![field("Country", FieldType::Text), field("Year", FieldType::Number)],
                false,
            ),
        )
        .await
        .unwrap();

    let updated = h
        .catalog
        .records
        .update(
            h.owner,
            record.id,
            form(&[("year", FieldInput::Number(1999.0)), ("proof", text("yes"))]),
        )
        .await
        .unwrap();
    assert_eq!(updated.fields.get("year"), Some(&json!(1999)));
    assert_eq!(updated.fields.get("proof"), Some(&json!(true)));

    let err = h
        .catalog
        .records
        .update(h.owner, record.id, form(&[("grade", text("9"))]))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_delete_and_list_filter() {
    let h = Harness::new();
    coins(&h).await;
    let a = h
        .catalog
        .records
        .create(h.owner, "coins", form(&[]))
        .await
        .unwrap();
    h.catalog
        .records
        .create(h.owner, "coins", form(&[]))
        .await
        .unwrap();

    assert_eq!(h.catalog.records.list(h.owner, Some("coins")).await.unwrap().len(), 2);
    assert!(h.catalog.records.list(h.owner, Some("coin")).await.unwrap().is_empty());

    h.catalog.records.delete(h.owner, a.id).await.unwrap();
    assert_eq!(h.catalog.records.list(h.owner, None).await.unwrap().len(), 1);
    assert!(h.catalog.records.delete(h.owner, a.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_count_matches_category_exactly() {
    let h = Harness::new();
    coins(&h).await;
    for _ in 0..3 {
        h.catalog
            .records
            .create(h.owner, "coins", form(&[]))
            .await
            .unwrap();
    }

    assert_eq!(h.catalog.records.count(h.owner, Some("coins")).await.unwrap(), 3);
    assert_eq!(h.catalog.records.count(h.owner, Some("coin")).await.unwrap(), 0);
    assert_eq!(h.catalog.records.count(h.owner, None).await.unwrap(), 3);

    let other = collector_core::OwnerId(uuid::Uuid::new_v4());
    assert_eq!(h.catalog.records.count(other, Some("coins")).await.unwrap(), 0);
}

#[tokio::test]
async fn test_table_renders_through_schema() {
    let h = Harness::new();
    coins(&h).await;
    h.catalog
        .records
        .create(
            h.owner,
            "coins",
            form(&[
                ("country", text("")),
                ("year", text("1921")),
                ("proof", FieldInput::Checked(true)),
            ]),
        )
        .await
        .unwrap();

    let table = h.catalog.records.table(h.owner, Some("coins")).await.unwrap();
    let titles: Vec<&str> = table.columns.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Country", "Year", "Proof"]);
    assert_eq!(table.rows[0].cells, vec!["N/A", "1921", "Yes"]);
}

#[tokio::test]
async fn test_authenticate() {
    let h = Harness::new();
    assert_eq!(h.catalog.authenticate(common::TOKEN).await.unwrap(), h.owner);
    assert_eq!(
        h.catalog.authenticate("forged").await.unwrap_err().kind(),
        ErrorKind::AccessDenied
    );
}
