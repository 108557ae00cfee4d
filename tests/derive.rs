//! Integration tests for `#[derive(FromRow)]`

#![cfg(feature = "mock")]

use chrono::NaiveDate;
use pgquery::{
    params, query_as, FromRow, MockHost, PgValue, QueryErrorKind, QueryMarshaller, ResultRow,
    ResultRowEntry, ValueExtractionError,
};

#[derive(Debug, PartialEq, FromRow)]
struct Account {
    id: i64,
    #[column_name("display_name")]
    name: String,
    email: Option<String>,
    joined: NaiveDate,
    tags: Vec<String>,
}

#[derive(Debug, PartialEq, FromRow)]
struct Count(i64);

#[derive(Debug, PartialEq, FromRow)]
struct Keyword {
    r#type: String,
}

fn account_row(id: i64, email: PgValue) -> ResultRow {
    ResultRow::from(vec![
        ResultRowEntry::new("id", PgValue::Int8(id)),
        ResultRowEntry::new("display_name", PgValue::Varchar(format!("user{id}"))),
        ResultRowEntry::new("email", email),
        ResultRowEntry::new(
            "joined",
            PgValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        ),
        ResultRowEntry::new(
            "tags",
            PgValue::Array(vec![PgValue::Text("a".into()), PgValue::Text("b".into())]),
        ),
    ])
}

#[test]
fn test_derived_struct_maps_columns_by_name() {
    let host = MockHost::new().append_query_results(vec![vec![
        account_row(1, PgValue::Text("one@example.com".into())),
        account_row(2, PgValue::Null),
    ]]);
    let db = QueryMarshaller::new(host);

    let accounts: Vec<Account> =
        query_as(&db, "SELECT * FROM accounts WHERE id > $1", &params![0i64]).unwrap();

    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].name, "user1");
    assert_eq!(accounts[0].email.as_deref(), Some("one@example.com"));
    assert_eq!(accounts[1].email, None);
    assert_eq!(accounts[1].tags, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_derived_tuple_struct_maps_by_position() {
    let row = ResultRow::from(vec![ResultRowEntry::new("count", PgValue::Int4(12))]);
    assert_eq!(Count::from_row(&row), Ok(Count(12)));
}

#[test]
fn test_raw_identifier_field_uses_plain_column_name() {
    let row = ResultRow::from(vec![ResultRowEntry::new("type", PgValue::Text("admin".into()))]);
    assert_eq!(
        Keyword::from_row(&row),
        Ok(Keyword {
            r#type: "admin".into()
        })
    );
}

#[test]
fn test_missing_column_is_reported() {
    let row = ResultRow::from(vec![ResultRowEntry::new("id", PgValue::Int8(1))]);
    assert_eq!(
        Account::from_row(&row),
        Err(ValueExtractionError::MissingColumn("display_name".into()))
    );
}

#[test]
fn test_mapping_failure_surfaces_as_unexpected() {
    let mut bad = account_row(3, PgValue::Null).into_entries();
    bad[0] = ResultRowEntry::new("id", PgValue::Text("three".into()));
    let db = QueryMarshaller::new(
        MockHost::new().append_query_results(vec![vec![ResultRow::from(bad)]]),
    );

    let err = query_as::<Account, _>(&db, "SELECT * FROM accounts", &[]).unwrap_err();

    assert_eq!(err.kind, QueryErrorKind::Unexpected);
}
