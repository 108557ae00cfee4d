//! Randomized round trips of every value kind through the wire format
//!
//! Values go out as parameters (and are checked in the mock host's record) and
//! come back as row cells (and are checked after the marshaller decodes them).

#![cfg(feature = "mock")]

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveTime};
use pgquery::{
    Interval, MockHost, PgQuery, PgValue, QueryMarshaller, ResponseBuffer, ResultRow,
    ResultRowEntry,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const KINDS: u32 = 25;

fn random_string(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..12);
    (0..len)
        .map(|_| match rng.gen_range(0..4) {
            0 => 'é',
            1 => '"',
            2 => '字',
            _ => rng.gen_range('a'..='z'),
        })
        .collect()
}

fn random_value(rng: &mut StdRng, depth: usize) -> PgValue {
    let kind = if depth > 2 {
        rng.gen_range(0..KINDS - 1)
    } else {
        rng.gen_range(0..KINDS)
    };
    match kind {
        0 => PgValue::Null,
        1 => PgValue::Bool(rng.gen()),
        2 => PgValue::Int2(rng.gen()),
        3 => PgValue::Int4(rng.gen()),
        4 => PgValue::Int8(rng.gen()),
        5 => PgValue::Float4(rng.gen_range(-1.0e6f32..1.0e6)),
        6 => PgValue::Float8(rng.gen_range(-1.0e12f64..1.0e12)),
        7 => PgValue::Numeric(format!("{}.{:04}", rng.gen::<i32>(), rng.gen_range(0..10_000))),
        8 => PgValue::Text(random_string(rng)),
        9 => PgValue::Varchar(random_string(rng)),
        10 => PgValue::Bpchar(random_string(rng)),
        11 => PgValue::Bytea((0..rng.gen_range(0..16)).map(|_| rng.gen()).collect()),
        12 => PgValue::Date(
            NaiveDate::from_num_days_from_ce_opt(rng.gen_range(1..1_000_000)).unwrap(),
        ),
        13 => PgValue::Time(
            NaiveTime::from_num_seconds_from_midnight_opt(
                rng.gen_range(0..86_400),
                rng.gen_range(0..1_000_000) * 1_000,
            )
            .unwrap(),
        ),
        14 => PgValue::Timestamp(
            DateTime::from_timestamp_micros(rng.gen_range(-4_000_000_000_000_000..4_000_000_000_000_000))
                .unwrap()
                .naive_utc(),
        ),
        15 => PgValue::TimestampTz(
            DateTime::from_timestamp_micros(rng.gen_range(-4_000_000_000_000_000..4_000_000_000_000_000))
                .unwrap(),
        ),
        16 => PgValue::Interval(Interval::new(rng.gen(), rng.gen(), rng.gen())),
        17 => PgValue::Uuid(uuid::Uuid::from_bytes(rng.gen())),
        18 => PgValue::Json(serde_json::json!({ "n": rng.gen::<i64>(), "s": random_string(rng) })),
        19 => PgValue::Jsonb(serde_json::json!([rng.gen::<bool>(), null, random_string(rng)])),
        20 => PgValue::Inet(if rng.gen() {
            IpAddr::V4(Ipv4Addr::from(rng.gen::<u32>()))
        } else {
            IpAddr::V6(Ipv6Addr::from(rng.gen::<u128>()))
        }),
        21 => PgValue::MacAddr(rng.gen()),
        22 => PgValue::Point(rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)),
        23 => PgValue::Hstore(
            (0..rng.gen_range(0..4))
                .map(|_| {
                    let value = if rng.gen() { Some(random_string(rng)) } else { None };
                    (random_string(rng), value)
                })
                .collect(),
        ),
        _ => PgValue::Array(
            (0..rng.gen_range(0..4))
                .map(|_| random_value(rng, depth + 1))
                .collect(),
        ),
    }
}

#[test]
fn test_random_params_reach_host_unchanged() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    for _ in 0..200 {
        let params: Vec<PgValue> = (0..rng.gen_range(0..8))
            .map(|_| random_value(&mut rng, 0))
            .collect();
        let host = MockHost::new().append_query_results(vec![vec![]]);
        let db = QueryMarshaller::new(&host);

        db.query("SELECT 1", &params).unwrap();

        assert_eq!(host.calls()[0].params, params);
    }
}

#[test]
fn test_random_rows_reach_guest_unchanged() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    for _ in 0..100 {
        let rows: Vec<ResultRow> = (0..rng.gen_range(0..5))
            .map(|_| {
                (0..rng.gen_range(0..6))
                    .map(|i| ResultRowEntry::new(format!("c{i}"), random_value(&mut rng, 0)))
                    .collect()
            })
            .collect();
        let db = QueryMarshaller::new(MockHost::new().append_query_results(vec![rows.clone()]));

        assert_eq!(db.query("SELECT *", &[]).unwrap(), rows);
    }
}

#[test]
fn test_every_kind_survives_encode_and_decode() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);
    let mut seen = std::collections::HashSet::new();
    while seen.len() < KINDS as usize {
        let value = random_value(&mut rng, 0);
        seen.insert(value.type_name());
        let reply = ResponseBuffer::encode_rows(&Ok(vec![ResultRow::from(vec![
            ResultRowEntry::new("v", value.clone()),
        ])]))
        .unwrap();
        let rows = reply.into_rows().unwrap().unwrap();
        assert_eq!(rows[0].get(0), Some(&value));
    }
}
