//! Property-based round-trip tests across the codecs.
//!
//! For any valid collection, exporting and importing again must reproduce
//! the collection field-for-field in every importable representation, and
//! exports must be deterministic.

use proptest::prelude::*;

use aib::codec::{binary, json, text, xml};
use aib::{Date, Incident, IncidentCollection};

fn date_strategy() -> impl Strategy<Value = Date> {
    (1i32..=9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| Date::new(y, m, d).unwrap())
}

fn report_id_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{8,14}"
}

/// Non-empty, newline-free printable text for the single-line fields.
fn line_field_strategy() -> impl Strategy<Value = String> {
    "[ -~]{1,24}"
}

/// Multi-line printable narratives, including blank interior lines.
fn narrative_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[ -~]{0,24}", 0..5).prop_map(|lines| lines.join("\n"))
}

fn incident_strategy() -> impl Strategy<Value = Incident> {
    (
        report_id_strategy(),
        date_strategy(),
        line_field_strategy(),
        line_field_strategy(),
        line_field_strategy(),
        0.0f64..=100.0,
        1i32..=50_000,
        any::<bool>(),
        narrative_strategy(),
    )
        .prop_map(
            |(id, date, airport, aircraft_id, aircraft_type, percent, total, midair, narrative)| {
                Incident::builder(id, date)
                    .airport(airport)
                    .aircraft(aircraft_id, aircraft_type)
                    .pilot_hours(percent, total)
                    .midair(midair)
                    .narrative(narrative)
                    .build()
                    .unwrap()
            },
        )
}

fn collection_strategy() -> impl Strategy<Value = IncidentCollection> {
    prop::collection::vec(incident_strategy(), 0..8).prop_map(IncidentCollection::from_iter)
}

proptest! {
    #[test]
    fn binary_roundtrip(collection in collection_strategy()) {
        let encoded = binary::encode(&collection).unwrap();
        prop_assert_eq!(&binary::decode(&encoded).unwrap(), &collection);
    }

    #[test]
    fn binary_compression_is_transparent(collection in collection_strategy()) {
        let wrapped = binary::encode_compressed(&collection).unwrap();
        prop_assert_eq!(&binary::decode(&wrapped).unwrap(), &collection);
    }

    #[test]
    fn text_roundtrip_both_strategies(collection in collection_strategy()) {
        let rendered = text::encode(&collection);
        let scanned = text::parse_scan(&rendered).unwrap();
        let matched = text::parse_pattern(&rendered).unwrap();
        prop_assert_eq!(&scanned, &collection);
        prop_assert_eq!(&matched, &collection);
    }

    #[test]
    fn json_roundtrip(collection in collection_strategy()) {
        let encoded = json::encode(&collection).unwrap();
        prop_assert_eq!(&json::decode(&encoded).unwrap(), &collection);

        let wrapped = json::encode_compressed(&collection).unwrap();
        prop_assert_eq!(&json::decode(&wrapped).unwrap(), &collection);
    }

    #[test]
    fn exports_are_deterministic(collection in collection_strategy()) {
        prop_assert_eq!(binary::encode(&collection).unwrap(), binary::encode(&collection).unwrap());
        prop_assert_eq!(text::encode(&collection), text::encode(&collection));
        prop_assert_eq!(json::encode(&collection).unwrap(), json::encode(&collection).unwrap());
        prop_assert_eq!(xml::encode(&collection), xml::encode(&collection));
    }

    #[test]
    fn formats_agree_on_content(collection in collection_strategy()) {
        // The same collection pushed through unrelated codecs must come
        // back as the same records.
        let via_binary = binary::decode(&binary::encode(&collection).unwrap()).unwrap();
        let via_json = json::decode(&json::encode(&collection).unwrap()).unwrap();
        let via_text = text::parse_scan(&text::encode(&collection)).unwrap();
        prop_assert_eq!(&via_binary, &via_json);
        prop_assert_eq!(&via_binary, &via_text);
    }
}
