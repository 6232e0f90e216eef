//! Benchmark for AIB serialization using synthetic incident data.
//!
//! Measures encode/decode throughput and output sizes for the binary,
//! text, JSON, and XML codecs on a generated collection.

use std::time::Instant;

use aib::codec::{binary, json, text, xml};
use aib::{Date, Incident, IncidentCollection};

const AIRPORTS: [&str; 8] = [
    "JFK", "Schiphol", "Heathrow", "Narita", "ORD", "LAX", "Changi", "Frankfurt",
];

const TYPES: [&str; 6] = ["B737", "A320", "E175", "DHC-8", "B777", "A350"];

const PHRASES: [&str; 4] = [
    "Bird strike on approach; no damage found on inspection.",
    "Wake turbulence on short final.\n\nGo-around flown without incident.",
    "Runway incursion by ground vehicle; takeoff rejected at low speed.",
    "Temporary loss of radio contact during handoff.",
];

/// Builds a deterministic synthetic collection of the given size.
fn build_collection(count: usize) -> IncidentCollection {
    let mut collection = IncidentCollection::new();
    for i in 0..count {
        let ordinal = Date::new(2020, 1, 1).unwrap().to_ordinal() + (i % 1460) as u32;
        let incident = Incident::builder(
            format!("{:08}X{:04}", 20_200_000 + i, i % 7919),
            Date::from_ordinal(ordinal).unwrap(),
        )
        .airport(AIRPORTS[i % AIRPORTS.len()])
        .aircraft(format!("N{:05}", i % 100_000), TYPES[i % TYPES.len()])
        .pilot_hours((i % 1001) as f64 / 10.0, 100 + (i % 20_000) as i32)
        .midair(i % 17 == 0)
        .narrative(PHRASES[i % PHRASES.len()])
        .build()
        .expect("synthetic incident must be valid");
        collection.insert(incident);
    }
    collection
}

fn throughput(bytes: usize, elapsed: std::time::Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
}

fn main() {
    let count: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000);

    println!("Building {count} synthetic incidents...");
    let collection = build_collection(count);
    println!("Collection size: {} records\n", collection.len());

    const ITERS: u32 = 10;

    // --- Binary ---
    let start = Instant::now();
    let mut encoded = Vec::new();
    for _ in 0..ITERS {
        encoded = binary::encode(&collection).expect("binary encode failed");
    }
    let encode_time = start.elapsed() / ITERS;
    println!(
        "Binary encode: {} bytes in {:?} ({:.2} MB/s)",
        encoded.len(),
        encode_time,
        throughput(encoded.len(), encode_time)
    );

    let start = Instant::now();
    let compressed = binary::encode_compressed(&collection).expect("compress failed");
    println!(
        "Binary encode (gzip): {} bytes in {:?} ({:.1}x smaller)",
        compressed.len(),
        start.elapsed(),
        encoded.len() as f64 / compressed.len() as f64
    );

    let start = Instant::now();
    let mut decoded = IncidentCollection::new();
    for _ in 0..ITERS {
        decoded = binary::decode(&encoded).expect("binary decode failed");
    }
    let decode_time = start.elapsed() / ITERS;
    assert_eq!(decoded.len(), collection.len());
    println!(
        "Binary decode: {:?} ({:.2} MB/s)",
        decode_time,
        throughput(encoded.len(), decode_time)
    );

    let start = Instant::now();
    let from_gz = binary::decode(&compressed).expect("compressed decode failed");
    assert_eq!(from_gz.len(), collection.len());
    println!("Binary decode (gzip): {:?}", start.elapsed());

    // --- Text ---
    let start = Instant::now();
    let rendered = text::encode(&collection);
    println!(
        "\nText encode: {} bytes in {:?}",
        rendered.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let scanned = text::parse_scan(&rendered).expect("scan parse failed");
    let scan_time = start.elapsed();
    println!(
        "Text parse (scan): {:?} ({:.2} MB/s)",
        scan_time,
        throughput(rendered.len(), scan_time)
    );

    let start = Instant::now();
    let matched = text::parse_pattern(&rendered).expect("pattern parse failed");
    let pattern_time = start.elapsed();
    println!(
        "Text parse (pattern): {:?} ({:.2} MB/s)",
        pattern_time,
        throughput(rendered.len(), pattern_time)
    );
    assert_eq!(scanned, matched);

    // --- JSON ---
    let start = Instant::now();
    let json_bytes = json::encode(&collection).expect("json encode failed");
    println!(
        "\nJSON encode: {} bytes in {:?}",
        json_bytes.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let from_json = json::decode(&json_bytes).expect("json decode failed");
    assert_eq!(from_json.len(), collection.len());
    println!("JSON decode: {:?}", start.elapsed());

    // --- XML ---
    let start = Instant::now();
    let xml_doc = xml::encode(&collection);
    println!(
        "\nXML encode: {} bytes in {:?}",
        xml_doc.len(),
        start.elapsed()
    );

    // --- Summary ---
    println!("\n=== Size Summary ===");
    println!("Records:        {}", collection.len());
    println!("Binary:         {} bytes", encoded.len());
    println!("Binary (gzip):  {} bytes", compressed.len());
    println!("Text:           {} bytes", rendered.len());
    println!("JSON:           {} bytes", json_bytes.len());
    println!("XML:            {} bytes", xml_doc.len());
}
