//! Converts an incident archive between the supported representations.
//!
//! Usage: convert <input> <output>
//!
//! Formats are picked by file extension: `.aib` (binary), `.aib.gz`
//! (gzip-wrapped binary), `.txt`, `.json`, `.json.gz`, `.xml` (write only).

use std::fs;
use std::process::exit;

use aib::IncidentCollection;
use aib::codec::{binary, json, text, xml};

fn main() {
    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("usage: convert <input> <output>");
        exit(2);
    };

    let data = fs::read(&input).expect("failed to read input");
    let mut collection = IncidentCollection::new();

    if input.ends_with(".aib") || input.ends_with(".aib.gz") {
        binary::import(&mut collection, &mut data.as_slice()).expect("binary import failed");
    } else if input.ends_with(".txt") {
        text::import_scan(&mut collection, &mut data.as_slice()).expect("text import failed");
    } else if input.ends_with(".json") || input.ends_with(".json.gz") {
        json::import(&mut collection, &mut data.as_slice()).expect("json import failed");
    } else {
        eprintln!("unrecognized input extension: {input}");
        exit(2);
    }

    println!("read {} records from {}", collection.len(), input);

    let mut out = Vec::new();
    if output.ends_with(".aib.gz") {
        binary::export_compressed(&collection, &mut out).expect("binary export failed");
    } else if output.ends_with(".aib") {
        binary::export(&collection, &mut out).expect("binary export failed");
    } else if output.ends_with(".txt") {
        text::export(&collection, &mut out).expect("text export failed");
    } else if output.ends_with(".json.gz") {
        json::export_compressed(&collection, &mut out).expect("json export failed");
    } else if output.ends_with(".json") {
        json::export(&collection, &mut out).expect("json export failed");
    } else if output.ends_with(".xml") {
        xml::export(&collection, &mut out).expect("xml export failed");
    } else {
        eprintln!("unrecognized output extension: {output}");
        exit(2);
    }

    fs::write(&output, &out).expect("failed to write output");
    println!("wrote {} bytes to {}", out.len(), output);
}
