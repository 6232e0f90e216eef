//! One-way tree-markup (XML) export.
//!
//! Builds a document with one `<incidents>` root, one `<incident>` child per
//! record carrying the scalar fields as attributes, and two text children
//! for the fields that may hold free-ish text:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <incidents>
//!   <incident report_id="20230001" date="2023-01-05" ... midair="0">
//!     <airport>JFK</airport>
//!     <narrative>Bird strike on approach.</narrative>
//!   </incident>
//! </incidents>
//! ```
//!
//! There is no import counterpart.

use std::fmt::Write as _;
use std::io::Write;

use crate::error::EncodeError;
use crate::model::{Incident, IncidentCollection};

/// Renders the collection as an XML document.
pub fn encode(collection: &IncidentCollection) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<incidents>\n");
    for incident in collection {
        encode_record(&mut out, incident);
    }
    out.push_str("</incidents>\n");
    out
}

/// Writes the collection to a destination stream as an XML document.
pub fn export<W: Write>(
    collection: &IncidentCollection,
    destination: &mut W,
) -> Result<(), EncodeError> {
    destination.write_all(encode(collection).as_bytes())?;
    destination.flush()?;
    Ok(())
}

fn encode_record(out: &mut String, incident: &Incident) {
    // String building never fails; write! into a String is infallible.
    let _ = write!(
        out,
        "  <incident report_id=\"{}\" date=\"{}\" aircraft_id=\"{}\" aircraft_type=\"{}\" \
         pilot_percent_hours_on_type=\"{}\" pilot_total_hours=\"{}\" midair=\"{}\">\n",
        escape_attr(incident.report_id()),
        incident.date(),
        escape_attr(incident.aircraft_id()),
        escape_attr(incident.aircraft_type()),
        incident.pilot_percent_hours_on_type(),
        incident.pilot_total_hours(),
        incident.midair() as u8,
    );
    let _ = write!(
        out,
        "    <airport>{}</airport>\n    <narrative>{}</narrative>\n  </incident>\n",
        escape_text(incident.airport()),
        escape_text(incident.narrative()),
    );
}

/// Escapes text content: `&`, `<`, `>`.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes attribute values: text escapes plus the quote character.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Date;

    fn sample_collection() -> IncidentCollection {
        let mut collection = IncidentCollection::new();
        collection.insert(
            Incident::builder("20230001", Date::new(2023, 1, 5).unwrap())
                .airport("JFK")
                .aircraft("N12345", "B737")
                .pilot_hours(12.5, 4300)
                .narrative("Bird strike on approach.")
                .build()
                .unwrap(),
        );
        collection
    }

    #[test]
    fn test_document_shape() {
        let xml = encode(&sample_collection());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<incidents>\n"));
        assert!(xml.ends_with("</incidents>\n"));
        assert!(xml.contains(
            "<incident report_id=\"20230001\" date=\"2023-01-05\" aircraft_id=\"N12345\" \
             aircraft_type=\"B737\" pilot_percent_hours_on_type=\"12.5\" \
             pilot_total_hours=\"4300\" midair=\"0\">"
        ));
        assert!(xml.contains("<airport>JFK</airport>"));
        assert!(xml.contains("<narrative>Bird strike on approach.</narrative>"));
    }

    #[test]
    fn test_empty_collection() {
        let xml = encode(&IncidentCollection::new());
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<incidents>\n</incidents>\n"
        );
    }

    #[test]
    fn test_escaping() {
        let mut collection = IncidentCollection::new();
        collection.insert(
            Incident::builder("20230003", Date::new(2023, 2, 1).unwrap())
                .airport("Smith & \"Jones\" Field")
                .aircraft("N<1>", "B737")
                .pilot_hours(1.0, 100)
                .narrative("Tower said \"<hold short>\" & we did.")
                .build()
                .unwrap(),
        );
        let xml = encode(&collection);
        assert!(xml.contains("aircraft_id=\"N&lt;1&gt;\""));
        assert!(xml.contains("<airport>Smith &amp; \"Jones\" Field</airport>"));
        assert!(xml.contains(
            "<narrative>Tower said \"&lt;hold short&gt;\" &amp; we did.</narrative>"
        ));
    }

    #[test]
    fn test_records_in_id_order() {
        let mut collection = sample_collection();
        collection.insert(
            Incident::builder("20220099", Date::new(2022, 9, 9).unwrap())
                .airport("ORD")
                .aircraft("N99999", "E175")
                .pilot_hours(50.0, 2000)
                .build()
                .unwrap(),
        );
        let xml = encode(&collection);
        let first = xml.find("20220099").unwrap();
        let second = xml.find("20230001").unwrap();
        assert!(first < second);
    }
}
