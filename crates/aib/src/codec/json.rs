//! The generic object-graph codec.
//!
//! Serializes the whole collection through a self-describing encoding
//! (JSON) instead of a bespoke wire layout: one top-level object mapping
//! `report_id` to a record object, dates as ISO-8601 strings. Output may be
//! transparently gzip-wrapped exactly like the binary format.
//!
//! Deserialization bypasses the `Incident` constructor, so every rehydrated
//! record is re-validated through the builder on import; the field
//! invariants hold for this path too.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::codec::compress::{decompress_if_gzip, gzip_compress};
use crate::error::{DecodeError, EncodeError};
use crate::limits::MAX_DUMP_SIZE;
use crate::model::{Date, Incident, IncidentCollection};

/// Wire shape of one record. Field values only; the report id is the key
/// of the enclosing map.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIncident {
    date: String,
    aircraft_id: String,
    aircraft_type: String,
    airport: String,
    pilot_percent_hours_on_type: f64,
    pilot_total_hours: i32,
    midair: bool,
    narrative: String,
}

impl From<&Incident> for RawIncident {
    fn from(incident: &Incident) -> Self {
        Self {
            date: incident.date().to_string(),
            aircraft_id: incident.aircraft_id().to_string(),
            aircraft_type: incident.aircraft_type().to_string(),
            airport: incident.airport().to_string(),
            pilot_percent_hours_on_type: incident.pilot_percent_hours_on_type(),
            pilot_total_hours: incident.pilot_total_hours(),
            midair: incident.midair(),
            narrative: incident.narrative().to_string(),
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes the collection as an uncompressed JSON object graph.
pub fn encode(collection: &IncidentCollection) -> Result<Vec<u8>, EncodeError> {
    let raw: BTreeMap<&str, RawIncident> = collection
        .iter()
        .map(|incident| (incident.report_id(), RawIncident::from(incident)))
        .collect();
    serde_json::to_vec_pretty(&raw).map_err(|e| EncodeError::Serialization(e.to_string()))
}

/// Encodes the collection as a gzip-wrapped JSON object graph.
pub fn encode_compressed(collection: &IncidentCollection) -> Result<Vec<u8>, EncodeError> {
    gzip_compress(&encode(collection)?)
}

/// Writes the collection to a destination stream, uncompressed.
pub fn export<W: Write>(
    collection: &IncidentCollection,
    destination: &mut W,
) -> Result<(), EncodeError> {
    destination.write_all(&encode(collection)?)?;
    destination.flush()?;
    Ok(())
}

/// Writes the collection to a destination stream, gzip-wrapped.
pub fn export_compressed<W: Write>(
    collection: &IncidentCollection,
    destination: &mut W,
) -> Result<(), EncodeError> {
    destination.write_all(&encode_compressed(collection)?)?;
    destination.flush()?;
    Ok(())
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a JSON object graph (compressed or not) into a new collection.
///
/// Structural or type mismatches surface as [`DecodeError::CorruptData`];
/// records that deserialize but violate an `Incident` invariant surface as
/// [`DecodeError::InvalidRecord`] with the record's position in key order.
pub fn decode(data: &[u8]) -> Result<IncidentCollection, DecodeError> {
    let data = decompress_if_gzip(data)?;
    if data.len() > MAX_DUMP_SIZE {
        return Err(DecodeError::TooLarge {
            size: data.len(),
            max: MAX_DUMP_SIZE,
        });
    }

    let raw: BTreeMap<String, RawIncident> =
        serde_json::from_slice(&data).map_err(|e| DecodeError::CorruptData {
            message: e.to_string(),
        })?;

    let mut collection = IncidentCollection::new();
    for (index, (report_id, record)) in raw.into_iter().enumerate() {
        let invalid = |source| DecodeError::InvalidRecord {
            record: index,
            source,
        };
        let date = Date::parse_iso(&record.date).map_err(|e| invalid(e.into()))?;
        let incident = Incident::builder(report_id, date)
            .airport(record.airport)
            .aircraft(record.aircraft_id, record.aircraft_type)
            .pilot_hours(record.pilot_percent_hours_on_type, record.pilot_total_hours)
            .midair(record.midair)
            .narrative(record.narrative)
            .build()
            .map_err(invalid)?;
        collection.insert(incident);
    }
    Ok(collection)
}

/// Reads a source stream to its end and replaces the collection's contents
/// with the decoded records.
///
/// On any error the target collection is left untouched.
pub fn import<R: Read>(
    collection: &mut IncidentCollection,
    source: &mut R,
) -> Result<(), DecodeError> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    *collection = decode(&data)?;
    Ok(())
}
