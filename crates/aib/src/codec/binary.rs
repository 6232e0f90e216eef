//! The AIB1 framed binary codec.
//!
//! Wire layout, little-endian throughout:
//!
//! ```text
//! "AIB1"            4-byte magic
//! u16               format version
//! record*           one per incident, in ascending report_id order
//! ```
//!
//! Each record is five `u16` length-prefixed UTF-8 strings — `report_id`,
//! `airport`, `aircraft_id`, `aircraft_type`, `narrative` — followed by a
//! fixed-width numeric block: `u32` date ordinal, `f64` percent hours on
//! type, `i32` total hours, one boolean byte for `midair`.
//!
//! The whole stream may be transparently gzip-wrapped; the decoder sniffs
//! the gzip magic and inflates before parsing.

use std::io::{Read, Write};

use crate::codec::compress::{decompress_if_gzip, gzip_compress};
use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{FORMAT_VERSION, MAGIC, MAX_DUMP_SIZE, MIN_FORMAT_VERSION};
use crate::model::{Date, Incident, IncidentCollection};

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes the collection into uncompressed AIB1 bytes.
pub fn encode(collection: &IncidentCollection) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(16 + collection.len() * 96);
    writer.write_bytes(&MAGIC);
    writer.write_u16(FORMAT_VERSION);
    for incident in collection {
        encode_record(&mut writer, incident)?;
    }
    Ok(writer.into_bytes())
}

/// Encodes the collection into gzip-wrapped AIB1 bytes.
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

fn encode_record(writer: &mut Writer, incident: &Incident) -> Result<(), EncodeError> {
    writer.write_string("report_id", incident.report_id())?;
    writer.write_string("airport", incident.airport())?;
    writer.write_string("aircraft_id", incident.aircraft_id())?;
    writer.write_string("aircraft_type", incident.aircraft_type())?;
    writer.write_string("narrative", incident.narrative())?;
    writer.write_u32(incident.date().to_ordinal());
    writer.write_f64(incident.pilot_percent_hours_on_type());
    writer.write_i32(incident.pilot_total_hours());
    writer.write_bool(incident.midair());
    Ok(())
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes AIB1 bytes (compressed or not) into a new collection.
pub fn decode(data: &[u8]) -> Result<IncidentCollection, DecodeError> {
    let data = decompress_if_gzip(data)?;
    if data.len() > MAX_DUMP_SIZE {
        return Err(DecodeError::TooLarge {
            size: data.len(),
            max: MAX_DUMP_SIZE,
        });
    }
    let mut reader = Reader::new(&data);

    // Magic
    let magic = reader.read_bytes(4, "magic")?;
    if magic != MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(magic);
        return Err(DecodeError::InvalidMagic { found });
    }

    // Version: numeric ordering, so a file newer than this reader is
    // rejected while older supported revisions stay readable.
    let version = reader.read_u16("version")?;
    if version < MIN_FORMAT_VERSION || version > FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            version,
            supported: FORMAT_VERSION,
        });
    }

    let mut collection = IncidentCollection::new();
    let mut index = 0usize;
    while !reader.is_empty() {
        // End-of-stream is only legal exactly at a record boundary; running
        // dry anywhere inside a record is a truncation.
        let incident = decode_record(&mut reader).map_err(|e| match e {
            DecodeError::UnexpectedEof { context } => DecodeError::TruncatedRecord {
                record: index,
                context,
            },
            DecodeError::InvalidRecord { source, .. } => DecodeError::InvalidRecord {
                record: index,
                source,
            },
            other => other,
        })?;
        collection.insert(incident);
        index += 1;
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

fn decode_record(reader: &mut Reader<'_>) -> Result<Incident, DecodeError> {
    let report_id = reader.read_string("report_id")?;
    let airport = reader.read_string("airport")?;
    let aircraft_id = reader.read_string("aircraft_id")?;
    let aircraft_type = reader.read_string("aircraft_type")?;
    let narrative = reader.read_string("narrative")?;
    let date_ordinal = reader.read_u32("date")?;
    let percent = reader.read_f64("pilot_percent_hours_on_type")?;
    let total_hours = reader.read_i32("pilot_total_hours")?;
    let midair = reader.read_bool("midair")?;

    let invalid = |source| DecodeError::InvalidRecord { record: 0, source };
    let date = Date::from_ordinal(date_ordinal).map_err(|e| invalid(e.into()))?;
    Incident::builder(report_id, date)
        .airport(airport)
        .aircraft(aircraft_id, aircraft_type)
        .pilot_hours(percent, total_hours)
        .midair(midair)
        .narrative(narrative)
        .build()
        .map_err(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::GZIP_MAGIC;

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
        collection.insert(
            Incident::builder("20230002", Date::new(2023, 3, 17).unwrap())
                .airport("Schiphol")
                .aircraft("PH-BXA", "A320")
                .pilot_hours(80.0, 11_000)
                .midair(true)
                .narrative("Wake turbulence on short final.\n\nGo-around flown.")
                .build()
                .unwrap(),
        );
        collection
    }

    #[test]
    fn test_roundtrip() {
        let collection = sample_collection();
        let encoded = encode(&collection).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(collection, decoded);
    }

    #[test]
    fn test_header_layout() {
        let encoded = encode(&IncidentCollection::new()).unwrap();
        assert_eq!(&encoded[..4], b"AIB1");
        assert_eq!(&encoded[4..6], &FORMAT_VERSION.to_le_bytes());
        assert_eq!(encoded.len(), 6);
    }

    #[test]
    fn test_concrete_record_fields_survive() {
        let collection = sample_collection();
        let decoded = decode(&encode(&collection).unwrap()).unwrap();
        let incident = decoded.get("20230001").unwrap();
        assert_eq!(incident.date().to_string(), "2023-01-05");
        assert_eq!(incident.airport(), "JFK");
        assert_eq!(incident.aircraft_id(), "N12345");
        assert_eq!(incident.aircraft_type(), "B737");
        assert_eq!(incident.pilot_percent_hours_on_type(), 12.5);
        assert_eq!(incident.pilot_total_hours(), 4300);
        assert!(!incident.midair());
        assert_eq!(incident.narrative(), "Bird strike on approach.");
    }

    #[test]
    fn test_determinism() {
        let collection = sample_collection();
        assert_eq!(encode(&collection).unwrap(), encode(&collection).unwrap());
    }

    #[test]
    fn test_empty_narrative_encodes_as_lone_prefix() {
        let mut collection = IncidentCollection::new();
        collection.insert(
            Incident::builder("20230009", Date::new(2023, 6, 1).unwrap())
                .airport("LGW")
                .aircraft("G-ABCD", "A319")
                .pilot_hours(5.0, 900)
                .build()
                .unwrap(),
        );
        let decoded = decode(&encode(&collection).unwrap()).unwrap();
        assert_eq!(decoded.get("20230009").unwrap().narrative(), "");
    }

    #[test]
    fn test_compression_transparency() {
        let collection = sample_collection();
        let plain = encode(&collection).unwrap();
        let wrapped = encode_compressed(&collection).unwrap();
        assert_eq!(&wrapped[..2], &GZIP_MAGIC);
        assert_ne!(plain, wrapped);

        assert_eq!(decode(&plain).unwrap(), decode(&wrapped).unwrap());
    }

    #[test]
    fn test_invalid_magic() {
        let mut encoded = encode(&sample_collection()).unwrap();
        encoded[..4].copy_from_slice(b"NOPE");
        let result = decode(&encoded);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidMagic { found: [b'N', b'O', b'P', b'E'] })
        ));
    }

    #[test]
    fn test_version_gate() {
        let mut encoded = encode(&sample_collection()).unwrap();
        encoded[4..6].copy_from_slice(&2u16.to_le_bytes());
        assert!(matches!(
            decode(&encoded),
            Err(DecodeError::UnsupportedVersion {
                version: 2,
                supported: FORMAT_VERSION
            })
        ));

        // A failed import must leave the target untouched.
        let mut target = sample_collection();
        let before = target.clone();
        let result = import(&mut target, &mut encoded.as_slice());
        assert!(result.is_err());
        assert_eq!(target, before);
    }

    #[test]
    fn test_truncation_at_every_boundary() {
        let encoded = encode(&sample_collection()).unwrap();
        // Clean header with zero records is fine; any cut inside a record
        // must surface as truncation, never as success.
        for cut in 7..encoded.len() {
            let result = decode(&encoded[..cut]);
            match result {
                Err(DecodeError::TruncatedRecord { .. }) => {}
                Err(other) => panic!("cut at {cut}: unexpected error {other:?}"),
                Ok(decoded) => {
                    assert!(
                        decoded.len() < 2,
                        "cut at {cut} still produced both records"
                    );
                }
            }
        }
    }

    #[test]
    fn test_invalid_record_aborts() {
        // Hand-craft a record with pilot_total_hours = 0.
        let mut writer = Writer::new();
        writer.write_bytes(&MAGIC);
        writer.write_u16(FORMAT_VERSION);
        writer.write_string("report_id", "20230001").unwrap();
        writer.write_string("airport", "JFK").unwrap();
        writer.write_string("aircraft_id", "N12345").unwrap();
        writer.write_string("aircraft_type", "B737").unwrap();
        writer.write_string("narrative", "").unwrap();
        writer.write_u32(Date::new(2023, 1, 5).unwrap().to_ordinal());
        writer.write_f64(12.5);
        writer.write_i32(0);
        writer.write_bool(false);

        let result = decode(writer.as_bytes());
        assert!(matches!(
            result,
            Err(DecodeError::InvalidRecord { record: 0, .. })
        ));
    }

    #[test]
    fn test_garbage_gzip_surfaces_decompression_error() {
        let mut bogus = GZIP_MAGIC.to_vec();
        bogus.extend_from_slice(b"definitely not a deflate stream");
        assert!(matches!(
            decode(&bogus),
            Err(DecodeError::DecompressionFailed(_))
        ));
    }
}
