//! The line-oriented, human-editable text codec.
//!
//! A file is a sequence of blocks separated by blank lines:
//!
//! ```text
//! [20230001]
//! date=2023-01-05
//! aircraft_id=N12345
//! aircraft_type=B737
//! airport=JFK
//! pilot_percent_hours_on_type=12.5
//! pilot_total_hours=4300
//! midair=0
//! .NARRATIVE_START.
//!     Bird strike on approach.
//! .NARRATIVE_END.
//! ```
//!
//! Keys are trimmed; values are taken verbatim after the first `=`. The
//! narrative's interior lines are indented four spaces on export; importers
//! strip the common leading-space width of the non-blank interior lines and
//! outer-trim the result, which reproduces the canonical stored narrative
//! exactly.
//!
//! Two import strategies implement this one grammar independently:
//! [`parse_scan`], a three-state line scanner, and [`parse_pattern`], a
//! whole-buffer regex matcher. They accept identical records for well-formed
//! input and reject the same malformed inputs; neither calls the other.
//! Both abort on the first error and leave the target collection untouched.

use std::io::{Read, Write};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{EncodeError, TextParseError};
use crate::model::{Date, Incident, IncidentCollection};

/// Sentinel line opening a narrative section.
const NARRATIVE_START: &str = ".NARRATIVE_START.";

/// Sentinel line closing a narrative section.
const NARRATIVE_END: &str = ".NARRATIVE_END.";

/// Indentation applied to narrative lines on export.
const NARRATIVE_INDENT: &str = "    ";

/// Scalar keys in the order blocks emit them.
const FIELD_ORDER: [&str; 7] = [
    "date",
    "aircraft_id",
    "aircraft_type",
    "airport",
    "pilot_percent_hours_on_type",
    "pilot_total_hours",
    "midair",
];

// =============================================================================
// EXPORT
// =============================================================================

/// Renders the collection in the text format.
pub fn encode(collection: &IncidentCollection) -> String {
    let mut out = String::new();
    for incident in collection {
        out.push('[');
        out.push_str(incident.report_id());
        out.push_str("]\n");
        out.push_str(&format!("date={}\n", incident.date()));
        out.push_str(&format!("aircraft_id={}\n", incident.aircraft_id()));
        out.push_str(&format!("aircraft_type={}\n", incident.aircraft_type()));
        out.push_str(&format!("airport={}\n", incident.airport()));
        out.push_str(&format!(
            "pilot_percent_hours_on_type={}\n",
            incident.pilot_percent_hours_on_type()
        ));
        out.push_str(&format!(
            "pilot_total_hours={}\n",
            incident.pilot_total_hours()
        ));
        out.push_str(&format!("midair={}\n", incident.midair() as u8));
        out.push_str(NARRATIVE_START);
        out.push('\n');
        for line in incident.narrative().lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str(NARRATIVE_INDENT);
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(NARRATIVE_END);
        out.push_str("\n\n");
    }
    out
}

/// Writes the collection to a destination stream in the text format.
pub fn export<W: Write>(
    collection: &IncidentCollection,
    destination: &mut W,
) -> Result<(), EncodeError> {
    destination.write_all(encode(collection).as_bytes())?;
    destination.flush()?;
    Ok(())
}

// =============================================================================
// SHARED IMPORT PIECES (grammar helpers, not a parsing strategy)
// =============================================================================

/// One block's scalar fields, collected before the record is built.
#[derive(Debug, Default)]
struct PartialRecord {
    date: Option<Date>,
    aircraft_id: Option<String>,
    aircraft_type: Option<String>,
    airport: Option<String>,
    percent: Option<f64>,
    total_hours: Option<i32>,
    midair: Option<bool>,
}

impl PartialRecord {
    /// Applies one `key=value` assignment. Duplicate keys: last wins.
    fn assign(&mut self, key: &str, value: &str, line: usize) -> Result<(), TextParseError> {
        let invalid = |field| TextParseError::InvalidValue {
            line,
            field,
            value: value.to_string(),
        };
        match key {
            "date" => self.date = Some(Date::parse_iso(value).map_err(|_| invalid("date"))?),
            "aircraft_id" => self.aircraft_id = Some(value.to_string()),
            "aircraft_type" => self.aircraft_type = Some(value.to_string()),
            "airport" => self.airport = Some(value.to_string()),
            "pilot_percent_hours_on_type" => {
                self.percent = Some(
                    value
                        .parse()
                        .map_err(|_| invalid("pilot_percent_hours_on_type"))?,
                )
            }
            "pilot_total_hours" => {
                self.total_hours = Some(value.parse().map_err(|_| invalid("pilot_total_hours"))?)
            }
            "midair" => {
                self.midair = Some(match value {
                    "0" => false,
                    "1" => true,
                    _ => return Err(invalid("midair")),
                })
            }
            _ => {
                return Err(TextParseError::UnknownField {
                    line,
                    field: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Names the first required field still unset, in emission order.
    fn first_missing(&self) -> Option<&'static str> {
        for field in FIELD_ORDER {
            let present = match field {
                "date" => self.date.is_some(),
                "aircraft_id" => self.aircraft_id.is_some(),
                "aircraft_type" => self.aircraft_type.is_some(),
                "airport" => self.airport.is_some(),
                "pilot_percent_hours_on_type" => self.percent.is_some(),
                "pilot_total_hours" => self.total_hours.is_some(),
                "midair" => self.midair.is_some(),
                _ => unreachable!(),
            };
            if !present {
                return Some(field);
            }
        }
        None
    }

    /// Builds the incident once every required field is present.
    ///
    /// `end_line` is the `.NARRATIVE_END.` line, where a missing field is
    /// reported.
    fn finish(
        self,
        report_id: String,
        narrative: String,
        end_line: usize,
    ) -> Result<Incident, TextParseError> {
        if let Some(field) = self.first_missing() {
            return Err(TextParseError::MissingField {
                line: end_line,
                field,
            });
        }
        Incident::builder(report_id, self.date.unwrap())
            .airport(self.airport.unwrap())
            .aircraft(self.aircraft_id.unwrap(), self.aircraft_type.unwrap())
            .pilot_hours(self.percent.unwrap(), self.total_hours.unwrap())
            .midair(self.midair.unwrap())
            .narrative(narrative)
            .build()
            .map_err(|source| TextParseError::InvalidRecord {
                line: end_line,
                source,
            })
    }
}

/// Removes the common leading-space width of the non-blank lines, then
/// outer-trims. This is the inverse of the export indentation.
fn dedent(lines: &[&str]) -> String {
    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            // Blank narrative lines are preserved, indent or not.
            continue;
        }
        out.push_str(&line[common..]);
    }
    out.trim().to_string()
}

// =============================================================================
// IMPORT — LINE-SCAN STRATEGY
// =============================================================================

/// Scanner state: where in a block the current line falls.
enum ScanState {
    /// Between blocks.
    Outside,
    /// Inside a block, collecting `key=value` lines.
    Fields {
        header_line: usize,
        report_id: String,
        partial: PartialRecord,
    },
    /// Inside a narrative section, collecting raw lines.
    Narrative {
        header_line: usize,
        report_id: String,
        partial: PartialRecord,
        lines: Vec<String>,
    },
}

/// Parses the text format with a three-state line scanner.
///
/// Blank lines outside a narrative are skipped; blank lines inside one are
/// preserved. A block only commits once `.NARRATIVE_END.` arrives with every
/// required field supplied.
pub fn parse_scan(input: &str) -> Result<IncidentCollection, TextParseError> {
    let input = input.replace("\r\n", "\n");
    let mut collection = IncidentCollection::new();
    let mut state = ScanState::Outside;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        state = match state {
            ScanState::Outside => {
                let line = strip_blanks(raw_line);
                if raw_line.trim().is_empty() {
                    ScanState::Outside
                } else if let Some(id) = header_id(line) {
                    ScanState::Fields {
                        header_line: line_no,
                        report_id: id.to_string(),
                        partial: PartialRecord::default(),
                    }
                } else {
                    return Err(TextParseError::UnexpectedLine {
                        line: line_no,
                        found: line.to_string(),
                    });
                }
            }
            ScanState::Fields {
                header_line,
                report_id,
                mut partial,
            } => {
                if raw_line.trim().is_empty() {
                    ScanState::Fields {
                        header_line,
                        report_id,
                        partial,
                    }
                } else if strip_blanks(raw_line) == NARRATIVE_START {
                    ScanState::Narrative {
                        header_line,
                        report_id,
                        partial,
                        lines: Vec::new(),
                    }
                } else if let Some((key, value)) = raw_line.split_once('=') {
                    partial.assign(strip_blanks(key), value, line_no)?;
                    ScanState::Fields {
                        header_line,
                        report_id,
                        partial,
                    }
                } else {
                    return Err(TextParseError::MalformedEntry { line: line_no });
                }
            }
            ScanState::Narrative {
                header_line,
                report_id,
                partial,
                mut lines,
            } => {
                if strip_blanks(raw_line) == NARRATIVE_END {
                    let narrative =
                        dedent(&lines.iter().map(String::as_str).collect::<Vec<_>>());
                    let incident = partial.finish(report_id, narrative, line_no)?;
                    collection.insert(incident);
                    ScanState::Outside
                } else {
                    lines.push(raw_line.to_string());
                    ScanState::Narrative {
                        header_line,
                        report_id,
                        partial,
                        lines,
                    }
                }
            }
        };
    }

    match state {
        ScanState::Outside => Ok(collection),
        ScanState::Fields { header_line, .. } | ScanState::Narrative { header_line, .. } => {
            Err(TextParseError::UnexpectedEof { line: header_line })
        }
    }
}

/// Reads a source stream and replaces the collection's contents using the
/// line-scan strategy. On any error the target is left untouched.
pub fn import_scan<R: Read>(
    collection: &mut IncidentCollection,
    source: &mut R,
) -> Result<(), TextParseError> {
    *collection = parse_scan(&read_utf8(source)?)?;
    Ok(())
}

/// Strips leading and trailing spaces and tabs, exactly the blank runs the
/// pattern strategy's `[ \t]*` allows.
fn strip_blanks(line: &str) -> &str {
    line.trim_matches(|c| c == ' ' || c == '\t')
}

/// Extracts the id from a `[report_id]` header line.
fn header_id(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() || inner.contains(']') {
        None
    } else {
        Some(inner)
    }
}

// =============================================================================
// IMPORT — WHOLE-BUFFER PATTERN STRATEGY
// =============================================================================

lazy_static! {
    /// One whole record block: header, field lines, narrative section.
    static ref BLOCK_RE: Regex = Regex::new(
        r"(?ms)^[ \t]*\[(?P<id>[^\]\n]+)\][ \t]*\n(?P<fields>.*?)^[ \t]*\.NARRATIVE_START\.[ \t]*\n(?P<narrative>.*?)^[ \t]*\.NARRATIVE_END\.[ \t]*$"
    )
    .unwrap();

    /// One `key=value` field line.
    static ref KEY_VALUE_RE: Regex =
        Regex::new(r"^[ \t]*(?P<key>[^=]*?)[ \t]*=(?P<value>.*)$").unwrap();
}

/// Parses the text format by matching whole blocks structurally against the
/// grammar with a pattern engine, instead of line-by-line.
///
/// Accepts and rejects exactly the inputs [`parse_scan`] does, and yields
/// identical records for well-formed input.
pub fn parse_pattern(input: &str) -> Result<IncidentCollection, TextParseError> {
    let input = input.replace("\r\n", "\n");
    let mut collection = IncidentCollection::new();
    let mut cursor = 0usize;

    for m in BLOCK_RE.captures_iter(&input) {
        let whole = m.get(0).unwrap();
        require_blank(&input, cursor, whole.start())?;
        cursor = whole.end();

        let mut partial = PartialRecord::default();
        let fields = m.name("fields").unwrap();
        for field_line in fields.as_str().lines() {
            let offset = field_line.as_ptr() as usize - input.as_ptr() as usize;
            let line_no = line_of(&input, offset);
            if field_line.trim().is_empty() {
                continue;
            }
            match KEY_VALUE_RE.captures(field_line) {
                Some(kv) => partial.assign(&kv["key"], &kv["value"], line_no)?,
                None => return Err(TextParseError::MalformedEntry { line: line_no }),
            }
        }

        let narrative_lines: Vec<&str> = m.name("narrative").unwrap().as_str().lines().collect();
        let narrative = dedent(&narrative_lines);
        let end_line = line_of(&input, whole.end() - 1);
        let incident = partial.finish(m["id"].to_string(), narrative, end_line)?;
        collection.insert(incident);
    }

    require_blank(&input, cursor, input.len())?;
    Ok(collection)
}

/// Reads a source stream and replaces the collection's contents using the
/// pattern strategy. On any error the target is left untouched.
pub fn import_pattern<R: Read>(
    collection: &mut IncidentCollection,
    source: &mut R,
) -> Result<(), TextParseError> {
    *collection = parse_pattern(&read_utf8(source)?)?;
    Ok(())
}

/// Rejects any non-whitespace text between or after matched blocks; that is
/// exactly the input the scanner trips over line by line.
fn require_blank(input: &str, start: usize, end: usize) -> Result<(), TextParseError> {
    let gap = &input[start..end];
    if gap.trim().is_empty() {
        return Ok(());
    }
    let offset = start + (gap.len() - gap.trim_start().len());
    let line = line_of(input, offset);
    let found = input[offset..].lines().next().unwrap_or("").trim();
    Err(TextParseError::UnexpectedLine {
        line,
        found: found.to_string(),
    })
}

/// One-based line number of a byte offset.
fn line_of(input: &str, offset: usize) -> usize {
    input[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Reads a stream to its end and checks it for valid UTF-8.
fn read_utf8<R: Read>(source: &mut R) -> Result<String, TextParseError> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| TextParseError::InvalidUtf8)
}
