//! The `Incident` record and its builder.
//!
//! An [`Incident`] is immutable-after-validation: the only ways to obtain or
//! change one run every field through the invariant checks, so a value of
//! this type is always internally consistent.

use crate::error::ValidationError;
use crate::limits::MIN_REPORT_ID_LEN;
use crate::model::Date;

/// One aviation-incident report.
///
/// Field invariants (enforced at construction and on every mutation):
/// - `report_id`: a single whitespace-free token, at least eight characters.
///   Immutable after construction; acts as the record's identity key.
/// - `airport`, `aircraft_id`, `aircraft_type`: non-empty, no embedded
///   newline.
/// - `pilot_percent_hours_on_type`: in `[0.0, 100.0]`.
/// - `pilot_total_hours`: strictly positive.
/// - `narrative`: free text, stored in canonical outer-trimmed form.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    report_id: String,
    date: Date,
    airport: String,
    aircraft_id: String,
    aircraft_type: String,
    pilot_percent_hours_on_type: f64,
    pilot_total_hours: i32,
    midair: bool,
    narrative: String,
}

impl Incident {
    /// Starts building an incident with the two fields every record needs
    /// before anything else: its identity and its date.
    pub fn builder(report_id: impl Into<String>, date: Date) -> IncidentBuilder {
        IncidentBuilder {
            report_id: report_id.into(),
            date,
            airport: String::new(),
            aircraft_id: String::new(),
            aircraft_type: String::new(),
            pilot_percent_hours_on_type: 0.0,
            pilot_total_hours: 0,
            midair: false,
            narrative: String::new(),
        }
    }

    /// The record's identity key. Immutable.
    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    /// The incident date.
    pub fn date(&self) -> Date {
        self.date
    }

    /// The airport name.
    pub fn airport(&self) -> &str {
        &self.airport
    }

    /// The aircraft registration.
    pub fn aircraft_id(&self) -> &str {
        &self.aircraft_id
    }

    /// The aircraft model designation.
    pub fn aircraft_type(&self) -> &str {
        &self.aircraft_type
    }

    /// Percentage of the pilot's hours flown on this aircraft type.
    pub fn pilot_percent_hours_on_type(&self) -> f64 {
        self.pilot_percent_hours_on_type
    }

    /// The pilot's total flying hours.
    pub fn pilot_total_hours(&self) -> i32 {
        self.pilot_total_hours
    }

    /// Whether the incident was a midair collision.
    pub fn midair(&self) -> bool {
        self.midair
    }

    /// The free-text narrative, in canonical outer-trimmed form.
    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    /// Hours the pilot has flown on this aircraft type, rounded down.
    pub fn approximate_hours_on_type(&self) -> i32 {
        (self.pilot_total_hours as f64 * self.pilot_percent_hours_on_type / 100.0) as i32
    }

    /// Sets the incident date.
    pub fn set_date(&mut self, date: Date) {
        self.date = date;
    }

    /// Sets the airport name.
    pub fn set_airport(&mut self, airport: impl Into<String>) -> Result<(), ValidationError> {
        let airport = airport.into();
        validate_line_field("airport", &airport)?;
        self.airport = airport;
        Ok(())
    }

    /// Sets the aircraft registration.
    pub fn set_aircraft_id(
        &mut self,
        aircraft_id: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let aircraft_id = aircraft_id.into();
        validate_line_field("aircraft_id", &aircraft_id)?;
        self.aircraft_id = aircraft_id;
        Ok(())
    }

    /// Sets the aircraft model designation.
    pub fn set_aircraft_type(
        &mut self,
        aircraft_type: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let aircraft_type = aircraft_type.into();
        validate_line_field("aircraft_type", &aircraft_type)?;
        self.aircraft_type = aircraft_type;
        Ok(())
    }

    /// Sets the percentage of hours flown on type.
    pub fn set_pilot_percent_hours_on_type(&mut self, percent: f64) -> Result<(), ValidationError> {
        validate_percent(percent)?;
        self.pilot_percent_hours_on_type = percent;
        Ok(())
    }

    /// Sets the pilot's total flying hours.
    pub fn set_pilot_total_hours(&mut self, hours: i32) -> Result<(), ValidationError> {
        validate_total_hours(hours)?;
        self.pilot_total_hours = hours;
        Ok(())
    }

    /// Sets the midair-collision flag.
    pub fn set_midair(&mut self, midair: bool) {
        self.midair = midair;
    }

    /// Sets the narrative, normalizing it to canonical outer-trimmed form.
    pub fn set_narrative(&mut self, narrative: impl Into<String>) {
        self.narrative = normalize_narrative(narrative.into());
    }
}

/// Fluent builder for [`Incident`].
///
/// Validation happens once, in [`build`](IncidentBuilder::build); unset
/// required fields fail there with the same errors a bad explicit value
/// would.
///
/// # Example
///
/// ```rust
/// use aib::{Date, Incident};
///
/// let incident = Incident::builder("20230001", Date::new(2023, 1, 5)?)
///     .airport("JFK")
///     .aircraft("N12345", "B737")
///     .pilot_hours(12.5, 4300)
///     .narrative("Bird strike on approach.")
///     .build()?;
/// assert_eq!(incident.approximate_hours_on_type(), 537);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct IncidentBuilder {
    report_id: String,
    date: Date,
    airport: String,
    aircraft_id: String,
    aircraft_type: String,
    pilot_percent_hours_on_type: f64,
    pilot_total_hours: i32,
    midair: bool,
    narrative: String,
}

impl IncidentBuilder {
    /// Sets the airport name.
    pub fn airport(mut self, airport: impl Into<String>) -> Self {
        self.airport = airport.into();
        self
    }

    /// Sets the aircraft registration and model designation.
    pub fn aircraft(
        mut self,
        aircraft_id: impl Into<String>,
        aircraft_type: impl Into<String>,
    ) -> Self {
        self.aircraft_id = aircraft_id.into();
        self.aircraft_type = aircraft_type.into();
        self
    }

    /// Sets the percent-on-type and total flying hours.
    pub fn pilot_hours(mut self, percent_on_type: f64, total: i32) -> Self {
        self.pilot_percent_hours_on_type = percent_on_type;
        self.pilot_total_hours = total;
        self
    }

    /// Sets the midair-collision flag (defaults to `false`).
    pub fn midair(mut self, midair: bool) -> Self {
        self.midair = midair;
        self
    }

    /// Sets the narrative (defaults to empty).
    pub fn narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = narrative.into();
        self
    }

    /// Validates every field and produces the incident.
    pub fn build(self) -> Result<Incident, ValidationError> {
        validate_report_id(&self.report_id)?;
        validate_line_field("airport", &self.airport)?;
        validate_line_field("aircraft_id", &self.aircraft_id)?;
        validate_line_field("aircraft_type", &self.aircraft_type)?;
        validate_percent(self.pilot_percent_hours_on_type)?;
        validate_total_hours(self.pilot_total_hours)?;

        Ok(Incident {
            report_id: self.report_id,
            date: self.date,
            airport: self.airport,
            aircraft_id: self.aircraft_id,
            aircraft_type: self.aircraft_type,
            pilot_percent_hours_on_type: self.pilot_percent_hours_on_type,
            pilot_total_hours: self.pilot_total_hours,
            midair: self.midair,
            narrative: normalize_narrative(self.narrative),
        })
    }
}

/// Canonical narrative form: line endings normalized to `\n`, outer
/// whitespace stripped, whitespace-only interior lines collapsed to empty
/// lines, everything else untouched.
///
/// Every codec round-trips the canonical form exactly.
fn normalize_narrative(narrative: String) -> String {
    let narrative = if narrative.contains("\r\n") {
        narrative.replace("\r\n", "\n")
    } else {
        narrative
    };
    let trimmed = narrative.trim();
    if trimmed
        .lines()
        .any(|line| !line.is_empty() && line.trim().is_empty())
    {
        let mut out = String::with_capacity(trimmed.len());
        for (i, line) in trimmed.lines().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if !line.trim().is_empty() {
                out.push_str(line);
            }
        }
        out
    } else if trimmed.len() == narrative.len() {
        narrative
    } else {
        trimmed.to_string()
    }
}

fn validate_report_id(id: &str) -> Result<(), ValidationError> {
    if id.chars().count() < MIN_REPORT_ID_LEN || id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidReportId { id: id.to_string() });
    }
    Ok(())
}

fn validate_line_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if value.contains('\n') {
        return Err(ValidationError::EmbeddedNewline { field });
    }
    Ok(())
}

fn validate_percent(percent: f64) -> Result<(), ValidationError> {
    // NaN fails the range test as well
    if !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::PercentOutOfRange { value: percent });
    }
    Ok(())
}

fn validate_total_hours(hours: i32) -> Result<(), ValidationError> {
    if hours <= 0 {
        return Err(ValidationError::NonPositiveHours { value: hours });
    }
    Ok(())
}
