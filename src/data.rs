use crate::error::{Error, Result};
use crate::models::{Priority, SectionController, SectionType, TrackSection, Train, TrainType};
use crate::time::parse_base_offset;
use serde::Deserialize;

/// Load the bundled sample network: five sections and three trains
///
/// # Errors
///
/// Returns an error if the bundled CSV files fail to parse or validate
pub fn sample_network() -> Result<SectionController> {
    let sections = parse_sections_csv(include_str!("../test-data/sections.csv"))?;
    let trains = parse_trains_csv(include_str!("../test-data/trains.csv"))?;
    SectionController::new("CTRL_001", "Central Section", sections, trains)
}

#[derive(Debug, Deserialize)]
struct SectionRecord {
    section_id: String,
    name: String,
    section_type: SectionType,
    length_km: f64,
    max_speed_kmh: u32,
    capacity: u32,
    signal_blocks: u32,
}

#[derive(Debug, Deserialize)]
struct TrainRecord {
    train_id: String,
    train_number: String,
    train_type: TrainType,
    priority: u8,
    route: String,
    scheduled_arrival: String,
    scheduled_departure: String,
    current_delay_minutes: u32,
    max_speed_kmh: u32,
    section_times: String,
}

/// Parse a headed sections CSV
///
/// # Errors
///
/// Returns `Error::Csv` for malformed rows
pub fn parse_sections_csv(csv_content: &str) -> Result<Vec<TrackSection>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());

    let mut sections = Vec::new();
    for record in reader.deserialize() {
        let row: SectionRecord = record?;
        let mut section = TrackSection::new(
            row.section_id,
            row.name,
            row.section_type,
            row.length_km,
            row.max_speed_kmh,
            row.capacity,
        );
        section.signal_blocks = row.signal_blocks;
        sections.push(section);
    }
    Ok(sections)
}

/// Parse a headed trains CSV.
///
/// `route` is a `;`-separated list of section ids, `section_times` a
/// `;`-separated list of `section_id=minutes` pairs, `priority` the ordinal
/// (1 = critical) and both times `HH:MM:SS` offsets from the base date.
///
/// # Errors
///
/// Returns `Error::Csv` for malformed rows and `Error::InvalidRecord` for
/// values that parse as text but make no sense
pub fn parse_trains_csv(csv_content: &str) -> Result<Vec<Train>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());
    let headers = reader.headers()?.clone();

    let mut trains = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let row: TrainRecord = record.deserialize(Some(&headers))?;
        trains.push(train_from_record(row, line)?);
    }
    Ok(trains)
}

fn train_from_record(row: TrainRecord, line: u64) -> Result<Train> {
    let invalid = |reason: String| Error::InvalidRecord { line, reason };

    let priority = Priority::from_ordinal(row.priority)
        .ok_or_else(|| invalid(format!("priority {} is not between 1 and 5", row.priority)))?;
    let scheduled_arrival = parse_base_offset(&row.scheduled_arrival)
        .map_err(|e| invalid(format!("arrival '{}': {e}", row.scheduled_arrival)))?;
    let scheduled_departure = parse_base_offset(&row.scheduled_departure)
        .map_err(|e| invalid(format!("departure '{}': {e}", row.scheduled_departure)))?;

    let route = split_list(&row.route).map(ToString::to_string).collect();
    let section_times = split_list(&row.section_times)
        .map(|pair| {
            let (section_id, mins) = pair
                .split_once('=')
                .ok_or_else(|| invalid(format!("section time '{pair}' is not id=minutes")))?;
            let mins: u32 = mins
                .trim()
                .parse()
                .map_err(|_| invalid(format!("section time '{pair}' has a bad minute count")))?;
            Ok((section_id.trim().to_string(), mins))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut train = Train::new(
        row.train_id,
        row.train_number,
        row.train_type,
        priority,
        route,
        scheduled_arrival,
        scheduled_departure,
    )
    .with_section_times(section_times)
    .with_delay(row.current_delay_minutes);
    train.max_speed_kmh = row.max_speed_kmh;
    Ok(train)
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').map(str::trim).filter(|s| !s.is_empty())
}
