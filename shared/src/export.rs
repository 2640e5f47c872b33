use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{dimensions_km, great_circle_distance_m};
use crate::{BoundingBox, CommittedBox, GeoPoint};

/// Downloadable record of a committed box.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BoxExport {
    pub id: String,
    pub name: String,
    pub bounds: BoundingBox,
    pub center: GeoPoint,
    pub area_km2: f64,
    pub created_at: DateTime<Utc>,
}

impl BoxExport {
    pub fn new(committed: &CommittedBox, created_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("bbox_{}", created_at.timestamp_millis()),
            name: format!("Bounding Box {}", created_at.format("%Y-%m-%d")),
            bounds: committed.bounds,
            center: committed.center,
            area_km2: committed.area_km2,
            created_at,
        }
    }

    pub fn file_name(&self) -> String {
        format!("bounding_box_{}.json", self.created_at.timestamp_millis())
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug)]
pub enum ExportError {
    Json(serde_json::Error),
    NotFinite(&'static str),
    OutOfRange { field: &'static str, value: f64 },
    Inverted { low: &'static str, high: &'static str },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Json(error) => write!(f, "invalid bounding box JSON: {error}"),
            ExportError::NotFinite(field) => write!(f, "{field} is not a finite number"),
            ExportError::OutOfRange { field, value } => {
                write!(f, "{field} = {value} is out of range")
            }
            ExportError::Inverted { low, high } => write!(f, "{low} is greater than {high}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Json(error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(error: serde_json::Error) -> Self {
        ExportError::Json(error)
    }
}

fn check_range(field: &'static str, value: f64, limit: f64) -> Result<(), ExportError> {
    if !value.is_finite() {
        return Err(ExportError::NotFinite(field));
    }
    if value < -limit || value > limit {
        return Err(ExportError::OutOfRange { field, value });
    }
    Ok(())
}

pub fn validate(record: &BoxExport) -> Result<(), ExportError> {
    let bounds = &record.bounds;
    check_range("bounds.north", bounds.north, 90.0)?;
    check_range("bounds.south", bounds.south, 90.0)?;
    check_range("bounds.east", bounds.east, 180.0)?;
    check_range("bounds.west", bounds.west, 180.0)?;
    check_range("center.lat", record.center.lat, 90.0)?;
    check_range("center.lng", record.center.lng, 180.0)?;
    if bounds.south > bounds.north {
        return Err(ExportError::Inverted {
            low: "bounds.south",
            high: "bounds.north",
        });
    }
    if bounds.west > bounds.east {
        return Err(ExportError::Inverted {
            low: "bounds.west",
            high: "bounds.east",
        });
    }
    if !record.area_km2.is_finite() {
        return Err(ExportError::NotFinite("area_km2"));
    }
    if record.area_km2 < 0.0 {
        return Err(ExportError::OutOfRange {
            field: "area_km2",
            value: record.area_km2,
        });
    }
    Ok(())
}

pub fn parse_export(text: &str) -> Result<BoxExport, ExportError> {
    let record: BoxExport = serde_json::from_str(text)?;
    validate(&record)?;
    Ok(record)
}

/// Panel text for a committed box.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateSummary {
    pub north: String,
    pub south: String,
    pub east: String,
    pub west: String,
    pub center: String,
    pub area: String,
    pub dimensions: String,
    pub diagonal: String,
}

fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

impl From<&CommittedBox> for CoordinateSummary {
    fn from(committed: &CommittedBox) -> Self {
        let bounds = &committed.bounds;
        let (width, height) = dimensions_km(bounds);
        let diagonal = great_circle_distance_m(bounds.north_west(), bounds.south_east());
        Self {
            north: format!("{:.6}", bounds.north),
            south: format!("{:.6}", bounds.south),
            east: format!("{:.6}", bounds.east),
            west: format!("{:.6}", bounds.west),
            center: format!("{:.6}, {:.6}", committed.center.lat, committed.center.lng),
            area: format!("{:.2} km²", committed.area_km2),
            dimensions: format!("{width:.2} km × {height:.2} km"),
            diagonal: format_distance(diagonal),
        }
    }
}
