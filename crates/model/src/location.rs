//! Geographic coordinates attached to alerts and assistance requests

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Coordinate as submitted by a client: a JSON number, or text coming
/// from a JSON string or a form field.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Number(f64),
    Text(String),
}

impl CoordinateInput {
    fn is_blank(&self) -> bool {
        matches!(self, CoordinateInput::Text(s) if s.trim().is_empty())
    }

    fn parse(&self) -> Result<f64, ValidationError> {
        let value = match self {
            CoordinateInput::Number(v) => *v,
            CoordinateInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidCoordinates)?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ValidationError::InvalidCoordinates)
        }
    }
}

fn present(input: Option<CoordinateInput>) -> Option<CoordinateInput> {
    input.filter(|c| !c.is_blank())
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
        }
    }

    /// Coordinates are optional, but if any is given both must be valid.
    pub fn from_optional_input(
        latitude: Option<CoordinateInput>,
        longitude: Option<CoordinateInput>,
    ) -> Result<Option<Self>, ValidationError> {
        let latitude = present(latitude).map(|c| c.parse()).transpose()?;
        let longitude = present(longitude).map(|c| c.parse()).transpose()?;
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(Some(Location::new(latitude, longitude))),
            (None, None) => Ok(None),
            _ => Err(ValidationError::IncompleteCoordinates),
        }
    }

    pub fn from_required_input(
        latitude: Option<CoordinateInput>,
        longitude: Option<CoordinateInput>,
    ) -> Result<Self, ValidationError> {
        let (latitude, longitude) = match (present(latitude), present(longitude)) {
            (Some(latitude), Some(longitude)) => (latitude, longitude),
            _ => return Err(ValidationError::MissingCoordinates),
        };
        Ok(Location::new(latitude.parse()?, longitude.parse()?))
    }

    pub fn from_columns(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Location::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }

    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/{},{}",
            self.latitude, self.longitude
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoordinateInput, Location};
    use crate::error::ValidationError;

    fn text(s: &str) -> Option<CoordinateInput> {
        Some(CoordinateInput::Text(s.to_string()))
    }

    fn number(v: f64) -> Option<CoordinateInput> {
        Some(CoordinateInput::Number(v))
    }

    #[test]
    fn optional_coordinates() {
        assert_eq!(Location::from_optional_input(None, None), Ok(None));
        assert_eq!(Location::from_optional_input(text(""), text("  ")), Ok(None));
        assert_eq!(
            Location::from_optional_input(number(40.71), text(" -74.00 ")),
            Ok(Some(Location::new(40.71, -74.0)))
        );
        assert_eq!(
            Location::from_optional_input(number(0.0), number(0.0)),
            Ok(Some(Location::new(0.0, 0.0)))
        );
        assert_eq!(
            Location::from_optional_input(text("north"), number(1.0)),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            Location::from_optional_input(text("abc"), None),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            Location::from_optional_input(number(10.0), None),
            Err(ValidationError::IncompleteCoordinates)
        );
        assert_eq!(
            Location::from_optional_input(text("NaN"), text("inf")),
            Err(ValidationError::InvalidCoordinates)
        );
    }

    #[test]
    fn required_coordinates() {
        assert_eq!(
            Location::from_required_input(None, number(1.0)),
            Err(ValidationError::MissingCoordinates)
        );
        assert_eq!(
            Location::from_required_input(text(""), text("2")),
            Err(ValidationError::MissingCoordinates)
        );
        assert_eq!(
            Location::from_required_input(text("1,5"), text("2")),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            Location::from_required_input(text("51.5"), number(-0.12)),
            Ok(Location::new(51.5, -0.12))
        );
    }

    #[test]
    fn deserialize_from_json() {
        let values: Vec<CoordinateInput> =
            serde_json::from_str(r#"[40, -74.006, "12.5", ""]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CoordinateInput::Number(40.0),
                CoordinateInput::Number(-74.006),
                CoordinateInput::Text("12.5".to_string()),
                CoordinateInput::Text(String::new()),
            ]
        );
    }

    #[test]
    fn links_and_display() {
        let location = Location::new(40.7128, -74.006);
        assert_eq!(location.to_string(), "40.7128, -74.006");
        assert_eq!(
            location.map_url(),
            "https://www.google.com/maps?q=40.7128,-74.006"
        );
        assert_eq!(
            location.directions_url(),
            "https://www.google.com/maps/dir/40.7128,-74.006"
        );
    }
}
