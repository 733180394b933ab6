//! CTA Train Tracker `ttpositions.aspx` wire format
//!
//! Serde model of the positions response for one route, plus decoding
//! into engine observations. The upstream schema wraps everything in a
//! `ctatt` envelope and reports API failures in-band through `errCd`, so
//! a well-formed HTTP 200 can still mean "no usable batch this cycle".

use derive_more::{Display, Error, From};
use linelight_tracker_lib::{Direction, TrainObservation};
use serde::{Deserialize, Deserializer, Serialize};

/// Feed-level decode failure.
///
/// Either way the poll delivers nothing and the previous display state
/// stays on the strip until the next successful cycle.
#[derive(Debug, Display, Error, From)]
pub enum FeedError {
    /// Body was not a valid positions document
    #[display("positions response did not parse: {_0}")]
    Json(serde_json::Error),
    /// The API reported an error in the `ctatt` envelope
    #[display("API error {code}: {message}")]
    #[from(ignore)]
    Api { code: String, message: String },
}

/// Top-level positions document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionsResponse {
    pub ctatt: Envelope,
}

/// Response envelope. `error_code` is `"0"` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Feed generation timestamp, e.g. "2024-12-05T14:10:12"
    #[serde(rename = "tmst", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "errCd")]
    pub error_code: String,
    #[serde(rename = "errNm", default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub route: Vec<Route>,
}

/// One route's trains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Route identifier, e.g. "blue". The feed spells the key `@name`.
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "train_list")]
    pub train: Vec<Train>,
}

/// One train record, upstream field names preserved. Every value is a
/// string on the wire, including the flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Train {
    #[serde(rename = "rn")]
    pub run_number: String,
    #[serde(rename = "destSt")]
    pub destination_id: String,
    #[serde(rename = "destNm")]
    pub destination_name: String,
    /// Direction code: "1" northbound, "5" southbound
    #[serde(rename = "trDr")]
    pub direction: String,
    #[serde(rename = "nextStaId")]
    pub next_station_id: String,
    #[serde(rename = "nextStaNm")]
    pub next_station_name: String,
    /// "1" once the train has reached the next station
    #[serde(rename = "isApp")]
    pub approaching: String,
}

/// A route with a single train serializes it as a bare object rather
/// than a one-element array.
fn train_list<'de, D>(deserializer: D) -> Result<Vec<Train>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Box<Train>),
        Many(Vec<Train>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(train) => vec![*train],
        OneOrMany::Many(trains) => trains,
    })
}

impl Train {
    /// Decode into an engine observation.
    ///
    /// Any direction code other than "5" is treated as northbound,
    /// matching the firmware this replaces.
    #[must_use]
    pub fn to_observation(&self) -> TrainObservation {
        TrainObservation {
            run_number: self.run_number.clone(),
            destination_id: self.destination_id.clone(),
            destination_name: self.destination_name.clone(),
            direction: if self.direction == "5" {
                Direction::Southbound
            } else {
                Direction::Northbound
            },
            next_station_id: self.next_station_id.clone(),
            next_station_name: self.next_station_name.clone(),
            approaching: self.approaching == "1",
        }
    }
}

/// Decode one positions response body into engine observations.
///
/// Trains from every route block are concatenated in document order,
/// which is the order the aggregation engine folds them in.
pub fn decode_positions(body: &str) -> Result<Vec<TrainObservation>, FeedError> {
    let response: PositionsResponse = serde_json::from_str(body)?;
    observations(&response)
}

/// Extract observations from an already-parsed response, surfacing the
/// envelope's in-band error if the API reported one.
pub fn observations(response: &PositionsResponse) -> Result<Vec<TrainObservation>, FeedError> {
    let envelope = &response.ctatt;
    if envelope.error_code != "0" {
        return Err(FeedError::Api {
            code: envelope.error_code.clone(),
            message: envelope.error_name.clone().unwrap_or_default(),
        });
    }
    Ok(envelope
        .route
        .iter()
        .flat_map(|route| route.train.iter().map(Train::to_observation))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ctatt": {
            "tmst": "2024-12-05T14:10:12",
            "errCd": "0",
            "errNm": null,
            "route": [{
                "@name": "blue",
                "train": [
                    {
                        "rn": "134",
                        "destSt": "30171",
                        "destNm": "O'Hare",
                        "trDr": "1",
                        "nextStaId": "40590",
                        "nextStaNm": "Damen",
                        "isApp": "0"
                    },
                    {
                        "rn": "223",
                        "destSt": "30077",
                        "destNm": "Forest Park",
                        "trDr": "5",
                        "nextStaId": "40490",
                        "nextStaNm": "Grand",
                        "isApp": "1"
                    }
                ]
            }]
        }
    }"#;

    #[test]
    fn test_decode_sample() {
        let observations = decode_positions(SAMPLE).unwrap();
        assert_eq!(observations.len(), 2);

        let first = &observations[0];
        assert_eq!(first.run_number, "134");
        assert_eq!(first.destination_id, "30171");
        assert_eq!(first.direction, Direction::Northbound);
        assert_eq!(first.next_station_id, "40590");
        assert!(!first.approaching);

        let second = &observations[1];
        assert_eq!(second.direction, Direction::Southbound);
        assert!(second.approaching);
    }

    #[test]
    fn test_single_train_as_bare_object() {
        let body = r#"{
            "ctatt": {
                "errCd": "0",
                "route": [{
                    "@name": "blue",
                    "train": {
                        "rn": "134",
                        "destSt": "30171",
                        "destNm": "O'Hare",
                        "trDr": "1",
                        "nextStaId": "40590",
                        "nextStaNm": "Damen",
                        "isApp": "1"
                    }
                }]
            }
        }"#;
        let observations = decode_positions(body).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].run_number, "134");
    }

    #[test]
    fn test_api_error_envelope() {
        let body = r#"{"ctatt": {"errCd": "101", "errNm": "Invalid API Key", "route": []}}"#;
        let err = decode_positions(body).unwrap_err();
        match err {
            FeedError::Api { code, message } => {
                assert_eq!(code, "101");
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("expected Api error, got {other}"),
        }
    }

    #[test]
    fn test_route_without_trains() {
        let body = r#"{"ctatt": {"errCd": "0", "route": [{"@name": "blue"}]}}"#;
        let observations = decode_positions(body).unwrap();
        assert!(observations.is_empty());
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            decode_positions("not json").unwrap_err(),
            FeedError::Json(_)
        ));
    }

    #[test]
    fn test_wire_round_trip() {
        let response: PositionsResponse = serde_json::from_str(SAMPLE).unwrap();
        let body = serde_json::to_string(&response).unwrap();
        let observations = decode_positions(&body).unwrap();
        assert_eq!(observations.len(), 2);
    }
}
