#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

const CODE_DOMAIN: &str = "dash";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded challenge payload.
pub(crate) const CODE_HEADER: &str = "dash:v1";
/// Delimiter used to separate the prefix, track dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Everything required to replay a run exactly: the seed, the track shape
/// and the collapse cadence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RunCode {
    /// Seed both generation streams are derived from.
    pub seed: u64,
    /// Number of rows held by each track buffer.
    pub track_length: u32,
    /// Number of track buffers cycled through the window.
    pub track_count: u32,
    /// Tiles in a full-width row, border walls included.
    pub row_width: u32,
    /// Whole ticks between collapse sweeps.
    pub collapse_interval: u32,
}

impl RunCode {
    /// Encodes the challenge into a single-line string suitable for sharing.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableCode {
            seed: self.seed,
            track_count: self.track_count,
            collapse_interval: self.collapse_interval,
        };
        let json = serde_json::to_vec(&payload).expect("challenge code serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!(
            "{CODE_HEADER}:{}x{}:{encoded}",
            self.track_length, self.row_width
        )
    }

    /// Decodes a challenge from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, RunCodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RunCodeError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(RunCodeError::MissingPrefix)?;
        let version = parts.next().ok_or(RunCodeError::MissingVersion)?;
        let dimensions = parts.next().ok_or(RunCodeError::MissingDimensions)?;
        let payload = parts.next().ok_or(RunCodeError::MissingPayload)?;

        if domain != CODE_DOMAIN {
            return Err(RunCodeError::InvalidPrefix(domain.to_owned()));
        }
        if version != CODE_VERSION {
            return Err(RunCodeError::UnsupportedVersion(version.to_owned()));
        }

        let (track_length, row_width) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(RunCodeError::InvalidEncoding)?;
        let decoded: SerializableCode =
            serde_json::from_slice(&bytes).map_err(RunCodeError::InvalidPayload)?;

        Ok(Self {
            seed: decoded.seed,
            track_length,
            track_count: decoded.track_count,
            row_width,
            collapse_interval: decoded.collapse_interval,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SerializableCode {
    seed: u64,
    track_count: u32,
    collapse_interval: u32,
}

/// Errors that can occur while decoding shared challenge codes.
#[derive(Debug)]
pub(crate) enum RunCodeError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded challenge.
    MissingPrefix,
    /// The encoded challenge did not contain a version segment.
    MissingVersion,
    /// The encoded challenge did not include the track dimensions.
    MissingDimensions,
    /// The encoded challenge did not include the payload segment.
    MissingPayload,
    /// The encoded challenge used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded challenge used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The track dimensions could not be parsed from the encoded challenge.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for RunCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "challenge code was empty"),
            Self::MissingPrefix => write!(f, "challenge code is missing the prefix"),
            Self::MissingVersion => write!(f, "challenge code is missing the version"),
            Self::MissingDimensions => write!(f, "challenge code is missing the track dimensions"),
            Self::MissingPayload => write!(f, "challenge code is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "challenge prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "challenge version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse track dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode challenge payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse challenge payload: {error}")
            }
        }
    }
}

impl Error for RunCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), RunCodeError> {
    let (track_length, row_width) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| RunCodeError::InvalidDimensions(dimensions.to_owned()))?;

    let track_length = track_length
        .trim()
        .parse::<u32>()
        .map_err(|_| RunCodeError::InvalidDimensions(dimensions.to_owned()))?;
    let row_width = row_width
        .trim()
        .parse::<u32>()
        .map_err(|_| RunCodeError::InvalidDimensions(dimensions.to_owned()))?;

    if track_length == 0 || row_width == 0 {
        return Err(RunCodeError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((track_length, row_width))
}
