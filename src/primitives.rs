//! Primitive wire codecs.
//!
//! Each codec converts between a JSON scalar and a strongly typed value.
//! Failure is reported in two distinct ways, and the distinction is load
//! bearing for the property slot algorithm:
//!
//! * a **shape mismatch** (a number offered to a string-shaped kind, a
//!   string offered to the float kind, any array or object) yields
//!   `Ok(None)` so the caller can fall through to the next candidate kind;
//! * a **malformed value** (a JSON string handed to the timestamp, duration,
//!   MIME-type or IRI codec that does not parse) yields a [`DecodeError`]
//!   which aborts the enclosing entity decode.
//!
//! The plain-string and language-tagged-string codecs accept the same wire
//! shape. Which one a bare JSON string becomes is decided solely by the
//! candidate order of the owning property slot, never by content sniffing.

use std::fmt::{self, Display, Formatter, Write};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::errors::DecodeError;

lazy_static! {
    // xsd:duration, without the year-month/day-time split xsd schemas make.
    static ref DURATION_RE: Regex =
        Regex::new(r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$").unwrap();
    // type "/" subtype, with optional parameters.
    static ref MEDIA_TYPE_RE: Regex =
        Regex::new(r"^[A-Za-z0-9][-\w!#$&^.+]*/[A-Za-z0-9][-\w!#$&^.+*]*(?:\s*;\s*.+)?$").unwrap();
}

/// The primitive kinds a property slot may list among its candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// An absolute IRI reference.
    Iri,
    /// xsd:anyURI, absolute or relative.
    AnyUri,
    /// xsd:string.
    String,
    /// rdf:langString. Same wire shape as xsd:string.
    LangString,
    /// xsd:float / xsd:double, carried as a JSON number.
    Float,
    /// xsd:dateTime in its RFC 3339 profile.
    DateTime,
    /// xsd:duration.
    Duration,
    /// A MIME media type.
    MediaType,
}

/// A decoded primitive value. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Iri(Url),
    AnyUri(UriRef),
    String(String),
    LangString(LangString),
    Float(f64),
    DateTime(DateTime<FixedOffset>),
    Duration(XsdDuration),
    MediaType(MediaType),
}

impl Primitive {
    /// Attempts to read `raw` as the given kind.
    ///
    /// `Ok(None)` means the JSON shape does not belong to this kind at all;
    /// an error means the shape was right but the content is malformed.
    pub(crate) fn decode(kind: PrimitiveKind, raw: &Value) -> Result<Option<Primitive>, DecodeError> {
        if kind == PrimitiveKind::Float {
            return Ok(raw.as_f64().map(Primitive::Float));
        }

        // Every remaining kind is carried as a JSON string.
        let Value::String(text) = raw else {
            return Ok(None);
        };

        let primitive = match kind {
            PrimitiveKind::Iri => Primitive::Iri(Url::parse(text).map_err(|_| DecodeError::InvalidIri(text.clone()))?),
            PrimitiveKind::AnyUri => Primitive::AnyUri(UriRef::parse(text)?),
            PrimitiveKind::String => Primitive::String(text.clone()),
            PrimitiveKind::LangString => Primitive::LangString(LangString::new(text.clone())),
            PrimitiveKind::DateTime => {
                Primitive::DateTime(DateTime::parse_from_rfc3339(text).map_err(|_| DecodeError::InvalidDateTime(text.clone()))?)
            }
            PrimitiveKind::Duration => Primitive::Duration(XsdDuration::parse(text)?),
            PrimitiveKind::MediaType => Primitive::MediaType(MediaType::parse(text)?),
            PrimitiveKind::Float => unreachable!("handled above"),
        };
        Ok(Some(primitive))
    }

    /// Serializes the value back to its wire form.
    ///
    /// Round-trip preserving for every value [`Primitive::decode`] produces.
    pub fn encode(&self) -> Value {
        match self {
            Primitive::Iri(url) => Value::String(url.as_str().to_string()),
            Primitive::AnyUri(uri) => Value::String(uri.as_str().to_string()),
            Primitive::String(text) => Value::String(text.clone()),
            Primitive::LangString(text) => Value::String(text.value().to_string()),
            Primitive::Float(number) => serde_json::Number::from_f64(*number).map(Value::Number).unwrap_or(Value::Null),
            Primitive::DateTime(instant) => Value::String(instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Primitive::Duration(duration) => Value::String(duration.to_string()),
            Primitive::MediaType(media_type) => Value::String(media_type.as_str().to_string()),
        }
    }

    /// The kind of the populated value.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Iri(_) => PrimitiveKind::Iri,
            Primitive::AnyUri(_) => PrimitiveKind::AnyUri,
            Primitive::String(_) => PrimitiveKind::String,
            Primitive::LangString(_) => PrimitiveKind::LangString,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::DateTime(_) => PrimitiveKind::DateTime,
            Primitive::Duration(_) => PrimitiveKind::Duration,
            Primitive::MediaType(_) => PrimitiveKind::MediaType,
        }
    }
}

/// An xsd:anyURI reference.
///
/// Unlike the IRI kind, relative references are legal here, so the value is
/// kept as written rather than forced through [`Url`] normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriRef {
    value: String,
}

impl UriRef {
    pub fn parse(value: &str) -> Result<Self, DecodeError> {
        match Url::parse(value) {
            Ok(_) => Ok(Self { value: value.to_string() }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
                    Err(DecodeError::InvalidUri(value.to_string()))
                } else {
                    Ok(Self { value: value.to_string() })
                }
            }
            Err(_) => Err(DecodeError::InvalidUri(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Display for UriRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A localized string value.
///
/// Decoded from the wire the language tag is absent, since a bare JSON
/// string carries none. Tagged values come from natural-language maps or
/// from programmatic construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangString {
    value: String,
    language: Option<String>,
}

impl LangString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }

    /// A value tagged with a BCP 47 language tag.
    // see https://www.rfc-editor.org/rfc/rfc5646
    pub fn with_language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into()),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// An xsd:duration, held as a signed span of time.
///
/// Calendar components are normalized on parse (a year counts 365 days, a
/// month 30) and the value re-serializes in canonical `PnDTnHnMnS` form, so
/// the round-trip guarantee is semantic rather than textual: `"P1M"` comes
/// back as `"P30D"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XsdDuration(chrono::Duration);

impl XsdDuration {
    pub fn new(duration: chrono::Duration) -> Self {
        Self(duration)
    }

    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let malformed = || DecodeError::InvalidDuration(text.to_string());
        let captures = DURATION_RE.captures(text).ok_or_else(malformed)?;

        // "P" and "PT" pass the grammar but carry no component at all.
        if captures.iter().skip(2).all(|group| group.is_none()) {
            return Err(malformed());
        }

        let component = |index: usize| -> Result<i64, DecodeError> {
            captures
                .get(index)
                .map(|m| m.as_str().parse::<i64>().map_err(|_| malformed()))
                .unwrap_or(Ok(0))
        };

        let years = component(2)?;
        let months = component(3)?;
        let days = component(4)?;
        let hours = component(5)?;
        let minutes = component(6)?;
        let seconds: f64 = captures
            .get(7)
            .map(|m| m.as_str().parse::<f64>().map_err(|_| malformed()))
            .unwrap_or(Ok(0.0))?;

        let total_days = years
            .checked_mul(365)
            .and_then(|y| months.checked_mul(30).map(|m| (y, m)))
            .and_then(|(y, m)| y.checked_add(m))
            .and_then(|ym| ym.checked_add(days))
            .ok_or_else(malformed)?;
        let total_millis = total_days
            .checked_mul(86_400_000)
            .and_then(|t| hours.checked_mul(3_600_000).and_then(|h| t.checked_add(h)))
            .and_then(|t| minutes.checked_mul(60_000).and_then(|m| t.checked_add(m)))
            .and_then(|t| t.checked_add((seconds * 1000.0).round() as i64))
            .ok_or_else(malformed)?;

        let signed = if captures.get(1).is_some() { -total_millis } else { total_millis };
        Ok(Self(chrono::Duration::milliseconds(signed)))
    }

    pub fn as_duration(&self) -> chrono::Duration {
        self.0
    }
}

impl Display for XsdDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let total = self.0.num_milliseconds();
        let mut rest = total.unsigned_abs();

        let millis = rest % 1000;
        rest /= 1000;
        let seconds = rest % 60;
        rest /= 60;
        let minutes = rest % 60;
        rest /= 60;
        let hours = rest % 24;
        let days = rest / 24;

        let mut out = String::new();
        if total < 0 {
            out.push('-');
        }
        out.push('P');
        if days > 0 {
            let _ = write!(out, "{days}D");
        }
        if hours > 0 || minutes > 0 || seconds > 0 || millis > 0 || days == 0 {
            out.push('T');
            if hours > 0 {
                let _ = write!(out, "{hours}H");
            }
            if minutes > 0 {
                let _ = write!(out, "{minutes}M");
            }
            if millis > 0 {
                let fraction = format!("{millis:03}");
                let _ = write!(out, "{seconds}.{}S", fraction.trim_end_matches('0'));
            } else if seconds > 0 || (days == 0 && hours == 0 && minutes == 0) {
                let _ = write!(out, "{seconds}S");
            }
        }
        f.write_str(&out)
    }
}

/// A validated MIME media type, e.g. `text/html; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    value: String,
}

impl MediaType {
    pub fn parse(value: &str) -> Result<Self, DecodeError> {
        if MEDIA_TYPE_RE.is_match(value) {
            Ok(Self { value: value.to_string() })
        } else {
            Err(DecodeError::InvalidMediaType(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
