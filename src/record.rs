//! Measurement records and their schema description.

/// Source identifier attached to every published record.
pub const OUTPUT_NAME: &str = "ky017";

/// A single tilt measurement emitted to subscribers.
///
/// Records are immutable snapshots: one is created per pin transition (or
/// once at initialization if the pin was readable) and handed to the sink
/// as-is. The previous latest record is replaced, never merged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Sampling time in seconds since the Unix epoch, with sub-second
    /// precision.
    pub sample_time_seconds: f64,
    /// Whether the switch is tilted. Derived from the pin level: the
    /// KY-017 pulls the line low when tilted.
    pub is_tilted: bool,
}

impl Measurement {
    /// Builds a record from an event timestamp in milliseconds.
    pub fn from_event(event_time_millis: i64, is_tilted: bool) -> Self {
        Self {
            sample_time_seconds: event_time_millis as f64 / 1000.0,
            is_tilted,
        }
    }

    /// Returns the schema describing the fields of a measurement record.
    pub fn schema() -> RecordSchema {
        SCHEMA
    }

    /// Returns the recommended text encoding for serialized records.
    ///
    /// Purely descriptive; nothing in this crate enforces it at runtime.
    pub fn recommended_encoding() -> TextEncoding {
        TextEncoding {
            field_separator: ",",
            record_terminator: "\n",
        }
    }
}

const SCHEMA: RecordSchema = RecordSchema {
    name: OUTPUT_NAME,
    label: "KY017",
    description: "KY017 Tilt Sensor Measurements",
    fields: &[
        Field {
            name: "sample_time",
            label: "Sample Time",
            kind: FieldKind::Timestamp,
        },
        Field {
            name: "is_tilted",
            label: "Is Tilted",
            kind: FieldKind::Boolean,
        },
    ],
};

/// Data type of a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Epoch seconds with sub-second precision.
    Timestamp,
    /// True/false value.
    Boolean,
}

/// One field of the record schema.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// Schema descriptor for [`Measurement`] records.
#[derive(Clone, Copy, Debug)]
pub struct RecordSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub fields: &'static [Field],
}

/// Recommended encoding when records are rendered as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextEncoding {
    pub field_separator: &'static str,
    pub record_terminator: &'static str,
}
