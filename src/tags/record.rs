use std::fmt;

/// A single extracted tag value, kept in its native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(s) => write!(f, "{}", s),
            TagValue::Integer(i) => write!(f, "{}", i),
            TagValue::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Metadata gleaned from the embedded tags and audio properties of a file.
///
/// `track` and `disc` are kept as the raw tag text; numeric coercion
/// happens when the catalog records are derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub label: Option<String>,
    pub comments: Option<String>,
    pub track: Option<String>,
    pub disc: Option<String>,
    pub release_id: Option<String>,
    pub release_group_id: Option<String>,
    pub track_id: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i64>,
    pub length: Option<f64>,
    pub bitrate: Option<i64>,
    pub samplerate: Option<i64>,
    pub channels: Option<i64>,
    pub format: Option<String>,
}

impl TagRecord {
    /// Every present field as a (key, value) pair, in a stable order.
    pub fn fields(&self) -> Vec<(&'static str, TagValue)> {
        let text = [
            ("title", &self.title),
            ("artist", &self.artist),
            ("album", &self.album),
            ("album_artist", &self.album_artist),
            ("label", &self.label),
            ("comments", &self.comments),
            ("track", &self.track),
            ("disc", &self.disc),
            ("release_id", &self.release_id),
            ("release_group_id", &self.release_group_id),
            ("track_id", &self.track_id),
            ("genre", &self.genre),
            ("format", &self.format),
        ];
        let integers = [
            ("year", self.year),
            ("bitrate", self.bitrate),
            ("samplerate", self.samplerate),
            ("channels", self.channels),
        ];

        let mut fields: Vec<(&'static str, TagValue)> = text
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key, TagValue::Text(v))))
            .collect();
        fields.extend(
            integers
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, TagValue::Integer(v)))),
        );
        if let Some(length) = self.length {
            fields.push(("length", TagValue::Float(length)));
        }
        fields
    }

    /// Album artist, falling back to the track artist.
    pub fn effective_album_artist(&self) -> Option<&str> {
        self.album_artist
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.artist.as_deref())
    }
}

/// Result of running the tag extractor over an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Tagged(TagRecord),
    /// The bytes are not a parseable audio file (cover art, cue sheets, ...).
    NotAudio,
}

impl Extraction {
    pub fn tags(&self) -> Option<&TagRecord> {
        match self {
            Extraction::Tagged(record) => Some(record),
            Extraction::NotAudio => None,
        }
    }
}
