//! Embedded tag extraction using lofty.

use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use infer::MatcherType;
use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use tracing::debug;

use super::record::{Extraction, TagRecord};

/// Extract tags from raw file bytes.
///
/// Never fails: anything that cannot be parsed as a tagged audio file is
/// reported as [`Extraction::NotAudio`]. Audio files without tags are still
/// `Tagged`, just with every field empty.
pub fn extract(bytes: &[u8]) -> Extraction {
    if let Some(kind) = infer::get(bytes) {
        if is_never_audio(kind.matcher_type()) {
            debug!("Skipping tag extraction for {}", kind.mime_type());
            return Extraction::NotAudio;
        }
    }

    match panic::catch_unwind(AssertUnwindSafe(|| read_record(bytes))) {
        Ok(Ok(record)) => Extraction::Tagged(record),
        Ok(Err(err)) => {
            debug!("Not an audio file: {}", err);
            Extraction::NotAudio
        }
        Err(_) => {
            debug!("Tag parser aborted on malformed input");
            Extraction::NotAudio
        }
    }
}

fn is_never_audio(matcher: MatcherType) -> bool {
    matches!(
        matcher,
        MatcherType::Image
            | MatcherType::Archive
            | MatcherType::Doc
            | MatcherType::Book
            | MatcherType::Font
            | MatcherType::Text
            | MatcherType::App
    )
}

fn read_record(bytes: &[u8]) -> lofty::error::Result<TagRecord> {
    let tagged_file = Probe::new(Cursor::new(bytes)).guess_file_type()?.read()?;

    let properties = tagged_file.properties();
    let duration = properties.duration();

    let mut record = TagRecord {
        length: (!duration.is_zero()).then(|| duration.as_secs_f64()),
        bitrate: properties.audio_bitrate().map(i64::from),
        samplerate: properties.sample_rate().map(i64::from),
        channels: properties.channels().map(i64::from),
        format: Some(format_name(tagged_file.file_type())),
        ..Default::default()
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        fill_from_tag(&mut record, tag);
    }

    Ok(record)
}

fn fill_from_tag(record: &mut TagRecord, tag: &Tag) {
    let text = |key: ItemKey| {
        tag.get_string(&key)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    record.title = text(ItemKey::TrackTitle);
    record.artist = text(ItemKey::TrackArtist);
    record.album = text(ItemKey::AlbumTitle);
    record.album_artist = text(ItemKey::AlbumArtist);
    record.label = text(ItemKey::Label);
    record.comments = text(ItemKey::Comment);
    record.track = text(ItemKey::TrackNumber);
    record.disc = text(ItemKey::DiscNumber);
    record.release_id = text(ItemKey::MusicBrainzReleaseId);
    record.release_group_id = text(ItemKey::MusicBrainzReleaseGroupId);
    record.track_id = text(ItemKey::MusicBrainzRecordingId);
    record.genre = text(ItemKey::Genre);
    record.year = tag.year().map(i64::from);
}

fn format_name(file_type: FileType) -> String {
    match file_type {
        FileType::Mpeg => "MP3".to_string(),
        FileType::Flac => "FLAC".to_string(),
        FileType::Opus => "Opus".to_string(),
        FileType::Vorbis => "OGG".to_string(),
        FileType::Aac => "AAC".to_string(),
        FileType::Mp4 => "AAC".to_string(),
        FileType::Wav => "WAV".to_string(),
        FileType::Aiff => "AIFF".to_string(),
        other => format!("{:?}", other),
    }
}
