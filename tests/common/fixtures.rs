//! In-memory test files
//!
//! Audio fixtures are minimal FLAC streams: a STREAMINFO block describing
//! ten seconds of 44.1kHz stereo audio, followed by a VORBIS_COMMENT block
//! carrying the given tags. No audio frames are needed to read tags.

/// Builds a FLAC file whose only content is the given Vorbis comments.
pub fn flac_with_tags(tags: &[(&str, &str)]) -> Vec<u8> {
    let mut out = b"fLaC".to_vec();

    let mut stream_info = Vec::with_capacity(34);
    stream_info.extend_from_slice(&4096u16.to_be_bytes()); // min block size
    stream_info.extend_from_slice(&4096u16.to_be_bytes()); // max block size
    stream_info.extend_from_slice(&[0, 0, 0, 0, 0, 0]); // frame sizes unknown
    // sample rate (20 bits), channels - 1 (3), bits - 1 (5), total samples (36)
    let packed: u64 = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36) | 441_000u64;
    stream_info.extend_from_slice(&packed.to_be_bytes());
    stream_info.extend_from_slice(&[0u8; 16]); // md5
    push_block(&mut out, 0, false, &stream_info);

    let vendor = b"smuggler-tests";
    let mut comments = Vec::new();
    comments.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    comments.extend_from_slice(vendor);
    comments.extend_from_slice(&(tags.len() as u32).to_le_bytes());
    for (key, value) in tags {
        let entry = format!("{}={}", key, value);
        comments.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        comments.extend_from_slice(entry.as_bytes());
    }
    push_block(&mut out, 4, true, &comments);

    out
}

fn push_block(out: &mut Vec<u8>, block_type: u8, last: bool, content: &[u8]) {
    let flag = if last { 0x80 } else { 0x00 };
    out.push(flag | block_type);
    out.extend_from_slice(&(content.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(content);
}

/// The tagged track of the basic ingestion scenario.
pub fn song_flac() -> Vec<u8> {
    flac_with_tags(&[
        ("TITLE", "Song"),
        ("ARTIST", "Band"),
        ("ALBUM", "LP"),
        ("TRACKNUMBER", "3"),
    ])
}

/// A 1x1 PNG, standing in for cover art.
pub fn cover_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}
