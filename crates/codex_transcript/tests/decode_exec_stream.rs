use std::io::Write;
use std::path::PathBuf;

use agent_transcript::{
    DecoderConfig, DecoderLimits, OutputMode, TranscriptBuffer, TranscriptDecoder,
    TranscriptIngestor,
};
use codex_transcript::CodexTranscriptDecoder;

const EXPECTED: &str = "_**Inspecting the workspace**_

✅ `bash -lc 'ls crates'`
```
agent_transcript
claude_transcript
codex_transcript
```

✅ File changes:
- ✏️ [crates/codex_transcript/src/render.rs](file://crates/codex_transcript/src/render.rs)

The three crates are in place and the renderer is updated.

Tokens used: 13,370 total (12,830 in, 540 out) · 9,984 cached";

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(path).expect("read fixture")
}

fn decode_in_pieces(decoder: &mut CodexTranscriptDecoder, pieces: &[&str]) -> TranscriptBuffer {
    let mut buffer = TranscriptBuffer::new();
    for piece in pieces {
        if let Some(update) = decoder.feed(piece) {
            buffer.apply(&update);
        }
    }
    if let Some(update) = decoder.finish() {
        buffer.apply(&update);
    }
    buffer
}

#[test]
fn exec_stream_renders_every_item_kind() {
    let stream = read_fixture("exec_stream.jsonl");
    let mut decoder = CodexTranscriptDecoder::new();
    let buffer = decode_in_pieces(&mut decoder, &[stream.as_str()]);

    assert_eq!(buffer.as_str(), EXPECTED);
    assert_eq!(decoder.dropped_fragments(), 0);
    assert_eq!(
        decoder.state().thread_id.as_deref(),
        Some("0199a213-81c0-7800-8aa1-bbab2a035a53")
    );
}

#[test]
fn every_split_point_gives_the_same_transcript() {
    let stream = read_fixture("exec_stream.jsonl");
    for split in (0..=stream.len()).filter(|idx| stream.is_char_boundary(*idx)) {
        let (head, tail) = stream.split_at(split);
        let mut decoder = CodexTranscriptDecoder::new();
        let buffer = decode_in_pieces(&mut decoder, &[head, tail]);
        assert_eq!(buffer.as_str(), EXPECTED, "split at byte {split}");
    }
}

#[test]
fn crlf_and_sse_framing_decode_identically() {
    let stream = read_fixture("exec_stream.jsonl");
    let framed: String = stream
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| format!("event: message\r\ndata: {line}\r\n\r\n"))
        .chain(std::iter::once("data: [DONE]\r\n".to_string()))
        .collect();

    let mut decoder = CodexTranscriptDecoder::new();
    let buffer = decode_in_pieces(&mut decoder, &[framed.as_str()]);
    assert_eq!(buffer.as_str(), EXPECTED);
}

#[test]
fn append_mode_reconstructs_the_same_transcript() {
    let stream = read_fixture("exec_stream.jsonl");
    let mut decoder = CodexTranscriptDecoder::with_config(DecoderConfig {
        output_mode: OutputMode::Append,
        ..DecoderConfig::default()
    });

    let pieces: Vec<&str> = stream.split_inclusive('\n').collect();
    let buffer = decode_in_pieces(&mut decoder, &pieces);
    assert_eq!(buffer.as_str(), EXPECTED);
}

#[test]
fn file_backed_ingest_yields_final_rebuild() {
    let stream = read_fixture("exec_stream.jsonl");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(stream.as_bytes()).unwrap();
    file.flush().unwrap();

    let limits = DecoderLimits {
        read_chunk_bytes: 64,
        ..DecoderLimits::default()
    };
    let reader = std::fs::File::open(file.path()).unwrap();
    let updates: Vec<_> =
        TranscriptIngestor::new(reader, CodexTranscriptDecoder::new(), limits)
            .collect::<Result<_, _>>()
            .unwrap();

    assert!(updates.iter().all(|update| update.is_replace()));
    assert_eq!(updates.last().map(|update| update.text()), Some(EXPECTED));
}
