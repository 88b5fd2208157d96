use std::io::Write;
use std::path::PathBuf;

use agent_transcript::{
    parse_agent_output, DecoderLimits, TranscriptBuffer, TranscriptDecoder, TranscriptIngestor,
};
use claude_transcript::ClaudeTranscriptDecoder;

const EXPECTED: &str = "Agent: claude | Command: stream-json
--------
model: claude-opus-4-1-20250805
--------
Working
• I'll run the suite first.
• The `fn main() {}` stub stays as is.
• Bash: python -m unittest -v — Run the unit tests
• BashOutput: test_add (test_math.TestMath) ... ok
• test_sub (test_math.TestMath) ... ok
• ----------------------------------------------------------------------
• Ran 2 tests in 0.001s
• OK
• Bash: cat <<'EOF' > NOTES.md
• Answer
• tokens used: 12
• EOF — Record the run
• Every test passes — nothing to fix.
--------
Answer
Summary
--------
All 2 tests pass.

No changes were needed.
";

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(path).expect("read fixture")
}

fn decode_in_pieces(pieces: &[&str]) -> (TranscriptBuffer, ClaudeTranscriptDecoder) {
    let mut decoder = ClaudeTranscriptDecoder::new();
    let mut buffer = TranscriptBuffer::new();
    for piece in pieces {
        if let Some(update) = decoder.feed(piece) {
            assert!(!update.is_replace());
            buffer.apply(&update);
        }
    }
    if let Some(update) = decoder.finish() {
        buffer.apply(&update);
    }
    (buffer, decoder)
}

#[test]
fn session_decodes_to_cli_markup() {
    let stream = read_fixture("session.jsonl");
    let (buffer, decoder) = decode_in_pieces(&[stream.as_str()]);

    assert_eq!(buffer.as_str(), EXPECTED);
    assert_eq!(decoder.dropped_fragments(), 0);
    assert_eq!(
        decoder.state().session_id.as_deref(),
        Some("5d2f6c1e-7a4b-4c8e-9f1d-3b2a1c0d9e8f")
    );
}

#[test]
fn parser_recovers_bullets_model_and_answer() {
    let stream = read_fixture("session.jsonl");
    let (buffer, _) = decode_in_pieces(&[stream.as_str()]);
    let parsed = parse_agent_output(buffer.as_str()).expect("decoder output parses");

    assert_eq!(parsed.header.agent.as_deref(), Some("claude"));
    assert_eq!(parsed.header.command.as_deref(), Some("stream-json"));
    assert_eq!(parsed.meta.model.as_deref(), Some("claude-opus-4-1-20250805"));
    assert_eq!(
        parsed.working,
        vec![
            "I'll run the suite first.".to_string(),
            "The `fn main() {}` stub stays as is.".to_string(),
            "Bash: python -m unittest -v — Run the unit tests".to_string(),
            "BashOutput: test_add (test_math.TestMath) ... ok".to_string(),
            "test_sub (test_math.TestMath) ... ok".to_string(),
            "-".repeat(70),
            "Ran 2 tests in 0.001s".to_string(),
            "OK".to_string(),
            "Bash: cat <<'EOF' > NOTES.md".to_string(),
            "Answer".to_string(),
            "tokens used: 12".to_string(),
            "EOF — Record the run".to_string(),
            "Every test passes — nothing to fix.".to_string(),
        ]
    );
    assert_eq!(
        parsed.answer.as_deref(),
        Some("Summary\n--------\nAll 2 tests pass.\n\nNo changes were needed.")
    );
    assert_eq!(parsed.tokens_used, None);
    assert_eq!(parsed.thinking, None);
}

#[test]
fn every_split_point_gives_the_same_transcript() {
    let stream = read_fixture("session.jsonl");
    for split in (0..=stream.len()).filter(|idx| stream.is_char_boundary(*idx)) {
        let (head, tail) = stream.split_at(split);
        let (buffer, _) = decode_in_pieces(&[head, tail]);
        assert_eq!(buffer.as_str(), EXPECTED, "split at byte {split}");
    }
}

#[test]
fn concatenated_objects_without_newlines_decode_identically() {
    let stream = read_fixture("session.jsonl").replace('\n', "");
    let (buffer, _) = decode_in_pieces(&[stream.as_str()]);
    assert_eq!(buffer.as_str(), EXPECTED);
}

#[test]
fn file_backed_ingest_appends_to_the_full_transcript() {
    let stream = read_fixture("session.jsonl");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(stream.as_bytes()).unwrap();
    file.flush().unwrap();

    // Small reads split multi-byte characters across chunks.
    let limits = DecoderLimits {
        read_chunk_bytes: 5,
        ..DecoderLimits::default()
    };
    let reader = std::fs::File::open(file.path()).unwrap();
    let mut buffer = TranscriptBuffer::new();
    for update in TranscriptIngestor::new(reader, ClaudeTranscriptDecoder::new(), limits) {
        buffer.apply(&update.unwrap());
    }
    assert_eq!(buffer.as_str(), EXPECTED);
}
