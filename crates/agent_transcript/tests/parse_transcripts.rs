use std::io::Write;
use std::path::PathBuf;

use agent_transcript::{
    classify_working_item, parse_agent_output, DecoderLimits, ParsedAgentOutput,
    TranscriptBuffer, TranscriptDecoder, TranscriptIngestor, TranscriptUpdate, WorkingBadge,
};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_root().join(name)).expect("read fixture")
}

fn parse_fixture(name: &str) -> ParsedAgentOutput {
    parse_agent_output(&read_fixture(name)).expect("fixture is parseable")
}

#[test]
fn codex_cli_transcript_yields_every_field() {
    let out = parse_fixture("codex_exec.txt");

    assert_eq!(out.header.agent.as_deref(), Some("codex"));
    assert_eq!(
        out.header.command.as_deref(),
        Some("exec --skip-git-repo-check")
    );
    assert_eq!(out.meta.model.as_deref(), Some("gpt-5"));
    assert_eq!(out.meta.workdir.as_deref(), Some("/Users/dev/project"));
    assert_eq!(out.meta.get("sandbox"), Some("workspace-write"));
    assert_eq!(out.meta.get("reasoning summaries"), Some("auto"));
    assert_eq!(
        out.user_instructions.as_deref(),
        Some("Summarize the project layout.")
    );
    assert_eq!(
        out.working,
        vec!["Read README.md", "Scanned src/", "Updated docs/overview.md"]
    );
    assert!(out.thinking.as_deref().unwrap().starts_with("**Inspecting"));
    assert_eq!(
        out.answer.as_deref(),
        Some("The project has three crates:\n\n- `agent_transcript`\n- `codex_transcript`\n- `claude_transcript`")
    );
    assert_eq!(out.tokens_used, Some(5347));
    assert_eq!(out.success, Some(true));
}

#[test]
fn failed_run_reports_failure_and_grouped_token_count() {
    let out = parse_fixture("gemini_failed.txt");
    assert_eq!(out.header.agent.as_deref(), Some("gemini"));
    assert_eq!(out.meta.model.as_deref(), Some("gemini-2.5-pro"));
    assert_eq!(out.working, vec!["Modified build.rs", "cargo build"]);
    assert_eq!(
        out.answer.as_deref(),
        Some("The build still fails on a missing system library.")
    );
    assert_eq!(out.tokens_used, Some(1204));
    assert_eq!(out.success, Some(false));
}

#[test]
fn working_entries_classify_for_badges() {
    let out = parse_fixture("codex_exec.txt");
    let badges: Vec<_> = out
        .working
        .iter()
        .map(|entry| classify_working_item(entry).badge)
        .collect();
    assert_eq!(
        badges,
        vec![
            Some(WorkingBadge::Read),
            Some(WorkingBadge::Read),
            Some(WorkingBadge::Modified)
        ]
    );
}

#[test]
fn growing_prefix_only_ever_gains_sections() {
    let text = read_fixture("codex_exec.txt");
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let mut seen_answer = false;
    for end in 1..=lines.len() {
        let prefix = lines[..end].concat();
        let Some(out) = parse_agent_output(&prefix) else {
            continue;
        };
        assert_eq!(out.header.agent.as_deref(), Some("codex"));
        if seen_answer {
            assert!(out.answer.is_some(), "answer vanished at line {end}");
        }
        seen_answer |= out.answer.is_some();
        if let Some(answer) = out.answer.as_deref() {
            assert!(!answer.contains("Inspecting"));
        }
    }
    assert!(seen_answer);
}

#[test]
fn reparsing_is_field_for_field_identical() {
    let text = read_fixture("gemini_failed.txt");
    assert_eq!(parse_agent_output(&text), parse_agent_output(&text));
}

/// Passes text through unchanged.
#[derive(Default)]
struct Passthrough;

impl TranscriptDecoder for Passthrough {
    fn feed(&mut self, chunk: &str) -> Option<TranscriptUpdate> {
        Some(TranscriptUpdate::Append(chunk.to_string()))
    }

    fn finish(&mut self) -> Option<TranscriptUpdate> {
        None
    }

    fn reset(&mut self) {}
}

#[test]
fn file_backed_ingest_matches_one_shot_parse() {
    let text = read_fixture("codex_exec.txt");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();

    let limits = DecoderLimits {
        read_chunk_bytes: 7,
        ..DecoderLimits::default()
    };
    let reader = std::fs::File::open(file.path()).unwrap();
    let mut buffer = TranscriptBuffer::new();
    for update in TranscriptIngestor::new(reader, Passthrough, limits) {
        buffer.apply(&update.unwrap());
    }

    assert_eq!(buffer.as_str(), text);
    assert_eq!(parse_agent_output(buffer.as_str()), parse_agent_output(&text));
}
