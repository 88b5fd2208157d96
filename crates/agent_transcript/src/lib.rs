#![forbid(unsafe_code)]
//! Shared pieces of the agent transcript pipeline.
//!
//! Raw agent output flows through a dialect-specific decoder into transcript markup, and
//! [`parse_agent_output`] turns that markup into the structured record a UI renders. This crate
//! holds everything the dialects share:
//! - [`JsonObjectExtractor`] for unframed, arbitrarily chunked JSON object streams.
//! - The markup grammar ([`markup`]) and its tolerant parser.
//! - [`TranscriptUpdate`] tagging (full rebuild vs. delta) and the [`TranscriptDecoder`] seam.
//! - Chunk readers and ingestors (sync, plus tokio behind the `tokio` feature).

mod agent;
mod config;
mod error;
mod ingest;
mod json_objects;
pub mod markup;
mod output;
mod parser;
mod reader;
mod sanitize;
mod update;

pub use agent::AgentKind;
pub use config::{DecoderConfig, DecoderLimits, ErrorDetailCapture, OutputMode};
pub use error::{
    ErrorDetail, ErrorDetailSink, FragmentError, FragmentErrorCode, FragmentReporter, ReadError,
};
pub use ingest::TranscriptIngestor;
pub use json_objects::JsonObjectExtractor;
pub use markup::MarkupWriter;
pub use output::{
    classify_working_item, AgentHeader, AgentMeta, ParsedAgentOutput, WorkingBadge, WorkingItem,
};
pub use parser::parse_agent_output;
pub use reader::SyncChunkReader;
pub use sanitize::sanitize_cli_output_line;
pub use update::{TranscriptBuffer, TranscriptDecoder, TranscriptUpdate, UpdateShaper};

#[cfg(feature = "tokio")]
pub use ingest::AsyncTranscriptIngestor;
#[cfg(feature = "tokio")]
pub use reader::AsyncChunkReader;
