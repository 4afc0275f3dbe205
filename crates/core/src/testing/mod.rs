//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of all external collaborator
//! traits, allowing full pipeline runs without yt-dlp, whisper or an LLM
//! endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use tapedeck_core::testing::{MockMediaSource, MockSummarizer, MockTranscriber};
//!
//! let source = MockMediaSource::new();
//! source.set_playlist(vec![/* discovered items */]);
//! source.set_subtitle_missing("some-id");
//!
//! // Wire into a PipelineRunner...
//! ```

mod mock_source;
mod mock_summarizer;
mod mock_transcriber;

pub use mock_source::MockMediaSource;
pub use mock_summarizer::MockSummarizer;
pub use mock_transcriber::MockTranscriber;
