/*!
 * Subtitle extraction from video containers.
 *
 * - `probe`: enumerate subtitle streams (ffprobe)
 * - `tool`: run external programs with a timeout and bounded output
 * - `strategy`: the ordered fallback chain, as data
 * - `engine`: drives the chain per stream until one yields an SRT file
 */

pub mod probe;
pub mod tool;
pub mod strategy;
pub mod engine;

pub use engine::ExtractionEngine;
pub use probe::{FfprobeStreamProbe, ProbeResult, StreamProbe, SubtitleStream};
pub use strategy::{AttemptOptions, AttemptOutcome, ExtractionAttempt, StrategyId};
pub use tool::{ProcessToolRunner, ToolOutput, ToolRunner};
