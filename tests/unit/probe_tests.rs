/*!
 * Tests for the ffprobe-backed stream probe
 */

use std::path::Path;
use std::sync::Arc;

use subtrans::errors::ExtractionError;
use subtrans::extraction::{FfprobeStreamProbe, StreamProbe, ToolOutput};

use crate::common::fake_tools::RecordingToolRunner;

const PROBE_JSON: &str = r#"{
    "streams": [
        {"index": 3, "codec_name": "hdmv_pgs_subtitle", "codec_type": "subtitle", "tags": {"language": "eng"}},
        {"index": 2, "codec_name": "subrip", "codec_type": "subtitle", "tags": {"language": "fre", "title": "Forced"}}
    ],
    "format": {"format_name": "matroska,webm", "duration": "5400.0"}
}"#;

#[tokio::test]
async fn test_probe_shouldInvokeFfprobeAndSortStreams() {
    let runner = Arc::new(RecordingToolRunner::new(|_| ToolOutput {
        stdout: PROBE_JSON.to_string(),
        ..ToolOutput::succeeded()
    }));
    let probe = FfprobeStreamProbe::new("/opt/ffprobe", runner.clone());

    let result = probe.probe(Path::new("/videos/movie.mkv")).await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "/opt/ffprobe");
    assert_eq!(
        calls[0].args.join(" "),
        "-v error -print_format json -show_format -show_streams -select_streams s /videos/movie.mkv"
    );

    assert_eq!(result.format_name.as_deref(), Some("matroska,webm"));
    let indexes: Vec<usize> = result.streams.iter().map(|s| s.index).collect();
    assert_eq!(indexes, vec![2, 3]);
    assert_eq!(result.streams[0].title.as_deref(), Some("Forced"));
}

#[tokio::test]
async fn test_probe_withFailedFfprobe_shouldReturnProbeError() {
    let runner = Arc::new(RecordingToolRunner::new(|_| {
        ToolOutput::failed(1, "movie.mkv: Invalid data found when processing input")
    }));
    let probe = FfprobeStreamProbe::new("ffprobe", runner);

    let result = probe.probe(Path::new("movie.mkv")).await;

    match result {
        Err(ExtractionError::Probe { reason, .. }) => assert!(reason.contains("Invalid data")),
        other => panic!("Expected a probe error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_probe_withEmptyOutput_shouldReturnProbeError() {
    let runner = Arc::new(RecordingToolRunner::silent());
    let probe = FfprobeStreamProbe::new("ffprobe", runner);

    assert!(matches!(probe.probe(Path::new("movie.mkv")).await, Err(ExtractionError::Probe { .. })));
}
