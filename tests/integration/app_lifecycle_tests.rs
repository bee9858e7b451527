/*!
 * Controller tests over whole videos and directories
 */

use std::sync::Arc;

use subtrans::app_config::{Config, ExtractionConfig};
use subtrans::app_controller::{Controller, RunOptions, VideoOutcome};
use subtrans::extraction::ExtractionEngine;
use subtrans::providers::mock::MockProvider;
use subtrans::providers::CompletionRequest;
use subtrans::translation::prompts::{CHUNK_USER_PREFIX, LANGUAGE_DETECTOR};
use subtrans::translation::{ChunkTranslator, LanguageDetector, NoDelay, TranslationEngine};

use crate::common::fake_tools::{FakeProbe, RecordingToolRunner};
use crate::common::{create_temp_dir, create_test_file, create_test_video, init_test_logger, ENGLISH_SRT, FRENCH_SRT};

fn spanish_config() -> Config {
    Config {
        target_language: "Spanish".to_string(),
        ..Config::default()
    }
}

fn controller(config: Config, probe: FakeProbe, runner: &Arc<RecordingToolRunner>, provider: &MockProvider) -> Controller {
    let provider = Arc::new(provider.clone());
    let extraction = ExtractionEngine::new(Arc::new(probe), runner.clone(), ExtractionConfig::default());
    let translation = TranslationEngine::new(
        LanguageDetector::new(provider.clone(), "m"),
        ChunkTranslator::new(provider.clone(), Arc::new(NoDelay), "m"),
        config.translation.common.max_chunk_chars,
    );
    let detector = LanguageDetector::new(provider, "m");
    Controller::with_engines(config, extraction, translation, detector)
}

fn detect_by_content(request: &CompletionRequest) -> String {
    if request.system == LANGUAGE_DETECTOR {
        if request.user.contains("Bonsoir") {
            return "French".to_string();
        }
        if request.user.contains("Hola") {
            return "Spanish".to_string();
        }
        return "English".to_string();
    }
    let chunk = request.user.strip_prefix(CHUNK_USER_PREFIX).unwrap_or(&request.user);
    chunk.replace("Good evening", "Buenas noches")
}

const SPANISH_SRT: &str = "1\n00:00:01,000 --> 00:00:04,000\nHola a todos y bienvenidos de nuevo al programa.\n\n2\n00:00:05,000 --> 00:00:09,500\nEsta noche hablamos de trenes y de ríos.\n";

#[tokio::test]
async fn test_run_withEnglishSubtitle_shouldExtractAndTranslate() {
    init_test_logger();
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(dir.path(), "movie.mp4").unwrap();
    let runner = Arc::new(RecordingToolRunner::writing(ENGLISH_SRT));
    let provider = MockProvider::working().with_custom_response(detect_by_content);

    let controller = controller(spanish_config(), FakeProbe::mp4(&["subrip"]), &runner, &provider);
    let outcome = controller.run(&video, RunOptions::default()).await.unwrap();

    let output = dir.path().join("movie.es.srt");
    assert!(matches!(outcome, VideoOutcome::Translated { ref path, .. } if path == &output));
    assert!(std::fs::read_to_string(&output).unwrap().contains("Buenas noches"));
    assert!(!dir.path().join("movie.extracted.srt").exists());
}

#[tokio::test]
async fn test_run_withExistingSpanishSubtitle_shouldSkipExtraction() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(dir.path(), "movie.mkv").unwrap();
    create_test_file(dir.path(), "movie.es.srt", SPANISH_SRT).unwrap();
    let runner = Arc::new(RecordingToolRunner::writing(ENGLISH_SRT));
    let provider = MockProvider::working().with_custom_response(detect_by_content);

    let controller = controller(spanish_config(), FakeProbe::matroska(&["subrip"]), &runner, &provider);
    let outcome = controller.run(&video, RunOptions::default()).await.unwrap();

    assert!(matches!(outcome, VideoOutcome::ExistingSubtitle { ref path, .. } if path == &dir.path().join("movie.es.srt")));
    assert!(runner.calls().is_empty());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_run_withExistingPlainSubtitleInOtherLanguage_shouldTranslate() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(dir.path(), "movie.mp4").unwrap();
    create_test_file(dir.path(), "movie.srt", FRENCH_SRT).unwrap();
    let runner = Arc::new(RecordingToolRunner::writing(ENGLISH_SRT));
    let provider = MockProvider::working().with_custom_response(detect_by_content);

    let controller = controller(spanish_config(), FakeProbe::mp4(&["subrip"]), &runner, &provider);
    let outcome = controller.run(&video, RunOptions::default()).await.unwrap();

    assert!(matches!(outcome, VideoOutcome::Translated { .. }));
    assert!(!runner.calls().is_empty());
}

#[tokio::test]
async fn test_run_withForceOverwrite_shouldIgnoreExistingSubtitle() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(dir.path(), "movie.mp4").unwrap();
    create_test_file(dir.path(), "movie.es.srt", SPANISH_SRT).unwrap();
    let runner = Arc::new(RecordingToolRunner::writing(ENGLISH_SRT));
    let provider = MockProvider::working().with_custom_response(detect_by_content);

    let controller = controller(spanish_config(), FakeProbe::mp4(&["subrip"]), &runner, &provider);
    let options = RunOptions { force_overwrite: true, ..Default::default() };
    let outcome = controller.run(&video, options).await.unwrap();

    assert!(matches!(outcome, VideoOutcome::Translated { .. }));
    let written = std::fs::read_to_string(dir.path().join("movie.es.srt")).unwrap();
    assert!(written.contains("Buenas noches"));
}

#[tokio::test]
async fn test_run_withExtractOnly_shouldKeepExtractedFile() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(dir.path(), "movie.mp4").unwrap();
    let runner = Arc::new(RecordingToolRunner::writing(ENGLISH_SRT));
    let provider = MockProvider::working();

    let controller = controller(spanish_config(), FakeProbe::mp4(&["subrip"]), &runner, &provider);
    let options = RunOptions { extract_only: true, ..Default::default() };
    let outcome = controller.run(&video, options).await.unwrap();

    let extracted = dir.path().join("movie.extracted.srt");
    assert_eq!(outcome, VideoOutcome::Extracted { path: extracted.clone() });
    assert!(extracted.exists());
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_run_withSubtitleAlreadyInTarget_shouldReportAlreadyInTarget() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(dir.path(), "movie.mp4").unwrap();
    let runner = Arc::new(RecordingToolRunner::writing(SPANISH_SRT));
    let provider = MockProvider::working().with_custom_response(detect_by_content);

    let controller = controller(spanish_config(), FakeProbe::mp4(&["subrip"]), &runner, &provider);
    let outcome = controller.run(&video, RunOptions::default()).await.unwrap();

    assert!(matches!(outcome, VideoOutcome::AlreadyInTarget { .. }));
    assert!(!dir.path().join("movie.es.srt").exists());
    assert!(!dir.path().join("movie.extracted.srt").exists());
}

#[test]
fn test_run_withMissingVideo_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let runner = Arc::new(RecordingToolRunner::failing());
    let provider = MockProvider::working();

    let controller = controller(spanish_config(), FakeProbe::mp4(&[]), &runner, &provider);
    let result = tokio_test::block_on(async {
        controller.run(&dir.path().join("missing.mkv"), RunOptions::default()).await
    });

    assert!(result.is_err());
    assert!(runner.calls().is_empty());
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_runFolder_shouldProcessEveryVideoAndSummarize() {
    let dir = create_temp_dir().unwrap();
    create_test_video(dir.path(), "a.mkv").unwrap();
    std::fs::create_dir(dir.path().join("season1")).unwrap();
    create_test_video(&dir.path().join("season1"), "b.mp4").unwrap();
    create_test_file(dir.path(), "notes.txt", "not a video").unwrap();
    let runner = Arc::new(RecordingToolRunner::failing());
    let provider = MockProvider::working();

    let controller = controller(spanish_config(), FakeProbe::mp4(&[]), &runner, &provider);
    let summary = controller.run_folder(dir.path(), RunOptions::default()).await.unwrap();

    assert_eq!(summary.no_subtitles, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total(), 2);
}

#[tokio::test]
async fn test_runFolder_withTranslations_shouldCountAndAccumulateUsage() {
    let dir = create_temp_dir().unwrap();
    create_test_video(dir.path(), "a.mp4").unwrap();
    create_test_video(dir.path(), "b.mp4").unwrap();
    let runner = Arc::new(RecordingToolRunner::writing(ENGLISH_SRT));
    let provider = MockProvider::working().with_custom_response(detect_by_content);

    let controller = controller(spanish_config(), FakeProbe::mp4(&["subrip"]), &runner, &provider);
    let summary = controller.run_folder(dir.path(), RunOptions::default()).await.unwrap();

    assert_eq!(summary.translated, 2);
    // One detection and one chunk per video
    assert_eq!(summary.usage.requests, 4);
    assert!(dir.path().join("a.es.srt").exists());
    assert!(dir.path().join("b.es.srt").exists());
}

#[test]
fn test_runFolder_withoutVideos_shouldFail() {
    let dir = create_temp_dir().unwrap();
    create_test_file(dir.path(), "notes.txt", "not a video").unwrap();
    let runner = Arc::new(RecordingToolRunner::failing());
    let provider = MockProvider::working();

    let controller = controller(spanish_config(), FakeProbe::mp4(&[]), &runner, &provider);
    let result = tokio_test::block_on(async {
        controller.run_folder(dir.path(), RunOptions::default()).await
    });

    assert!(result.is_err());
}
