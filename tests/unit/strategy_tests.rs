/*!
 * Tests for the extraction strategy chain as data
 */

use std::path::PathBuf;

use subtrans::extraction::strategy::{
    build_chain, ffmpeg_conversion_args, first_success, is_image_codec, AttemptOutcome, StrategyId,
};

#[test]
fn test_buildChain_shouldOrderRemuxContainers() {
    let chain = build_chain(false);
    let remux: Vec<_> = chain[..4].iter().map(|attempt| attempt.strategy).collect();
    assert_eq!(
        remux,
        vec![
            StrategyId::RemuxCopy("vtt"),
            StrategyId::RemuxCopy("srt"),
            StrategyId::RemuxCopy("ass"),
            StrategyId::RemuxCopy("ssa"),
        ]
    );
    assert!(chain[..4].iter().all(|attempt| attempt.options.copy));
}

#[test]
fn test_needsConversion_shouldOnlyApplyToNonSrtOutputs() {
    let conversions: Vec<bool> = build_chain(true).iter().map(|attempt| attempt.needs_conversion()).collect();
    assert_eq!(
        conversions,
        vec![false, true, false, true, true, false, false, false, false, false, false, false]
    );
}

#[test]
fn test_isImageCodec_shouldRecognizeBitmapFormats() {
    for codec in ["hdmv_pgs_subtitle", "dvd_subtitle", "dvdsub", "dvb_subtitle", "xsub"] {
        assert!(is_image_codec(codec), "{} should be image-based", codec);
    }
    for codec in ["subrip", "ass", "webvtt", "mov_text", "eia_608"] {
        assert!(!is_image_codec(codec), "{} should be text", codec);
    }
}

#[test]
fn test_strategyDisplay_shouldDescribeAttempt() {
    assert_eq!(StrategyId::DedicatedExtractor.to_string(), "mkvextract");
    assert_eq!(StrategyId::RemuxCopy("ass").to_string(), "copy to .ass");
    assert_eq!(StrategyId::ReencodeCodec("mov_text").to_string(), "re-encode via mov_text");
}

#[test]
fn test_ffmpegConversionArgs_shouldReencodeToSrt() {
    assert_eq!(
        ffmpeg_conversion_args("a.extracted.ass", "a.extracted.srt").join(" "),
        "-y -i a.extracted.ass -c:s srt a.extracted.srt"
    );
}

#[tokio::test]
async fn test_firstSuccess_withNoSuccess_shouldRunEveryAttemptOnce() {
    let chain = build_chain(true);
    let mut runs = 0;

    let result = first_success(&chain, |attempt| {
        runs += 1;
        let outcome = match attempt.strategy {
            StrategyId::RemuxCopy(_) => AttemptOutcome::Empty,
            _ => AttemptOutcome::ToolError("Conversion failed!".to_string()),
        };
        async move { outcome }
    })
    .await;

    assert_eq!(result, None::<PathBuf>);
    assert_eq!(runs, 12);
}
