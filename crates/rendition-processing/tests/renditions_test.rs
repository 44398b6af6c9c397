mod helpers;

use helpers::fake_tool::{FakeTool, FrameOutcome};
use helpers::fixtures::{source, PORTRAIT_DASH, PORTRAIT_HLS, PORTRAIT_MP4};
use helpers::{setup_pipeline, PUBLIC_BASE_URL};
use rendition_core::{PreviewRange, RenditionSize};

fn offsets(record: &rendition_core::VideoMetadataRecord, size: RenditionSize) -> Vec<u64> {
    record
        .thumbnails
        .entries(size)
        .iter()
        .map(|e| e.offset_seconds)
        .collect()
}

#[tokio::test]
async fn test_thumbnails_stop_at_first_fully_failed_offset() {
    let tool = FakeTool::new().with_frame_rule(|offset, _, _| {
        if offset < 3 {
            FrameOutcome::Write
        } else {
            FrameOutcome::Fail
        }
    });
    let pipeline = setup_pipeline(tool);

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_MP4))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(offsets(&record, RenditionSize::Small), vec![0, 1, 2]);
    assert_eq!(offsets(&record, RenditionSize::Medium), vec![0, 1, 2]);

    let frame_calls = pipeline.tool.frame_calls();
    // 4 offsets x 2 size classes, nothing retried, nothing past offset 3
    assert_eq!(frame_calls.len(), 8);
    assert_eq!(frame_calls.iter().map(|c| c.0).max(), Some(3));
}

#[tokio::test]
async fn test_single_size_failure_does_not_stop_series() {
    let tool = FakeTool::new().with_frame_rule(|offset, width, _| match (offset, width) {
        (1, 360) => FrameOutcome::Fail,
        (2, 180) => FrameOutcome::NoFile,
        (o, _) if o >= 4 => FrameOutcome::Fail,
        _ => FrameOutcome::Write,
    });
    let pipeline = setup_pipeline(tool);

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_MP4))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(offsets(&record, RenditionSize::Small), vec![0, 1, 3]);
    assert_eq!(offsets(&record, RenditionSize::Medium), vec![0, 2, 3]);
}

#[tokio::test]
async fn test_thumbnails_use_aspect_preserving_dimensions() {
    let tool = FakeTool::new().with_frame_rule(|offset, _, _| {
        if offset == 0 {
            FrameOutcome::Write
        } else {
            FrameOutcome::Fail
        }
    });
    let pipeline = setup_pipeline(tool);

    pipeline
        .orchestrator
        .process(&source(PORTRAIT_MP4))
        .await
        .unwrap();

    let first_offset: Vec<_> = pipeline
        .tool
        .frame_calls()
        .into_iter()
        .filter(|c| c.0 == 0)
        .collect();
    // small before medium
    assert_eq!(first_offset, vec![(0, 180, 320), (0, 360, 640)]);
}

#[tokio::test]
async fn test_landscape_source_dimensions() {
    let tool = FakeTool::new()
        .with_dimensions(1920, 1080)
        .with_frame_rule(|offset, _, _| {
            if offset == 0 {
                FrameOutcome::Write
            } else {
                FrameOutcome::Fail
            }
        });
    let pipeline = setup_pipeline(tool);

    pipeline
        .orchestrator
        .process(&source(PORTRAIT_MP4))
        .await
        .unwrap();

    assert!(pipeline.tool.frame_calls().contains(&(0, 640, 360)));
    assert!(pipeline.tool.frame_calls().contains(&(0, 320, 180)));
}

#[tokio::test]
async fn test_series_ends_at_first_empty_offset_past_stream_end() {
    let pipeline = setup_pipeline(FakeTool::new().with_default_duration(12.5));

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_MP4))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        offsets(&record, RenditionSize::Small),
        (0..=12).collect::<Vec<_>>()
    );
    // Offset 13 is tried for both sizes and comes back empty
    let frame_calls = pipeline.tool.frame_calls();
    assert_eq!(frame_calls.iter().filter(|c| c.0 == 13).count(), 2);
    assert_eq!(frame_calls.iter().map(|c| c.0).max(), Some(13));
}

#[tokio::test]
async fn test_frames_beyond_reported_duration_are_kept() {
    // Container says 10.5s, the stream actually has frames up to 19s
    let tool = FakeTool::new()
        .with_default_duration(10.5)
        .with_frame_rule(|offset, _, _| {
            if offset <= 19 {
                FrameOutcome::Write
            } else {
                FrameOutcome::NoFile
            }
        });
    let pipeline = setup_pipeline(tool);

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_MP4))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        offsets(&record, RenditionSize::Medium),
        (0..=19).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_mp4_source_gets_no_previews() {
    let pipeline = setup_pipeline(FakeTool::new());

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_MP4))
        .await
        .unwrap()
        .unwrap();

    assert!(record.previews.is_empty());
    assert!(pipeline.tool.clip_calls().is_empty());
}

#[tokio::test]
async fn test_dash_source_gets_one_preview_per_range() {
    let pipeline = setup_pipeline(FakeTool::new());

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_DASH))
        .await
        .unwrap()
        .unwrap();

    let bounds: Vec<_> = record
        .previews
        .iter()
        .map(|p| (p.start_ms, p.end_ms))
        .collect();
    assert_eq!(bounds, vec![(5_000, 10_000), (15_000, 20_000)]);
    assert_eq!(
        record.previews[0].url,
        format!("{}/previews/manifest/preview_5_10.mp4", PUBLIC_BASE_URL)
    );
    assert!(pipeline
        .backend
        .get("previews/manifest/preview_15_20.mp4")
        .is_some());
}

#[tokio::test]
async fn test_failed_preview_range_is_skipped() {
    let failing = PreviewRange::new(5, 10).unwrap();
    let pipeline = setup_pipeline(FakeTool::new().with_failing_clip(failing));

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_DASH))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(pipeline.tool.clip_calls().len(), 2);
    assert_eq!(record.previews.len(), 1);
    assert_eq!(record.previews[0].start_ms, 15_000);
}

#[tokio::test]
async fn test_hls_source_gets_previews() {
    let pipeline = setup_pipeline(FakeTool::new());

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_HLS))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(pipeline.tool.clip_calls().len(), 2);
    assert_eq!(record.previews.len(), 2);
    assert_eq!(
        record.previews[1].url,
        format!("{}/previews/playlist/preview_15_20.mp4", PUBLIC_BASE_URL)
    );
}

#[tokio::test]
async fn test_preview_without_output_file_is_skipped() {
    let silent = PreviewRange::new(15, 20).unwrap();
    let pipeline = setup_pipeline(FakeTool::new().with_silent_clip(silent));

    let record = pipeline
        .orchestrator
        .process(&source(PORTRAIT_DASH))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(pipeline.tool.clip_calls().len(), 2);
    assert_eq!(record.previews.len(), 1);
    assert_eq!(record.previews[0].end_ms, 10_000);
    assert!(pipeline
        .backend
        .get("previews/manifest/preview_15_20.mp4")
        .is_none());
}
