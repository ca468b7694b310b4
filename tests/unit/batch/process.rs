use super::*;
use crate::batch::summary::FsSummaryStore;
use crate::config::{AutoframeConfig, EncoderSettings};
use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink};
use crate::foundation::core::{Fps, FrameRGBA};
use crate::media::decode::ClipSource;
use crate::media::probe::{ClipInfo, Rotation};
use crate::media::toolkit::MediaToolkit;
use crate::render::progress::{InMemoryProgressStore, ProgressStore};
use std::path::Path;

struct FlatSource {
    info: ClipInfo,
    remaining: u32,
}

impl ClipSource for FlatSource {
    fn info(&self) -> &ClipInfo {
        &self.info
    }

    fn next_frame(&mut self) -> AutoframeResult<Option<FrameRGBA>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        FrameRGBA::solid(self.info.size(), [10, 20, 30, 255]).map(Some)
    }

    fn close(&mut self) -> AutoframeResult<()> {
        Ok(())
    }
}

// Durations come from the file stem: `long*` is over the limit, `broken*` fails to probe.
struct StubToolkit;

impl MediaToolkit for StubToolkit {
    fn probe(&self, path: &Path) -> AutoframeResult<ClipInfo> {
        let stem = path.file_stem().unwrap().to_string_lossy();
        if stem.starts_with("broken") {
            return Err(AutoframeError::media("no video stream"));
        }
        let duration_sec = if stem.starts_with("long") { 600.0 } else { 0.1 };
        Ok(ClipInfo {
            source_path: path.to_path_buf(),
            width: 16,
            height: 9,
            duration_sec,
            fps: Some(Fps::new(10, 1).unwrap()),
            has_audio: false,
            rotation: Rotation::None,
        })
    }

    fn open_clip(&self, info: &ClipInfo, _fps: Fps) -> AutoframeResult<Box<dyn ClipSource>> {
        Ok(Box::new(FlatSource {
            info: info.clone(),
            remaining: 1,
        }))
    }

    fn extract_audio(&self, _info: &ClipInfo, _dest: &Path) -> AutoframeResult<AudioInputConfig> {
        Err(AutoframeError::media("no audio in stub clips"))
    }

    fn clip_writer(
        &self,
        _out_path: &Path,
        _encoder: &EncoderSettings,
    ) -> AutoframeResult<Box<dyn FrameSink>> {
        Ok(Box::new(InMemorySink::new()))
    }
}

fn processor(root: &Path) -> (BatchProcessor, Arc<InMemoryProgressStore>) {
    let progress = Arc::new(InMemoryProgressStore::new());
    let config = AutoframeConfig::default().with_output_dir(root);
    let orchestrator = RenderOrchestrator::new(Arc::new(StubToolkit), progress.clone(), config);
    let summaries = Arc::new(FsSummaryStore::new(root));
    (BatchProcessor::new(orchestrator, summaries), progress)
}

fn file(name: &str) -> BatchFile {
    BatchFile {
        path: PathBuf::from("/uploads").join(name),
        original_name: name.to_string(),
    }
}

fn request(files: &[&str], ratios: &[&str]) -> BatchRequest {
    BatchRequest {
        job_id: Some("job42".to_string()),
        files: files.iter().map(|f| file(f)).collect(),
        style: "black".to_string(),
        ratios: ratios.iter().map(|r| r.to_string()).collect(),
        ..BatchRequest::default()
    }
}

#[test]
fn validate_batch_filters_and_truncates_ratios() {
    let req = request(
        &["a.mp4", "b.MOV"],
        &["portrait", "bogus", "square", "landscape", "four_five"],
    );
    let batch = validate_batch(&req, 10, 3).unwrap();
    assert_eq!(batch.job_id, "job42");
    assert_eq!(batch.style, StyleKind::Black);
    assert_eq!(batch.ratios, vec!["portrait", "square", "landscape"]);
    assert_eq!(batch.files.len(), 2);
}

#[test]
fn validate_batch_rejects_bad_requests() {
    assert!(validate_batch(&request(&[], &["square"]), 10, 3).is_err());
    assert!(validate_batch(&request(&["  "], &["square"]), 10, 3).is_err());
    assert!(validate_batch(&request(&["a.mp4", "b.mp4"], &["square"]), 1, 3).is_err());
    assert!(validate_batch(&request(&["a.avi"], &["square"]), 10, 3).is_err());
    assert!(validate_batch(&request(&["a.mp4"], &["bogus"]), 10, 3).is_err());

    let mut bad_id = request(&["a.mp4"], &["square"]);
    bad_id.job_id = Some("../etc".to_string());
    assert!(matches!(
        validate_batch(&bad_id, 10, 3),
        Err(AutoframeError::Validation(_))
    ));
}

#[test]
fn missing_job_id_gets_a_fresh_one() {
    let mut req = request(&["a.mp4"], &["square"]);
    req.job_id = None;
    let batch = validate_batch(&req, 10, 3).unwrap();
    assert_eq!(batch.job_id.len(), 32);
    assert!(validate_job_id(&batch.job_id).is_ok());
}

#[test]
fn unknown_style_falls_back_to_default() {
    let mut req = request(&["a.mp4"], &["square"]);
    req.style = "sepia".to_string();
    let batch = validate_batch(&req, 10, 3).unwrap();
    assert_eq!(batch.style, StyleKind::default());
}

#[test]
fn base_overrides_parse_leniently() {
    let map = parse_base_overrides(Some(r#"{"a.mp4": " Launch ", "b.mp4": "", "c.mp4": 3}"#));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("a.mp4").map(String::as_str), Some("Launch"));

    assert!(parse_base_overrides(Some("not json")).is_empty());
    assert!(parse_base_overrides(Some("[1, 2]")).is_empty());
    assert!(parse_base_overrides(None).is_empty());
}

#[test]
fn allowed_file_checks_extension_case_insensitively() {
    assert!(allowed_file("clip.MKV"));
    assert!(allowed_file("my.clip.m4v"));
    assert!(!allowed_file("clip.webm"));
    assert!(!allowed_file("clip"));
}

#[test]
fn batch_sequences_continue_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let (processor, progress) = processor(dir.path());
    let mut req = request(&["first.mp4", "second.mp4"], &["portrait", "square"]);
    req.naming = NamingForm {
        naming_mode: Some("custom".to_string()),
        naming_preset: Some("base_ratio".to_string()),
        ..NamingForm::default()
    };

    let report = processor.process_batch(&req).unwrap();
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.output_count(), 4);

    let sequences: Vec<u32> = report
        .results
        .iter()
        .flat_map(|r| r.outputs.iter().map(|o| o.sequence))
        .collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    assert_eq!(report.results[0].ratio_labels, vec!["9x16", "1x1"]);
    let download_ref = report.results[1].outputs[0].download_ref.as_deref().unwrap();
    assert!(download_ref.starts_with("job42/"), "{download_ref}");

    let summary = FsSummaryStore::new(dir.path()).load("job42").unwrap();
    assert_eq!(summary.output_count(), 4);
    assert_eq!(summary.policy(), Some(&report.policy));
    assert!(progress.get("job42").is_none());
}

#[test]
fn later_submission_inherits_policy_and_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let (processor, _) = processor(dir.path());

    let mut first = request(&["one.mp4"], &["square"]);
    first.naming = NamingForm {
        naming_mode: Some("custom".to_string()),
        naming_preset: Some("base_ratio".to_string()),
        ..NamingForm::default()
    };
    let first_report = processor.process_batch(&first).unwrap();

    let second = request(&["two.mp4"], &["square"]);
    let second_report = processor.process_batch(&second).unwrap();

    assert_eq!(second_report.policy, first_report.policy);
    assert_eq!(second_report.results[0].outputs[0].sequence, 2);
}

#[test]
fn failures_are_collected_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let (processor, progress) = processor(dir.path());
    let req = request(&["long_take.mp4", "broken.mp4", "fine.mp4"], &["square"]);

    let report = processor.process_batch(&req).unwrap();
    assert_eq!(report.too_long, vec!["long_take.mp4"]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].file, "broken.mp4");
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].original_name, "fine.mp4");
    assert!(progress.get("job42").is_none());

    let summary = FsSummaryStore::new(dir.path()).load("job42").unwrap();
    assert_eq!(summary.videos.len(), 1);
}

#[test]
fn failed_file_leaves_error_progress() {
    let dir = tempfile::tempdir().unwrap();
    let (processor, progress) = processor(dir.path());
    let policy = NamingPolicy::auto("2026-01-01");
    let err = processor
        .process_video_file(
            &file("broken.mp4"),
            StyleKind::Black,
            "job7",
            &["square".to_string()],
            &policy,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, AutoframeError::Media(_)));
    let entry = progress.get("job7").unwrap();
    assert_eq!(entry.status, ProgressStatus::Error);
    assert_eq!(entry.progress, 1.0);
}

#[test]
fn too_long_file_leaves_no_progress_entry() {
    let dir = tempfile::tempdir().unwrap();
    let (processor, progress) = processor(dir.path());
    let policy = NamingPolicy::auto("2026-01-01");
    let err = processor
        .process_video_file(
            &file("long_take.mp4"),
            StyleKind::Black,
            "job8",
            &["square".to_string()],
            &policy,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, AutoframeError::ClipTooLong { .. }));
    assert!(err.is_user_facing());
    assert!(progress.get("job8").is_none());
    assert!(!dir.path().join("job8").exists());
}

#[test]
fn blank_secured_name_is_missing_filename() {
    let dir = tempfile::tempdir().unwrap();
    let (processor, _) = processor(dir.path());
    let policy = NamingPolicy::auto("2026-01-01");
    let err = processor
        .process_video_file(
            &file("../"),
            StyleKind::Black,
            "job7",
            &["square".to_string()],
            &policy,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, AutoframeError::MissingFilename));
    assert!(err.is_user_facing());
}

#[test]
fn base_override_drives_output_name() {
    let dir = tempfile::tempdir().unwrap();
    let (processor, _) = processor(dir.path());
    let mut req = request(&["IMG_0001.mp4"], &["portrait"]);
    req.base_overrides
        .insert("IMG_0001.mp4".to_string(), "Spring Launch".to_string());

    let report = processor.process_batch(&req).unwrap();
    let output = &report.results[0].outputs[0];
    assert!(output.filename.ends_with("_9x16.mp4"), "{}", output.filename);
    assert!(output.filename.starts_with("Spring"), "{}", output.filename);
}
