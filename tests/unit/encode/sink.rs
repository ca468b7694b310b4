use super::*;
use crate::foundation::core::PixelSize;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
        duration_sec: Some(1.0),
    }
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(cfg().validate().is_ok());
    assert!(SinkConfig { width: 0, ..cfg() }.validate().is_err());
    assert!(
        SinkConfig {
            duration_sec: Some(0.0),
            ..cfg()
        }
        .validate()
        .is_err()
    );
    assert!(
        SinkConfig {
            audio: Some(AudioInputConfig {
                path: PathBuf::from("a.f32"),
                sample_rate: 0,
                channels: 2,
            }),
            ..cfg()
        }
        .validate()
        .is_err()
    );
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let frame = FrameRGBA::solid(PixelSize::new(4, 2), [1, 2, 3, 255]).unwrap();
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(0, &frame).unwrap();
    sink.push_frame(1, &frame).unwrap();
    assert!(sink.push_frame(1, &frame).is_err());
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().width, 4);
}
