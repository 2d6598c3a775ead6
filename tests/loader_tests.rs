use keyglide::trace::loader::{load_from_file, read_csv};
use keyglide::{DecoderError, InputTrace};
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_with_suffix(suffix: &str) -> NamedTempFile {
    tempfile::Builder::new().suffix(suffix).tempfile().unwrap()
}

#[test]
fn test_loader_reads_gesture_csv() {
    let mut file = temp_with_suffix(".csv");
    writeln!(file, "x,y,time").unwrap();
    writeln!(file, "10, 20, 0").unwrap();
    writeln!(file, "15, 22, 16").unwrap();
    writeln!(file, "30, 25, 33").unwrap();

    let trace = load_from_file(file.path()).unwrap();
    assert_eq!(trace.len(), 3);
    assert_eq!(trace.ys, vec![20, 22, 25]);
    assert_eq!(trace.time_at(2), 33);
    assert!(trace.codes.is_none());
    assert_eq!(trace.pointer_id_at(1), 0);
}

#[test]
fn test_loader_reads_taps_with_codes() {
    let data = "x,y,pointer_id,code\n100,225,0,h\n600,75,0,73\n";
    let trace = read_csv(data.as_bytes()).unwrap();
    assert_eq!(trace.codes, Some(vec!['h' as i32, 73]));
    assert_eq!(trace.pointer_ids, Some(vec![0, 0]));
    assert!(!trace.has_times());
    assert_eq!(trace.time_at(0), -1);
}

#[test]
fn test_loader_rejects_bad_code() {
    let data = "x,y,code\n1,2,ab\n";
    assert!(matches!(
        read_csv(data.as_bytes()),
        Err(DecoderError::Validation(_))
    ));
}

#[test]
fn test_loader_rejects_backwards_time() {
    let data = "x,y,time\n1,2,50\n3,4,10\n";
    assert!(matches!(
        read_csv(data.as_bytes()),
        Err(DecoderError::TraceShape(_))
    ));
}

#[test]
fn test_loader_rejects_non_numeric_coordinates() {
    let data = "x,y\none,2\n";
    assert!(matches!(read_csv(data.as_bytes()), Err(DecoderError::Csv(_))));
}

#[test]
fn test_loader_reads_json_trace() {
    let mut file = temp_with_suffix(".json");
    let trace = InputTrace::from_points(&[(1, 2, 0), (3, 4, 10)]);
    write!(file, "{}", serde_json::to_string(&trace).unwrap()).unwrap();

    let loaded = load_from_file(file.path()).unwrap();
    assert_eq!(loaded, trace);
}

#[test]
fn test_loader_checks_json_shape() {
    let mut file = temp_with_suffix(".json");
    write!(file, r#"{{"xs": [1, 2], "ys": [1], "times": [0, 1]}}"#).unwrap();
    assert!(matches!(
        load_from_file(file.path()),
        Err(DecoderError::TraceShape(_))
    ));
}

#[test]
fn test_loader_accepts_empty_file() {
    let mut file = temp_with_suffix(".csv");
    writeln!(file, "x,y,time").unwrap();
    let trace = load_from_file(file.path()).unwrap();
    assert!(trace.is_empty());
}
