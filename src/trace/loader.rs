use super::InputTrace;
use crate::consts::CodePoint;
use crate::error::{DecoderError, DgResult};
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct TraceRow {
    x: i32,
    y: i32,
    #[serde(default)]
    time: Option<i32>,
    #[serde(default)]
    pointer_id: Option<i32>,
    #[serde(default)]
    code: Option<String>,
}

/// A code column holds either a single character or a numeric code point.
fn parse_code(raw: &str) -> DgResult<CodePoint> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_ascii_digit() => Ok(c as CodePoint),
        _ => raw
            .parse()
            .map_err(|_| DecoderError::Validation(format!("invalid key code '{}'", raw))),
    }
}

/// Reads `x,y[,time][,pointer_id][,code]` rows. Optional columns must be filled on every
/// row or on none.
pub fn read_csv<R: Read>(reader: R) -> DgResult<InputTrace> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut times = Vec::new();
    let mut pointer_ids = Vec::new();
    let mut codes = Vec::new();

    for result in rdr.deserialize() {
        let row: TraceRow = result?;
        xs.push(row.x);
        ys.push(row.y);
        times.extend(row.time);
        pointer_ids.extend(row.pointer_id);
        if let Some(code) = row.code.as_deref().filter(|c| !c.is_empty()) {
            codes.push(parse_code(code)?);
        }
    }

    let n = xs.len();
    let column = |name: &str, values: Vec<i32>| -> DgResult<Option<Vec<i32>>> {
        match values.len() {
            0 => Ok(None),
            len if len == n => Ok(Some(values)),
            len => Err(DecoderError::TraceShape(format!(
                "column '{}' filled on {} of {} rows",
                name, len, n
            ))),
        }
    };

    let trace = InputTrace {
        times: column("time", times)?,
        pointer_ids: column("pointer_id", pointer_ids)?,
        codes: column("code", codes)?,
        xs,
        ys,
    };
    trace.validate()?;
    debug!(points = trace.len(), timed = trace.has_times(), "trace loaded");
    Ok(trace)
}

/// Loads a trace from `.csv` or `.json`, picked by extension.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> DgResult<InputTrace> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let trace = if is_json {
        let content = fs::read_to_string(path)?;
        let trace: InputTrace = serde_json::from_str(&content)?;
        trace.validate()?;
        trace
    } else {
        read_csv(fs::File::open(path)?)?
    };
    if trace.is_empty() {
        warn!("trace file {} holds no points", path.display());
    }
    Ok(trace)
}
