use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use logcube_types::{Error, Result, Schema};

use crate::cube::Cube;
use crate::extract::ExtractionEngine;

/// Build a cube from lines that are already in memory
pub fn cube_from_lines<I, S>(schema: Arc<Schema>, lines: I) -> Result<Cube>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let engine = ExtractionEngine::new(Arc::clone(&schema));
    let mut cube = Cube::new(schema);
    cube.extend(engine.extract(lines))?;
    Ok(cube)
}

/// Read all lines of a file.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD so one corrupt
/// line does not abort ingestion. Only I/O failures are errors.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let read_error = |source: std::io::Error| Error::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    BufReader::new(file)
        .split(b'\n')
        .map(|line| {
            line.map(|mut bytes| {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                String::from_utf8_lossy(&bytes).into_owned()
            })
        })
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_error)
}

/// Build a cube from log files, processed in the given order.
///
/// Files behave as one concatenated input. Any unreadable file aborts the
/// whole operation.
pub fn generate_cube<P: AsRef<Path>>(paths: &[P], schema: Arc<Schema>) -> Result<Cube> {
    let engine = ExtractionEngine::new(Arc::clone(&schema));
    let mut cube = Cube::new(schema);

    for path in paths {
        let path = path.as_ref();
        let lines = read_lines(path)?;
        let records = engine.extract(&lines);
        debug!(
            path = %path.display(),
            lines = lines.len(),
            records = records.len(),
            "ingested log file"
        );
        cube.extend(records)?;
    }

    Ok(cube)
}

/// Build a cube from log files using a schema definition file
pub fn generate_cube_from_definition<P: AsRef<Path>>(paths: &[P], definition: impl AsRef<Path>) -> Result<Cube> {
    let schema = Schema::load(definition)?;
    generate_cube(paths, Arc::new(schema))
}
