//! Line-oriented point files
//!
//! Raw points are stored one per line as `x,y,weight`, averaged points as
//! `x,y`. Blank lines are ignored on read.

use crate::error::{Error, Result};
use crate::points::{AveragedPoint, RawPoint};
use std::io::{BufRead, Write};

/// Write raw sub-pixel points as `x,y,weight` lines
pub fn write_raw_points<W: Write>(mut writer: W, points: &[RawPoint]) -> Result<()> {
    for p in points {
        writeln!(writer, "{},{},{}", p.x, p.y, p.weight)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write averaged points as `x,y` lines
pub fn write_averaged_points<W: Write>(mut writer: W, points: &[AveragedPoint]) -> Result<()> {
    for p in points {
        writeln!(writer, "{},{}", p.x, p.y)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a raw point file
pub fn read_raw_points<R: BufRead>(reader: R) -> Result<Vec<RawPoint>> {
    read_records(reader, 3, |f| RawPoint::new(f[0], f[1], f[2]))
}

/// Read an averaged point file
pub fn read_averaged_points<R: BufRead>(reader: R) -> Result<Vec<AveragedPoint>> {
    read_records(reader, 2, |f| AveragedPoint::new(f[0], f[1]))
}

fn read_records<R, T, F>(reader: R, arity: usize, build: F) -> Result<Vec<T>>
where
    R: BufRead,
    F: Fn(&[f64]) -> T,
{
    let mut out = Vec::new();
    let mut fields = Vec::with_capacity(arity);

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        fields.clear();
        for token in trimmed.split(',') {
            let value = token.trim().parse::<f64>().map_err(|e| Error::PointRecord {
                line: idx + 1,
                reason: format!("'{}': {}", token.trim(), e),
            })?;
            fields.push(value);
        }

        if fields.len() != arity {
            return Err(Error::PointRecord {
                line: idx + 1,
                reason: format!("expected {} fields, found {}", arity, fields.len()),
            });
        }
        out.push(build(&fields));
    }

    Ok(out)
}
