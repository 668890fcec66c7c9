//! csv.rs
//! Two-column `id,value` files: attribute input, downstream-pair input, cumulative output.

use super::{open, write_atomically, FileError};
use crate::propagation::CumulativeMap;
use crate::store::{AttributeMap, LinkId};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Splits `line` into exactly two trimmed fields. Blank lines and lines with
/// any other number of fields yield `None`.
fn two_fields(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let mut parts = line.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Some((a.trim(), b.trim())),
        _ => None,
    }
}

/// Accepts plain integers and integral floats such as `12.0`.
fn parse_link(field: &str) -> Option<LinkId> {
    if let Ok(id) = field.parse::<LinkId>() {
        return Some(id);
    }
    let v = field.parse::<f64>().ok()?;
    (v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64).then(|| LinkId(v as u32))
}

/// Parses `link_id,value` lines.
///
/// Blank lines and lines without exactly two fields are skipped silently;
/// lines whose fields do not parse are skipped with a warning.
pub fn parse_attributes<R: BufRead>(reader: R, source: &Path) -> Result<AttributeMap, FileError> {
    let mut attributes = AttributeMap::new();
    let mut skipped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| FileError::io(source, e))?;
        let Some((id_field, value_field)) = two_fields(&line) else {
            if !line.trim().is_empty() {
                skipped += 1;
            }
            continue;
        };
        match (parse_link(id_field), value_field.parse::<f64>()) {
            (Some(link), Ok(value)) => {
                attributes.insert(link, value);
            }
            _ => {
                warn!(path = %source.display(), line = idx + 1, "Skipping unparsable attribute line '{}'", line.trim());
                skipped += 1;
            }
        }
    }

    debug!(path = %source.display(), links = attributes.len(), skipped, "Parsed attributes");
    Ok(attributes)
}

pub fn read_attributes(path: &Path) -> Result<AttributeMap, FileError> {
    let attributes = parse_attributes(open(path)?, path)?;
    info!(path = %path.display(), "Got attributes of {} links", attributes.len());
    Ok(attributes)
}

/// Parses `link_id,downstream_link_id` lines with the same skipping rules as
/// attribute files.
pub fn parse_downstream_pairs<R: BufRead>(reader: R, source: &Path) -> Result<Vec<(LinkId, LinkId)>, FileError> {
    let mut pairs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| FileError::io(source, e))?;
        let Some((link_field, down_field)) = two_fields(&line) else { continue };
        match (parse_link(link_field), parse_link(down_field)) {
            (Some(link), Some(down)) => pairs.push((link, down)),
            _ => warn!(path = %source.display(), line = idx + 1, "Skipping unparsable pair line '{}'", line.trim()),
        }
    }
    Ok(pairs)
}

pub fn read_downstream_pairs(path: &Path) -> Result<Vec<(LinkId, LinkId)>, FileError> {
    let pairs = parse_downstream_pairs(open(path)?, path)?;
    info!(path = %path.display(), "Got {} downstream pairs", pairs.len());
    Ok(pairs)
}

/// Renders `link_id,cumulative_value` lines in visitation order.
pub fn render_cumulative<W: Write>(cumulative: &CumulativeMap, out: &mut W) -> std::io::Result<()> {
    for (link, value) in cumulative.iter() {
        writeln!(out, "{},{:?}", link, value)?;
    }
    Ok(())
}

pub fn write_cumulative(path: &Path, cumulative: &CumulativeMap) -> Result<(), FileError> {
    write_atomically(path, |w| render_cumulative(cumulative, w))?;
    info!(path = %path.display(), links = cumulative.len(), "Wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn attrs(text: &str) -> AttributeMap {
        parse_attributes(Cursor::new(text), Path::new("attrs.csv")).unwrap()
    }

    #[test]
    fn test_attribute_lines() {
        let map = attrs("1,0.5\n\n 2 , 1.25 \n3,4,5\n4\n5,abc\n6.0,2\n");
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(LinkId(1)), Some(0.5));
        assert_eq!(map.get(LinkId(2)), Some(1.25));
        assert_eq!(map.get(LinkId(6)), Some(2.0));
        assert!(!map.contains(LinkId(3)));
        assert!(!map.contains(LinkId(5)));
    }

    #[test]
    fn test_later_line_overrides_earlier() {
        let map = attrs("7,1\n7,3\n");
        assert_eq!(map.get(LinkId(7)), Some(3.0));
    }

    #[test]
    fn test_downstream_pairs() {
        let pairs = parse_downstream_pairs(Cursor::new("2,1\n3,1\nbad\n4,x\n4,2\n"), Path::new("p.csv")).unwrap();
        assert_eq!(pairs, vec![(LinkId(2), LinkId(1)), (LinkId(3), LinkId(1)), (LinkId(4), LinkId(2))]);
    }

    #[test]
    fn test_render_cumulative_keeps_order_and_float_form() {
        let mut map = CumulativeMap::new();
        map.insert(LinkId(4), 1.0);
        map.insert(LinkId(1), 2.5);
        let mut out = Vec::new();
        render_cumulative(&map, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "4,1.0\n1,2.5\n");
    }

    #[test]
    fn test_write_cumulative_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut map = CumulativeMap::new();
        map.insert(LinkId(1), 3.0);

        write_cumulative(&path, &map).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1,3.0\n");
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_attributes(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }
}
