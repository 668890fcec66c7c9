//! rvr.rs
//! Reader and writer for RVR topology files.
//!
//! ```text
//! <node_count>
//! <link_id> <num_contributors> [<contributor_id> ...]
//! ```
//! The two-line layout, with the link id alone on its own line followed by
//! `<num_contributors> [<contributor_id> ...]`, is accepted as well.

use super::{open, write_atomically, FileError};
use crate::graph::{Topology, TopologyOptions, TopologyRecord};
use crate::store::LinkId;
use smallvec::SmallVec;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, info};

/// Raw content of an RVR file, before the topology is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RvrContents {
    pub declared_count: usize,
    pub records: Vec<TopologyRecord>,
}

/// Parses RVR text. Any malformed record aborts the parse.
pub fn parse_rvr<R: BufRead>(reader: R, source: &Path) -> Result<RvrContents, FileError> {
    let mut declared_count: Option<usize> = None;
    let mut records = Vec::new();
    // Link id read on its own line, waiting for its contributor line.
    let mut pending: Option<(LinkId, usize)> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| FileError::io(source, e))?;
        let tokens: SmallVec<[&str; 8]> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        // 1. Header
        if declared_count.is_none() {
            if tokens.len() != 1 {
                return Err(FileError::invalid(source, line_no, format!("expected a node count header, found '{}'", line.trim())));
            }
            let count = tokens[0]
                .parse::<usize>()
                .map_err(|_| FileError::invalid(source, line_no, format!("invalid node count '{}'", tokens[0])))?;
            declared_count = Some(count);
            continue;
        }

        // 2. Records
        match pending.take() {
            None if tokens.len() == 1 => {
                pending = Some((parse_id(tokens[0], source, line_no)?, line_no));
            }
            None => {
                let link = parse_id(tokens[0], source, line_no)?;
                records.push(parse_contributors(link, &tokens[1..], source, line_no)?);
            }
            Some((link, _)) => {
                records.push(parse_contributors(link, &tokens, source, line_no)?);
            }
        }
    }

    if let Some((link, line_no)) = pending {
        return Err(FileError::invalid(source, line_no, format!("link {} has no contributor line", link)));
    }
    let declared_count = declared_count.ok_or_else(|| FileError::MissingHeader { path: source.to_path_buf() })?;

    debug!(path = %source.display(), records = records.len(), declared_count, "Parsed RVR");
    Ok(RvrContents { declared_count, records })
}

/// `<num_contributors> [<contributor_id> ...]` for an already known link.
fn parse_contributors(link: LinkId, fields: &[&str], source: &Path, line_no: usize) -> Result<TopologyRecord, FileError> {
    let Some((count_field, ids)) = fields.split_first() else {
        return Err(FileError::invalid(source, line_no, format!("link {} is missing its contributor count", link)));
    };
    let count = count_field
        .parse::<usize>()
        .map_err(|_| FileError::invalid(source, line_no, format!("invalid contributor count '{}' for link {}", count_field, link)))?;
    if count != ids.len() {
        return Err(FileError::invalid(
            source,
            line_no,
            format!("link {} declares {} contributors but lists {}", link, count, ids.len()),
        ));
    }

    let contributors = ids
        .iter()
        .map(|f| parse_id(f, source, line_no))
        .collect::<Result<SmallVec<[LinkId; 4]>, _>>()?;
    Ok(TopologyRecord { link, contributors })
}

fn parse_id(field: &str, source: &Path, line_no: usize) -> Result<LinkId, FileError> {
    field
        .parse::<LinkId>()
        .map_err(|_| FileError::invalid(source, line_no, format!("invalid link id '{}'", field)))
}

/// Reads an RVR file and assembles its topology, auditing the header count.
pub fn read_topology(path: &Path, options: TopologyOptions) -> Result<Topology, FileError> {
    let contents = parse_rvr(open(path)?, path)?;
    let topology = Topology::build(Some(contents.declared_count), contents.records, options)
        .map_err(|source| FileError::Topology { path: path.to_path_buf(), source })?;
    info!(
        path = %path.display(),
        "Got connectivity for {} of {} declared links",
        topology.len(),
        contents.declared_count
    );
    Ok(topology)
}

/// Renders `topology` in the single-line layout.
pub fn render_rvr<W: Write>(topology: &Topology, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", topology.len())?;
    for record in topology.records() {
        write!(out, "{} {}", record.link, record.contributors.len())?;
        for contributor in &record.contributors {
            write!(out, " {}", contributor)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_topology(path: &Path, topology: &Topology) -> Result<(), FileError> {
    write_atomically(path, |w| render_rvr(topology, w))?;
    info!(path = %path.display(), links = topology.len(), "Wrote topology file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<RvrContents, FileError> {
        parse_rvr(Cursor::new(text), Path::new("test.rvr"))
    }

    fn ids(raw: &[u32]) -> Vec<LinkId> { raw.iter().map(|&v| LinkId(v)).collect() }

    #[test]
    fn test_single_and_two_line_layouts_agree() {
        let single = "4\n1 2 2 3\n2 1 4\n3 0\n4 0\n";
        let double = "4\n\n1\n2 2 3\n\n2\n1 4\n3\n0\n4\n0\n";

        let a = parse(single).unwrap();
        let b = parse(double).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.declared_count, 4);
        assert_eq!(a.records[0], TopologyRecord::new(LinkId(1), &ids(&[2, 3])));
        assert_eq!(a.records[3], TopologyRecord::headwater(LinkId(4)));
    }

    #[test]
    fn test_trailing_whitespace_is_tolerated() {
        let contents = parse("2 \n\n10 1 11 \n11 0 \n").unwrap();
        assert_eq!(contents.records.len(), 2);
    }

    #[rstest]
    #[case::count_mismatch("2\n1 2 2\n2 0\n", 2)]
    #[case::bad_id("2\n1 1 x\n2 0\n", 2)]
    #[case::bad_count("2\n1 y 2\n2 0\n", 2)]
    #[case::dangling_id("2\n1 1 2\n2\n", 3)]
    #[case::bad_header("two\n1 0\n", 1)]
    fn test_malformed_records_abort(#[case] text: &str, #[case] expected_line: usize) {
        match parse(text) {
            Err(FileError::InvalidRecord { line, .. }) => assert_eq!(line, expected_line),
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_has_no_header() {
        assert!(matches!(parse("\n\n"), Err(FileError::MissingHeader { .. })));
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.rvr");
        let topo = Topology::from_records(vec![
            TopologyRecord::new(LinkId(1), &ids(&[2, 3])),
            TopologyRecord::headwater(LinkId(2)),
            TopologyRecord::headwater(LinkId(3)),
        ]);

        write_topology(&path, &topo).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3\n1 2 2 3\n2 0\n3 0\n");

        let back = read_topology(&path, TopologyOptions::default()).unwrap();
        assert_eq!(back.records().collect::<Vec<_>>(), topo.records().collect::<Vec<_>>());
    }

    #[test]
    fn test_strict_mode_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.rvr");
        std::fs::write(&path, "5\n1 0\n").unwrap();

        let err = read_topology(&path, TopologyOptions { strict_node_count: true }).unwrap_err();
        assert!(matches!(err, FileError::Topology { .. }));
        assert!(err.to_string().contains("short.rvr"));
        assert!(read_topology(&path, TopologyOptions::default()).is_ok());
    }
}
