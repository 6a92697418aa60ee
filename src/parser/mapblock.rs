//! Map and mask grid handling.
//!
//! Map data appears both as standalone `.map`/`.mask` files and embedded in
//! `map_data=` / `mask=` attributes. Grids are collected into a cell matrix
//! (comma-separated or one terrain code per character), transformed cell by
//! cell against the terrain rename table, and written back preserving
//! header lines, indentation, and the enclosing quotes.

use std::collections::VecDeque;

use crate::report::Reporter;
use crate::rules::catalog::MAP_CHANGES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Map,
    Mask,
}

impl MapKind {
    pub fn attribute(&self) -> &'static str {
        match self {
            MapKind::Map => "map_data=\"",
            MapKind::Mask => "mask=\"",
        }
    }
}

/// A gathered grid plus the non-data lines found inside it.
#[derive(Debug, Clone, Default)]
pub struct MapBlock {
    /// Comment and header lines in original order.
    pub headers: Vec<String>,
    /// One row of cells per map line.
    pub rows: Vec<Vec<String>>,
    /// A `key=value` header line was present (old map format).
    pub have_header: bool,
    /// A blank delimiter line separated header from data.
    pub have_delimiter: bool,
}

/// Gather map rows from the front of `feed` until the closing quote (or end
/// of input for standalone files). `lineno` tracks consumed lines for
/// diagnostics. Warns once if a map, rather than a mask, carries fog or
/// shroud codes.
pub fn collect_map(
    feed: &mut VecDeque<String>,
    lineno: &mut usize,
    kind: MapKind,
    filename: &str,
    reporter: &mut Reporter,
) -> MapBlock {
    let mut block = MapBlock::default();
    let mut warned = false;
    let mut cont = true;
    while cont {
        let mut line = match feed.pop_front() {
            Some(l) => l,
            None => break,
        };
        *lineno += 1;
        // Comments and old-style header lines pass through untouched.
        if line.is_empty() || line.starts_with('#') || line.contains('=') {
            if line.contains('=') {
                block.have_header = true;
            }
            if line.is_empty() {
                block.have_delimiter = true;
            }
            block.headers.push(line);
            continue;
        }
        if line.contains('"') {
            cont = false;
            line = line.split('"').next().unwrap_or("").to_string();
        }
        if !line.is_empty() {
            if !warned && kind == MapKind::Map && has_fog_or_shroud(&line) {
                reporter.report(filename, *lineno, "warning, fog or shroud in map file");
                warned = true;
            }
            block.rows.push(split_cells(&line));
        }
    }
    block
}

/// Split one map line into cells: comma-separated in the current format,
/// one character per cell in the pre-1.4 format.
pub fn split_cells(line: &str) -> Vec<String> {
    if line.contains(',') {
        line.split(',').map(str::to_string).collect()
    } else {
        line.chars().map(|c| c.to_string()).collect()
    }
}

/// Apply the terrain rename table to every cell in place.
pub fn apply_map_changes(block: &mut MapBlock) {
    for row in &mut block.rows {
        for cell in row.iter_mut() {
            for (old, new) in MAP_CHANGES {
                if cell.contains(old) {
                    *cell = cell.replace(old, new);
                }
            }
        }
    }
}

/// Serialize the block back into lines: headers first, a delimiter if the
/// old format requires one, then comma-joined rows.
pub fn render_rows(block: &MapBlock, out: &mut Vec<String>) {
    out.extend(block.headers.iter().cloned());
    if block.have_header && !block.have_delimiter {
        out.push(String::new());
    }
    for row in &block.rows {
        out.push(row.join(","));
    }
}

/// Fog (`_f`, except the `_fme` embellishment) or shroud (`_s`) codes,
/// which belong in masks.
pub fn has_fog_or_shroud(line: &str) -> bool {
    let bytes = line.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        if bytes[i] != b'_' {
            continue;
        }
        match bytes[i + 1] {
            b's' => return true,
            b'f' if !line[i + 2..].starts_with("me") => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed_of(lines: &[&str]) -> VecDeque<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_collect_comma_map() {
        let mut feed = feed_of(&["Gg, Gg, Ww", "Gg, Mm, Ww", "\""]);
        let mut lineno = 0;
        let mut reporter = Reporter::new();
        let block = collect_map(&mut feed, &mut lineno, MapKind::Map, "a.cfg", &mut reporter);
        assert_eq!(block.rows.len(), 2);
        assert_eq!(block.rows[0], vec!["Gg", " Gg", " Ww"]);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_collect_charwise_map() {
        let mut feed = feed_of(&["ggw", "gmw"]);
        let mut lineno = 0;
        let mut reporter = Reporter::new();
        let block = collect_map(&mut feed, &mut lineno, MapKind::Map, "a.map", &mut reporter);
        assert_eq!(block.rows[0], vec!["g", "g", "w"]);
    }

    #[test]
    fn test_headers_preserved() {
        let mut feed = feed_of(&["border_size=1", "usage=map", "", "Gg,Gg", "\""]);
        let mut lineno = 0;
        let mut reporter = Reporter::new();
        let block = collect_map(&mut feed, &mut lineno, MapKind::Map, "a.cfg", &mut reporter);
        assert!(block.have_header);
        assert!(block.have_delimiter);
        assert_eq!(block.headers.len(), 3);

        let mut out = Vec::new();
        render_rows(&block, &mut out);
        assert_eq!(out, vec!["border_size=1", "usage=map", "", "Gg,Gg"]);
    }

    #[test]
    fn test_missing_delimiter_inserted() {
        let block = MapBlock {
            headers: vec!["usage=map".to_string()],
            rows: vec![vec!["Gg".to_string()]],
            have_header: true,
            have_delimiter: false,
        };
        let mut out = Vec::new();
        render_rows(&block, &mut out);
        assert_eq!(out, vec!["usage=map", "", "Gg"]);
    }

    #[test]
    fn test_terrain_renames_apply_per_cell() {
        let mut block = MapBlock {
            rows: vec![split_cells("Gg^Voh,Gg^Vhms")],
            ..MapBlock::default()
        };
        apply_map_changes(&mut block);
        assert_eq!(block.rows[0], vec!["Gg^Vo", "Gg^Vhha"]);
    }

    #[test]
    fn test_fog_and_shroud_detection() {
        assert!(has_fog_or_shroud("Gg^_s,Gg"));
        assert!(has_fog_or_shroud("Gg^_f,Gg"));
        assert!(!has_fog_or_shroud("Gg^_fme,Gg"));
        assert!(!has_fog_or_shroud("Gg,Ww"));
    }

    #[test]
    fn test_fog_warning_once() {
        let mut feed = feed_of(&["Gg,_s", "Gg,_s", "\""]);
        let mut lineno = 0;
        let mut reporter = Reporter::new();
        collect_map(&mut feed, &mut lineno, MapKind::Map, "a.cfg", &mut reporter);
        assert_eq!(reporter.len(), 1);
    }
}
