use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn parse_edge_line(line: &str) -> Result<(u32, u32), String> {
    let mut parts = line.split_whitespace();
    let u = parts
        .next()
        .ok_or_else(|| format!("Can't parse edge from line '{}'", line))?
        .parse::<u32>()
        .map_err(|_| format!("Can't parse edge from line '{}'", line))?;
    let v = parts
        .next()
        .ok_or_else(|| format!("Can't parse edge from line '{}'", line))?
        .parse::<u32>()
        .map_err(|_| format!("Can't parse edge from line '{}'", line))?;
    if parts.next().is_some() {
        return Err(format!("Trailing data on edge line '{}'", line));
    }
    Ok((u, v))
}

/// Reads whitespace-separated vertex id pairs, one undirected edge per
/// non-empty line. The model assumes a simple graph, so self-loops and
/// repeated edges are rejected here.
pub fn parse_edge_list(path: &Path) -> Result<Vec<(u32, u32)>, String> {
    let file =
        File::open(path).map_err(|e| format!("Error opening file '{}': {}", path.display(), e))?;
    let reader = BufReader::new(file);

    let mut edges: Vec<(u32, u32)> = Vec::new();
    let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();

    for line_res in reader.lines() {
        let line =
            line_res.map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (u, v) = parse_edge_line(line)?;
        if u == v {
            return Err(format!("Self-loop ({}, {}) is not allowed", u, v));
        }
        let key = (u.min(v), u.max(v));
        if !seen.insert(key) {
            return Err(format!("Duplicate edge ({}, {})", u, v));
        }
        edges.push((u, v));
    }

    if edges.is_empty() {
        return Err(format!("Edge list '{}' is empty", path.display()));
    }

    Ok(edges)
}

/// Reads one group id per non-empty line, in vertex order.
pub fn parse_memberships(path: &Path) -> Result<Vec<u32>, String> {
    let file =
        File::open(path).map_err(|e| format!("Error opening file '{}': {}", path.display(), e))?;
    let reader = BufReader::new(file);

    let mut memberships = Vec::new();
    for line_res in reader.lines() {
        let line =
            line_res.map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mb = line
            .parse::<u32>()
            .map_err(|_| format!("Can't parse group id from line '{}'", line))?;
        memberships.push(mb);
    }

    if memberships.is_empty() {
        return Err(format!("Membership file '{}' is empty", path.display()));
    }

    Ok(memberships)
}
