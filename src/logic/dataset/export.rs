use std::fs;
use std::io;
use std::path::Path;

/// Merge every dataset file into a single JSONL payload.
/// Returns the number of source files merged along with the bytes.
pub fn merged_jsonl(base_dir: &Path) -> io::Result<(usize, Vec<u8>)> {
    if !base_dir.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Dataset directory not found",
        ));
    }

    // Sort by timestamp (filename) to maintain chronological order
    let mut paths: Vec<_> = fs::read_dir(base_dir)?
        .filter_map(|r| r.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "jsonl"))
        .collect();
    paths.sort();

    let mut output = Vec::new();
    let mut file_count = 0;

    for path in paths {
        let content = fs::read(&path)?;
        if !content.is_empty() {
            output.extend_from_slice(&content);
            // Keep row boundaries intact across file seams
            if !content.ends_with(b"\n") {
                output.push(b'\n');
            }
        }
        file_count += 1;
    }

    tracing::info!("Merged {} dataset files for export", file_count);
    Ok((file_count, output))
}
