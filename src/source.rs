use crate::config::READ_BUFFER_SIZE;
use anyhow::{Context, Result};
use bzip2::read::MultiBzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Opens a line-delimited JSON file for reading. Files ending in `.bz2` are
/// decompressed on the fly.
pub fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Failed to open input: {}", path))?;

    if is_bzip2(path) {
        Ok(Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiBzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

fn is_bzip2(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bz2"))
}
