//! Per-frame metadata as a two column CSV table

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::capture::frame::VideoFrame;
use crate::{Error, Result};

/// Write the frame's supported metadata attributes to `out`
pub fn write_metadata<W: Write>(frame: &VideoFrame, mut out: W) -> std::io::Result<()> {
    writeln!(out, "Stream,{}", frame.stream)?;
    writeln!(out, "Metadata Attribute,Value")?;
    for (attribute, value) in frame.metadata.iter() {
        writeln!(out, "{},{}", attribute, value)?;
    }
    out.flush()
}

pub fn metadata_to_csv(frame: &VideoFrame, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_metadata(frame, BufWriter::new(file)).map_err(|e| Error::io(path, e))
}
