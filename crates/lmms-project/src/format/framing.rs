//! `.mmpz` compression framing: a big-endian u32 holding the uncompressed
//! length, followed by a zlib stream.

use std::io::{self, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::{DecodeError, EncodeError};

/// Size of the length prefix.
pub const HEADER_LEN: usize = 4;

/// On-disk representation of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    /// Plain XML (`.mmp`).
    Xml,
    /// Length-prefixed zlib XML (`.mmpz`).
    Compressed,
}

impl ProjectFormat {
    /// Pick the format from a file extension; anything but `.mmpz` is plain XML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mmpz") => ProjectFormat::Compressed,
            _ => ProjectFormat::Xml,
        }
    }

    /// Strip the framing, returning XML bytes.
    pub fn unwrap_bytes(self, data: &[u8]) -> Result<Vec<u8>, DecodeError> {
        match self {
            ProjectFormat::Xml => Ok(data.to_vec()),
            ProjectFormat::Compressed => decompress(data),
        }
    }

    /// Apply the framing to XML bytes.
    pub fn wrap_bytes(self, xml: &[u8]) -> Result<Vec<u8>, EncodeError> {
        match self {
            ProjectFormat::Xml => Ok(xml.to_vec()),
            ProjectFormat::Compressed => compress(xml),
        }
    }
}

/// Inflate a compressed project. The length prefix is informational and not checked.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if data.len() < HEADER_LEN {
        return Err(DecodeError::Truncated(data.len()));
    }
    let expected = BigEndian::read_u32(&data[..HEADER_LEN]);
    let input = &data[HEADER_LEN..];

    let mut inflater = Decompress::new(true);
    let mut xml = Vec::with_capacity((expected as usize).clamp(1024, 64 << 20));
    loop {
        if xml.len() == xml.capacity() {
            xml.reserve(xml.capacity());
        }
        let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
        let status = inflater
            .decompress_vec(&input[in_before as usize..], &mut xml, FlushDecompress::None)
            .map_err(|e| DecodeError::Decompress(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        if matches!(status, Status::StreamEnd) {
            break;
        }
        if inflater.total_in() == in_before && inflater.total_out() == out_before {
            return Err(DecodeError::Decompress(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compressed stream ends early",
            )));
        }
    }
    tracing::trace!(expected, actual = xml.len(), "inflated project");
    Ok(xml)
}

/// Deflate XML bytes behind a length prefix.
pub fn compress(xml: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let len = u32::try_from(xml.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "project XML exceeds 4 GiB")
    })?;
    let mut out = Vec::with_capacity(HEADER_LEN + xml.len() / 4);
    out.write_u32::<BigEndian>(len)?;
    let mut encoder = ZlibEncoder::new(out, Compression::default());
    encoder.write_all(xml)?;
    Ok(encoder.finish()?)
}
