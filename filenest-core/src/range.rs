//! HTTP byte-range decisions for static content
//!
//! Only the single-range forms `bytes=start-end` and `bytes=start-` are
//! understood. Anything else (suffix ranges, multiple ranges, garbage) is
//! treated as if no Range header had been sent.

use sha2::{Digest, Sha256};

/// A parsed `Range` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive end, `None` for the open-ended `start-` form
    pub end: Option<u64>,
}

impl ByteRange {
    /// Parse a `Range` header value
    pub fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes=")?;
        if spec.contains(',') {
            return None;
        }

        let (start, end) = spec.split_once('-')?;
        let start = start.trim().parse().ok()?;
        let end = match end.trim() {
            "" => None,
            end => Some(end.parse().ok()?),
        };

        Some(Self { start, end })
    }
}

/// How a request for a resource of known length is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// 200 with the whole resource
    Full { total: u64 },
    /// 206 with the inclusive span `start..=end`
    Partial { start: u64, end: u64, total: u64 },
    /// 416 with an empty body
    Unsatisfiable { total: u64 },
}

impl RangeOutcome {
    pub fn decide(range: Option<ByteRange>, total: u64) -> Self {
        let Some(range) = range else {
            return RangeOutcome::Full { total };
        };
        if total == 0 {
            return RangeOutcome::Unsatisfiable { total };
        }

        let end = range.end.unwrap_or(total - 1);
        if range.start > end || end >= total {
            RangeOutcome::Unsatisfiable { total }
        } else {
            RangeOutcome::Partial {
                start: range.start,
                end,
                total,
            }
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            RangeOutcome::Full { .. } => 200,
            RangeOutcome::Partial { .. } => 206,
            RangeOutcome::Unsatisfiable { .. } => 416,
        }
    }

    /// Offset of the first body byte
    pub fn start(&self) -> u64 {
        match self {
            RangeOutcome::Partial { start, .. } => *start,
            _ => 0,
        }
    }

    /// Number of body bytes
    pub fn content_length(&self) -> u64 {
        match self {
            RangeOutcome::Full { total } => *total,
            RangeOutcome::Partial { start, end, .. } => end - start + 1,
            RangeOutcome::Unsatisfiable { .. } => 0,
        }
    }

    /// Value of the `Content-Range` header, if one is sent
    pub fn content_range(&self) -> Option<String> {
        match self {
            RangeOutcome::Full { .. } => None,
            RangeOutcome::Partial { start, end, total } => {
                Some(format!("bytes {}-{}/{}", start, end, total))
            }
            RangeOutcome::Unsatisfiable { total } => Some(format!("bytes */{}", total)),
        }
    }
}

/// Build an entity tag from a version stamp and a size, e.g. `"65f1a2.1024"`
pub fn entity_tag(stamp: u64, size: u64) -> String {
    format!("\"{:x}.{}\"", stamp, size)
}

/// Version stamp for content that has no modification time: the first
/// eight bytes of its SHA-256 digest
pub fn content_stamp(data: &[u8]) -> u64 {
    let digest = Sha256::digest(data);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Does an `If-None-Match` header value match `tag`?
pub fn if_none_match(header: &str, tag: &str) -> bool {
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*"
            || candidate
                .strip_prefix("W/")
                .unwrap_or(candidate)
                .eq_ignore_ascii_case(tag)
    })
}
