//! Reading a complete request off a byte stream.
//!
//! # Responsibilities
//! - Accumulate bytes until the head terminator (CRLFCRLF) arrives
//! - Honour `Content-Length` by reading the declared body
//! - Bound every read with an idle timeout and the whole head with a size cap
//!
//! # Design Decisions
//! - EOF before the head completes returns what was read (possibly nothing);
//!   an empty result means "peer went away", not an error
//! - `Transfer-Encoding` is ignored, there is no chunked support
//! - Bytes past the declared body are dropped (no pipelining)

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::{LimitsConfig, TimeoutConfig};
use crate::http::request::{find_head_end, HEAD_TERMINATOR};

const READ_CHUNK: usize = 4096;

/// Why reading a request was abandoned.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("declared body of {declared} bytes exceeds {limit} bytes")]
    BodyTooLarge { declared: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounds applied while reading one request.
#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    pub idle_timeout: Duration,
    pub max_head_bytes: usize,
    pub max_body_bytes: usize,
}

impl ReadLimits {
    pub fn from_config(timeouts: &TimeoutConfig, limits: &LimitsConfig) -> Self {
        Self {
            idle_timeout: timeouts.read(),
            max_head_bytes: limits.max_head_bytes,
            max_body_bytes: limits.max_body_bytes,
        }
    }
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self::from_config(&TimeoutConfig::default(), &LimitsConfig::default())
    }
}

/// Read one raw request (head plus declared body) from `stream`.
pub async fn read_request<R>(stream: &mut R, limits: &ReadLimits) -> Result<Vec<u8>, ReadError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let mut scanned: usize = 0;

    let head_end = loop {
        // Resume a few bytes back so a terminator split across reads is found.
        let from = scanned.saturating_sub(HEAD_TERMINATOR.len() - 1);
        if let Some(pos) = find_head_end(&buf[from..]) {
            break from + pos;
        }
        scanned = buf.len();

        if buf.len() > limits.max_head_bytes {
            return Err(ReadError::HeadTooLarge(limits.max_head_bytes));
        }

        let n = read_some(stream, &mut chunk, limits.idle_timeout).await?;
        if n == 0 {
            return Ok(buf);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if head_end > limits.max_head_bytes {
        return Err(ReadError::HeadTooLarge(limits.max_head_bytes));
    }

    let body_start = head_end + HEAD_TERMINATOR.len();
    let Some(declared) = content_length(&buf[..head_end]) else {
        buf.truncate(body_start);
        return Ok(buf);
    };
    if declared > limits.max_body_bytes {
        return Err(ReadError::BodyTooLarge {
            declared,
            limit: limits.max_body_bytes,
        });
    }

    let body_end = body_start + declared;
    while buf.len() < body_end {
        let n = read_some(stream, &mut chunk, limits.idle_timeout).await?;
        if n == 0 {
            tracing::debug!(
                expected = declared,
                received = buf.len() - body_start,
                "Peer closed before full body arrived"
            );
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    buf.truncate(body_end);

    Ok(buf)
}

async fn read_some<R>(stream: &mut R, chunk: &mut [u8], idle: Duration) -> Result<usize, ReadError>
where
    R: AsyncRead + Unpin,
{
    match tokio::time::timeout(idle, stream.read(chunk)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ReadError::Timeout(idle)),
    }
}

/// Positive `Content-Length` declared in a request head, if any.
fn content_length(head: &[u8]) -> Option<usize> {
    String::from_utf8_lossy(head)
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .filter(|len| *len > 0)
}
