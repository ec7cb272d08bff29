use bytes::BytesMut;
use thiserror::Error;

pub const LINE_TERMINATOR: u8 = b'\n';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("line exceeded {limit} bytes without a terminator; fragment discarded")]
    LineTooLong { limit: usize },
}

/// Reassembles newline-delimited records from arbitrarily split chunks.
///
/// At most one unterminated fragment is held between calls to [`LineFramer::feed`],
/// capped at `max_line_bytes`. A fragment that outgrows the cap is reported once,
/// dropped, and everything up to the next terminator is skipped.
#[derive(Debug)]
pub struct LineFramer {
    pending: BytesMut,
    max_line_bytes: usize,
    discarding: bool,
}

impl LineFramer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            pending: BytesMut::new(),
            max_line_bytes: max_line_bytes.max(1),
            discarding: false,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<String, FrameError>> {
        let mut out = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == LINE_TERMINATOR) {
            let (segment, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if self.pending.len() + segment.len() > self.max_line_bytes {
                self.pending.clear();
                out.push(Err(self.overflow()));
                continue;
            }
            self.pending.extend_from_slice(segment);
            let record = self.pending.split();
            out.push(Ok(String::from_utf8_lossy(&record).into_owned()));
        }

        if !self.discarding && !rest.is_empty() {
            if self.pending.len() + rest.len() > self.max_line_bytes {
                self.pending.clear();
                self.discarding = true;
                out.push(Err(self.overflow()));
            } else {
                self.pending.extend_from_slice(rest);
            }
        }

        out
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn overflow(&self) -> FrameError {
        FrameError::LineTooLong {
            limit: self.max_line_bytes,
        }
    }
}
