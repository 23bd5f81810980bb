//! Windows-1252 to UTF-8 transcoding reader.
//!
//! EDM files are shipped in the Windows-1252 codepage. Every byte maps to a
//! character, so decoding never fails; bytes the vendor did not intend simply
//! come out as unexpected characters.

use encoding_rs::{Decoder, WINDOWS_1252};
use std::io::{self, Read};

const RAW_BUFFER_SIZE: usize = 64 * 1024;

/// Streaming [`Read`] adapter producing UTF-8 from a legacy codepage
pub struct LegacyDecoder<R> {
    inner: R,
    decoder: Decoder,
    raw: Vec<u8>,
    decoded: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl<R: Read> LegacyDecoder<R> {
    /// Decode the EDM codepage
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            decoder: WINDOWS_1252.new_decoder_without_bom_handling(),
            raw: vec![0; RAW_BUFFER_SIZE],
            decoded: Vec::new(),
            pos: 0,
            finished: false,
        }
    }

    /// Refill `decoded` from the next raw chunk
    fn fill(&mut self) -> io::Result<()> {
        let read = self.inner.read(&mut self.raw)?;
        let last = read == 0;

        let capacity = self
            .decoder
            .max_utf8_buffer_length(read)
            .unwrap_or(read * 3 + 16);
        self.decoded.clear();
        self.decoded.resize(capacity, 0);
        self.pos = 0;

        let (_result, _bytes_read, bytes_written, _had_errors) =
            self.decoder
                .decode_to_utf8(&self.raw[..read], &mut self.decoded, last);
        self.decoded.truncate(bytes_written);

        if last {
            self.finished = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for LegacyDecoder<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.decoded.len() {
                let n = out.len().min(self.decoded.len() - self.pos);
                out[..n].copy_from_slice(&self.decoded[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished || out.is_empty() {
                return Ok(0);
            }
            self.fill()?;
        }
    }
}
