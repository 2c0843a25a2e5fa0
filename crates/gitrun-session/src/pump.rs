//! Reading and routing process output
//!
//! stdout and stderr are read concurrently. Each stream has its own decoder
//! and splitter, so a multi-byte character or a line split across reads on one
//! stream is never mixed up with the other stream.

use encoding_rs::{CoderResult, Decoder, Encoding};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::event::{OutputKind, classify};
use crate::owner::{OwnerContext, SessionMessage};
use crate::transcript::Transcript;

const READ_BUFFER_SIZE: usize = 8192;

/// Incremental decoder that cuts text into chunks at `\r` and `\n`.
///
/// A `\r\n` pair yields one chunk; empty chunks are dropped.
#[derive(Debug)]
pub struct ChunkSplitter {
    decoder: Decoder,
    pending: String,
}

impl ChunkSplitter {
    #[must_use]
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
            pending: String::new(),
        }
    }

    /// Decode `bytes` and return every chunk completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.decode(bytes, false);
        self.take_complete()
    }

    /// Flush the decoder at end of stream and return the trailing partial chunk.
    pub fn finish(&mut self) -> Vec<String> {
        self.decode(&[], true);
        let mut chunks = self.take_complete();
        if !self.pending.is_empty() {
            chunks.push(std::mem::take(&mut self.pending));
        }
        chunks
    }

    fn decode(&mut self, bytes: &[u8], last: bool) {
        let mut input = bytes;
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(input.len())
                .unwrap_or(input.len() * 3 + 16);
            self.pending.reserve(needed);

            let (result, read, _replaced) =
                self.decoder.decode_to_string(input, &mut self.pending, last);
            input = &input[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }

    fn take_complete(&mut self) -> Vec<String> {
        let mut chunks = Vec::new();
        while let Some(end) = self.pending.find(['\r', '\n']) {
            let chunk = self.pending[..end].to_string();
            self.pending.drain(..=end);
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
        }
        chunks
    }
}

/// Moves output from the pipes to the transcript and the owner context.
///
/// Lines are appended to the transcript first and then posted; progress is
/// only posted. Posting never waits for the owner.
#[derive(Clone)]
pub struct OutputPump {
    transcript: Transcript,
    owner: Arc<dyn OwnerContext>,
}

impl std::fmt::Debug for OutputPump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputPump")
            .field("transcript_len", &self.transcript.len())
            .finish_non_exhaustive()
    }
}

impl OutputPump {
    #[must_use]
    pub fn new(transcript: Transcript, owner: Arc<dyn OwnerContext>) -> Self {
        Self { transcript, owner }
    }

    /// Read both streams to EOF. Absent streams count as already closed.
    ///
    /// A read error closes that stream only; the other keeps being read and
    /// the first error is returned at the end.
    pub async fn run<O, E>(
        self,
        stdout: Option<O>,
        stderr: Option<E>,
        encoding: &'static Encoding,
    ) -> io::Result<()>
    where
        O: AsyncRead + Unpin,
        E: AsyncRead + Unpin,
    {
        let mut stdout = stdout;
        let mut stderr = stderr;
        let mut stdout_open = stdout.is_some();
        let mut stderr_open = stderr.is_some();
        let mut stdout_chunks = ChunkSplitter::new(encoding);
        let mut stderr_chunks = ChunkSplitter::new(encoding);
        let mut stdout_buf = vec![0u8; READ_BUFFER_SIZE];
        let mut stderr_buf = vec![0u8; READ_BUFFER_SIZE];
        let mut first_error = None;

        while stdout_open || stderr_open {
            tokio::select! {
                result = read_some(&mut stdout, &mut stdout_buf), if stdout_open => {
                    match result {
                        Ok(0) => {
                            stdout_open = false;
                            self.forward_all(stdout_chunks.finish());
                        }
                        Ok(n) => self.forward_all(stdout_chunks.feed(&stdout_buf[..n])),
                        Err(err) => {
                            tracing::warn!(error = %err, "stdout read failed");
                            stdout_open = false;
                            self.forward_all(stdout_chunks.finish());
                            first_error.get_or_insert(err);
                        }
                    }
                }
                result = read_some(&mut stderr, &mut stderr_buf), if stderr_open => {
                    match result {
                        Ok(0) => {
                            stderr_open = false;
                            self.forward_all(stderr_chunks.finish());
                        }
                        Ok(n) => self.forward_all(stderr_chunks.feed(&stderr_buf[..n])),
                        Err(err) => {
                            tracing::warn!(error = %err, "stderr read failed");
                            stderr_open = false;
                            self.forward_all(stderr_chunks.finish());
                            first_error.get_or_insert(err);
                        }
                    }
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn forward_all(&self, chunks: Vec<String>) {
        for chunk in chunks {
            self.forward(&chunk);
        }
    }

    fn forward(&self, chunk: &str) {
        let event = classify(chunk);
        match event.kind {
            OutputKind::Progress => {
                self.owner.post(SessionMessage::Progress(event.text));
            }
            OutputKind::Line => {
                self.transcript.append(event.text.clone());
                self.owner.post(SessionMessage::Line(event.text));
            }
        }
    }
}

async fn read_some<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => Ok(0),
    }
}
