//! Line transport contract.
//!
//! The reader never opens or configures the serial link. It is handed
//! something implementing [`LineTransport`]: either a custom implementation
//! or a [`StreamTransport`] wrapped around an already-opened port.

use std::io::{self, ErrorKind, Read, Write};

use skstack_protocol::LineCodec;

/// Size of the read chunk used by [`StreamTransport`].
const READ_CHUNK: usize = 256;

/// A duplex, line-oriented channel to the modem.
pub trait LineTransport {
    /// Write bytes to the modem.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read one line, waiting at most the transport's per-call timeout.
    ///
    /// Returns the line without its terminator, or `None` if the wait expired.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

impl<T: LineTransport + ?Sized> LineTransport for &mut T {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        (**self).read_line()
    }
}

impl<T: LineTransport + ?Sized> LineTransport for Box<T> {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        (**self).read_line()
    }
}

/// Adapts any byte stream with a read timeout into a [`LineTransport`].
///
/// A read that times out (`TimedOut` / `WouldBlock`) or returns zero bytes
/// is reported as an expired wait. Partial lines stay buffered for the next
/// call.
///
/// ```rust,ignore
/// let port = serialport::new("/dev/ttyUSB0", 115_200)
///     .timeout(Duration::from_secs(1))
///     .open()?;
/// let transport = StreamTransport::new(port);
/// ```
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
    codec: LineCodec,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap an opened stream.
    pub fn new(stream: S) -> Self {
        StreamTransport {
            stream,
            codec: LineCodec::new(),
        }
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the underlying stream, dropping any buffered input.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> LineTransport for StreamTransport<S> {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)?;
        self.stream.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(line) = self.codec.decode_line() {
                return Ok(Some(line));
            }

            match self.stream.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(n) => self.codec.push(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(None)
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Stream returning one queued chunk per read, then timing out.
    #[derive(Default)]
    struct ChunkedStream {
        chunks: VecDeque<io::Result<Vec<u8>>>,
        written: Vec<u8>,
    }

    impl Read for ChunkedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(io::Error::new(ErrorKind::TimedOut, "timed out")),
            }
        }
    }

    impl Write for ChunkedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stream_transport_lines() {
        let mut stream = ChunkedStream::default();
        stream.chunks.push_back(Ok(b"EVER 1.2".to_vec()));
        stream.chunks.push_back(Ok(b".10\r\nOK\r\n".to_vec()));

        let mut transport = StreamTransport::new(stream);
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("EVER 1.2.10"));
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("OK"));
        assert_eq!(transport.read_line().unwrap(), None);
    }

    #[test]
    fn test_stream_transport_partial_line_survives_timeout() {
        let mut stream = ChunkedStream::default();
        stream.chunks.push_back(Ok(b"EVENT 2".to_vec()));
        stream
            .chunks
            .push_back(Err(io::Error::new(ErrorKind::TimedOut, "timed out")));
        stream.chunks.push_back(Ok(b"5 FE80::1\r\n".to_vec()));

        let mut transport = StreamTransport::new(stream);
        assert_eq!(transport.read_line().unwrap(), None);
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("EVENT 25 FE80::1"));
    }

    #[test]
    fn test_stream_transport_retries_interrupted() {
        let mut stream = ChunkedStream::default();
        stream
            .chunks
            .push_back(Err(io::Error::new(ErrorKind::Interrupted, "signal")));
        stream.chunks.push_back(Ok(b"OK\r\n".to_vec()));

        let mut transport = StreamTransport::new(stream);
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("OK"));
    }

    #[test]
    fn test_stream_transport_propagates_errors() {
        let mut stream = ChunkedStream::default();
        stream
            .chunks
            .push_back(Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged")));

        let mut transport = StreamTransport::new(stream);
        let err = transport.read_line().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_stream_transport_write() {
        let mut transport = StreamTransport::new(ChunkedStream::default());
        transport.write_all(b"SKVER\r\n").unwrap();
        assert_eq!(transport.get_ref().written, b"SKVER\r\n");
    }
}
