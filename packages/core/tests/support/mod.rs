//! Reusable loopback fixtures for integration tests (SPEC_FULL.md §11,
//! grounded on `original_source/test/include/echo_stream.hpp` and
//! `joined_stream.hpp`).

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

/// A stream that buffers writes and echoes them back on reads, the way
/// `nexus::test::echo_stream` loops a connection back on itself without a
/// real socket.
#[must_use]
pub fn echo_stream(buffer_size: usize) -> DuplexStream {
    let (mut inner, outer) = tokio::io::duplex(buffer_size);
    tokio::spawn(async move {
        let mut buf = vec![0u8; buffer_size.max(1)];
        loop {
            match inner.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if inner.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
    outer
}

/// Combines a separate read half and write half into one `AsyncRead +
/// AsyncWrite`, the way `nexus::test::joined_stream` joins a `ReadStream`
/// and a `WriteStream`. `tokio::io::join` already does exactly this.
pub use tokio::io::join as joined_stream;
