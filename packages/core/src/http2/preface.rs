//! The HTTP/2 connection preface (spec.md §6 "HTTP/2 connection preface").

use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const CLIENT_CONNECTION_PREFACE: &[u8; 24] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// Writes the 24-byte client preface, mandatory before any frame.
pub async fn write_preface<S: AsyncWriteExt + Unpin>(stream: &mut S) -> std::io::Result<()> {
    stream.write_all(CLIENT_CONNECTION_PREFACE).await
}

/// Reads exactly 24 bytes and requires they match the preface exactly
/// (spec.md §4.5 "Server upgrade": "read the client preface; require it
/// exactly").
pub async fn read_preface<S: AsyncReadExt + Unpin>(stream: &mut S) -> Result<(), crate::error::Http2Error> {
    let mut buf = [0u8; 24];
    stream.read_exact(&mut buf).await.map_err(|_| crate::error::Http2Error::ProtocolError)?;
    if &buf != CLIENT_CONNECTION_PREFACE {
        return Err(crate::error::Http2Error::ProtocolError);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preface_round_trips_over_an_in_memory_duplex() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_preface(&mut client).await.unwrap();
        read_preface(&mut server).await.unwrap();
    }

    #[tokio::test]
    async fn mismatched_preface_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"GET / HTTP/1.1\r\n\r\nxxxxxxxx").await.unwrap();
        assert!(read_preface(&mut server).await.is_err());
    }
}
