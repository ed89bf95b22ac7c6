//! HTTP/2-over-TCP connection negotiation (spec.md §4.5). Grounded on
//! `original_source/include/nexus/http2/client_connection.hpp`'s `upgrade`
//! (h2c client) and `include/http2/server_connection.hpp`'s server-side
//! counterpart; the HTTP/1.1 request/response lines are hand-serialized
//! here since this crate doesn't carry a full HTTP/1.1 client stack, only
//! the minimal exchange the upgrade handshake needs.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::preface::{read_preface, write_preface, CLIENT_CONNECTION_PREFACE};
use crate::codec::settings::{encode_payload, SettingValues};
use crate::codec::{base64url, frame_header::FrameHeader, Decode, Encode};
use crate::error::Http2Error;

const SETTINGS_FRAME_TYPE: u8 = 0x4;

/// `copy_changes` against the protocol defaults (spec.md S4): only the
/// parameters `values` overrides are carried, not the full registry.
fn settings_frame(values: &SettingValues) -> Vec<u8> {
    let changes = SettingValues::changes_from(&SettingValues::default(), values);
    let mut payload = Vec::new();
    encode_payload(&changes, &mut payload);
    let header = FrameHeader::new(payload.len() as u32, SETTINGS_FRAME_TYPE, 0, 0).expect("fits in 24 bits");
    let mut frame = Vec::new();
    header.encode(&mut frame);
    frame.extend_from_slice(&payload);
    frame
}

/// Client-side h2c upgrade (spec.md §4.5 "Client upgrade (h2c)"):
/// base64url-encodes the `copy_changes`-against-defaults `SETTINGS` payload
/// into an `HTTP2-Settings` header, sends a plain `GET` with the
/// `Upgrade: h2c` dance, requires a `101`, then writes the preface and an
/// initial `SETTINGS` frame.
pub async fn client_upgrade<S>(
    stream: &mut S,
    host: &str,
    target: &str,
    settings: &SettingValues,
) -> Result<(), Http2Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let changes = SettingValues::changes_from(&SettingValues::default(), settings);
    let mut payload = Vec::new();
    encode_payload(&changes, &mut payload);
    let encoded_settings = base64url::encode(&payload);

    let request = format!(
        "GET {target} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Connection: HTTP2-Settings, Upgrade\r\n\
         Upgrade: h2c\r\n\
         HTTP2-Settings: {encoded_settings}\r\n\
         \r\n"
    );
    stream.write_all(request.as_bytes()).await.map_err(|_| Http2Error::InternalError)?;

    let status_line = read_status_line(stream).await?;
    if !status_line.contains(" 101 ") {
        return Err(Http2Error::Http1_1Required);
    }

    // 101 Switching Protocols counts as a settings ack.
    write_preface(stream).await.map_err(|_| Http2Error::InternalError)?;
    stream.write_all(&settings_frame(settings)).await.map_err(|_| Http2Error::InternalError)?;
    Ok(())
}

/// Server-side h2c upgrade (spec.md §4.5 "Server upgrade"): responds `101`,
/// applies the peer's decoded settings, then requires the client preface
/// and its `SETTINGS` frame before sending the server's own `SETTINGS`.
pub async fn server_upgrade<S>(
    stream: &mut S,
    peer_settings_header: &str,
    settings: &SettingValues,
) -> Result<SettingValues, Http2Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let decoded = base64url::decode(peer_settings_header).map_err(|_| Http2Error::ProtocolError)?;
    let entries = crate::codec::settings::decode_payload(&decoded).map_err(|_| Http2Error::ProtocolError)?;
    let mut peer = SettingValues::default();
    for entry in entries {
        peer.apply(entry);
    }

    let response = "HTTP/1.1 101 Switching Protocols\r\nConnection: Upgrade\r\nUpgrade: h2c\r\n\r\n";
    stream.write_all(response.as_bytes()).await.map_err(|_| Http2Error::InternalError)?;

    read_preface(stream).await?;
    read_client_settings_frame(stream).await?;
    stream.write_all(&settings_frame(settings)).await.map_err(|_| Http2Error::InternalError)?;
    Ok(peer)
}

/// Prior-knowledge accept (spec.md §4.5): no upgrade dance, just preface +
/// `SETTINGS`.
pub async fn prior_knowledge_accept<S>(stream: &mut S, settings: &SettingValues) -> Result<(), Http2Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    read_preface(stream).await?;
    stream.write_all(&settings_frame(settings)).await.map_err(|_| Http2Error::InternalError)?;
    Ok(())
}

async fn read_status_line<S: AsyncRead + Unpin>(stream: &mut S) -> Result<String, Http2Error> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    tokio::io::AsyncBufReadExt::read_line(&mut reader, &mut line)
        .await
        .map_err(|_| Http2Error::InternalError)?;
    // Drain the remaining header lines up to the blank line terminator.
    loop {
        let mut next = String::new();
        let n = tokio::io::AsyncBufReadExt::read_line(&mut reader, &mut next)
            .await
            .map_err(|_| Http2Error::InternalError)?;
        if n == 0 || next == "\r\n" || next == "\n" {
            break;
        }
    }
    Ok(line)
}

async fn read_client_settings_frame<S: AsyncRead + Unpin>(stream: &mut S) -> Result<(), Http2Error> {
    let mut header_bytes = [0u8; 9];
    stream.read_exact(&mut header_bytes).await.map_err(|_| Http2Error::ProtocolError)?;
    let FrameHeader { length, frame_type, .. } =
        FrameHeader::decode(&mut &header_bytes[..]).map_err(|_| Http2Error::ProtocolError)?;
    if frame_type != SETTINGS_FRAME_TYPE {
        return Err(Http2Error::ProtocolError);
    }
    let mut payload = vec![0u8; length as usize];
    stream.read_exact(&mut payload).await.map_err(|_| Http2Error::ProtocolError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_upgrade_then_server_upgrade_agree_on_settings() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let client_settings = SettingValues::default();
        let server_settings = SettingValues::default();

        let client_task = tokio::spawn(async move {
            client_upgrade(&mut client, "example.com", "/", &client_settings).await.unwrap();
        });

        let mut line = String::new();
        {
            let mut reader = BufReader::new(&mut server);
            loop {
                let mut next = String::new();
                tokio::io::AsyncBufReadExt::read_line(&mut reader, &mut next).await.unwrap();
                if next.starts_with("HTTP2-Settings:") {
                    line = next.trim_start_matches("HTTP2-Settings:").trim().to_string();
                }
                if next == "\r\n" || next.is_empty() {
                    break;
                }
            }
        }

        server_upgrade(&mut server, &line, &server_settings).await.unwrap();
        client_task.await.unwrap();
    }

    #[test]
    fn s4_http2_settings_header_carries_only_the_changed_parameter() {
        let mut settings = SettingValues::default();
        settings.max_concurrent_streams = 4;
        let changes = SettingValues::changes_from(&SettingValues::default(), &settings);
        let mut payload = Vec::new();
        encode_payload(&changes, &mut payload);
        assert_eq!(base64url::encode(&payload), "AAMAAAAE");
    }

    #[test]
    fn s4_settings_frame_is_empty_when_values_match_defaults() {
        let frame = settings_frame(&SettingValues::default());
        assert_eq!(frame, [0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[tokio::test]
    async fn prior_knowledge_accept_requires_exact_preface() {
        let (mut client, mut server) = tokio::io::duplex(256);
        let settings = SettingValues::default();
        let server_task = tokio::spawn(async move { prior_knowledge_accept(&mut server, &settings).await });
        client.write_all(CLIENT_CONNECTION_PREFACE).await.unwrap();
        assert!(server_task.await.unwrap().is_ok());
    }
}
