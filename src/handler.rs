//! Client session handler
//!
//! Handles one accepted connection: username prompt, then two relay tasks
//! (socket -> log and log -> socket) until either side of the connection
//! fails or ends.

use std::sync::Arc;

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
};
use tracing::{debug, info, warn};

use crate::admission::Permit;
use crate::client::ClientState;
use crate::error::AppError;
use crate::history::MessageLog;
use crate::message::{Message, USERNAME_PROMPT};
use crate::types::SessionId;

/// Handle an accepted connection
///
/// Sends the username prompt, runs the inbound and outbound relays as
/// separate tasks and waits for both to stop. The stream is shut down once
/// both relays have returned their halves, then the permit is released.
pub async fn handle_connection<S>(
    stream: S,
    session_id: SessionId,
    log: Arc<MessageLog>,
    permit: Permit,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (reader, mut writer) = tokio::io::split(stream);

    writer.write_all(USERNAME_PROMPT.as_bytes()).await?;
    writer.flush().await?;

    let state = Arc::new(ClientState::new());

    // Spawn read task (socket -> log)
    let inbound = tokio::spawn(inbound_relay(
        session_id,
        reader,
        Arc::clone(&state),
        Arc::clone(&log),
    ));

    // Spawn write task (log -> socket)
    let outbound = tokio::spawn(outbound_relay(session_id, writer, Arc::clone(&state), log));

    let (inbound, outbound) = tokio::join!(inbound, outbound);

    match (inbound, outbound) {
        (Ok(reader), Ok(writer)) => {
            // Both relays mark the session closed before returning.
            debug_assert!(!state.is_live());
            let mut stream = reader.unsplit(writer);
            if let Err(e) = stream.shutdown().await {
                debug!("Shutdown of {} failed: {}", session_id, e);
            }
        }
        // A panicked relay has already dropped its half, which closes the stream.
        (inbound, outbound) => {
            warn!(
                "Relay task for {} did not finish cleanly (inbound ok: {}, outbound ok: {})",
                session_id,
                inbound.is_ok(),
                outbound.is_ok()
            );
        }
    }

    drop(permit);

    match state.username() {
        Some(name) => info!("Client {} ({}) disconnected", session_id, name),
        None => info!("Client {} disconnected before choosing a username", session_id),
    }

    Ok(())
}

/// Inbound relay: read lines from the client into the log
///
/// The first line is the username; every later line becomes a `Message`.
/// Runs until end of stream, a read error, or the session closing.
async fn inbound_relay<S>(
    session_id: SessionId,
    reader: ReadHalf<S>,
    state: Arc<ClientState>,
    log: Arc<MessageLog>,
) -> ReadHalf<S>
where
    S: AsyncRead + AsyncWrite,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = state.closed() => {
                debug!("Session {} closed, ending read task", session_id);
                break;
            }
        };

        match line {
            Ok(Some(line)) => match state.username() {
                Some(author) => {
                    let len = log.append(Message::new(&*author, line));
                    debug!("Client {} posted message #{}", session_id, len);
                }
                None => {
                    info!("Client {} set username to '{}'", session_id, line);
                    state.set_username(line);
                }
            },
            Ok(None) => {
                debug!("Client {} closed its stream", session_id);
                break;
            }
            Err(e) => {
                warn!("Read error for {}: {}", session_id, e);
                break;
            }
        }
    }

    state.mark_closed();
    debug!("Read task ended for {}", session_id);
    lines.into_inner().into_inner()
}

/// Outbound relay: write other authors' messages to the client
///
/// Waits for the username, then walks the log from the beginning with a
/// private cursor, skipping the session's own messages, and sleeps on the
/// log's length watcher between batches.
async fn outbound_relay<S>(
    session_id: SessionId,
    mut writer: WriteHalf<S>,
    state: Arc<ClientState>,
    log: Arc<MessageLog>,
) -> WriteHalf<S>
where
    S: AsyncRead + AsyncWrite,
{
    if let Some(username) = state.wait_username().await {
        // A write blocked on a peer that stopped reading is abandoned once the
        // session closes.
        tokio::select! {
            result = relay_messages(&mut writer, &username, &log) => {
                if let Err(e) = result {
                    warn!("Write error for {}: {}", session_id, e);
                }
            }
            _ = state.closed() => {
                debug!("Session {} closed, ending write task", session_id);
            }
        }
    }

    state.mark_closed();
    debug!("Write task ended for {}", session_id);
    writer
}

async fn relay_messages<W>(
    writer: &mut W,
    username: &str,
    log: &MessageLog,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // Subscribe before the first read so no append can slip between the two.
    let mut len_rx = log.subscribe();
    let mut cursor = 0;

    loop {
        len_rx.borrow_and_update();

        let pending = log.since(cursor);
        let mut written = false;
        for message in &pending {
            cursor += 1;
            if message.is_authored_by(username) {
                continue;
            }
            writer.write_all(message.render().as_bytes()).await?;
            written = true;
        }
        if written {
            writer.flush().await?;
        }

        if len_rx.changed().await.is_err() {
            return Ok(());
        }
    }
}
