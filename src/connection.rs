use std::sync::Arc;

use bytes::BytesMut;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpStream, tcp::OwnedWriteHalf},
    sync::Mutex,
};
use tracing::{debug, info, warn};

use crate::{
    commands::dispatch_command,
    input::{CommandReadError, read_and_parse_resp},
    key_value_store::KeyValueStore,
    state::State,
};

/// Bytes buffered ahead of the command being dispatched. Past this the socket
/// is no longer read until the command completes.
const MAX_READ_AHEAD: usize = 64 * 1024;

/// Serves one client until it disconnects.
///
/// Frames are processed strictly in arrival order and each reply is written
/// before the next frame is dispatched, so a blocked command holds back the
/// rest of that client's pipeline. The socket keeps being read while a
/// command runs: end of stream releases a blocked command of this client, the
/// replies to frames already parsed are still written, and the connection
/// ends. Whatever the client left behind (an open transaction, watches,
/// blocked waiters) is dropped on exit.
pub async fn handle_client_connection(
    stream: TcpStream,
    client_address: String,
    store: Arc<Mutex<KeyValueStore>>,
    state: Arc<Mutex<State>>,
) {
    info!(client = %client_address, "client connected");

    let mut buffer = BytesMut::with_capacity(4096);
    let (mut reader, mut writer) = stream.into_split();
    let disconnect = state.lock().await.connect_client(&client_address);
    let mut peer_closed = false;

    'connection: loop {
        let parsed_input = match read_and_parse_resp(&mut reader, &mut buffer).await {
            Ok(frames) => frames,
            Err(CommandReadError::ConnectionClosed) => break,
            Err(CommandReadError::IoError(e)) => {
                warn!(client = %client_address, error = %e, "failed to read from client");
                break;
            }
            Err(e) => {
                warn!(client = %client_address, error = %e, "protocol error");

                if let Err(e) = write_to_stream(&mut writer, e.as_string().as_bytes()).await {
                    warn!(client = %client_address, error = %e, "error writing to stream");
                    break;
                }

                continue;
            }
        };

        for input in parsed_input {
            let dispatch = dispatch_command(
                input,
                &client_address,
                Arc::clone(&store),
                Arc::clone(&state),
            );
            tokio::pin!(dispatch);

            let response = loop {
                tokio::select! {
                    response = &mut dispatch => break response,
                    read = reader.read_buf(&mut buffer),
                        if !peer_closed && buffer.len() < MAX_READ_AHEAD =>
                    {
                        match read {
                            Ok(0) => peer_closed = true,
                            Ok(_) => {}
                            Err(e) => {
                                warn!(
                                    client = %client_address,
                                    error = %e,
                                    "failed to read from client"
                                );
                                peer_closed = true;
                            }
                        }

                        if peer_closed {
                            debug!(
                                client = %client_address,
                                "peer closed while a command was running"
                            );
                            let _ = disconnect.send(true);
                        }
                    }
                }
            };

            debug!(client = %client_address, response = ?response, "sending response");

            if let Err(e) = write_to_stream(&mut writer, response.encode().as_bytes()).await {
                warn!(client = %client_address, error = %e, "error writing to stream");
                break 'connection;
            }
        }

        if peer_closed {
            break;
        }
    }

    state.lock().await.remove_client(&client_address);

    info!(client = %client_address, "client disconnected");
}

async fn write_to_stream(writer: &mut OwnedWriteHalf, response: &[u8]) -> tokio::io::Result<()> {
    writer.write_all(response).await?;
    writer.flush().await
}
