use std::sync::Arc;

use msgs::client_server_msg::ClientServerMsg;
use msgs::config;
use msgs::philosopher::Philosopher;
use msgs::server_client_msg::ServerClientMsg;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::logs::Logs;
use crate::table::Table;

/// Accepts connections until the shutdown signal fires, spawning one
/// client process per connection. Session ids are handed out in accept
/// order and key the per-client log files.
pub async fn accept_loop(
    listener: TcpListener,
    table: Arc<Table>,
    logs: Logs,
    shutdown: broadcast::Sender<()>,
) {
    let mut session_id_counter: u32 = 1;
    let mut shutdown_rx = shutdown.subscribe();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                break;
            }
            result = listener.accept() => {
                let (socket, addr) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        println!("error while accepting a connection: {e}");
                        continue;
                    }
                };

                let session_id = session_id_counter;
                session_id_counter += 1;

                println!("accepted client: {session_id} {addr}");
                println!("follow this client with: tail -f {}", crate::logs::client_log_path(session_id).display());

                spawn_client_process(socket, Arc::clone(&table), logs.clone(), shutdown.subscribe(), session_id);
            }
        }
    }
}

/// One task per connected client: reads framed requests off the socket,
/// routes them to the table and writes back whatever response the table
/// produced. A read error or EOF ends only this task; the rest of the
/// table keeps running.
pub fn spawn_client_process(
    mut socket: TcpStream,
    table: Arc<Table>,
    logs: Logs,
    mut shutdown: broadcast::Receiver<()>,
    session_id: u32,
) {
    tokio::spawn(async move {
        let mut static_buffer = [0; 1024];
        let mut input_buffer = Vec::new();

        logs.client(session_id, "Server process opened for the client");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    break;
                }
                result = socket.read(&mut static_buffer) => {
                    let len = match result {
                        Ok(len) => len,
                        Err(e) => {
                            logs.client(session_id, format!("Error while reading from the socket: {e}"));
                            break;
                        }
                    };
                    if len == 0 {
                        logs.client(session_id, "The client closed the connection");
                        println!("client disconnected: {session_id}");
                        break;
                    }
                    input_buffer.extend(&static_buffer[..len]);

                    while let Some(decode_result) = ClientServerMsg::dequeue_and_decode(&mut input_buffer) {
                        let msg = match decode_result {
                            Ok(msg) => msg,
                            Err(e) => {
                                logs.client(session_id, format!("Error while decoding a request: {e}"));
                                return;
                            }
                        };

                        let response = match msg {
                            ClientServerMsg::Create => {
                                handle_create(&table, &logs, session_id).await
                            }
                            ClientServerMsg::Update(philosopher) => {
                                handle_update(&table, philosopher, session_id).await
                            }
                        };

                        if let Some(response) = response {
                            let mut output_buffer = Vec::new();
                            response.pack(&mut output_buffer);
                            if let Err(e) = socket.write_all(&output_buffer).await {
                                logs.client(session_id, format!("Error while writing a response: {e}"));
                                return;
                            }
                        }
                    }
                }
            }
        }
    });
}

/// Admission goes through the capacity check here; the table itself
/// assumes a seat is available.
async fn handle_create(table: &Table, logs: &Logs, session_id: u32) -> Option<ServerClientMsg> {
    if table.number_philosophers() >= config::MAX_PHILOSOPHERS {
        logs.server(format!(
            "Admission refused for client {session_id}: the table is full"
        ));
        logs.client(session_id, "The table is full, no seat left");
        return None;
    }

    let created = table.admit().await;
    logs.client(session_id, "Philosopher connected and seated at the table!");
    Some(ServerClientMsg::Created(created))
}

async fn handle_update(
    table: &Table,
    philosopher: Philosopher,
    session_id: u32,
) -> Option<ServerClientMsg> {
    table
        .transition(philosopher, session_id)
        .await
        .map(ServerClientMsg::Updated)
}
