use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use msgs::client_server_msg::ClientServerMsg;
use msgs::philosopher::{Philosopher, PhilosopherState};
use msgs::server_client_msg::ServerClientMsg;
use server::client::accept_loop;
use server::logs::{LogRecord, Logs};
use server::table::Table;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;

struct TestServer {
    addr: SocketAddr,
    _records: mpsc::Receiver<LogRecord>,
    _shutdown: broadcast::Sender<()>,
}

async fn start_server() -> anyhow::Result<TestServer> {
    let (logs, records) = Logs::channel();
    let table = Arc::new(Table::new(logs.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    tokio::spawn(accept_loop(listener, table, logs, shutdown_tx.clone()));

    Ok(TestServer {
        addr,
        _records: records,
        _shutdown: shutdown_tx,
    })
}

struct TestClient {
    stream: TcpStream,
    input_buffer: Vec<u8>,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> anyhow::Result<TestClient> {
        Ok(TestClient {
            stream: TcpStream::connect(addr).await?,
            input_buffer: Vec::new(),
        })
    }

    async fn send(&mut self, msg: ClientServerMsg) -> anyhow::Result<()> {
        let mut output_buffer = Vec::new();
        msg.pack(&mut output_buffer);
        self.stream.write_all(&output_buffer).await?;
        Ok(())
    }

    async fn receive(&mut self) -> anyhow::Result<ServerClientMsg> {
        let mut static_buffer = [0; 1024];
        loop {
            if let Some(result) = ServerClientMsg::dequeue_and_decode(&mut self.input_buffer) {
                return result;
            }
            let len = self.stream.read(&mut static_buffer).await?;
            anyhow::ensure!(len > 0, "server closed the connection");
            self.input_buffer.extend(&static_buffer[..len]);
        }
    }

    async fn create(&mut self) -> anyhow::Result<Philosopher> {
        self.send(ClientServerMsg::Create).await?;
        match self.receive().await? {
            ServerClientMsg::Created(philosopher) => Ok(philosopher),
            other => anyhow::bail!("expected a Created response, got: {other:?}"),
        }
    }
}

fn hungry(id: u32) -> ClientServerMsg {
    ClientServerMsg::Update(Philosopher {
        id,
        state: PhilosopherState::Hungry,
        state_timer: 0,
    })
}

fn thinking(id: u32) -> ClientServerMsg {
    ClientServerMsg::Update(Philosopher {
        id,
        state: PhilosopherState::Thinking,
        state_timer: 5,
    })
}

#[tokio::test]
async fn two_philosophers_join_and_the_first_one_eats() -> anyhow::Result<()> {
    let server = start_server().await?;

    let mut first = TestClient::connect(server.addr).await?;
    let mut second = TestClient::connect(server.addr).await?;

    assert_eq!(first.create().await?.id, 1);
    assert_eq!(second.create().await?.id, 2);

    first.send(hungry(1)).await?;
    let response = timeout(Duration::from_secs(1), first.receive()).await??;
    match response {
        ServerClientMsg::Updated(granted) => {
            assert_eq!(granted.id, 1);
            assert_eq!(granted.state, PhilosopherState::Eating);
            assert_eq!(granted.state_timer, 0);
        }
        other => anyhow::bail!("expected an Updated response, got: {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn thinking_yields_no_response() -> anyhow::Result<()> {
    let server = start_server().await?;

    let mut first = TestClient::connect(server.addr).await?;
    let mut second = TestClient::connect(server.addr).await?;
    first.create().await?;
    second.create().await?;

    first.send(hungry(1)).await?;
    timeout(Duration::from_secs(1), first.receive()).await??;

    // Thinking is acknowledged by silence; the next frame on the socket
    // must be the grant for the follow-up hungry request.
    first.send(thinking(1)).await?;
    first.send(hungry(1)).await?;

    let response = timeout(Duration::from_secs(1), first.receive()).await??;
    assert!(matches!(
        response,
        ServerClientMsg::Updated(granted) if granted.state == PhilosopherState::Eating
    ));

    Ok(())
}

#[tokio::test]
async fn neighbours_share_a_chopstick_over_the_wire() -> anyhow::Result<()> {
    let server = start_server().await?;

    let mut first = TestClient::connect(server.addr).await?;
    let mut second = TestClient::connect(server.addr).await?;
    first.create().await?;
    second.create().await?;

    first.send(hungry(1)).await?;
    timeout(Duration::from_secs(1), first.receive()).await??;

    // While philosopher 1 eats, philosopher 2's request stays pending.
    second.send(hungry(2)).await?;
    assert!(timeout(Duration::from_millis(200), second.receive())
        .await
        .is_err());

    first.send(thinking(1)).await?;

    let response = timeout(Duration::from_secs(1), second.receive()).await??;
    assert!(matches!(
        response,
        ServerClientMsg::Updated(granted) if granted.id == 2 && granted.state == PhilosopherState::Eating
    ));

    Ok(())
}
