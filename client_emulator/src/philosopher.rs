use std::time::Duration;

use anyhow::bail;
use msgs::client_server_msg::ClientServerMsg;
use msgs::config;
use msgs::philosopher::{Philosopher, PhilosopherState};
use msgs::server_client_msg::ServerClientMsg;
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub fn random_state_time() -> i32 {
    rand::rng().random_range(config::MIN_STATE_TIME..=config::MAX_STATE_TIME)
}

/// One simulated philosopher: its own connection to the server and its own
/// thinking/hungry/eating cycle.
pub struct ClientPhilosopher {
    philosopher: Philosopher,
    connection: Connection,
}

impl ClientPhilosopher {
    /// Connects, asks for a seat and adopts the id the server assigned.
    pub async fn connect() -> anyhow::Result<ClientPhilosopher> {
        let mut connection = Connection::open().await?;
        connection.send(&ClientServerMsg::Create).await?;

        let response = connection.receive().await?;
        let ServerClientMsg::Created(mut philosopher) = response else {
            bail!("expected a Created response, got: {response:?}");
        };

        philosopher.state = PhilosopherState::Thinking;
        philosopher.state_timer = random_state_time();

        Ok(ClientPhilosopher {
            philosopher,
            connection,
        })
    }

    pub fn id(&self) -> u32 {
        self.philosopher.id
    }

    /// Runs the cycle until the connection drops: count the timer down,
    /// flip states when it runs out, and report every tick to the server.
    /// A hungry philosopher stays put until the server grants the meal.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            self.philosopher.state_timer -= 1;

            if self.philosopher.state_timer <= 0 {
                match self.philosopher.state {
                    PhilosopherState::Thinking => {
                        self.philosopher.state = PhilosopherState::Hungry;
                    }
                    PhilosopherState::Eating => {
                        self.philosopher.state = PhilosopherState::Thinking;
                        self.philosopher.state_timer = random_state_time();
                    }
                    PhilosopherState::Hungry => {}
                }
            }

            self.connection
                .send(&ClientServerMsg::Update(self.philosopher))
                .await?;

            if self.philosopher.state == PhilosopherState::Hungry {
                let response = self.connection.receive().await?;
                let ServerClientMsg::Updated(granted) = response else {
                    bail!("expected an Updated response, got: {response:?}");
                };

                self.philosopher.state = granted.state;
                self.philosopher.state_timer = random_state_time();
            }
        }
    }
}

struct Connection {
    stream: TcpStream,
    static_buffer: [u8; 1024],
    input_buffer: Vec<u8>,
}

impl Connection {
    async fn open() -> anyhow::Result<Connection> {
        let stream = TcpStream::connect(("localhost", config::SERVER_PORT)).await?;
        Ok(Connection {
            stream,
            static_buffer: [0; 1024],
            input_buffer: Vec::new(),
        })
    }

    async fn send(&mut self, msg: &ClientServerMsg) -> anyhow::Result<()> {
        let mut output_buffer = Vec::new();
        msg.pack(&mut output_buffer);
        self.stream.write_all(&output_buffer).await?;
        Ok(())
    }

    async fn receive(&mut self) -> anyhow::Result<ServerClientMsg> {
        loop {
            if let Some(decode_result) = ServerClientMsg::dequeue_and_decode(&mut self.input_buffer) {
                return decode_result;
            }

            let len = self.stream.read(&mut self.static_buffer).await?;
            if len == 0 {
                bail!("server closed the connection");
            }
            self.input_buffer.extend(&self.static_buffer[..len]);
        }
    }
}
