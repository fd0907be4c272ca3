use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use local_ip_address::local_ip;
use msgs::config;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use server::client::accept_loop;
use server::logs::{self, Logs};
use server::table::Table;

#[tokio::main]
async fn main() {
    let port = config::SERVER_PORT;
    let my_local_ip = local_ip().unwrap();

    std::fs::create_dir_all(logs::LOGS_DIR).unwrap();

    let (logs, records) = Logs::channel();
    let writer = logs::spawn_log_writer(records);

    let addr = &SocketAddr::new(IpAddr::from(Ipv4Addr::UNSPECIFIED), port);
    let listener = TcpListener::bind(addr).await.unwrap();

    println!("Server started at ip: {my_local_ip}:{port}");
    println!(
        "Follow the table activity with: tail -f {}",
        logs::server_log_path().display()
    );

    let table = Arc::new(Table::new(logs.clone()));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&table), logs.clone(), shutdown_tx.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Shutting down...");
            let _ = shutdown_tx.send(());
        }
    }

    // The writer drains and exits once every Logs clone is gone. A task
    // parked in a chopstick wait never observes the shutdown signal, so
    // don't wait on it forever.
    drop(logs);
    drop(table);
    let _ = tokio::time::timeout(Duration::from_secs(1), writer).await;

    println!("Server stopped");
}
