pub mod client_server_msg;
pub mod config;
pub mod dequeue;
pub mod philosopher;
pub mod server_client_msg;
