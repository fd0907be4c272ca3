pub mod chopstick;
pub mod client;
pub mod logs;
pub mod seat;
pub mod table;
