/// Minimum number of philosophers required before the table can operate.
/// Below two there is no ring and nobody has a right chopstick.
pub const MIN_PHILOSOPHERS: usize = 2;

/// Upper bound on philosophers; sizes every registry on the server.
pub const MAX_PHILOSOPHERS: usize = 7;

/// Shortest time spent thinking or eating, in seconds.
pub const MIN_STATE_TIME: i32 = 5;

/// Longest time spent thinking or eating, in seconds.
pub const MAX_STATE_TIME: i32 = 10;

/// TCP port the coordination server listens on.
pub const SERVER_PORT: u16 = 1302;
