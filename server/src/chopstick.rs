use std::sync::Arc;

use tokio::sync::Mutex;

/// A chopstick lives at arena index `id - 1` for the whole process
/// lifetime. The usage mutex is the binary lock the two ring-adjacent
/// philosophers contend for; the `Arc` lets a waiter hold a handle to it
/// without pinning the arena.
#[derive(Clone)]
pub struct Chopstick {
    pub id: u32,
    pub usage: Arc<Mutex<()>>,
}

impl Chopstick {
    pub fn new(id: u32) -> Chopstick {
        Chopstick {
            id,
            usage: Arc::new(Mutex::new(())),
        }
    }
}
