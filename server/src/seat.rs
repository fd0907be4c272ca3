use msgs::philosopher::Philosopher;
use tokio::sync::{OwnedMutexGuard, OwnedSemaphorePermit};

/// A philosopher's seat at the table: the last reported snapshot plus the
/// arena indices of the chopsticks on either side. The first philosopher
/// has no right chopstick until a second one closes the ring.
pub struct Seat {
    pub philosopher: Philosopher,
    pub left_chopstick: usize,
    pub right_chopstick: Option<usize>,
    pub grant: Option<Grant>,
}

impl Seat {
    pub fn new(philosopher: Philosopher, left_chopstick: usize) -> Seat {
        Seat {
            philosopher,
            left_chopstick,
            right_chopstick: None,
            grant: None,
        }
    }
}

/// Everything a philosopher holds while eating. Dropping a field hands the
/// resource back without blocking.
pub struct Grant {
    pub left_id: u32,
    pub left: OwnedMutexGuard<()>,
    pub right_id: u32,
    pub right: OwnedMutexGuard<()>,
    pub eating_slot: OwnedSemaphorePermit,
}
