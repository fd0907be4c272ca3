use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use msgs::philosopher::{Philosopher, PhilosopherState};
use tokio::sync::{Mutex, Semaphore};

use crate::chopstick::Chopstick;
use crate::logs::Logs;
use crate::seat::{Grant, Seat};

/// Shared state for the whole table: every seat, every chopstick and the
/// eating counter. One instance is shared by all connection tasks; the
/// registries are only ever touched inside short lock sections that are
/// never held across an await.
pub struct Table {
    /// Seats in admission order; a philosopher's id is its index + 1.
    seats: StdMutex<Vec<Seat>>,
    /// Chopstick arena, grown only by admissions; a chopstick's id is its
    /// index + 1, and entries are never removed or reordered.
    chopsticks: StdMutex<Vec<Chopstick>>,
    /// Counting gate bounding concurrent eaters to floor(n / 2).
    eating_counter: Arc<Semaphore>,
    /// Serializes admissions end-to-end.
    creation_guard: Mutex<()>,
    logs: Logs,
}

impl Table {
    pub fn new(logs: Logs) -> Table {
        Table {
            seats: StdMutex::new(Vec::new()),
            chopsticks: StdMutex::new(Vec::new()),
            eating_counter: Arc::new(Semaphore::new(0)),
            creation_guard: Mutex::new(()),
            logs,
        }
    }

    pub fn number_philosophers(&self) -> usize {
        self.seats_locked().len()
    }

    pub fn number_chopsticks(&self) -> usize {
        self.chopsticks_locked().len()
    }

    pub fn available_eating_slots(&self) -> usize {
        self.eating_counter.available_permits()
    }

    /// Arena index of the left/right chopstick of a seated philosopher.
    pub fn chopsticks_of(&self, id: u32) -> Option<(usize, Option<usize>)> {
        let seats = self.seats_locked();
        let seat = seats.iter().find(|seat| seat.philosopher.id == id)?;
        Some((seat.left_chopstick, seat.right_chopstick))
    }

    pub fn snapshot_of(&self, id: u32) -> Option<Philosopher> {
        let seats = self.seats_locked();
        let seat = seats.iter().find(|seat| seat.philosopher.id == id)?;
        Some(seat.philosopher)
    }

    /// Seats a new philosopher, creating its left chopstick and closing the
    /// ring behind it. Fully serialized against concurrent admissions; the
    /// caller is responsible for checking capacity first.
    pub async fn admit(&self) -> Philosopher {
        let _creating = self.creation_guard.lock().await;

        let new_id = self.number_philosophers() as u32 + 1;
        self.logs.server(format!("Creating philosopher {new_id}..."));

        let left_chopstick = self.create_chopstick(new_id);
        let mut seat = Seat::new(Philosopher::new(new_id), left_chopstick);

        if new_id > 1 {
            self.assign_right_chopstick(&mut seat).await;
        }

        let number_philosophers = {
            let mut seats = self.seats_locked();
            seats.push(seat);
            seats.len()
        };

        // Every second admission opens one more eating slot, which keeps
        // the counter at floor(n / 2).
        if number_philosophers % 2 == 0 {
            self.eating_counter.add_permits(1);
        }

        self.logs
            .server(format!("Philosopher {new_id} seated at the table"));

        Philosopher::new(new_id)
    }

    /// Applies a state change reported by a client. Returns the granted
    /// snapshot when the philosopher asked to eat and now holds everything
    /// it needs; `None` for every other transition.
    pub async fn transition(&self, philosopher: Philosopher, session_id: u32) -> Option<Philosopher> {
        let seat_index = {
            let seats = self.seats_locked();
            seats
                .iter()
                .position(|seat| seat.philosopher.id == philosopher.id)
        };

        let Some(seat_index) = seat_index else {
            self.logs.client(
                session_id,
                "Error: the philosopher to update has no seat at this table",
            );
            return None;
        };

        match philosopher.state {
            PhilosopherState::Thinking => {
                self.finish_eating(seat_index, philosopher, session_id);
                None
            }
            PhilosopherState::Eating => {
                // Eating is only ever reached as a grant; a direct report
                // is stored as-is with no resource movement.
                {
                    let mut seats = self.seats_locked();
                    seats[seat_index].philosopher = philosopher;
                }
                self.logs.client_action(session_id, &philosopher);
                None
            }
            PhilosopherState::Hungry => self.start_eating(seat_index, philosopher, session_id).await,
        }
    }

    fn create_chopstick(&self, id: u32) -> usize {
        let mut chopsticks = self.chopsticks_locked();
        chopsticks.push(Chopstick::new(id));
        self.logs.server(format!("Chopstick {id} created"));
        chopsticks.len() - 1
    }

    /// Closes the ring: the newcomer's right is always the very first
    /// chopstick, and the previous last philosopher's right becomes the
    /// newcomer's left, inserting the newcomer between the previous last
    /// philosopher and the first one.
    async fn assign_right_chopstick(&self, seat: &mut Seat) {
        let new_id = seat.philosopher.id;
        let previous_last = new_id as usize - 2;

        self.logs.server(format!(
            "Assigning chopstick 1 to the right of philosopher {new_id}"
        ));
        seat.right_chopstick = Some(0);

        self.logs.server(format!(
            "Assigning chopstick {new_id} to the right of philosopher {}",
            previous_last + 1
        ));

        let old_right_index = {
            let seats = self.seats_locked();
            seats[previous_last].right_chopstick
        };

        // When the previous last philosopher already has a right chopstick
        // (every admission after the second), hold it during the repoint so
        // the swap cannot race a philosopher mid-acquisition of it. For the
        // second admission there is no prior right chopstick and therefore
        // no possible contender.
        let held = match old_right_index {
            Some(index) => {
                let old_right = self.chopstick_handle(index);
                Some(old_right.usage.lock_owned().await)
            }
            None => None,
        };

        {
            let mut seats = self.seats_locked();
            seats[previous_last].right_chopstick = Some(seat.left_chopstick);
        }

        drop(held);
    }

    /// Thinking transition: when the philosopher was eating, put both
    /// chopsticks back and free its eating slot, then store the reported
    /// snapshot. Releases never block.
    fn finish_eating(&self, seat_index: usize, philosopher: Philosopher, session_id: u32) {
        {
            let mut seats = self.seats_locked();
            let seat = &mut seats[seat_index];

            if seat.philosopher.state == PhilosopherState::Eating {
                if let Some(grant) = seat.grant.take() {
                    let Grant {
                        left_id,
                        left,
                        right_id,
                        right,
                        eating_slot,
                    } = grant;

                    drop(left);
                    self.logs.client(session_id, "Left chopstick released");
                    self.logs.server(format!(
                        "Philosopher {} puts down chopstick {left_id} on their left",
                        philosopher.id
                    ));

                    drop(right);
                    self.logs.client(session_id, "Right chopstick released");
                    self.logs.server(format!(
                        "Philosopher {} puts down chopstick {right_id} on their right",
                        philosopher.id
                    ));

                    drop(eating_slot);
                    self.logs.client(session_id, "Eating slot released");
                    self.logs.server(format!(
                        "Philosopher {} frees an eating slot",
                        philosopher.id
                    ));
                }
            }

            seat.philosopher = philosopher;
        }

        self.logs.client_action(session_id, &philosopher);
    }

    /// Hungry transition: store the reported snapshot, then acquire the
    /// eating counter, the left chopstick and the right chopstick, in that
    /// fixed order. Each acquisition is probed without blocking first so
    /// the wait can be reported before the task parks on it. The fixed
    /// order plus the floor(n / 2) bound is what keeps the ring free of
    /// circular waits.
    async fn start_eating(
        &self,
        seat_index: usize,
        philosopher: Philosopher,
        session_id: u32,
    ) -> Option<Philosopher> {
        let id = philosopher.id;

        let left_index = {
            let mut seats = self.seats_locked();
            let seat = &mut seats[seat_index];

            if seat.right_chopstick.is_none() {
                drop(seats);
                self.logs.client(
                    session_id,
                    "Error: a lone philosopher cannot eat, the table needs a second seat",
                );
                return None;
            }

            seat.philosopher = philosopher;
            seat.left_chopstick
        };

        let eating_slot = match Arc::clone(&self.eating_counter).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.logs
                    .server(format!("Philosopher {id} waits for an eating slot to free up"));
                self.logs.client(session_id, "Waiting to be allowed to eat...");
                Arc::clone(&self.eating_counter).acquire_owned().await.ok()?
            }
        };
        self.logs.server(format!(
            "Philosopher {id} takes an eating slot (slots left: {})",
            self.eating_counter.available_permits()
        ));

        let left_handle = self.chopstick_handle(left_index);
        let left_id = left_handle.id;
        let left = match Arc::clone(&left_handle.usage).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                self.logs.server(format!(
                    "Philosopher {id} waits for chopstick {left_id} on their left to free up"
                ));
                self.logs.client(session_id, "Waiting for the left chopstick...");
                left_handle.usage.lock_owned().await
            }
        };
        self.logs
            .server(format!("Philosopher {id} takes chopstick {left_id} on their left"));

        // Re-read the right chopstick here: an admission may have repointed
        // it (under its lock) since the seat was looked up.
        let right_index = {
            let seats = self.seats_locked();
            seats[seat_index].right_chopstick?
        };

        let right_handle = self.chopstick_handle(right_index);
        let right_id = right_handle.id;
        let right = match Arc::clone(&right_handle.usage).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                self.logs.server(format!(
                    "Philosopher {id} waits for chopstick {right_id} on their right to free up"
                ));
                self.logs.client(session_id, "Waiting for the right chopstick...");
                right_handle.usage.lock_owned().await
            }
        };
        self.logs
            .server(format!("Philosopher {id} takes chopstick {right_id} on their right"));

        let granted = {
            let mut seats = self.seats_locked();
            let seat = &mut seats[seat_index];
            seat.philosopher.state = PhilosopherState::Eating;
            seat.philosopher.state_timer = 0;
            seat.grant = Some(Grant {
                left_id,
                left,
                right_id,
                right,
                eating_slot,
            });
            seat.philosopher
        };

        Some(granted)
    }

    /// Clones the arena entry so the caller can wait on the chopstick
    /// without keeping the arena locked.
    fn chopstick_handle(&self, index: usize) -> Chopstick {
        self.chopsticks_locked()[index].clone()
    }

    fn seats_locked(&self) -> MutexGuard<'_, Vec<Seat>> {
        self.seats.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn chopsticks_locked(&self) -> MutexGuard<'_, Vec<Chopstick>> {
        self.chopsticks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
