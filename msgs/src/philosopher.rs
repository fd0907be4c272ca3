use std::io::Write;

use anyhow::bail;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PhilosopherState {
    Thinking,
    Hungry,
    Eating,
}

impl PhilosopherState {
    pub fn from_u32(index: u32) -> Option<PhilosopherState> {
        match index {
            0 => Some(PhilosopherState::Thinking),
            1 => Some(PhilosopherState::Hungry),
            2 => Some(PhilosopherState::Eating),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            PhilosopherState::Thinking => 0,
            PhilosopherState::Hungry => 1,
            PhilosopherState::Eating => 2,
        }
    }
}

/// Snapshot of a philosopher as it travels over the wire. The timer is
/// advisory, counted down by the client; the server only stores it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Philosopher {
    pub id: u32,
    pub state: PhilosopherState,
    pub state_timer: i32,
}

impl Philosopher {
    pub const WIRE_SIZE: u32 = 12;

    pub fn new(id: u32) -> Philosopher {
        Philosopher {
            id,
            state: PhilosopherState::Thinking,
            state_timer: 0,
        }
    }

    pub fn decode(rdr: &mut &[u8]) -> anyhow::Result<Philosopher> {
        let id = rdr.read_u32::<LittleEndian>()?;

        let state_index = rdr.read_u32::<LittleEndian>()?;
        let Some(state) = PhilosopherState::from_u32(state_index) else {
            bail!("unsupported philosopher state: {state_index}");
        };

        let state_timer = rdr.read_i32::<LittleEndian>()?;

        Ok(Philosopher {
            id,
            state,
            state_timer,
        })
    }

    pub fn pack(&self, wtr: &mut impl Write) {
        wtr.write_u32::<LittleEndian>(self.id).unwrap();
        wtr.write_u32::<LittleEndian>(self.state.as_u32()).unwrap();
        wtr.write_i32::<LittleEndian>(self.state_timer).unwrap();
    }
}
