use std::io::Write;

use anyhow::bail;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::dequeue::dequeue_msg;
use crate::philosopher::Philosopher;

/// Responses the server sends back: the freshly seated philosopher after a
/// Create, or the granted Eating snapshot after a Hungry update. Thinking
/// and Eating updates are acknowledged by silence.
#[derive(Debug, Clone)]
pub enum ServerClientMsg {
    Created(Philosopher),
    Updated(Philosopher),
}

impl ServerClientMsg {
    pub fn dequeue_and_decode(input_buffer: &mut Vec<u8>) -> Option<anyhow::Result<ServerClientMsg>> {
        let (begin, end) = dequeue_msg(input_buffer)?;
        let msg = Self::decode(&input_buffer[begin..end]);
        input_buffer.drain(..end);
        Some(msg)
    }

    pub fn decode(input_buffer: &[u8]) -> anyhow::Result<ServerClientMsg> {
        let mut rdr = input_buffer;
        let msg_type_index = rdr.read_u32::<LittleEndian>()?;

        let msg = match msg_type_index {
            0 => {
                let philosopher = Philosopher::decode(&mut rdr)?;
                ServerClientMsg::Created(philosopher)
            }
            1 => {
                let philosopher = Philosopher::decode(&mut rdr)?;
                ServerClientMsg::Updated(philosopher)
            }
            type_index => {
                bail!("unsupported msg type: {type_index}");
            }
        };

        Ok(msg)
    }

    pub fn pack(&self, wtr: &mut impl Write) {
        match self {
            ServerClientMsg::Created(philosopher) => {
                wtr.write_u32::<LittleEndian>(4 + Philosopher::WIRE_SIZE).unwrap();
                wtr.write_u32::<LittleEndian>(0).unwrap();
                philosopher.pack(wtr);
            }
            ServerClientMsg::Updated(philosopher) => {
                wtr.write_u32::<LittleEndian>(4 + Philosopher::WIRE_SIZE).unwrap();
                wtr.write_u32::<LittleEndian>(1).unwrap();
                philosopher.pack(wtr);
            }
        }
    }
}
