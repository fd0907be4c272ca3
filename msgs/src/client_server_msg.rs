use std::io::Write;

use anyhow::bail;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::dequeue::dequeue_msg;
use crate::philosopher::Philosopher;

/// Requests a client can address to the server: join the table, or report
/// a state change for a philosopher that already has a seat.
#[derive(Debug, Clone)]
pub enum ClientServerMsg {
    Create,
    Update(Philosopher),
}

impl ClientServerMsg {
    pub fn dequeue_and_decode(input_buffer: &mut Vec<u8>) -> Option<anyhow::Result<ClientServerMsg>> {
        let (begin, end) = dequeue_msg(input_buffer)?;
        let msg = Self::decode(&input_buffer[begin..end]);
        input_buffer.drain(..end);
        Some(msg)
    }

    pub fn decode(input_buffer: &[u8]) -> anyhow::Result<ClientServerMsg> {
        let mut rdr = input_buffer;
        let msg_type_index = rdr.read_u32::<LittleEndian>()?;

        let msg = match msg_type_index {
            0 => ClientServerMsg::Create,
            1 => {
                let philosopher = Philosopher::decode(&mut rdr)?;
                ClientServerMsg::Update(philosopher)
            }
            type_index => {
                bail!("unsupported msg type: {type_index}");
            }
        };

        Ok(msg)
    }

    pub fn pack(&self, wtr: &mut impl Write) {
        match self {
            ClientServerMsg::Create => {
                wtr.write_u32::<LittleEndian>(4).unwrap();
                wtr.write_u32::<LittleEndian>(0).unwrap();
            }
            ClientServerMsg::Update(philosopher) => {
                wtr.write_u32::<LittleEndian>(4 + Philosopher::WIRE_SIZE).unwrap();
                wtr.write_u32::<LittleEndian>(1).unwrap();
                philosopher.pack(wtr);
            }
        }
    }
}

#[cfg(test)]
#[path = "client_server_msg_tests.rs"]
mod tests;
