use byteorder::{LittleEndian, ReadBytesExt};

/// Finds the next complete length-prefixed message in the buffer.
/// Returns the (begin, end) byte range of the payload, or None if the
/// buffer does not yet hold a full message.
pub fn dequeue_msg(input_buffer: &[u8]) -> Option<(usize, usize)> {
    if input_buffer.len() < 4 {
        return None;
    }

    let mut rdr = input_buffer;

    let msg_ln = rdr.read_u32::<LittleEndian>().unwrap() as usize;

    let end = msg_ln + 4;

    if input_buffer.len() < end {
        return None;
    }

    Some((4, end))
}

#[cfg(test)]
#[path = "dequeue_tests.rs"]
mod tests;
