use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use crate::buffer::PacketBuffer;

/// The 4-bit RCODE nibble. Kept as a thin wrapper rather than a closed enum:
/// the codec must round-trip any well-formed message, including
/// response codes this relay never produces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCode(u8);

impl ResponseCode {
    pub const NOERROR: Self = Self(0);
    pub const FORMAT_ERROR: Self = Self(1);
    pub const SERVFAIL: Self = Self(2);
    pub const NXDOMAIN: Self = Self(3);
    pub const NOT_IMPLEMENTED: Self = Self(4);
    pub const REFUSED: Self = Self(5);

    pub fn from_nibble(value: u8) -> Self {
        Self(value & 0x0F)
    }

    pub fn to_nibble(self) -> u8 {
        self.0
    }
}

impl Default for ResponseCode {
    fn default() -> Self {
        Self::NOERROR
    }
}

/// The fixed 12-byte DNS header. Section counts are not stored here —
/// they are always derived from the message's actual section lengths at
/// encode time, so there is no way to construct a
/// `Header`/`Message` pair whose counts disagree with reality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub response: bool,
    pub opcode: u8,
    pub authoritative_answer: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub z: bool,
    pub response_code: ResponseCode,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            id: 0,
            response: false,
            opcode: 0,
            authoritative_answer: false,
            truncated: false,
            recursion_desired: false,
            recursion_available: false,
            z: false,
            response_code: ResponseCode::NOERROR,
        }
    }
}

impl Header {
    pub fn query(id: u16) -> Self {
        Self {
            id,
            recursion_desired: true,
            ..Default::default()
        }
    }

    /// Build the header of a response to `request`, copying the bits the
    /// client is entitled to see echoed back (id, opcode, rd).
    pub fn response_to(request: &Self) -> Self {
        Self {
            id: request.id,
            response: true,
            opcode: request.opcode,
            recursion_desired: request.recursion_desired,
            recursion_available: true,
            ..Default::default()
        }
    }

    pub fn with_response_code(mut self, code: ResponseCode) -> Self {
        self.response_code = code;
        self
    }

    pub(crate) fn read(buffer: &mut PacketBuffer) -> Result<(Self, [u16; 4]), ReaderError> {
        let id = buffer.read_u16()?;

        let flags_hi = buffer.read_u8()?;
        let flags_lo = buffer.read_u8()?;

        let header = Self {
            id,
            response: (flags_hi & 0b1000_0000) != 0,
            opcode: (flags_hi >> 3) & 0x0F,
            authoritative_answer: (flags_hi & 0b0000_0100) != 0,
            truncated: (flags_hi & 0b0000_0010) != 0,
            recursion_desired: (flags_hi & 0b0000_0001) != 0,
            recursion_available: (flags_lo & 0b1000_0000) != 0,
            z: (flags_lo & 0b0100_0000) != 0,
            response_code: ResponseCode::from_nibble(flags_lo),
        };

        let counts = [
            buffer.read_u16()?,
            buffer.read_u16()?,
            buffer.read_u16()?,
            buffer.read_u16()?,
        ];

        Ok((header, counts))
    }

    pub(crate) fn write(&self, counts: [u16; 4], buffer: &mut PacketBuffer) -> Result<(), WriterError> {
        buffer.write_u16(self.id)?;

        let flags_hi = (self.response as u8) << 7
        | (self.opcode & 0x0F) << 3
        | (self.authoritative_answer as u8) << 2
        | (self.truncated as u8) << 1
        | (self.recursion_desired as u8);
        buffer.write_u8(flags_hi)?;

        let flags_lo = (self.recursion_available as u8) << 7
        | (self.z as u8) << 6
        | self.response_code.to_nibble();
        buffer.write_u8(flags_lo)?;

        for count in counts {
            buffer.write_u16(count)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_flag_bits() {
        let header = Header {
            id: 0xBEEF,
            response: true,
            opcode: 2,
            authoritative_answer: true,
            truncated: false,
            recursion_desired: true,
            recursion_available: true,
            z: false,
            response_code: ResponseCode::SERVFAIL,
        };

        let mut buffer = PacketBuffer::default();
        header.write([1, 0, 0, 0], &mut buffer).unwrap();
        buffer.pos = 0;

        let (decoded, counts) = Header::read(&mut buffer).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(counts, [1, 0, 0, 0]);
    }
}
