use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use crate::buffer::PacketBuffer;

/// QTYPE values the relay understands as typed rdata. Anything else
/// decodes to `Unknown` and its rdata is carried opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    A,
    Ns,
    Cname,
    Soa,
    Aaaa,
    Unknown(u16),
}

impl QueryType {
    pub fn to_num(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Ns => 2,
            Self::Cname => 5,
            Self::Soa => 6,
            Self::Aaaa => 28,
            Self::Unknown(num) => num,
        }
    }

    pub fn from_num(num: u16) -> Self {
        match num {
            1 => Self::A,
            2 => Self::Ns,
            5 => Self::Cname,
            6 => Self::Soa,
            28 => Self::Aaaa,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: QueryType,
    /// QCLASS, kept raw rather than a closed enum so an unusual class on an
    /// upstream reply still round-trips byte-exact.
    pub qclass: u16,
}

impl Question {
    pub const CLASS_IN: u16 = 1;

    pub fn new(name: String, qtype: QueryType) -> Self {
        Self {
            name,
            qtype,
            qclass: Self::CLASS_IN,
        }
    }

    pub(crate) fn read(buffer: &mut PacketBuffer) -> Result<Self, ReaderError> {
        let name = buffer.read_qname()?;
        let qtype = QueryType::from_num(buffer.read_u16()?);
        let qclass = buffer.read_u16()?;

        Ok(Self {
                name,
                qtype,
                qclass,
            })
    }

    pub(crate) fn write(&self, buffer: &mut PacketBuffer) -> Result<(), WriterError> {
        buffer.write_qname(&self.name)?;
        buffer.write_u16(self.qtype.to_num())?;
        buffer.write_u16(self.qclass)
    }
}
