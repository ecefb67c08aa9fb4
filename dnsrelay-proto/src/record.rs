use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use crate::buffer::PacketBuffer;
use crate::question::{QueryType, Question};
use std::net::{Ipv4Addr, Ipv6Addr};

/// A resource record with its rdata parsed into a typed representation per
/// its QTYPE. Unknown types keep their rdata as opaque bytes so they can
/// be passed through byte-exact on re-encode rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    A {
        domain: String,
        addr: Ipv4Addr,
        ttl: u32,
    },
    Aaaa {
        domain: String,
        addr: Ipv6Addr,
        ttl: u32,
    },
    Cname {
        domain: String,
        host: String,
        ttl: u32,
    },
    Ns {
        domain: String,
        host: String,
        ttl: u32,
    },
    Soa {
        domain: String,
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
        ttl: u32,
    },
    Unknown {
        domain: String,
        qtype: u16,
        rdata: Vec<u8>,
        ttl: u32,
    },
}

impl Record {
    pub fn domain(&self) -> &str {
        match self {
            Self::A { domain, .. }
            | Self::Aaaa { domain, .. }
            | Self::Cname { domain, .. }
            | Self::Ns { domain, .. }
            | Self::Soa { domain, .. }
            | Self::Unknown { domain, .. } => domain,
        }
    }

    pub fn qtype(&self) -> QueryType {
        match self {
            Self::A { .. } => QueryType::A,
            Self::Aaaa { .. } => QueryType::Aaaa,
            Self::Cname { .. } => QueryType::Cname,
            Self::Ns { .. } => QueryType::Ns,
            Self::Soa { .. } => QueryType::Soa,
            Self::Unknown { qtype, .. } => QueryType::Unknown(*qtype),
        }
    }

    pub fn ttl(&self) -> u32 {
        match self {
            Self::A { ttl, .. }
            | Self::Aaaa { ttl, .. }
            | Self::Cname { ttl, .. }
            | Self::Ns { ttl, .. }
            | Self::Soa { ttl, .. }
            | Self::Unknown { ttl, .. } => *ttl,
        }
    }

    /// Returns a copy of this record with its TTL replaced, used by the
    /// cache to hand out the remaining time-to-live rather than the
    /// originally-inserted TTL.
    pub fn with_ttl(&self, ttl: u32) -> Self {
        let mut clone = self.clone();
        match &mut clone {
            Self::A { ttl: t, .. }
            | Self::Aaaa { ttl: t, .. }
            | Self::Cname { ttl: t, .. }
            | Self::Ns { ttl: t, .. }
            | Self::Soa { ttl: t, .. }
            | Self::Unknown { ttl: t, .. } => *t = ttl,
        }
        clone
    }

    /// Equality ignoring TTL, used by the cache to de-duplicate on
    /// `(type, rdata)` per the cache-entry invariant.
    pub fn same_data_as(&self, other: &Self) -> bool {
        self.with_ttl(0) == other.with_ttl(0)
    }

    pub(crate) fn read(buffer: &mut PacketBuffer) -> Result<Self, ReaderError> {
        let domain = buffer.read_qname()?;
        let qtype = QueryType::from_num(buffer.read_u16()?);
        let _qclass = buffer.read_u16()?;
        let ttl = buffer.read_u32()?;
        let rdlength = buffer.read_u16()? as usize;
        let rdata_start = buffer.pos();

        let record = match qtype {
            QueryType::A => {
                let raw = buffer.read_u32()?;
                Self::A {
                    domain,
                    addr: Ipv4Addr::from(raw),
                    ttl,
                }
            }
            QueryType::Aaaa => {
                let mut octets = [0u8; 16];
                for octet in octets.iter_mut() {
                    *octet = buffer.read_u8()?;
                }
                Self::Aaaa {
                    domain,
                    addr: Ipv6Addr::from(octets),
                    ttl,
                }
            }
            QueryType::Cname => Self::Cname {
                domain,
                host: buffer.read_qname()?,
                ttl,
            },
            QueryType::Ns => Self::Ns {
                domain,
                host: buffer.read_qname()?,
                ttl,
            },
            QueryType::Soa => {
                let mname = buffer.read_qname()?;
                let rname = buffer.read_qname()?;
                Self::Soa {
                    domain,
                    mname,
                    rname,
                    serial: buffer.read_u32()?,
                    refresh: buffer.read_u32()?,
                    retry: buffer.read_u32()?,
                    expire: buffer.read_u32()?,
                    minimum: buffer.read_u32()?,
                    ttl,
                }
            }
            QueryType::Unknown(num) => Self::Unknown {
                domain,
                qtype: num,
                rdata: buffer.read_vec(rdlength)?,
                ttl,
            },
        };

        // Typed rdata readers above consume exactly rdlength bytes for a
        // well-formed message. Reading more than declared means the rdata
        // doesn't match its own length prefix; reading less (a compressed
        // name inside rdata that jumped elsewhere) is fine and we resync to
        // the declared boundary so later records in the section don't
        // parse garbage.
        let consumed = buffer.pos() - rdata_start;
        if consumed > rdlength {
            return Err(ReaderError::BadRdLength);
        }
        if consumed < rdlength {
            buffer.step(rdlength - consumed)?;
        }

        Ok(record)
    }

    pub(crate) fn write(&self, buffer: &mut PacketBuffer) -> Result<(), WriterError> {
        let qtype = self.qtype();

        match self {
            Self::A { domain, addr, ttl } => {
                Self::write_header(buffer, domain, qtype, *ttl)?;
                buffer.write_u16(4)?;
                buffer.write_bytes(&addr.octets())?;
            }
            Self::Aaaa { domain, addr, ttl } => {
                Self::write_header(buffer, domain, qtype, *ttl)?;
                buffer.write_u16(16)?;
                buffer.write_bytes(&addr.octets())?;
            }
            Self::Cname { domain, host, ttl } | Self::Ns { domain, host, ttl } => {
                Self::write_header(buffer, domain, qtype, *ttl)?;
                Self::write_rdlength_prefixed(buffer, |buffer| buffer.write_qname(host))?;
            }
            Self::Soa {
                domain,
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
                ttl,
            } => {
                Self::write_header(buffer, domain, qtype, *ttl)?;
                Self::write_rdlength_prefixed(buffer, |buffer| {
                        buffer.write_qname(mname)?;
                        buffer.write_qname(rname)?;
                        buffer.write_u32(*serial)?;
                        buffer.write_u32(*refresh)?;
                        buffer.write_u32(*retry)?;
                        buffer.write_u32(*expire)?;
                        buffer.write_u32(*minimum)
                    })?;
            }
            Self::Unknown {
                domain,
                qtype: num,
                rdata,
                ttl,
            } => {
                Self::write_header(buffer, domain, QueryType::Unknown(*num), *ttl)?;
                buffer.write_u16(rdata.len() as u16)?;
                buffer.write_bytes(rdata)?;
            }
        }

        Ok(())
    }

    fn write_header(
        buffer: &mut PacketBuffer,
        domain: &str,
        qtype: QueryType,
        ttl: u32,
    ) -> Result<(), WriterError> {
        buffer.write_qname(domain)?;
        buffer.write_u16(qtype.to_num())?;
        buffer.write_u16(Question::CLASS_IN)?;
        buffer.write_u32(ttl)
    }

    /// RDLENGTH is recomputed from the encoded rdata, never trusted from
    /// input on re-emission: reserve two bytes, run the writer, then
    /// patch the length in once it's known.
    fn write_rdlength_prefixed(
        buffer: &mut PacketBuffer,
        write_rdata: impl FnOnce(&mut PacketBuffer) -> Result<(), WriterError>,
    ) -> Result<(), WriterError> {
        let length_pos = buffer.pos();
        buffer.write_u16(0)?;
        let rdata_start = buffer.pos();

        write_rdata(buffer)?;

        let rdlength = buffer.pos() - rdata_start;
        buffer.set_u16(length_pos, rdlength as u16);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(record: &Record) -> Record {
        let mut buffer = PacketBuffer::default();
        record.write(&mut buffer).unwrap();
        buffer.pos = 0;
        Record::read(&mut buffer).unwrap()
    }

    #[test]
    fn round_trips_a_record() {
        let record = Record::A {
            domain: "example.com".into(),
            addr: Ipv4Addr::new(93, 184, 216, 34),
            ttl: 300,
        };
        assert_eq!(round_trip(&record), record);
    }

    #[test]
    fn round_trips_aaaa_record() {
        let record = Record::Aaaa {
            domain: "example.com".into(),
            addr: Ipv6Addr::new(0x2606, 0x2800, 0x220, 1, 0x248, 0x1893, 0x25c8, 0x1946),
            ttl: 300,
        };
        assert_eq!(round_trip(&record), record);
    }

    #[test]
    fn round_trips_cname_record() {
        let record = Record::Cname {
            domain: "www.example.com".into(),
            host: "example.com".into(),
            ttl: 60,
        };
        assert_eq!(round_trip(&record), record);
    }

    #[test]
    fn round_trips_soa_record() {
        let record = Record::Soa {
            domain: "example.com".into(),
            mname: "ns1.example.com".into(),
            rname: "hostmaster.example.com".into(),
            serial: 2024010100,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum: 300,
            ttl: 300,
        };
        assert_eq!(round_trip(&record), record);
    }

    #[test]
    fn passes_unknown_rdata_through_opaque() {
        let record = Record::Unknown {
            domain: "example.com".into(),
            qtype: 65,
            rdata: vec![1, 2, 3, 4, 5],
            ttl: 60,
        };
        assert_eq!(round_trip(&record), record);
    }

    #[test]
    fn same_data_as_ignores_ttl() {
        let a = Record::A {
            domain: "example.com".into(),
            addr: Ipv4Addr::new(1, 2, 3, 4),
            ttl: 60,
        };
        let b = a.with_ttl(30);
        assert!(a.same_data_as(&b));
        assert_ne!(a, b);
    }
}
