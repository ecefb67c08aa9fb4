use crate::buffer::PacketBuffer;
use crate::error::CodecError;
use crate::header::Header;
use crate::question::Question;
use crate::record::Record;

/// A full DNS message: `(Header, Questions, Answers, Authority, Additional)`.
/// Section counts are never stored independently of the `Vec` lengths, so
/// a decoded-then-reencoded message cannot drift from its own header
/// counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub authority: Vec<Record>,
    pub additional: Vec<Record>,
}

impl Message {
    pub fn query(id: u16, question: Question) -> Self {
        Self {
            header: Header::query(id),
            questions: vec![question],
            ..Default::default()
        }
    }

    /// Build the shell of a response to `request`: id and question section
    /// echoed back, `response`/`recursion_available` set, no answers yet.
    pub fn response_to(request: &Self) -> Self {
        Self {
            header: Header::response_to(&request.header),
            questions: request.questions.clone(),
            ..Default::default()
        }
    }

    pub fn with_answers(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.answers.extend(records);
        self
    }

    pub fn with_response_code(mut self, code: crate::header::ResponseCode) -> Self {
        self.header = self.header.with_response_code(code);
        self
    }

    /// Decode contract: sections are read strictly in header-count
    /// order; reading past the declared length of the buffer is an error,
    /// never a panic.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut buf = [0u8; 512];
        let len = bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&bytes[..len]);
        let mut buffer = PacketBuffer::new(buf);

        let (header, counts) = Header::read(&mut buffer)?;
        let [qd, an, ns, ar] = counts;

        let mut questions = Vec::with_capacity(qd as usize);
        for _ in 0..qd {
            questions.push(Question::read(&mut buffer)?);
        }

        let mut answers = Vec::with_capacity(an as usize);
        for _ in 0..an {
            answers.push(Record::read(&mut buffer)?);
        }

        let mut authority = Vec::with_capacity(ns as usize);
        for _ in 0..ns {
            authority.push(Record::read(&mut buffer)?);
        }

        let mut additional = Vec::with_capacity(ar as usize);
        for _ in 0..ar {
            additional.push(Record::read(&mut buffer)?);
        }

        Ok(Self {
                header,
                questions,
                answers,
                authority,
                additional,
            })
    }

    /// Encode contract: counts are derived from the actual section
    /// lengths, never trusted from a stored field, and compression is never
    /// emitted (the relay owns the output buffer layout — see the module
    /// docs on "why uncompressed on emit").
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let counts = [
            section_count(self.questions.len())?,
            section_count(self.answers.len())?,
            section_count(self.authority.len())?,
            section_count(self.additional.len())?,
        ];

        let mut buffer = PacketBuffer::default();
        self.header.write(counts, &mut buffer)?;

        for question in &self.questions {
            question.write(&mut buffer)?;
        }
        for record in &self.answers {
            record.write(&mut buffer)?;
        }
        for record in &self.authority {
            record.write(&mut buffer)?;
        }
        for record in &self.additional {
            record.write(&mut buffer)?;
        }

        Ok(buffer.buf[..buffer.pos()].to_vec())
    }
}

/// A section longer than 65 535 records has no valid 16-bit count to
/// declare; this is the one way `CountMismatch` is actually reachable.
fn section_count(len: usize) -> Result<u16, CodecError> {
    u16::try_from(len).map_err(|_| CodecError::CountMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ResponseCode;
    use crate::question::QueryType;
    use std::net::Ipv4Addr;

    #[test]
    fn round_trips_a_simple_query() {
        let message = Message::query(0x1234, Question::new("example.com".into(), QueryType::A));
        let bytes = message.encode().unwrap();
        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn round_trips_a_response_with_answers() {
        let request = Message::query(0xBEEF, Question::new("example.com".into(), QueryType::A));
        let response = Message::response_to(&request).with_answers([Record::A {
                    domain: "example.com".into(),
                    addr: Ipv4Addr::new(93, 184, 216, 34),
                    ttl: 300,
                }]);

        let bytes = response.encode().unwrap();
        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.header.id, 0xBEEF);
        assert_eq!(decoded.answers.len(), 1);
    }

    #[test]
    fn encoded_counts_always_match_section_lengths() {
        let mut message = Message::default();
        message.answers.push(Record::A {
                domain: "a.test".into(),
                addr: Ipv4Addr::new(1, 1, 1, 1),
                ttl: 60,
            });
        message.answers.push(Record::A {
                domain: "b.test".into(),
                addr: Ipv4Addr::new(2, 2, 2, 2),
                ttl: 60,
            });

        let bytes = message.encode().unwrap();
        // an_count lives at byte offset 6..8 of the header
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 2);
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let err = Message::decode(&[0, 0]).unwrap_err();
        assert_eq!(err, CodecError::TruncatedBuffer);
    }

    #[test]
    fn synthesizes_nxdomain_with_no_answers() {
        let request = Message::query(0x42, Question::new("blocked.test".into(), QueryType::A));
        let response = Message::response_to(&request).with_response_code(ResponseCode::NXDOMAIN);

        let bytes = response.encode().unwrap();
        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded.header.response_code, ResponseCode::NXDOMAIN);
        assert!(decoded.answers.is_empty());
    }
}
