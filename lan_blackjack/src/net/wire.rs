//! Fixed-layout binary codec for discovery and gameplay frames.
//!
//! Every frame starts with the same five-byte header: a four-byte
//! magic cookie followed by a one-byte message type tag, both big
//! endian. The rest of the frame is a fixed layout specific to each
//! message, so a peer always knows exactly how many bytes to read.

use std::io::{self, Read, Write};

use super::super::game::{
    entities::{Card, Suit},
    round::RoundResult,
};
use super::errors::WireError;
use super::messages::{CardMessage, Decision, NAME_LEN, Offer, Request, TOKEN_LEN};

/// Magic cookie opening every protocol frame.
pub const MAGIC_COOKIE: u32 = 0xabcd_dcba;

/// Type tag of dealer offer frames.
pub const MSG_TYPE_OFFER: u8 = 0x2;
/// Type tag of session request frames.
pub const MSG_TYPE_REQUEST: u8 = 0x3;
/// Type tag of gameplay payload frames, both directions.
pub const MSG_TYPE_PAYLOAD: u8 = 0x4;

/// Bytes taken by the cookie and the type tag.
const HEADER_LEN: usize = 5;

/// A protocol message with a fixed wire layout.
pub trait WireMessage: Sized {
    /// Exact frame size in bytes.
    const WIRE_SIZE: usize;
    /// Type tag carried right after the magic cookie.
    const TYPE_TAG: u8;

    /// Encodes the message into a frame of exactly `WIRE_SIZE` bytes.
    fn encode(&self) -> Vec<u8>;

    /// Decodes a frame of exactly `WIRE_SIZE` bytes.
    fn decode(buf: &[u8]) -> Result<Self, WireError>;
}

fn encode_header(buf: &mut Vec<u8>, type_tag: u8) {
    buf.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    buf.push(type_tag);
}

fn check_header(buf: &[u8], wire_size: usize, type_tag: u8) -> Result<(), WireError> {
    if buf.len() != wire_size {
        return Err(WireError::Length {
            expected: wire_size,
            actual: buf.len(),
        });
    }
    let cookie = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if cookie != MAGIC_COOKIE {
        return Err(WireError::BadCookie(cookie));
    }
    if buf[4] != type_tag {
        return Err(WireError::BadTypeTag(buf[4]));
    }
    Ok(())
}

fn encode_name(buf: &mut Vec<u8>, name: &str) {
    let bytes = name.as_bytes();
    let n = bytes.len().min(NAME_LEN);
    buf.extend_from_slice(&bytes[..n]);
    buf.resize(buf.len() + NAME_LEN - n, 0);
}

fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

impl WireMessage for Offer {
    // cookie(4) + tag(1) + tcp_port(2) + server_name(32)
    const WIRE_SIZE: usize = HEADER_LEN + 2 + NAME_LEN;
    const TYPE_TAG: u8 = MSG_TYPE_OFFER;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        encode_header(&mut buf, Self::TYPE_TAG);
        buf.extend_from_slice(&self.tcp_port.to_be_bytes());
        encode_name(&mut buf, &self.server_name);
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_header(buf, Self::WIRE_SIZE, Self::TYPE_TAG)?;
        let tcp_port = u16::from_be_bytes([buf[5], buf[6]]);
        Ok(Self::new(tcp_port, &decode_name(&buf[7..])))
    }
}

impl WireMessage for Request {
    // cookie(4) + tag(1) + rounds(1) + client_name(32)
    const WIRE_SIZE: usize = HEADER_LEN + 1 + NAME_LEN;
    const TYPE_TAG: u8 = MSG_TYPE_REQUEST;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        encode_header(&mut buf, Self::TYPE_TAG);
        buf.push(self.rounds);
        encode_name(&mut buf, &self.client_name);
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_header(buf, Self::WIRE_SIZE, Self::TYPE_TAG)?;
        Self::new(buf[5], &decode_name(&buf[6..]))
    }
}

impl WireMessage for Decision {
    // cookie(4) + tag(1) + token(5)
    const WIRE_SIZE: usize = HEADER_LEN + TOKEN_LEN;
    const TYPE_TAG: u8 = MSG_TYPE_PAYLOAD;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        encode_header(&mut buf, Self::TYPE_TAG);
        buf.extend_from_slice(self.token());
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_header(buf, Self::WIRE_SIZE, Self::TYPE_TAG)?;
        let mut token = [0u8; TOKEN_LEN];
        token.copy_from_slice(&buf[HEADER_LEN..]);
        Self::from_token(&token)
    }
}

impl WireMessage for CardMessage {
    // cookie(4) + tag(1) + result(1) + rank(2) + suit(1)
    const WIRE_SIZE: usize = HEADER_LEN + 1 + 2 + 1;
    const TYPE_TAG: u8 = MSG_TYPE_PAYLOAD;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        encode_header(&mut buf, Self::TYPE_TAG);
        buf.push(self.result.into());
        buf.extend_from_slice(&u16::from(self.card.0).to_be_bytes());
        buf.push(self.card.1.into());
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_header(buf, Self::WIRE_SIZE, Self::TYPE_TAG)?;
        let result = RoundResult::try_from(buf[5])?;
        let rank = u16::from_be_bytes([buf[6], buf[7]]);
        if !(1..=13).contains(&rank) {
            return Err(WireError::RankOutOfRange(rank));
        }
        let suit = Suit::try_from(buf[8])?;
        Ok(Self {
            result,
            card: Card(rank as u8, suit),
        })
    }
}

/// Reads exactly one `T` frame from the stream. Decode failures
/// surface as `io::ErrorKind::InvalidData`.
pub fn read_message<T: WireMessage, R: Read>(reader: &mut R) -> io::Result<T> {
    let mut buf = vec![0u8; T::WIRE_SIZE];
    reader.read_exact(&mut buf)?;
    T::decode(&buf).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}

/// Writes one `T` frame to the stream.
pub fn write_message<T: WireMessage, W: Write>(writer: &mut W, msg: &T) -> io::Result<()> {
    writer.write_all(&msg.encode())
}

#[cfg(test)]
mod tests {
    use std::net::{TcpListener, TcpStream};

    use super::*;

    fn setup() -> (TcpStream, TcpStream) {
        let server = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (stream, _) = server.accept().unwrap();
        (client, stream)
    }

    // === Layout Tests ===

    #[test]
    fn wire_sizes() {
        assert_eq!(Offer::WIRE_SIZE, 39);
        assert_eq!(Request::WIRE_SIZE, 38);
        assert_eq!(Decision::WIRE_SIZE, 10);
        assert_eq!(CardMessage::WIRE_SIZE, 9);
    }

    #[test]
    fn offer_frame_layout() {
        let offer = Offer::new(0x1f90, "dealer");
        let frame = offer.encode();
        assert_eq!(frame.len(), Offer::WIRE_SIZE);
        assert_eq!(&frame[..4], &[0xab, 0xcd, 0xdc, 0xba]);
        assert_eq!(frame[4], MSG_TYPE_OFFER);
        assert_eq!(&frame[5..7], &[0x1f, 0x90]);
        assert_eq!(&frame[7..13], b"dealer");
        assert!(frame[13..].iter().all(|&b| b == 0));
    }

    #[test]
    fn request_frame_layout() {
        let request = Request::new(7, "alice").unwrap();
        let frame = request.encode();
        assert_eq!(frame.len(), Request::WIRE_SIZE);
        assert_eq!(frame[4], MSG_TYPE_REQUEST);
        assert_eq!(frame[5], 7);
        assert_eq!(&frame[6..11], b"alice");
        assert!(frame[11..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decision_frame_layout() {
        let frame = Decision::Hit.encode();
        assert_eq!(frame.len(), Decision::WIRE_SIZE);
        assert_eq!(frame[4], MSG_TYPE_PAYLOAD);
        assert_eq!(&frame[5..], b"Hittt");
        assert_eq!(&Decision::Stand.encode()[5..], b"Stand");
    }

    #[test]
    fn card_message_frame_layout() {
        let msg = CardMessage::new(RoundResult::Win, Card(13, Suit::Spade));
        let frame = msg.encode();
        assert_eq!(frame.len(), CardMessage::WIRE_SIZE);
        assert_eq!(frame[4], MSG_TYPE_PAYLOAD);
        assert_eq!(frame[5], 3);
        assert_eq!(&frame[6..8], &[0, 13]);
        assert_eq!(frame[8], 3);
    }

    // === Decode Tests ===

    #[test]
    fn offer_roundtrip() {
        let offer = Offer::new(9000, "lan dealer");
        assert_eq!(Offer::decode(&offer.encode()), Ok(offer));
    }

    #[test]
    fn request_roundtrip() {
        let request = Request::new(3, "alice").unwrap();
        assert_eq!(Request::decode(&request.encode()), Ok(request));
    }

    #[test]
    fn decision_roundtrip() {
        for decision in [Decision::Hit, Decision::Stand] {
            assert_eq!(Decision::decode(&decision.encode()), Ok(decision));
        }
    }

    #[test]
    fn card_message_roundtrip() {
        let msg = CardMessage::new(RoundResult::NotOver, Card(1, Suit::Heart));
        assert_eq!(CardMessage::decode(&msg.encode()), Ok(msg));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert_eq!(
            Offer::decode(&[0u8; 38]),
            Err(WireError::Length {
                expected: 39,
                actual: 38
            })
        );
        assert_eq!(
            Decision::decode(&[]),
            Err(WireError::Length {
                expected: 10,
                actual: 0
            })
        );
    }

    #[test]
    fn decode_rejects_bad_cookie() {
        let mut frame = Offer::new(9000, "dealer").encode();
        frame[0] = 0xff;
        assert_eq!(
            Offer::decode(&frame),
            Err(WireError::BadCookie(0xffcd_dcba))
        );
    }

    #[test]
    fn decode_rejects_wrong_type_tag() {
        let mut frame = Offer::new(9000, "dealer").encode();
        frame[4] = MSG_TYPE_REQUEST;
        assert_eq!(
            Offer::decode(&frame),
            Err(WireError::BadTypeTag(MSG_TYPE_REQUEST))
        );
    }

    #[test]
    fn decode_rejects_zero_rounds() {
        let mut frame = Request::new(1, "alice").unwrap().encode();
        frame[5] = 0;
        assert_eq!(Request::decode(&frame), Err(WireError::ZeroRounds));
    }

    #[test]
    fn decode_rejects_out_of_range_rank() {
        let mut frame = CardMessage::new(RoundResult::NotOver, Card(5, Suit::Club)).encode();
        frame[7] = 14;
        assert_eq!(
            CardMessage::decode(&frame),
            Err(WireError::RankOutOfRange(14))
        );
        frame[7] = 0;
        assert_eq!(
            CardMessage::decode(&frame),
            Err(WireError::RankOutOfRange(0))
        );
    }

    #[test]
    fn decode_rejects_out_of_range_suit() {
        let mut frame = CardMessage::new(RoundResult::NotOver, Card(5, Suit::Club)).encode();
        frame[8] = 4;
        assert_eq!(
            CardMessage::decode(&frame),
            Err(WireError::SuitOutOfRange(4))
        );
    }

    #[test]
    fn decode_rejects_out_of_range_result() {
        let mut frame = CardMessage::new(RoundResult::NotOver, Card(5, Suit::Club)).encode();
        frame[5] = 9;
        assert_eq!(
            CardMessage::decode(&frame),
            Err(WireError::ResultOutOfRange(9))
        );
    }

    #[test]
    fn decode_rejects_unknown_decision_token() {
        let mut frame = Decision::Hit.encode();
        frame[5..].copy_from_slice(b"Foldd");
        assert_eq!(
            Decision::decode(&frame),
            Err(WireError::UnrecognizedDecision)
        );
    }

    #[test]
    fn decode_name_stops_at_first_nul() {
        let mut frame = Offer::new(9000, "abxcd").encode();
        frame[9] = 0;
        let offer = Offer::decode(&frame).unwrap();
        assert_eq!(offer.server_name, "ab");
    }

    #[test]
    fn decode_name_replaces_invalid_utf8() {
        let mut frame = Offer::new(9000, "dealer").encode();
        frame[7] = 0xff;
        let offer = Offer::decode(&frame).unwrap();
        assert_eq!(offer.server_name, "\u{fffd}ealer");
    }

    // === Stream Tests ===

    #[test]
    fn write_and_read() {
        let (mut client, mut stream) = setup();
        let request = Request::new(5, "alice").unwrap();
        assert!(write_message(&mut stream, &request).is_ok());
        assert!(read_message::<Request, TcpStream>(&mut client).is_ok_and(|r| r == request));
    }

    #[test]
    fn write_and_read_sequence() {
        let (mut client, mut stream) = setup();
        let cards = [
            CardMessage::new(RoundResult::NotOver, Card(2, Suit::Heart)),
            CardMessage::new(RoundResult::NotOver, Card(10, Suit::Club)),
            CardMessage::new(RoundResult::Win, Card(9, Suit::Diamond)),
        ];
        for card in &cards {
            assert!(write_message(&mut stream, card).is_ok());
        }
        for card in &cards {
            assert!(read_message::<CardMessage, TcpStream>(&mut client).is_ok_and(|c| c == *card));
        }
    }

    #[test]
    fn write_and_read_invalid_data() {
        let (mut client, mut stream) = setup();
        assert!(stream.write_all(&[0u8; Offer::WIRE_SIZE]).is_ok());
        assert_eq!(
            read_message::<Offer, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
    }

    #[test]
    fn write_and_read_unexpected_eof() {
        let (mut client, mut stream) = setup();
        let frame = Request::new(2, "bob").unwrap().encode();
        assert!(stream.write_all(&frame[..10]).is_ok());
        drop(stream);
        assert_eq!(
            read_message::<Request, TcpStream>(&mut client).map_err(|e| e.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }
}
