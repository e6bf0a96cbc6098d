use byteorder::{BE, ReadBytesExt, WriteBytesExt};
use std::io;

use super::{
    ConstPackedSizeBytes, HeaderByte, Packet, ReadBytes, ReadFromBytes, ReferenceIdentifier,
    ShortFormat, Stratum, TimestampFormat, WriteBytes, WriteToBytes,
};
use crate::error::ParseError;

// Writer implementations.

impl<W> WriteBytes for W
where
    W: WriteBytesExt,
{
    fn write_bytes<P: WriteToBytes>(&mut self, protocol: P) -> io::Result<()> {
        protocol.write_to_bytes(self)
    }
}

impl<P> WriteToBytes for &P
where
    P: WriteToBytes,
{
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()> {
        (*self).write_to_bytes(writer)
    }
}

impl WriteToBytes for ShortFormat {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u16::<BE>(self.seconds)?;
        writer.write_u16::<BE>(self.fraction)?;
        Ok(())
    }
}

impl WriteToBytes for TimestampFormat {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<BE>(self.seconds)?;
        writer.write_u32::<BE>(self.fraction)?;
        Ok(())
    }
}

impl WriteToBytes for Stratum {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.0)?;
        Ok(())
    }
}

impl WriteToBytes for ReferenceIdentifier {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }
}

impl WriteToBytes for HeaderByte {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.0)?;
        Ok(())
    }
}

impl WriteToBytes for Packet {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_bytes(HeaderByte::new(
            self.leap_indicator,
            self.version,
            self.mode,
        ))?;
        writer.write_bytes(self.stratum)?;
        writer.write_i8(self.poll)?;
        writer.write_i8(self.precision)?;
        writer.write_bytes(self.root_delay)?;
        writer.write_bytes(self.root_dispersion)?;
        writer.write_bytes(self.reference_id)?;
        writer.write_bytes(self.reference_timestamp)?;
        writer.write_bytes(self.origin_timestamp)?;
        writer.write_bytes(self.receive_timestamp)?;
        writer.write_bytes(self.transmit_timestamp)?;
        Ok(())
    }
}

// Reader implementations.

impl<R> ReadBytes for R
where
    R: ReadBytesExt,
{
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P> {
        P::read_from_bytes(self)
    }
}

impl ReadFromBytes for ShortFormat {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let seconds = reader.read_u16::<BE>()?;
        let fraction = reader.read_u16::<BE>()?;
        Ok(ShortFormat { seconds, fraction })
    }
}

impl ReadFromBytes for TimestampFormat {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let seconds = reader.read_u32::<BE>()?;
        let fraction = reader.read_u32::<BE>()?;
        Ok(TimestampFormat { seconds, fraction })
    }
}

impl ReadFromBytes for Stratum {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        Ok(Stratum(reader.read_u8()?))
    }
}

impl ReadFromBytes for ReferenceIdentifier {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let mut raw = [0u8; 4];
        reader.read_exact(&mut raw)?;
        Ok(ReferenceIdentifier(raw))
    }
}

impl ReadFromBytes for HeaderByte {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        Ok(HeaderByte(reader.read_u8()?))
    }
}

impl ReadFromBytes for Packet {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let header = reader.read_bytes::<HeaderByte>()?;
        let stratum = reader.read_bytes::<Stratum>()?;
        let poll = reader.read_i8()?;
        let precision = reader.read_i8()?;
        let root_delay = reader.read_bytes()?;
        let root_dispersion = reader.read_bytes()?;
        let reference_id = reader.read_bytes()?;
        let reference_timestamp = reader.read_bytes()?;
        let origin_timestamp = reader.read_bytes()?;
        let receive_timestamp = reader.read_bytes()?;
        let transmit_timestamp = reader.read_bytes()?;
        Ok(Packet {
            leap_indicator: header.leap(),
            version: header.version(),
            mode: header.mode(),
            stratum,
            poll,
            precision,
            root_delay,
            root_dispersion,
            reference_id,
            reference_timestamp,
            origin_timestamp,
            receive_timestamp,
            transmit_timestamp,
        })
    }
}

// Fixed-size buffer helpers.

impl Packet {
    /// Serialize into a 48-byte buffer in network byte order.
    ///
    /// Writing into a correctly sized array cannot run out of room, so an error here means the
    /// packed-size constant and the writer disagree.
    pub fn encode(&self) -> io::Result<[u8; Packet::PACKED_SIZE_BYTES]> {
        let mut buf = [0u8; Packet::PACKED_SIZE_BYTES];
        (&mut buf[..]).write_bytes(self)?;
        Ok(buf)
    }

    /// Parse a packet from a buffer that must be exactly 48 bytes long.
    pub fn decode(buf: &[u8]) -> Result<Packet, ParseError> {
        if buf.len() != Packet::PACKED_SIZE_BYTES {
            return Err(ParseError::LengthMismatch {
                expected: Packet::PACKED_SIZE_BYTES,
                actual: buf.len(),
            });
        }
        (&buf[..])
            .read_bytes::<Packet>()
            .map_err(|_| ParseError::Truncated { field: "packet" })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{LeapIndicator, Mode, Version};
    use std::io::Cursor;

    fn sample_packet() -> Packet {
        Packet {
            leap_indicator: LeapIndicator::AddSecond,
            version: Version::V3,
            mode: Mode::Server,
            stratum: Stratum(2),
            poll: 6,
            precision: -20,
            root_delay: ShortFormat {
                seconds: 0,
                fraction: 0x0200,
            },
            root_dispersion: ShortFormat {
                seconds: 1,
                fraction: 0x4000,
            },
            reference_id: ReferenceIdentifier([10, 0, 0, 1]),
            reference_timestamp: TimestampFormat {
                seconds: 3_913_055_990,
                fraction: 7,
            },
            origin_timestamp: TimestampFormat {
                seconds: 0xDEAD_BEEF,
                fraction: 0xCAFE_BABE,
            },
            receive_timestamp: TimestampFormat {
                seconds: 3_913_056_000,
                fraction: 0x8000_0000,
            },
            transmit_timestamp: TimestampFormat {
                seconds: 3_913_056_000,
                fraction: 0x8000_1000,
            },
        }
    }

    // ── ShortFormat ──────────────────────────────────────────────────

    #[test]
    fn short_format_read_too_short() {
        let buf = [0u8; 3];
        let result = Cursor::new(&buf[..]).read_bytes::<ShortFormat>();
        assert!(result.is_err());
    }

    // ── TimestampFormat ─────────────────────────────────────────────

    #[test]
    fn timestamp_is_big_endian() {
        let ts = TimestampFormat {
            seconds: 0x0102_0304,
            fraction: 0x0506_0708,
        };
        let mut buf = Vec::new();
        buf.write_bytes(ts).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    // ── Packet ──────────────────────────────────────────────────────

    #[test]
    fn encode_field_offsets() {
        let buf = sample_packet().encode().unwrap();
        // LI=1, VN=3, Mode=4.
        assert_eq!(buf[0], 0b01_011_100);
        assert_eq!(buf[1], 2);
        assert_eq!(buf[2], 6);
        assert_eq!(buf[3], (-20i8) as u8);
        assert_eq!(&buf[4..8], &[0, 0, 0x02, 0x00]);
        assert_eq!(&buf[8..12], &[0, 1, 0x40, 0x00]);
        assert_eq!(&buf[12..16], &[10, 0, 0, 1]);
        assert_eq!(&buf[24..32], &[0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE]);
    }

    #[test]
    fn decode_reproduces_encoded_packet() {
        let pkt = sample_packet();
        let buf = pkt.encode().unwrap();
        assert_eq!(Packet::decode(&buf).unwrap(), pkt);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let buf = [0u8; 47];
        assert_eq!(
            Packet::decode(&buf),
            Err(ParseError::LengthMismatch {
                expected: 48,
                actual: 47
            })
        );
    }

    #[test]
    fn decode_rejects_long_buffer() {
        let buf = [0u8; 68];
        assert!(matches!(
            Packet::decode(&buf),
            Err(ParseError::LengthMismatch { actual: 68, .. })
        ));
    }

    #[test]
    fn stream_read_stops_at_48_bytes() {
        let mut bytes = sample_packet().encode().unwrap().to_vec();
        bytes.extend_from_slice(&[0xAA; 4]);
        let mut cursor = Cursor::new(&bytes[..]);
        let pkt: Packet = cursor.read_bytes().unwrap();
        assert_eq!(pkt, sample_packet());
        assert_eq!(cursor.position(), 48);
    }

    #[test]
    fn stream_read_truncated_packet_errors() {
        let bytes = sample_packet().encode().unwrap();
        let result = Cursor::new(&bytes[..40]).read_bytes::<Packet>();
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
