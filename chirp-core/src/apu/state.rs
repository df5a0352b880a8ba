// Little-endian cursor pair for the fixed-size save state. The caller checks
// the buffer length up front, so neither side can run out of room on a
// correctly sized buffer; out-of-bounds accesses write nothing and read zero.

use crate::apu::timing::PhaseCounter;

pub struct Writer<'a> {
    buf: &'a mut [u8],
    position: usize,
}

impl<'a> Writer<'a> {
    pub const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, position: 0 }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub fn write_all(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if let Some(dst) = self.buf.get_mut(self.position..end) {
            dst.copy_from_slice(bytes);
        }
        self.position = end;
    }

    pub fn write_bool(&mut self, val: bool) {
        self.write_u8(u8::from(val));
    }

    pub fn write_i16(&mut self, val: i16) {
        self.write_all(&val.to_le_bytes());
    }

    pub fn write_phase(&mut self, phase: PhaseCounter) {
        self.write_u32(phase.counter());
        self.write_u32(phase.inc());
    }

    pub fn write_u16(&mut self, val: u16) {
        self.write_all(&val.to_le_bytes());
    }

    pub fn write_u32(&mut self, val: u32) {
        self.write_all(&val.to_le_bytes());
    }

    pub fn write_u8(&mut self, val: u8) {
        self.write_all(&[val]);
    }

    // pads with zeroes up to `position`
    pub fn write_zeroes_until(&mut self, position: usize) {
        while self.position < position {
            self.write_u8(0);
        }
    }
}

pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0; N];
        self.read_exact(&mut out);
        out
    }

    pub fn read_bool(&mut self) -> bool {
        self.read_u8() != 0
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) {
        let end = self.position + buf.len();
        if let Some(src) = self.data.get(self.position..end) {
            buf.copy_from_slice(src);
        }
        self.position = end;
    }

    pub fn read_i16(&mut self) -> i16 {
        i16::from_le_bytes(self.read_array())
    }

    pub fn read_phase(&mut self) -> PhaseCounter {
        let counter = self.read_u32();
        let inc = self.read_u32();
        PhaseCounter::from_raw(counter, inc)
    }

    pub fn read_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.read_array())
    }

    pub fn read_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.read_array())
    }

    pub fn read_u8(&mut self) -> u8 {
        let val = self.data.get(self.position).copied().unwrap_or(0);
        self.position += 1;
        val
    }

    pub const fn skip_until(&mut self, position: usize) {
        if self.position < position {
            self.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_little_endian() {
        let mut buf = [0; 7];
        let mut writer = Writer::new(&mut buf);
        writer.write_u16(0x1234);
        writer.write_u32(0xDEAD_BEEF);
        writer.write_bool(true);

        assert_eq!(writer.position(), 7);
        assert_eq!(buf, [0x34, 0x12, 0xEF, 0xBE, 0xAD, 0xDE, 1]);
    }

    #[test]
    fn test_reader_past_end_yields_zero() {
        let data = [0xFF];
        let mut reader = Reader::new(&data);

        assert_eq!(reader.read_u8(), 0xFF);
        assert_eq!(reader.read_u16(), 0);
        assert!(!reader.read_bool());
    }

    #[test]
    fn test_padding() {
        let mut buf = [0xAA; 4];
        let mut writer = Writer::new(&mut buf);
        writer.write_u8(1);
        writer.write_zeroes_until(4);

        assert_eq!(buf, [1, 0, 0, 0]);
    }
}
