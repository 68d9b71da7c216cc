//! Report payload staging

/// Byte-wise builder for staging report payloads before transmission.
///
/// Invariant restored from the original driver: the staged buffer is
/// always fully initialized and its length equals the declared wire
/// length, so no transmission can ever cover stale or out-of-range
/// bytes.
pub struct ReportBuilder {
    buffer: Vec<u8>,
}

impl ReportBuilder {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    /// Append `len` bytes of the ascending index-keyed pattern
    /// (`byte i == (offset + i) mod 256`).
    pub fn write_index_fill(&mut self, offset: usize, len: usize) -> &mut Self {
        self.buffer
            .extend((0..len).map(|i| ((offset + i) % 256) as u8));
        self
    }

    /// Zero-pad the buffer up to `len`; a no-op when already longer.
    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        while self.buffer.len() < len {
            self.buffer.push(0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(64)
    }
}
