/// Receive buffer that hands out complete `\n` terminated lines.
#[derive(Debug, Default)]
pub struct Buffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer {
            data: Vec::with_capacity(100),
            read_pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() - self.read_pos
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if self.read_pos == self.data.len() {
            self.clear();
        }
        self.data.extend_from_slice(bytes);
    }

    /// Removes and returns the next line, including its `\n`,
    /// or None if no complete line has been received yet.
    pub fn take_line(&mut self) -> Option<Vec<u8>> {
        let pending = &self.data[self.read_pos..];
        let end = pending.iter().position(|&b| b == b'\n')? + 1;
        let line = pending[..end].to_vec();
        self.consume(end);
        Some(line)
    }

    /// Removes and returns everything buffered, complete line or not.
    pub fn take_all(&mut self) -> Vec<u8> {
        let rest = self.data[self.read_pos..].to_vec();
        self.clear();
        rest
    }

    fn consume(&mut self, len: usize) {
        debug_assert!(len <= self.len());
        self.read_pos += len;
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.read_pos = 0;
    }
}
