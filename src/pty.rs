//! The PTY boundary. This core never spawns or manages an OS process
//! itself — an embedder constructs something that implements
//! `PtySource` (backed by `portable-pty`, a mock, a network transport,
//! whatever fits) and hands it to the facade, which only ever reads
//! bytes out and writes bytes in.

use crate::error::Result;

pub trait PtySource: Send {
    /// Non-blocking best-effort read; returns `Ok(0)` when nothing is
    /// currently available rather than blocking, so the facade's
    /// execution-mode loop stays responsive to mode changes.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn write(&mut self, data: &[u8]) -> Result<usize>;

    fn resize(&mut self, rows: u16, cols: u16) -> Result<()>;

    /// `None` while the child is still running.
    fn try_wait(&mut self) -> Result<Option<i32>>;
}

#[cfg(test)]
pub(crate) struct MockPty {
    pub inbound: std::collections::VecDeque<u8>,
    pub outbound: Vec<u8>,
    pub exit_code: Option<i32>,
    pub last_resize: Option<(u16, u16)>,
}

#[cfg(test)]
impl MockPty {
    pub fn new(inbound: &[u8]) -> Self {
        Self {
            inbound: inbound.iter().copied().collect(),
            outbound: Vec::new(),
            exit_code: None,
            last_resize: None,
        }
    }
}

#[cfg(test)]
impl PtySource for MockPty {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.inbound.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.outbound.extend_from_slice(data);
        Ok(data.len())
    }

    fn resize(&mut self, rows: u16, cols: u16) -> Result<()> {
        self.last_resize = Some((rows, cols));
        Ok(())
    }

    fn try_wait(&mut self) -> Result<Option<i32>> {
        Ok(self.exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_pty_round_trips_reads_and_writes() {
        let mut pty = MockPty::new(b"hi");
        let mut buf = [0u8; 4];
        let n = pty.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hi");
        pty.write(b"out").unwrap();
        assert_eq!(pty.outbound, b"out");
    }
}
