pub mod sequence;

pub use sequence::{FunctionSelector, ParamList, Sequence, SequenceCategory};

/// What the byte-parser layer hands control to once it has assembled a
/// printable character or a complete sequence. The terminal facade
/// implements this and forwards to `dispatch`.
pub trait SequenceSink {
    fn print(&mut self, ch: char);
    fn execute_c0(&mut self, byte: u8);
    fn dispatch(&mut self, seq: Sequence);
    /// DCS payload delivered incrementally (used by Sixel, which must
    /// stream rather than buffer an unbounded image).
    fn dcs_put(&mut self, byte: u8);
    fn dcs_hook(&mut self, seq: Sequence);
    fn dcs_unhook(&mut self);
}

/// Adapts vte's `Perform` callbacks into assembled `Sequence` values.
/// This is the "Sequence Assembler" layer: vte drives the low-level
/// byte state machine (Ground/Escape/CSI/DCS/OSC), and this adapter is
/// the only thing that touches vte's `Params`/intermediates directly —
/// everything downstream operates on `Sequence`/`FunctionSelector`.
struct PerformAdapter<'a, S: SequenceSink> {
    sink: &'a mut S,
    in_dcs: bool,
}

fn leader_byte(intermediates: &[u8]) -> (Option<u8>, Vec<u8>) {
    match intermediates.first() {
        Some(&b @ (b'?' | b'>' | b'=' | b'<')) => (Some(b), intermediates[1..].to_vec()),
        _ => (None, intermediates.to_vec()),
    }
}

impl<'a, S: SequenceSink> vte::Perform for PerformAdapter<'a, S> {
    fn print(&mut self, c: char) {
        self.sink.print(c);
    }

    fn execute(&mut self, byte: u8) {
        self.sink.execute_c0(byte);
    }

    fn hook(&mut self, params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        let (leader, intermediates) = leader_byte(intermediates);
        self.in_dcs = true;
        self.sink.dcs_hook(Sequence {
            category: SequenceCategory::Dcs,
            leader,
            params: ParamList::from_vte(params),
            intermediates,
            final_byte: action as u8,
            data: Vec::new(),
        });
    }

    fn put(&mut self, byte: u8) {
        self.sink.dcs_put(byte);
    }

    fn unhook(&mut self) {
        self.in_dcs = false;
        self.sink.dcs_unhook();
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        let data = params.join(&b';');
        self.sink.dispatch(Sequence {
            category: SequenceCategory::Osc,
            leader: None,
            params: ParamList::default(),
            intermediates: Vec::new(),
            final_byte: 0,
            data,
        });
    }

    fn csi_dispatch(&mut self, params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        let (leader, intermediates) = leader_byte(intermediates);
        self.sink.dispatch(Sequence {
            category: SequenceCategory::Csi,
            leader,
            params: ParamList::from_vte(params),
            intermediates,
            final_byte: action as u8,
            data: Vec::new(),
        });
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        let (leader, intermediates) = leader_byte(intermediates);
        self.sink.dispatch(Sequence {
            category: SequenceCategory::Escape,
            leader,
            params: ParamList::default(),
            intermediates,
            final_byte: byte,
            data: Vec::new(),
        });
    }
}

/// Owns the underlying `vte::Parser` byte-level state machine. Feeding
/// bytes through `advance` drives `SequenceSink` callbacks on the
/// caller-supplied sink synchronously — the parser itself holds no
/// terminal state, only the byte-decoding state machine.
pub struct ByteParser {
    inner: vte::Parser,
}

impl ByteParser {
    pub fn new() -> Self {
        Self { inner: vte::Parser::new() }
    }

    pub fn advance<S: SequenceSink>(&mut self, sink: &mut S, bytes: &[u8]) {
        let mut adapter = PerformAdapter { sink, in_dcs: false };
        for &byte in bytes {
            self.inner.advance(&mut adapter, byte);
        }
    }
}

impl Default for ByteParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        printed: String,
        sequences: Vec<Sequence>,
    }

    impl SequenceSink for RecordingSink {
        fn print(&mut self, ch: char) {
            self.printed.push(ch);
        }
        fn execute_c0(&mut self, _byte: u8) {}
        fn dispatch(&mut self, seq: Sequence) {
            self.sequences.push(seq);
        }
        fn dcs_put(&mut self, _byte: u8) {}
        fn dcs_hook(&mut self, seq: Sequence) {
            self.sequences.push(seq);
        }
        fn dcs_unhook(&mut self) {}
    }

    #[test]
    fn plain_text_is_printed() {
        let mut parser = ByteParser::new();
        let mut sink = RecordingSink::default();
        parser.advance(&mut sink, b"hello");
        assert_eq!(sink.printed, "hello");
    }

    #[test]
    fn csi_sequence_extracts_private_leader() {
        let mut parser = ByteParser::new();
        let mut sink = RecordingSink::default();
        parser.advance(&mut sink, b"\x1b[?25h");
        assert_eq!(sink.sequences.len(), 1);
        let seq = &sink.sequences[0];
        assert_eq!(seq.leader, Some(b'?'));
        assert_eq!(seq.final_byte, b'h');
        assert_eq!(seq.params.get(0, 0), 25);
    }

    #[test]
    fn sgr_with_colon_subparams_are_preserved() {
        let mut parser = ByteParser::new();
        let mut sink = RecordingSink::default();
        parser.advance(&mut sink, b"\x1b[38:2:255:0:0m");
        let seq = &sink.sequences[0];
        assert_eq!(seq.params.subparams(0), &[38, 2, 255, 0, 0]);
    }
}
