//! The assembled-sequence representation the byte parser hands to the
//! function dispatcher, plus `FunctionSelector`, the lookup key the
//! dispatcher indexes by (category + leader + intermediates + final
//! byte — deliberately ignoring parameter *values*, since those select
//! behavior within a function, not which function runs).

pub const MAX_PARAMS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceCategory {
    Escape,
    Csi,
    Osc,
    Dcs,
    Apc,
    Pm,
}

/// CSI/DCS parameters as vte hands them: a flat list of parameter
/// groups, each possibly carrying colon-separated sub-parameters (e.g.
/// SGR's `38:2:255:0:0`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList(pub Vec<Vec<u16>>);

impl ParamList {
    pub fn from_vte(params: &vte::Params) -> Self {
        let mut out = Vec::with_capacity(MAX_PARAMS);
        for group in params.iter().take(MAX_PARAMS) {
            out.push(group.to_vec());
        }
        ParamList(out)
    }

    pub fn get(&self, idx: usize, default: u16) -> u16 {
        self.0
            .get(idx)
            .and_then(|g| g.first().copied())
            .filter(|&v| v != 0 || default == 0)
            .unwrap_or(default)
    }

    /// Like `get`, but `0` is a legitimate explicit value (used by
    /// params where 0 and "absent" mean different things, e.g. SGR
    /// color indices).
    pub fn get_raw(&self, idx: usize, default: u16) -> u16 {
        match self.0.get(idx).and_then(|g| g.first().copied()) {
            Some(v) => v,
            None => default,
        }
    }

    pub fn subparams(&self, idx: usize) -> &[u16] {
        self.0.get(idx).map(|g| g.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn all_numbers(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().map(|g| g.first().copied().unwrap_or(0))
    }
}

/// A fully assembled control sequence, built by the byte parser layer
/// from vte's `Perform` callbacks before being handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub category: SequenceCategory,
    /// The private-marker leader byte (`?`, `>`, `=`, ...), if any.
    pub leader: Option<u8>,
    pub params: ParamList,
    pub intermediates: Vec<u8>,
    pub final_byte: u8,
    /// Raw payload for OSC/DCS/APC/PM sequences (the string body).
    pub data: Vec<u8>,
}

/// The identity of "which function" a sequence invokes, independent of
/// its parameter values. This is what the dispatcher's lookup table is
/// keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSelector {
    pub category: SequenceCategory,
    pub leader: Option<u8>,
    pub intermediates: Vec<u8>,
    pub final_byte: u8,
}

impl From<&Sequence> for FunctionSelector {
    fn from(seq: &Sequence) -> Self {
        FunctionSelector {
            category: seq.category,
            leader: seq.leader,
            intermediates: seq.intermediates.clone(),
            final_byte: seq.final_byte,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_list_get_applies_default_for_zero() {
        let params = ParamList(vec![vec![0]]);
        assert_eq!(params.get(0, 1), 1);
        assert_eq!(params.get_raw(0, 1), 0);
    }

    #[test]
    fn param_list_get_missing_index_uses_default() {
        let params = ParamList(vec![]);
        assert_eq!(params.get(3, 7), 7);
    }

    #[test]
    fn function_selector_ignores_param_values() {
        let a = Sequence {
            category: SequenceCategory::Csi,
            leader: None,
            params: ParamList(vec![vec![1]]),
            intermediates: vec![],
            final_byte: b'm',
            data: vec![],
        };
        let b = Sequence { params: ParamList(vec![vec![42]]), ..a.clone() };
        assert_eq!(FunctionSelector::from(&a), FunctionSelector::from(&b));
    }
}
