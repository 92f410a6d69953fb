//! Character-set designation (`ESC ( X`, `ESC ) X`, ...) and invocation
//! (`SI`/`SO`/`SS2`/`SS3`) state, plus the emoji/ambiguous-width policy
//! applied when measuring a printed grapheme.

/// The charsets this core can designate into G0-G3. The twelve national
/// replacement character sets plus DEC Special Graphics each substitute
/// a handful of codepoints in the 0x23-0x7e range over US-ASCII;
/// `DecSupplemental`/`DecSupplementalGraphics`/`DecTechnical`/`Italian`/
/// `Portuguese` are recognized so designation sequences don't fall
/// through to "unknown" but are otherwise ASCII passthrough — no pack
/// grounding names their substitution tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetId {
    Ascii,
    DecSpecialGraphics,
    DecSupplemental,
    DecSupplementalGraphics,
    DecTechnical,
    British,
    Dutch,
    Finnish,
    French,
    FrenchCanadian,
    German,
    Italian,
    NorwegianDanish,
    Portuguese,
    Spanish,
    Swedish,
    Swiss,
}

impl CharsetId {
    pub fn from_designator(intermediate: u8, final_byte: u8) -> Option<Self> {
        // intermediate distinguishes 94-charsets ( ) * + from 96-charsets - . / ;
        // here we only care about the final byte selecting which set.
        let _ = intermediate;
        Some(match final_byte {
            b'B' => CharsetId::Ascii,
            b'0' => CharsetId::DecSpecialGraphics,
            b'<' => CharsetId::DecSupplemental,
            b'%' if intermediate == b'%' => CharsetId::DecSupplementalGraphics,
            b'>' => CharsetId::DecTechnical,
            b'A' => CharsetId::British,
            b'4' => CharsetId::Dutch,
            b'C' | b'5' => CharsetId::Finnish,
            b'R' => CharsetId::French,
            b'Q' => CharsetId::FrenchCanadian,
            b'K' => CharsetId::German,
            b'Y' => CharsetId::Italian,
            b'E' | b'6' => CharsetId::NorwegianDanish,
            b'%' => CharsetId::Portuguese,
            b'Z' => CharsetId::Spanish,
            b'H' | b'7' => CharsetId::Swedish,
            b'=' => CharsetId::Swiss,
            _ => return None,
        })
    }

    /// Translates a single ASCII byte through this charset's mapping.
    /// Non-ASCII input and non-mapped charsets pass through unchanged.
    pub fn translate(self, ch: char) -> char {
        match self {
            CharsetId::DecSpecialGraphics => dec_special_graphics(ch),
            CharsetId::British => british(ch),
            CharsetId::Dutch => dutch(ch),
            CharsetId::Finnish => finnish(ch),
            CharsetId::French => french(ch),
            CharsetId::FrenchCanadian => french_canadian(ch),
            CharsetId::German => german(ch),
            CharsetId::NorwegianDanish => norwegian_danish(ch),
            CharsetId::Spanish => spanish(ch),
            CharsetId::Swedish => swedish(ch),
            CharsetId::Swiss => swiss(ch),
            _ => ch,
        }
    }
}

fn dec_special_graphics(ch: char) -> char {
    match ch {
        '`' => '\u{25c6}',
        'a' => '\u{2592}',
        'b' => '\u{2409}',
        'c' => '\u{240c}',
        'd' => '\u{240d}',
        'e' => '\u{240a}',
        'f' => '\u{00b0}',
        'g' => '\u{00b1}',
        'h' => '\u{2424}',
        'i' => '\u{240b}',
        'j' => '\u{2518}',
        'k' => '\u{2510}',
        'l' => '\u{250c}',
        'm' => '\u{2514}',
        'n' => '\u{253c}',
        'o' => '\u{23ba}',
        'p' => '\u{23bb}',
        'q' => '\u{2500}',
        'r' => '\u{23bc}',
        's' => '\u{23bd}',
        't' => '\u{251c}',
        'u' => '\u{2524}',
        'v' => '\u{2534}',
        'w' => '\u{252c}',
        'x' => '\u{2502}',
        'y' => '\u{2264}',
        'z' => '\u{2265}',
        '{' => '\u{03c0}',
        '|' => '\u{2260}',
        '}' => '\u{00a3}',
        '~' => '\u{00b7}',
        other => other,
    }
}

/// ESC ( A — http://vt100.net/docs/vt220-rm/table2-5.html
fn british(ch: char) -> char {
    match ch {
        '#' => '\u{00a3}', // £
        other => other,
    }
}

/// ESC ( K
fn german(ch: char) -> char {
    match ch {
        '@' => '\u{00a7}',  // §
        '[' => '\u{00c4}',  // Ä
        '\\' => '\u{00d6}', // Ö
        ']' => '\u{00dc}',  // Ü
        '{' => '\u{00e4}',  // ä
        '|' => '\u{00f6}',  // ö
        '}' => '\u{00fc}',  // ü
        '~' => '\u{00df}',  // ß
        other => other,
    }
}

/// ESC ( 4
fn dutch(ch: char) -> char {
    match ch {
        '#' => '\u{00a3}',  // £
        '@' => '\u{00be}',  // ¾
        '\\' => '\u{00bd}', // ½
        ']' => '|',
        '{' => '\u{00a8}', // ¨
        '|' => 'f',
        '}' => '\u{00bc}', // ¼
        '~' => '\u{00b4}', // ´
        other => other,
    }
}

/// ESC ( C, ESC ( 5
fn finnish(ch: char) -> char {
    match ch {
        '[' => '\u{00c4}',  // Ä
        '\\' => '\u{00d6}', // Ö
        ']' => '\u{00c5}',  // Å
        '^' => '\u{00dc}',  // Ü
        '`' => '\u{00e9}',  // é
        '{' => '\u{00e4}',  // ä
        '|' => '\u{00f6}',  // ö
        '}' => '\u{00e5}',  // å
        '~' => '\u{00fc}',  // ü
        other => other,
    }
}

/// ESC ( R
fn french(ch: char) -> char {
    match ch {
        '#' => '\u{00a3}',  // £
        '@' => '\u{00e0}',  // à
        '[' => '\u{00b0}',  // °
        '\\' => '\u{00e7}', // ç
        ']' => '\u{00a7}',  // §
        '{' => '\u{00e9}',  // é
        '|' => '\u{00f9}',  // ù
        '}' => '\u{00e8}',  // è
        '~' => '\u{00a8}',  // ¨
        other => other,
    }
}

/// ESC ( Q
fn french_canadian(ch: char) -> char {
    match ch {
        '@' => '\u{00e0}',  // à
        '[' => '\u{00e2}',  // â
        '\\' => '\u{00e7}', // ç
        ']' => '\u{00ea}',  // ê
        '^' => '\u{00ee}',  // î
        '`' => '\u{00f4}',  // ô
        '{' => '\u{00e9}',  // é
        '|' => '\u{00f9}',  // ù
        '}' => '\u{00e8}',  // è
        '~' => '\u{00fb}',  // û
        other => other,
    }
}

/// ESC ( E, ESC ( 6
fn norwegian_danish(ch: char) -> char {
    match ch {
        '@' => '\u{00c4}',  // Ä
        '[' => '\u{00c6}',  // Æ
        '\\' => '\u{00d8}', // Ø
        ']' => '\u{00c5}',  // Å
        '^' => '\u{00dc}',  // Ü
        '`' => '\u{00e4}',  // ä
        '{' => '\u{00e6}',  // æ
        '|' => '\u{00f8}',  // ø
        '}' => '\u{00e5}',  // å
        '~' => '\u{00fc}',  // ü
        other => other,
    }
}

/// ESC ( Z
fn spanish(ch: char) -> char {
    match ch {
        '#' => '\u{00a3}',  // £
        '@' => '\u{00a7}',  // §
        '[' => '\u{00a1}',  // ¡
        '\\' => '\u{00d1}', // Ñ
        ']' => '\u{00bf}',  // ¿
        '{' => '\u{00b0}',  // °
        '|' => '\u{00f1}',  // ñ
        '}' => '\u{00e7}',  // ç
        other => other,
    }
}

/// ESC ( H, ESC ( 7
fn swedish(ch: char) -> char {
    match ch {
        '@' => '\u{00c9}',  // É
        '[' => '\u{00c4}',  // Ä
        '\\' => '\u{00d6}', // Ö
        ']' => '\u{00c5}',  // Å
        '^' => '\u{00dc}',  // Ü
        '`' => '\u{00e9}',  // é
        '{' => '\u{00e4}',  // ä
        '|' => '\u{00f6}',  // ö
        '}' => '\u{00e5}',  // å
        '~' => '\u{00fc}',  // ü
        other => other,
    }
}

/// ESC ( =
fn swiss(ch: char) -> char {
    match ch {
        '#' => '\u{00f9}',  // ù
        '@' => '\u{00e0}',  // à
        '[' => '\u{00e9}',  // é
        '\\' => '\u{00e7}', // ç
        ']' => '\u{00ea}',  // ê
        '^' => '\u{00ee}',  // î
        '_' => '\u{00e8}',  // è
        '`' => '\u{00f4}',  // ô
        '{' => '\u{00e4}',  // ä
        '|' => '\u{00f6}',  // ö
        '}' => '\u{00fc}',  // ü
        '~' => '\u{00fb}',  // û
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GSet {
    G0,
    G1,
    G2,
    G3,
}

/// How to measure a grapheme whose East-Asian-Width is "Ambiguous", or
/// whose presentation depends on a variation selector (VS15 text vs
/// VS16 emoji). `Narrow`/`Wide` pin ambiguous-width characters; `Auto`
/// defers entirely to `unicode-width`'s judgment call and additionally
/// lets an explicit VS16 (U+FE0F) force width 2 / VS15 (U+FE0E) force
/// width 1 on the preceding codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthPolicy {
    #[default]
    Auto,
    Narrow,
    Wide,
}

pub const VARIATION_SELECTOR_TEXT: char = '\u{FE0E}';
pub const VARIATION_SELECTOR_EMOJI: char = '\u{FE0F}';

/// Per-G-set designations plus which one is currently invoked into GL,
/// and the one-shot SS2/SS3 override for the next single character.
#[derive(Debug, Clone)]
pub struct CharsetState {
    g: [CharsetId; 4],
    locked: GSet,
    single_shift: Option<GSet>,
    pub width_policy: WidthPolicy,
}

impl Default for CharsetState {
    fn default() -> Self {
        Self {
            g: [CharsetId::Ascii; 4],
            locked: GSet::G0,
            single_shift: None,
            width_policy: WidthPolicy::Auto,
        }
    }
}

impl CharsetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn designate(&mut self, set: GSet, charset: CharsetId) {
        self.g[set as usize] = charset;
    }

    /// SI (Shift In, `\x0f`) — lock GL to G0.
    pub fn shift_in(&mut self) {
        self.locked = GSet::G0;
    }

    /// SO (Shift Out, `\x0e`) — lock GL to G1.
    pub fn shift_out(&mut self) {
        self.locked = GSet::G1;
    }

    /// SS2 (`ESC N`) / SS3 (`ESC O`) — invoke G2/G3 for exactly the next
    /// printed character.
    pub fn single_shift(&mut self, set: GSet) {
        self.single_shift = Some(set);
    }

    pub fn active(&self) -> CharsetId {
        let set = self.single_shift.unwrap_or(self.locked);
        self.g[set as usize]
    }

    pub fn translate(&mut self, ch: char) -> char {
        let out = self.active().translate(ch);
        self.single_shift = None;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dec_special_graphics_maps_box_drawing() {
        let mut cs = CharsetState::new();
        cs.designate(GSet::G0, CharsetId::DecSpecialGraphics);
        assert_eq!(cs.translate('q'), '\u{2500}');
        assert_eq!(cs.translate('j'), '\u{2518}');
    }

    #[test]
    fn shift_out_switches_to_g1() {
        let mut cs = CharsetState::new();
        cs.designate(GSet::G1, CharsetId::DecSpecialGraphics);
        cs.shift_out();
        assert_eq!(cs.translate('q'), '\u{2500}');
        cs.shift_in();
        assert_eq!(cs.translate('q'), 'q');
    }

    #[test]
    fn single_shift_applies_once() {
        let mut cs = CharsetState::new();
        cs.designate(GSet::G2, CharsetId::DecSpecialGraphics);
        cs.single_shift(GSet::G2);
        assert_eq!(cs.translate('q'), '\u{2500}');
        assert_eq!(cs.translate('q'), 'q');
    }

    #[test]
    fn german_charset_substitutes_umlauts() {
        let mut cs = CharsetState::new();
        cs.designate(GSet::G0, CharsetId::German);
        assert_eq!(cs.translate('@'), '\u{00a7}'); // §
        assert_eq!(cs.translate('['), '\u{00c4}'); // Ä
        assert_eq!(cs.translate('m'), 'm'); // unmapped byte passes through
    }

    #[test]
    fn british_charset_substitutes_pound_sign() {
        let mut cs = CharsetState::new();
        cs.designate(GSet::G0, CharsetId::British);
        assert_eq!(cs.translate('#'), '\u{00a3}'); // £
        assert_eq!(cs.translate('A'), 'A');
    }

    #[test]
    fn designator_parses_common_finals() {
        assert_eq!(CharsetId::from_designator(0, b'B'), Some(CharsetId::Ascii));
        assert_eq!(
            CharsetId::from_designator(0, b'0'),
            Some(CharsetId::DecSpecialGraphics)
        );
        assert_eq!(CharsetId::from_designator(0, b'Z'), None.or(Some(CharsetId::Spanish)));
    }
}
