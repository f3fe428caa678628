//! Context-dependent macros: `##_`, `##$`, `##{` and `##}`
//!
//! These have no stored definition. Their value comes from where they occur:
//! the current line, the pseudo-random sequence, or how many braces have
//! been seen so far.

/// Deterministic pseudo-random sequence behind `##$`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PseudoRandom {
    seed: u32,
}

impl PseudoRandom {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Advance the seed and return the new value
    pub fn next_value(&mut self) -> u32 {
        self.seed = self
            .seed
            .wrapping_mul(1103515245)
            .wrapping_add(12345)
            & 0x7fff_ffff;
        self.seed
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

/// Cumulative brace counts over fully processed lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BraceCounters {
    pub open: usize,
    pub close: usize,
}

impl BraceCounters {
    pub fn update(&mut self, line: &str) {
        for ch in line.chars() {
            match ch {
                '{' => self.open += 1,
                '}' => self.close += 1,
                _ => {}
            }
        }
    }
}

/// The four dynamic macro forms, keyed by the character after `##`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicMacro {
    /// `##_`: line number minus five
    LinePosition,
    /// `##$`: next pseudo-random value
    Random,
    /// `##{`: opening braces seen before this point
    OpenBraces,
    /// `##}`: closing braces on earlier lines, modulo five
    CloseBraces,
}

impl DynamicMacro {
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '_' => Some(Self::LinePosition),
            '$' => Some(Self::Random),
            '{' => Some(Self::OpenBraces),
            '}' => Some(Self::CloseBraces),
            _ => None,
        }
    }
}

/// Everything a dynamic macro may depend on while one line is expanded
pub struct DynamicContext<'a> {
    pub line: usize,
    pub braces: BraceCounters,
    pub random: &'a mut PseudoRandom,
}

impl DynamicContext<'_> {
    /// Render one occurrence; `open_in_line` counts `{` earlier on the same line
    pub fn render(&mut self, mac: DynamicMacro, open_in_line: usize) -> String {
        match mac {
            DynamicMacro::LinePosition => (self.line as i64 - 5).to_string(),
            DynamicMacro::Random => self.random.next_value().to_string(),
            DynamicMacro::OpenBraces => (self.braces.open + open_in_line).to_string(),
            DynamicMacro::CloseBraces => (self.braces.close % 5).to_string(),
        }
    }

    /// Replace every dynamic macro occurrence in `line`, left to right
    pub fn expand(&mut self, line: &str) -> String {
        let mut result = String::with_capacity(line.len());
        let mut open_in_line = 0;
        let mut rest = line;

        while let Some(idx) = rest.find("##") {
            let (before, after) = rest.split_at(idx);
            open_in_line += before.matches('{').count();
            result.push_str(before);

            match after[2..].chars().next().and_then(DynamicMacro::from_marker) {
                Some(mac) => {
                    result.push_str(&self.render(mac, open_in_line));
                    rest = &after[3..];
                }
                None => {
                    // Step over one '#' so "###_" still finds its "##_"
                    result.push('#');
                    rest = &after[1..];
                }
            }
        }

        result.push_str(rest);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(line: usize, braces: BraceCounters, random: &mut PseudoRandom) -> DynamicContext<'_> {
        DynamicContext {
            line,
            braces,
            random,
        }
    }

    #[test]
    fn test_random_sequence() {
        let mut random = PseudoRandom::new(42);
        assert_eq!(random.next_value(), 1250496027);
        assert_eq!(random.next_value(), 1116302264);
        assert_eq!(random.next_value(), 1000676753);
    }

    #[test]
    fn test_line_position_can_be_negative() {
        let mut random = PseudoRandom::new(42);
        let mut ctx = context(1, BraceCounters::default(), &mut random);
        assert_eq!(ctx.expand("line ##_"), "line -4");

        let mut ctx = context(12, BraceCounters::default(), &mut random);
        assert_eq!(ctx.expand("##_ and ##_"), "7 and 7");
    }

    #[test]
    fn test_each_random_occurrence_advances() {
        let mut random = PseudoRandom::new(42);
        let mut ctx = context(1, BraceCounters::default(), &mut random);
        assert_eq!(ctx.expand("##$ ##$"), "1250496027 1116302264");
        assert_eq!(random.seed(), 1116302264);
    }

    #[test]
    fn test_open_braces_count_earlier_in_line() {
        let mut random = PseudoRandom::new(42);
        let braces = BraceCounters { open: 3, close: 0 };
        let mut ctx = context(1, braces, &mut random);
        assert_eq!(ctx.expand("##{ { ##{ {{ ##{"), "3 { 4 {{ 6");
    }

    #[test]
    fn test_close_braces_modulo_five() {
        let mut random = PseudoRandom::new(42);
        let braces = BraceCounters { open: 0, close: 12 };
        let mut ctx = context(1, braces, &mut random);
        assert_eq!(ctx.expand("} ##}"), "} 2");
    }

    #[test]
    fn test_unrelated_hashes_untouched() {
        let mut random = PseudoRandom::new(42);
        let mut ctx = context(6, BraceCounters::default(), &mut random);
        assert_eq!(ctx.expand("## #x ##: ###_"), "## #x ##: #1");
    }

    #[test]
    fn test_brace_counters_update() {
        let mut braces = BraceCounters::default();
        braces.update("int main() { if (x) { } }");
        assert_eq!(braces, BraceCounters { open: 2, close: 2 });
    }
}
