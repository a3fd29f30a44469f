//! The level script: one line per level, each with alternate texts.
//!
//! ```text
//! label||first variant of the words|Attribution||second variant
//! ```
//!
//! The label segment is not played. One variant per line is picked when the
//! script is loaded, so a redo replays the same words.

use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{GameResult, ScriptError};

static SCRIPT_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/scripts");

pub const BUNDLED_SCRIPT: &str = "word_script.txt";

const VARIANT_SEPARATOR: &str = "||";
const ATTRIBUTION_SEPARATOR: char = '|';

/// The words of one level and where they come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub words: Vec<String>,
    pub attribution: Option<String>,
}

impl ScriptLine {
    /// Parses `words[|attribution]`. `None` when there are no words.
    pub fn parse_variant(variant: &str) -> Option<Self> {
        let (text, attribution) = match variant.split_once(ATTRIBUTION_SEPARATOR) {
            Some((text, attribution)) => (text, Some(attribution.trim())),
            None => (variant, None),
        };

        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            return None;
        }

        Some(Self {
            words,
            attribution: attribution
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        })
    }
}

/// Every level of one playthrough, with variants already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    lines: Vec<ScriptLine>,
    /// Text the lines were drawn from, kept for the next playthrough.
    source: Option<String>,
}

impl Script {
    pub fn new(lines: Vec<ScriptLine>) -> Result<Self, ScriptError> {
        if lines.is_empty() {
            return Err(ScriptError::Empty);
        }
        Ok(Self {
            lines,
            source: None,
        })
    }

    /// Parses a whole script, picking one variant per line with `rng`.
    /// Lines that cannot be played are skipped and logged.
    pub fn parse<R: Rng + ?Sized>(source: &str, rng: &mut R) -> Result<Self, ScriptError> {
        let mut lines = Vec::new();

        for (number, raw) in source.lines().enumerate() {
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                continue;
            }

            let variants: Vec<ScriptLine> = raw
                .split(VARIANT_SEPARATOR)
                .skip(1)
                .filter_map(ScriptLine::parse_variant)
                .collect();

            match variants.choose(rng) {
                Some(line) => lines.push(line.clone()),
                None => warn!(line = number + 1, text = raw, "skipping unplayable script line"),
            }
        }

        debug!(levels = lines.len(), "script parsed");
        let mut script = Self::new(lines)?;
        script.source = Some(source.to_string());
        Ok(script)
    }

    /// Draws every line's variant again from the same text. A script built
    /// from ready-made lines has nothing to draw from and comes back as is.
    pub fn reroll<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        match &self.source {
            Some(source) => Self::parse(source, rng).unwrap_or_else(|_| self.clone()),
            None => self.clone(),
        }
    }

    pub fn load<R: Rng + ?Sized>(path: &Path, rng: &mut R) -> Result<Self, ScriptError> {
        let source = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, rng)
    }

    pub fn bundled<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, ScriptError> {
        let source = SCRIPT_DIR
            .get_file(BUNDLED_SCRIPT)
            .and_then(|file| file.contents_utf8())
            .ok_or_else(|| ScriptError::Bundled(BUNDLED_SCRIPT.to_string()))?;
        Self::parse(source, rng)
    }

    /// The script at `path` when given, the bundled one otherwise.
    pub fn resolve<R: Rng + ?Sized>(path: Option<&Path>, rng: &mut R) -> GameResult<Self> {
        let script = match path {
            Some(path) => Self::load(path, rng)?,
            None => Self::bundled(rng)?,
        };
        Ok(script)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line for a 1-based level ordinal.
    pub fn level(&self, ordinal: usize) -> Option<&ScriptLine> {
        ordinal.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn parses_words_and_attribution() {
        let script = Script::parse("1||the sea is calm|Ship's log", &mut rng()).unwrap();

        assert_eq!(script.len(), 1);
        let line = script.level(1).unwrap();
        assert_eq!(line.words, vec!["the", "sea", "is", "calm"]);
        assert_eq!(line.attribution.as_deref(), Some("Ship's log"));
    }

    #[test]
    fn attribution_is_optional() {
        let script = Script::parse("x||salt and rope", &mut rng()).unwrap();
        assert_eq!(script.level(1).unwrap().attribution, None);
    }

    #[test]
    fn picks_one_of_the_variants() {
        let source = "1||alpha beta||gamma delta||epsilon";
        let script = Script::parse(source, &mut rng()).unwrap();
        let words = &script.level(1).unwrap().words;

        let options: [&[&str]; 3] = [&["alpha", "beta"], &["gamma", "delta"], &["epsilon"]];
        assert!(options.iter().any(|o| words == o));
    }

    #[test]
    fn same_seed_same_choices() {
        let source = "1||a b||c d||e f\n2||g||h||i\n3||j||k";
        let first = Script::parse(source, &mut StdRng::seed_from_u64(9)).unwrap();
        let second = Script::parse(source, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn skips_blank_and_malformed_lines() {
        let source = "\n1||one two\nno separator here\n3||   ||  |only attribution\n\r\n4||three";
        let script = Script::parse(source, &mut rng()).unwrap();

        assert_eq!(script.len(), 2);
        assert_eq!(script.level(1).unwrap().words, vec!["one", "two"]);
        assert_eq!(script.level(2).unwrap().words, vec!["three"]);
    }

    #[test]
    fn empty_variants_are_never_chosen() {
        for seed in 0..20 {
            let script =
                Script::parse("1||||sail||", &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(script.level(1).unwrap().words, vec!["sail"]);
        }
    }

    #[test]
    fn script_without_levels_is_an_error() {
        assert_matches!(Script::parse("", &mut rng()), Err(ScriptError::Empty));
        assert_matches!(Script::parse("junk\n\n", &mut rng()), Err(ScriptError::Empty));
    }

    #[test]
    fn reroll_draws_from_the_same_text() {
        let source = "1||alpha||beta||gamma\n2||delta||epsilon\nx||   ||zeta";
        let mut rng = rng();
        let script = Script::parse(source, &mut rng).unwrap();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..30 {
            let next = script.reroll(&mut rng);
            assert_eq!(next.len(), 3);
            assert_eq!(next.level(3).unwrap().words, vec!["zeta"]);
            seen.insert(next.level(1).unwrap().words[0].clone());
        }
        assert!(seen.len() > 1);

        let fixed = Script::new(vec![ScriptLine::parse_variant("sail").unwrap()]).unwrap();
        assert_eq!(fixed.reroll(&mut rng), fixed);
    }

    #[test]
    fn level_ordinals_are_one_based() {
        let script = Script::parse("1||a\n2||b", &mut rng()).unwrap();
        assert!(script.level(0).is_none());
        assert_eq!(script.level(2).unwrap().words, vec!["b"]);
        assert!(script.level(3).is_none());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Script::load(Path::new("/definitely/not/here.txt"), &mut rng()).unwrap_err();
        assert_matches!(&err, ScriptError::Read { path, .. } if path.ends_with("here.txt"));
        assert!(err.to_string().contains("here.txt"));
    }

    #[test]
    fn loads_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1||castaway on the shore|Anon").unwrap();

        let script = Script::load(file.path(), &mut rng()).unwrap();
        assert_eq!(script.level(1).unwrap().words.len(), 4);
    }

    #[test]
    fn resolve_wraps_script_errors() {
        let err = Script::resolve(Some(Path::new("/no/such/levels.txt")), &mut rng()).unwrap_err();
        assert_matches!(&err, crate::GameError::Script(ScriptError::Read { .. }));
        assert!(err.to_string().contains("/no/such/levels.txt"));

        let bundled = Script::resolve(None, &mut rng()).unwrap();
        assert_eq!(bundled, Script::bundled(&mut rng()).unwrap());
    }

    #[test]
    fn bundled_script_is_playable() {
        let script = Script::bundled(&mut rng()).unwrap();
        assert!(script.len() >= 5);
        assert!(script.lines().iter().all(|l| !l.words.is_empty()));
    }
}
