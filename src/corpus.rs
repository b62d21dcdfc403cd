use crate::error::{KeySolveError, KsResult};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Extension of the tab-separated n-gram cache.
pub const NGRAM_EXT: &str = "tsv";

pub type Bigram = [char; 2];
pub type Trigram = [char; 3];

/// Character n-gram counts gathered from a text.
///
/// Every recorded count is at least 1 and each total equals the sum of its map.
/// The `*_no_space` totals leave out n-grams that contain whitespace.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub name: String,
    pub unigrams: HashMap<char, u64>,
    pub bigrams: HashMap<Bigram, u64>,
    pub trigrams: HashMap<Trigram, u64>,

    pub total_unigrams: u64,
    pub total_unigrams_no_space: u64,
    pub total_bigrams: u64,
    pub total_bigrams_no_space: u64,
    pub total_trigrams: u64,
    pub total_trigrams_no_space: u64,
}

fn has_space(chars: &[char]) -> bool {
    chars.iter().any(|c| c.is_whitespace())
}

impl Corpus {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn add_unigram(&mut self, c: char, count: u64) {
        if count == 0 {
            return;
        }
        *self.unigrams.entry(c).or_default() += count;
        self.total_unigrams += count;
        if !c.is_whitespace() {
            self.total_unigrams_no_space += count;
        }
    }

    pub fn add_bigram(&mut self, bigram: Bigram, count: u64) {
        if count == 0 {
            return;
        }
        *self.bigrams.entry(bigram).or_default() += count;
        self.total_bigrams += count;
        if !has_space(&bigram) {
            self.total_bigrams_no_space += count;
        }
    }

    pub fn add_trigram(&mut self, trigram: Trigram, count: u64) {
        if count == 0 {
            return;
        }
        *self.trigrams.entry(trigram).or_default() += count;
        self.total_trigrams += count;
        if !has_space(&trigram) {
            self.total_trigrams_no_space += count;
        }
    }

    /// Adds one line of text. The window holds the last two characters and is
    /// cleared after any whitespace, so whitespace can only end an n-gram.
    pub fn ingest_line(&mut self, line: &str) {
        let mut prev2: Option<char> = None;
        let mut prev1: Option<char> = None;

        for c in line.chars().flat_map(char::to_lowercase) {
            self.add_unigram(c, 1);
            if let Some(p1) = prev1 {
                self.add_bigram([p1, c], 1);
                if let Some(p2) = prev2 {
                    self.add_trigram([p2, p1, c], 1);
                }
            }

            if c.is_whitespace() {
                prev2 = None;
                prev1 = None;
            } else {
                prev2 = prev1;
                prev1 = Some(c);
            }
        }
    }

    pub fn ingest_str(&mut self, text: &str) {
        for line in text.lines() {
            self.ingest_line(line);
        }
    }

    pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> KsResult<()> {
        for line in reader.lines() {
            self.ingest_line(&line?);
        }
        Ok(())
    }

    pub fn from_text_file<P: AsRef<Path>>(path: P) -> KsResult<Self> {
        let path = path.as_ref();
        let mut corpus = Self::new(&file_stem(path));
        corpus.ingest_reader(BufReader::new(File::open(path)?))?;
        info!(
            "📚 Scanned corpus '{}': {} chars, {} bigrams, {} trigrams",
            corpus.name, corpus.total_unigrams, corpus.total_bigrams, corpus.total_trigrams
        );
        Ok(corpus)
    }

    /// Reads the `<ngram>\t<count>` cache format. The n-gram length picks the map.
    pub fn from_ngram_reader<R: Read>(name: &str, reader: R) -> KsResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let mut corpus = Self::new(name);
        let mut skipped = 0;

        for result in rdr.records() {
            let rec = result?;
            if rec.len() < 2 {
                skipped += 1;
                continue;
            }
            let count: u64 = match rec[1].trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let chars: Vec<char> = unescape(&rec[0]).chars().collect();
            match chars.as_slice() {
                [a] => corpus.add_unigram(*a, count),
                [a, b] => corpus.add_bigram([*a, *b], count),
                [a, b, c] => corpus.add_trigram([*a, *b, *c], count),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("   ⚠️  Skipped {} invalid n-gram rows in '{}'", skipped, name);
        }
        Ok(corpus)
    }

    /// Writes the cache format, unigrams then bigrams then trigrams, each sorted.
    pub fn write_ngrams<W: Write>(&self, writer: W) -> KsResult<()> {
        let mut wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);

        for (c, count) in self.sorted_unigrams() {
            wtr.write_record([escape(&[c]), count.to_string()])?;
        }
        for (b, count) in self.sorted_bigrams() {
            wtr.write_record([escape(&b), count.to_string()])?;
        }
        for (t, count) in self.sorted_trigrams() {
            wtr.write_record([escape(&t), count.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save_ngrams<P: AsRef<Path>>(&self, path: P) -> KsResult<()> {
        self.write_ngrams(File::create(path)?)
    }

    /// Loads an n-gram cache (`.tsv`) or scans a plain text file.
    pub fn load<P: AsRef<Path>>(path: P) -> KsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KeySolveError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("corpus '{}' not found", path.display()),
            )));
        }
        if path.extension().is_some_and(|ext| ext == NGRAM_EXT) {
            let corpus = Self::from_ngram_reader(&file_stem(path), File::open(path)?)?;
            info!(
                "📚 Loaded n-gram cache '{}': {} bigrams, {} trigrams",
                corpus.name,
                corpus.bigrams.len(),
                corpus.trigrams.len()
            );
            Ok(corpus)
        } else {
            Self::from_text_file(path)
        }
    }

    pub fn sorted_unigrams(&self) -> Vec<(char, u64)> {
        sorted_by_count(self.unigrams.iter().map(|(&k, &v)| (k, v)))
    }

    pub fn sorted_bigrams(&self) -> Vec<(Bigram, u64)> {
        sorted_by_count(self.bigrams.iter().map(|(&k, &v)| (k, v)))
    }

    pub fn sorted_trigrams(&self) -> Vec<(Trigram, u64)> {
        sorted_by_count(self.trigrams.iter().map(|(&k, &v)| (k, v)))
    }

    pub fn top_bigrams(&self, n: usize) -> Vec<(Bigram, u64)> {
        let mut v = self.sorted_bigrams();
        v.truncate(n);
        v
    }

    pub fn top_trigrams(&self, n: usize) -> Vec<(Trigram, u64)> {
        let mut v = self.sorted_trigrams();
        v.truncate(n);
        v
    }
}

/// Count descending, then key ascending. Map order is arbitrary, so every listing goes
/// through here.
fn sorted_by_count<K: Ord>(items: impl Iterator<Item = (K, u64)>) -> Vec<(K, u64)> {
    let mut v: Vec<(K, u64)> = items.collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "corpus".to_string())
}

fn escape(chars: &[char]) -> String {
    let mut s = String::new();
    for &c in chars {
        match c {
            '\\' => s.push_str("\\\\"),
            ' ' => s.push_str("\\s"),
            '\t' => s.push_str("\\t"),
            '\r' => s.push_str("\\r"),
            '\n' => s.push_str("\\n"),
            c if c.is_control() => s.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => s.push(c),
        }
    }
    s
}

fn unescape(field: &str) -> String {
    let mut out = String::new();
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('s') => out.push(' '),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('\\') => out.push('\\'),
                Some('u') => match unescape_code(&mut chars) {
                    Some(c) => out.push(c),
                    None => out.push_str("\\u"),
                },
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reads the `{hex}` part of a `\u{hex}` escape.
fn unescape_code(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let rest = chars.as_str();
    let hex = rest.strip_prefix('{')?.split_once('}')?.0;
    let c = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
    *chars = rest[hex.len() + 2..].chars();
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_ends_ngrams() {
        let mut corpus = Corpus::new("t");
        corpus.ingest_str("ab cd");
        assert_eq!(corpus.bigrams.get(&['a', 'b']), Some(&1));
        assert_eq!(corpus.bigrams.get(&['b', ' ']), Some(&1));
        assert_eq!(corpus.bigrams.get(&[' ', 'c']), None);
        assert_eq!(corpus.trigrams.get(&['a', 'b', ' ']), Some(&1));
        assert_eq!(corpus.total_bigrams, 3);
        assert_eq!(corpus.total_bigrams_no_space, 2);
        assert_eq!(corpus.total_unigrams, 5);
        assert_eq!(corpus.total_unigrams_no_space, 4);
    }

    #[test]
    fn escape_round_trip() {
        let chars = [' ', '\\', 'x'];
        assert_eq!(unescape(&escape(&chars)), " \\x");
    }

    #[test]
    fn control_chars_are_escaped() {
        let chars = ['\r', '\n', '\u{7}'];
        let field = escape(&chars);
        assert_eq!(field, "\\r\\n\\u{7}");
        assert_eq!(unescape(&field), "\r\n\u{7}");
        assert_eq!(unescape("\\u{zz}"), "\\u{zz}");
    }
}
