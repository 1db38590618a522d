// Natural ("human") string ordering: "file2" < "file10"

use std::cmp::Ordering;

/// Compare two strings treating embedded decimal runs as numbers.
///
/// Runs with the same value but different spellings ("01" vs "1") compare
/// equal while the rest of the strings is compared; the first such spelling
/// difference only decides between otherwise equal strings.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = Tokens(a);
    let mut b = Tokens(b);
    let mut spelling = Ordering::Equal;

    loop {
        let (ta, tb) = match (a.next(), b.next()) {
            (None, None) => return spelling,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ta), Some(tb)) => (ta, tb),
        };

        let ord = match (ta, tb) {
            (Token::Digits(x), Token::Digits(y)) => {
                if spelling == Ordering::Equal {
                    spelling = x.cmp(y);
                }
                cmp_digit_runs(x, y)
            }
            (Token::Char(x), Token::Char(y)) => x.cmp(&y),
            (Token::Digits(x), Token::Char(y)) => x.chars().next().cmp(&Some(y)),
            (Token::Char(x), Token::Digits(y)) => Some(x).cmp(&y.chars().next()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Token<'a> {
    Digits(&'a str),
    Char(char),
}

/// Splits a string into digit runs and single other characters
struct Tokens<'a>(&'a str);

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let c = self.0.chars().next()?;
        if c.is_ascii_digit() {
            let (run, rest) = self.0.split_at(digits(self.0));
            self.0 = rest;
            Some(Token::Digits(run))
        } else {
            self.0 = &self.0[c.len_utf8()..];
            Some(Token::Char(c))
        }
    }
}

/// Length of the leading ASCII digit run
fn digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Compare two digit runs by magnitude without overflowing on long runs
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
