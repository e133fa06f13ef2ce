//! Username sanitisation for directory binds and search filters.
//!
//! Usernames arrive straight from a login form and end up inside an LDAP
//! filter (`(sAMAccountName=<name>)`) and a bind name (`REALM\<name>`).
//! [`sanitize`] refuses characters that have no business in an account name
//! and escapes the ones that would change the meaning of a filter.
//!
//! The output is stable under re-sanitisation: an escape sequence produced by
//! a previous pass is recognised and kept as-is.

use std::fmt;

use crate::error::Rejected;

/// Characters that are never valid in an account name.
const FORBIDDEN: &[char] =
  &['"', '[', ']', ':', ';', '|', '=', '+', '?', '<', '>', '/', ','];

/// A username that is safe to embed in a filter value or a bind name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnFragment {
  raw:     String,
  escaped: String,
}

impl DnFragment {
  /// The username exactly as it was supplied.
  pub fn raw(&self) -> &str { &self.raw }

  /// The escaped form.
  pub fn as_str(&self) -> &str { &self.escaped }

  /// The escaped form as a filter assertion value. Filters only accept
  /// `\NN` hex escapes, so the escaped leading or trailing space and the
  /// escaped leading `#` are spelled `\20` and `\23`.
  pub fn filter_value(&self) -> String {
    self.escaped.replace("\\ ", "\\20").replace("\\#", "\\23")
  }

  /// Whether this is a fully-qualified `user@domain` principal rather than a
  /// bare account name.
  pub fn is_principal_name(&self) -> bool { self.escaped.contains('@') }
}

impl fmt::Display for DnFragment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.escaped)
  }
}

#[derive(Debug)]
enum Token {
  Literal(char),
  Escaped(String),
}

/// Validate `raw` and escape it for use in a directory query.
///
/// - empty input, [`FORBIDDEN`] characters and control characters are
///   rejected;
/// - `\`, `*`, `(`, `)` and NUL become `\5c`, `\2a`, `\28`, `\29`, `\00`;
/// - a leading space or `#` is backslash-escaped;
/// - trailing whitespace is trimmed and replaced by an escaped space.
pub fn sanitize(raw: &str) -> Result<DnFragment, Rejected> {
  if raw.is_empty() {
    return Err(Rejected::Empty);
  }
  if let Some(c) = raw.chars().find(|c| FORBIDDEN.contains(c)) {
    return Err(Rejected::ForbiddenCharacter(c));
  }
  if let Some(c) = raw.chars().find(|c| (*c as u32) < 32) {
    return Err(Rejected::ControlCharacter(c as u32));
  }

  let chars: Vec<char> = raw.chars().collect();
  let mut tokens = Vec::with_capacity(chars.len());
  let mut i = 0;
  while i < chars.len() {
    let token = match chars[i] {
      '\\' => match existing_escape(&chars[i..]) {
        Some(len) => {
          tokens.push(Token::Escaped(chars[i..i + len].iter().collect()));
          i += len;
          continue;
        }
        None => Token::Escaped("\\5c".to_owned()),
      },
      '*' => Token::Escaped("\\2a".to_owned()),
      '(' => Token::Escaped("\\28".to_owned()),
      ')' => Token::Escaped("\\29".to_owned()),
      '\0' => Token::Escaped("\\00".to_owned()),
      c => Token::Literal(c),
    };
    tokens.push(token);
    i += 1;
  }

  let leading = match tokens.first() {
    Some(Token::Literal(c @ (' ' | '#'))) => Some(*c),
    _ => None,
  };
  if let Some(c) = leading {
    tokens[0] = Token::Escaped(format!("\\{c}"));
  }

  if matches!(tokens.last(), Some(Token::Literal(' '))) {
    while matches!(tokens.last(), Some(Token::Literal(c)) if c.is_whitespace()) {
      tokens.pop();
    }
    tokens.push(Token::Escaped("\\ ".to_owned()));
  }

  let mut escaped = String::with_capacity(raw.len() + 8);
  for token in tokens {
    match token {
      Token::Literal(c) => escaped.push(c),
      Token::Escaped(s) => escaped.push_str(&s),
    }
  }

  Ok(DnFragment { raw: raw.to_owned(), escaped })
}

/// Length of an escape sequence starting at `rest[0]` (a backslash), if it
/// is one this module could have produced.
fn existing_escape(rest: &[char]) -> Option<usize> {
  match (rest.get(1), rest.get(2)) {
    (Some(' ' | '#'), _) => Some(2),
    (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit() => {
      Some(3)
    }
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn escaped(raw: &str) -> String { sanitize(raw).unwrap().as_str().to_owned() }

  #[test]
  fn empty_is_rejected() {
    assert_eq!(sanitize(""), Err(Rejected::Empty));
  }

  #[test]
  fn forbidden_characters_are_rejected() {
    for c in FORBIDDEN {
      let input = format!("ab{c}cd");
      assert_eq!(
        sanitize(&input),
        Err(Rejected::ForbiddenCharacter(*c)),
        "input {input:?}"
      );
    }
  }

  #[test]
  fn control_characters_are_rejected() {
    for code in 0u32..32 {
      let c = char::from_u32(code).unwrap();
      let input = format!("user{c}name");
      assert_eq!(
        sanitize(&input),
        Err(Rejected::ControlCharacter(code)),
        "code {code}"
      );
    }
  }

  #[test]
  fn plain_names_pass_through() {
    assert_eq!(escaped("jsmith"), "jsmith");
    assert_eq!(escaped("j.smith-2"), "j.smith-2");
    assert_eq!(escaped("jsmith@example.com"), "jsmith@example.com");
  }

  #[test]
  fn filter_metacharacters_are_hex_escaped() {
    assert_eq!(escaped("ab*cd"), "ab\\2acd");
    assert_eq!(escaped("a(b)c"), "a\\28b\\29c");
    assert_eq!(escaped("a\\b"), "a\\5cb");
    assert_eq!(escaped("*)(cn*"), "\\2a\\29\\28cn\\2a");
  }

  #[test]
  fn leading_space_and_hash_are_escaped() {
    assert_eq!(escaped(" lead"), "\\ lead");
    assert_eq!(escaped("#lead"), "\\#lead");
    assert_eq!(escaped("mid#dle"), "mid#dle");
  }

  #[test]
  fn trailing_space_is_trimmed_and_escaped() {
    assert_eq!(escaped("trail "), "trail\\ ");
    assert_eq!(escaped("trail   "), "trail\\ ");
    assert_eq!(escaped("in side"), "in side");
  }

  #[test]
  fn lone_space_is_escaped_once() {
    assert_eq!(escaped(" "), "\\ ");
  }

  #[test]
  fn sanitising_twice_is_a_no_op() {
    for input in [
      "jsmith",
      "ab*cd",
      "a(b)c",
      "a\\b",
      " lead",
      "#lead",
      "trail ",
      " both ",
      "jsmith@example.com",
    ] {
      let once = escaped(input);
      let twice = escaped(&once);
      assert_eq!(once, twice, "input {input:?}");
    }
  }

  #[test]
  fn filter_value_uses_hex_escapes_only() {
    assert_eq!(sanitize(" lead").unwrap().filter_value(), "\\20lead");
    assert_eq!(sanitize("#lead").unwrap().filter_value(), "\\23lead");
    assert_eq!(sanitize(" both  ").unwrap().filter_value(), "\\20both\\20");
    assert_eq!(sanitize("ab*cd").unwrap().filter_value(), "ab\\2acd");
    assert_eq!(sanitize("mid#dle").unwrap().filter_value(), "mid#dle");
  }

  #[test]
  fn principal_names_are_detected() {
    assert!(sanitize("jsmith@example.com").unwrap().is_principal_name());
    assert!(!sanitize("jsmith").unwrap().is_principal_name());
  }

  #[test]
  fn raw_form_is_preserved() {
    let fragment = sanitize("ab*cd").unwrap();
    assert_eq!(fragment.raw(), "ab*cd");
    assert_eq!(fragment.to_string(), "ab\\2acd");
  }
}
