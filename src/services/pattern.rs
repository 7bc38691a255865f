//! Shell-style filename patterns (`*`, `?`, `[abc]`, `[!abc]`).
//!
//! Patterns are compiled to an anchored regex. Matching is case-sensitive and
//! applies to a bare filename, so `*` also matches a leading dot.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&translate(pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                // Find the closing bracket; a `]` right after `[` or `[!` is literal
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }

                if j >= chars.len() {
                    out.push_str(r"\[");
                    continue;
                }

                let mut class: Vec<char> = chars[i..j].to_vec();
                i = j + 1;

                let negated = class.first() == Some(&'!');
                if negated {
                    class.remove(0);
                }

                out.push('[');
                if negated {
                    out.push('^');
                }
                for ch in class {
                    match ch {
                        '\\' | '^' | '[' | ']' | '&' | '~' => {
                            out.push('\\');
                            out.push(ch);
                        }
                        other => out.push(other),
                    }
                }
                out.push(']');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, name: &str) -> bool {
        FilePattern::new(pattern).unwrap().matches(name)
    }

    #[test]
    fn test_wildcards() {
        assert!(m("*.py", "main.py"));
        assert!(m("*.py", ".hidden.py"));
        assert!(!m("*.py", "main.pyc"));
        assert!(!m("*.py", "main.PY"));
        assert!(m("test_?.rs", "test_a.rs"));
        assert!(!m("test_?.rs", "test_ab.rs"));
        assert!(m("*", "anything at all"));
    }

    #[test]
    fn test_character_classes() {
        assert!(m("file[0-9].txt", "file7.txt"));
        assert!(!m("file[0-9].txt", "filex.txt"));
        assert!(m("file[!0-9].txt", "filex.txt"));
        assert!(!m("file[!0-9].txt", "file7.txt"));
        assert!(m("[]]x", "]x"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(m("a+b(1).txt", "a+b(1).txt"));
        assert!(!m("a.b", "axb"));
        assert!(m("[", "["));
        assert!(m("a[b", "a[b"));
    }
}
