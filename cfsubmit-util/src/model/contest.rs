use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::regex;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContestId(String);

impl<T: Into<String>> From<T> for ContestId {
    fn from(id: T) -> Self {
        Self(id.into().trim().to_owned())
    }
}

impl FromStr for ContestId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for ContestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label of a problem inside a contest (e.g. `A`, `C1`).
///
/// Always held in uppercase since the judge displays labels that way.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProblemIndex(String);

impl From<&str> for ProblemIndex {
    fn from(index: &str) -> Self {
        Self(index.trim().to_uppercase())
    }
}

impl From<String> for ProblemIndex {
    fn from(index: String) -> Self {
        Self::from(index.as_str())
    }
}

impl FromStr for ProblemIndex {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for ProblemIndex {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a combined problem code such as `1a` or `1850 C1` into contest id and index.
pub fn split_problem_code(code: &str) -> Option<(ContestId, ProblemIndex)> {
    let caps = regex!(r"^\s*(\d+)\s*([A-Za-z][A-Za-z0-9]*)\s*$").captures(code)?;
    Some((ContestId::from(&caps[1]), ProblemIndex::from(&caps[2])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_index_is_uppercased() {
        assert_eq!(ProblemIndex::from("a").as_ref(), "A");
        assert_eq!(ProblemIndex::from(" c1 ").as_ref(), "C1");
    }

    #[test]
    fn contest_id_is_trimmed() {
        assert_eq!(ContestId::from(" 1850 ").to_string(), "1850");
    }

    #[test]
    fn split_problem_code_success() {
        let tests = &[("1a", "1", "A"), ("1850C1", "1850", "C1"), (" 4 b ", "4", "B")];
        for (code, contest_id, index) in tests {
            let (actual_contest_id, actual_index) = split_problem_code(code).unwrap();
            assert_eq!(actual_contest_id.as_ref(), *contest_id);
            assert_eq!(actual_index.as_ref(), *index);
        }
    }

    #[test]
    fn split_problem_code_failure() {
        for code in &["", "A", "12", "1-A"] {
            assert_eq!(split_problem_code(code), None);
        }
    }
}
