use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{ensure, Context as _};
use lazy_regex::Regex;
use rust_embed::RustEmbed;
use runprobe_webclient::{Expectation, TestCase};
use serde::Deserialize;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

/// Test cases to run one by one, plus an optional job template for the
/// parallel harness.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestSet {
    #[serde(rename = "test", default)]
    pub tests: Vec<TestCase>,

    #[serde(default)]
    pub parallel: Option<TestCase>,
}

/// Part of a [`TestSet`] chosen by language.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub tests: Vec<&'a TestCase>,
    pub parallel: Option<&'a TestCase>,
}

impl TestSet {
    pub const BUILTIN_FILENAME: &str = "testset.toml";

    pub fn builtin_toml() -> anyhow::Result<String> {
        let file = Asset::get(Self::BUILTIN_FILENAME)
            .with_context(|| format!("Missing embedded '{}'", Self::BUILTIN_FILENAME))?;
        let s = std::str::from_utf8(file.data.as_ref())
            .context("Embedded test set is not UTF-8")?;
        Ok(s.to_owned())
    }

    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_toml(&Self::builtin_toml()?).context("Invalid built-in test set")
    }

    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let set: Self = toml::from_str(s)?;
        set.validate()?;
        Ok(set)
    }

    pub fn from_toml_file(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let toml = std::fs::read_to_string(filepath)
            .with_context(|| format!("Cannot read test set {:?}", filepath))?;
        Self::from_toml(&toml).with_context(|| format!("Invalid test set TOML: {:?}", filepath))
    }

    /// Every test needs at least one expectation and every pattern must compile.
    pub fn validate(&self) -> anyhow::Result<()> {
        for t in self.tests.iter().chain(&self.parallel) {
            validate_testcase(t)?;
        }
        Ok(())
    }

    pub fn languages(&self) -> BTreeSet<&str> {
        self.tests
            .iter()
            .chain(&self.parallel)
            .map(|t| t.language_id.as_str())
            .collect()
    }

    /// Tests whose language is in `langs`; everything when `langs` is empty.
    pub fn select<S: AsRef<str>>(&self, langs: &[S]) -> Selection<'_> {
        let wanted = |t: &TestCase| {
            langs.is_empty() || langs.iter().any(|l| l.as_ref() == t.language_id)
        };
        Selection {
            tests: self.tests.iter().filter(|&t| wanted(t)).collect(),
            parallel: self.parallel.as_ref().filter(|&t| wanted(t)),
        }
    }
}

fn validate_testcase(t: &TestCase) -> anyhow::Result<()> {
    ensure!(!t.expect.is_empty(), "Test '{}' has no expectations", t.comment);
    for (field, expectation) in &t.expect {
        if let Expectation::Pattern(pat) = expectation {
            Regex::new(pat).with_context(|| {
                format!("Test '{}': invalid pattern for {}: {:?}", t.comment, field, pat)
            })?;
        }
    }
    Ok(())
}
