use serde::{Deserialize, Serialize};

/// Entry of `GET /languages`, which the server sends as a `[id, version]` pair.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(from = "(String, String)")]
pub struct LangVersion {
    /// e.g. "python3"
    pub id: String,
    /// e.g. "3.10.12"
    pub version: String,
}

impl LangVersion {
    pub fn new<S1, S2>(id: S1, version: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl From<(String, String)> for LangVersion {
    fn from((id, version): (String, String)) -> Self {
        Self { id, version }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_language_pairs() {
        let langs: Vec<LangVersion> =
            serde_json::from_str(r#"[["c", "11.4.0"], ["python3", "3.10.12"]]"#).unwrap();
        assert_eq!(
            langs,
            vec![
                LangVersion::new("c", "11.4.0"),
                LangVersion::new("python3", "3.10.12"),
            ]
        );
    }
}
