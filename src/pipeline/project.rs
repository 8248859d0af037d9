// What gets saved: every sound's source path with its row pattern, in row order, plus
// (for formats that can hold it) the tempo and loop geometry.

use serde::{Deserialize, Serialize};

use crate::config::SequencerConfig;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub sample_path: String,
    #[serde(with = "bits")]
    pub pattern: Vec<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub rows: Vec<ProjectRow>,

    // The plain line format doesn't carry these; restoring such a file keeps the
    // session's current geometry and tempo.
    #[serde(default)]
    pub settings: Option<SequencerConfig>,
}

impl ProjectState {
    pub fn from_parts(
        sources: Vec<String>,
        patterns: Vec<Vec<bool>>,
        settings: Option<SequencerConfig>,
    ) -> Self {
        let rows = sources
            .into_iter()
            .zip(patterns)
            .map(|(sample_path, pattern)| ProjectRow { sample_path, pattern })
            .collect();
        Self { rows, settings }
    }
}

pub fn pattern_to_bits(pattern: &[bool]) -> String {
    pattern.iter().map(|&on| if on { '1' } else { '0' }).collect()
}

/// `None` if anything other than 0 or 1 shows up.
pub fn bits_to_pattern(bits: &str) -> Option<Vec<bool>> {
    bits.chars()
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}

// patterns are stored as "0101..." strings rather than arrays of booleans
mod bits {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pattern: &[bool], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::pattern_to_bits(pattern))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<bool>, D::Error> {
        let raw = String::deserialize(d)?;
        super::bits_to_pattern(&raw)
            .ok_or_else(|| D::Error::custom(format!("not a 0/1 pattern: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_reject_other_characters() {
        assert_eq!(bits_to_pattern("1010"), Some(vec![true, false, true, false]));
        assert_eq!(bits_to_pattern(""), Some(vec![]));
        assert_eq!(bits_to_pattern("10x0"), None);
        assert_eq!(pattern_to_bits(&[false, true, true]), "011");
    }

    #[test]
    fn rows_pair_sources_with_patterns() {
        let p = ProjectState::from_parts(
            vec!["a.wav".into(), "b.wav".into()],
            vec![vec![true], vec![false]],
            None,
        );
        assert_eq!(p.rows[1], ProjectRow { sample_path: "b.wav".into(), pattern: vec![false] });
    }

    #[test]
    fn json_uses_digit_strings() {
        let p = ProjectState::from_parts(vec!["a.wav".into()], vec![vec![true, false]], None);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains(r#""pattern":"10""#));
        let back: ProjectState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        let bad = r#"{"rows":[{"sample_path":"a","pattern":"12"}]}"#;
        assert!(serde_json::from_str::<ProjectState>(bad).is_err());
    }
}
