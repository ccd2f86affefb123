

pub const DEFAULT_EMERGENCY_KEYWORDS: [&str; 7] = [
    "severe",
    "acute",
    "unbearable",
    "emergency",
    "urgent",
    "bleeding",
    "unconscious",
];


/// Lexical urgency cues, matched as substrings of the raw lowercased input.
#[derive(Debug, Clone)]
pub struct EmergencyDetector {
    keywords: Vec<String>,
}

impl EmergencyDetector {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn detect(&self, raw_text: &str) -> bool {
        let text_lower = raw_text.to_lowercase();
        self.keywords.iter().any(|k| text_lower.contains(k.as_str()))
    }

    pub fn cues(&self, raw_text: &str) -> Vec<&str> {
        let text_lower = raw_text.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| text_lower.contains(k.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl Default for EmergencyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_EMERGENCY_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}


pub fn detect_emergency(raw_text: &str) -> bool {
    EmergencyDetector::default().detect(raw_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_emergency() {
        assert!(detect_emergency("I have severe chest pain"));
        assert!(detect_emergency("BLEEDING gums"));
        assert!(!detect_emergency("mild headache"));
        assert!(!detect_emergency(""));
    }

    #[test]
    fn test_substring_match_before_tokenization() {
        // "severely" and "urgently" still contain a cue
        assert!(detect_emergency("severely tired"));
        assert!(detect_emergency("need help urgently!!"));
    }

    #[test]
    fn test_cues_and_custom_lexicon() {
        let detector = EmergencyDetector::default();
        assert_eq!(detector.cues("acute and unbearable pain"), vec!["acute", "unbearable"]);

        let custom = EmergencyDetector::new(vec!["Seizure".to_string()]);
        assert!(custom.detect("had a seizure"));
        assert!(!custom.detect("severe pain"));
    }
}
