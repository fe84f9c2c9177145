//! Lightweight Irish/English classifier for language-fidelity statistics.
//!
//! This only has to separate two known languages in exam-answer prose, so
//! a stopword-and-fada tally is enough; no external language-detection
//! dependency is warranted for that.

/// High-frequency Irish function words that do not collide with English.
const IRISH_MARKERS: &[&str] = &[
    "agus", "ach", "ag", "an-", "arbh", "atá", "bhfuil", "bhí", "chun", "dá", "freagra",
    "gur", "iad", "ionas", "í", "le", "mé", "ná", "ní", "níl", "nuair", "sé", "sí", "seo",
    "sin", "sa", "tá", "trí", "muinín",
];

/// High-frequency English function words that do not collide with Irish.
const ENGLISH_MARKERS: &[&str] = &[
    "the", "and", "of", "to", "in", "is", "that", "it", "for", "with", "this", "answer",
    "confidence", "because", "therefore", "we", "have", "are", "which",
];

fn has_fada(word: &str) -> bool {
    word.chars().any(|c| "áéíóúÁÉÍÓÚ".contains(c))
}

/// Classify a response as written in Irish.
///
/// Counts Irish marker words (a fada vowel counts on its own) against
/// English marker words; ties and empty text go to "not Irish".
pub fn is_irish(text: &str) -> bool {
    let mut irish = 0usize;
    let mut english = 0usize;

    for raw in text.split_whitespace() {
        let word: String = raw
            .chars()
            .filter(|c| c.is_alphabetic() || *c == '-' || *c == '\'')
            .collect::<String>()
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        if IRISH_MARKERS.contains(&word.as_str()) || has_fada(&word) {
            irish += 1;
        } else if ENGLISH_MARKERS.contains(&word.as_str()) {
            english += 1;
        }
    }

    irish > english
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_irish_answer() {
        let text = "Freagra: Tá an freagra seo ceart agus tá muinín ard agam as. \
                    Is é 42 an luach atá i gceist.";
        assert!(is_irish(text));
    }

    #[test]
    fn detects_english_answer() {
        let text = "Answer: The value is 42 because the integral of the function \
                    over this interval is finite. Confidence: 90%";
        assert!(!is_irish(text));
    }

    #[test]
    fn empty_and_numeric_text_is_not_irish() {
        assert!(!is_irish(""));
        assert!(!is_irish("42"));
    }

    #[test]
    fn fada_vowels_outweigh_sparse_english() {
        assert!(is_irish("Tá sé ceart go leor: cúig déag."));
    }
}
