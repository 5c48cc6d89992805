//! Keyword vocabulary for the textual modality encoder.

use std::collections::HashMap;

/// Material and surface keywords used when no vocabulary is supplied.
pub const DEFAULT_TERMS: &[&str] = &[
    // material families
    "metal", "steel", "aluminum", "copper", "brass", "iron", "wood", "oak", "pine", "bamboo",
    "stone", "marble", "granite", "slate", "concrete", "brick", "ceramic", "porcelain", "glass",
    "plastic", "polymer", "rubber", "fabric", "cotton", "wool", "linen", "leather", "paper",
    "cardboard", "carbon", "composite", "foam", "cork", "vinyl", "laminate",
    // surface texture
    "rough", "smooth", "glossy", "matte", "satin", "polished", "brushed", "textured", "woven",
    "knit", "grain", "grained", "porous", "dense", "coarse", "fine", "ribbed", "embossed",
    "hammered", "patterned", "striped", "speckled", "veined", "scratched", "worn",
    // optical and physical
    "reflective", "transparent", "translucent", "opaque", "metallic", "soft", "hard", "flexible",
    "rigid", "heavy", "light", "warm", "cold", "thermal", "insulating", "conductive",
    "waterproof", "durable",
];

/// Lowercase `text` and split it on non-alphanumeric characters, dropping
/// empty tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Ordered keyword list with constant-time term lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TextVocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Default for TextVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_TERMS.iter().copied())
    }
}

impl TextVocabulary {
    /// Build a vocabulary. Terms are lowercased; duplicates keep their first
    /// position.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self {
            terms: Vec::new(),
            index: HashMap::new(),
        };
        for term in terms {
            let term = term.as_ref().to_lowercase();
            if term.is_empty() || vocab.index.contains_key(&term) {
                continue;
            }
            vocab.index.insert(term.clone(), vocab.terms.len());
            vocab.terms.push(term);
        }
        vocab
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in slot order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Slot of `term` (case-insensitive).
    pub fn position(&self, term: &str) -> Option<usize> {
        self.index.get(&term.to_lowercase()).copied()
    }

    /// Term-frequency vector: occurrences of each term divided by the total
    /// token count. Text without tokens yields a zero vector.
    pub fn term_frequencies(&self, text: &str) -> Vec<f64> {
        let mut tf = vec![0.0; self.terms.len()];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return tf;
        }
        for token in &tokens {
            if let Some(&slot) = self.index.get(token) {
                tf[slot] += 1.0;
            }
        }
        let total = tokens.len() as f64;
        for x in tf.iter_mut() {
            *x /= total;
        }
        tf
    }
}
