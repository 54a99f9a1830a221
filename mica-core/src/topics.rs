use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::Topic;

/// Maximum number of topics returned per document.
pub const MAX_TOPICS: usize = 18;

// Image references: ![alt](path) — removed entirely.
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
// Links: [text](url) — keep the text, discard the URL.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
// HTML entities: &amp; &quot; and friends.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[a-zA-Z]+;").unwrap());
// Inline code spans — unwrap the backticks, keep the content.
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").unwrap());

/// Extract recurring subject words from markdown content, ranked by
/// frequency with an alphabetical tie-break. Words must be at least 3
/// characters long, appear at least twice, and not be stop words. Returns
/// at most [`MAX_TOPICS`] topics; empty input yields an empty list.
pub fn extract(markdown: &str) -> Vec<Topic> {
    if markdown.is_empty() {
        return Vec::new();
    }

    let text = strip_markdown(markdown);

    let mut freq: HashMap<String, usize> = HashMap::new();
    for word in tokenize(&text) {
        let word = word.to_lowercase();
        if word.len() < 3 || STOP_WORDS.contains(word.as_str()) {
            continue;
        }
        *freq.entry(word).or_insert(0) += 1;
    }

    let mut result: Vec<Topic> = freq
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(word, count)| Topic { word, count })
        .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    result.truncate(MAX_TOPICS);
    result
}

/// Remove markdown syntax artifacts before tokenization.
fn strip_markdown(markdown: &str) -> String {
    // Images first, since ![...] contains [...]
    let text = IMAGE_RE.replace_all(markdown, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = ENTITY_RE.replace_all(&text, "");
    INLINE_CODE_RE.replace_all(&text, "$1").into_owned()
}

/// Split text into words: runs of letters and digits, with internal hyphens
/// gluing compound tokens ("pre-push"). Trailing hyphens are trimmed.
fn tokenize(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() {
            current.push(c);
        } else if c == '-' && !current.is_empty() {
            current.push(c);
        } else if !current.is_empty() {
            let word = current.trim_end_matches('-');
            if !word.is_empty() {
                words.push(word.to_string());
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        let word = current.trim_end_matches('-');
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }

    words
}

// Common English words excluded from topic extraction.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Articles
        "the", "a", "an",
        // Prepositions
        "in", "on", "at", "to", "for", "with", "from", "by", "of", "about", "into", "through",
        "during", "before", "after", "above", "below", "between", "under", "over", "out", "off",
        "up", "down", "upon", "along", "across", "via",
        // Pronouns
        "he", "she", "it", "they", "we", "you", "his", "her", "its", "their", "our", "your",
        "him", "them", "who", "whom", "whose", "which", "that", "this", "these", "those", "what",
        "myself", "yourself", "himself", "herself", "itself", "ourselves", "themselves",
        // Common verbs
        "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "having", "do",
        "does", "did", "doing", "will", "would", "shall", "should", "may", "might", "must", "can",
        "could", "am", "get", "got", "gets", "make", "made", "let", "say", "said", "know",
        "think", "take", "come", "see", "want", "use", "used", "using", "find", "give", "tell",
        "work", "call", "try", "ask", "need", "seem", "feel", "leave", "put", "keep", "set",
        "run", "move", "go", "went", "gone", "going",
        // Conjunctions
        "and", "but", "or", "nor", "so", "yet", "both", "either", "neither", "not", "only",
        "own", "same",
        // Common adverbs
        "also", "just", "then", "than", "now", "here", "there", "when", "where", "why", "how",
        "all", "each", "every", "any", "few", "more", "most", "other", "some", "such", "no",
        "very", "too", "quite", "enough", "well", "back", "still", "even", "never", "always",
        "often", "ever", "much", "many",
        // Other common words
        "like", "one", "two", "new", "old", "first", "last", "long", "great", "little", "right",
        "big", "high", "small", "large", "next", "early", "young", "important", "public", "bad",
        "different", "able", "way", "day", "time", "year", "people", "part", "place", "case",
        "thing", "man", "world", "life", "hand", "point", "end", "another", "again", "don",
        "article", "post", "dev", "based",
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_frequency_then_alphabetically() {
        let topics = extract("claude claude claude agent agent agent docker docker docker");
        assert_eq!(
            topics,
            vec![
                Topic { word: "agent".into(), count: 3 },
                Topic { word: "claude".into(), count: 3 },
                Topic { word: "docker".into(), count: 3 },
            ]
        );
    }

    #[test]
    fn case_folds_tokens() {
        let topics = extract("LLM llm Llm");
        assert_eq!(topics, vec![Topic { word: "llm".into(), count: 3 }]);
    }

    #[test]
    fn drops_words_below_minimum_frequency() {
        let topics = extract("kubernetes kubernetes docker");
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].word, "kubernetes");
    }

    #[test]
    fn drops_short_words_and_stop_words() {
        assert!(extract("go go go the the the ab ab ab").is_empty());
    }

    #[test]
    fn keeps_hyphenated_compounds() {
        let topics = extract("pre-push hooks pre-push hooks");
        assert!(topics.iter().any(|t| t.word == "pre-push"));
        assert!(topics.iter().any(|t| t.word == "hooks"));
    }

    #[test]
    fn trims_trailing_hyphens() {
        let topics = extract("hooks- hooks-");
        assert_eq!(topics, vec![Topic { word: "hooks".into(), count: 2 }]);
    }

    #[test]
    fn strips_images_keeps_link_text() {
        let md = "![diagram diagram](assets/diagram.png)\n[terraform guide](https://example.com/deep/terraform/path)\nterraform";
        let topics = extract(md);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].word, "terraform");
        assert_eq!(topics[0].count, 2);
    }

    #[test]
    fn unwraps_inline_code() {
        let topics = extract("`rustc` compiles rustc compiles");
        assert!(topics.iter().any(|t| t.word == "rustc" && t.count == 2));
    }

    #[test]
    fn strips_html_entities() {
        assert!(extract("&amp; &amp; &quot; &quot;").is_empty());
    }

    #[test]
    fn caps_result_length() {
        let mut md = String::new();
        for i in 0..30 {
            let word = format!("topicword{i:02}");
            md.push_str(&format!("{word} {word} "));
        }
        let topics = extract(&md);
        assert_eq!(topics.len(), MAX_TOPICS);
    }

    #[test]
    fn empty_input_yields_no_topics() {
        assert!(extract("").is_empty());
        assert!(extract("   \n  ").is_empty());
    }
}
