//! Lexicon sentiment: offline compound score in [-1, 1]
//!
//! Word valences with negation flips, intensifier boosts and exclamation
//! emphasis, squashed with x / sqrt(x² + 15).

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::providers::SentimentScorer;
use crate::types::Result;

/// Valence of a strongly positive word
const STRONG_POSITIVE: f64 = 3.0;
/// Valence of a mildly positive word
const MILD_POSITIVE: f64 = 1.8;
/// Valence of a mildly negative word
const MILD_NEGATIVE: f64 = -1.8;
/// Valence of a strongly negative word
const STRONG_NEGATIVE: f64 = -3.0;

/// Negated words flip and lose some weight
const NEGATION_SCALAR: f64 = -0.74;
/// Added to the magnitude of the word after an intensifier
const INTENSIFIER_BOOST: f64 = 0.3;
/// Per exclamation mark, at most three
const EXCLAMATION_BOOST: f64 = 0.292;
/// Squashing constant
const ALPHA: f64 = 15.0;
/// Negations reach this many tokens ahead
const NEGATION_WINDOW: usize = 3;

lazy_static! {
    static ref RE_TOKEN: Regex = Regex::new(r"[a-z]+(?:'[a-z]+)?").unwrap();

    static ref RE_NEGATION: Regex = Regex::new(
        r"^(not|no|never|none|nothing|nobody|neither|nor|cannot|without|hardly|isn't|aren't|wasn't|weren't|don't|doesn't|didn't|won't|wouldn't|can't|couldn't|shouldn't|ain't)$"
    ).unwrap();

    static ref RE_INTENSIFIER: Regex = Regex::new(
        r"^(very|really|so|extremely|totally|absolutely|completely|strongly|incredibly|super|truly|highly|deeply|definitely)$"
    ).unwrap();

    static ref LEXICON: HashMap<&'static str, f64> = {
        let mut m = HashMap::new();
        for w in [
            "love", "loved", "loves", "amazing", "awesome", "excellent", "incredible",
            "breathtaking", "fantastic", "wonderful", "perfect", "best", "beautiful",
            "brilliant", "outstanding", "superb", "delightful", "thrilled", "adore",
        ] {
            m.insert(w, STRONG_POSITIVE);
        }
        for w in [
            "good", "great", "nice", "like", "liked", "agree", "agreed", "enjoy", "enjoyed",
            "happy", "glad", "helpful", "calming", "calm", "fair", "valid", "insightful",
            "interesting", "thanks", "thank", "cool", "fun", "fresh", "peaceful", "powerful",
            "positive", "support", "right", "true", "useful", "better", "win", "hope",
            "pleasant", "refreshing", "relax", "dream", "alive", "stunning", "therapeutic",
            "organized", "flexible", "recommend", "smart", "kind", "welcome", "yes",
        ] {
            m.insert(w, MILD_POSITIVE);
        }
        for w in [
            "bad", "wrong", "disagree", "annoying", "overrated", "complicated", "boring",
            "sad", "angry", "negative", "problem", "fail", "failed", "poor", "worse",
            "frustrated", "frustrating", "confusing", "ugly", "unfair", "useless", "lose",
            "dislike", "doubt", "pointless", "broken", "hard", "difficult", "sorry",
            "mad", "upset", "against", "lazy", "meh", "no",
        ] {
            m.insert(w, MILD_NEGATIVE);
        }
        for w in [
            "hate", "hated", "terrible", "awful", "worst", "horrible", "disgusting", "sucks",
            "stupid", "idiot", "garbage", "trash", "pathetic", "nonsense", "ridiculous",
            "miserable", "toxic", "disaster",
        ] {
            m.insert(w, STRONG_NEGATIVE);
        }
        m
    };
}

/// Lexicon-based sentiment scorer
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    /// Create new scorer
    pub fn new() -> Self {
        Self
    }

    /// Compound score in [-1, 1]; 0.0 for text without sentiment words
    pub fn compound(&self, text: &str) -> f64 {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return 0.0;
        }

        let tokens: Vec<&str> = RE_TOKEN.find_iter(&lower).map(|m| m.as_str()).collect();
        let mut sum = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&valence) = LEXICON.get(token) else {
                continue;
            };
            // "no" only counts on its own, not as a negation of the next word
            if *token == "no" && tokens.get(i + 1).is_some_and(|t| LEXICON.contains_key(t)) {
                continue;
            }

            let mut v = valence;
            if i > 0 && RE_INTENSIFIER.is_match(tokens[i - 1]) {
                v += INTENSIFIER_BOOST * v.signum();
            }
            let window = i.saturating_sub(NEGATION_WINDOW)..i;
            if tokens[window].iter().any(|t| RE_NEGATION.is_match(t)) {
                v *= NEGATION_SCALAR;
            }
            sum += v;
        }

        if sum != 0.0 {
            let bangs = lower.matches('!').count().min(3) as f64;
            sum += bangs * EXCLAMATION_BOOST * sum.signum();
        }

        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

impl SentimentScorer for LexiconSentiment {
    fn sentiment(&self, text: &str) -> Result<f64> {
        Ok(self.compound(text))
    }
}

// =============================================================================
// TESTS
// =============================================================================
