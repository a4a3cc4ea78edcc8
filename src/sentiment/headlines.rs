//! Keyword classification of news headlines

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: &[&str] = &[
    "bull", "bullish", "surge", "surges", "soar", "soars", "rally", "rallies", "gain", "gains",
    "rise", "rises", "jump", "jumps", "record", "high", "adoption", "approval", "approved",
    "breakout", "growth", "boost", "inflows", "partnership", "upgrade", "optimism", "recovery",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bear", "bearish", "crash", "crashes", "plunge", "plunges", "drop", "drops", "fall", "falls",
    "slump", "decline", "loss", "losses", "hack", "hacked", "exploit", "ban", "lawsuit",
    "selloff", "sell-off", "fraud", "scam", "outflows", "liquidation", "liquidations", "slips",
    "fear", "warning", "low",
];

static POSITIVE: Lazy<Option<Regex>> = Lazy::new(|| keyword_regex(POSITIVE_WORDS));
static NEGATIVE: Lazy<Option<Regex>> = Lazy::new(|| keyword_regex(NEGATIVE_WORDS));

/// `(?i)\b(?:w1|w2|...)\b`; `None` only if the pattern fails to compile
fn keyword_regex(words: &[&str]) -> Option<Regex> {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).ok()
}

fn count_hits(pattern: &Option<Regex>, text: &str) -> usize {
    pattern
        .as_ref()
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlineSentiment {
    Positive,
    Negative,
    Neutral,
}

pub fn classify_headline(headline: &str) -> HeadlineSentiment {
    let positive = count_hits(&POSITIVE, headline);
    let negative = count_hits(&NEGATIVE, headline);

    if positive > negative {
        HeadlineSentiment::Positive
    } else if negative > positive {
        HeadlineSentiment::Negative
    } else {
        HeadlineSentiment::Neutral
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

impl NewsBreakdown {
    pub fn tally<S: AsRef<str>>(headlines: &[S]) -> Self {
        headlines
            .iter()
            .fold(NewsBreakdown::default(), |mut breakdown, headline| {
                match classify_headline(headline.as_ref()) {
                    HeadlineSentiment::Positive => breakdown.positive += 1,
                    HeadlineSentiment::Negative => breakdown.negative += 1,
                    HeadlineSentiment::Neutral => breakdown.neutral += 1,
                }
                breakdown.total += 1;
                breakdown
            })
    }

    /// `(positive - negative) / total`, 0 without headlines
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.positive as f64 - self.negative as f64) / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_patterns_compile() {
        assert!(POSITIVE.is_some());
        assert!(NEGATIVE.is_some());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_headline("Bitcoin ETF inflows SURGE to record high"),
            HeadlineSentiment::Positive
        );
        assert_eq!(
            classify_headline("Exchange hacked, token prices plunge"),
            HeadlineSentiment::Negative
        );
        assert_eq!(
            classify_headline("Ethereum developers schedule call"),
            HeadlineSentiment::Neutral
        );
        // one hit each way
        assert_eq!(
            classify_headline("Rally fades as fear returns"),
            HeadlineSentiment::Neutral
        );
    }

    #[test]
    fn test_whole_word_matching() {
        // "highlights" and "bullet" must not count as "high" / "bull"
        assert_eq!(
            classify_headline("Conference highlights bullet points"),
            HeadlineSentiment::Neutral
        );
    }

    #[test]
    fn test_tally_and_score() {
        let headlines = [
            "Bitcoin rally continues",
            "Altcoins slump",
            "Miners crash offline after hack",
            "Weekly recap",
        ];
        let breakdown = NewsBreakdown::tally(&headlines);
        assert_eq!(
            breakdown,
            NewsBreakdown {
                positive: 1,
                negative: 2,
                neutral: 1,
                total: 4
            }
        );
        assert!((breakdown.score() + 0.25).abs() < 1e-12);
        assert_eq!(NewsBreakdown::default().score(), 0.0);
    }
}
