//! Scoring configuration.
//!
//! Keyword vocabularies and the five-point sub-score curves used by the
//! [`MetricsEngine`](super::MetricsEngine). Every field has a default, so a
//! partial `[scoring]` table only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Highest five-point score.
pub const MAX_SCORE: u8 = 5;
/// Lowest five-point score.
pub const MIN_SCORE: u8 = 1;

/// Saturating map from a count to a five-point score.
///
/// `score(0) = floor`, otherwise
/// `max(floor, clamp(ceil(count / divisor) + offset, 1, 5))`.
/// The map is non-decreasing in `count` and never leaves `floor..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScoreCurve {
    /// Hits needed per step. Larger is a softer slope.
    pub divisor: u32,
    /// Added to the step count.
    pub offset: u8,
    /// Score for a zero count.
    pub floor: u8,
}

impl SubScoreCurve {
    pub const fn new(divisor: u32, offset: u8, floor: u8) -> Self {
        Self {
            divisor,
            offset,
            floor,
        }
    }

    pub fn score(&self, count: usize) -> u8 {
        if count == 0 {
            return self.floor;
        }
        let divisor = self.divisor.max(1) as usize;
        let stepped = count.div_ceil(divisor) + usize::from(self.offset);
        let bounded = stepped.clamp(usize::from(MIN_SCORE), usize::from(MAX_SCORE)) as u8;
        bounded.max(self.floor)
    }

    fn validate(&self, metric: &str) -> CoreResult<()> {
        let invalid = |reason: &str| CoreError::InvalidCurve {
            metric: metric.to_string(),
            reason: reason.to_string(),
        };
        if self.divisor == 0 {
            return Err(invalid("divisor must be at least 1"));
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.floor) {
            return Err(invalid("floor must be between 1 and 5"));
        }
        if self.offset > MAX_SCORE {
            return Err(invalid("offset must be at most 5"));
        }
        Ok(())
    }
}

/// Keyword vocabularies and sub-score curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// A word token containing any of these counts as a filler word.
    pub filler_words: Vec<String>,
    /// A question utterance containing any of these counts as discovery.
    pub discovery_keywords: Vec<String>,
    /// Acknowledge-and-explain phrases that mark objection handling.
    pub objection_phrases: Vec<String>,
    /// Business-value terms.
    pub value_keywords: Vec<String>,
    /// Product and metric terms that show subject-matter fluency.
    pub domain_concepts: Vec<String>,
    pub discovery: SubScoreCurve,
    pub product_knowledge: SubScoreCurve,
    pub objection_handling: SubScoreCurve,
    pub business_value: SubScoreCurve,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            filler_words: strings(&[
                "um",
                "uh",
                "like",
                "you know",
                "basically",
                "literally",
                "actually",
            ]),
            discovery_keywords: strings(&[
                "goal",
                "currently",
                "budget",
                "target",
                "competition",
                "challenge",
                "measure",
                "success",
                "how",
                "what",
                "why",
                "when",
                "where",
            ]),
            objection_phrases: strings(&[
                "understand",
                "let me explain",
                "for example",
                "actually",
                "what i mean",
                "let me show you",
                "i see your point",
                "that makes sense",
            ]),
            value_keywords: strings(&[
                "roi", "return", "revenue", "growth", "customers", "sales", "profit", "increase",
                "improve", "results",
            ]),
            domain_concepts: strings(&[
                "google ads",
                "search campaign",
                "display campaign",
                "performance max",
                "youtube ads",
                "local services ads",
                "keywords",
                "negative keywords",
                "cost per click",
                "cpc",
                "click-through rate",
                "ctr",
                "conversion",
                "roas",
                "quality score",
                "remarketing",
                "audience targeting",
                "bidding",
                "impressions",
                "landing page",
                "ad extensions",
            ]),
            discovery: SubScoreCurve::new(2, 1, 2),
            product_knowledge: SubScoreCurve::new(2, 2, 2),
            objection_handling: SubScoreCurve::new(1, 2, 2),
            business_value: SubScoreCurve::new(1, 1, 2),
        }
    }
}

impl ScoringConfig {
    /// Check curve constants.
    pub fn validate(&self) -> CoreResult<()> {
        self.discovery.validate("discovery")?;
        self.product_knowledge.validate("product_knowledge")?;
        self.objection_handling.validate("objection_handling")?;
        self.business_value.validate("business_value")?;
        Ok(())
    }

    /// Lower-case every vocabulary entry and drop blank ones.
    ///
    /// Matching runs over lower-cased text, and a blank entry would match
    /// everything.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for list in [
            &mut self.filler_words,
            &mut self.discovery_keywords,
            &mut self.objection_phrases,
            &mut self.value_keywords,
            &mut self.domain_concepts,
        ] {
            *list = list
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
        }
        self
    }
}
