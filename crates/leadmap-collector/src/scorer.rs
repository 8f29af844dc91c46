//! Lead scoring: how attractive a place is as a prospect for web services.
//!
//! Five independent, additive rules evaluated in a fixed order so the
//! breakdown reads the same on every run:
//!
//! | Rule | Condition | Points |
//! |------|-----------|--------|
//! | No website | website absent or empty | 40 |
//! | Has phone | phone present and non-empty | 20 |
//! | High rating | rating present and >= 4.0 | 15 |
//! | High review count | review count present and >= 50 | 15 |
//! | High-yield sector | sector in the high-yield set | 10 |
//!
//! Priority: `high` at 70 and above, `medium` from 40 to 69, `low` below 40.

use std::collections::HashSet;

use leadmap_core::Priority;
use leadmap_places::PlaceDetails;

pub const NO_WEBSITE_BONUS: u32 = 40;
pub const HAS_PHONE_BONUS: u32 = 20;
pub const HIGH_RATING_BONUS: u32 = 15;
pub const REVIEW_VOLUME_BONUS: u32 = 15;
pub const HIGH_YIELD_SECTOR_BONUS: u32 = 10;

pub const MIN_RATING: f64 = 4.0;
pub const MIN_REVIEWS: u32 = 50;

pub const HIGH_PRIORITY_AT: u32 = 70;
pub const MEDIUM_PRIORITY_AT: u32 = 40;

/// Bonus values, thresholds, and the high-yield sector set.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRules {
    pub no_website_bonus: u32,
    pub has_phone_bonus: u32,
    pub high_rating_bonus: u32,
    pub review_volume_bonus: u32,
    pub high_yield_sector_bonus: u32,
    pub min_rating: f64,
    pub min_reviews: u32,
    pub high_priority_at: u32,
    pub medium_priority_at: u32,
    pub high_yield_sectors: HashSet<String>,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            no_website_bonus: NO_WEBSITE_BONUS,
            has_phone_bonus: HAS_PHONE_BONUS,
            high_rating_bonus: HIGH_RATING_BONUS,
            review_volume_bonus: REVIEW_VOLUME_BONUS,
            high_yield_sector_bonus: HIGH_YIELD_SECTOR_BONUS,
            min_rating: MIN_RATING,
            min_reviews: MIN_REVIEWS,
            high_priority_at: HIGH_PRIORITY_AT,
            medium_priority_at: MEDIUM_PRIORITY_AT,
            high_yield_sectors: HashSet::new(),
        }
    }
}

impl ScoreRules {
    /// Default rules with the given high-yield sector labels.
    #[must_use]
    pub fn with_high_yield_sectors(sectors: HashSet<String>) -> Self {
        Self {
            high_yield_sectors: sectors,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn priority_for(&self, score: u32) -> Priority {
        if score >= self.high_priority_at {
            Priority::High
        } else if score >= self.medium_priority_at {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFactor {
    NoWebsite,
    HasPhone,
    HighRating,
    HighReviewCount,
    HighYieldSector,
}

impl ScoreFactor {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreFactor::NoWebsite => "No Website",
            ScoreFactor::HasPhone => "Has Phone",
            ScoreFactor::HighRating => "High Rating",
            ScoreFactor::HighReviewCount => "High Review Count",
            ScoreFactor::HighYieldSector => "High Yield Sector",
        }
    }
}

/// One satisfied rule and the points it contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorHit {
    pub factor: ScoreFactor,
    pub points: u32,
}

impl std::fmt::Display for FactorHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (+{})", self.factor.label(), self.points)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub score: u32,
    pub priority: Priority,
    pub has_website: bool,
    pub breakdown: Vec<FactorHit>,
}

/// Score one place. Pure: the same details, sector, and rules always give
/// the same card.
#[must_use]
pub fn score_place(details: &PlaceDetails, sector: &str, rules: &ScoreRules) -> ScoreCard {
    let has_website = details.has_website();

    let checks = [
        (ScoreFactor::NoWebsite, !has_website, rules.no_website_bonus),
        (
            ScoreFactor::HasPhone,
            details.phone().is_some(),
            rules.has_phone_bonus,
        ),
        (
            ScoreFactor::HighRating,
            details.rating.is_some_and(|r| r >= rules.min_rating),
            rules.high_rating_bonus,
        ),
        (
            ScoreFactor::HighReviewCount,
            details
                .user_ratings_total
                .is_some_and(|n| n >= rules.min_reviews),
            rules.review_volume_bonus,
        ),
        (
            ScoreFactor::HighYieldSector,
            rules.high_yield_sectors.contains(sector),
            rules.high_yield_sector_bonus,
        ),
    ];

    let breakdown: Vec<FactorHit> = checks
        .into_iter()
        .filter(|(_, satisfied, _)| *satisfied)
        .map(|(factor, _, points)| FactorHit { factor, points })
        .collect();

    let score = breakdown
        .iter()
        .fold(0u32, |acc, hit| acc.saturating_add(hit.points));

    ScoreCard {
        score,
        priority: rules.priority_for(score),
        has_website,
        breakdown,
    }
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
