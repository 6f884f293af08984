//! Mapping from rule impact to scores, and per-run score aggregation.
//!
//! The impact curve is calibrated so that an impact of 24 units scores 80,
//! 72 scores 60, 168 scores 40, 360 scores 20, and 744 or more scores 0.
//! Impact units are rule-defined but are intended to approximate estimated
//! round-trip delay.

/// Denominator of the impact curve: the impact that costs the first 20
/// points.
const IMPACT_SCALE: f64 = 24.0;

/// Points lost per doubling of (1 + impact / IMPACT_SCALE).
const POINTS_PER_DOUBLING: f64 = 20.0;

/// Maps a rule's accumulated impact to a 0-100 score through the
/// calibrated logarithmic curve. Impact 0 yields exactly 100.
pub fn score_from_impact(impact: f64) -> i32 {
    let raw = 100.0 - POINTS_PER_DOUBLING * (1.0 + impact / IMPACT_SCALE).log2();
    raw.clamp(0.0, 100.0).round() as i32
}

/// Validates a rule-supplied direct score.
///
/// `-1` is the documented "no score could be computed" outcome and maps to
/// `None` silently. Any other out-of-range value is a rule bug: it is
/// logged and clamped into `[0, 100]` - the engine tolerates but does not
/// trust rule-supplied scores.
pub fn sanitize_rule_score(rule_name: &str, score: i32) -> Option<i32> {
    if score == -1 {
        return None;
    }
    if !(0..=100).contains(&score) {
        tracing::error!(rule = rule_name, score, "rule score out of bounds; clamping");
        return Some(score.clamp(0, 100));
    }
    Some(score)
}

/// Mean of the qualifying per-rule scores, rounded toward zero. `None`
/// when no rule qualifies.
pub fn aggregate_score<I>(scores: I) -> Option<i32>
where
    I: IntoIterator<Item = i32>,
{
    let mut total: i64 = 0;
    let mut count: i64 = 0;
    for score in scores {
        total += i64::from(score);
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some((total / count) as i32)
    }
}
