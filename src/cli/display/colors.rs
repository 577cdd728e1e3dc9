//! Color mapping for analysis values.
//!
//! console disables styling automatically when stdout is not a terminal or
//! `NO_COLOR` is set.

use console::{style, StyledObject};

use crate::services::sampling_operator::CadenceReason;
use crate::services::evidence_scorer::HIGH_CONFIDENCE;

/// Green above the high-confidence mark, yellow from 0.4, dim below.
pub fn colorize_confidence(confidence: f64) -> StyledObject<String> {
    let text = format!("{:.0}%", confidence * 100.0);
    if confidence > HIGH_CONFIDENCE {
        style(text).green().bold()
    } else if confidence >= 0.4 {
        style(text).yellow()
    } else {
        style(text).dim()
    }
}

/// Convergence share in cyan, bold when every view agrees.
pub fn colorize_convergence(convergence: f64) -> StyledObject<String> {
    let text = format!("{convergence:.3}");
    if convergence >= 1.0 {
        style(text).cyan().bold()
    } else {
        style(text).cyan()
    }
}

pub fn colorize_cadence(reason: CadenceReason) -> StyledObject<&'static str> {
    match reason {
        CadenceReason::EnergyHigh => style(reason.as_str()).red(),
        CadenceReason::EnergyLow => style(reason.as_str()).blue(),
        CadenceReason::Manual => style(reason.as_str()).white(),
    }
}
