use serde::{Deserialize, Serialize};

/// One stage of the linear reporting procedure.
///
/// Steps are totally ordered for forward navigation. `PhotoProcessing`
/// has no user interaction; backward navigation skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    Photo,
    PhotoProcessing,
    Location,
    Contact,
    Review,
    SubmitResult,
}

impl Step {
    /// All steps in forward order.
    pub const ALL: [Step; 7] = [
        Step::Start,
        Step::Photo,
        Step::PhotoProcessing,
        Step::Location,
        Step::Contact,
        Step::Review,
        Step::SubmitResult,
    ];

    /// The next step in sequence, or `None` at the final step.
    pub fn next(self) -> Option<Step> {
        let idx = self.index();
        Step::ALL.get(idx + 1).copied()
    }

    /// The previous interactive step, skipping non-interactive steps.
    /// Returns `None` at the first step.
    pub fn previous_interactive(self) -> Option<Step> {
        let idx = self.index();
        Step::ALL[..idx]
            .iter()
            .rev()
            .copied()
            .find(|s| s.is_interactive())
    }

    /// Whether the user interacts with this step. Non-interactive steps
    /// auto-advance once their async producer settles.
    pub fn is_interactive(self) -> bool {
        !matches!(self, Step::PhotoProcessing)
    }

    fn index(self) -> usize {
        Step::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}
