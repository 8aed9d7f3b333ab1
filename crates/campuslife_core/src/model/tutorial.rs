//! Onboarding tutorial steps.

/// One overlay step of the onboarding tutorial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialStep {
    /// Screen the step points at.
    pub screen: &'static str,
    pub text: &'static str,
}

/// Ordered tutorial steps.
pub const TUTORIAL_STEPS: &[TutorialStep] = &[
    TutorialStep {
        screen: "home",
        text: "Welcome! This is your home screen with today's stats and tasks.",
    },
    TutorialStep {
        screen: "home",
        text: "Add a task with the Add Task button and delete it once it's done.",
    },
    TutorialStep {
        screen: "schedule",
        text: "Plan recurring classes and one-off events, then compare schedules with friends.",
    },
    TutorialStep {
        screen: "budget",
        text: "Track food and money expenses and set a limit for each category.",
    },
    TutorialStep {
        screen: "avatar",
        text: "Dress up your avatar with hair, outfits and accessories.",
    },
];
