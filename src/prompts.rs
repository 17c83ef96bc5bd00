//! Suggested starter prompts shown before the first question is asked.

/// A canned question a user can pick instead of typing their own.
#[derive(Debug, Clone, Copy)]
pub struct SuggestedPrompt {
    pub heading: &'static str,
    pub prompt: &'static str,
}

/// Starter prompts for a Terms & Conditions conversation.
pub const SUGGESTED_PROMPTS: &[SuggestedPrompt] = &[
    SuggestedPrompt {
        heading: "Extract and Explain Specific Clause",
        prompt: "Please extract the section of the Terms and Conditions related to user data \
                 privacy and explain in simple language what it means for me as a user. Include \
                 any specific obligations I have to protect my data.",
    },
    SuggestedPrompt {
        heading: "Compare and Analyze Termination Terms",
        prompt: "Compare the termination clauses in this T&C with standard industry practices \
                 for online services. Highlight any unusual terms and explain their implications \
                 for me as a user.",
    },
];
