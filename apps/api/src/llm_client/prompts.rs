// Shared prompt fragments. Each feature that calls the LLM keeps its own
// prompts.rs next to it; cross-cutting instructions live here.

/// Appended to system prompts whose answer is shown to the user verbatim.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond with the final text only. \
    Do NOT use markdown, bullet characters or code fences. \
    Do NOT add a preamble, a title, quotes around the answer or any explanation.";

/// Keeps rewrites honest: the model may rephrase, never invent.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the user's text. \
    Do NOT invent employers, numbers, percentages, technologies or outcomes. \
    If the text has no metrics, strengthen the wording without adding any.";
