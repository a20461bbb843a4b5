// Prompts for the "improve with AI" action on entry descriptions.

pub const IMPROVE_SYSTEM: &str = "\
You are an expert resume writer who rewrites resume entry descriptions. \
You make them more impactful and aligned with industry standards while \
keeping every fact the candidate wrote.";

/// Replace `{entry_type}` and `{current_text}` before sending.
pub const IMPROVE_PROMPT_TEMPLATE: &str = r#"Improve the following {entry_type} description for a resume.

CURRENT DESCRIPTION:
{current_text}

REQUIREMENTS:
1. Open with strong action verbs
2. Keep any metrics and results that are present and make them prominent
3. Highlight relevant technical skills already mentioned
4. Be concise but specific
5. Focus on achievements over responsibilities
6. Use industry-appropriate keywords

Return a single paragraph."#;
