// Prompt constants for provider calls.

pub const CV_SUMMARY_SYSTEM: &str = "You are a helpful assistant.";

/// Structured CV profile prompt. `{content}` is replaced with the extracted CV text.
pub const CV_SUMMARY_PROMPT: &str = "\
You are analyzing a CV to produce a concise, structured profile that will be compared \
against job descriptions.

Extract and organize the key details into these sections:

1. Professional Summary: at most five sentences on career focus, expertise and achievements.
2. Key Skills and Expertise: technical skills (languages, tools, frameworks, services) \
and non-technical skills (leadership, communication).
3. Work Experience: for each role, the job title, organization, duration, and key \
responsibilities and accomplishments.
4. Technologies and Tools: every software product, language, framework, API service and \
tool the candidate has used.
5. Education: degrees, fields of study and institutions.
6. Certifications and Training: certifications, courses and training programs.
7. Languages: spoken languages and proficiency levels.
8. Projects: significant projects or achievements.
9. Keywords: the important keywords that characterize the candidate's expertise.

CV content:

{content}

Respond in the structured format above.";

pub fn cv_summary_prompt(cv_text: &str) -> String {
    CV_SUMMARY_PROMPT.replace("{content}", cv_text)
}
