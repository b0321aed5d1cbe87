// CV intake: uploaded document → plain text → (optional) structured summary.

pub mod extract;
pub mod summarizer;
