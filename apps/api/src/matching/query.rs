/// Request-scoped query text built from the CV and the optional free-text
/// interests / soft skills supplied alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryProfile {
    text: String,
}

impl QueryProfile {
    /// Concatenates the non-blank inputs. Returns `None` when nothing usable
    /// remains; callers must then skip the embedding provider entirely.
    pub fn build(
        cv_text: &str,
        interests: Option<&str>,
        soft_skills: Option<&str>,
    ) -> Option<Self> {
        let mut parts: Vec<String> = Vec::with_capacity(3);

        let cv_text = cv_text.trim();
        if !cv_text.is_empty() {
            parts.push(cv_text.to_string());
        }
        if let Some(interests) = non_blank(interests) {
            parts.push(format!("Interests: {interests}"));
        }
        if let Some(soft_skills) = non_blank(soft_skills) {
            parts.push(format!("Soft Skills: {soft_skills}"));
        }

        if parts.is_empty() {
            return None;
        }
        Some(Self {
            text: parts.join(" "),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
