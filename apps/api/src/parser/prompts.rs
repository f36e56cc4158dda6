// Resume parser prompt template.
// The JSON shape below is a contract with the oracle and with downstream
// consumers; `project_discription` is spelled the way consumers expect it.

use crate::llm_client::prompts::{GenerationParams, PromptPayload};
use crate::parser::extract::NormalizedText;

pub const RESUME_PARSE_PROMPT: &str = "\
Summarize the text below into a JSON with exactly the following structure \
{basic_info: {first_name, last_name, full_name, email, phone_number, location, \
portfolio_website_url, linkedin_url, github_main_page_url, university, \
education_level (BS, MS, or PhD), graduation_year, graduation_month, majors, GPA}, \
work_experience: [{job_title, company, location, duration, job_summary}], \
project_experience:[{project_name, project_discription}]}
";

/// Output budget for a full resume; the generic default is far too small.
pub const RESUME_MAX_TOKENS: u32 = 1500;

/// Generation parameters for resume parsing on `engine`.
pub fn resume_params(engine: &str, max_tokens: u32) -> GenerationParams {
    GenerationParams::default()
        .with_engine(engine)
        .with_max_tokens(max_tokens)
}

/// Prompt = template, a newline, then the resume text. No length checks here;
/// the completion client does the budgeting.
pub fn build_resume_prompt(text: &NormalizedText, params: GenerationParams) -> PromptPayload {
    let prompt = format!("{}\n{}", RESUME_PARSE_PROMPT, text.as_str());
    PromptPayload::new(prompt, params)
}
