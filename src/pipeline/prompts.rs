//! Prompt templates
//!
//! Every generation call in the pipeline renders exactly one of these
//! templates. The eligibility, question, and proposal templates are
//! conditioned on the grant type label; the answer template is not.

use std::collections::BTreeMap;

use super::classify::GrantType;
use super::redact::humanize_key;

pub(crate) fn classification_prompt(grant_content: &str) -> String {
    format!(
        r#"Analyze the grant information below and determine whether this grant is primarily intended for:
1. Companies/Organizations
2. Individuals

Your response should be exactly one word: either "ORGANIZATION" or "INDIVIDUAL".

Grant Information:
------------------
{grant_content}
------------------
"#
    )
}

pub(crate) fn eligibility_prompt(grant_content: &str, grant_type: GrantType) -> String {
    match grant_type {
        GrantType::Organization => format!(
            r#"You are a grant eligibility expert. Based on the grant information provided, extract the key eligibility requirements that an ORGANIZATION must meet to qualify for this grant.

Focus on extracting concrete eligibility criteria such as:
- Company size/employee requirements
- Revenue thresholds or limitations
- Years in operation
- Industry or sector requirements
- Legal structure requirements (for-profit, non-profit, etc.)
- Location or jurisdiction requirements
- Previous funding history limitations
- Any other specific eligibility criteria mentioned

Format your response as a bulleted list of eligibility points. Each point should be clear and concise.
If the grant information doesn't specify a particular criterion, don't include it.

Grant Information:
------------------
{grant_content}
------------------

Key eligibility requirements for organizations:
"#
        ),
        GrantType::Individual => format!(
            r#"You are a grant eligibility expert. Based on the grant information provided, extract the key eligibility requirements that an INDIVIDUAL must meet to qualify for this grant.

Focus on extracting concrete eligibility criteria such as:
- Age requirements
- Educational qualifications
- Professional experience requirements
- Residency or citizenship requirements
- Income thresholds
- Previous grant/funding history limitations
- Portfolio or work samples requirements
- Specific skills or credentials needed
- Any other specific eligibility criteria mentioned

Format your response as a bulleted list of eligibility points. Each point should be clear and concise.
If the grant information doesn't specify a particular criterion, don't include it.

Grant Information:
------------------
{grant_content}
------------------

Key eligibility requirements for individuals:
"#
        ),
    }
}

pub(crate) fn questions_prompt(grant_content: &str, grant_type: GrantType) -> String {
    match grant_type {
        GrantType::Organization => format!(
            r#"You are a grant eligibility expert. Based on the grant information provided, write the questions an ORGANIZATION should answer to determine whether it qualifies for this grant.

Cover areas such as company size, revenue, years in operation, industry, legal structure, location, and previous funding history, but only where the grant information actually mentions them.

Format your response as a numbered list of direct yes/no or short-answer questions addressed to the organization.

Grant Information:
------------------
{grant_content}
------------------

Eligibility questions for organizations:
"#
        ),
        GrantType::Individual => format!(
            r#"You are a grant eligibility expert. Based on the grant information provided, write the questions an INDIVIDUAL should answer to determine whether they qualify for this grant.

Cover areas such as age, education, professional experience, residency or citizenship, income, portfolio or work samples, and previous funding history, but only where the grant information actually mentions them.

Format your response as a numbered list of direct yes/no or short-answer questions addressed to the applicant.

Grant Information:
------------------
{grant_content}
------------------

Eligibility questions for individuals:
"#
        ),
    }
}

pub(crate) fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are a grant eligibility expert. Answer the user's question using only the grant information provided below. If the information does not contain the answer, say so rather than guessing.

Grant Information:
------------------
{context}
------------------

Question: {question}

Answer:
"#
    )
}

pub(crate) fn proposal_prompt(
    grant_content: &str,
    redacted_inputs: &BTreeMap<String, String>,
    grant_type: GrantType,
) -> String {
    let formatted_inputs = format_inputs(redacted_inputs);

    match grant_type {
        GrantType::Organization => format!(
            r#"You are an expert grant writer specializing in COMPANY/ORGANIZATION grant proposals. Based on the grant information and the organization's inputs, create a professional grant proposal tailored for an organizational applicant.

Structure your proposal with these company-focused sections:
1. Executive Summary
2. Organization Background and Capability
3. Project Description and Alignment with Grant Objectives
4. Organizational Capacity and Resources
5. Implementation Plan with Roles and Responsibilities
6. Budget and Financial Sustainability
7. Expected Outcomes and Impact Measurement
8. Risk Management and Contingency Plans
9. Conclusion

IMPORTANT: For any sections requiring specific personal information (names, contact details, etc.), use placeholders like [ORGANIZATION REPRESENTATIVE NAME], [CONTACT EMAIL], etc. instead of generating fictional personal information.

Emphasize organizational strengths, capacity, track record, and how the company's mission aligns with the grant's purpose.

Grant Information:
------------------
{grant_content}
------------------

Organization Information:
------------------
{formatted_inputs}
------------------

Create a complete and professional company-focused grant proposal with appropriate placeholders for sensitive information:
"#
        ),
        GrantType::Individual => format!(
            r#"You are an expert grant writer specializing in INDIVIDUAL grant proposals. Based on the grant information and the individual's inputs, create a professional grant proposal tailored for an individual applicant.

Structure your proposal with these individual-focused sections:
1. Executive Summary
2. Personal Background and Qualifications
3. Project Description and Alignment with Grant Objectives
4. Personal Capacity and Resources
5. Implementation Plan with Timeline
6. Budget and Financial Plan
7. Expected Outcomes and Personal Growth
8. Future Directions and Sustainability
9. Conclusion

IMPORTANT: For any sections requiring specific personal information (names, contact details, etc.), use placeholders like [YOUR NAME], [YOUR EMAIL], [YOUR PHONE NUMBER], etc. instead of generating fictional personal information.

Emphasize personal qualifications, experiences, skills, and how the individual's goals align with the grant's purpose.

Grant Information:
------------------
{grant_content}
------------------

Individual Information:
------------------
{formatted_inputs}
------------------

Create a complete and professional individual-focused grant proposal with appropriate placeholders for sensitive information:
"#
        ),
    }
}

/// Render input fields as "Key: value" lines with human-readable keys.
/// Expects already-redacted inputs; humanizing is idempotent for keys the
/// redaction step rewrote.
fn format_inputs(inputs: &BTreeMap<String, String>) -> String {
    let mut formatted = String::new();
    for (key, value) in inputs {
        formatted.push_str(&humanize_key(key));
        formatted.push_str(": ");
        formatted.push_str(value);
        formatted.push('\n');
    }
    formatted
}
