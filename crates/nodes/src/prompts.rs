//! Prompt templates for the six stages.
//!
//! Each function interpolates its inputs verbatim; stage outputs that failed
//! upstream arrive here as their descriptive text.

pub fn data_collector(raw_input: &str) -> String {
    format!(
        "You are a Data Collector Agent. You have received placement data from several \
sources (OKRs, job applications, rejections, mock interviews). Read all of the raw text \
and consolidate it into a single, clean, structured summary, combining the records for \
each student.

Raw Data:
{raw_input}

Consolidated Structured Data Summary:
Respond with plain JSON text only, without any markdown formatting."
    )
}

pub fn insight_synthesizer(structured_data: &str) -> String {
    format!(
        "You are an Insight Synthesizer Agent. Analyze the structured placement data and \
produce 3-5 actionable insights about the root causes of placement rejections.

Structured Placement Data:
{structured_data}

Actionable Insights:"
    )
}

pub fn trend_comparator(historical_data: &str, insights: &str) -> String {
    format!(
        "You are a Trend Comparator Agent. Compare the Current Placement Insights with the \
Historical Data below. Highlight new trends as well as recurring problems.

Historical Data:
{historical_data}

Current Placement Insights:
{insights}

Trend Comparison:"
    )
}

pub fn action_recommender(insights: &str, trend_comparison: &str) -> String {
    format!(
        "You are an Action Recommender Agent. Based on the insights and the trend \
comparison, suggest exactly 3 concrete actions the college can take.

Placement Insights:
{insights}

Trend Comparison:
{trend_comparison}

Action Recommendations:"
    )
}

pub fn report_generator(insights: &str, trend_comparison: &str, recommendations: &str) -> String {
    format!(
        "You are a Report Generator Agent. Combine all of the information into a \
professional Markdown report with exactly these sections: Key Insights Summary, \
Trend Comparison Analysis, and Actionable Recommendations.

Information to use:
- Key Insights: {insights}
- Trend Comparison: {trend_comparison}
- Recommendations: {recommendations}

Final Placement Report:"
    )
}

pub fn stakeholder_notifier(report: &str) -> String {
    format!(
        "Based on the final report, draft a concise email to the Placement Head and a \
short notification for the college portal.

Report:
{report}

Drafted Communications:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_prompt_names_all_three_sections() {
        let prompt = report_generator("i", "t", "r");
        for section in [
            "Key Insights Summary",
            "Trend Comparison Analysis",
            "Actionable Recommendations",
        ] {
            assert!(prompt.contains(section), "missing section {section}");
        }
    }

    #[test]
    fn prompts_embed_their_inputs_verbatim() {
        let input = "Asha: 3 rejections\nRavi: offer from Acme";
        assert!(data_collector(input).contains(input));
        assert!(insight_synthesizer(input).contains(input));
        assert!(stakeholder_notifier(input).contains(input));

        let trend = trend_comparator("HISTORY", "INSIGHTS");
        assert!(trend.find("HISTORY").unwrap() < trend.find("INSIGHTS").unwrap());
    }
}
