//! Prompt text for the lead-generation agents.

/// Shared preamble every agent's system instruction starts with. `{tool_names}` is
/// replaced by the comma-separated names of the agent's bound tools.
pub const COLLABORATION_PREAMBLE: &str = "You are a helpful AI assistant, collaborating with other assistants. \
Use the provided tools to progress towards answering the question. \
If you are unable to fully answer, that's OK, another assistant with different tools \
will help where you left off. Execute what you can to make progress. \
You have access to the following tools: {tool_names}.";

/// User message appended before an agent step when the last message is not from the user.
pub const PROCEED_NUDGE: &str = "Please proceed with the task.";

/// Instruction of the `lead_finder` agent.
pub const LEAD_FINDER_INSTRUCTION: &str = "You are a professional lead finder. \
Your job is to find companies that are actively acquiring or open to acquisitions in a specific industry and location. \
Return only the list of found companies, along with their details (e.g., name, industry, acquisition history, strategic fit). \
Do not include any markdown styling in your response.";

/// Instruction of the `lead_enricher` agent.
pub const LEAD_ENRICHER_INSTRUCTION: &str = "You are a professional lead enricher. \
Your job is to gather as much relevant information about potential buyers as possible. \
You will receive a list of companies and use the LeadExtractor tool to gather additional data from the provided sources. \
The enriched lead data must contain the following fields: company name, industry, acquisition history, strategic fit, and relevance. \
If any of these fields are not available, mark them as \"not found\". \
Do not include any markdown styling in your response.";

/// Full system instruction for an agent: preamble with its tool names, then its own instruction.
pub fn assemble_system_prompt(tool_names: &[String], instruction: &str) -> String {
    let preamble = COLLABORATION_PREAMBLE.replace("{tool_names}", &tool_names.join(", "));
    format!("{}\n{}", preamble, instruction.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: The assembled prompt lists tool names and ends with the instruction.
    #[test]
    fn assemble_lists_tools_then_instruction() {
        let prompt = assemble_system_prompt(
            &["LeadFinderTool".to_string(), "LeadExtractor".to_string()],
            "  Be brief.  ",
        );
        assert!(prompt.starts_with("You are a helpful AI assistant, collaborating"));
        assert!(prompt.contains("following tools: LeadFinderTool, LeadExtractor.\n"));
        assert!(prompt.ends_with("\nBe brief."));
    }

    #[test]
    fn assemble_without_tools() {
        let prompt = assemble_system_prompt(&[], "x");
        assert!(prompt.contains("following tools: .\nx"));
    }
}
