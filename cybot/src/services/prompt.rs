use crate::domain::{IntentLabel, Passage};

pub const NO_CONTEXT: &str = "No relevant context found.";

pub const SYSTEM_INSTRUCTIONS: &str = "\
You are Cy-Bot, a friendly and empathetic guide to Kerala's cyber laws.

GREETINGS:
1. Reply to greetings briefly and directly, and end by asking how you can help.

SCOPE:
1. Answer questions about Kerala's cyber laws, cybersecurity, digital rights and related legal matters.
2. If a question is clearly outside this scope (national politics, general knowledge, personal advice, other states' laws), politely decline to answer and say it is outside what you can help with.
3. General cybersecurity questions are fine when they are relevant to Kerala.
4. Always state where your information comes from.

SOURCE ATTRIBUTION:
- Knowledge base only: \"Based on Kerala's cyber laws...\"
- Uploaded document only: \"According to the document you provided...\"
- Both: \"Based on Kerala's cyber laws and the document you provided...\"
- Nothing relevant: \"I couldn't find specific information about this in Kerala's cyber laws or your uploaded documents.\"
Each context passage is tagged with its source in square brackets.

FORMATTING:
1. Format the answer as HTML for a web browser.
2. Wrap paragraphs in <p> and </p>.
3. Use <strong> and </strong> for important terms.
4. Never use asterisks for emphasis.
5. Leave a blank line between paragraphs.

OTHER RULES:
- Be empathetic and polite.
- You are not a lawyer and must not give legal advice.
- Base your answer only on the provided context.

Start with the source attribution, then answer if the question is in scope, or politely decline if it is not.";

/// Everything the generator sees for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub intent: IntentLabel,
    pub context: String,
    pub question: String,
}

impl GenerationRequest {
    pub fn render(&self, instructions: &str) -> String {
        format!(
            "{instructions}\n\nIntent: {}\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:\n",
            self.intent, self.context, self.question
        )
    }
}

#[derive(Debug, Clone)]
pub struct PromptAssembler {
    instructions: String,
}

impl PromptAssembler {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    pub fn request(&self, intent: IntentLabel, passages: &[Passage], question: &str) -> GenerationRequest {
        GenerationRequest {
            intent,
            context: context_block(passages),
            question: question.to_string(),
        }
    }

    pub fn render(&self, request: &GenerationRequest) -> String {
        request.render(&self.instructions)
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(SYSTEM_INSTRUCTIONS)
    }
}

/// Provenance-tagged passages separated by blank lines, or [`NO_CONTEXT`].
pub fn context_block(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return NO_CONTEXT.to_string();
    }
    passages
        .iter()
        .map(|p| format!("{}\n{}", p.provenance(), p.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentId, PassageMetadata};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_context_uses_placeholder() {
        let assembler = PromptAssembler::default();
        let request = assembler.request(IntentLabel::placeholder(), &[], "Hi");
        assert_eq!(request.context, NO_CONTEXT);

        let prompt = assembler.render(&request);
        assert!(prompt.starts_with(SYSTEM_INSTRUCTIONS));
        assert!(prompt.contains("Intent: unknown"));
        assert!(prompt.contains("Context:\nNo relevant context found."));
        assert!(prompt.ends_with("Question: Hi\n\nAnswer:\n"));
    }

    #[test]
    fn test_context_keeps_order_and_provenance() {
        let passages = vec![
            Passage::document("Section 66C deals with identity theft.", DocumentId::generate(), 0),
            Passage::knowledge_base(
                "Whoever fraudulently makes use of a password...",
                PassageMetadata {
                    section: Some("66C".to_string()),
                    ..PassageMetadata::default()
                },
            ),
        ];
        assert_eq!(
            context_block(&passages),
            "[Uploaded document]\nSection 66C deals with identity theft.\n\n\
             [Kerala cyber laws — Section 66C]\nWhoever fraudulently makes use of a password..."
        );
    }

    #[test]
    fn test_question_is_passed_through_verbatim() {
        let assembler = PromptAssembler::new("SYSTEM");
        let request = assembler.request(IntentLabel::new("legal_query"), &[], "a <b> & \"c\"");
        assert_eq!(
            assembler.render(&request),
            "SYSTEM\n\nIntent: legal_query\n\nContext:\nNo relevant context found.\n\nQuestion: a <b> & \"c\"\n\nAnswer:\n"
        );
    }

    #[test]
    fn test_instructions_cover_scope_and_attribution() {
        assert!(SYSTEM_INSTRUCTIONS.contains("politely decline"));
        assert!(SYSTEM_INSTRUCTIONS.contains("Based on Kerala's cyber laws..."));
        assert!(SYSTEM_INSTRUCTIONS.contains("According to the document you provided..."));
        assert!(SYSTEM_INSTRUCTIONS.contains("not a lawyer"));
    }
}
