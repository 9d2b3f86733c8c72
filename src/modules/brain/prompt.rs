use crate::modules::knowledge::diseases;

/// The four slots the prompt is filled with.
#[derive(Debug, Clone, Default)]
pub struct PromptContext<'a> {
    pub abstracts: &'a str,
    pub disease_context: &'a str,
    pub gene_context: &'a str,
    pub question: &'a str,
}

pub fn refusal_message() -> String {
    format!(
        "Sorry, I can only answer questions about these 20 rare diseases: {}.",
        diseases::display_list()
    )
}

/// Scope rules and answer format shared by every question.
pub fn preamble() -> String {
    let list = diseases::display_list();
    format!(
        "You are a helpful assistant specialized in rare diseases. \
        You only answer questions about the following diseases: {list}. \
        If asked about anything else, reply: '{refusal}'\n\n\
        For supported questions:\n\
        - Start with a 2–3 sentence summary (TL;DR).\n\
        - Follow with a comprehensive, structured answer using clear headings, bullet points, and explanations.\n\
        - Do not cite PubMed IDs (PMIDs) in your answer. The actual PMIDs will be shown separately in the Sources section.\n\
        - If you do not know the answer from the provided context, say so and do not make up information.\n\n",
        list = list,
        refusal = refusal_message(),
    )
}

pub fn build_prompt(ctx: &PromptContext<'_>) -> String {
    let mut prompt = preamble();
    prompt.push_str("Context from Scientific Abstracts:\n");
    prompt.push_str(ctx.abstracts);
    prompt.push_str("\n\nStructured Knowledge Graph Context (from Blazegraph):\n");
    prompt.push_str(ctx.disease_context);
    prompt.push_str("\n\nGene and MIM Context (from mim2gene.txt):\n");
    prompt.push_str(ctx.gene_context);
    prompt.push_str("\n\nQuestion: ");
    prompt.push_str(ctx.question);
    prompt.push_str("\nAnswer:\n");
    prompt
}
