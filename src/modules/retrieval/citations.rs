use super::abstracts::RetrievedAbstract;

/// Retrieved abstracts joined for the prompt's context slot.
pub fn join_context(docs: &[RetrievedAbstract]) -> String {
    docs.iter().map(|d| d.content.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// "- PMID: <pmid>, Title: <title>..." for every document carrying both fields.
pub fn evidence_list(docs: &[RetrievedAbstract], title_max_chars: usize) -> Vec<String> {
    docs.iter()
        .filter(|d| !d.pmid.is_empty() && !d.title.is_empty())
        .map(|d| {
            let title: String = d.title.chars().take(title_max_chars).collect();
            format!("- PMID: {}, Title: {}...", d.pmid, title)
        })
        .collect()
}
