use regex::Regex;
use std::sync::OnceLock;

const ORDO_PREFIX: &str = "http://www.orpha.net/ORDO/Orphanet_";

/// The 20 diseases the assistant will talk about, paired with their ORDO ids.
/// Order matters: extraction returns the first name found in the query.
pub const SUPPORTED_DISEASES: [(&str, u32); 20] = [
    ("Cystic Fibrosis", 586),
    ("Huntington's Disease", 418),
    ("Duchenne Muscular Dystrophy", 683),
    ("Spinal Muscular Atrophy", 84),
    ("Hemophilia A", 448),
    ("Hemophilia B", 447),
    ("Gaucher Disease", 355),
    ("Pompe Disease", 365),
    ("Neurofibromatosis type 1", 636),
    ("Prader-Willi Syndrome", 739),
    ("Angelman Syndrome", 526),
    ("Rett Syndrome", 802),
    ("Fragile X Syndrome", 908),
    ("Phenylketonuria", 716),
    ("Alpha-1 Antitrypsin Deficiency", 60),
    ("Marfan Syndrome", 284),
    ("Ehlers-Danlos Syndrome, Hypermobile Type", 98253),
    ("Sickle Cell Anemia", 232),
    ("Thalassemia Major", 821),
    ("Crigler-Najjar Syndrome Type 1", 792),
];

/// Loose spellings, checked one disease at a time in this order.
/// Phrases match as substrings, abbreviations only as whole words.
struct Synonyms {
    disease: &'static str,
    phrases: &'static [&'static str],
    abbreviations: &'static [&'static str],
}

const SYNONYMS: [Synonyms; 6] = [
    Synonyms { disease: "Huntington's Disease", phrases: &["huntington"], abbreviations: &[] },
    Synonyms { disease: "Spinal Muscular Atrophy", phrases: &["spinal muscular atrophy"], abbreviations: &["sma"] },
    Synonyms { disease: "Neurofibromatosis type 1", phrases: &[], abbreviations: &["nf1"] },
    Synonyms { disease: "Alpha-1 Antitrypsin Deficiency", phrases: &["alpha-1 antitrypsin"], abbreviations: &["aatd"] },
    Synonyms { disease: "Fragile X Syndrome", phrases: &["fragile x"], abbreviations: &["fxs"] },
    Synonyms { disease: "Phenylketonuria", phrases: &["phenylketonuria"], abbreviations: &["pku"] },
];

pub fn disease_names() -> impl Iterator<Item = &'static str> {
    SUPPORTED_DISEASES.iter().map(|(name, _)| *name)
}

pub fn ordo_uri(name: &str) -> Option<String> {
    SUPPORTED_DISEASES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| format!("{}{}", ORDO_PREFIX, id))
}

/// "Cystic Fibrosis, Huntington's Disease, ..." as used in the prompt and the refusal message.
pub fn display_list() -> String {
    disease_names().collect::<Vec<_>>().join(", ")
}

/// One whole-word pattern per entry of `SYNONYMS`, `None` when it has no abbreviations.
fn abbreviation_patterns() -> &'static Vec<Option<Regex>> {
    static PATTERNS: OnceLock<Vec<Option<Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SYNONYMS
            .iter()
            .map(|s| {
                if s.abbreviations.is_empty() {
                    return None;
                }
                Regex::new(&format!(r"\b(?:{})\b", s.abbreviations.join("|"))).ok()
            })
            .collect()
    })
}

pub fn extract_disease(query: &str) -> Option<&'static str> {
    let query_lower = query.to_lowercase();

    if let Some(name) = disease_names().find(|d| query_lower.contains(&d.to_lowercase())) {
        return Some(name);
    }

    SYNONYMS
        .iter()
        .zip(abbreviation_patterns())
        .find(|(syn, abbr)| {
            syn.phrases.iter().any(|p| query_lower.contains(p))
                || abbr.iter().any(|re| re.is_match(&query_lower))
        })
        .map(|(syn, _)| syn.disease)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_name_is_recognised_in_any_case() {
        for name in disease_names() {
            let q = format!("tell me about {} please", name.to_uppercase());
            assert_eq!(extract_disease(&q), Some(name), "query: {}", q);
        }
    }

    #[test]
    fn hemophilia_a_example() {
        assert_eq!(extract_disease("What is hemophilia A?"), Some("Hemophilia A"));
    }

    #[test]
    fn loose_synonyms() {
        assert_eq!(extract_disease("treatment options for Huntington chorea"), Some("Huntington's Disease"));
        assert_eq!(extract_disease("Is nusinersen approved for SMA?"), Some("Spinal Muscular Atrophy"));
        assert_eq!(extract_disease("NF1 tumour risk"), Some("Neurofibromatosis type 1"));
        assert_eq!(extract_disease("AATD and lung disease"), Some("Alpha-1 Antitrypsin Deficiency"));
        assert_eq!(extract_disease("alpha-1 antitrypsin augmentation"), Some("Alpha-1 Antitrypsin Deficiency"));
        assert_eq!(extract_disease("FXS prevalence"), Some("Fragile X Syndrome"));
        assert_eq!(extract_disease("fragile x premutation carriers"), Some("Fragile X Syndrome"));
        assert_eq!(extract_disease("diet in PKU"), Some("Phenylketonuria"));
    }

    #[test]
    fn synonyms_are_tried_disease_by_disease() {
        // SMA 排在 fragile x 之前，缩写也能先于后面疾病的短语命中
        assert_eq!(extract_disease("SMA or fragile x?"), Some("Spinal Muscular Atrophy"));
        assert_eq!(extract_disease("pku or alpha-1 antitrypsin"), Some("Alpha-1 Antitrypsin Deficiency"));
        assert_eq!(extract_disease("huntington vs nf1"), Some("Huntington's Disease"));
    }

    #[test]
    fn abbreviation_inside_a_word_is_ignored() {
        assert_eq!(extract_disease("what is a smart diet?"), None);
        assert_eq!(extract_disease("the pkunit test"), None);
    }

    #[test]
    fn unrelated_text_has_no_match() {
        assert_eq!(extract_disease("How do I bake sourdough bread?"), None);
        assert_eq!(extract_disease(""), None);
    }

    #[test]
    fn ordo_uris_resolve() {
        assert_eq!(ordo_uri("Hemophilia A").as_deref(), Some("http://www.orpha.net/ORDO/Orphanet_448"));
        assert_eq!(
            ordo_uri("Ehlers-Danlos Syndrome, Hypermobile Type").as_deref(),
            Some("http://www.orpha.net/ORDO/Orphanet_98253")
        );
        assert_eq!(ordo_uri("Common Cold"), None);
    }

    #[test]
    fn display_list_names_all_twenty() {
        let list = display_list();
        assert!(list.starts_with("Cystic Fibrosis, Huntington's Disease"));
        assert!(list.ends_with("Crigler-Najjar Syndrome Type 1"));
        assert_eq!(disease_names().count(), 20);
    }
}
