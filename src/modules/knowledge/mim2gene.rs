use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::errors::{AssistantError, AssistantResult};

pub const GENE_NOT_FOUND: &str = "No specific gene or MIM data found in mim2gene.txt.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimEntryType {
    Gene,
    Phenotype,
    GenePhenotype,
    PredominantlyPhenotypes,
    MovedRemoved,
    Other(String),
}

impl From<&str> for MimEntryType {
    fn from(s: &str) -> Self {
        match s.trim() {
            "gene" => MimEntryType::Gene,
            "phenotype" => MimEntryType::Phenotype,
            "gene/phenotype" => MimEntryType::GenePhenotype,
            "predominantly phenotypes" => MimEntryType::PredominantlyPhenotypes,
            "moved/removed" => MimEntryType::MovedRemoved,
            other => MimEntryType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MimEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MimEntryType::Gene => "gene",
            MimEntryType::Phenotype => "phenotype",
            MimEntryType::GenePhenotype => "gene/phenotype",
            MimEntryType::PredominantlyPhenotypes => "predominantly phenotypes",
            MimEntryType::MovedRemoved => "moved/removed",
            MimEntryType::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    pub mim_number: String,
    pub entry_type: MimEntryType,
    pub entrez_gene_id: Option<String>,
    pub symbol: Option<String>,
}

impl GeneRecord {
    pub fn to_context_block(&self) -> String {
        format!(
            "MIM Number: {}\n\
            MIM Entry Type: {}\n\
            Entrez Gene ID: {}\n\
            Approved Gene Symbol: {}",
            self.mim_number,
            self.entry_type,
            self.entrez_gene_id.as_deref().unwrap_or("N/A"),
            self.symbol.as_deref().unwrap_or("N/A"),
        )
    }
}

/// mim2gene.txt 索引: 基因符号 (大写) 与 Entrez ID 指向同一条记录。
/// MIM 编号单独建索引，六位数字的 MIM 号也能命中。
#[derive(Debug, Default)]
pub struct GeneTable {
    by_key: HashMap<String, Arc<GeneRecord>>,
    by_mim: HashMap<String, Arc<GeneRecord>>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

impl GeneTable {
    pub fn load(path: impl AsRef<Path>) -> AssistantResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Resource(format!("cannot read gene table {}: {}", path.display(), e))
        })?;
        let table = Self::parse(&text);
        info!("🧬 Gene table loaded: {} keys, {} MIM entries from {}", table.len(), table.by_mim.len(), path.display());
        Ok(table)
    }

    pub fn parse(text: &str) -> Self {
        let mut table = GeneTable::default();
        let mut skipped = 0usize;

        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
            if parts.len() < 4 {
                skipped += 1;
                continue;
            }

            let record = Arc::new(GeneRecord {
                mim_number: parts[0].trim().to_string(),
                entry_type: MimEntryType::from(parts[1]),
                entrez_gene_id: non_empty(parts[2]),
                symbol: non_empty(parts[3]),
            });

            // 符号: 后出现的覆盖前面的
            if let Some(symbol) = &record.symbol {
                table.by_key.insert(symbol.to_uppercase(), record.clone());
            }
            // Entrez ID: 先到先得
            if let Some(entrez) = &record.entrez_gene_id {
                table.by_key.entry(entrez.clone()).or_insert_with(|| record.clone());
            }
            table.by_mim.entry(record.mim_number.clone()).or_insert(record);
        }

        if skipped > 0 {
            debug!("mim2gene: skipped {} lines without a gene mapping", skipped);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&GeneRecord> {
        self.by_key
            .get(identifier)
            .or_else(|| self.by_mim.get(identifier))
            .map(|r| r.as_ref())
    }

    fn contains(&self, identifier: &str) -> bool {
        self.by_key.contains_key(identifier) || self.by_mim.contains_key(identifier)
    }

    /// First six-digit token that is known, otherwise the first known
    /// uppercase symbol-like token ("CFTR", "SMN1", "HBB").
    pub fn extract_identifier(&self, query: &str) -> Option<String> {
        static MIM_RE: OnceLock<Regex> = OnceLock::new();
        static SYMBOL_RE: OnceLock<Regex> = OnceLock::new();
        let mim_re = MIM_RE.get_or_init(|| Regex::new(r"\b\d{6}\b").expect("static regex"));
        let symbol_re = SYMBOL_RE.get_or_init(|| Regex::new(r"\b[A-Z][A-Z0-9]{2,}\b").expect("static regex"));

        if let Some(m) = mim_re.find_iter(query).map(|m| m.as_str()).find(|m| self.contains(m)) {
            return Some(m.to_string());
        }
        symbol_re
            .find_iter(query)
            .map(|m| m.as_str())
            .find(|m| self.contains(m))
            .map(str::to_string)
    }

    /// Gene/MIM block for the prompt, or the "not found" sentinel.
    pub fn context_for_query(&self, query: &str) -> String {
        self.extract_identifier(query)
            .and_then(|id| self.get(&id))
            .map(GeneRecord::to_context_block)
            .unwrap_or_else(|| GENE_NOT_FOUND.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Copyright (c) Johns Hopkins University\n\
# MIM Number\tMIM Entry Type\tEntrez Gene ID (NCBI)\tApproved Gene Symbol (HGNC)\tEnsembl Gene ID\n\
100050\tpredominantly phenotypes\t\t\t\n\
219700\tphenotype\t\t\t\n\
602421\tgene\t1080\tCFTR\tENSG00000001626\n\
300841\tgene\t2157\tF8\tENSG00000185010\n\
600354\tgene\t6606\tSMN1\tENSG00000172062\n\
613794\tgene\t613794\tFAKE\t\n\
100100\tphenotype\n";

    #[test]
    fn symbol_and_entrez_share_one_record() {
        let table = GeneTable::parse(SAMPLE);
        let by_symbol = table.get("CFTR").unwrap();
        let by_entrez = table.get("1080").unwrap();
        assert_eq!(by_symbol, by_entrez);
        assert_eq!(by_symbol.mim_number, "602421");
        assert_eq!(by_symbol.entry_type, MimEntryType::Gene);
    }

    #[test]
    fn comments_and_short_lines_are_skipped() {
        let table = GeneTable::parse(SAMPLE);
        assert!(table.get("100100").is_none());
        assert!(table.get("# MIM Number").is_none());
    }

    #[test]
    fn symbol_token_is_extracted() {
        let table = GeneTable::parse(SAMPLE);
        assert_eq!(table.extract_identifier("Which variants of CFTR matter?"), Some("CFTR".to_string()));
        assert_eq!(table.extract_identifier("Is SMN1 deleted in SMA?"), Some("SMN1".to_string()));
    }

    #[test]
    fn six_digit_token_is_extracted_before_symbols() {
        let table = GeneTable::parse(SAMPLE);
        assert_eq!(table.extract_identifier("CFTR or 613794?"), Some("613794".to_string()));
        assert_eq!(table.extract_identifier("what is MIM 602421"), Some("602421".to_string()));
    }

    #[test]
    fn unknown_or_lowercase_tokens_do_not_match() {
        let table = GeneTable::parse(SAMPLE);
        assert_eq!(table.extract_identifier("What is hemophilia A?"), None);
        assert_eq!(table.extract_identifier("tell me about cftr"), None);
        assert_eq!(table.extract_identifier("number 999999 and XYZ"), None);
        // 七位数字不是 MIM 号
        assert_eq!(table.extract_identifier("6024210"), None);
    }

    #[test]
    fn context_block_and_sentinel() {
        let table = GeneTable::parse(SAMPLE);
        assert_eq!(
            table.context_for_query("role of SMN1 in motor neurons"),
            "MIM Number: 600354\n\
             MIM Entry Type: gene\n\
             Entrez Gene ID: 6606\n\
             Approved Gene Symbol: SMN1"
        );
        // 两个字符的符号 (F8) 太短，不参与匹配
        assert_eq!(table.context_for_query("role of F8 in bleeding"), GENE_NOT_FOUND);
        assert_eq!(table.context_for_query("What is hemophilia A?"), GENE_NOT_FOUND);
    }

    #[test]
    fn phenotype_only_entries_render_na() {
        let table = GeneTable::parse(SAMPLE);
        let block = table.context_for_query("entry 219700");
        assert!(block.contains("MIM Entry Type: phenotype"));
        assert!(block.contains("Entrez Gene ID: N/A"));
        assert!(block.contains("Approved Gene Symbol: N/A"));
    }
}
