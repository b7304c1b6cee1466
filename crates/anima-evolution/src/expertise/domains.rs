//! Static domain detection rules
//!
//! Each rule classifies a session into one domain from three independent
//! signals: file-extension substrings in serialized tool arguments, patterns
//! in tool names, and keywords in stringified tool results. All matching is
//! lowercase substring containment; a session can match any number of
//! domains, each counted independently.

use anima_common::ToolCall;

/// Detection rule for one expertise domain
#[derive(Debug, Clone, Copy)]
pub struct DomainRule {
    /// Domain name as stored in the profile
    pub name: &'static str,
    /// File-extension substrings matched against serialized arguments
    pub file_extensions: &'static [&'static str],
    /// Substrings matched against tool names
    pub tool_patterns: &'static [&'static str],
    /// Keywords matched against stringified tool results
    pub result_keywords: &'static [&'static str],
}

/// The static rule table for an autonomous coding/DeFi agent
pub const DOMAIN_RULES: &[DomainRule] = &[
    DomainRule {
        name: "defi",
        file_extensions: &[".sol"],
        tool_patterns: &["yield", "pool", "stake", "liquidity", "vault"],
        result_keywords: &["apy", "tvl", "liquidity", "collateral"],
    },
    DomainRule {
        name: "trading",
        file_extensions: &[],
        tool_patterns: &["swap", "trade", "order", "quote"],
        result_keywords: &["slippage", "fill", "bid", "ask", "spread"],
    },
    DomainRule {
        name: "rust_development",
        file_extensions: &[".rs", "cargo.toml"],
        tool_patterns: &["cargo"],
        result_keywords: &["borrow checker", "rustc", "clippy"],
    },
    DomainRule {
        name: "web_development",
        file_extensions: &[".tsx", ".jsx", ".html", ".css", ".ts", ".js"],
        tool_patterns: &["browser", "fetch"],
        result_keywords: &["http", "dom", "endpoint"],
    },
    DomainRule {
        name: "data_analysis",
        file_extensions: &[".csv", ".parquet", ".ipynb"],
        tool_patterns: &["query", "sql"],
        result_keywords: &["dataframe", "median", "correlation", "rows returned"],
    },
    DomainRule {
        name: "devops",
        file_extensions: &["dockerfile", ".yaml", ".yml", ".tf"],
        tool_patterns: &["kubectl", "docker", "deploy", "terraform"],
        result_keywords: &["container", "pipeline", "rollout"],
    },
    DomainRule {
        name: "testing",
        file_extensions: &["_test.", ".spec."],
        tool_patterns: &["test"],
        result_keywords: &["assertion", "test passed", "test failed", "coverage"],
    },
    DomainRule {
        name: "documentation",
        file_extensions: &[".md", ".rst"],
        tool_patterns: &["docs"],
        result_keywords: &["readme", "changelog"],
    },
];

/// One matched domain with the evidence that triggered it
#[derive(Debug, Clone)]
pub struct DomainMatch {
    /// Matched domain name
    pub domain: &'static str,
    /// Names of the tool calls that matched, deduplicated in call order
    pub matched_tools: Vec<String>,
    /// File extensions seen in matching arguments, deduplicated
    pub matched_extensions: Vec<String>,
}

/// Run every rule against a session's action log.
///
/// Returns matches in rule-table order; unmatched domains are absent.
pub fn detect_domains(action_log: &[ToolCall]) -> Vec<DomainMatch> {
    // Serialize each call once; every rule reuses the text
    let prepared: Vec<(String, String, String)> = action_log
        .iter()
        .map(|call| {
            (
                call.name.to_lowercase(),
                call.arguments_text(),
                call.result_text(),
            )
        })
        .collect();

    let mut matches = Vec::new();
    for rule in DOMAIN_RULES {
        let mut matched_tools: Vec<String> = Vec::new();
        let mut matched_extensions: Vec<String> = Vec::new();

        for (call, (name, args, result)) in action_log.iter().zip(&prepared) {
            let ext_hits: Vec<&str> = rule
                .file_extensions
                .iter()
                .copied()
                .filter(|ext| args.contains(ext))
                .collect();
            let tool_hit = rule.tool_patterns.iter().any(|p| name.contains(p));
            let keyword_hit = rule.result_keywords.iter().any(|k| result.contains(k));

            if ext_hits.is_empty() && !tool_hit && !keyword_hit {
                continue;
            }
            if !matched_tools.iter().any(|t| t == &call.name) {
                matched_tools.push(call.name.clone());
            }
            for ext in ext_hits {
                if !matched_extensions.iter().any(|e| e == ext) {
                    matched_extensions.push(ext.to_string());
                }
            }
        }

        if !matched_tools.is_empty() {
            matches.push(DomainMatch {
                domain: rule.name,
                matched_tools,
                matched_extensions,
            });
        }
    }
    matches
}
