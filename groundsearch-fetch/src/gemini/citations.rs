//! Citation extraction and payload recovery.

use serde_json::Value;

use super::api::GroundingMetadata;
use crate::client::Citation;
use crate::error::SearchError;

/// Citations from grounding chunks, deduplicated by URI.
///
/// Order of first appearance is preserved. Chunks without a web URI are
/// skipped.
pub fn collect_citations(metadata: Option<&GroundingMetadata>) -> Vec<Citation> {
    let Some(metadata) = metadata else {
        return Vec::new();
    };

    let mut citations: Vec<Citation> = Vec::new();
    for web in metadata.grounding_chunks.iter().filter_map(|c| c.web.as_ref()) {
        let Some(uri) = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
            continue;
        };
        if citations.iter().any(|c| c.uri == uri) {
            continue;
        }
        citations.push(Citation {
            uri: uri.to_string(),
            title: web.title.clone(),
        });
    }
    citations
}

/// Inserts `[n](uri)` markers after each grounded segment.
///
/// Supports are applied from the highest end offset down so earlier
/// offsets stay valid. `n` is the 1-based chunk index.
pub fn add_citations(text: &str, metadata: &GroundingMetadata) -> String {
    let chunks = &metadata.grounding_chunks;
    let mut supports: Vec<(usize, &[usize])> = metadata
        .grounding_supports
        .iter()
        .filter_map(|s| {
            let end = s.segment.as_ref()?.end_index?;
            Some((end, s.grounding_chunk_indices.as_slice()))
        })
        .collect();
    supports.sort_by(|a, b| b.0.cmp(&a.0));

    let mut output = text.to_string();
    for (end, indices) in supports {
        let links: Vec<String> = indices
            .iter()
            .filter_map(|&i| {
                let uri = chunks.get(i)?.web.as_ref()?.uri.as_deref()?;
                Some(format!("[{}]({uri})", i + 1))
            })
            .collect();
        if links.is_empty() {
            continue;
        }

        let mut at = end.min(output.len());
        while !output.is_char_boundary(at) {
            at += 1;
        }
        output.insert_str(at, &links.join(", "));
    }
    output
}

/// Recovers the JSON object from a model response.
///
/// Accepts bare JSON, fenced code blocks and JSON surrounded by prose
/// (first `{` to last `}`).
pub fn extract_json(text: &str) -> Result<Value, SearchError> {
    let body = strip_code_fence(text.trim());

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => {
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(SearchError::InvalidResponse(
                    "no JSON object in response".to_string(),
                ));
            };
            if end < start {
                return Err(SearchError::InvalidResponse(
                    "no JSON object in response".to_string(),
                ));
            }
            serde_json::from_str(&body[start..=end]).map_err(|e| {
                SearchError::InvalidResponse(format!("payload is not valid JSON: {e}"))
            })?
        }
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(SearchError::InvalidResponse(format!(
            "expected a JSON object, got {value}"
        )))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Wraps a free-form query with instructions favoring authoritative sources.
pub fn optimize_search_query(query: &str) -> String {
    format!(
        "Search for accurate and current information about: {}\n\n\
         Focus on finding:\n\
         - Official product specifications\n\
         - Manufacturer documentation\n\
         - Technical datasheets\n\
         - Verified retailer information\n\n\
         Prioritize recent and authoritative sources.",
        query.trim()
    )
}

/// Appends the JSON schema a structured answer must follow to `prompt`.
///
/// The answer is recovered with [`extract_json`] and checked by the caller.
pub fn with_schema_instructions(prompt: &str, schema: &Value) -> String {
    let schema = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "{}\n\n\
         Respond with a single JSON object and nothing else. \
         It must follow this schema (use null for unknown values):\n\
         ```json\n{schema}\n```",
        prompt.trim_end()
    )
}
