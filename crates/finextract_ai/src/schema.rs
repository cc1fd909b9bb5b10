//! Structured-output schema and instruction prompt for table extraction.

use serde_json::{Value, json};

/// Instruction sent alongside the document.
pub const C_EXTRACTION_PROMPT: &str = "\
You are an expert financial analyst. Your task is to extract tabular data from this \
annual/quarterly report into a structured format suitable for Excel.

Instructions:
1. Identify: Find ALL significant tables, including:
   - Primary Financial Statements (Balance Sheet, Income Statement, Cash Flow, Statement of Equity).
   - Key tables in the \"Notes to Financial Statements\" (e.g., Debt breakdown, Tax reconciliation, Segment reporting).
   - Operating metrics tables.

2. Extraction Rules:
   - Capture ALL rows and columns accurately.
   - Preserve the hierarchy of headers (if a header spans multiple columns, repeat it or format it clearly in the first row).
   - Ensure numerical values are captured exactly as shown (including parentheses for negatives).
   - Do not split a single logical table into multiple parts unless necessary.

3. Naming:
   - Name the 'sheetName' specifically (e.g., \"Consol Balance Sheet\", \"Inc Stmt\", \"Cash Flow\").
   - Avoid generic names like \"Table 1\".

4. Exclusions:
   - Ignore minor layout tables used for signatures or page footers.
   - Ignore very small text lists that are not true data tables.

Return the output strictly in JSON format matching the schema.";

/// JSON schema descriptor for the structured response.
///
/// Uses the OpenAPI-subset type names the Gemini API expects.
pub fn derive_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "tables": {
                "type": "ARRAY",
                "description": "List of financial and data tables extracted from the report.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "sheetName": {
                            "type": "STRING",
                            "description": "A professional, concise name for the Excel sheet \
                                (e.g., 'Balance Sheet', 'Income Statement', 'Note 12 - Debt'). Max 30 chars."
                        },
                        "description": {
                            "type": "STRING",
                            "description": "Brief context about the table."
                        },
                        "rows": {
                            "type": "ARRAY",
                            "description": "The complete content of the table including all headers, \
                                sub-headers, and values.",
                            "items": {
                                "type": "ARRAY",
                                "items": { "type": "STRING", "nullable": true }
                            }
                        }
                    },
                    "required": ["sheetName", "rows"]
                }
            }
        },
        "required": ["tables"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_tables_with_name_and_rows() {
        let schema = derive_response_schema();
        assert_eq!(schema["required"], json!(["tables"]));

        let item = &schema["properties"]["tables"]["items"];
        assert_eq!(item["required"], json!(["sheetName", "rows"]));
        assert_eq!(item["properties"]["rows"]["items"]["items"]["nullable"], json!(true));
    }
}
