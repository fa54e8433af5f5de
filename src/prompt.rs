use crate::types::Diff;

/// Reviewer persona handed to the model as the system message. Versioned
/// configuration text: changing it does not affect the pipeline's contract.
pub const SYSTEM_PROMPT: &str = "You are an expert code reviewer. Analyze the provided code diff and identify:
1. Potential bugs or errors
2. Code quality improvements
3. Security vulnerabilities
4. Performance issues
5. Missing tests
6. Best practices violations
7. Code style inconsistencies

For each issue found, provide:
- The line number where the issue occurs
- A clear, constructive comment explaining the issue
- A suggestion for improvement if applicable

Return your analysis as a JSON object with this structure:
{
  \"comments\": [
    {
      \"line\": <line_number>,
      \"comment\": \"<your review comment>\"
    }
  ]
}

Only comment on significant issues. Don't comment on every minor style preference.";

/// Render the per-file review prompt. Pure and deterministic: the same diff
/// and MR metadata always produce the same text. The expected output shape
/// is restated at the end so it survives backend-specific prompt wrapping.
pub fn build_review_prompt(diff: &Diff, title: &str, description: &str) -> String {
    let rename_note = if diff.old_path != diff.new_path {
        format!("(renamed from {})\n", diff.old_path)
    } else {
        String::new()
    };

    format!(
        "Review this code change:\n\n\
         Merge Request Title: {title}\n\
         Merge Request Description: {description}\n\n\
         File: {path}\n\
         {rename_note}\n\
         Diff:\n\
         ```\n\
         {diff}\n\
         ```\n\n\
         Please analyze this code change and provide your review comments as a JSON object \
         with this structure:\n\
         {{\n\
           \"comments\": [\n\
             {{\n\
               \"line\": <line_number>,\n\
               \"comment\": \"<your review comment>\"\n\
             }}\n\
           ]\n\
         }}",
        title = title,
        description = description,
        path = diff.new_path,
        rename_note = rename_note,
        diff = diff.diff,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(old_path: &str, new_path: &str) -> Diff {
        Diff {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
            diff: "@@ -1 +1 @@\n-let a = 1;\n+const a = 1;".to_string(),
            new_file: false,
            renamed_file: old_path != new_path,
            deleted_file: false,
        }
    }

    #[test]
    fn test_prompt_embeds_mr_metadata_and_diff() {
        let prompt = build_review_prompt(&diff("a.ts", "a.ts"), "Fix login", "Handles expiry");
        assert!(prompt.contains("Merge Request Title: Fix login"));
        assert!(prompt.contains("Merge Request Description: Handles expiry"));
        assert!(prompt.contains("File: a.ts"));
        assert!(prompt.contains("```\n@@ -1 +1 @@\n-let a = 1;\n+const a = 1;\n```"));
    }

    #[test]
    fn test_prompt_restates_output_shape() {
        let prompt = build_review_prompt(&diff("a.ts", "a.ts"), "t", "d");
        assert!(prompt.trim_end().ends_with('}'));
        assert!(prompt.contains("\"comments\""));
        assert!(prompt.contains("<line_number>"));
    }

    #[test]
    fn test_prompt_annotates_renames_only() {
        let renamed = build_review_prompt(&diff("old.ts", "new.ts"), "t", "d");
        assert!(renamed.contains("(renamed from old.ts)"));

        let unchanged = build_review_prompt(&diff("same.ts", "same.ts"), "t", "d");
        assert!(!unchanged.contains("renamed from"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let d = diff("a.ts", "a.ts");
        assert_eq!(
            build_review_prompt(&d, "t", "d"),
            build_review_prompt(&d, "t", "d")
        );
    }
}
