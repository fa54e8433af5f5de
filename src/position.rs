use crate::types::{CommentPosition, Diff, Finding, ReviewComment, ReviewContext};

/// Attach GitLab diff coordinates to a finding. Pure mapping: the SHAs come
/// from the review context unchanged and `old_path` is set only when the
/// file was actually renamed or moved. All comments are line-anchored
/// (`position_type: "text"`); file-level comments are not produced here.
pub fn position_comment(finding: &Finding, diff: &Diff, ctx: &ReviewContext) -> ReviewComment {
    let old_path = (diff.old_path != diff.new_path).then(|| diff.old_path.clone());

    ReviewComment {
        body: finding.comment.clone(),
        position: CommentPosition {
            base_sha: ctx.base_sha.clone(),
            start_sha: ctx.start_sha.clone(),
            head_sha: ctx.head_sha.clone(),
            old_path,
            new_path: diff.new_path.clone(),
            position_type: "text".to_string(),
            new_line: finding.line,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ReviewContext {
        ReviewContext {
            title: "t".to_string(),
            description: "d".to_string(),
            base_sha: "base123".to_string(),
            start_sha: "start456".to_string(),
            head_sha: "head789".to_string(),
        }
    }

    fn diff(old_path: &str, new_path: &str) -> Diff {
        Diff {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
            diff: String::new(),
            new_file: false,
            renamed_file: old_path != new_path,
            deleted_file: false,
        }
    }

    fn finding() -> Finding {
        Finding {
            line: 14,
            comment: "consider handling the error".to_string(),
        }
    }

    #[test]
    fn test_same_path_omits_old_path() {
        let comment = position_comment(&finding(), &diff("a.ts", "a.ts"), &ctx());
        assert_eq!(comment.position.old_path, None);
        assert_eq!(comment.position.new_path, "a.ts");
    }

    #[test]
    fn test_renamed_path_includes_old_path() {
        let comment = position_comment(&finding(), &diff("b.ts", "a.ts"), &ctx());
        assert_eq!(comment.position.old_path.as_deref(), Some("b.ts"));
        assert_eq!(comment.position.new_path, "a.ts");
    }

    #[test]
    fn test_shas_copied_verbatim_and_type_is_text() {
        let comment = position_comment(&finding(), &diff("a.ts", "a.ts"), &ctx());
        assert_eq!(comment.position.base_sha, "base123");
        assert_eq!(comment.position.start_sha, "start456");
        assert_eq!(comment.position.head_sha, "head789");
        assert_eq!(comment.position.position_type, "text");
        assert_eq!(comment.position.new_line, 14);
        assert_eq!(comment.body, "consider handling the error");
    }
}
