//! Unit tests for the answer and context formatters.

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::research::{Citation, LegalResearchAnswer, RetrievedContext, SourceType};

fn answer(confidence_score: f64) -> LegalResearchAnswer {
    LegalResearchAnswer {
        issue: "  Whether Section 66A is constitutional?  ".to_string(),
        short_answer: "No.".to_string(),
        rule: "Article 19(1)(a); Article 19(2).".to_string(),
        analysis: "The provision is vague and overbroad.".to_string(),
        conclusion: "Section 66A is struck down.\n".to_string(),
        citations: vec![],
        judgement: None,
        confidence_score,
    }
}

fn metadata_line(rendered: &str) -> &str {
    rendered.rsplit("\n\n").next().unwrap()
}

mod answer_tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn test_full_layout() {
        let mut a = answer(0.9);
        a.citations = vec![Citation::new(
            SourceType::Case,
            "Shreya Singhal v. Union of India",
            "(2015) 5 SCC 1",
        )
        .with_link("https://indiankanoon.org/doc/110813550/")
        .supreme_court(true)];
        a.judgement = Some("affirmed".to_string());

        let expected = "#### 📋 Issue\nWhether Section 66A is constitutional?\n\n---\n\n\
#### 💡 Short Answer\nNo.\n\n---\n\n\
#### ⚖️ Legal Rule\nArticle 19(1)(a); Article 19(2).\n\n---\n\n\
#### 🔍 Analysis\nThe provision is vague and overbroad.\n\n---\n\n\
#### ✅ Conclusion\nSection 66A is struck down.\n\n---\n\n\
#### 📚 Citations\n\n\
- [Shreya Singhal v. Union of India](https://indiankanoon.org/doc/110813550/) — (2015) 5 SCC 1 • ⭐ SCC\n\n---\n\n\
🟢 **Confidence:** 0.90 • ⚖️ **Status:** affirmed";

        assert_eq!(render_answer(&a), expected);
    }

    #[test]
    fn test_confidence_markers() {
        let cases = [
            (1.0, ConfidenceLevel::High),
            (0.8, ConfidenceLevel::High),
            (0.79, ConfidenceLevel::Medium),
            (0.5, ConfidenceLevel::Medium),
            (0.49, ConfidenceLevel::Low),
            (0.0, ConfidenceLevel::Low),
        ];
        for (score, level) in cases {
            assert_eq!(ConfidenceLevel::from_score(score), level, "score {score}");
            let rendered = render_answer(&answer(score));
            assert!(
                metadata_line(&rendered).starts_with(level.marker()),
                "score {score} rendered {rendered}"
            );
        }
    }

    #[test]
    fn test_low_confidence_without_judgement() {
        let rendered = render_answer(&answer(0.42));
        assert_eq!(metadata_line(&rendered), "🔴 **Confidence:** 0.42");
        assert!(!rendered.contains("Status"));
    }

    #[test]
    fn test_empty_citations_has_no_section() {
        let rendered = render_answer(&answer(0.6));
        assert!(!rendered.contains("Citations"));
    }

    #[test]
    fn test_plain_title_without_link() {
        let mut a = answer(0.6);
        a.citations = vec![
            Citation::new(SourceType::Statute, "IT Act, 2000", "Section 79").with_link(""),
            Citation::new(SourceType::Article, "News report", ""),
        ];
        let rendered = render_answer(&a);
        assert!(rendered.contains("- IT Act, 2000 — Section 79\n- News report\n"));
        assert!(!rendered.contains("]("));
    }

    #[test]
    fn test_supreme_court_metadata_clause() {
        let mut a = answer(0.6);
        a.citations = vec![Citation::new(SourceType::Case, "Case", "[2020] 1 SCC 1")
            .with_jurisdiction("Federal")
            .supreme_court(true)];
        let rendered = render_answer(&a);
        assert!(rendered.contains("- Case — [2020] 1 SCC 1 • Federal • ⭐ SCC"));
    }

    #[test]
    fn test_missing_title_falls_back_to_source() {
        let mut a = answer(0.6);
        a.citations = vec![Citation::new(SourceType::Other, "", "cite")];
        assert!(render_answer(&a).contains("- Source — cite"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let mut a = answer(0.75);
        a.judgement = Some("distinguished".to_string());
        assert_eq!(render_answer(&a), render_answer(&a));
    }

    #[test]
    fn test_mapping_without_optional_fields() {
        let value = json!({
            "issue": "Issue text",
            "short_answer": "Short",
            "rule": "Rule",
            "analysis": "Analysis",
            "conclusion": "Conclusion"
        });
        let rendered = render_answer_value(&value);
        assert!(rendered.ends_with("#### ✅ Conclusion\nConclusion"));
        assert!(!rendered.contains("Confidence"));
    }

    #[test]
    fn test_empty_mapping_renders_empty_sections() {
        let rendered = render_answer_value(&json!({}));
        assert!(rendered.starts_with("#### 📋 Issue\n\n\n---"));
        assert!(rendered.ends_with("#### ✅ Conclusion\n"));
    }

    #[test]
    fn test_mapping_matches_record_rendering() {
        let mut a = answer(0.55);
        a.citations = vec![Citation::new(SourceType::Case, "Case", "(2017) 10 SCC 1")
            .with_jurisdiction("India")
            .supreme_court(true)];
        a.judgement = Some("overruled".to_string());
        let value = serde_json::to_value(&a).unwrap();
        assert_eq!(render_answer_value(&value), render_answer(&a));
    }

    #[test]
    fn test_mapping_score_as_string() {
        let rendered = render_answer_value(&json!({ "confidence_score": "0.81" }));
        assert_eq!(metadata_line(&rendered), "🟢 **Confidence:** 0.81");
    }

    #[test]
    fn test_mapping_judgement_only() {
        let rendered = render_answer_value(&json!({ "judgement": "stayed" }));
        assert_eq!(metadata_line(&rendered), "⚖️ **Status:** stayed");
    }

    #[test]
    fn test_opaque_value_placeholder() {
        assert_eq!(render_answer_value(&json!("just text")), UNRENDERABLE_ANSWER);
        assert_eq!(render_answer_value(&json!([1, 2])), UNRENDERABLE_ANSWER);
    }
}

mod context_tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn test_documents_block() {
        let context = RetrievedContext::from_value(json!([
            {"title": "Case X", "content": "Held that..."}
        ]));
        let rendered = format_retrieved_context(&context);
        assert_eq!(rendered, "**Source documents:**\n\n**1. Case X**\n> Held that...");
    }

    #[test]
    fn test_documents_fallbacks() {
        let context = RetrievedContext::from_value(json!([
            {"source": "judgment.pdf", "text": "Passage"},
            {"content": ""},
            "loose snippet"
        ]));
        let rendered = format_retrieved_context(&context);
        assert!(rendered.contains("**1. judgment.pdf**\n> Passage"));
        assert!(rendered.contains("**2. Document 2**\n> {\"content\":\"\"}"));
        assert!(rendered.contains("**3.**\n> loose snippet"));
    }

    #[test]
    fn test_mapping_lines_in_order() {
        let context = RetrievedContext::from_completion(r#"{"Holding": "Struck down", "Bench": 3}"#);
        assert_eq!(
            format_retrieved_context(&context),
            "**Source documents:**\n- **Holding:** Struck down\n- **Bench:** 3"
        );
    }

    #[test]
    fn test_text_unchanged() {
        let context = RetrievedContext::Text("verbatim passages".to_string());
        assert_eq!(format_retrieved_context(&context), "verbatim passages");
    }

    #[test]
    fn test_empty_documents_header_only() {
        let context = RetrievedContext::Documents(vec![]);
        assert_eq!(format_retrieved_context(&context), CONTEXT_HEADER);
    }
}
